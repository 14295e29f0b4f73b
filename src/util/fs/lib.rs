//! Adds error context to fs operations.
//!
//! A bare `io::Error` from `File::open` does not mention the path, which
//! makes "No such file or directory" from deep inside a loader useless.
//! Everything here wraps the std call and attaches the path.

extern crate failure;

use ::std::fs::File;
use ::std::io::{BufReader, BufWriter};
use ::std::path::Path;

use ::failure::ResultExt;

pub type FailResult<T> = Result<T, ::failure::Error>;

/// Wrapper around `File::open` that adds context.
pub fn open<P: AsRef<Path>>(path: P) -> FailResult<File> {
    let file = File::open(path.as_ref())
        .with_context(|_| format!("while opening file: '{}'", path.as_ref().display()))?;
    Ok(file)
}

/// Wrapper around `File::open` that adds context and makes a `BufReader`.
pub fn open_text<P: AsRef<Path>>(path: P) -> FailResult<BufReader<File>> {
    open(path).map(BufReader::new)
}

/// Wrapper around `File::create` that adds context.
pub fn create<P: AsRef<Path>>(path: P) -> FailResult<File> {
    let file = File::create(path.as_ref())
        .with_context(|_| format!("could not create file: '{}'", path.as_ref().display()))?;
    Ok(file)
}

/// Wrapper around `File::create` that adds context and makes a `BufWriter`.
pub fn create_text<P: AsRef<Path>>(path: P) -> FailResult<BufWriter<File>> {
    create(path).map(BufWriter::new)
}

/// Whether `path` names an existing file or directory.
///
/// Permission errors and the like are folded into `false`; callers here
/// only ever use this to probe candidate file names.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_mentions_path() {
        let err = open("/no/such/file/anywhere").unwrap_err();
        assert!(format!("{}", err).contains("/no/such/file/anywhere"));
    }
}
