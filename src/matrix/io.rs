/* *************************************************************************** **
** This file is part of tellur, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                                  **
**                                                                             **
**     http://www.apache.org/licenses/LICENSE-2.0                              **
**     http://opensource.org/licenses/MIT                                      **
**                                                                             **
** Be aware that not all of tellur is provided under this permissive license,  **
** and that the project as a whole is licensed under the GPL 3.0.              **
** *************************************************************************** */

//! Binary and ASCII persistence for dense matrices.
//!
//! The single-file binary format is the workhorse:
//!
//! ```text
//! u32 rows | u32 cols | rows*cols scalars, row-major
//! ```
//!
//! everything little-endian, no magic number, no version field. That
//! makes the files portable only between like-endian, like-precision
//! builds; they are working files of one survey run, not an archival
//! format. Binary *vector* files are the same with a single `u32 len`
//! header, and a matrix can also be assembled from a numbered sequence
//! of such vector files, one per independently recorded measurement
//! row (see [`load_matrix_vectors_bin`]).
//!
//! The ASCII formats are one optional `#` comment line followed by
//! whitespace-separated values, laid out row-wise or column-wise
//! depending on which function is called; the file itself does not
//! record its orientation.

use ::std::io::{BufRead, Read, Write};
use ::std::path::{Path, PathBuf};

use ::failure::ResultExt;
use ::tellur_byte_tools::{read_u32v_le, write_u32v_le};
use ::tellur_fs_util as fs_util;
use ::tellur_slice_math::vfill;

use crate::{DenseMatrix, FailResult, Scalar};

/// Fallback suffix for binary matrix files, used when the caller has no
/// site-specific convention to pass in.
pub const DEFAULT_MATRIX_SUFFIX: &str = ".bmat";

/// On-disk representation selector for [`save_matrix`]/[`write_matrix`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IoFormat {
    Binary,
    /// The row-based ASCII format, without a comment line.
    Ascii,
}

// ---------------------------------------------------------------------------
// binary, single file

fn with_default_suffix(path: &Path, suffix: &str) -> PathBuf {
    match path.extension() {
        Some(_) => path.to_path_buf(),
        None => PathBuf::from(format!("{}{}", path.display(), suffix)),
    }
}

/// Write `a` to `path`, appending `suffix` if the path has no extension.
///
/// This is the strict variant: any failure is returned as an error.
pub fn write_matrix<T: Scalar>(
    a: &DenseMatrix<T>,
    path: &Path,
    format: IoFormat,
    suffix: &str,
) -> FailResult<()> {
    match format {
        IoFormat::Ascii => save_matrix_row(a, path, ""),
        IoFormat::Binary => {
            let path = with_default_suffix(path, suffix);
            let mut file = fs_util::create(&path)?;

            let mut head = [0u8; 8];
            write_u32v_le(&mut head, &[a.rows() as u32, a.cols() as u32]);
            file.write_all(&head)
                .with_context(|_| format!("while writing '{}'", path.display()))?;

            let mut buf = Vec::new();
            for i in 0..a.rows() {
                let row = &a[i];
                buf.resize(row.len() * T::WIDTH, 0);
                T::write_slice_le(&mut buf, row);
                file.write_all(&buf)
                    .with_context(|_| format!("while writing '{}'", path.display()))?;
            }
            Ok(())
        },
    }
}

/// Write `a` to `path`, reporting failure as `false` instead of raising.
///
/// Batch exports call this so that one unwritable file does not abort
/// the remaining ones; the cause is logged.
pub fn save_matrix<T: Scalar>(
    a: &DenseMatrix<T>,
    path: &Path,
    format: IoFormat,
    suffix: &str,
) -> bool {
    match write_matrix(a, path, format, suffix) {
        Ok(()) => true,
        Err(e) => {
            warn!("could not save matrix to '{}': {}", path.display(), e);
            false
        },
    }
}

/// Load a single binary matrix file, exactly as named.
///
/// A missing or unreadable file is a hard error. On success the matrix
/// takes the stored shape and every row flag is set `true`.
pub fn load_matrix_single_bin<T: Scalar>(
    a: &mut DenseMatrix<T>,
    path: &Path,
) -> FailResult<()> {
    let mut file = fs_util::open(path)?;

    let mut head = [0u8; 8];
    file.read_exact(&mut head)
        .with_context(|_| format!("while reading '{}'", path.display()))?;
    let mut dims = [0u32; 2];
    read_u32v_le(&mut dims, &head);
    let (rows, cols) = (dims[0] as usize, dims[1] as usize);

    a.resize(rows, cols);
    let mut buf = vec![0u8; cols * T::WIDTH];
    for i in 0..rows {
        file.read_exact(&mut buf)
            .with_context(|_| format!("while reading '{}'", path.display()))?;
        T::read_slice_le(&mut a[i], &buf);
    }
    vfill(a.row_flag_mut(), true);
    Ok(())
}

/// Load a matrix by name, resolving the file in three steps:
///
/// 1. if `path` already ends with `.matrix`, `.mat`, or `suffix`, it is
///    loaded directly as a single binary file;
/// 2. otherwise each of those suffixes is appended in turn and the
///    first existing file wins;
/// 3. otherwise `path` is taken as the body of a numbered sequence of
///    binary vector files ([`load_matrix_vectors_bin`]).
pub fn load_matrix<T: Scalar>(
    a: &mut DenseMatrix<T>,
    path: &Path,
    suffix: &str,
) -> FailResult<()> {
    let name = path.to_string_lossy().into_owned();

    let known = [".matrix", ".mat", suffix];
    if known.iter().any(|s| !s.is_empty() && name.ends_with(s)) {
        return load_matrix_single_bin(a, path);
    }

    for s in &known {
        if s.is_empty() {
            continue;
        }
        let candidate = PathBuf::from(format!("{}{}", name, s));
        if fs_util::exists(&candidate) {
            return load_matrix_single_bin(a, &candidate);
        }
    }

    load_matrix_vectors_bin(a, path, 1)
}

// ---------------------------------------------------------------------------
// binary, vector files

/// Write one vector as `u32 len | len scalars`, little-endian.
pub fn save_vector_bin<T: Scalar>(values: &[T], path: &Path) -> FailResult<()> {
    let mut file = fs_util::create(path)?;

    let mut head = [0u8; 4];
    write_u32v_le(&mut head, &[values.len() as u32]);
    file.write_all(&head)
        .with_context(|_| format!("while writing '{}'", path.display()))?;

    let mut buf = vec![0u8; values.len() * T::WIDTH];
    T::write_slice_le(&mut buf, values);
    file.write_all(&buf)
        .with_context(|_| format!("while writing '{}'", path.display()))?;
    Ok(())
}

/// Counterpart of [`save_vector_bin`].
pub fn load_vector_bin<T: Scalar>(path: &Path) -> FailResult<Vec<T>> {
    let mut file = fs_util::open(path)?;

    let mut head = [0u8; 4];
    file.read_exact(&mut head)
        .with_context(|_| format!("while reading '{}'", path.display()))?;
    let mut len = [0u32; 1];
    read_u32v_le(&mut len, &head);

    let mut buf = vec![0u8; len[0] as usize * T::WIDTH];
    file.read_exact(&mut buf)
        .with_context(|_| format!("while reading '{}'", path.display()))?;
    let mut out = vec![T::zero(); len[0] as usize];
    T::read_slice_le(&mut out, &buf);
    Ok(out)
}

/// Assemble one matrix from many independently written row-vector files.
///
/// File names are `<body>.<i>.pot` (or plain `<body>.<i>`), with `i`
/// counting up from 0; the first missing index ends the sequence. That
/// is the normal termination, not an error, though a completely absent
/// index 0 is logged since it usually means a typo'd body name. With
/// `k_count > 1` the sequence is grouped by an outer sub-count index:
/// `<body>.<i>_<k>.pot`, all of group `k` appended before group `k+1`.
pub fn load_matrix_vectors_bin<T: Scalar>(
    a: &mut DenseMatrix<T>,
    body: &Path,
    k_count: usize,
) -> FailResult<()> {
    a.clear();
    let body = body.to_string_lossy();

    for k in 0..k_count {
        let mut count = 0;
        loop {
            let mut name = if k_count > 1 {
                PathBuf::from(format!("{}.{}_{}.pot", body, count, k))
            } else {
                PathBuf::from(format!("{}.{}.pot", body, count))
            };
            if !fs_util::exists(&name) {
                name = PathBuf::from(format!("{}.{}", body, count));
                if !fs_util::exists(&name) {
                    if count == 0 {
                        warn!("no vector files found: '{}'", name.display());
                    }
                    break;
                }
            }
            a.push_row(load_vector_bin(&name)?);
            count += 1;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ascii

/// Column count of the first data line (0 for a file with no data).
fn count_columns(path: &Path) -> FailResult<usize> {
    let file = fs_util::open_text(path)?;
    for line in file.lines() {
        let line = line.with_context(|_| format!("while reading '{}'", path.display()))?;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        return Ok(trimmed.split_whitespace().count());
    }
    Ok(0)
}

/// All numeric tokens of the file, plus the tokens of the leading
/// comment lines (`#` stripped).
fn read_ascii<T: Scalar>(path: &Path) -> FailResult<(Vec<T>, Vec<String>)> {
    let file = fs_util::open_text(path)?;
    let mut comments = Vec::new();
    let mut values = Vec::new();
    let mut in_header = true;

    for line in file.lines() {
        let line = line.with_context(|_| format!("while reading '{}'", path.display()))?;
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if in_header && trimmed.starts_with('#') {
            let stripped = trimmed.trim_start_matches('#');
            comments.extend(stripped.split_whitespace().map(String::from));
            continue;
        }
        in_header = false;
        for tok in trimmed.split_whitespace() {
            match tok.parse::<T>() {
                Ok(x) => values.push(x),
                Err(_) => bail!("invalid numeric token '{}' in '{}'", tok, path.display()),
            }
        }
    }
    Ok((values, comments))
}

fn derive_row_count<T>(values: &[T], cols: usize, path: &Path) -> usize {
    let rows = values.len() / cols;
    if values.len() % cols != 0 {
        warn!(
            "'{}': {} values do not fill {} columns evenly; discarding {} trailing value(s)",
            path.display(), values.len(), cols, values.len() % cols,
        );
    }
    rows
}

/// Load a row-based ASCII matrix file. Returns the comment tokens.
///
/// The row count is derived as `values / columns`; a trailing partial
/// row is dropped with a warning.
pub fn load_matrix_row<T: Scalar>(
    a: &mut DenseMatrix<T>,
    path: &Path,
) -> FailResult<Vec<String>> {
    let cols = count_columns(path)?;
    let (values, comments) = read_ascii(path)?;
    if cols == 0 {
        a.resize(0, 0);
        return Ok(comments);
    }

    let rows = derive_row_count(&values, cols, path);
    a.resize(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            a[i][j] = values[i * cols + j];
        }
    }
    Ok(comments)
}

/// Load a column-based ASCII matrix file. Returns the comment tokens.
///
/// The file's table is the transpose of the matrix: each *column* of
/// the file becomes one row, so a file with `c` columns and `r` data
/// lines yields a `c x r` matrix.
pub fn load_matrix_col<T: Scalar>(
    a: &mut DenseMatrix<T>,
    path: &Path,
) -> FailResult<Vec<String>> {
    let cols = count_columns(path)?;
    let (values, comments) = read_ascii(path)?;
    if cols == 0 {
        a.resize(0, 0);
        return Ok(comments);
    }

    let rows = derive_row_count(&values, cols, path);
    a.resize(cols, rows);
    for i in 0..rows {
        for j in 0..cols {
            a[j][i] = values[i * cols + j];
        }
    }
    Ok(comments)
}

/// Save as row-based ASCII, tab-separated, with an optional `#` comment
/// line (pass `""` for none).
pub fn save_matrix_row<T: Scalar>(
    a: &DenseMatrix<T>,
    path: &Path,
    comment: &str,
) -> FailResult<()> {
    let mut file = fs_util::create_text(path)?;
    if !comment.is_empty() {
        writeln!(file, "#{}", comment)?;
    }
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            write!(file, "{}\t", a[i][j])?;
        }
        writeln!(file)?;
    }
    Ok(())
}

/// Save as column-based ASCII: the file's table is the transpose of
/// [`save_matrix_row`]'s. Line `j` of the file holds element `j` of
/// every row.
pub fn save_matrix_col<T: Scalar>(
    a: &DenseMatrix<T>,
    path: &Path,
    comment: &str,
) -> FailResult<()> {
    let mut file = fs_util::create_text(path)?;
    if !comment.is_empty() {
        writeln!(file, "#{}", comment)?;
    }
    for j in 0..a.cols() {
        for i in 0..a.rows() {
            write!(file, "{}\t", a[i][j])?;
        }
        writeln!(file)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
