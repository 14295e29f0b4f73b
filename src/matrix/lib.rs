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

//! Dense row-major matrices for inversion-style workloads.
//!
//! The central type is [`DenseMatrix`], the Jacobian/forward-operator
//! representation: a sequence of equally long row vectors with
//! matrix-vector products in both directions, elementwise arithmetic,
//! and binary/ASCII persistence. [`IdentityMatrix`] is the cheap
//! stand-in used where a solver wants a scaled identity without an
//! N x N allocation; both implement [`LinearOperator`], the capability
//! contract an inversion loop codes against.
//!
//! Matrices are generic over their scalar with `f64` as the default;
//! see [`Scalar`] for the closed set of element types.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate itertools;
extern crate num_traits;
extern crate tellur_byte_tools;
extern crate tellur_fs_util;
extern crate tellur_slice_math;

#[cfg(test)]
extern crate env_logger;
#[cfg(test)]
extern crate rand;
#[cfg(test)]
extern crate tempdir;

use ::std::fmt;
use ::std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};
use ::std::path::Path;
use ::std::str::FromStr;

use ::num_traits::Float;

pub use crate::dense::{DenseMatrix, MultStrategy};
pub use crate::dense::{scale_matrix, rank1_update, fliplr, det, inv};
pub use crate::identity::IdentityMatrix;

mod dense;
mod identity;
pub mod io;

pub type FailResult<T> = Result<T, ::failure::Error>;

// ---------------------------------------------------------------------------

/// Raised when an operand's length disagrees with the matrix shape.
#[derive(Debug, Fail)]
#[fail(display = "{}: operand length {} does not match {}", op, found, expected)]
pub struct ShapeMismatch {
    pub op: &'static str,
    pub expected: usize,
    pub found: usize,
}

/// Raised by checked accessors given a row index past the end.
#[derive(Debug, Fail)]
#[fail(display = "row index {} out of range for a matrix with {} rows", index, rows)]
pub struct RowOutOfRange {
    pub index: usize,
    pub rows: usize,
}

/// Raised by checked accessors given a column index past the end.
#[derive(Debug, Fail)]
#[fail(display = "column index {} out of range for a matrix with {} columns", index, cols)]
pub struct ColOutOfRange {
    pub index: usize,
    pub cols: usize,
}

/// Raised by the small-matrix stubs (`det`, `inv`) for unsupported shapes.
#[derive(Debug, Fail)]
#[fail(display = "{} is only implemented for 2x2 and 3x3 matrices (got {}x{})", op, rows, cols)]
pub struct UnsupportedDims {
    pub op: &'static str,
    pub rows: usize,
    pub cols: usize,
}

pub(crate) fn check_len(op: &'static str, expected: usize, found: usize) -> FailResult<()> {
    if expected != found {
        return Err(ShapeMismatch { op, expected, found }.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------

/// The closed set of element types the matrices work with.
///
/// Beyond float arithmetic this carries what persistence needs: a
/// little-endian byte codec (the binary formats store raw scalars of
/// `WIDTH` bytes) and text formatting/parsing for the ASCII formats.
pub trait Scalar
    : Float
    + AddAssign + SubAssign + MulAssign + DivAssign
    + fmt::Display + fmt::Debug + FromStr
    + Send + Sync + 'static
{
    /// Width of one encoded scalar in bytes.
    const WIDTH: usize;

    /// Decode `dst.len()` scalars from exactly `WIDTH * dst.len()` bytes.
    fn read_slice_le(dst: &mut [Self], src: &[u8]);

    /// Encode `src.len()` scalars into exactly `WIDTH * src.len()` bytes.
    fn write_slice_le(dst: &mut [u8], src: &[Self]);
}

impl Scalar for f64 {
    const WIDTH: usize = 8;

    fn read_slice_le(dst: &mut [f64], src: &[u8]) {
        ::tellur_byte_tools::read_f64v_le(dst, src);
    }

    fn write_slice_le(dst: &mut [u8], src: &[f64]) {
        ::tellur_byte_tools::write_f64v_le(dst, src);
    }
}

impl Scalar for f32 {
    const WIDTH: usize = 4;

    fn read_slice_le(dst: &mut [f32], src: &[u8]) {
        ::tellur_byte_tools::read_f32v_le(dst, src);
    }

    fn write_slice_le(dst: &mut [u8], src: &[f32]) {
        ::tellur_byte_tools::write_f32v_le(dst, src);
    }
}

// ---------------------------------------------------------------------------

/// The capability contract for anything that can stand in as a Jacobian.
///
/// An inversion or modelling loop that only ever applies its forward
/// operator (and its transpose) can hold a `Box<dyn LinearOperator>`
/// and be handed a [`DenseMatrix`], an [`IdentityMatrix`], or any other
/// representation. There are no default method bodies: a representation
/// that cannot support one of these operations does not belong behind
/// this trait.
pub trait LinearOperator {
    /// Number of rows (the data side).
    fn rows(&self) -> usize;

    /// Number of columns (the model side).
    fn cols(&self) -> usize;

    /// Drop all contents, leaving an empty (0 x 0) operator.
    fn clear(&mut self);

    /// `self * b`. Fails unless `b.len() == self.cols()`.
    fn mult(&self, b: &[f64]) -> FailResult<Vec<f64>>;

    /// `self^T * b`. Fails unless `b.len() == self.rows()`.
    fn trans_mult(&self, b: &[f64]) -> FailResult<Vec<f64>>;

    /// Persist in the single-file binary matrix format.
    fn save(&self, path: &Path) -> FailResult<()>;
}
