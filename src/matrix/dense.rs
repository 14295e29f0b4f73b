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

//! The row-based dense matrix.

use ::std::ops::{Add, Sub, Mul, Div};
use ::std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};
use ::std::ops::{Index, IndexMut};
use ::std::path::Path;

use ::itertools::Itertools;
use ::num_traits::AsPrimitive;
use ::tellur_slice_math::{vdot, vround};

use crate::{check_len, FailResult, LinearOperator, Scalar};
use crate::{ColOutOfRange, RowOutOfRange, ShapeMismatch, UnsupportedDims};

/// Simple row-based dense matrix.
///
/// Rows are plain `Vec<T>` values of equal length, owned exclusively by
/// the matrix; cloning deep-copies every row. Alongside the rows lives
/// `row_flag`, one `bool` per row for free use by callers (say, to mark
/// measurements excluded from a fit); nothing in this crate ever reads
/// it, and the binary loader sets every flag `true` on a fresh load.
///
/// The number of columns is defined by row 0. The row builders tolerate
/// appending a row of a different length (this is logged) but the
/// arithmetic here assumes rectangularity; a ragged matrix will panic
/// or truncate in elementwise operations.
#[derive(Debug, Clone)]
pub struct DenseMatrix<T = f64> {
    mat: Vec<Vec<T>>,
    row_flag: Vec<bool>,
}

impl<T> Default for DenseMatrix<T> {
    fn default() -> Self {
        DenseMatrix { mat: Vec::new(), row_flag: Vec::new() }
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// An all-zero matrix of the given dimensions, all row flags `false`.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut out = DenseMatrix::default();
        out.resize(rows, cols);
        out
    }

    /// Take a sequence of row vectors verbatim.
    ///
    /// The column count is defined by the first row; rows of any other
    /// length are accepted but logged, see the type-level docs.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        if let Some(first) = rows.first() {
            let cols = first.len();
            for (i, row) in rows.iter().enumerate() {
                if row.len() != cols {
                    warn!("matrix row {} has length {} where row 0 has {}", i, row.len(), cols);
                }
            }
        }
        let row_flag = vec![false; rows.len()];
        DenseMatrix { mat: rows, row_flag }
    }

    /// Read a matrix from persisted storage.
    ///
    /// See [`crate::io::load_matrix`] for how `path` is resolved against
    /// the given binary-file `suffix`.
    pub fn load(path: &Path, suffix: &str) -> FailResult<Self> {
        let mut out = DenseMatrix::default();
        crate::io::load_matrix(&mut out, path, suffix)?;
        Ok(out)
    }

    /// Resize to `rows` x `cols`.
    ///
    /// Contents that still fit are kept; new cells are zero-initialized.
    /// New row flags start out `false`.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.mat.resize(rows, Vec::new());
        for row in &mut self.mat {
            row.resize(cols, T::zero());
        }
        self.row_flag.resize(rows, false);
    }
}

impl<T> DenseMatrix<T> {
    /// Number of rows.
    #[inline(always)]
    pub fn rows(&self) -> usize { self.mat.len() }

    /// Number of columns, as defined by row 0.
    #[inline(always)]
    pub fn cols(&self) -> usize {
        match self.mat.first() {
            Some(row) => row.len(),
            None => 0,
        }
    }

    /// Drop all rows and flags, leaving a 0 x 0 matrix.
    pub fn clear(&mut self) {
        self.mat.clear();
        self.row_flag.clear();
    }

    /// Append a row; the flag vector grows by one (`false`).
    ///
    /// Length consistency is the caller's business (logged, not checked
    /// hard; see the type-level docs).
    pub fn push_row(&mut self, row: Vec<T>) {
        if !self.mat.is_empty() && row.len() != self.cols() {
            warn!("appending row of length {} to a matrix with {} columns", row.len(), self.cols());
        }
        self.mat.push(row);
        self.row_flag.push(false);
    }

    /// The last row, if any.
    pub fn back_mut(&mut self) -> Option<&mut Vec<T>> {
        self.mat.last_mut()
    }

    /// Per-row advisory flags. Length always equals `rows()`.
    pub fn row_flag(&self) -> &[bool] { &self.row_flag }

    /// Mutable access to the advisory flags, e.g. for a bulk fill.
    pub fn row_flag_mut(&mut self) -> &mut [bool] { &mut self.row_flag }

    /// Row `i`, bounds-checked.
    pub fn row(&self, i: usize) -> FailResult<&[T]> {
        match self.mat.get(i) {
            Some(row) => Ok(row),
            None => Err(RowOutOfRange { index: i, rows: self.mat.len() }.into()),
        }
    }

    /// Mutable row `i`, bounds-checked.
    pub fn row_mut(&mut self, i: usize) -> FailResult<&mut Vec<T>> {
        let rows = self.mat.len();
        match self.mat.get_mut(i) {
            Some(row) => Ok(row),
            None => Err(RowOutOfRange { index: i, rows }.into()),
        }
    }

    /// Element `(i, j)`, bounds-checked.
    pub fn val(&self, i: usize, j: usize) -> FailResult<&T> {
        let row = self.row(i)?;
        match row.get(j) {
            Some(x) => Ok(x),
            None => Err(ColOutOfRange { index: j, cols: row.len() }.into()),
        }
    }

    /// Set element `(i, j)`, bounds-checked.
    pub fn set_val(&mut self, i: usize, j: usize, value: T) -> FailResult<()> {
        let row = self.row_mut(i)?;
        let cols = row.len();
        match row.get_mut(j) {
            Some(x) => Ok(*x = value),
            None => Err(ColOutOfRange { index: j, cols }.into()),
        }
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// Overwrite row `i` with a copy of `values`.
    ///
    /// Fails if `i` is out of range or `values` does not have `cols()`
    /// elements (so this cannot introduce a ragged row).
    pub fn set_row(&mut self, values: &[T], i: usize) -> FailResult<()> {
        check_len("set_row", self.cols(), values.len())?;
        let row = self.row_mut(i)?;
        row.clear();
        row.extend_from_slice(values);
        Ok(())
    }

    /// Column `j` as a freshly materialized vector. O(rows), bounds-checked.
    pub fn col(&self, j: usize) -> FailResult<Vec<T>> {
        if j >= self.cols() {
            return Err(ColOutOfRange { index: j, cols: self.cols() }.into());
        }
        Ok(self.mat.iter().map(|row| row[j]).collect())
    }

    /// Overwrite (a prefix of) column `j`.
    ///
    /// Fails if `j` is out of range or `values` is longer than the row
    /// count; a shorter `values` writes only the leading rows.
    pub fn set_col(&mut self, j: usize, values: &[T]) -> FailResult<()> {
        if j >= self.cols() {
            return Err(ColOutOfRange { index: j, cols: self.cols() }.into());
        }
        if values.len() > self.rows() {
            return Err(ShapeMismatch { op: "set_col", expected: self.rows(), found: values.len() }.into());
        }
        for (row, &x) in self.mat.iter_mut().zip(values) {
            row[j] = x;
        }
        Ok(())
    }

    /// `self * b`: for each row `i`, `result[i] = dot(row_i, b)`.
    ///
    /// Fails unless `b.len() == cols()`.
    pub fn mult(&self, b: &[T]) -> FailResult<Vec<T>> {
        self.mult_with(b, MultStrategy::Sequential)
    }

    /// `self * b` with an explicit execution strategy.
    ///
    /// Both strategies produce identical results (the per-row summation
    /// order does not change); `Threaded` merely partitions the rows
    /// into contiguous blocks computed by worker threads.
    pub fn mult_with(&self, b: &[T], strategy: MultStrategy) -> FailResult<Vec<T>> {
        check_len("mult", self.cols(), b.len())?;
        match strategy {
            MultStrategy::Sequential => {
                Ok(self.mat.iter().map(|row| vdot(row, b)).collect())
            },
            MultStrategy::Threaded { threads } => Ok(self.mult_threaded(b, threads)),
        }
    }

    fn mult_threaded(&self, b: &[T], threads: usize) -> Vec<T> {
        let rows = self.rows();
        let mut ret = vec![T::zero(); rows];

        if threads <= 1 || rows == 0 {
            for (out, row) in ret.iter_mut().zip(&self.mat) {
                *out = vdot(row, b);
            }
            return ret;
        }

        // ceil(rows / threads); each worker owns one contiguous block
        // of rows and the matching disjoint slice of the output.
        let block = (rows + threads - 1) / threads;
        let mat = &self.mat;
        ::std::thread::scope(|scope| {
            for (index, out) in ret.chunks_mut(block).enumerate() {
                scope.spawn(move || {
                    let start = index * block;
                    for (k, x) in out.iter_mut().enumerate() {
                        *x = vdot(&mat[start + k], b);
                    }
                });
            }
        });
        ret
    }

    /// `self * b[start..end]`: the product against a window of a longer
    /// vector, e.g. one segment of a concatenated multi-dataset model.
    ///
    /// Fails unless `end - start == cols()` and the window lies inside `b`.
    pub fn mult_range(&self, b: &[T], start: usize, end: usize) -> FailResult<Vec<T>> {
        if start > end || end > b.len() {
            return Err(ShapeMismatch { op: "mult_range", expected: end, found: b.len() }.into());
        }
        check_len("mult_range", self.cols(), end - start)?;
        let window = &b[start..end];
        Ok(self.mat.iter().map(|row| vdot(row, window)).collect())
    }

    /// `self^T * b`: `result[j] = sum over i of self[i][j] * b[i]`.
    ///
    /// Fails unless `b.len() == rows()`. The summation order is exactly
    /// this double loop; callers comparing against an independent
    /// computation can rely on it bit for bit.
    pub fn trans_mult(&self, b: &[T]) -> FailResult<Vec<T>> {
        check_len("trans_mult", self.rows(), b.len())?;
        let mut ret = vec![T::zero(); self.cols()];
        for (row, &bi) in self.mat.iter().zip(b) {
            for (out, &aij) in ret.iter_mut().zip(row) {
                *out += aij * bi;
            }
        }
        Ok(ret)
    }

    /// Round every element to the nearest multiple of `tolerance`.
    pub fn round(&mut self, tolerance: T) {
        for row in &mut self.mat {
            vround(row, tolerance);
        }
    }

    /// Explicit elementwise conversion to another scalar type.
    ///
    /// This is an `as`-style cast: converting `f64` data to an `f32`
    /// matrix loses precision, which is why there is no implicit
    /// `From`/`Into` between matrices of different scalar types.
    pub fn cast<B>(&self) -> DenseMatrix<B>
    where
        B: Scalar,
        T: AsPrimitive<B>,
    {
        DenseMatrix {
            mat: self.mat.iter()
                .map(|row| row.iter().map(|x| x.as_()).collect())
                .collect(),
            row_flag: self.row_flag.clone(),
        }
    }
}

/// Index operator for row access.
///
/// No explicit range check here; an out-of-range row index panics like
/// any slice index. The `#[inline(always)]` lets the optimizer elide
/// the check in hot loops; the checked, error-returning path for
/// boundary-sensitive call sites is [`DenseMatrix::row`].
impl<T> Index<usize> for DenseMatrix<T> {
    type Output = Vec<T>;

    #[inline(always)]
    fn index(&self, i: usize) -> &Vec<T> { &self.mat[i] }
}

impl<T> IndexMut<usize> for DenseMatrix<T> {
    #[inline(always)]
    fn index_mut(&mut self, i: usize) -> &mut Vec<T> { &mut self.mat[i] }
}

/// Two matrices are equal iff their shapes match and every row matches.
/// The advisory row flags are bookkeeping, not data, and do not take
/// part in the comparison.
impl<T: PartialEq> PartialEq for DenseMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows() == other.rows()
            && self.cols() == other.cols()
            && self.mat == other.mat
    }
}

macro_rules! impl_elementwise_assign {
    ($Trait:ident :: $method:ident) => {
        impl<'a, T: Scalar> $Trait<&'a DenseMatrix<T>> for DenseMatrix<T> {
            fn $method(&mut self, rhs: &'a DenseMatrix<T>) {
                for (row, rhs_row) in self.mat.iter_mut().zip_eq(&rhs.mat) {
                    for (x, &y) in row.iter_mut().zip_eq(rhs_row) {
                        $Trait::$method(x, y);
                    }
                }
            }
        }

        impl<T: Scalar> $Trait<T> for DenseMatrix<T> {
            fn $method(&mut self, rhs: T) {
                for row in &mut self.mat {
                    for x in row {
                        $Trait::$method(x, rhs);
                    }
                }
            }
        }
    };
}

impl_elementwise_assign!{AddAssign::add_assign}
impl_elementwise_assign!{SubAssign::sub_assign}
impl_elementwise_assign!{MulAssign::mul_assign}
impl_elementwise_assign!{DivAssign::div_assign}

macro_rules! impl_elementwise_binary {
    ($Trait:ident :: $method:ident, $AssignTrait:ident :: $assign:ident) => {
        impl<'a, 'b, T: Scalar> $Trait<&'b DenseMatrix<T>> for &'a DenseMatrix<T> {
            type Output = DenseMatrix<T>;

            fn $method(self, rhs: &'b DenseMatrix<T>) -> DenseMatrix<T> {
                let mut tmp = self.clone();
                $AssignTrait::$assign(&mut tmp, rhs);
                tmp
            }
        }

        impl<'a, T: Scalar> $Trait<T> for &'a DenseMatrix<T> {
            type Output = DenseMatrix<T>;

            fn $method(self, rhs: T) -> DenseMatrix<T> {
                let mut tmp = self.clone();
                $AssignTrait::$assign(&mut tmp, rhs);
                tmp
            }
        }
    };
}

impl_elementwise_binary!{Add::add, AddAssign::add_assign}
impl_elementwise_binary!{Sub::sub, SubAssign::sub_assign}
impl_elementwise_binary!{Mul::mul, MulAssign::mul_assign}
impl_elementwise_binary!{Div::div, DivAssign::div_assign}

/// Execution strategy for [`DenseMatrix::mult_with`].
///
/// Chosen at call time so that both paths are always compiled and
/// testable; there is no build flag involved.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MultStrategy {
    Sequential,
    /// Partition the rows into `threads` contiguous blocks, one worker
    /// thread per block. Workers write disjoint output slices and are
    /// joined before the call returns.
    Threaded { threads: usize },
}

impl LinearOperator for DenseMatrix<f64> {
    fn rows(&self) -> usize { DenseMatrix::rows(self) }

    fn cols(&self) -> usize { DenseMatrix::cols(self) }

    fn clear(&mut self) { DenseMatrix::clear(self) }

    fn mult(&self, b: &[f64]) -> FailResult<Vec<f64>> {
        DenseMatrix::mult(self, b)
    }

    fn trans_mult(&self, b: &[f64]) -> FailResult<Vec<f64>> {
        DenseMatrix::trans_mult(self, b)
    }

    fn save(&self, path: &Path) -> FailResult<()> {
        crate::io::write_matrix(self, path, crate::io::IoFormat::Binary, crate::io::DEFAULT_MATRIX_SUFFIX)
    }
}

// ---------------------------------------------------------------------------

/// Scale row `i`, column `j` by `l[i] * r[j]`: an outer-product scaling,
/// e.g. row weights times column (parameter) scales.
///
/// Fails unless `l.len() == rows()` and `r.len() == cols()`.
pub fn scale_matrix<T: Scalar>(a: &mut DenseMatrix<T>, l: &[T], r: &[T]) -> FailResult<()> {
    check_len("scale_matrix", a.rows(), l.len())?;
    check_len("scale_matrix", a.cols(), r.len())?;
    for (i, &li) in l.iter().enumerate() {
        for (x, &rj) in a[i].iter_mut().zip(r) {
            *x *= li * rj;
        }
    }
    Ok(())
}

/// Add the outer product of `u` and `v` in place: `a[i][j] += u[i] * v[j]`.
///
/// Fails unless `u.len() == rows()` and `v.len() == cols()`.
pub fn rank1_update<T: Scalar>(a: &mut DenseMatrix<T>, u: &[T], v: &[T]) -> FailResult<()> {
    check_len("rank1_update", a.rows(), u.len())?;
    check_len("rank1_update", a.cols(), v.len())?;
    for (i, &ui) in u.iter().enumerate() {
        for (x, &vj) in a[i].iter_mut().zip(v) {
            *x += ui * vj;
        }
    }
    Ok(())
}

/// Left-right mirror: every row reversed. Row flags start fresh.
pub fn fliplr<T: Scalar>(m: &DenseMatrix<T>) -> DenseMatrix<T> {
    let mut out = DenseMatrix::default();
    for i in 0..m.rows() {
        let mut row = m[i].clone();
        row.reverse();
        out.push_row(row);
    }
    out
}

/// Determinant. A stub: only 2x2 and 3x3 matrices are supported.
pub fn det<T: Scalar>(a: &DenseMatrix<T>) -> FailResult<T> {
    match (a.rows(), a.cols()) {
        (2, 2) => Ok(a[0][0] * a[1][1] - a[0][1] * a[1][0]),
        (3, 3) => Ok(
            a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
                - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
                + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]),
        ),
        (rows, cols) => Err(UnsupportedDims { op: "det", rows, cols }.into()),
    }
}

/// Inverse, as adjugate over determinant. A stub: only 2x2 and 3x3.
///
/// Like the fixed-size `Mat3` inverse there is no singularity check; a
/// zero determinant produces non-finite values.
pub fn inv<T: Scalar>(a: &DenseMatrix<T>) -> FailResult<DenseMatrix<T>> {
    let mut out = DenseMatrix::new(a.rows(), a.cols());
    match (a.rows(), a.cols()) {
        (2, 2) => {
            out[0][0] = a[1][1];
            out[1][0] = -a[1][0];
            out[0][1] = -a[0][1];
            out[1][1] = a[0][0];
        },
        (3, 3) => {
            out[0][0] = a[1][1] * a[2][2] - a[1][2] * a[2][1];
            out[1][0] = -(a[1][0] * a[2][2] - a[1][2] * a[2][0]);
            out[2][0] = a[1][0] * a[2][1] - a[1][1] * a[2][0];
            out[0][1] = -(a[0][1] * a[2][2] - a[0][2] * a[2][1]);
            out[1][1] = a[0][0] * a[2][2] - a[0][2] * a[2][0];
            out[2][1] = -(a[0][0] * a[2][1] - a[0][1] * a[2][0]);
            out[0][2] = a[0][1] * a[1][2] - a[0][2] * a[1][1];
            out[1][2] = -(a[0][0] * a[1][2] - a[0][2] * a[1][0]);
            out[2][2] = a[0][0] * a[1][1] - a[0][1] * a[1][0];
        },
        (rows, cols) => return Err(UnsupportedDims { op: "inv", rows, cols }.into()),
    }
    let d = det(a)?;
    out /= d;
    Ok(out)
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn example_2x3() -> DenseMatrix {
        DenseMatrix::from_rows(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
        ])
    }

    #[test]
    fn construction_and_shape() {
        let a = DenseMatrix::<f64>::new(2, 3);
        assert_eq!(a.rows(), 2);
        assert_eq!(a.cols(), 3);
        assert_eq!(a[1], vec![0.0; 3]);
        assert_eq!(a.row_flag(), &[false, false]);

        let empty = DenseMatrix::<f64>::default();
        assert_eq!(empty.rows(), 0);
        assert_eq!(empty.cols(), 0);
    }

    #[test]
    fn resize_keeps_fitting_content_and_zeroes_the_rest() {
        let mut a = example_2x3();
        a.resize(3, 2);
        assert_eq!(a[0], vec![1.0, 2.0]);
        assert_eq!(a[1], vec![4.0, 5.0]);
        assert_eq!(a[2], vec![0.0, 0.0]);
        assert_eq!(a.row_flag().len(), 3);
    }

    #[test]
    fn push_row_grows_flags() {
        let mut a = DenseMatrix::<f64>::default();
        a.push_row(vec![1.0, 2.0]);
        a.push_row(vec![3.0, 4.0]);
        assert_eq!(a.rows(), 2);
        assert_eq!(a.row_flag().len(), 2);
        assert_eq!(a.back_mut().unwrap(), &vec![3.0, 4.0]);
    }

    #[test]
    fn ragged_rows_are_tolerated_and_cols_comes_from_row_zero() {
        let a = DenseMatrix::from_rows(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0],
        ]);
        assert_eq!(a.cols(), 3);
    }

    #[test]
    fn checked_accessors() {
        let mut a = example_2x3();

        assert_eq!(a.row(1).unwrap(), &[4.0, 5.0, 6.0][..]);
        assert!(a.row(2).is_err());
        assert!(a.row_mut(7).is_err());

        assert_eq!(*a.val(0, 2).unwrap(), 3.0);
        assert!(a.val(0, 3).is_err());

        a.set_val(1, 0, -4.0).unwrap();
        assert_eq!(a[1][0], -4.0);
        assert!(a.set_val(2, 0, 0.0).is_err());

        a.set_row(&[7.0, 8.0, 9.0], 0).unwrap();
        assert_eq!(a[0], vec![7.0, 8.0, 9.0]);
        assert!(a.set_row(&[1.0], 0).is_err(), "wrong length must fail");
        assert!(a.set_row(&[1.0, 2.0, 3.0], 5).is_err());
    }

    #[test]
    fn column_access() {
        let a = example_2x3();
        assert_eq!(a.col(1).unwrap(), vec![2.0, 5.0]);
        assert!(a.col(3).is_err());

        let mut a = a;
        a.set_col(2, &[30.0, 60.0]).unwrap();
        assert_eq!(a.col(2).unwrap(), vec![30.0, 60.0]);

        // shorter vector writes a prefix
        a.set_col(0, &[-1.0]).unwrap();
        assert_eq!(a[0][0], -1.0);
        assert_eq!(a[1][0], 4.0);

        assert!(a.set_col(9, &[0.0, 0.0]).is_err());
        assert!(a.set_col(0, &[1.0, 2.0, 3.0]).is_err(), "longer than rows must fail");
    }

    #[test]
    fn mult_concrete_scenario() {
        let a = example_2x3();
        assert_eq!(a.mult(&[1.0, 0.0, 1.0]).unwrap(), vec![4.0, 10.0]);
        assert_eq!(a.trans_mult(&[1.0, 1.0]).unwrap(), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn mult_shape_errors() {
        let a = DenseMatrix::<f64>::new(3, 4);
        assert!(a.mult(&[0.0; 3]).is_err());
        assert!(a.mult(&[0.0; 5]).is_err());
        assert_eq!(a.mult(&[0.0; 4]).unwrap().len(), 3);

        assert!(a.trans_mult(&[0.0; 4]).is_err());
        assert_eq!(a.trans_mult(&[0.0; 3]).unwrap().len(), 4);
    }

    #[test]
    fn trans_mult_matches_literal_double_loop() {
        let a = DenseMatrix::from_rows(vec![
            vec![0.1, -2.0, 3.5],
            vec![4.25, 5.0, -6.125],
        ]);
        let b = vec![1.5, -0.25, 2.0];
        let ab = a.mult(&b).unwrap();

        let back = a.trans_mult(&ab).unwrap();
        let mut expected = vec![0.0; 3];
        for i in 0..2 {
            for j in 0..3 {
                expected[j] += a[i][j] * ab[i];
            }
        }
        // bit-for-bit: same summation order
        assert_eq!(back, expected);
    }

    #[test]
    fn mult_range_windows_the_operand() {
        let a = example_2x3();
        let b = [9.0, 9.0, 1.0, 0.0, 1.0, 9.0];
        assert_eq!(a.mult_range(&b, 2, 5).unwrap(), vec![4.0, 10.0]);

        assert!(a.mult_range(&b, 0, 2).is_err(), "window narrower than cols");
        assert!(a.mult_range(&b, 4, 7).is_err(), "window past the end");
    }

    #[test]
    fn threaded_mult_agrees_with_sequential() {
        let rows = 17;
        let cols = 5;
        let mut a = DenseMatrix::<f64>::new(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                a[i][j] = ::rand::random::<f64>() - 0.5;
            }
        }
        let b: Vec<f64> = (0..cols).map(|_| ::rand::random::<f64>()).collect();

        let sequential = a.mult(&b).unwrap();
        for &threads in &[1, 2, 3, 7, 32] {
            let threaded = a.mult_with(&b, MultStrategy::Threaded { threads }).unwrap();
            assert_eq!(sequential, threaded, "threads = {}", threads);
        }

        assert!(a.mult_with(&[0.0; 3], MultStrategy::Threaded { threads: 2 }).is_err());
    }

    #[test]
    fn compound_and_binary_arithmetic() {
        let a = example_2x3();
        let mut b = a.clone();

        b += &a;
        assert_eq!(b, &a * 2.0);

        b -= &a;
        assert_eq!(b, a);

        b *= 3.0;
        b /= 3.0;
        assert_eq!(b, a);

        let sum = &a + &a;
        let quot = &sum / 2.0;
        assert_eq!(quot, a);

        let prod = &a * &a;
        assert_eq!(prod[1], vec![16.0, 25.0, 36.0]);
        let div = &prod / &a;
        assert_eq!(div, a);

        let shifted = &a + 1.0;
        assert_eq!(shifted[0], vec![2.0, 3.0, 4.0]);
        let diff = &shifted - 1.0;
        assert_eq!(diff, a);
    }

    #[test]
    fn equality_ignores_row_flags() {
        let a = example_2x3();
        let mut b = a.clone();
        b.row_flag_mut()[0] = true;
        assert_eq!(a, b);

        let c = DenseMatrix::<f64>::new(2, 3);
        assert_ne!(a, c);
        assert_ne!(a, DenseMatrix::<f64>::new(3, 3));
    }

    #[test]
    fn scale_matrix_is_an_outer_product_scaling() {
        let mut a = example_2x3();
        let orig = a.clone();
        let l = [2.0, -1.0];
        let r = [1.0, 10.0, 100.0];
        scale_matrix(&mut a, &l, &r).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(a[i][j], orig[i][j] * l[i] * r[j]);
            }
        }

        assert!(scale_matrix(&mut a, &[1.0], &r).is_err());
        assert!(scale_matrix(&mut a, &l, &[1.0]).is_err());
    }

    #[test]
    fn rank1_update_adds_the_outer_product() {
        let mut a = example_2x3();
        let orig = a.clone();
        let u = [3.0, -2.0];
        let v = [1.0, 0.5, 0.25];
        rank1_update(&mut a, &u, &v).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(a[i][j], orig[i][j] + u[i] * v[j]);
            }
        }

        assert!(rank1_update(&mut a, &u, &[1.0]).is_err());
        assert!(rank1_update(&mut a, &[1.0, 2.0, 3.0], &v).is_err());
    }

    #[test]
    fn round_to_tolerance() {
        let mut a = DenseMatrix::from_rows(vec![vec![0.123, 4.56], vec![-7.891, 0.0]]);
        a.round(0.5);
        assert_eq!(a[0], vec![0.0, 4.5]);
        assert_eq!(a[1], vec![-8.0, 0.0]);
    }

    #[test]
    fn cast_narrows_explicitly() {
        let a = example_2x3();
        let f: DenseMatrix<f32> = a.cast();
        assert_eq!(f[1], vec![4.0f32, 5.0, 6.0]);
        assert_eq!(f.row_flag().len(), 2);
    }

    #[test]
    fn fliplr_mirrors_each_row() {
        let flipped = fliplr(&example_2x3());
        assert_eq!(flipped[0], vec![3.0, 2.0, 1.0]);
        assert_eq!(flipped[1], vec![6.0, 5.0, 4.0]);
    }

    #[test]
    fn small_determinants_and_inverses() {
        let a = DenseMatrix::from_rows(vec![
            vec![7.0, 2.0],
            vec![-11.0, 4.0],
        ]);
        assert_eq!(det(&a).unwrap(), 50.0);

        let ai = inv(&a).unwrap();
        let expected = DenseMatrix::from_rows(vec![
            vec![2.0 / 25.0, -1.0 / 25.0],
            vec![11.0 / 50.0, 7.0 / 50.0],
        ]);
        for i in 0..2 {
            for j in 0..2 {
                assert!((ai[i][j] - expected[i][j]).abs() < 1e-12);
            }
        }

        let b = DenseMatrix::from_rows(vec![
            vec![1.0, 2.0, 4.0],
            vec![5.0, 2.0, 1.0],
            vec![3.0, 6.0, 3.0],
        ]);
        let bi = inv(&b).unwrap();
        // b * bi should be the identity
        for c in 0..3 {
            let col = b.mult(&bi.col(c).unwrap()).unwrap();
            for r in 0..3 {
                let want = if r == c { 1.0 } else { 0.0 };
                assert!((col[r] - want).abs() < 1e-12);
            }
        }

        assert!(det(&example_2x3()).is_err());
        assert!(inv(&DenseMatrix::<f64>::new(4, 4)).is_err());
    }

    #[test]
    fn works_as_a_linear_operator() {
        let boxed: Box<dyn LinearOperator> = Box::new(example_2x3());
        assert_eq!(boxed.rows(), 2);
        assert_eq!(boxed.cols(), 3);
        assert_eq!(boxed.mult(&[1.0, 0.0, 1.0]).unwrap(), vec![4.0, 10.0]);
        assert_eq!(boxed.trans_mult(&[1.0, 1.0]).unwrap(), vec![5.0, 7.0, 9.0]);
    }
}
