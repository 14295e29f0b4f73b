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

//! Small fixed-size types for coordinate-transform-style computations.
//!
//! `Mat3` is a flat, row-major 3x3 matrix; `V3` is its companion
//! 3-vector. Everything here is a plain `Copy` value with no dynamic
//! resources; the big resizable matrix lives elsewhere.

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;
extern crate num_traits;

use ::std::fmt;
use ::std::ops::{Add, Sub, Mul, Div, Neg, Deref, DerefMut};
use ::std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};
use ::std::ops::{Index, IndexMut};

use ::num_traits::Float;

// ---------------------------------------------------------------------------

/// A 3-dimensional vector with operations for linear algebra.
#[derive(Copy, Clone, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct V3<X = f64>(pub [X; 3]);

impl<X> Deref for V3<X> {
    type Target = [X; 3];

    #[inline(always)]
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<X> DerefMut for V3<X> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

// forward the debug impl without a surrounding "V3(...)"
impl<X: fmt::Debug> fmt::Debug for V3<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<X: Float> V3<X> {
    /// Get a zero vector.
    #[inline(always)]
    pub fn zero() -> Self { V3([X::zero(); 3]) }

    /// Get the inner product of two vectors.
    #[inline]
    pub fn dot(&self, other: &Self) -> X {
        self[0] * other[0] + self[1] * other[1] + self[2] * other[2]
    }
}

impl<X> V3<X> {
    /// Map each element.
    #[inline]
    pub fn map<B, F>(self, f: F) -> V3<B>
    where F: FnMut(X) -> B,
    {
        let [a, b, c] = self.0;
        let mut f = f;
        V3([f(a), f(b), f(c)])
    }
}

impl<X: Float> Add for V3<X> {
    type Output = V3<X>;

    fn add(self, rhs: V3<X>) -> V3<X> {
        V3([self[0] + rhs[0], self[1] + rhs[1], self[2] + rhs[2]])
    }
}

impl<X: Float> Sub for V3<X> {
    type Output = V3<X>;

    fn sub(self, rhs: V3<X>) -> V3<X> {
        V3([self[0] - rhs[0], self[1] - rhs[1], self[2] - rhs[2]])
    }
}

impl<X: Float> Mul<X> for V3<X> {
    type Output = V3<X>;

    fn mul(self, rhs: X) -> V3<X> {
        V3([self[0] * rhs, self[1] * rhs, self[2] * rhs])
    }
}

impl<X: Float> Div<X> for V3<X> {
    type Output = V3<X>;

    fn div(self, rhs: X) -> V3<X> {
        V3([self[0] / rhs, self[1] / rhs, self[2] / rhs])
    }
}

impl<X: Float> Neg for V3<X> {
    type Output = V3<X>;

    fn neg(self) -> V3<X> {
        V3([-self[0], -self[1], -self[2]])
    }
}

// ---------------------------------------------------------------------------

/// A 3x3 matrix stored flat as 9 scalars in row-major order.
///
/// Carries a validity flag for free use by callers (e.g. to mark a
/// transform as actually computed); the flag starts out `false` and is
/// ignored by all arithmetic here.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mat3<X = f64> {
    mat: [X; 9],
    valid: bool,
}

impl<X: Float> Default for Mat3<X> {
    fn default() -> Self { Mat3::zero() }
}

impl<X: Float> Mat3<X> {
    /// The zero matrix.
    #[inline]
    pub fn zero() -> Self {
        Mat3 { mat: [X::zero(); 9], valid: false }
    }

    /// The identity matrix.
    #[inline]
    pub fn eye() -> Self {
        let o = X::one();
        let z = X::zero();
        Mat3::from_flat([o, z, z, z, o, z, z, z, o])
    }

    /// Construct from three rows.
    #[inline]
    pub fn from_rows(rows: [[X; 3]; 3]) -> Self {
        let [[a, b, c], [d, e, f], [g, h, i]] = rows;
        Mat3::from_flat([a, b, c, d, e, f, g, h, i])
    }

    /// Construct from the flat row-major element array.
    #[inline]
    pub fn from_flat(mat: [X; 9]) -> Self {
        Mat3 { mat, valid: false }
    }

    /// Zero all nine elements. The validity flag is untouched.
    pub fn clear(&mut self) {
        self.mat = [X::zero(); 9];
    }

    /// Row `i` as a vector. Panics unless `i < 3`.
    #[inline]
    pub fn row(&self, i: usize) -> V3<X> {
        V3([self.mat[i * 3], self.mat[i * 3 + 1], self.mat[i * 3 + 2]])
    }

    /// Column `i` as a vector. Panics unless `i < 3`.
    #[inline]
    pub fn col(&self, i: usize) -> V3<X> {
        V3([self.mat[i], self.mat[3 + i], self.mat[6 + i]])
    }

    /// Overwrite row `i`. Panics unless `i < 3`.
    #[inline]
    pub fn set_row(&mut self, v: V3<X>, i: usize) {
        self.mat[i * 3] = v[0];
        self.mat[i * 3 + 1] = v[1];
        self.mat[i * 3 + 2] = v[2];
    }

    /// Matrix determinant, by cofactor expansion along the first row.
    #[inline]
    pub fn det(&self) -> X { det(self) }
}

impl<X> Mat3<X> {
    #[inline(always)]
    pub fn valid(&self) -> bool { self.valid }

    #[inline(always)]
    pub fn set_valid(&mut self, v: bool) { self.valid = v; }
}

impl<X> Index<usize> for Mat3<X> {
    type Output = X;

    #[inline(always)]
    fn index(&self, i: usize) -> &X { &self.mat[i] }
}

impl<X> IndexMut<usize> for Mat3<X> {
    #[inline(always)]
    fn index_mut(&mut self, i: usize) -> &mut X { &mut self.mat[i] }
}

macro_rules! impl_mat3_scalar_assign {
    ($($Trait:ident :: $method:ident,)*) => {$(
        impl<X: Float + $Trait> $Trait<X> for Mat3<X> {
            fn $method(&mut self, rhs: X) {
                for x in &mut self.mat {
                    $Trait::$method(x, rhs);
                }
            }
        }
    )*};
}

impl_mat3_scalar_assign!{
    AddAssign::add_assign,
    SubAssign::sub_assign,
    MulAssign::mul_assign,
    DivAssign::div_assign,
}

impl<X: Float> Mul<V3<X>> for Mat3<X> {
    type Output = V3<X>;

    fn mul(self, b: V3<X>) -> V3<X> {
        &self * b
    }
}

impl<'a, X: Float> Mul<V3<X>> for &'a Mat3<X> {
    type Output = V3<X>;

    fn mul(self, b: V3<X>) -> V3<X> {
        let a = &self.mat;
        V3([
            a[0] * b[0] + a[1] * b[1] + a[2] * b[2],
            a[3] * b[0] + a[4] * b[1] + a[5] * b[2],
            a[6] * b[0] + a[7] * b[1] + a[8] * b[2],
        ])
    }
}

impl<X: fmt::Display> fmt::Display for Mat3<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..3 {
            writeln!(f, "{} {} {}",
                self.mat[i * 3], self.mat[i * 3 + 1], self.mat[i * 3 + 2])?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------

/// Determinant of a 2x2 matrix given as four scalars.
#[inline]
pub fn det2<X: Float>(a: X, b: X, c: X, d: X) -> X {
    a * d - b * c
}

/// Determinant of a 3x3 matrix, by cofactor expansion along the first row.
#[inline]
pub fn det<X: Float>(a: &Mat3<X>) -> X {
    a[0] * (a[4] * a[8] - a[5] * a[7])
        - a[1] * (a[3] * a[8] - a[5] * a[6])
        + a[2] * (a[3] * a[7] - a[4] * a[6])
}

/// Matrix inverse, as adjugate over determinant.
///
/// There is deliberately no singularity check: inverting a matrix whose
/// determinant is zero (or denormal-small) silently produces infinities
/// or NaNs. Guarding against that is the caller's responsibility.
#[inline]
pub fn inv<X: Float>(a: &Mat3<X>) -> Mat3<X> {
    let mut out = Mat3::zero();
    inv_into(a, &mut out);
    out
}

/// Like `inv`, but writes into a caller-supplied output matrix.
///
/// Only the nine elements of `out` are written; its validity flag is
/// left as-is.
pub fn inv_into<X: Float>(a: &Mat3<X>, out: &mut Mat3<X>) {
    out[0] = a[4] * a[8] - a[5] * a[7];
    out[3] = -(a[3] * a[8] - a[5] * a[6]);
    out[6] = a[3] * a[7] - a[4] * a[6];
    out[1] = -(a[1] * a[8] - a[2] * a[7]);
    out[4] = a[0] * a[8] - a[2] * a[6];
    out[7] = -(a[0] * a[7] - a[1] * a[6]);
    out[2] = a[1] * a[5] - a[2] * a[4];
    out[5] = -(a[0] * a[5] - a[2] * a[3]);
    out[8] = a[0] * a[4] - a[1] * a[3];

    // the first-row cofactor product is the determinant
    let rdet = X::one() / (a[0] * out[0] + a[1] * out[3] + a[2] * out[6]);
    for i in 0..9 {
        out[i] = out[i] * rdet;
    }
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat3_close(a: &Mat3, b: &Mat3, tol: f64) {
        for i in 0..9 {
            assert!((a[i] - b[i]).abs() < tol,
                "matrices differ at flat index {}: {} vs {}\n{}\n{}", i, a[i], b[i], a, b);
        }
    }

    #[test]
    fn rows_cols_and_flat_indexing() {
        let m = Mat3::from_rows([
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0],
        ]);
        assert_eq!(m.row(1), V3([4.0, 5.0, 6.0]));
        assert_eq!(m.col(2), V3([3.0, 6.0, 9.0]));
        assert_eq!(m[5], 6.0);

        let mut m = m;
        m.set_row(V3([-1.0, -2.0, -3.0]), 2);
        assert_eq!(m.row(2), V3([-1.0, -2.0, -3.0]));
        assert_eq!(m[6], -1.0);
    }

    #[test]
    fn validity_flag() {
        let mut m = Mat3::<f64>::zero();
        assert!(!m.valid());
        m.set_valid(true);
        assert!(m.valid());
        m.clear();
        assert!(m.valid(), "clear must not touch the validity flag");
    }

    #[test]
    fn scalar_compound_ops() {
        let mut m = Mat3::from_rows([
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0],
        ]);
        m += 1.0;
        assert_eq!(m.row(0), V3([2.0, 3.0, 4.0]));
        m *= 2.0;
        assert_eq!(m.row(2), V3([16.0, 18.0, 20.0]));
        m -= 2.0;
        assert_eq!(m[0], 2.0);
        m /= 2.0;
        assert_eq!(m.row(0), V3([1.0, 2.0, 3.0]));
    }

    #[test]
    fn matrix_vector_product() {
        let m = Mat3::from_rows([
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0],
        ]);
        assert_eq!(m * V3([1.0, 0.0, 1.0]), V3([4.0, 10.0, 16.0]));
        assert_eq!(Mat3::eye() * V3([3.0, -4.0, 5.0]), V3([3.0, -4.0, 5.0]));
    }

    #[test]
    fn determinants() {
        assert_eq!(det2(7.0, 2.0, -11.0, 4.0), 50.0);
        assert_eq!(Mat3::<f64>::eye().det(), 1.0);

        let mut scaled = Mat3::<f64>::eye();
        scaled *= 3.0;
        assert_eq!(scaled.det(), 27.0);

        let singular = Mat3::from_rows([
            [1.0, 2.0, 3.0],
            [2.0, 4.0, 6.0],
            [0.0, 1.0, 1.0],
        ]);
        assert_eq!(det(&singular), 0.0);
    }

    #[test]
    fn inverse_3() {
        let m = Mat3::from_rows([
            [1.0, 2.0, 4.0],
            [5.0, 2.0, 1.0],
            [3.0, 6.0, 3.0],
        ]);
        let expected = Mat3::from_rows([
            [0. / 1., 1. / 4., -1. / 12.],
            [-1. / 6., -1. / 8., 19. / 72.],
            [1. / 3., 0. / 1., -1. / 9.],
        ]);
        assert_mat3_close(&inv(&m), &expected, 1e-12);
    }

    #[test]
    fn inverse_times_original_is_identity() {
        let m = Mat3::from_rows([
            [2.0, 0.0, 1.0],
            [1.0, 3.0, -2.0],
            [0.0, 1.0, 4.0],
        ]);
        let mi = inv(&m);

        // (m * mi) column by column
        for c in 0..3 {
            let col = m * mi.col(c);
            for r in 0..3 {
                let want = if r == c { 1.0 } else { 0.0 };
                assert!((col[r] - want).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn inverse_of_singular_is_nonfinite() {
        let singular = Mat3::from_rows([
            [1.0, 2.0, 3.0],
            [2.0, 4.0, 6.0],
            [0.0, 1.0, 1.0],
        ]);
        let mi = inv(&singular);
        assert!((0..9).any(|i| !mi[i].is_finite()));
    }

    #[test]
    fn display_prints_three_rows() {
        let m = Mat3::from_rows([
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0],
        ]);
        assert_eq!(format!("{}", m), "1 2 3\n4 5 6\n7 8 9\n");
    }
}
