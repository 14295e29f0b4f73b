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

//! The scaled identity, for use as a cheap regularization operator.

use ::std::path::Path;

use ::tellur_slice_math::{v, V};

use crate::{check_len, FailResult, LinearOperator};
use crate::dense::DenseMatrix;

/// A scaled identity matrix without materialized storage.
///
/// Lets an inversion loop plug a `scale * I` regularization term into a
/// [`LinearOperator`] slot without allocating the N x N dense matrix it
/// nominally stands for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IdentityMatrix {
    size: usize,
    scale: f64,
}

impl Default for IdentityMatrix {
    /// An empty (0 x 0, scale 0) operator.
    fn default() -> Self {
        IdentityMatrix { size: 0, scale: 0.0 }
    }
}

impl IdentityMatrix {
    pub fn new(size: usize, scale: f64) -> Self {
        IdentityMatrix { size, scale }
    }

    pub fn size(&self) -> usize { self.size }

    pub fn scale(&self) -> f64 { self.scale }

    /// The dense matrix this operator stands for.
    fn materialize(&self) -> DenseMatrix<f64> {
        let mut out = DenseMatrix::new(self.size, self.size);
        for i in 0..self.size {
            out[i][i] = self.scale;
        }
        out
    }
}

impl LinearOperator for IdentityMatrix {
    fn rows(&self) -> usize { self.size }

    fn cols(&self) -> usize { self.size }

    fn clear(&mut self) {
        *self = IdentityMatrix::default();
    }

    fn mult(&self, b: &[f64]) -> FailResult<Vec<f64>> {
        check_len("mult", self.size, b.len())?;
        let V(out) = v(b) * self.scale;
        Ok(out)
    }

    fn trans_mult(&self, b: &[f64]) -> FailResult<Vec<f64>> {
        check_len("trans_mult", self.size, b.len())?;
        let V(out) = v(b) * self.scale;
        Ok(out)
    }

    /// Writes the materialized `size x size` scaled identity in the
    /// single-file binary format, so the persisted operator can be
    /// reloaded as a [`DenseMatrix`].
    fn save(&self, path: &Path) -> FailResult<()> {
        LinearOperator::save(&self.materialize(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_its_input() {
        let ident = IdentityMatrix::new(3, 2.5);
        assert_eq!(ident.rows(), 3);
        assert_eq!(ident.cols(), 3);

        let b = [1.0, -2.0, 4.0];
        assert_eq!(ident.mult(&b).unwrap(), vec![2.5, -5.0, 10.0]);
        assert_eq!(ident.trans_mult(&b).unwrap(), vec![2.5, -5.0, 10.0]);
    }

    #[test]
    fn rejects_wrong_lengths() {
        let ident = IdentityMatrix::new(3, 1.0);
        assert!(ident.mult(&[1.0, 2.0]).is_err());
        assert!(ident.mult(&[1.0; 4]).is_err());
        assert!(ident.trans_mult(&[1.0; 2]).is_err());
    }

    #[test]
    fn clear_resets_to_the_empty_operator() {
        let mut ident = IdentityMatrix::new(5, 3.0);
        ident.clear();
        assert_eq!(ident, IdentityMatrix::default());
        assert_eq!(ident.mult(&[]).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn materializes_for_saving() {
        let ident = IdentityMatrix::new(3, 2.0);
        let dense = ident.materialize();
        assert_eq!(dense.rows(), 3);
        for i in 0..3 {
            for j in 0..3 {
                let want = if i == j { 2.0 } else { 0.0 };
                assert_eq!(dense[i][j], want);
            }
        }
    }
}
