//! End-to-end walk through the lifecycle an inversion run puts its
//! Jacobian through: build it row by row, multiply both ways inside the
//! iterative solve, persist it across runs, and swap in a cheap
//! regularization operator behind the same interface.

extern crate env_logger;
extern crate failure;
extern crate tellur;
extern crate tempdir;

use ::tellur::{DenseMatrix, IdentityMatrix, LinearOperator, MultStrategy};
use ::tellur::matrix::{io, rank1_update, ShapeMismatch};
use ::tempdir::TempDir;

#[test]
fn jacobian_lifecycle() {
    let _ = ::env_logger::try_init();

    // One sensitivity row per measurement, appended as the forward
    // modelling produces them.
    let sensitivities = vec![
        vec![1.0, 0.5, 0.0],
        vec![0.5, 1.0, 0.5],
        vec![0.0, 0.5, 1.0],
        vec![0.25, 0.25, 0.25],
    ];
    let mut jacobian = DenseMatrix::default();
    for row in &sensitivities {
        jacobian.push_row(row.clone());
    }
    for flag in jacobian.row_flag_mut() {
        *flag = true;
    }
    assert_eq!(jacobian.rows(), 4);
    assert_eq!(jacobian.cols(), 3);

    // Forward and transpose products, sequential and threaded, as an
    // iterative solver would issue them.
    let model = vec![2.0, -1.0, 4.0];
    let predicted = jacobian.mult(&model).unwrap();
    assert_eq!(predicted, vec![1.5, 2.0, 3.5, 1.25]);
    assert_eq!(
        jacobian.mult_with(&model, MultStrategy::Threaded { threads: 2 }).unwrap(),
        predicted,
    );

    let data = vec![1.0, 1.0, 1.0, 1.0];
    assert_eq!(jacobian.trans_mult(&data).unwrap(), vec![1.75, 2.25, 1.75]);

    // A rank-1 broyden-style correction.
    let mut updated = jacobian.clone();
    rank1_update(&mut updated, &[1.0, 0.0, 0.0, 0.0], &[0.0, 0.0, 0.1]).unwrap();
    assert_eq!(updated[0], vec![1.0, 0.5, 0.1]);

    // Persist, then restore in a "second run".
    let dir = TempDir::new("tellur-workflow").unwrap();
    let stored = dir.path().join("jacobian");
    assert!(io::save_matrix(&jacobian, &stored, io::IoFormat::Binary, io::DEFAULT_MATRIX_SUFFIX));

    let restored = DenseMatrix::load(&stored, io::DEFAULT_MATRIX_SUFFIX).unwrap();
    assert_eq!(restored, jacobian);
    assert!(restored.row_flag().iter().all(|&f| f));

    // The regularization slot takes anything behind the operator trait.
    let smoothness = DenseMatrix::from_rows(vec![
        vec![1.0, -1.0, 0.0],
        vec![0.0, 1.0, -1.0],
        vec![0.0, 0.0, 1.0],
    ]);
    let operators: Vec<Box<dyn LinearOperator>> = vec![
        Box::new(smoothness),
        Box::new(IdentityMatrix::new(3, 0.1)),
    ];
    let applied: Vec<Vec<f64>> = operators.iter()
        .map(|op| op.mult(&model).unwrap())
        .collect();
    assert_eq!(applied[0], vec![3.0, -5.0, 4.0]);
    assert_eq!(applied[1], vec![0.2, -0.1, 0.4]);

    // Shape violations surface as typed errors.
    let err = jacobian.mult(&[1.0, 2.0]).unwrap_err();
    let shape = err.downcast::<ShapeMismatch>().unwrap();
    assert_eq!(shape.expected, 3);
    assert_eq!(shape.found, 2);
}
