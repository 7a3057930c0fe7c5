#![allow(non_snake_case)]

use mumpsrs::{algebra::*, solver::*};

fn schur_data() -> CooMatrix<f64> {
    // A = [4. 1. 0.]
    //     [1. 3. 1.]
    //     [0. 1. 2.]
    CooMatrix::new(
        3,
        3,
        vec![0, 1, 0, 1, 2, 1, 2],
        vec![0, 0, 1, 1, 1, 2, 2],
        vec![4., 1., 1., 3., 1., 1., 2.],
    )
    .unwrap()
}

fn residual_norm(A: &CooMatrix<f64>, x: &[f64], b: &[f64]) -> f64 {
    let mut r = b.to_vec();
    for ((&i, &j), &v) in A.rows.iter().zip(&A.cols).zip(&A.vals) {
        r[i] -= v * x[j];
    }
    r.iter().map(|v| v * v).sum::<f64>().sqrt()
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_schur_reduce_and_expand() {
    let A = schur_data();
    let b = [1., 2., 3.];

    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    solver.set_matrix(&A).unwrap();
    solver.set_rhs(&b).unwrap();

    let S = solver.schur_complement(&[2]).unwrap();
    assert_eq!(S.size, 1);
    // S = a22 - a21 inv(A11) a12
    assert!((S.get(0, 0) - 18. / 11.).abs() < 1e-12);
    assert!((S.reduced_rhs[0] - 26. / 11.).abs() < 1e-12);

    // solve the reduced system and expand
    let x2 = [S.reduced_rhs[0] / S.get(0, 0)];
    let x = solver.expand_schur(&x2).unwrap();
    assert!((x[2] - 13. / 9.).abs() < 1e-12);
    assert!(residual_norm(&A, &x, &b) < 1e-12);
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_schur_errors() {
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    assert!(matches!(
        solver.schur_complement(&[0]),
        Err(MumpsError::NoMatrix)
    ));

    solver.set_matrix(&schur_data()).unwrap();
    assert!(matches!(solver.schur_complement(&[0]), Err(MumpsError::NoRhs)));
    assert!(matches!(solver.expand_schur(&[1.]), Err(MumpsError::NoSchur)));

    solver.set_rhs(&[1., 2., 3.]).unwrap();
    assert!(matches!(
        solver.schur_complement(&[3]),
        Err(MumpsError::IndexOutOfRange { index: 4, n: 3, .. })
    ));

    solver.schur_complement(&[1, 2]).unwrap();
    assert!(matches!(
        solver.expand_schur(&[1.]),
        Err(MumpsError::DimensionMismatch { expected: 2, got: 1, .. })
    ));

    // a new matrix drops the complement
    solver.set_matrix(&schur_data()).unwrap();
    assert!(matches!(solver.expand_schur(&[1., 1.]), Err(MumpsError::NoSchur)));
}
