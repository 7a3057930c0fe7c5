#![allow(non_snake_case)]

// These tests run the native MUMPS libraries, located through
// MUMPS_LIB_DIR or the system search path.  Run them with
// `cargo test -- --ignored`.

use mumpsrs::{algebra::*, solver::*};
use num_complex::Complex;

fn basic_unsymmetric_data() -> CooMatrix<f64> {
    // A = [4. 2.]
    //     [1. 3.]
    CooMatrix::new(
        2,                    // m
        2,                    // n
        vec![0, 1, 0, 1],     // rows
        vec![0, 0, 1, 1],     // cols
        vec![4., 1., 2., 3.], // vals
    )
    .unwrap()
}

fn basic_symmetric_data() -> CooMatrix<f64> {
    // A = [4. 1.]
    //     [1. 3.]
    CooMatrix::new(
        2,
        2,
        vec![0, 1, 0, 1],
        vec![0, 0, 1, 1],
        vec![4., 1., 1., 3.],
    )
    .unwrap()
}

fn assert_close(x: &[f64], y: &[f64], tol: f64) {
    assert_eq!(x.len(), y.len());
    for (a, b) in x.iter().zip(y) {
        assert!((a - b).abs() <= tol, "{x:?} != {y:?}");
    }
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_unsymmetric_solve() {
    let A = basic_unsymmetric_data();
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    assert!(solver.version().is_supported());
    assert_eq!(solver.phase(), Phase::Initialized);

    solver.set_matrix(&A).unwrap();
    let x = solver.factorize_solve(&[1., 2.]).unwrap();
    assert_close(&x, &[-0.1, 0.7], 1e-12);
    assert_eq!(solver.phase(), Phase::Factorized);
    assert_eq!(solver.infog(1).unwrap(), 0);
    assert_eq!(solver.solution().unwrap(), x.as_slice());
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_separate_phases() {
    let A = basic_unsymmetric_data();
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    solver.set_matrix(&A).unwrap();

    // no factorization yet
    assert!(matches!(
        solver.solve(&[1., 2.]),
        Err(MumpsError::NotFactorized)
    ));

    solver.analyse().unwrap();
    assert_eq!(solver.phase(), Phase::Analysed);
    solver.factorize().unwrap();
    assert_eq!(solver.phase(), Phase::Factorized);

    // the factorization is reused
    let x = solver.solve(&[1., 2.]).unwrap();
    assert_close(&x, &[-0.1, 0.7], 1e-12);
    let x = solver.solve(&[4., 2.]).unwrap();
    assert_close(&x, &[0.8, 0.4], 1e-12);

    // a new matrix starts over
    solver.set_matrix(&basic_symmetric_data()).unwrap();
    assert_eq!(solver.phase(), Phase::Initialized);
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_multiple_rhs() {
    let A = basic_unsymmetric_data();
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    solver.set_matrix(&A).unwrap();

    let x = solver.factorize_solve(&[1., 2., 4., 2.]).unwrap();
    assert_close(&x, &[-0.1, 0.7, 0.8, 0.4], 1e-12);
    assert_eq!(solver.summary.nrhs, 2);

    assert!(matches!(
        solver.set_rhs(&[1., 2., 3.]),
        Err(MumpsError::DimensionMismatch { what: "rhs", .. })
    ));
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_symmetric_modes() {
    for symmetry in [MatrixSymmetry::PositiveDefinite, MatrixSymmetry::GeneralSymmetric] {
        let settings = MumpsSettingsBuilder::default()
            .symmetry(symmetry)
            .build()
            .unwrap();
        let mut solver = MumpsSolver::<f64>::new(settings).unwrap();

        // the full matrix is given, only its upper triangle is passed on
        solver.set_matrix(&basic_symmetric_data()).unwrap();
        assert_eq!(solver.summary.nnz, 3);

        let x = solver.factorize_solve(&[1., 2.]).unwrap();
        assert_close(&x, &[1. / 11., 7. / 11.], 1e-12);
    }
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_triplets_and_csc_input() {
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();

    solver
        .set_triplets(2, &[1, 2, 1, 2], &[1, 1, 2, 2], &[4., 1., 2., 3.])
        .unwrap();
    let x = solver.factorize_solve(&[1., 2.]).unwrap();
    assert_close(&x, &[-0.1, 0.7], 1e-12);

    let A = CscMatrix::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![4., 1., 2., 3.]);
    solver.set_matrix_csc(&A).unwrap();
    let x = solver.factorize_solve(&[1., 2.]).unwrap();
    assert_close(&x, &[-0.1, 0.7], 1e-12);

    assert!(matches!(
        solver.set_triplets(2, &[1, 3], &[1, 1], &[1., 1.]),
        Err(MumpsError::IndexOutOfRange { what: "irn", index: 3, .. })
    ));
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_complex_solve() {
    // A = diag(1+i, 2)
    let A = CooMatrix::new(
        2,
        2,
        vec![0, 1],
        vec![0, 1],
        vec![Complex::new(1., 1.), Complex::new(2., 0.)],
    )
    .unwrap();
    let b = [Complex::new(2., 0.), Complex::new(4., 0.)];

    let mut solver = MumpsSolver::<Complex<f64>>::new(MumpsSettings::default()).unwrap();
    assert_eq!(solver.arithmetic(), Arithmetic::ComplexDouble);
    solver.set_matrix(&A).unwrap();
    let x = solver.factorize_solve(&b).unwrap();

    assert!((x[0] - Complex::new(1., -1.)).norm() < 1e-12);
    assert!((x[1] - Complex::new(2., 0.)).norm() < 1e-12);
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_single_precision_solve() {
    let A = CooMatrix::new(2, 2, vec![0, 1, 0, 1], vec![0, 0, 1, 1], vec![4f32, 1., 2., 3.])
        .unwrap();
    let mut solver = MumpsSolver::<f32>::new(MumpsSettings::default()).unwrap();
    solver.set_matrix(&A).unwrap();
    let x = solver.factorize_solve(&[1., 2.]).unwrap();
    assert!((x[0] + 0.1).abs() < 1e-5);
    assert!((x[1] - 0.7).abs() < 1e-5);
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_determinant() {
    let settings = MumpsSettingsBuilder::default()
        .compute_determinant(true)
        .build()
        .unwrap();
    let mut solver = MumpsSolver::<f64>::new(settings).unwrap();
    solver.set_matrix(&basic_unsymmetric_data()).unwrap();
    solver.factorize().unwrap();

    let det = solver.determinant().unwrap().unwrap();
    assert!((det - 10.).abs() < 1e-10);

    // not requested
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    solver.set_matrix(&basic_unsymmetric_data()).unwrap();
    solver.factorize().unwrap();
    assert_eq!(solver.determinant().unwrap(), None);
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_singular_matrix() {
    let A = CooMatrix::new(2, 2, vec![0, 1, 0, 1], vec![0, 0, 1, 1], vec![1., 1., 1., 1.])
        .unwrap();
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    solver.set_matrix(&A).unwrap();

    match solver.factorize() {
        Err(MumpsError::Solver { job, infog1, .. }) => {
            assert_eq!(job, Job::AnalyseFactorize);
            assert_eq!(infog1, -10);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(solver.phase() < Phase::Factorized);
    assert_eq!(solver.summary.infog1, -10);
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_controls_and_info() {
    let settings = MumpsSettingsBuilder::default()
        .mem_relax(35)
        .icntl(vec![(24, 1)])
        .cntl(vec![(3, 1e-10)])
        .build()
        .unwrap();
    let mut solver = MumpsSolver::<f64>::new(settings).unwrap();

    assert_eq!(solver.icntl(14).unwrap(), 35);
    assert_eq!(solver.icntl(24).unwrap(), 1);
    assert_eq!(solver.cntl(3).unwrap(), 1e-10);
    assert_eq!(solver.icntl(1).unwrap(), -1);

    solver.set_verbose().unwrap();
    assert_eq!(solver.icntl(4).unwrap(), 2);
    solver.set_silent().unwrap();
    assert_eq!(solver.icntl(4).unwrap(), 0);

    assert!(matches!(
        solver.icntl(0),
        Err(MumpsError::Settings(SettingsError::BadControlIndex { .. }))
    ));
    assert!(solver.infog(1000).is_err());

    solver.set_matrix(&basic_unsymmetric_data()).unwrap();
    solver.factorize().unwrap();
    assert_eq!(solver.deficiency().unwrap(), 0);
    assert!(solver.rinfog(1).unwrap() >= 0.);

    // settings fixed at initialization
    let new = MumpsSettings {
        symmetry: MatrixSymmetry::GeneralSymmetric,
        ..solver.settings().clone()
    };
    assert!(solver.update_settings(new).is_err());
    let new = MumpsSettings {
        mem_relax: 50,
        ..solver.settings().clone()
    };
    solver.update_settings(new).unwrap();
    assert_eq!(solver.icntl(14).unwrap(), 50);
}

#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_run_preconditions() {
    let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
    assert!(matches!(solver.run(Job::Analyse), Err(MumpsError::NoMatrix)));
    assert!(matches!(solver.run(Job::Init), Err(MumpsError::InvalidJob(Job::Init))));

    solver.set_matrix(&basic_unsymmetric_data()).unwrap();
    assert!(matches!(solver.run(Job::Solve), Err(MumpsError::NoRhs)));

    solver.set_rhs(&[1., 2.]).unwrap();
    solver.run(Job::AnalyseFactorizeSolve).unwrap();
    assert_close(solver.solution().unwrap(), &[-0.1, 0.7], 1e-12);
}
