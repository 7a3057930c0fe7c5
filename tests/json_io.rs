#![allow(non_snake_case)]

#[cfg(feature = "serde")]
#[test]
#[ignore = "requires the MUMPS shared libraries"]
fn test_json_io() {
    use mumpsrs::{algebra::*, solver::*};
    use std::io::{Seek, SeekFrom};

    let A = CooMatrix::new(2, 2, vec![0, 1, 0, 1], vec![0, 0, 1, 1], vec![4., 1., 2., 3.])
        .unwrap();
    let b = [1., 2.];

    let settings = MumpsSettingsBuilder::default().build().unwrap();
    let mut solver = MumpsSolver::<f64>::new(settings).unwrap();
    solver.set_matrix(&A).unwrap();
    let x = solver.factorize_solve(&b).unwrap();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    solver.save_to_file(&mut file).unwrap();

    // read the problem from the file, the stored rhs is the one given
    // rather than the solution
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut solver2 = MumpsSolver::<f64>::load_from_file(&mut file, None).unwrap();
    solver2.run(Job::AnalyseFactorizeSolve).unwrap();
    assert_eq!(solver2.solution().unwrap(), x.as_slice());

    // read the problem from the file with custom settings
    file.seek(SeekFrom::Start(0)).unwrap();
    let settings = MumpsSettingsBuilder::default()
        .compute_determinant(true)
        .build()
        .unwrap();
    let mut solver3 = MumpsSolver::<f64>::load_from_file(&mut file, Some(settings)).unwrap();
    solver3.factorize().unwrap();
    assert!(solver3.determinant().unwrap().is_some());
}
