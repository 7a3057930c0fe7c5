use mumpsrs::{
    algebra::Arithmetic,
    ffi::{candidate_names, LibraryError, MumpsLibrary},
    solver::*,
};
use num_complex::Complex;

#[test]
fn test_missing_library() {
    let dir = tempfile::tempdir().unwrap();
    let settings = MumpsSettingsBuilder::default()
        .library_dir(dir.path())
        .build()
        .unwrap();

    let err = MumpsSolver::<Complex<f32>>::new(settings).unwrap_err();
    match err {
        MumpsError::Library(LibraryError::LibraryNotFound {
            arithmetic, tried, ..
        }) => {
            assert_eq!(arithmetic, Arithmetic::ComplexSingle);
            assert_eq!(tried.len(), candidate_names(Arithmetic::ComplexSingle).len());
            assert!(tried.iter().all(|t| t.contains("cmumps")));
        }
        _ => panic!("unexpected error {err}"),
    }
}

#[test]
fn test_invalid_settings_fail_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let settings = MumpsSettings {
        mem_relax: -1,
        library_dir: Some(dir.path().to_path_buf()),
        ..MumpsSettings::default()
    };
    let err = MumpsSolver::<f64>::new(settings).unwrap_err();
    assert!(matches!(
        err,
        MumpsError::Settings(SettingsError::BadFieldValue("mem_relax"))
    ));
}

#[test]
fn test_not_a_library() {
    // a file with the right name that is not a shared object
    let dir = tempfile::tempdir().unwrap();
    for name in candidate_names(Arithmetic::Single) {
        std::fs::write(dir.path().join(name), b"not a library").unwrap();
    }
    let err = MumpsLibrary::load(Arithmetic::Single, Some(dir.path())).unwrap_err();
    assert!(matches!(err, LibraryError::LibraryNotFound { .. }));
}
