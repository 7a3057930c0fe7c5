use super::{Job, SettingsError};
use crate::algebra::{Arithmetic, SparseFormatError};
use crate::ffi::LibraryError;
use crate::layout::LayoutError;
use thiserror::Error;

/// Error type returned by [`MumpsSolver`](crate::solver::MumpsSolver) operations.
#[derive(Error, Debug)]
pub enum MumpsError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    SparseFormat(#[from] SparseFormatError),
    #[error("Could not find a version number in the MUMPS structure")]
    VersionNotDetected,
    #[error("Library provides {got} arithmetic, the solver needs {expected}")]
    ArithmeticMismatch {
        expected: Arithmetic,
        got: Arithmetic,
    },
    #[error("{0} cannot be requested directly")]
    InvalidJob(Job),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("MUMPS error during {job}: INFOG(1)={infog1}, INFOG(2)={infog2} ({})", describe(.infog1))]
    Solver { job: Job, infog1: i32, infog2: i32 },
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Index {index} out of range 1..={n} in {what}")]
    IndexOutOfRange {
        what: &'static str,
        index: i32,
        n: usize,
    },
    #[error("No matrix has been set")]
    NoMatrix,
    #[error("No right hand side has been set")]
    NoRhs,
    #[error("The matrix has not been factorized")]
    NotFactorized,
    #[error("No Schur complement has been computed")]
    NoSchur,
}

fn describe(infog1: &i32) -> &'static str {
    describe_error(*infog1)
}

/// Short description of the common negative INFOG(1) codes of MUMPS.
pub fn describe_error(infog1: i32) -> &'static str {
    match infog1 {
        -1 => "error on another process",
        -2 => "NZ out of range",
        -3 => "invalid JOB for the current state of the instance",
        -4 => "error in the user provided permutation",
        -5 | -7 | -13 => "memory allocation failed",
        -6 => "matrix is structurally singular",
        -8 | -9 | -14 | -15 => "internal work array too small, increase ICNTL(14)",
        -10 => "matrix is numerically singular",
        -11 => "right hand side or solution array too small",
        -12 => "internal real/complex work array too small",
        -16 => "N out of range",
        -17 => "internal send buffer too small",
        -20 => "internal reception buffer too small",
        -21 => "PAR=0 requires more than one process",
        -22 => "invalid user array pointer",
        -23 => "MPI was not initialised",
        -24 => "NELT out of range",
        -40 => "matrix was declared positive definite but is not",
        -90 | -91 | -92 | -93 | -94 | -95 => "out-of-core error",
        _ => "see the MUMPS user's guide",
    }
}

#[test]
fn test_error_messages() {
    let e = MumpsError::Solver {
        job: Job::Factorize,
        infog1: -10,
        infog2: 0,
    };
    let msg = e.to_string();
    assert!(msg.contains("INFOG(1)=-10"));
    assert!(msg.contains("numerically singular"));

    let e: MumpsError = SparseFormatError::NotSquare.into();
    assert_eq!(e.to_string(), "Matrix is not square");
}
