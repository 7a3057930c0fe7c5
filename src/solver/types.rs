#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Fortran handle of `MPI_COMM_WORLD` as understood by MUMPS
pub const USE_COMM_WORLD: i32 = -987654;

/// Operations requested from MUMPS through the `JOB` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Job {
    /// initialise an instance
    Init = -1,
    /// release an instance
    End = -2,
    Analyse = 1,
    Factorize = 2,
    Solve = 3,
    AnalyseFactorize = 4,
    FactorizeSolve = 5,
    AnalyseFactorizeSolve = 6,
}

impl Job {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// timer key of the job
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Job::Init => "init",
            Job::End => "end",
            Job::Analyse => "analyse",
            Job::Factorize => "factorize",
            Job::Solve => "solve",
            Job::AnalyseFactorize => "analyse+factorize",
            Job::FactorizeSolve => "factorize+solve",
            Job::AnalyseFactorizeSolve => "analyse+factorize+solve",
        }
    }

    pub(crate) fn analyses(&self) -> bool {
        matches!(
            self,
            Job::Analyse | Job::AnalyseFactorize | Job::AnalyseFactorizeSolve
        )
    }

    pub(crate) fn factorizes(&self) -> bool {
        matches!(
            self,
            Job::Factorize
                | Job::AnalyseFactorize
                | Job::FactorizeSolve
                | Job::AnalyseFactorizeSolve
        )
    }

    pub(crate) fn solves(&self) -> bool {
        matches!(
            self,
            Job::Solve | Job::FactorizeSolve | Job::AnalyseFactorizeSolve
        )
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (JOB={})", self.name(), self.code())
    }
}

/// Matrix type declared to MUMPS through the `SYM` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatrixSymmetry {
    #[default]
    Unsymmetric,
    /// symmetric positive definite
    PositiveDefinite,
    /// general symmetric
    GeneralSymmetric,
}

impl MatrixSymmetry {
    pub fn code(&self) -> i32 {
        match self {
            MatrixSymmetry::Unsymmetric => 0,
            MatrixSymmetry::PositiveDefinite => 1,
            MatrixSymmetry::GeneralSymmetric => 2,
        }
    }

    pub fn is_symmetric(&self) -> bool {
        !matches!(self, MatrixSymmetry::Unsymmetric)
    }
}

/// Sequential ordering selected with ICNTL(7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ordering {
    Amd,
    /// permutation supplied in `PERM_IN`
    UserProvided,
    Amf,
    Scotch,
    Pord,
    Metis,
    Qamd,
    /// let MUMPS choose
    #[default]
    Auto,
}

impl Ordering {
    pub fn code(&self) -> i32 {
        match self {
            Ordering::Amd => 0,
            Ordering::UserProvided => 1,
            Ordering::Amf => 2,
            Ordering::Scotch => 3,
            Ordering::Pord => 4,
            Ordering::Metis => 5,
            Ordering::Qamd => 6,
            Ordering::Auto => 7,
        }
    }
}

/// Progress of a solver instance through the MUMPS phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// instance initialised, no successful analysis for the current matrix
    Initialized,
    Analysed,
    Factorized,
}

#[test]
fn test_job_phases() {
    assert_eq!(Job::AnalyseFactorize.code(), 4);
    assert!(Job::AnalyseFactorizeSolve.analyses());
    assert!(Job::FactorizeSolve.factorizes());
    assert!(!Job::FactorizeSolve.analyses());
    assert!(!Job::Init.solves());
    assert_eq!(Job::End.to_string(), "end (JOB=-2)");
    assert_eq!(Ordering::default().code(), 7);
    assert_eq!(MatrixSymmetry::GeneralSymmetric.code(), 2);
}
