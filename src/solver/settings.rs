use super::{MatrixSymmetry, Ordering, USE_COMM_WORLD};
use derive_builder::Builder;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// number of ICNTL entries of the most recent MUMPS releases
pub const ICNTL_MAX: usize = 60;
/// number of CNTL entries
pub const CNTL_MAX: usize = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
    /// A 1-based control array index outside the array
    #[error("{array}({index}) is out of range (1 to {max})")]
    BadControlIndex {
        array: &'static str,
        index: usize,
        max: usize,
    },
    /// A setting that is only applied when the instance is created
    #[error("Setting \"{0}\" cannot be changed after initialization")]
    ImmutableSetting(&'static str),
}

/// Settings of a [`MumpsSolver`](crate::solver::MumpsSolver).
///
/// Construct with [`MumpsSettingsBuilder`] or take the [`Default`].
/// Control parameter overrides use the 1-based numbering of the MUMPS
/// user's guide, e.g. `(14, 30)` sets ICNTL(14).
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MumpsSettings {
    ///matrix type (SYM)
    #[builder(default = "MatrixSymmetry::Unsymmetric")]
    pub symmetry: MatrixSymmetry,
    ///Fortran MPI communicator handle (COMM)
    #[builder(default = "USE_COMM_WORLD")]
    pub comm: i32,
    ///host process takes part in the factorization (PAR=1)
    #[builder(default = "true")]
    pub host_working: bool,
    ///let MUMPS print errors, diagnostics and statistics, and print
    ///a summary of each job to the print target
    #[builder(default = "false")]
    pub verbose: bool,
    ///percentage increase of the estimated working space (ICNTL(14))
    #[builder(default = "20")]
    pub mem_relax: i32,
    ///sequential ordering (ICNTL(7))
    #[builder(default = "Ordering::Auto")]
    pub ordering: Ordering,
    ///additional ICNTL values, applied last
    #[builder(default = "Vec::new()")]
    pub icntl: Vec<(usize, i32)>,
    ///additional CNTL values, applied last
    #[builder(default = "Vec::new()")]
    pub cntl: Vec<(usize, f64)>,
    ///directory for out-of-core files (OOC_TMPDIR)
    #[builder(default = "None", setter(strip_option, into))]
    pub ooc_tmpdir: Option<String>,
    ///prefix of out-of-core files (OOC_PREFIX)
    #[builder(default = "None", setter(strip_option, into))]
    pub ooc_prefix: Option<String>,
    ///file to which MUMPS writes the matrix in matrix market format
    ///during analysis (WRITE_PROBLEM)
    #[builder(default = "None", setter(strip_option, into))]
    pub write_problem: Option<String>,
    ///compute the determinant during factorization (ICNTL(33))
    #[builder(default = "false")]
    pub compute_determinant: bool,
    ///directory holding the MUMPS shared libraries.  If unset,
    ///`MUMPS_LIB_DIR` and then the system search path are used
    #[builder(default = "None", setter(strip_option, into))]
    pub library_dir: Option<PathBuf>,
}

impl Default for MumpsSettings {
    fn default() -> MumpsSettings {
        MumpsSettingsBuilder::default().build().unwrap()
    }
}

macro_rules! check_immutable_setting {
    ($self:expr, $prev:expr, $field:ident) => {
        if $self.$field != $prev.$field {
            return Err(SettingsError::ImmutableSetting(stringify!($field)));
        }
    };
}

impl MumpsSettings {
    /// Checks that the settings are valid.  Control array indices must be
    /// within the largest arrays of any supported MUMPS release; the
    /// arrays of the loaded release are checked again when applied.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_mem_relax(self.mem_relax)?;
        validate_icntl(&self.icntl)?;
        validate_cntl(&self.cntl)?;
        Ok(())
    }

    /// check that a settings object is valid as an update of the
    /// settings of an initialized solver.  Values consumed when the
    /// MUMPS instance is created cannot change.
    pub fn validate_as_update(&self, prev: &Self) -> Result<(), SettingsError> {
        self.validate()?;

        check_immutable_setting!(self, prev, symmetry);
        check_immutable_setting!(self, prev, comm);
        check_immutable_setting!(self, prev, host_working);
        check_immutable_setting!(self, prev, library_dir);

        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for MumpsSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        MumpsSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl MumpsSettingsBuilder {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(mem_relax) = self.mem_relax {
            validate_mem_relax(mem_relax)?;
        }
        if let Some(ref icntl) = self.icntl {
            validate_icntl(icntl)?;
        }
        if let Some(ref cntl) = self.cntl {
            validate_cntl(cntl)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_mem_relax(mem_relax: i32) -> Result<(), SettingsError> {
    if mem_relax < 0 {
        return Err(SettingsError::BadFieldValue("mem_relax"));
    }
    Ok(())
}

fn validate_icntl(icntl: &[(usize, i32)]) -> Result<(), SettingsError> {
    for &(index, _) in icntl {
        check_control_index("ICNTL", index, ICNTL_MAX)?;
    }
    Ok(())
}

fn validate_cntl(cntl: &[(usize, f64)]) -> Result<(), SettingsError> {
    for &(index, value) in cntl {
        check_control_index("CNTL", index, CNTL_MAX)?;
        if value.is_nan() {
            return Err(SettingsError::BadFieldValue("cntl"));
        }
    }
    Ok(())
}

pub(crate) fn check_control_index(
    array: &'static str,
    index: usize,
    max: usize,
) -> Result<(), SettingsError> {
    if index == 0 || index > max {
        return Err(SettingsError::BadControlIndex { array, index, max });
    }
    Ok(())
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = MumpsSettingsBuilder::default().build().unwrap();
    assert_eq!(settings.mem_relax, 20);
    assert_eq!(settings.comm, USE_COMM_WORLD);
    assert!(settings.host_working);
    assert!(!settings.verbose);

    // fail on out of range control indices
    assert!(MumpsSettingsBuilder::default()
        .icntl(vec![(0, 1)])
        .build()
        .is_err());
    assert!(MumpsSettingsBuilder::default()
        .cntl(vec![(16, 1.0)])
        .build()
        .is_err());
    assert!(MumpsSettingsBuilder::default()
        .icntl(vec![(60, 1)])
        .cntl(vec![(1, 0.01)])
        .build()
        .is_ok());

    // directly construct bad settings and manually check
    let settings = MumpsSettings {
        mem_relax: -5,
        ..MumpsSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("mem_relax"))
    );

    // try to overlay prohibited update values
    let oldsettings = MumpsSettings::default();
    let newsettings = MumpsSettings {
        symmetry: MatrixSymmetry::GeneralSymmetric,
        ..MumpsSettings::default()
    };
    assert_eq!(
        newsettings.validate_as_update(&oldsettings),
        Err(SettingsError::ImmutableSetting("symmetry"))
    );

    // try to overlay allowed update values
    let newsettings = MumpsSettings {
        verbose: true,
        icntl: vec![(10, 2)],
        ..MumpsSettings::default()
    };
    assert!(newsettings.validate_as_update(&oldsettings).is_ok());
}
