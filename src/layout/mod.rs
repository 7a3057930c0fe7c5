//! Version dependent memory layout of the MUMPS C control structure.
//!
//! The structure `[SDCZ]MUMPS_STRUC_C` gains, loses and resizes fields
//! from one MUMPS release to the next, while the shared library does not
//! export its own layout.  The layout is therefore rebuilt at runtime from
//! the 4.10.0 field list plus the recorded changes of every later release.

use thiserror::Error;

mod version;
pub use version::*;
mod fields;
pub use fields::*;
mod structure;
pub use structure::*;

/// Error type returned by structure layout operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("MUMPS version {version} is not supported (supported: {min} to {max})")]
    UnsupportedVersion {
        version: MumpsVersion,
        min: MumpsVersion,
        max: MumpsVersion,
    },
    #[error("Cannot parse MUMPS version string \"{0}\"")]
    BadVersionString(String),
    #[error("No field \"{0}\" in the MUMPS structure")]
    UnknownField(String),
    #[error("Field \"{field}\" is not of type {expected}")]
    FieldTypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
    #[error("Index {index} out of range for field \"{field}\" of length {len}")]
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        len: usize,
    },
    #[error("String of length {len} does not fit field \"{field}\" (at most {max} bytes)")]
    StringTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}
