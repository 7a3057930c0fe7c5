//! MUMPS solver main module.
//!
//! [`MumpsSolver`] owns one MUMPS instance together with the buffers
//! whose addresses are handed to the native library.  Problems are solved
//! by setting a matrix and right hand side and running one or more of the
//! MUMPS phases (analysis, factorization, solve), either through the
//! convenience methods or with [`MumpsSolver::run`].

mod error;
mod info;
mod mumps;
mod schur;
mod settings;
mod types;

#[cfg(feature = "serde")]
mod json;

pub use error::*;
pub use info::*;
pub use mumps::*;
pub use schur::*;
pub use settings::*;
pub use types::*;

#[cfg(feature = "serde")]
pub use json::*;
