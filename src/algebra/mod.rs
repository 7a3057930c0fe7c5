//! Sparse matrix formats and scalar types accepted by MUMPS.
//!
//! MUMPS assembles a centralized matrix from 1-based coordinate triplets.
//! [`CooMatrix`] is the native input format of the solver, and
//! [`CscMatrix`] is provided for interoperability with other sparse
//! codes.

mod scalar;
pub use scalar::*;
mod error_types;
pub use error_types::*;
mod matrix_traits;
pub use matrix_traits::*;
mod csc;
pub use csc::*;
mod coo;
pub use coo::*;
