//! __mumpsrs__ is a Rust binding to [MUMPS](https://mumps-solver.org), the
//! MUltifrontal Massively Parallel sparse direct Solver, for the solution
//! of large sparse systems of linear equations
//!
//! $$ A x = b $$
//!
//! with $A$ square and either unsymmetric, symmetric positive definite or
//! general symmetric, in real or complex single or double precision.
//!
//! The MUMPS shared libraries (`libdmumps`, `libzmumps`, ... or their
//! `_seq` variants) are located and loaded at runtime rather than linked at
//! build time.  The release of the loaded library is detected on first use
//! and the memory layout of its C control structure is computed to match,
//! so that one build works with any MUMPS release from 4.10.0 through
//! 5.7.x.  Set `MUMPS_LIB_DIR` or
//! [`MumpsSettings::library_dir`](crate::solver::MumpsSettings::library_dir)
//! to load the libraries from a specific directory.
//!
//! ## Features
//!
//! * __All four arithmetics__: the scalar type of a
//!   [`MumpsSolver`](crate::solver::MumpsSolver) (`f32`, `f64`,
//!   `Complex<f32>` or `Complex<f64>`) selects the MUMPS library.
//!
//! * __Phase control__: analysis, factorization and solve can be run
//!   separately, so that a factorization is reused for many right hand
//!   sides.
//!
//! * __Schur complements__: the Schur complement of a set of variables
//!   and the reduced right hand side are returned, and the solution of
//!   the reduced system can be expanded back to the full system.
//!
//! # License
//!
//! Licensed under the MIT License.

/// version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod ffi;
pub mod io;
pub mod layout;
pub mod solver;
pub mod timers;
