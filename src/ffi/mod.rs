//! Runtime loading of the MUMPS shared libraries and raw access to the
//! MUMPS C control structure.

mod library;
pub use library::*;
mod raw;
pub use raw::*;
