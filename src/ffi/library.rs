use super::RawStruct;
use crate::algebra::Arithmetic;
use cfg_if::cfg_if;
use lazy_static::lazy_static;
use libloading::Library;
use std::collections::HashMap;
use std::os::raw::c_void;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// environment variable naming a directory that holds the MUMPS libraries
pub const MUMPS_LIB_DIR_ENV: &str = "MUMPS_LIB_DIR";

/// `void [sdcz]mumps_c([SDCZ]MUMPS_STRUC_C *)`
pub type MumpsEntry = unsafe extern "C" fn(*mut c_void);

/// Error type returned when loading a MUMPS shared library.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("No MUMPS library for {arithmetic} arithmetic could be loaded (tried {tried:?}): {reason}")]
    LibraryNotFound {
        arithmetic: Arithmetic,
        tried: Vec<String>,
        reason: String,
    },
    #[error("Symbol {symbol} not found in {library}")]
    SymbolNotFound {
        symbol: String,
        library: String,
        #[source]
        source: libloading::Error,
    },
}

/// A loaded MUMPS library and its C entry point for one arithmetic.
pub struct MumpsLibrary {
    // keeps the entry point valid, None for entry points linked in
    _lib: Option<Library>,
    entry: MumpsEntry,
    arithmetic: Arithmetic,
    name: String,
}

impl std::fmt::Debug for MumpsLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MumpsLibrary")
            .field("arithmetic", &self.arithmetic)
            .field("name", &self.name)
            .finish()
    }
}

/// File names tried for an arithmetic, in order: the MPI build first,
/// then the sequential build shipped by some distributions.
pub fn candidate_names(arithmetic: Arithmetic) -> Vec<String> {
    let stem = arithmetic.library_stem();
    let stems = [stem.clone(), format!("{stem}_seq")];
    let mut names = Vec::new();

    for s in stems.iter() {
        names.push(libloading::library_filename(s).to_string_lossy().into_owned());
        cfg_if! {
            if #[cfg(windows)] {
                // MinGW builds keep the "lib" prefix
                let prefixed = format!("lib{s}");
                names.push(libloading::library_filename(prefixed).to_string_lossy().into_owned());
            }
        }
    }
    names
}

fn search_dir(dir: Option<&Path>) -> Option<PathBuf> {
    dir.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(MUMPS_LIB_DIR_ENV).map(PathBuf::from))
}

lazy_static! {
    static ref LIBRARIES: Mutex<HashMap<(Arithmetic, Option<PathBuf>), Arc<MumpsLibrary>>> =
        Mutex::new(HashMap::new());
}

impl MumpsLibrary {
    /// Load the MUMPS library of the given arithmetic.
    ///
    /// The library is looked for in `dir` if given, otherwise in the
    /// directory named by `MUMPS_LIB_DIR`, otherwise through the system's
    /// dynamic loader search path.
    pub fn load(arithmetic: Arithmetic, dir: Option<&Path>) -> Result<Self, LibraryError> {
        let dir = search_dir(dir);
        let mut tried = Vec::new();
        let mut reason = String::from("no candidates");

        for name in candidate_names(arithmetic) {
            let path = match &dir {
                Some(d) => d.join(&name),
                None => PathBuf::from(&name),
            };
            tried.push(path.to_string_lossy().into_owned());

            // SAFETY: loading MUMPS runs no initialisation with
            // preconditions beyond those of the C runtime
            match unsafe { Library::new(&path) } {
                Ok(lib) => return Self::from_library(lib, arithmetic, name),
                Err(e) => reason = e.to_string(),
            }
        }

        Err(LibraryError::LibraryNotFound {
            arithmetic,
            tried,
            reason,
        })
    }

    fn from_library(lib: Library, arithmetic: Arithmetic, name: String) -> Result<Self, LibraryError> {
        let symbol = arithmetic.entry_symbol();
        // SAFETY: the exported symbol has the C signature of MumpsEntry
        let entry = unsafe {
            lib.get::<MumpsEntry>(symbol.as_bytes())
                .map(|s| *s)
                .map_err(|source| LibraryError::SymbolNotFound {
                    symbol: symbol.clone(),
                    library: name.clone(),
                    source,
                })?
        };
        Ok(Self {
            _lib: Some(lib),
            entry,
            arithmetic,
            name,
        })
    }

    /// Wrap an entry point that is already part of the process, such as
    /// `dmumps_c` of a statically linked MUMPS.
    ///
    /// # Safety
    /// `entry` must behave as the `[sdcz]mumps_c` function of `arithmetic`
    /// and stay callable for the lifetime of the returned value.
    pub unsafe fn from_entry(arithmetic: Arithmetic, name: &str, entry: MumpsEntry) -> Self {
        Self {
            _lib: None,
            entry,
            arithmetic,
            name: name.to_string(),
        }
    }

    /// Process-wide shared instance, loaded on first use.
    pub fn shared(arithmetic: Arithmetic, dir: Option<&Path>) -> Result<Arc<Self>, LibraryError> {
        let key = (arithmetic, search_dir(dir));
        let mut libs = LIBRARIES.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(lib) = libs.get(&key) {
            return Ok(Arc::clone(lib));
        }
        let lib = Arc::new(Self::load(arithmetic, key.1.as_deref())?);
        libs.insert(key, Arc::clone(&lib));
        Ok(lib)
    }

    /// True if the library for this arithmetic can be loaded from the default locations.
    pub fn is_available(arithmetic: Arithmetic) -> bool {
        Self::shared(arithmetic, None).is_ok()
    }

    pub fn arithmetic(&self) -> Arithmetic {
        self.arithmetic
    }

    /// file name the library was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the MUMPS entry point on a structure.
    ///
    /// # Safety
    /// The structure layout must match the loaded library's release and
    /// arithmetic, and every pointer stored in it must be valid for the
    /// job being run.
    pub unsafe fn call(&self, s: &mut RawStruct) {
        debug_assert_eq!(s.layout().arithmetic(), self.arithmetic);
        (self.entry)(s.as_mut_ptr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_names() {
        let names = candidate_names(Arithmetic::Double);
        assert!(names[0].contains("dmumps"));
        assert!(names.iter().any(|n| n.contains("dmumps_seq")));
        #[cfg(target_os = "linux")]
        assert_eq!(names[0], "libdmumps.so");
    }

    #[test]
    fn test_load_from_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = MumpsLibrary::load(Arithmetic::ComplexDouble, Some(dir.path())).unwrap_err();
        match err {
            LibraryError::LibraryNotFound {
                arithmetic, tried, ..
            } => {
                assert_eq!(arithmetic, Arithmetic::ComplexDouble);
                assert!(tried.iter().all(|t| t.starts_with(&*dir.path().to_string_lossy())));
            }
            _ => panic!("unexpected error {err}"),
        }
    }
}
