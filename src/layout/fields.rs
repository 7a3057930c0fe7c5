use super::{LayoutError, MumpsVersion, MAX_SUPPORTED_VERSION, MIN_SUPPORTED_VERSION};
use crate::algebra::Arithmetic;
use std::mem::{align_of, size_of};
use std::os::raw::c_void;

/// length of the scratch area appended to the probe structure
pub const AUX_LENGTH: usize = 16 * 1024;

/// C type of a field of the MUMPS control structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `MUMPS_INT` (32 bit)
    Int,
    /// `MUMPS_INT8` (64 bit)
    Int8,
    /// real scalar, `float` or `double` depending on the arithmetic
    Real,
    /// any data pointer
    Pointer,
    IntArray(usize),
    RealArray(usize),
    Int8Array(usize),
    /// fixed size, NUL terminated character buffer
    Chars(usize),
    /// raw bytes
    Bytes(usize),
}

impl FieldType {
    /// number of elements (1 for scalars)
    pub fn len(&self) -> usize {
        match *self {
            FieldType::Int | FieldType::Int8 | FieldType::Real | FieldType::Pointer => 1,
            FieldType::IntArray(n)
            | FieldType::RealArray(n)
            | FieldType::Int8Array(n)
            | FieldType::Chars(n)
            | FieldType::Bytes(n) => n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// size in bytes of a single element
    pub fn element_size(&self, arithmetic: Arithmetic) -> usize {
        match self {
            FieldType::Int | FieldType::IntArray(_) => size_of::<i32>(),
            FieldType::Int8 | FieldType::Int8Array(_) => size_of::<i64>(),
            FieldType::Real | FieldType::RealArray(_) => arithmetic.real_size(),
            FieldType::Pointer => size_of::<*mut c_void>(),
            FieldType::Chars(_) | FieldType::Bytes(_) => 1,
        }
    }

    pub fn size(&self, arithmetic: Arithmetic) -> usize {
        self.element_size(arithmetic) * self.len()
    }

    pub fn align(&self, arithmetic: Arithmetic) -> usize {
        match self {
            FieldType::Int | FieldType::IntArray(_) => align_of::<i32>(),
            FieldType::Int8 | FieldType::Int8Array(_) => align_of::<i64>(),
            FieldType::Real | FieldType::RealArray(_) => match arithmetic.real_size() {
                4 => align_of::<f32>(),
                _ => align_of::<f64>(),
            },
            FieldType::Pointer => align_of::<*mut c_void>(),
            FieldType::Chars(_) | FieldType::Bytes(_) => 1,
        }
    }
}

/// a named field of the MUMPS structure
pub type FieldDef = (&'static str, FieldType);

/// A change to the structure layout introduced by a MUMPS release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// change the type (usually the length) of an existing field
    Replace(&'static str, FieldType),
    /// remove a field
    Delete(&'static str),
    /// insert new fields directly after an existing one
    InsertAfter(&'static str, Vec<FieldDef>),
}

use FieldType::*;

/// The C structure `[SDCZ]MUMPS_STRUC_C` of MUMPS 4.10.0.
pub fn base_fields() -> Vec<FieldDef> {
    vec![
        ("sym", Int),
        ("par", Int),
        ("job", Int),
        ("comm_fortran", Int),
        ("icntl", IntArray(40)),
        ("cntl", RealArray(15)),
        ("n", Int),
        ("nz_alloc", Int),
        // assembled entry
        ("nz", Int),
        ("irn", Pointer),
        ("jcn", Pointer),
        ("a", Pointer),
        // distributed entry
        ("nz_loc", Int),
        ("irn_loc", Pointer),
        ("jcn_loc", Pointer),
        ("a_loc", Pointer),
        // element entry
        ("nelt", Int),
        ("eltptr", Pointer),
        ("eltvar", Pointer),
        ("a_elt", Pointer),
        // ordering, if given by user
        ("perm_in", Pointer),
        // orderings returned to user
        ("sym_perm", Pointer),
        ("uns_perm", Pointer),
        // scaling
        ("colsca", Pointer),
        ("rowsca", Pointer),
        // rhs, solution, output data and statistics
        ("rhs", Pointer),
        ("redrhs", Pointer),
        ("rhs_sparse", Pointer),
        ("sol_loc", Pointer),
        ("irhs_sparse", Pointer),
        ("irhs_ptr", Pointer),
        ("isol_loc", Pointer),
        ("nrhs", Int),
        ("lrhs", Int),
        ("lredrhs", Int),
        ("nz_rhs", Int),
        ("lsol_loc", Int),
        ("schur_mloc", Int),
        ("schur_nloc", Int),
        ("schur_lld", Int),
        ("mblock", Int),
        ("nblock", Int),
        ("nprow", Int),
        ("npcol", Int),
        ("info", IntArray(40)),
        ("infog", IntArray(40)),
        ("rinfo", RealArray(40)),
        ("rinfog", RealArray(40)),
        // null space
        ("deficiency", Int),
        ("pivnul_list", Pointer),
        ("mapping", Pointer),
        // schur
        ("size_schur", Int),
        ("listvar_schur", Pointer),
        ("schur", Pointer),
        // internal parameters
        ("instance_number", Int),
        ("wk_user", Pointer),
        // length in fortran + 1 for final \0 + 1 for alignment
        ("version_number", Chars(16)),
        // out-of-core
        ("ooc_tmpdir", Chars(256)),
        ("ooc_prefix", Chars(64)),
        // matrix market dump of the problem
        ("write_problem", Chars(256)),
        ("lwk_user", Int),
    ]
}

/// Layout changes since 4.10.0, in ascending release order.
pub fn version_updates() -> Vec<(MumpsVersion, Vec<FieldUpdate>)> {
    use FieldUpdate::*;
    vec![
        (
            MumpsVersion::new(5, 0, 0),
            vec![
                InsertAfter("icntl", vec![("keep", IntArray(500))]),
                InsertAfter(
                    "cntl",
                    vec![("dkeep", RealArray(130)), ("keep8", Int8Array(150))],
                ),
                InsertAfter(
                    "rowsca",
                    vec![("colsca_from_mumps", Int), ("rowsca_from_mumps", Int)],
                ),
                Replace("version_number", Chars(27)),
            ],
        ),
        (
            MumpsVersion::new(5, 1, 0),
            vec![
                Replace("dkeep", RealArray(230)),
                InsertAfter("nz", vec![("nnz", Int8)]),
                InsertAfter("nz_loc", vec![("nnz_loc", Int8)]),
                Replace("version_number", Chars(32)),
                // save / restore
                InsertAfter(
                    "lwk_user",
                    vec![("save_dir", Chars(256)), ("save_prefix", Chars(256))],
                ),
            ],
        ),
        (
            MumpsVersion::new(5, 2, 0),
            vec![
                Replace("icntl", IntArray(60)),
                InsertAfter("sol_loc", vec![("rhs_loc", Pointer)]),
                InsertAfter("isol_loc", vec![("irhs_loc", Pointer)]),
                InsertAfter("lsol_loc", vec![("nloc_rhs", Int), ("lrhs_loc", Int)]),
                Replace("info", IntArray(80)),
                Replace("infog", IntArray(80)),
                InsertAfter("save_prefix", vec![("metis_options", IntArray(40))]),
            ],
        ),
        (
            MumpsVersion::new(5, 3, 0),
            vec![
                InsertAfter("n", vec![("nblk", Int)]),
                // matrix by blocks
                InsertAfter("a_elt", vec![("blkptr", Pointer), ("blkvar", Pointer)]),
            ],
        ),
        (
            MumpsVersion::new(5, 7, 0),
            vec![
                InsertAfter("npcol", vec![("ld_rhsintr", Int)]),
                InsertAfter("mapping", vec![("singular_values", Pointer)]),
                Delete("instance_number"),
                Replace("ooc_tmpdir", Chars(1024)),
                Replace("ooc_prefix", Chars(256)),
                Replace("write_problem", Chars(1024)),
                Replace("save_dir", Chars(1024)),
                InsertAfter("metis_options", vec![("instance_number", Int)]),
            ],
        ),
    ]
}

fn position(fields: &[FieldDef], name: &str) -> Result<usize, LayoutError> {
    fields
        .iter()
        .position(|(f, _)| *f == name)
        .ok_or_else(|| LayoutError::UnknownField(name.to_string()))
}

/// Apply a list of updates to a field list, in order.
pub fn apply_updates(
    mut fields: Vec<FieldDef>,
    updates: &[FieldUpdate],
) -> Result<Vec<FieldDef>, LayoutError> {
    for update in updates {
        match update {
            FieldUpdate::Replace(name, ty) => {
                let idx = position(&fields, name)?;
                fields[idx] = (*name, *ty);
            }
            FieldUpdate::Delete(name) => {
                let idx = position(&fields, name)?;
                fields.remove(idx);
            }
            FieldUpdate::InsertAfter(name, new) => {
                let idx = position(&fields, name)?;
                fields.splice((idx + 1)..(idx + 1), new.iter().copied());
            }
        }
    }
    Ok(fields)
}

/// The MUMPS C structure fields for a given library version.
pub fn fields_for_version(version: MumpsVersion) -> Result<Vec<FieldDef>, LayoutError> {
    if !version.is_supported() {
        return Err(LayoutError::UnsupportedVersion {
            version,
            min: MIN_SUPPORTED_VERSION,
            max: MAX_SUPPORTED_VERSION,
        });
    }

    let mut fields = base_fields();
    for (release, updates) in version_updates() {
        if release > version {
            break;
        }
        fields = apply_updates(fields, &updates)?;
    }
    Ok(fields)
}

/// Fields of the structure used to query the library version: the
/// leading fields shared by every release, followed by a scratch area
/// large enough to receive any release's full structure.
pub fn probe_fields() -> Vec<FieldDef> {
    let mut fields = base_fields();
    fields.truncate(5);
    fields.push(("aux", Bytes(AUX_LENGTH)));
    fields
}
