use super::mumps::SchurData;
use super::*;
use crate::algebra::MumpsScalar;

/// Schur complement of a set of variables, together with the right hand
/// side reduced onto them.
#[derive(Debug, Clone, PartialEq)]
pub struct SchurComplement<T> {
    /// number of Schur variables
    pub size: usize,
    /// `size x size` complement, column major.  For symmetric instances
    /// only the lower triangle is filled.
    pub matrix: Vec<T>,
    /// reduced right hand side, one column of length `size` per
    /// right hand side
    pub reduced_rhs: Vec<T>,
}

impl<T> SchurComplement<T>
where
    T: MumpsScalar,
{
    /// entry `(i, j)` of the complement, 0-based
    pub fn get(&self, i: usize, j: usize) -> T {
        self.matrix[i + j * self.size]
    }
}

impl<T> MumpsSolver<T>
where
    T: MumpsScalar,
{
    /// Eliminate every variable except those in `vars` (0-based) and
    /// return the Schur complement on `vars` along with the reduced right
    /// hand side.  Runs the analysis and factorization (JOB=4) followed
    /// by a reduction solve (JOB=3 with ICNTL(26)=1) on the current right
    /// hand side.
    pub fn schur_complement(&mut self, vars: &[usize]) -> Result<SchurComplement<T>, MumpsError> {
        let n = self.data.n;
        if n == 0 {
            return Err(MumpsError::NoMatrix);
        }
        if self.data.rhs.is_none() {
            return Err(MumpsError::NoRhs);
        }
        if let Some(&v) = vars.iter().find(|&&v| v >= n) {
            return Err(MumpsError::IndexOutOfRange {
                what: "Schur variables",
                index: i32::try_from(v).map_or(i32::MAX, |i| i.saturating_add(1)),
                n,
            });
        }
        // n fits in an i32 once a matrix is set
        let listvar: Vec<i32> = vars.iter().map(|&v| v as i32 + 1).collect();

        let size = listvar.len();
        let size32 = size as i32;
        let nrhs = self.data.nrhs;

        self.clear_schur()?;
        let schur = self.data.schur.insert(SchurData {
            listvar,
            matrix: vec![T::zero(); size * size],
            redrhs: vec![T::zero(); size * nrhs],
            nrhs,
        });

        let raw = &mut self.raw;
        raw.set_int("size_schur", size32)?;
        raw.set_ptr("listvar_schur", schur.listvar.as_ptr())?;
        raw.set_ptr("schur", schur.matrix.as_mut_ptr())?;
        raw.set_ptr("redrhs", schur.redrhs.as_mut_ptr())?;
        raw.set_int("lredrhs", size32)?;
        // centralized complement on a single process grid
        raw.set_int("schur_lld", size32)?;
        raw.set_int("nprow", 1)?;
        raw.set_int("npcol", 1)?;
        raw.set_int("mblock", 100)?;
        raw.set_int("nblock", 100)?;

        self.set_icntl(19, 3)?;
        self.run_job(Job::AnalyseFactorize)?;

        self.set_icntl(26, 1)?;
        let result = self.run_job(Job::Solve);
        self.set_icntl(26, 0)?;
        result?;

        let schur = self.data.schur.as_ref().ok_or(MumpsError::NoSchur)?;
        Ok(SchurComplement {
            size,
            matrix: schur.matrix.clone(),
            reduced_rhs: schur.redrhs.clone(),
        })
    }

    /// Expand the solution `x2` of the Schur system, stored like the
    /// reduced right hand side, to the solution of the full system
    /// (JOB=3 with ICNTL(26)=2).  The right hand side must have as many
    /// columns as at the reduction.
    pub fn expand_schur(&mut self, x2: &[T]) -> Result<Vec<T>, MumpsError> {
        let nrhs = self.data.nrhs;
        let schur = self.data.schur.as_mut().ok_or(MumpsError::NoSchur)?;
        if nrhs != schur.nrhs {
            return Err(MumpsError::DimensionMismatch {
                what: "rhs columns",
                expected: schur.nrhs,
                got: nrhs,
            });
        }
        if x2.len() != schur.redrhs.len() {
            return Err(MumpsError::DimensionMismatch {
                what: "x2",
                expected: schur.redrhs.len(),
                got: x2.len(),
            });
        }
        schur.redrhs.copy_from_slice(x2);

        self.set_icntl(26, 2)?;
        let result = self.run_job(Job::Solve);
        self.set_icntl(26, 0)?;
        result?;

        self.solution_vec()
    }
}

#[test]
fn test_schur_indexing() {
    let s = SchurComplement {
        size: 2,
        matrix: vec![1., 2., 3., 4.],
        reduced_rhs: vec![0.; 2],
    };
    assert_eq!(s.get(1, 0), 2.);
    assert_eq!(s.get(0, 1), 3.);
}
