use super::settings::check_control_index;
use super::*;
use crate::algebra::*;
use crate::ffi::{MumpsLibrary, RawStruct};
use crate::io::ConfigurablePrintTarget;
use crate::layout::{find_version, MumpsVersion, StructLayout};
use crate::timers::*;
use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;

// arrays whose addresses are handed to MUMPS.  Every pointer field of
// the structure refers to one of these buffers and is refreshed whenever
// the buffer is replaced.
#[derive(Debug)]
pub(crate) struct SolverData<T> {
    pub(crate) n: usize,
    pub(crate) irn: Vec<i32>,
    pub(crate) jcn: Vec<i32>,
    pub(crate) a: Vec<T>,
    pub(crate) rhs: Option<Vec<T>>,
    // copy of the right hand side as given, rhs is overwritten by MUMPS
    pub(crate) b: Vec<T>,
    pub(crate) nrhs: usize,
    pub(crate) schur: Option<SchurData<T>>,
}

impl<T> Default for SolverData<T> {
    fn default() -> Self {
        Self {
            n: 0,
            irn: Vec::new(),
            jcn: Vec::new(),
            a: Vec::new(),
            rhs: None,
            b: Vec::new(),
            nrhs: 0,
            schur: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct SchurData<T> {
    pub(crate) listvar: Vec<i32>,
    pub(crate) matrix: Vec<T>,
    pub(crate) redrhs: Vec<T>,
    // right hand side columns at the time of the reduction
    pub(crate) nrhs: usize,
}

/// A MUMPS instance for one of the four arithmetics, selected by the
/// scalar type `T`.
///
/// The native library is loaded on first use and its release is
/// detected at runtime, so a single build works against any MUMPS
/// release from 4.10.0 through 5.7.x.
///
/// ```no_run
/// use mumpsrs::algebra::CooMatrix;
/// use mumpsrs::solver::{MumpsSettings, MumpsSolver};
///
/// let a = CooMatrix::new(
///     2, 2,
///     vec![0, 1, 0, 1],
///     vec![0, 0, 1, 1],
///     vec![4., 1., 2., 3.],
/// ).unwrap();
///
/// let mut solver = MumpsSolver::<f64>::new(MumpsSettings::default()).unwrap();
/// solver.set_matrix(&a).unwrap();
/// let x = solver.factorize_solve(&[1., 2.]).unwrap();
/// ```
#[derive(Debug)]
pub struct MumpsSolver<T: MumpsScalar = f64> {
    library: Arc<MumpsLibrary>,
    pub(crate) raw: RawStruct,
    version: MumpsVersion,
    pub(crate) settings: MumpsSettings,
    pub(crate) data: SolverData<T>,
    phase: Phase,
    initialized: bool,
    /// summary of the instance and of the last job
    pub summary: MumpsInfo,
    pub(crate) timers: Timers,
}

impl<T> MumpsSolver<T>
where
    T: MumpsScalar,
{
    /// Load the library for `T`, detect its release and initialize a
    /// MUMPS instance (JOB=-1) configured with `settings`.
    pub fn new(settings: MumpsSettings) -> Result<Self, MumpsError> {
        settings.validate()?;
        let library = MumpsLibrary::shared(T::ARITHMETIC, settings.library_dir.as_deref())?;
        Self::with_library(library, settings)
    }

    /// Initialize a MUMPS instance on an already loaded library.  The
    /// `library_dir` setting is not used.
    pub fn with_library(
        library: Arc<MumpsLibrary>,
        settings: MumpsSettings,
    ) -> Result<Self, MumpsError> {
        settings.validate()?;

        let arithmetic = T::ARITHMETIC;
        if library.arithmetic() != arithmetic {
            return Err(MumpsError::ArithmeticMismatch {
                expected: arithmetic,
                got: library.arithmetic(),
            });
        }
        let version = detect_version(&library, settings.comm)?;
        let layout = Arc::new(StructLayout::for_version(version, arithmetic)?);

        let mut raw = RawStruct::new(layout);
        raw.set_int("par", i32::from(settings.host_working))?;
        raw.set_int("sym", settings.symmetry.code())?;
        raw.set_int("comm_fortran", settings.comm)?;

        let summary = MumpsInfo {
            version: Some(version),
            arithmetic: Some(arithmetic),
            library: library.name().to_string(),
            ..MumpsInfo::default()
        };

        let mut solver = Self {
            library,
            raw,
            version,
            settings,
            data: SolverData::default(),
            phase: Phase::Initialized,
            initialized: false,
            summary,
            timers: Timers::default(),
        };

        solver.check_overrides(&solver.settings)?;
        solver.run_job(Job::Init)?;
        solver.apply_settings()?;
        solver.summary.print_banner(&solver.settings)?;

        Ok(solver)
    }

    /// MUMPS release of the loaded library
    pub fn version(&self) -> MumpsVersion {
        self.version
    }

    pub fn arithmetic(&self) -> Arithmetic {
        T::ARITHMETIC
    }

    pub fn settings(&self) -> &MumpsSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Replace the settings of an initialized instance.  Settings consumed
    /// at initialization (symmetry, communicator, host participation and
    /// library location) must not change.
    pub fn update_settings(&mut self, settings: MumpsSettings) -> Result<(), MumpsError> {
        settings.validate_as_update(&self.settings)?;
        self.check_overrides(&settings)?;

        let previous = std::mem::replace(&mut self.settings, settings);
        if let Err(e) = self.apply_settings() {
            self.settings = previous;
            return self.apply_settings().and(Err(e));
        }
        Ok(())
    }

    // ICNTL and CNTL overrides must exist in the loaded release
    fn check_overrides(&self, settings: &MumpsSettings) -> Result<(), MumpsError> {
        for &(i, _) in &settings.icntl {
            self.array_index("icntl", "ICNTL", i)?;
        }
        for &(i, _) in &settings.cntl {
            self.array_index("cntl", "CNTL", i)?;
        }
        Ok(())
    }

    fn apply_settings(&mut self) -> Result<(), MumpsError> {
        if self.settings.verbose {
            self.set_verbose()?;
        } else {
            self.set_silent()?;
        }
        self.set_icntl(7, self.settings.ordering.code())?;
        self.set_icntl(14, self.settings.mem_relax)?;
        self.set_icntl(33, i32::from(self.settings.compute_determinant))?;

        let icntl = self.settings.icntl.clone();
        for (i, value) in icntl {
            self.set_icntl(i, value)?;
        }
        let cntl = self.settings.cntl.clone();
        for (i, value) in cntl {
            self.set_cntl(i, value)?;
        }

        let strings = [
            ("ooc_tmpdir", &self.settings.ooc_tmpdir),
            ("ooc_prefix", &self.settings.ooc_prefix),
            ("write_problem", &self.settings.write_problem),
        ];
        for (field, value) in strings {
            // an empty string lets MUMPS fall back to its default
            self.raw.set_chars(field, value.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }

    /// Suppress all MUMPS output.
    pub fn set_silent(&mut self) -> Result<(), MumpsError> {
        self.set_icntl(1, -1)?;
        self.set_icntl(2, -1)?;
        self.set_icntl(3, -1)?;
        self.set_icntl(4, 0)?;
        Ok(())
    }

    /// Let MUMPS print errors, diagnostics and statistics on its
    /// standard output unit.
    pub fn set_verbose(&mut self) -> Result<(), MumpsError> {
        self.set_icntl(1, 6)?;
        self.set_icntl(2, 0)?;
        self.set_icntl(3, 6)?;
        self.set_icntl(4, 2)?;
        Ok(())
    }

    // ---------------------------------------------------------
    // control and information arrays, 1-based as in the MUMPS
    // user's guide
    // ---------------------------------------------------------

    fn array_index(
        &self,
        field: &'static str,
        label: &'static str,
        index: usize,
    ) -> Result<usize, MumpsError> {
        let len = self.raw.layout().field(field)?.ty.len();
        check_control_index(label, index, len)?;
        Ok(index - 1)
    }

    /// ICNTL(i)
    pub fn icntl(&self, i: usize) -> Result<i32, MumpsError> {
        let idx = self.array_index("icntl", "ICNTL", i)?;
        Ok(self.raw.get_int_at("icntl", idx)?)
    }

    /// set ICNTL(i)
    pub fn set_icntl(&mut self, i: usize, value: i32) -> Result<(), MumpsError> {
        let idx = self.array_index("icntl", "ICNTL", i)?;
        Ok(self.raw.set_int_at("icntl", idx, value)?)
    }

    /// CNTL(i)
    pub fn cntl(&self, i: usize) -> Result<f64, MumpsError> {
        let idx = self.array_index("cntl", "CNTL", i)?;
        Ok(self.raw.get_real_at("cntl", idx)?)
    }

    /// set CNTL(i).  The value is rounded to single precision for the
    /// single precision arithmetics.
    pub fn set_cntl(&mut self, i: usize, value: f64) -> Result<(), MumpsError> {
        let idx = self.array_index("cntl", "CNTL", i)?;
        Ok(self.raw.set_real_at("cntl", idx, value)?)
    }

    /// INFO(i), local to this process
    pub fn info(&self, i: usize) -> Result<i32, MumpsError> {
        let idx = self.array_index("info", "INFO", i)?;
        Ok(self.raw.get_int_at("info", idx)?)
    }

    /// INFOG(i)
    pub fn infog(&self, i: usize) -> Result<i32, MumpsError> {
        let idx = self.array_index("infog", "INFOG", i)?;
        Ok(self.raw.get_int_at("infog", idx)?)
    }

    /// RINFO(i), local to this process
    pub fn rinfo(&self, i: usize) -> Result<f64, MumpsError> {
        let idx = self.array_index("rinfo", "RINFO", i)?;
        Ok(self.raw.get_real_at("rinfo", idx)?)
    }

    /// RINFOG(i)
    pub fn rinfog(&self, i: usize) -> Result<f64, MumpsError> {
        let idx = self.array_index("rinfog", "RINFOG", i)?;
        Ok(self.raw.get_real_at("rinfog", idx)?)
    }

    // ---------------------------------------------------------
    // problem data
    // ---------------------------------------------------------

    /// Set the system matrix.  For symmetric instances only the entries
    /// on and above the diagonal are passed to MUMPS.
    pub fn set_matrix(&mut self, a: &CooMatrix<T>) -> Result<(), MumpsError> {
        if !a.is_square() {
            return Err(SparseFormatError::NotSquare.into());
        }
        let a = if self.settings.symmetry.is_symmetric() {
            Cow::Owned(a.upper_triangle())
        } else {
            Cow::Borrowed(a)
        };
        let (irn, jcn) = a.to_one_based_i32()?;
        self.store_matrix(a.n, irn, jcn, a.vals.clone())
    }

    /// Set the system matrix from compressed sparse column data.
    pub fn set_matrix_csc(&mut self, a: &CscMatrix<T>) -> Result<(), MumpsError> {
        self.set_matrix(&CooMatrix::try_from(a)?)
    }

    /// Set the system matrix from 1-based triplets in MUMPS' own
    /// convention.  The entries are used as given, so symmetric
    /// instances should receive one triangle only.
    pub fn set_triplets(
        &mut self,
        n: usize,
        irn: &[i32],
        jcn: &[i32],
        a: &[T],
    ) -> Result<(), MumpsError> {
        check_entry_counts(irn.len(), jcn.len(), a.len())?;
        for (what, indices) in [("irn", irn), ("jcn", jcn)] {
            if let Some(&index) = indices.iter().find(|&&i| i < 1 || i as usize > n) {
                return Err(MumpsError::IndexOutOfRange { what, index, n });
            }
        }
        self.store_matrix(n, irn.to_vec(), jcn.to_vec(), a.to_vec())
    }

    fn store_matrix(
        &mut self,
        n: usize,
        irn: Vec<i32>,
        jcn: Vec<i32>,
        a: Vec<T>,
    ) -> Result<(), MumpsError> {
        check_entry_counts(irn.len(), jcn.len(), a.len())?;
        let n32 = i32::try_from(n).map_err(|_| SparseFormatError::IndexOverflow(n))?;
        let nnz = irn.len();
        let has_nnz = self.raw.has_field("nnz");
        let nz = match i32::try_from(nnz) {
            Ok(nz) => nz,
            // releases with a 64 bit entry count read NNZ instead
            Err(_) if has_nnz => 0,
            Err(_) => return Err(SparseFormatError::IndexOverflow(nnz).into()),
        };

        self.clear_schur()?;
        if self.data.n != n {
            self.clear_rhs()?;
        }

        self.data.n = n;
        self.data.irn = irn;
        self.data.jcn = jcn;
        self.data.a = a;

        self.raw.set_int("n", n32)?;
        self.raw.set_int("nz", nz)?;
        if has_nnz {
            self.raw.set_int8("nnz", nnz as i64)?;
        }
        self.raw.set_ptr("irn", self.data.irn.as_ptr())?;
        self.raw.set_ptr("jcn", self.data.jcn.as_ptr())?;
        self.raw.set_ptr("a", self.data.a.as_ptr())?;

        self.phase = Phase::Initialized;
        self.summary.n = n;
        self.summary.nnz = nnz;
        Ok(())
    }

    /// Set the right hand side.  `rhs` holds one or more columns of
    /// length `n` stored one after another.  It is overwritten with the
    /// solution by the solve phase.
    pub fn set_rhs(&mut self, rhs: &[T]) -> Result<(), MumpsError> {
        let n = self.data.n;
        if n == 0 {
            return Err(MumpsError::NoMatrix);
        }
        if rhs.is_empty() || rhs.len() % n != 0 {
            return Err(MumpsError::DimensionMismatch {
                what: "rhs",
                expected: n,
                got: rhs.len(),
            });
        }
        let nrhs = rhs.len() / n;
        let nrhs32 = i32::try_from(nrhs).map_err(|_| SparseFormatError::IndexOverflow(nrhs))?;

        self.data.b = rhs.to_vec();
        let rhs = self.data.rhs.insert(rhs.to_vec());
        self.raw.set_ptr("rhs", rhs.as_mut_ptr())?;
        self.raw.set_int("nrhs", nrhs32)?;
        self.raw.set_int("lrhs", n as i32)?;
        self.data.nrhs = nrhs;
        self.summary.nrhs = nrhs;
        Ok(())
    }

    fn clear_rhs(&mut self) -> Result<(), MumpsError> {
        self.data.rhs = None;
        self.data.b.clear();
        self.data.nrhs = 0;
        self.raw.clear_ptr("rhs")?;
        self.raw.set_int("nrhs", 0)?;
        self.raw.set_int("lrhs", 0)?;
        self.summary.nrhs = 0;
        Ok(())
    }

    pub(crate) fn clear_schur(&mut self) -> Result<(), MumpsError> {
        if self.data.schur.take().is_some() {
            self.raw.set_int("size_schur", 0)?;
            self.raw.clear_ptr("listvar_schur")?;
            self.raw.clear_ptr("schur")?;
            self.raw.clear_ptr("redrhs")?;
            self.raw.set_int("lredrhs", 0)?;
            self.set_icntl(19, 0)?;
            self.set_icntl(26, 0)?;
        }
        Ok(())
    }

    /// The right hand side buffer, holding the solution after a solve.
    pub fn solution(&self) -> Option<&[T]> {
        self.data.rhs.as_deref()
    }

    // ---------------------------------------------------------
    // jobs
    // ---------------------------------------------------------

    /// Run a MUMPS job on the current data.  Initialization and
    /// termination are managed by the solver itself.
    pub fn run(&mut self, job: Job) -> Result<(), MumpsError> {
        if matches!(job, Job::Init | Job::End) {
            return Err(MumpsError::InvalidJob(job));
        }
        if self.data.n == 0 {
            return Err(MumpsError::NoMatrix);
        }
        if job.solves() && self.data.rhs.is_none() {
            return Err(MumpsError::NoRhs);
        }
        self.run_job(job)
    }

    pub(crate) fn run_job(&mut self, job: Job) -> Result<(), MumpsError> {
        self.raw.set_int("job", job.code())?;

        let start = self.timers.elapsed(job.name());
        timeit! {self.timers => job.name(); {
            // SAFETY: the layout was built for the detected release and
            // every pointer field refers to a buffer owned by self.data
            unsafe { self.library.call(&mut self.raw) }
        }}

        match job {
            Job::Init => self.initialized = true,
            Job::End => self.initialized = false,
            _ => {}
        }

        let infog1 = self.raw.get_int_at("infog", 0)?;
        let infog2 = self.raw.get_int_at("infog", 1)?;

        if infog1 < 0 {
            if job.analyses() {
                self.phase = Phase::Initialized;
            } else if job.factorizes() {
                self.phase = self.phase.min(Phase::Analysed);
            }
        } else {
            if job.analyses() {
                self.phase = Phase::Analysed;
            }
            if job.factorizes() {
                self.phase = Phase::Factorized;
            }
        }

        self.update_summary(job, infog1, infog2, start)?;
        self.summary.print_job(&self.settings)?;

        if infog1 < 0 {
            return Err(MumpsError::Solver {
                job,
                infog1,
                infog2,
            });
        }
        Ok(())
    }

    fn update_summary(
        &mut self,
        job: Job,
        infog1: i32,
        infog2: i32,
        start: std::time::Duration,
    ) -> Result<(), MumpsError> {
        let s = &mut self.summary;
        s.last_job = Some(job);
        s.phase = Some(self.phase);
        s.infog1 = infog1;
        s.infog2 = infog2;
        s.job_time = self.timers.elapsed(job.name()).saturating_sub(start);
        s.total_time = self.timers.total_time();
        if job.analyses() {
            s.flops_estimate = self.raw.get_real_at("rinfog", 0)?;
        }
        if job.factorizes() {
            s.flops_factorization = self.raw.get_real_at("rinfog", 2)?;
            s.null_pivots = self.raw.get_int_at("infog", 27)?;
        }
        Ok(())
    }

    /// Analysis phase (JOB=1)
    pub fn analyse(&mut self) -> Result<(), MumpsError> {
        self.run(Job::Analyse)
    }

    /// Factorization phase (JOB=2).  The analysis is run first if the
    /// current matrix has not been analysed.
    pub fn factorize(&mut self) -> Result<(), MumpsError> {
        if self.phase >= Phase::Analysed {
            self.run(Job::Factorize)
        } else {
            self.run(Job::AnalyseFactorize)
        }
    }

    /// Solve with an existing factorization (JOB=3) and return the
    /// solution, stored like `rhs`.
    ///
    /// After [`schur_complement`](Self::schur_complement) the
    /// factorization excludes the Schur variables, and a plain solve only
    /// solves the system on the eliminated variables.  Use
    /// [`expand_schur`](Self::expand_schur) for the full solution, or set
    /// the matrix again to drop the complement.
    pub fn solve(&mut self, rhs: &[T]) -> Result<Vec<T>, MumpsError> {
        if self.phase < Phase::Factorized {
            return Err(MumpsError::NotFactorized);
        }
        self.set_rhs(rhs)?;
        self.run(Job::Solve)?;
        self.solution_vec()
    }

    /// Run whichever phases are still required for the current matrix
    /// and solve for `rhs`.  See [`solve`](Self::solve) for the
    /// behaviour after a Schur complement.
    pub fn factorize_solve(&mut self, rhs: &[T]) -> Result<Vec<T>, MumpsError> {
        self.set_rhs(rhs)?;
        let job = match self.phase {
            Phase::Initialized => Job::AnalyseFactorizeSolve,
            Phase::Analysed => Job::FactorizeSolve,
            Phase::Factorized => Job::Solve,
        };
        self.run(job)?;
        self.solution_vec()
    }

    pub(crate) fn solution_vec(&self) -> Result<Vec<T>, MumpsError> {
        self.data.rhs.clone().ok_or(MumpsError::NoRhs)
    }

    // ---------------------------------------------------------
    // factorization statistics
    // ---------------------------------------------------------

    /// Deficiency of the matrix found during factorization.  Meaningful
    /// with null pivot detection enabled (ICNTL(24)=1).
    pub fn deficiency(&self) -> Result<i32, MumpsError> {
        if self.phase < Phase::Factorized {
            return Err(MumpsError::NotFactorized);
        }
        Ok(self.raw.get_int("deficiency")?)
    }

    /// Determinant of the factorized matrix as a mantissa and a base 2
    /// exponent, `det = mantissa * 2^exponent`.  Returns `None` unless
    /// `compute_determinant` was set.
    pub fn determinant_parts(&self) -> Result<Option<(T, i32)>, MumpsError> {
        if self.phase < Phase::Factorized {
            return Err(MumpsError::NotFactorized);
        }
        if self.icntl(33)? == 0 {
            return Ok(None);
        }
        let re = self.rinfog(12)?;
        let im = if T::ARITHMETIC.is_complex() {
            self.rinfog(13)?
        } else {
            0.0
        };
        Ok(Some((T::from_parts(re, im), self.infog(34)?)))
    }

    /// Determinant of the factorized matrix.  May overflow where
    /// [`determinant_parts`](Self::determinant_parts) does not.
    pub fn determinant(&self) -> Result<Option<T>, MumpsError> {
        Ok(self
            .determinant_parts()?
            .map(|(mantissa, exponent)| mantissa * T::from_real(2f64.powi(exponent))))
    }

    /// Print the accumulated job timings to the print target.
    pub fn print_timers(&mut self) -> Result<(), MumpsError> {
        self.summary.print_timers(&self.timers)?;
        Ok(())
    }
}

fn check_entry_counts(nnz: usize, jcn: usize, a: usize) -> Result<(), MumpsError> {
    for (what, got) in [("jcn", jcn), ("a", a)] {
        if got != nnz {
            return Err(MumpsError::DimensionMismatch {
                what,
                expected: nnz,
                got,
            });
        }
    }
    Ok(())
}

// Query the library release with a reduced structure: initialize an
// instance whose structure is the common prefix of every release plus a
// scratch area, read the version string MUMPS wrote into it, and end the
// instance again.
fn detect_version(library: &MumpsLibrary, comm: i32) -> Result<MumpsVersion, MumpsError> {
    let mut probe = RawStruct::new(Arc::new(StructLayout::probe(library.arithmetic())));
    probe.set_int("par", 1)?;
    probe.set_int("sym", 0)?;
    probe.set_int("comm_fortran", comm)?;
    probe.set_int("job", Job::Init.code())?;

    // SAFETY: the probe holds the leading fields of every release and a
    // scratch area larger than any full structure
    unsafe { library.call(&mut probe) };

    let version = find_version(probe.field_bytes("aux")?);

    probe.set_int("job", Job::End.code())?;
    for (i, value) in [-1, -1, -1, 0].into_iter().enumerate() {
        probe.set_int_at("icntl", i, value)?;
    }
    // SAFETY: as above, the instance is ended with its own structure
    unsafe { library.call(&mut probe) };

    version.ok_or(MumpsError::VersionNotDetected)
}

impl<T> Drop for MumpsSolver<T>
where
    T: MumpsScalar,
{
    fn drop(&mut self) {
        if self.initialized && self.raw.set_int("job", Job::End.code()).is_ok() {
            // SAFETY: the instance was initialized with this structure
            unsafe { self.library.call(&mut self.raw) };
            self.initialized = false;
        }
    }
}

impl<T> ConfigurablePrintTarget for MumpsSolver<T>
where
    T: MumpsScalar,
{
    fn print_to_stdout(&mut self) {
        self.summary.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.summary.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.summary.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.summary.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.summary.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.summary.get_print_buffer()
    }
}
