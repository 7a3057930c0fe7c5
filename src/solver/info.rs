use super::{Job, MumpsSettings, Phase};
use crate::algebra::Arithmetic;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::layout::MumpsVersion;
use crate::timers::Timers;
use std::io::Write;
use std::time::Duration;

/// Summary of the state of a [`MumpsSolver`](crate::solver::MumpsSolver)
/// and of the most recent MUMPS job.
#[derive(Debug, Default)]
pub struct MumpsInfo {
    /// detected MUMPS release
    pub version: Option<MumpsVersion>,
    pub arithmetic: Option<Arithmetic>,
    /// file name of the loaded library
    pub library: String,
    /// matrix order
    pub n: usize,
    /// number of entries passed to MUMPS
    pub nnz: usize,
    /// number of right hand sides
    pub nrhs: usize,
    pub last_job: Option<Job>,
    pub phase: Option<Phase>,
    /// INFOG(1) after the last job
    pub infog1: i32,
    /// INFOG(2) after the last job
    pub infog2: i32,
    /// estimated flops of the elimination process, RINFOG(1)
    pub flops_estimate: f64,
    /// flops of the factorization, RINFOG(3)
    pub flops_factorization: f64,
    /// number of null pivots, INFOG(28)
    pub null_pivots: i32,
    /// wall clock time of the last job
    pub job_time: Duration,
    /// wall clock time of all jobs
    pub total_time: Duration,

    // target stream for printing
    pub(crate) stream: PrintTarget,
}

impl MumpsInfo {
    pub(crate) fn print_banner(&mut self, settings: &MumpsSettings) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;
        writeln!(out, "-------------------------------------------------------------")?;
        writeln!(out, "           mumpsrs v{}  -  MUMPS sparse direct solver", crate::VERSION)?;
        writeln!(out, "-------------------------------------------------------------")?;
        if let Some(version) = self.version {
            writeln!(out, "MUMPS version : {version}")?;
        }
        if let Some(arithmetic) = self.arithmetic {
            writeln!(out, "arithmetic    : {arithmetic}")?;
        }
        writeln!(out, "library       : {}", self.library)?;
        writeln!(out, "symmetry      : {:?}", settings.symmetry)?;
        writeln!(out, "ordering      : {:?}", settings.ordering)?;
        writeln!(out, "mem_relax     : {}%", settings.mem_relax)?;
        writeln!(out)?;
        Ok(())
    }

    pub(crate) fn print_job(&mut self, settings: &MumpsSettings) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let Some(job) = self.last_job else {
            return Ok(());
        };
        let out = &mut self.stream;
        write!(
            out,
            "{job}: n = {}, nnz = {}, INFOG(1) = {}",
            self.n, self.nnz, self.infog1
        )?;
        if self.infog1 != 0 {
            write!(out, ", INFOG(2) = {}", self.infog2)?;
        }
        writeln!(out, ", time = {:?}", self.job_time)?;
        if job.analyses() {
            writeln!(out, "    estimated flops : {:.3e}", self.flops_estimate)?;
        }
        if job.factorizes() {
            writeln!(out, "    factor flops    : {:.3e}", self.flops_factorization)?;
            if self.null_pivots > 0 {
                writeln!(out, "    null pivots     : {}", self.null_pivots)?;
            }
        }
        Ok(())
    }

    pub(crate) fn print_timers(&mut self, timers: &Timers) -> std::io::Result<()> {
        writeln!(self.stream, "total time : {:?}", self.total_time)?;
        timers.print(&mut self.stream)
    }
}

impl ConfigurablePrintTarget for MumpsInfo {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

#[test]
fn test_print_job() {
    let settings = MumpsSettings {
        verbose: true,
        ..MumpsSettings::default()
    };
    let mut info = MumpsInfo {
        n: 5,
        nnz: 12,
        last_job: Some(Job::AnalyseFactorize),
        infog1: 0,
        flops_estimate: 1.5e3,
        ..MumpsInfo::default()
    };
    info.print_to_buffer();
    info.print_job(&settings).unwrap();
    let text = info.get_print_buffer().unwrap();
    assert!(text.starts_with("analyse+factorize (JOB=4): n = 5, nnz = 12, INFOG(1) = 0"));
    assert!(text.contains("estimated flops"));

    // silent settings print nothing
    info.print_to_buffer();
    info.print_job(&MumpsSettings::default()).unwrap();
    assert!(info.get_print_buffer().unwrap().is_empty());
}
