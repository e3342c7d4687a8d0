//! jacobi-ode command-line interface.
//!
//! ```sh
//! jacobi-ode solve -n 100000 -s 1000 -o out/u --workers 4
//! mpiexec -n 4 jacobi-ode solve -n 100000 -s 1000 -o out/u   # built with --features mpi
//! jacobi-ode assemble -o out/u --workers 4
//! jacobi-ode reference -s 1000
//! ```

use std::panic::Location;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info};

use jacobi_ode::context::{LogProgress, StdoutProgress};
use jacobi_ode::io::{assemble_curve, ResultWriter};
use jacobi_ode::solver::DirectSolver;
use jacobi_ode::{solve_worker, Comm, OdeError, OdeProblem, ProgressSink, SolveOptions, UniverseComm};

#[derive(Parser)]
#[command(name = "jacobi-ode")]
#[command(about = "Distributed Jacobi solver for u'' + r(x) u = f(x) on (0, 1)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the reference problem and write one result file per worker.
    Solve {
        #[command(flatten)]
        opts: SolveOptions,
        /// In-process worker threads (ignored under MPI).
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        workers: Option<u64>,
        /// Send the `Iteration {n}` reports to the log instead of stdout.
        #[arg(long)]
        log_progress: bool,
    },
    /// Join the per-worker files into one `x u` table on stdout.
    Assemble {
        /// Prefix the files were written with.
        #[arg(short = 'o', long = "output-prefix", default_value = "output")]
        output_prefix: String,
        /// Number of worker files to read.
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        workers: u64,
    },
    /// Print the exact discrete solution from a direct solve as an `x u` table.
    Reference {
        /// Number of interior points in the discretization.
        #[arg(short = 's', long = "n-steps", default_value_t = 1000,
              value_parser = clap::value_parser!(u64).range(1..))]
        n_steps: u64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { opts, workers, log_progress } => {
            run_solve(&opts, workers.map(|w| w as usize), log_progress)
        }
        Commands::Assemble { output_prefix, workers } => run_assemble(&output_prefix, workers as usize),
        Commands::Reference { n_steps } => run_reference(n_steps as usize),
    };
    if let Err(e) = outcome {
        fatal(None, &e);
    }
}

/// Log the failure with the place it was caught and tear the run down.
/// Under MPI this takes every process with it.
#[track_caller]
fn fatal(comm: Option<&UniverseComm>, err: &anyhow::Error) -> ! {
    let msg = fatal_message(err, Location::caller());
    error!("{msg}");
    eprintln!("{msg}");
    match comm {
        Some(comm) => comm.abort(1),
        None => std::process::abort(),
    }
}

/// `FATAL at file:line: operation: cause: ...`
fn fatal_message(err: &anyhow::Error, at: &Location<'_>) -> String {
    format!("FATAL at {}:{}: {err:#}", at.file(), at.line())
}

/// Open the output file, solve, write. Opening first makes a bad prefix
/// fail before any iteration is spent.
fn solve_one(
    comm: &UniverseComm,
    ode: OdeProblem,
    prefix: &str,
    log_progress: bool,
) -> Result<PathBuf, OdeError> {
    let writer = ResultWriter::create(prefix, comm.rank())?;
    let mut progress: Box<dyn ProgressSink> = if log_progress {
        Box::new(LogProgress)
    } else {
        Box::new(StdoutProgress)
    };
    let (values, stats) = solve_worker(comm, ode, progress.as_mut())?;
    if comm.rank() == 0 {
        info!(
            "{} iterations on {} workers, residual {:e}",
            stats.iterations,
            comm.size(),
            stats.final_residual
        );
    }
    writer.write(&values)
}

#[cfg(feature = "mpi")]
fn run_solve(opts: &SolveOptions, workers: Option<usize>, log_progress: bool) -> anyhow::Result<()> {
    use jacobi_ode::parallel::MpiComm;

    let comm = UniverseComm::Mpi(MpiComm::new().context("failed to init MPI")?);
    if workers.is_some() {
        log::warn!("--workers is ignored under MPI; using {} processes", comm.size());
    }
    let ode = OdeProblem::from_options(opts)?;
    match solve_one(&comm, ode, &opts.output_prefix, log_progress) {
        Ok(path) => info!("rank {}: wrote {}", comm.rank(), path.display()),
        Err(e) => fatal(
            Some(&comm),
            &anyhow::Error::new(e).context(format!("rank {}: solve failed", comm.rank())),
        ),
    }
    if let Err(e) = comm.barrier() {
        fatal(Some(&comm), &anyhow::Error::new(e).context("final barrier"));
    }
    Ok(())
}

#[cfg(not(feature = "mpi"))]
fn run_solve(opts: &SolveOptions, workers: Option<usize>, log_progress: bool) -> anyhow::Result<()> {
    use jacobi_ode::parallel::run_workers;

    let workers = workers.unwrap_or_else(default_workers);
    #[cfg(feature = "rayon")]
    jacobi_ode::parallel::configure_sweep_threads(workers);

    let ode = OdeProblem::from_options(opts)?;
    let paths = run_workers(workers, None, |comm| {
        solve_one(&UniverseComm::Channel(comm), ode.clone(), &opts.output_prefix, log_progress)
    })
    .context("solve failed")?;
    for path in paths {
        info!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(all(not(feature = "mpi"), feature = "rayon"))]
fn default_workers() -> usize {
    num_cpus::get()
}

#[cfg(all(not(feature = "mpi"), not(feature = "rayon")))]
fn default_workers() -> usize {
    1
}

fn run_assemble(prefix: &str, workers: usize) -> anyhow::Result<()> {
    let curve = assemble_curve(prefix, workers)
        .with_context(|| format!("failed to assemble {workers} files with prefix {prefix:?}"))?;
    for (x, u) in curve {
        println!("{x:.6} {u:.6}");
    }
    Ok(())
}

fn run_reference(n_steps: usize) -> anyhow::Result<()> {
    let ode = OdeProblem::from_options(&SolveOptions::default().with_steps(n_steps).with_iterations(1))?;
    let u = DirectSolver::new().solve(&ode).context("direct reference solve failed")?;
    println!("{:.6} {:.6}", 0.0, 0.0);
    for (i, ui) in u.iter().enumerate() {
        println!("{:.6} {ui:.6}", ode.coordinate(i));
    }
    println!("{:.6} {:.6}", 1.0, 0.0);
    Ok(())
}
