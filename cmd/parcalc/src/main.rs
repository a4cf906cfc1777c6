//! parcalc: run a worker-pool program and write its results
//!
//! Reads `<CONFIG>` (worker count, then one ticket per line), runs every
//! ticket through the pool and writes one `<num1><op><num2>=<result>` line
//! per ticket to `--output`, in the order results were collected.
//!
//! # Environment Variables
//!
//! - `PARCALC_LOG=debug` - Log filter (off, error, warn, info, debug, trace)
//! - `PARCALC_MAX_WORKERS=16` - Largest worker count accepted
//! - `PARCALC_COMPUTE_DELAY_MS=1000` - Per-computation delay
//! - `PARCALC_WORKER_STACK_KB=128` - Worker thread stack size

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use parcalc::{load_program, ResultLog, SimConfig, SimError, Simulation};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Config file: worker count on the first line, then `<id> <num1> <op> <num2>` per line
    #[arg(value_name = "CONFIG", default_value = "file.txt")]
    config: PathBuf,

    /// Where to write the results
    #[arg(short, long, value_name = "PATH", default_value = "results.txt")]
    output: PathBuf,

    /// Per-computation delay in milliseconds (overrides PARCALC_COMPUTE_DELAY_MS)
    #[arg(long, value_name = "MS")]
    compute_delay_ms: Option<u64>,

    /// Also print the results to standard output
    #[arg(long)]
    print: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PARCALC_LOG", "info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let program = load_program(&args.config)?;

    let mut config = SimConfig::from_env();
    if let Some(ms) = args.compute_delay_ms {
        config = config.compute_delay(Duration::from_millis(ms));
    }

    let summary = Simulation::new(config)
        .run(&program)
        .with_context(|| format!("running {}", args.config.display()))?;

    for e in &summary.teardown_errors {
        log::warn!("{}", e);
    }

    write_results(&summary.log, &args.output)?;
    log::info!(
        "wrote {} results to {}",
        summary.log.len(),
        args.output.display()
    );

    if args.print {
        for line in summary.log.lines() {
            println!("{}", line);
        }
    }
    Ok(())
}

fn write_results(log: &ResultLog, path: &Path) -> Result<(), SimError> {
    let to_sim_error = |source| SimError::ResultWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_sim_error)?;
    let mut out = BufWriter::new(file);
    log.write_to(&mut out).map_err(to_sim_error)?;
    out.flush().map_err(to_sim_error)
}
