use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use shutdown::Shutdown;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use umdcore::output::{OutputFormat, PrimarySink, ProcessedLog, RawSidecar, SinkSet};
use umdcore::source::{DeviceSource, LineSource, ReaderSource};
use umdcore::Pipeline;
use workflow::config::{TunableArgs, WorkflowConfig};
use workflow::runner::{Runner, StopReason};

mod shutdown;
mod workflow;

/// How long a termination request may take before the process is forced down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(
    author,
    version,
    about = "UMD2 parser & calculator: device lines in, calibrated JSONL/CSV records out"
)]
struct Args {
    /// Serial device path (e.g. /dev/ttyACM0)
    #[arg(long, conflicts_with = "file")]
    serial: Option<String>,
    /// Baud rate for --serial
    #[arg(long, default_value_t = 115_200)]
    baud: u32,
    /// Recorded input file; stdin when neither --serial nor --file is given
    #[arg(long)]
    file: Option<PathBuf>,
    /// Load the pipeline tunables from a YAML file instead of the flags below
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    tunables: TunableArgs,
    /// Primary stream encoding [jsonl, csv]
    #[arg(long, default_value = "jsonl")]
    out: OutputFormat,
    /// Append processed CSV rows to this path
    #[arg(long)]
    log: Option<PathBuf>,
    /// Write raw pre-parse device lines to this path (--serial only)
    #[arg(long)]
    raw_log: Option<PathBuf>,
}

fn open_source(args: &Args) -> anyhow::Result<Box<dyn LineSource>> {
    if let Some(port) = &args.serial {
        let device = DeviceSource::open(port, args.baud)
            .with_context(|| format!("opening device {} at {} baud", port, args.baud))?;
        info!("streaming from device {} at {} baud", port, args.baud);
        return Ok(Box::new(device));
    }
    if let Some(path) = &args.file {
        let file = ReaderSource::open_file(path)
            .with_context(|| format!("opening input file {}", path.display()))?;
        info!("streaming from file {}", path.display());
        return Ok(Box::new(file));
    }
    info!("streaming from stdin");
    Ok(Box::new(ReaderSource::stdin()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.config {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(&args.tunables)
    };
    let pipeline =
        Pipeline::new(workflow_config.to_pipeline_config()).context("validating configuration")?;

    let mut source = open_source(&args)?;
    let processed_log = args
        .log
        .as_ref()
        .map(|path| {
            ProcessedLog::open(path)
                .with_context(|| format!("opening processed log {}", path.display()))
        })
        .transpose()?;

    if args.out == OutputFormat::Csv && pipeline.spectral_active() {
        warn!("fft snapshots are only written with --out jsonl; csv stream carries samples only");
    }

    let primary =
        PrimarySink::new(args.out, io::stdout().lock()).context("starting output stream")?;
    let mut sinks = SinkSet::new(primary);
    if let Some(log) = processed_log {
        sinks = sinks.with_processed_log(log);
    }
    if let Some(path) = &args.raw_log {
        if args.serial.is_some() {
            if let Some(sidecar) = RawSidecar::open(path) {
                sinks = sinks.with_raw_sidecar(sidecar);
            }
        } else {
            warn!("--raw-log only applies with --serial; ignoring {}", path.display());
        }
    }

    let shutdown = Shutdown::new();
    shutdown.install_signal_watcher(SHUTDOWN_GRACE)?;

    let mut runner = Runner::new(pipeline, sinks, shutdown.clone());
    let result = runner.run(source.as_mut());
    drop(runner);
    drop(source);
    shutdown.mark_finished();

    let summary = result?;
    match summary.stop {
        StopReason::EndOfInput => info!("end of input; {}", summary.metrics),
        StopReason::Interrupted => info!("interrupted; {}", summary.metrics),
    }
    Ok(())
}
