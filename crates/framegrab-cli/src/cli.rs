use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;
use framegrab_app::{JobOutcome, init_telemetry, load_config};
use framegrab_telemetry::job_span;
use framegrab_torrent_core::TransferDescriptor;
use tokio::sync::watch;
use tracing::{Instrument, info};

use crate::descriptors::batch_descriptors;
use crate::signal::{spawn_keypress_watch, watch_for_cancel};

pub(crate) const MISSING_SOURCE: &str = "Please, set --file or --torrent parameter.";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    about = "Fetch one file from a transfer and extract frames from it (simulated engine)",
    long_about = "Fetch one file from a transfer and extract frames from it.\n\n\
                  The only engine backend is simulated: it writes zero-filled \
                  storage and fetches nothing from peers. Set engine.backend: \
                  simulated (or FRAMEGRAB_ENGINE_BACKEND=simulated) to run it."
)]
struct SingleCli {
    /// Transfer descriptor to start.
    #[arg(long, value_name = "PATH")]
    torrent: PathBuf,
    /// Path of the target file inside the transfer.
    #[arg(long, value_name = "NAME")]
    file: String,
    /// Directory receiving the extracted frames.
    #[arg(long, value_name = "DIR")]
    save: PathBuf,
    /// YAML configuration file.
    #[arg(long, env = "FRAMEGRAB_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(
    name = "framegrab-batch",
    about = "Fetch whole transfers until interrupted or a key is pressed (simulated engine)",
    long_about = "Fetch whole transfers until interrupted or a key is pressed.\n\n\
                  The only engine backend is simulated: it writes zero-filled \
                  storage and fetches nothing from peers. Set engine.backend: \
                  simulated (or FRAMEGRAB_ENGINE_BACKEND=simulated) to run it."
)]
struct BatchCli {
    /// Descriptor list: whitespace-separated descriptor paths.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Single descriptor; read as a descriptor list when it does not parse.
    #[arg(long, value_name = "PATH")]
    torrent: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long, env = "FRAMEGRAB_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobMode {
    Single,
    Batch,
}

impl JobMode {
    const fn label(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Batch => "batch",
        }
    }

    // Only the batch job stays alive until a key is pressed.
    const fn cancels_on_keypress(self) -> bool {
        matches!(self, Self::Batch)
    }

    // Cancelling the batch job is its normal end; a single job was interrupted.
    const fn cancelled_exit_code(self) -> i32 {
        match self {
            Self::Single => 130,
            Self::Batch => 0,
        }
    }
}

#[derive(Debug)]
pub(crate) enum CliError {
    Usage(String),
    Failure(anyhow::Error),
}

pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 1,
            Self::Failure(_) => 2,
        }
    }

    fn report(&self) {
        match self {
            Self::Usage(message) => eprintln!("{message}"),
            Self::Failure(error) => eprintln!("error: {error:#}"),
        }
    }
}

/// Run the single-file job. Returns the process exit code.
pub async fn run_single(args: Vec<OsString>) -> i32 {
    let cli = match SingleCli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => return parse_failure(&err),
    };
    let descriptor = TransferDescriptor::selective(cli.torrent, cli.file, cli.save);
    let result = execute(JobMode::Single, cli.config.as_deref(), || Ok(vec![descriptor])).await;
    finish(JobMode::Single, result)
}

/// Run the whole-transfer batch job. Returns the process exit code.
pub async fn run_batch(args: Vec<OsString>) -> i32 {
    let cli = match BatchCli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => return parse_failure(&err),
    };
    if cli.file.is_none() && cli.torrent.is_none() {
        return finish(JobMode::Batch, Err(CliError::usage(MISSING_SOURCE)));
    }
    let result = execute(JobMode::Batch, cli.config.as_deref(), || {
        batch_descriptors(cli.file.as_deref(), cli.torrent.as_deref())
    })
    .await;
    finish(JobMode::Batch, result)
}

async fn execute<F>(
    mode: JobMode,
    config_path: Option<&Path>,
    descriptors: F,
) -> CliResult<JobOutcome>
where
    F: FnOnce() -> CliResult<Vec<TransferDescriptor>>,
{
    let config = load_config(config_path).map_err(CliError::failure)?;
    init_telemetry(&config).map_err(CliError::failure)?;
    let span = job_span(mode.label());
    let descriptors = span.in_scope(descriptors)?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let keypress = mode.cancels_on_keypress().then(spawn_keypress_watch);
    let watcher = tokio::spawn(watch_for_cancel(cancel_tx, keypress).instrument(span.clone()));
    let outcome = framegrab_app::run(&config, &descriptors, cancel_rx)
        .instrument(span)
        .await;
    watcher.abort();
    outcome.map_err(CliError::failure)
}

fn finish(mode: JobMode, result: CliResult<JobOutcome>) -> i32 {
    match result {
        Ok(JobOutcome::Extracted { handle, pipeline }) => {
            info!(%handle, ?pipeline, "job finished");
            0
        }
        Ok(JobOutcome::Cancelled) => {
            info!(mode = mode.label(), "job cancelled");
            mode.cancelled_exit_code()
        }
        Err(err) => {
            err.report();
            err.exit_code()
        }
    }
}

fn parse_failure(err: &clap::Error) -> i32 {
    if err.print().is_err() {
        eprintln!("{err}");
    }
    1
}
