//! Subprocess launch for an [`ExtractionPlan`].

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::plan::ExtractionPlan;

/// Result of the extraction hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The transfer exposed no files; nothing was run.
    Skipped,
    /// The extractor was started and left running.
    Launched {
        /// Process id when the platform reports one.
        pid: Option<u32>,
    },
    /// The extractor ran to completion.
    Finished {
        /// Exit status of the extractor.
        status: ExitStatus,
    },
}

/// Create the output directory and run the extractor described by `plan`.
///
/// A non-zero exit status is logged and reported, not treated as an error.
///
/// # Errors
///
/// Returns an error when the output directory cannot be created, the
/// extractor cannot be spawned, or waiting on it fails.
pub async fn run_pipeline(plan: &ExtractionPlan) -> ExtractResult<PipelineOutcome> {
    tokio::fs::create_dir_all(&plan.output_dir)
        .await
        .map_err(|source| ExtractError::OutputDir {
            path: plan.output_dir.clone(),
            source,
        })?;

    info!(command = %plan.command_line(), "launching frame extractor");
    let mut command = Command::new(&plan.program);
    command.args(plan.args()).stdin(Stdio::null());

    if !plan.wait {
        let child = command.spawn().map_err(|source| ExtractError::Spawn {
            program: plan.program.clone(),
            source,
        })?;
        return Ok(PipelineOutcome::Launched { pid: child.id() });
    }

    let mut child = command
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExtractError::Spawn {
            program: plan.program.clone(),
            source,
        })?;
    let status = child.wait().await.map_err(|source| ExtractError::Wait {
        program: plan.program.clone(),
        source,
    })?;
    if status.success() {
        info!(%status, "frame extractor finished");
    } else {
        warn!(%status, program = %plan.program, "frame extractor exited unsuccessfully");
    }
    Ok(PipelineOutcome::Finished { status })
}
