//! Job bootstrap: configuration, logging, session lifetime, and the
//! completion-to-extraction hand-off.

use std::path::Path;

use framegrab_config::{EngineBackend, ExtractorSettings, GrabberConfig, LogFormatSetting};
use framegrab_extract::{ExtractionPlan, PipelineOutcome, run_pipeline};
use framegrab_telemetry::{LogFormat, LoggingConfig, build_sha, init_logging};
use framegrab_torrent_core::{TransferDescriptor, TransferEngine, TransferHandle};
use framegrab_torrent_libt::create_session;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::engine_config::runtime_config;
use crate::error::{AppError, AppResult};
use crate::monitor::{CompletionMonitor, MonitorOutcome, MonitorSettings};
use crate::registry::TransferRegistry;
use crate::start::{resolve_save_path, start_batch};

/// How a job ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// A selective transfer completed and the extractor was handed off.
    Extracted {
        /// Completed transfer.
        handle: TransferHandle,
        /// Result of the extraction hand-off.
        pipeline: PipelineOutcome,
    },
    /// The job was cancelled before any transfer completed.
    Cancelled,
}

/// Load configuration from an optional YAML file and the environment.
///
/// # Errors
///
/// Returns an error when the file or an override is invalid.
pub fn load_config(path: Option<&Path>) -> AppResult<GrabberConfig> {
    framegrab_config::load(path).map_err(|err| AppError::config("config.load", err))
}

/// Install the global subscriber described by `config.log`.
///
/// # Errors
///
/// Returns an error when a subscriber is already installed.
pub fn init_telemetry(config: &GrabberConfig) -> AppResult<()> {
    let format = match config.log.format {
        Some(LogFormatSetting::Json) => LogFormat::Json,
        Some(LogFormatSetting::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    };
    init_logging(&LoggingConfig {
        level: &config.log.level,
        format,
        build_sha: option_env!("FRAMEGRAB_BUILD_SHA").unwrap_or("dev"),
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    info!(build_sha = build_sha(), "framegrab starting");
    Ok(())
}

/// Open an engine session and run one job on it.
///
/// # Errors
///
/// See [`run_job`]. Additionally returns [`AppError::EngineUnavailable`]
/// when `engine.backend` is unset and fails when the session cannot be
/// opened.
pub async fn run(
    config: &GrabberConfig,
    descriptors: &[TransferDescriptor],
    cancel: watch::Receiver<bool>,
) -> AppResult<JobOutcome> {
    let session = match config.engine.backend {
        Some(EngineBackend::Simulated) => create_session(runtime_config(&config.engine))
            .map_err(|err| AppError::torrent("session.create", err))?,
        None => return Err(AppError::EngineUnavailable),
    };
    run_job(session, config, descriptors, cancel).await
}

/// Start `descriptors`, monitor them, and extract frames from the first
/// selective transfer that completes. The session is shut down on every
/// exit path.
///
/// # Errors
///
/// Returns [`AppError::NoTransfers`] when no descriptor could be started,
/// and an extraction error when the extractor cannot be run.
pub async fn run_job(
    mut session: Box<dyn TransferEngine>,
    config: &GrabberConfig,
    descriptors: &[TransferDescriptor],
    cancel: watch::Receiver<bool>,
) -> AppResult<JobOutcome> {
    let result = drive(session.as_mut(), config, descriptors, cancel).await;
    if let Err(err) = session.shutdown().await {
        warn!(error = %err, "engine session shutdown failed");
    }
    result
}

async fn drive(
    session: &mut dyn TransferEngine,
    config: &GrabberConfig,
    descriptors: &[TransferDescriptor],
    cancel: watch::Receiver<bool>,
) -> AppResult<JobOutcome> {
    let save_path = resolve_save_path(&config.engine.download_root)?;
    let mut registry = TransferRegistry::new();
    let started = start_batch(session, &mut registry, descriptors, &save_path).await;
    if started.is_empty() {
        return Err(AppError::NoTransfers);
    }
    info!(
        transfers = started.len(),
        save_path = %save_path.display(),
        "monitoring transfers"
    );

    let settings = MonitorSettings::from(&config.engine);
    let outcome = CompletionMonitor::new(session, &mut registry, settings)
        .run(cancel)
        .await;
    let handle = match outcome {
        MonitorOutcome::Cancelled => return Ok(JobOutcome::Cancelled),
        MonitorOutcome::Completed { handle } => handle,
    };

    if let Err(err) = session.pause(handle).await {
        warn!(%handle, error = %err, "failed to pause completed transfer");
    }
    let pipeline = extract(session, &registry, handle, &save_path, &config.extractor).await?;
    Ok(JobOutcome::Extracted { handle, pipeline })
}

async fn extract(
    session: &mut dyn TransferEngine,
    registry: &TransferRegistry,
    handle: TransferHandle,
    save_path: &Path,
    settings: &ExtractorSettings,
) -> AppResult<PipelineOutcome> {
    let Some(job) = registry.job(handle) else {
        return Ok(PipelineOutcome::Skipped);
    };
    let metadata = match session.metadata(handle).await {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!(%handle, error = %err, "transfer metadata unavailable; extraction skipped");
            return Ok(PipelineOutcome::Skipped);
        }
    };
    let Some(plan) = ExtractionPlan::for_transfer(&metadata, job, save_path, settings) else {
        debug!(%handle, "transfer exposes no files; extraction skipped");
        return Ok(PipelineOutcome::Skipped);
    };
    run_pipeline(&plan)
        .await
        .map_err(|err| AppError::extract("pipeline.run", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegrab_test_support::mocks::ScriptedEngine;

    #[tokio::test]
    async fn empty_batch_fails_and_still_shuts_down() -> anyhow::Result<()> {
        let engine = ScriptedEngine::new();
        let probe = engine.clone();
        let temp = tempfile::tempdir()?;
        let descriptors = vec![TransferDescriptor::simple(temp.path().join("missing.torrent"))];
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let err = run_job(
            Box::new(engine),
            &GrabberConfig::default(),
            &descriptors,
            cancel_rx,
        )
        .await
        .expect_err("nothing started");
        assert!(matches!(err, AppError::NoTransfers));
        assert_eq!(probe.shutdowns(), 1);
        Ok(())
    }
}
