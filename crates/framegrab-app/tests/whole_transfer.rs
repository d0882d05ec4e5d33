use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use framegrab_app::engine_config::runtime_config;
use framegrab_app::{AppError, JobOutcome, run, run_job};
use framegrab_config::{EngineBackend, GrabberConfig};
use framegrab_test_support::fixtures::MetainfoBuilder;
use framegrab_torrent_core::{
    Alert, FilePriority, StartRequest, TorrentResult, TransferDescriptor, TransferEngine,
    TransferHandle, TransferMetadata, TransferStatus,
};
use framegrab_torrent_libt::create_session;
use tokio::sync::watch;

#[derive(Clone, Default)]
struct Counters {
    statuses: Arc<AtomicUsize>,
    shutdowns: Arc<AtomicUsize>,
}

/// Real session that counts the calls a whole-transfer job makes.
struct Counted {
    inner: Box<dyn TransferEngine>,
    counters: Counters,
}

#[async_trait]
impl TransferEngine for Counted {
    async fn parse_descriptor(&mut self, path: &Path) -> TorrentResult<TransferMetadata> {
        self.inner.parse_descriptor(path).await
    }

    async fn start_transfer(&mut self, request: StartRequest) -> TorrentResult<TransferHandle> {
        self.inner.start_transfer(request).await
    }

    async fn poll_alerts(&mut self) -> TorrentResult<Vec<Alert>> {
        self.inner.poll_alerts().await
    }

    async fn status(&mut self, handle: TransferHandle) -> TorrentResult<TransferStatus> {
        self.counters.statuses.fetch_add(1, Ordering::SeqCst);
        self.inner.status(handle).await
    }

    async fn metadata(&mut self, handle: TransferHandle) -> TorrentResult<TransferMetadata> {
        self.inner.metadata(handle).await
    }

    async fn set_file_priorities(
        &mut self,
        handle: TransferHandle,
        priorities: &[FilePriority],
    ) -> TorrentResult<()> {
        self.inner.set_file_priorities(handle, priorities).await
    }

    async fn pause(&mut self, handle: TransferHandle) -> TorrentResult<()> {
        self.inner.pause(handle).await
    }

    async fn shutdown(&mut self) -> TorrentResult<()> {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.inner.shutdown().await
    }
}

fn config(root: &Path) -> GrabberConfig {
    let mut config = GrabberConfig::default();
    config.engine.backend = Some(EngineBackend::Simulated);
    config.engine.download_root = root.join("files");
    config.engine.poll_interval_ms = 1_000;
    config.engine.pieces_per_poll = 4;
    config
}

fn descriptors(root: &Path) -> anyhow::Result<Vec<TransferDescriptor>> {
    let first = MetainfoBuilder::single_file("one.mkv", 64 * 1024)
        .piece_length(1024)
        .write_to(root, "one.torrent")?;
    let second = MetainfoBuilder::multi_file("Two")
        .piece_length(1024)
        .file("a.mkv", 32 * 1024)
        .file("b.mkv", 32 * 1024)
        .write_to(root, "two.torrent")?;
    Ok(vec![
        TransferDescriptor::simple(first),
        TransferDescriptor::simple(second),
    ])
}

async fn cancel_after(cancel_tx: watch::Sender<bool>, delay: Duration) {
    tokio::time::sleep(delay).await;
    let _ = cancel_tx.send(true);
}

#[tokio::test(start_paused = true)]
async fn whole_transfers_poll_until_cancelled() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let config = config(temp.path());
    let descriptors = descriptors(temp.path())?;
    let counters = Counters::default();
    let session = Counted {
        inner: create_session(runtime_config(&config.engine))?,
        counters: counters.clone(),
    };

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (outcome, ()) = tokio::join!(
        run_job(Box::new(session), &config, &descriptors, cancel_rx),
        cancel_after(cancel_tx, Duration::from_secs(10)),
    );

    assert_eq!(outcome?, JobOutcome::Cancelled);
    assert!(counters.statuses.load(Ordering::SeqCst) >= 8);
    assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    assert!(temp.path().join("files").join("one.mkv").exists());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn configured_simulated_backend_runs_until_cancelled() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let config = config(temp.path());
    let descriptors = descriptors(temp.path())?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (outcome, ()) = tokio::join!(
        run(&config, &descriptors, cancel_rx),
        cancel_after(cancel_tx, Duration::from_secs(5)),
    );
    assert_eq!(outcome?, JobOutcome::Cancelled);
    Ok(())
}

#[tokio::test]
async fn unset_backend_refuses_to_run() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let mut config = config(temp.path());
    config.engine.backend = None;
    let descriptors = descriptors(temp.path())?;

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let err = run(&config, &descriptors, cancel_rx)
        .await
        .expect_err("no backend configured");
    assert!(matches!(err, AppError::EngineUnavailable));
    assert!(!temp.path().join("files").exists());
    Ok(())
}
