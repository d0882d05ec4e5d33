//! Scripted engine sessions for driving the grabber without a real engine.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use framegrab_torrent_core::{
    Alert, FilePriority, StartRequest, TorrentError, TorrentResult, TransferEngine, TransferHandle,
    TransferMetadata, TransferState, TransferStatus,
};

#[derive(Default)]
struct Script {
    descriptors: HashMap<PathBuf, TransferMetadata>,
    polls: VecDeque<Vec<Alert>>,
    bytes: HashMap<TransferHandle, u64>,
    transfers: HashMap<TransferHandle, TransferMetadata>,
    started: Vec<(TransferHandle, StartRequest)>,
    reserved: VecDeque<TransferHandle>,
    paused: Vec<TransferHandle>,
    status_failures: Vec<TransferHandle>,
    start_failures: usize,
    shutdowns: usize,
}

/// Engine double whose alerts and progress are scripted by the test.
///
/// Every `poll_alerts` call pops one batch from the script; an exhausted
/// script yields empty batches.
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    script: Arc<Mutex<Script>>,
}

impl ScriptedEngine {
    /// Fresh engine with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make `path` parse into `metadata`; unknown paths are invalid descriptors.
    pub fn register_descriptor(&self, path: impl Into<PathBuf>, metadata: TransferMetadata) {
        self.lock().descriptors.insert(path.into(), metadata);
    }

    /// Queue the alerts delivered during one monitor tick.
    ///
    /// The batch is followed by an empty poll so a drain loop stops there.
    pub fn push_tick(&self, alerts: Vec<Alert>) {
        let mut script = self.lock();
        script.polls.push_back(alerts);
        script.polls.push_back(Vec::new());
    }

    /// Bytes reported by `status` for `handle`.
    pub fn set_bytes(&self, handle: TransferHandle, bytes: u64) {
        self.lock().bytes.insert(handle, bytes);
    }

    /// Make every `status` call for `handle` fail.
    pub fn fail_status(&self, handle: TransferHandle) {
        self.lock().status_failures.push(handle);
    }

    /// Allocate the handle returned by the next successful `start_transfer`.
    ///
    /// Lets a test script alerts for a transfer that code under test starts.
    #[must_use]
    pub fn next_handle(&self) -> TransferHandle {
        let handle = TransferHandle::new();
        self.lock().reserved.push_back(handle);
        handle
    }

    /// Make the next `count` `start_transfer` calls fail.
    pub fn fail_next_starts(&self, count: usize) {
        self.lock().start_failures = count;
    }

    /// Handles and requests of admitted transfers, in start order.
    #[must_use]
    pub fn started(&self) -> Vec<(TransferHandle, StartRequest)> {
        self.lock().started.clone()
    }

    /// Handles paused so far.
    #[must_use]
    pub fn paused(&self) -> Vec<TransferHandle> {
        self.lock().paused.clone()
    }

    /// Number of `shutdown` calls received.
    #[must_use]
    pub fn shutdowns(&self) -> usize {
        self.lock().shutdowns
    }

    /// Polls still queued.
    #[must_use]
    pub fn pending_polls(&self) -> usize {
        self.lock().polls.len()
    }
}

#[async_trait]
impl TransferEngine for ScriptedEngine {
    async fn parse_descriptor(&mut self, path: &Path) -> TorrentResult<TransferMetadata> {
        self.lock()
            .descriptors
            .get(path)
            .cloned()
            .ok_or_else(|| TorrentError::invalid_descriptor(path))
    }

    async fn start_transfer(&mut self, request: StartRequest) -> TorrentResult<TransferHandle> {
        let mut script = self.lock();
        if script.start_failures > 0 {
            script.start_failures -= 1;
            return Err(TorrentError::OperationFailed {
                operation: "start_transfer",
                handle: None,
                source: Box::new(io::Error::other("scripted start failure")),
            });
        }
        let handle = script.reserved.pop_front().unwrap_or_default();
        script
            .transfers
            .insert(handle, request.metadata.clone());
        script.started.push((handle, request));
        Ok(handle)
    }

    async fn poll_alerts(&mut self) -> TorrentResult<Vec<Alert>> {
        Ok(self.lock().polls.pop_front().unwrap_or_default())
    }

    async fn status(&mut self, handle: TransferHandle) -> TorrentResult<TransferStatus> {
        let script = self.lock();
        if script.status_failures.contains(&handle) {
            return Err(TorrentError::OperationFailed {
                operation: "status",
                handle: Some(handle),
                source: Box::new(io::Error::other("scripted status failure")),
            });
        }
        let metadata = script
            .transfers
            .get(&handle)
            .ok_or(TorrentError::NotFound { handle })?;
        Ok(TransferStatus {
            state: TransferState::Downloading,
            bytes_downloaded: script.bytes.get(&handle).copied().unwrap_or_default(),
            total_pieces: metadata.piece_count,
            pieces_finished: 0,
        })
    }

    async fn metadata(&mut self, handle: TransferHandle) -> TorrentResult<TransferMetadata> {
        self.lock()
            .transfers
            .get(&handle)
            .cloned()
            .ok_or(TorrentError::NotFound { handle })
    }

    async fn set_file_priorities(
        &mut self,
        handle: TransferHandle,
        priorities: &[FilePriority],
    ) -> TorrentResult<()> {
        let script = self.lock();
        let metadata = script
            .transfers
            .get(&handle)
            .ok_or(TorrentError::NotFound { handle })?;
        if priorities.len() == metadata.files.len() {
            Ok(())
        } else {
            Err(TorrentError::OperationFailed {
                operation: "set_file_priorities",
                handle: Some(handle),
                source: Box::new(io::Error::other("priority vector length mismatch")),
            })
        }
    }

    async fn pause(&mut self, handle: TransferHandle) -> TorrentResult<()> {
        self.lock().paused.push(handle);
        Ok(())
    }

    async fn shutdown(&mut self) -> TorrentResult<()> {
        self.lock().shutdowns += 1;
        Ok(())
    }
}
