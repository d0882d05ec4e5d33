//! Adapter trait implemented by transfer engine sessions.

use std::path::Path;

use async_trait::async_trait;

use crate::error::TorrentResult;
use crate::model::{
    Alert, FilePriority, StartRequest, TransferHandle, TransferMetadata, TransferStatus,
};

/// Narrow view of a running engine session consumed by the grabber.
///
/// A session is owned by exactly one caller; every method takes `&mut self`
/// so no synchronisation is needed around it.
#[async_trait]
pub trait TransferEngine: Send {
    /// Parse a descriptor file into transfer metadata.
    async fn parse_descriptor(&mut self, path: &Path) -> TorrentResult<TransferMetadata>;

    /// Admit a transfer and begin fetching.
    async fn start_transfer(&mut self, request: StartRequest) -> TorrentResult<TransferHandle>;

    /// Drain the pending alert queue without blocking.
    async fn poll_alerts(&mut self) -> TorrentResult<Vec<Alert>>;

    /// Current status of one transfer.
    async fn status(&mut self, handle: TransferHandle) -> TorrentResult<TransferStatus>;

    /// Metadata the transfer was started with.
    async fn metadata(&mut self, handle: TransferHandle) -> TorrentResult<TransferMetadata>;

    /// Replace the per-file priorities of a transfer.
    async fn set_file_priorities(
        &mut self,
        handle: TransferHandle,
        priorities: &[FilePriority],
    ) -> TorrentResult<()>;

    /// Halt fetching for a transfer.
    async fn pause(&mut self, handle: TransferHandle) -> TorrentResult<()>;

    /// Release the session. Called once on every exit path.
    async fn shutdown(&mut self) -> TorrentResult<()> {
        Ok(())
    }
}
