//! Per-job bookkeeping of started transfers.

use std::collections::HashMap;

use framegrab_torrent_core::{JobMetadata, TorrentError, TorrentResult, TransferHandle};

/// What the grabber remembers about one started transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTransfer {
    /// Target file and output directory; `None` for whole-transfer jobs.
    pub job: Option<JobMetadata>,
    /// Distinct pieces covered by the selected files.
    pub selected_pieces: u32,
    completed: bool,
}

impl RegisteredTransfer {
    /// Build an entry that has not completed yet.
    #[must_use]
    pub const fn new(job: Option<JobMetadata>, selected_pieces: u32) -> Self {
        Self {
            job,
            selected_pieces,
            completed: false,
        }
    }

    /// Whether the completion test already fired for this transfer.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Map from engine handle to job metadata. Entries live for the whole job.
#[derive(Debug, Default)]
pub struct TransferRegistry {
    entries: HashMap<TransferHandle, RegisteredTransfer>,
}

impl TransferRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly started transfer.
    ///
    /// # Errors
    ///
    /// Returns [`TorrentError::DuplicateHandle`] when `handle` is already registered.
    pub fn register(
        &mut self,
        handle: TransferHandle,
        transfer: RegisteredTransfer,
    ) -> TorrentResult<()> {
        if self.entries.contains_key(&handle) {
            return Err(TorrentError::DuplicateHandle { handle });
        }
        self.entries.insert(handle, transfer);
        Ok(())
    }

    /// Entry for `handle`, if registered.
    #[must_use]
    pub fn entry(&self, handle: TransferHandle) -> Option<&RegisteredTransfer> {
        self.entries.get(&handle)
    }

    /// Job metadata of a selective transfer.
    #[must_use]
    pub fn job(&self, handle: TransferHandle) -> Option<&JobMetadata> {
        self.entry(handle).and_then(|entry| entry.job.as_ref())
    }

    /// Flag `handle` as completed. Returns `true` only the first time.
    pub fn mark_completed(&mut self, handle: TransferHandle) -> bool {
        match self.entries.get_mut(&handle) {
            Some(entry) if !entry.completed => {
                entry.completed = true;
                true
            }
            _ => false,
        }
    }

    /// Number of registered transfers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
