//! Core transfer domain types and DTOs shared across the workspace.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a transfer issued by the engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferHandle(Uuid);

impl TransferHandle {
    /// Allocate a fresh handle.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TransferHandle {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, formatter)
    }
}

/// A request to fetch one transfer, produced from CLI or descriptor-list input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransferDescriptor {
    /// Fetch the whole transfer.
    Simple {
        /// Path of the metainfo file.
        source_path: PathBuf,
    },
    /// Fetch one file of the transfer and extract frames from it.
    Selective {
        /// Path of the metainfo file.
        source_path: PathBuf,
        /// Path of the wanted file inside the transfer.
        target_file: String,
        /// Directory receiving the extracted frames.
        output_dir: PathBuf,
    },
}

impl TransferDescriptor {
    /// Convenience constructor for whole-transfer descriptors.
    #[must_use]
    pub fn simple(source_path: impl Into<PathBuf>) -> Self {
        Self::Simple {
            source_path: source_path.into(),
        }
    }

    /// Convenience constructor for single-file descriptors.
    #[must_use]
    pub fn selective(
        source_path: impl Into<PathBuf>,
        target_file: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::Selective {
            source_path: source_path.into(),
            target_file: target_file.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Path of the metainfo file backing this descriptor.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        match self {
            Self::Simple { source_path } | Self::Selective { source_path, .. } => source_path,
        }
    }

    /// Job metadata recorded in the registry; `None` for whole-transfer jobs.
    #[must_use]
    pub fn job_metadata(&self) -> Option<JobMetadata> {
        match self {
            Self::Simple { .. } => None,
            Self::Selective {
                target_file,
                output_dir,
                ..
            } => Some(JobMetadata {
                target_file: target_file.clone(),
                output_dir: output_dir.clone(),
            }),
        }
    }
}

/// Context needed once a selective transfer completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    /// Path of the wanted file inside the transfer.
    pub target_file: String,
    /// Directory receiving the extracted frames.
    pub output_dir: PathBuf,
}

/// Per-file fetch priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePriority {
    /// Do not download the file.
    Skip,
    /// Download the file.
    #[default]
    Fetch,
}

impl FilePriority {
    /// Numeric form used by the engine (`0` skip, `1` fetch).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Skip => 0,
            Self::Fetch => 1,
        }
    }

    /// Whether the file is marked for download.
    #[must_use]
    pub const fn is_selected(self) -> bool {
        matches!(self, Self::Fetch)
    }
}

/// Priorities aligned positionally with a transfer's file list.
pub type FilePriorityVector = Vec<FilePriority>;

/// Individual file exposed by a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// Index of the file within the metainfo.
    pub index: u32,
    /// Relative path of the file within the transfer payload.
    pub path: String,
    /// Total size of the file in bytes.
    pub size_bytes: u64,
    /// Byte offset of the file within the concatenated payload.
    pub offset: u64,
}

/// Parsed contents of a transfer descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferMetadata {
    /// Name of the transfer (single file name or top-level folder).
    pub name: String,
    /// Hex-encoded SHA-1 of the bencoded info dictionary.
    pub info_hash: String,
    /// Size of a piece in bytes.
    pub piece_length: u64,
    /// Number of pieces in the transfer.
    pub piece_count: u32,
    /// Total payload size in bytes.
    pub total_size: u64,
    /// Files in metainfo order; empty when metadata is unresolved.
    pub files: Vec<TorrentFile>,
}

impl TransferMetadata {
    /// Whether the engine resolved the file list.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.files.is_empty()
    }

    /// First and last piece index covered by `file`, if it holds any bytes.
    #[must_use]
    pub fn piece_span(&self, file: &TorrentFile) -> Option<(u32, u32)> {
        if file.size_bytes == 0 || self.piece_length == 0 {
            return None;
        }
        let first = file.offset / self.piece_length;
        let last = (file.offset + file.size_bytes - 1) / self.piece_length;
        Some((
            u32::try_from(first).ok()?,
            u32::try_from(last).ok()?,
        ))
    }

    /// Byte size of the piece at `index`; the last piece may be short.
    #[must_use]
    pub fn piece_size(&self, index: u32) -> u64 {
        let start = u64::from(index) * self.piece_length;
        if start >= self.total_size {
            return 0;
        }
        (self.total_size - start).min(self.piece_length)
    }
}

/// Lifecycle states reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// Verifying existing data on disk.
    CheckingFiles,
    /// Waiting for metadata from peers.
    DownloadingMetadata,
    /// Actively fetching pieces.
    Downloading,
    /// All wanted pieces are present.
    Finished,
    /// All pieces are present and being uploaded.
    Seeding,
    /// Transfer halted by request.
    Paused,
}

impl Display for TransferState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CheckingFiles => "checking_files",
            Self::DownloadingMetadata => "downloading_metadata",
            Self::Downloading => "downloading",
            Self::Finished => "finished",
            Self::Seeding => "seeding",
            Self::Paused => "paused",
        };
        formatter.write_str(label)
    }
}

/// Status snapshot returned by the engine for one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStatus {
    /// Current lifecycle state.
    pub state: TransferState,
    /// Total bytes downloaded so far.
    pub bytes_downloaded: u64,
    /// Number of pieces in the transfer.
    pub total_pieces: u32,
    /// Number of pieces already verified.
    pub pieces_finished: u32,
}

impl TransferStatus {
    /// Share of pieces finished, as a percentage (0-100).
    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        if self.total_pieces == 0 {
            0.0
        } else {
            f64::from(self.pieces_finished) / f64::from(self.total_pieces) * 100.0
        }
    }
}

/// Progress figures the completion heuristic is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    /// Total bytes downloaded so far.
    pub bytes_downloaded: u64,
    /// Number of pieces in the transfer.
    pub total_pieces: u32,
    /// Heuristic piece count judged "enough" of the selected files.
    pub selected_piece_budget: u32,
}

/// Notification drained from the engine's alert queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The transfer moved between lifecycle states.
    StateChanged {
        /// Transfer that changed state.
        handle: TransferHandle,
        /// State before the transition.
        previous: TransferState,
        /// State after the transition.
        current: TransferState,
    },
    /// A piece was downloaded and verified.
    PieceFinished {
        /// Transfer owning the piece.
        handle: TransferHandle,
        /// Index of the finished piece.
        piece_index: u32,
    },
}

impl Alert {
    /// Transfer the alert refers to.
    #[must_use]
    pub const fn handle(&self) -> TransferHandle {
        match self {
            Self::StateChanged { handle, .. } | Self::PieceFinished { handle, .. } => *handle,
        }
    }
}

/// Everything the engine needs to begin a transfer.
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Metainfo previously returned by `parse_descriptor`.
    pub metadata: TransferMetadata,
    /// Absolute directory the payload is written into.
    pub save_path: PathBuf,
    /// Per-file priorities; empty means "engine default" (fetch everything).
    pub priorities: FilePriorityVector,
    /// Fetch pieces in order.
    pub sequential: bool,
    /// Admit the transfer in a paused state.
    pub paused: bool,
    /// Let the engine queue the transfer automatically.
    pub auto_managed: bool,
    /// Reject the request when the info hash is already present.
    pub duplicate_is_error: bool,
}

impl StartRequest {
    /// Request with the defaults used by the grabber: sequential, unpaused,
    /// not auto-managed, duplicates rejected.
    #[must_use]
    pub fn new(
        metadata: TransferMetadata,
        save_path: impl Into<PathBuf>,
        priorities: FilePriorityVector,
    ) -> Self {
        Self {
            metadata,
            save_path: save_path.into(),
            priorities,
            sequential: true,
            paused: false,
            auto_managed: false,
            duplicate_is_error: true,
        }
    }
}
