//! Error types for transfer core services.

use std::error::Error;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::TransferHandle;

/// Primary error type for transfer operations.
#[derive(Debug, Error)]
pub enum TorrentError {
    /// The descriptor does not exist or could not be parsed as metainfo.
    #[error("invalid transfer descriptor")]
    InvalidDescriptor {
        /// Path of the rejected descriptor.
        path: PathBuf,
        /// Parse failure reported by the adapter, when available.
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    /// The engine already runs a transfer with the same info hash.
    #[error("duplicate transfer")]
    Duplicate {
        /// Hex-encoded info hash of the rejected transfer.
        info_hash: String,
    },
    /// The handle is unknown to the engine session.
    #[error("transfer not found")]
    NotFound {
        /// Missing transfer handle.
        handle: TransferHandle,
    },
    /// The handle was registered twice.
    #[error("transfer handle already registered")]
    DuplicateHandle {
        /// Handle that was registered twice.
        handle: TransferHandle,
    },
    /// Operation failed in the underlying engine.
    #[error("transfer operation failed")]
    OperationFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Transfer handle when available.
        handle: Option<TransferHandle>,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl TorrentError {
    /// Build an invalid-descriptor error without an underlying cause.
    #[must_use]
    pub fn invalid_descriptor(path: impl Into<PathBuf>) -> Self {
        Self::InvalidDescriptor {
            path: path.into(),
            source: None,
        }
    }
}

/// Convenience alias for transfer operation results.
pub type TorrentResult<T> = Result<T, TorrentError>;
