//! # Design
//!
//! - Centralize job-level errors for bootstrap and orchestration.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;
use std::path::PathBuf;

use framegrab_torrent_core::TorrentError;
use thiserror::Error;

/// Result alias for job operations.
pub type AppResult<T> = Result<T, AppError>;

/// Job-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: framegrab_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: framegrab_telemetry::TelemetryError,
    },
    /// Engine session operations failed.
    #[error("torrent operation failed")]
    Torrent {
        /// Operation identifier.
        operation: &'static str,
        /// Source torrent error.
        source: TorrentError,
    },
    /// Frame extraction failed.
    #[error("frame extraction failed")]
    Extract {
        /// Operation identifier.
        operation: &'static str,
        /// Source extraction error.
        source: framegrab_extract::ExtractError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Optional path involved in the failure.
        path: Option<PathBuf>,
        /// Source IO error.
        source: io::Error,
    },
    /// No descriptor of the job could be started.
    #[error("no transfers were started")]
    NoTransfers,
    /// The configuration names no engine backend.
    #[error("no engine backend configured")]
    EngineUnavailable,
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: framegrab_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: framegrab_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn torrent(operation: &'static str, source: TorrentError) -> Self {
        Self::Torrent { operation, source }
    }

    pub(crate) const fn extract(
        operation: &'static str,
        source: framegrab_extract::ExtractError,
    ) -> Self {
        Self::Extract { operation, source }
    }

    pub(crate) const fn io(
        operation: &'static str,
        path: Option<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            operation,
            path,
            source,
        }
    }
}

/// Reasons a single descriptor could not be started. Never fatal to a batch.
#[derive(Debug, Error)]
pub enum StartError {
    /// The descriptor is missing or unreadable as a transfer descriptor.
    #[error("invalid transfer descriptor")]
    InvalidDescriptor {
        /// Descriptor path.
        path: PathBuf,
        /// Underlying failure, when one was reported.
        #[source]
        source: Option<TorrentError>,
    },
    /// The engine refused or failed to start the transfer.
    #[error("engine failed to start transfer")]
    Engine {
        /// Descriptor path.
        path: PathBuf,
        /// Source engine error.
        source: TorrentError,
    },
    /// The engine issued a handle that is already registered.
    #[error("transfer registry rejected handle")]
    Registry {
        /// Source registry error.
        source: TorrentError,
    },
}
