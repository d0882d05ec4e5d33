//! # Design
//!
//! - Constant-message errors for the extraction hand-off.
//! - Program and path context live in fields, never in the message.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors produced while launching the frame extractor.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The frame output directory could not be created.
    #[error("failed to prepare extractor output directory")]
    OutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The extractor process could not be started.
    #[error("failed to spawn extractor")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Waiting for the extractor process failed.
    #[error("failed to wait for extractor")]
    Wait {
        /// Program being awaited.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_stay_constant() {
        let err = ExtractError::Spawn {
            program: "ffmpeg".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "failed to spawn extractor");
        assert!(err.source().is_some());
    }
}
