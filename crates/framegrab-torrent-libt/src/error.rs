//! # Design
//!
//! - Centralize adapter error context without using `anyhow`.
//! - Keep error messages constant; store operational context in fields.
//! - Provide helpers to build `TorrentError` with structured sources.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use framegrab_torrent_core::{TorrentError, TransferHandle};

#[derive(Debug)]
/// Failures raised while reading and decoding a metainfo file.
pub enum MetainfoError {
    /// The descriptor file could not be read.
    Io {
        /// Path of the descriptor.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Input ended before the bencoded value was complete.
    UnexpectedEof {
        /// Byte offset where more input was expected.
        offset: usize,
    },
    /// Input is not valid bencode.
    Malformed {
        /// Byte offset of the offending token.
        offset: usize,
        /// Static reason describing the failure.
        reason: &'static str,
    },
    /// A required metainfo field is absent or has the wrong type.
    MissingField {
        /// Field name that was missing.
        field: &'static str,
    },
    /// A metainfo field holds an out-of-range value.
    InvalidField {
        /// Field name with an invalid value.
        field: &'static str,
        /// Static reason describing the invalid value.
        reason: &'static str,
    },
}

impl Display for MetainfoError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => {
                let _ = path;
                formatter.write_str("metainfo read failure")
            }
            Self::UnexpectedEof { offset } => {
                let _ = offset;
                formatter.write_str("truncated bencode input")
            }
            Self::Malformed { offset, reason } => {
                let _ = (offset, reason);
                formatter.write_str("malformed bencode input")
            }
            Self::MissingField { field } => {
                let _ = field;
                formatter.write_str("required metainfo field missing")
            }
            Self::InvalidField { field, reason } => {
                let _ = (field, reason);
                formatter.write_str("invalid metainfo field")
            }
        }
    }
}

impl Error for MetainfoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
/// Failures raised by the session while servicing a request.
pub enum SessionError {
    /// A request contained an invalid field value.
    InvalidInput {
        /// Field name with an invalid value.
        field: &'static str,
        /// Static reason describing the invalid value.
        reason: &'static str,
    },
    /// Preparing payload storage on disk failed.
    StorageIo {
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl Display for SessionError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => {
                let _ = (field, reason);
                formatter.write_str("invalid transfer input")
            }
            Self::StorageIo { path, .. } => {
                let _ = path;
                formatter.write_str("payload storage IO failure")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageIo { source, .. } => Some(source),
            Self::InvalidInput { .. } => None,
        }
    }
}

/// Wrap a metainfo failure as an invalid-descriptor error for `path`.
pub fn invalid_descriptor(path: impl Into<PathBuf>, source: MetainfoError) -> TorrentError {
    TorrentError::InvalidDescriptor {
        path: path.into(),
        source: Some(Box::new(source)),
    }
}

/// Build a transfer error with structured operation context.
pub fn op_failed(
    operation: &'static str,
    handle: Option<TransferHandle>,
    source: impl Error + Send + Sync + 'static,
) -> TorrentError {
    TorrentError::OperationFailed {
        operation,
        handle,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn metainfo_error_display_and_source() {
        let cases = vec![
            (
                MetainfoError::Io {
                    path: PathBuf::from("a.torrent"),
                    source: io::Error::other("io"),
                },
                "metainfo read failure",
                true,
            ),
            (
                MetainfoError::UnexpectedEof { offset: 3 },
                "truncated bencode input",
                false,
            ),
            (
                MetainfoError::Malformed {
                    offset: 0,
                    reason: "unexpected token",
                },
                "malformed bencode input",
                false,
            ),
            (
                MetainfoError::MissingField { field: "info" },
                "required metainfo field missing",
                false,
            ),
            (
                MetainfoError::InvalidField {
                    field: "piece length",
                    reason: "must be positive",
                },
                "invalid metainfo field",
                false,
            ),
        ];

        for (err, message, has_source) in cases {
            assert_eq!(err.to_string(), message);
            assert_eq!(err.source().is_some(), has_source);
        }
    }

    #[test]
    fn session_error_display_and_source() {
        let input = SessionError::InvalidInput {
            field: "priorities",
            reason: "length mismatch",
        };
        assert_eq!(input.to_string(), "invalid transfer input");
        assert!(input.source().is_none());

        let storage = SessionError::StorageIo {
            path: PathBuf::from("files"),
            source: io::Error::other("disk"),
        };
        assert_eq!(storage.to_string(), "payload storage IO failure");
        assert!(storage.source().is_some());
    }

    #[test]
    fn helpers_wrap_torrent_error() {
        let handle = TransferHandle::new();
        match op_failed("pause", Some(handle), io::Error::other("io")) {
            TorrentError::OperationFailed {
                operation,
                handle: Some(found),
                source,
            } => {
                assert_eq!(operation, "pause");
                assert_eq!(found, handle);
                assert_eq!(source.to_string(), "io");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = invalid_descriptor("x.torrent", MetainfoError::MissingField { field: "info" });
        assert!(matches!(err, TorrentError::InvalidDescriptor { .. }));
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("required metainfo field missing")
        );
    }
}
