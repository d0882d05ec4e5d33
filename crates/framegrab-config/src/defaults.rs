//! Default values for configuration sections.
//!
//! # Design
//! - Centralize defaults so the loader, the model and tests agree.

/// Directory transfers are saved into, relative to the working directory.
pub(crate) const DOWNLOAD_ROOT: &str = "files";
/// Monitor tick interval in milliseconds.
pub(crate) const POLL_INTERVAL_MS: u64 = 2_000;
/// Bytes a selective transfer must exceed before it counts as complete (50 MiB).
pub(crate) const DOWNLOAD_SIZE_THRESHOLD: u64 = 50 * 1024 * 1024;
/// Pieces the in-process session completes per round.
pub(crate) const PIECES_PER_POLL: u32 = 4;
/// First port of the listen range.
pub(crate) const LISTEN_PORT_START: u16 = 6_681;
/// Last port of the listen range.
pub(crate) const LISTEN_PORT_END: u16 = 6_689;
/// Frame extraction program.
pub(crate) const EXTRACTOR_PROGRAM: &str = "ffmpeg";
/// Frames extracted per second of media.
pub(crate) const EXTRACTOR_FPS: &str = "1";
/// Output muxer passed to the extractor.
pub(crate) const EXTRACTOR_FORMAT: &str = "image2";
/// File name pattern of extracted frames.
pub(crate) const EXTRACTOR_PATTERN: &str = "screenshot-%03d.jpg";
/// Default log level directive.
pub(crate) const LOG_LEVEL: &str = "info";
