#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Engine session adapter: metainfo parsing and the in-process session
//! behind [`framegrab_torrent_core::TransferEngine`].

mod bencode;
/// Adapter error types and `TorrentError` builders.
pub mod error;
/// Metainfo decoding into transfer metadata.
pub mod metainfo;
/// Session construction and implementations.
pub mod session;
/// Runtime parameters applied when a session opens.
pub mod types;

pub use error::{MetainfoError, SessionError};
pub use metainfo::{parse_metainfo, read_metainfo};
pub use session::{SimulatedSession, create_session};
pub use types::{AlertMask, EngineRuntimeConfig, PeerFingerprint};
