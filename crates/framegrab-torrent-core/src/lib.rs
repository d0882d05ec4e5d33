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

//! Engine-agnostic transfer interfaces and DTOs.
//!
//! Layout: `model/` (descriptors, handles, alerts, status), `selector.rs`
//! (file priority selection), `service/` (the `TransferEngine` adapter trait),
//! `error.rs` (shared error type).

pub mod error;
pub mod model;
pub mod selector;
pub mod service;

pub use error::{TorrentError, TorrentResult};
pub use model::{
    Alert, FilePriority, FilePriorityVector, JobMetadata, ProgressSnapshot, StartRequest,
    TorrentFile, TransferDescriptor, TransferHandle, TransferMetadata, TransferState,
    TransferStatus,
};
pub use selector::{select_files, selected_piece_count};
pub use service::TransferEngine;
