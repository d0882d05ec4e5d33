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

//! Grabber job orchestration.
//!
//! Layout: `start.rs` (descriptor admission), `registry.rs` (handle
//! bookkeeping), `completion.rs` (heuristic), `monitor.rs` (alert loop),
//! `bootstrap.rs` (job lifetime and extraction hand-off).

/// Job bootstrap and session lifetime.
pub mod bootstrap;
/// Completion heuristic.
pub mod completion;
/// Engine settings to runtime mapping.
pub mod engine_config;
/// Job-level error types.
pub mod error;
/// Timer-driven alert loop.
pub mod monitor;
/// Started-transfer bookkeeping.
pub mod registry;
/// Descriptor admission.
pub mod start;

pub use bootstrap::{JobOutcome, init_telemetry, load_config, run, run_job};
pub use error::{AppError, AppResult, StartError};
pub use monitor::{CompletionMonitor, MonitorOutcome, MonitorSettings};
pub use registry::{RegisteredTransfer, TransferRegistry};
pub use start::{resolve_save_path, start_batch, start_transfer};
