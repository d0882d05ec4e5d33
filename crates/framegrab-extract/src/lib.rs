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

//! Frame extraction hand-off run once a transfer is judged complete.
//!
//! Layout: `plan.rs` (input path computation and extractor arguments),
//! `runner.rs` (subprocess launch), `error.rs` (failure types).

pub mod error;
pub mod plan;
pub mod runner;

pub use error::{ExtractError, ExtractResult};
pub use plan::{ExtractionPlan, escape_spaces, relative_media_path};
pub use runner::{PipelineOutcome, run_pipeline};
