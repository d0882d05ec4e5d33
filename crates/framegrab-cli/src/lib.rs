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
#![allow(clippy::redundant_pub_crate)]

//! Command-line front ends for the grabber.
//!
//! Layout:
//! - `cli.rs`: argument parsing, job execution, and exit codes
//! - `descriptors.rs`: descriptor lists and descriptor auto-detection
//! - `signal.rs`: interrupt and keypress cancellation
//! - `bin/`: thin entrypoints delegating to [`run_single`] and [`run_batch`]

pub(crate) mod cli;
pub(crate) mod descriptors;
pub(crate) mod signal;

pub use cli::{run_batch, run_single};
