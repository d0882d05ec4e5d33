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

//! File and environment backed configuration for grabber jobs.
//!
//! Layout: `model.rs` (typed config sections), `defaults.rs` (default values),
//! `loader.rs` (YAML file + environment overrides), `validate.rs` (checks
//! applied after loading).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_with_env};
pub use model::{
    EngineBackend, EngineSettings, ExtractorSettings, GrabberConfig, LogFormatSetting, LogSettings,
};
pub use validate::validate;
