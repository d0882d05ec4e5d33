//! Typed configuration sections.
//!
//! # Design
//! - Pure data carriers; every field has a default so partial YAML documents load.
//! - IO and environment handling live in `loader.rs`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ConfigError;

/// Complete configuration for one grabber job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrabberConfig {
    /// Engine session and monitor settings.
    pub engine: EngineSettings,
    /// Frame extractor settings.
    pub extractor: ExtractorSettings,
    /// Logging settings.
    pub log: LogSettings,
}

/// Engine session and completion monitor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Engine backend; unset means no engine is available to the job.
    pub backend: Option<EngineBackend>,
    /// Directory transfers are saved into; made absolute at start time.
    pub download_root: PathBuf,
    /// Monitor tick interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Bytes a selective transfer must exceed before it counts as complete.
    pub download_size_threshold: u64,
    /// Pieces the in-process session completes per round.
    pub pieces_per_poll: u32,
    /// First port of the listen range.
    pub listen_port_start: u16,
    /// Last port of the listen range.
    pub listen_port_end: u16,
}

impl EngineSettings {
    /// Monitor tick interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backend: None,
            download_root: PathBuf::from(defaults::DOWNLOAD_ROOT),
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            download_size_threshold: defaults::DOWNLOAD_SIZE_THRESHOLD,
            pieces_per_poll: defaults::PIECES_PER_POLL,
            listen_port_start: defaults::LISTEN_PORT_START,
            listen_port_end: defaults::LISTEN_PORT_END,
        }
    }
}

/// Engine implementation a job runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineBackend {
    /// In-process session that completes pieces without contacting peers.
    Simulated,
}

impl FromStr for EngineBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            _ => Err(ConfigError::InvalidField {
                section: "engine",
                field: "backend",
                value: Some(value.to_string()),
                reason: "expected 'simulated'",
            }),
        }
    }
}

/// External frame extractor invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorSettings {
    /// Program name or path.
    pub program: String,
    /// Frames extracted per second of media (passed to `-r`).
    pub fps: String,
    /// Output muxer (passed to `-f`).
    pub format: String,
    /// File name pattern of the extracted frames.
    pub pattern: String,
    /// Wait for the extractor to exit before the job finishes.
    pub wait: bool,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            program: defaults::EXTRACTOR_PROGRAM.to_string(),
            fps: defaults::EXTRACTOR_FPS.to_string(),
            format: defaults::EXTRACTOR_FORMAT.to_string(),
            pattern: defaults::EXTRACTOR_PATTERN.to_string(),
            wait: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format; inferred from the build profile when unset.
    pub format: Option<LogFormatSetting>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

/// Configured log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Human-readable multi-line output.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormatSetting {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidField {
                section: "log",
                field: "format",
                value: Some(value.to_string()),
                reason: "expected 'pretty' or 'json'",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GrabberConfig::default();
        assert!(config.engine.backend.is_none());
        assert_eq!(config.engine.download_root, PathBuf::from("files"));
        assert_eq!(config.engine.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.engine.download_size_threshold, 52_428_800);
        assert_eq!(config.engine.pieces_per_poll, 4);
        assert_eq!(
            (config.engine.listen_port_start, config.engine.listen_port_end),
            (6681, 6689)
        );
        assert_eq!(config.extractor.program, "ffmpeg");
        assert_eq!(config.extractor.fps, "1");
        assert_eq!(config.extractor.format, "image2");
        assert_eq!(config.extractor.pattern, "screenshot-%03d.jpg");
        assert!(config.extractor.wait);
        assert_eq!(config.log.level, "info");
        assert!(config.log.format.is_none());
    }

    #[test]
    fn backend_must_be_named_explicitly() {
        assert_eq!(
            " Simulated ".parse::<EngineBackend>().ok(),
            Some(EngineBackend::Simulated)
        );
        assert!("libtorrent".parse::<EngineBackend>().is_err());
    }

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormatSetting>().ok(), Some(LogFormatSetting::Json));
        assert_eq!(
            " pretty ".parse::<LogFormatSetting>().ok(),
            Some(LogFormatSetting::Pretty)
        );
        assert!("xml".parse::<LogFormatSetting>().is_err());
    }
}
