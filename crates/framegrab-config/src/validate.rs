//! Checks applied to a fully merged configuration.

use crate::error::{ConfigError, ConfigResult};
use crate::model::GrabberConfig;

/// Reject configurations the grabber cannot run with.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming the first offending field.
pub fn validate(config: &GrabberConfig) -> ConfigResult<()> {
    let engine = &config.engine;
    if engine.poll_interval_ms == 0 {
        return Err(invalid("engine", "poll_interval_ms", "0", "must be positive"));
    }
    if engine.pieces_per_poll == 0 {
        return Err(invalid("engine", "pieces_per_poll", "0", "must be positive"));
    }
    if engine.listen_port_start == 0 || engine.listen_port_start > engine.listen_port_end {
        return Err(invalid(
            "engine",
            "listen_port_start",
            &format!("{}..={}", engine.listen_port_start, engine.listen_port_end),
            "listen range must be ordered and non-zero",
        ));
    }
    if engine.download_root.as_os_str().is_empty() {
        return Err(invalid("engine", "download_root", "", "must not be empty"));
    }

    let extractor = &config.extractor;
    for (field, value) in [
        ("program", &extractor.program),
        ("fps", &extractor.fps),
        ("format", &extractor.format),
        ("pattern", &extractor.pattern),
    ] {
        if value.trim().is_empty() {
            return Err(invalid("extractor", field, value, "must not be empty"));
        }
    }

    if config.log.level.trim().is_empty() {
        return Err(invalid("log", "level", &config.log.level, "must not be empty"));
    }
    Ok(())
}

fn invalid(
    section: &'static str,
    field: &'static str,
    value: &str,
    reason: &'static str,
) -> ConfigError {
    ConfigError::InvalidField {
        section,
        field,
        value: Some(value.to_string()),
        reason,
    }
}
