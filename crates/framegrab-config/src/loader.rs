//! Configuration loading: defaults, then an optional YAML file, then
//! environment overrides, then validation.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{EngineBackend, GrabberConfig, LogFormatSetting};
use crate::validate::validate;

const ENV_ENGINE_BACKEND: &str = "FRAMEGRAB_ENGINE_BACKEND";
const ENV_DOWNLOAD_ROOT: &str = "FRAMEGRAB_DOWNLOAD_ROOT";
const ENV_POLL_INTERVAL_MS: &str = "FRAMEGRAB_POLL_INTERVAL_MS";
const ENV_DOWNLOAD_SIZE_THRESHOLD: &str = "FRAMEGRAB_DOWNLOAD_SIZE_THRESHOLD";
const ENV_EXTRACTOR: &str = "FRAMEGRAB_EXTRACTOR";
const ENV_FPS: &str = "FRAMEGRAB_FPS";
const ENV_LOG_FORMAT: &str = "FRAMEGRAB_LOG_FORMAT";

/// Load configuration from `path` (when given) and the process environment.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, an override is
/// malformed, or the merged configuration fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<GrabberConfig> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load`], reading overrides through `lookup`.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> ConfigResult<GrabberConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => GrabberConfig::default(),
    };
    apply_env(&mut config, &lookup)?;
    validate(&config)?;
    debug!(
        backend = ?config.engine.backend,
        download_root = %config.engine.download_root.display(),
        poll_interval_ms = config.engine.poll_interval_ms,
        threshold = config.engine.download_size_threshold,
        extractor = %config.extractor.program,
        "configuration loaded"
    );
    Ok(config)
}

fn read_file(path: &Path) -> ConfigResult<GrabberConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(GrabberConfig::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env<F>(config: &mut GrabberConfig, lookup: &F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_ENGINE_BACKEND) {
        let backend = value
            .parse::<EngineBackend>()
            .map_err(|_| ConfigError::InvalidEnv {
                key: ENV_ENGINE_BACKEND,
                value,
            })?;
        config.engine.backend = Some(backend);
    }
    if let Some(value) = lookup(ENV_DOWNLOAD_ROOT) {
        config.engine.download_root = PathBuf::from(value);
    }
    if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
        config.engine.poll_interval_ms = parse_u64(ENV_POLL_INTERVAL_MS, value)?;
    }
    if let Some(value) = lookup(ENV_DOWNLOAD_SIZE_THRESHOLD) {
        config.engine.download_size_threshold = parse_u64(ENV_DOWNLOAD_SIZE_THRESHOLD, value)?;
    }
    if let Some(value) = lookup(ENV_EXTRACTOR) {
        config.extractor.program = value;
    }
    if let Some(value) = lookup(ENV_FPS) {
        config.extractor.fps = value;
    }
    if let Some(value) = lookup(ENV_LOG_FORMAT) {
        let format = value
            .parse::<LogFormatSetting>()
            .map_err(|_| ConfigError::InvalidEnv {
                key: ENV_LOG_FORMAT,
                value,
            })?;
        config.log.format = Some(format);
    }
    Ok(())
}

fn parse_u64(key: &'static str, value: String) -> ConfigResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_file_and_no_env_yields_defaults() -> anyhow::Result<()> {
        assert_eq!(load_with_env(None, env(&[]))?, GrabberConfig::default());
        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("grabber.yaml");
        std::fs::write(
            &path,
            "engine:\n  backend: simulated\n  poll_interval_ms: 500\nextractor:\n  fps: \"1/10\"\n  wait: false\nlog:\n  format: json\n",
        )?;
        let config = load_with_env(Some(&path), env(&[]))?;
        assert_eq!(config.engine.backend, Some(EngineBackend::Simulated));
        assert_eq!(config.engine.poll_interval_ms, 500);
        assert_eq!(config.engine.download_size_threshold, 52_428_800);
        assert_eq!(config.extractor.fps, "1/10");
        assert!(!config.extractor.wait);
        assert_eq!(config.extractor.program, "ffmpeg");
        assert_eq!(config.log.format, Some(LogFormatSetting::Json));
        Ok(())
    }

    #[test]
    fn environment_overrides_file_values() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("grabber.yaml");
        std::fs::write(&path, "engine:\n  download_root: /srv/a\n")?;
        let config = load_with_env(
            Some(&path),
            env(&[
                ("FRAMEGRAB_ENGINE_BACKEND", "simulated"),
                ("FRAMEGRAB_DOWNLOAD_ROOT", "/srv/b"),
                ("FRAMEGRAB_DOWNLOAD_SIZE_THRESHOLD", "1024"),
                ("FRAMEGRAB_EXTRACTOR", "/usr/bin/ffmpeg"),
                ("FRAMEGRAB_LOG_FORMAT", "pretty"),
            ]),
        )?;
        assert_eq!(config.engine.backend, Some(EngineBackend::Simulated));
        assert_eq!(config.engine.download_root, PathBuf::from("/srv/b"));
        assert_eq!(config.engine.download_size_threshold, 1024);
        assert_eq!(config.extractor.program, "/usr/bin/ffmpeg");
        assert_eq!(config.log.format, Some(LogFormatSetting::Pretty));
        Ok(())
    }

    #[test]
    fn malformed_inputs_are_reported() -> anyhow::Result<()> {
        let err = load_with_env(None, env(&[("FRAMEGRAB_POLL_INTERVAL_MS", "soon")]))
            .expect_err("non-numeric interval");
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: "FRAMEGRAB_POLL_INTERVAL_MS",
                ..
            }
        ));

        let err = load_with_env(None, env(&[("FRAMEGRAB_ENGINE_BACKEND", "native")]))
            .expect_err("unknown backend");
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: "FRAMEGRAB_ENGINE_BACKEND",
                ..
            }
        ));

        let err = load_with_env(None, env(&[("FRAMEGRAB_POLL_INTERVAL_MS", "0")]))
            .expect_err("zero interval");
        assert!(matches!(err, ConfigError::InvalidField { .. }));

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "engine:\n  unknown_knob: 1\n")?;
        let err = load_with_env(Some(&path), env(&[])).expect_err("unknown field");
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = load_with_env(Some(&dir.path().join("missing.yaml")), env(&[]))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
        Ok(())
    }
}
