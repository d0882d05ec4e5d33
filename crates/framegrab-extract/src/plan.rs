//! Extraction plan: where the media lives and how the extractor is invoked.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use framegrab_config::ExtractorSettings;
use framegrab_torrent_core::{JobMetadata, TransferMetadata};

/// Path of the target file relative to the save directory.
///
/// A single-file transfer stores its file directly under the save path
/// (`"/" + target`); multi-file transfers keep files inside a folder named
/// after the transfer (`name + "/" + target`).
#[must_use]
pub fn relative_media_path(metadata: &TransferMetadata, target_file: &str) -> String {
    if metadata.files.len() == 1 {
        format!("/{target_file}")
    } else {
        format!("{}/{target_file}", metadata.name)
    }
}

/// Prefix every space with a backslash. No other character is escaped.
#[must_use]
pub fn escape_spaces(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == ' ' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Everything needed to run the extractor for one completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    /// Extractor program.
    pub program: String,
    /// Directory the transfer payload was saved into.
    pub save_path: PathBuf,
    /// Media path relative to `save_path`.
    pub relative_path: String,
    /// Frame rate passed to `-r`.
    pub fps: String,
    /// Output muxer passed to `-f`.
    pub format: String,
    /// Directory receiving the frames.
    pub output_dir: PathBuf,
    /// Frame file name pattern.
    pub pattern: String,
    /// Wait for the extractor to exit.
    pub wait: bool,
}

impl ExtractionPlan {
    /// Plan the extraction of `job.target_file`; `None` when the transfer
    /// exposes no files.
    #[must_use]
    pub fn for_transfer(
        metadata: &TransferMetadata,
        job: &JobMetadata,
        save_path: &Path,
        settings: &ExtractorSettings,
    ) -> Option<Self> {
        if metadata.files.is_empty() {
            return None;
        }
        Some(Self {
            program: settings.program.clone(),
            save_path: save_path.to_path_buf(),
            relative_path: relative_media_path(metadata, &job.target_file),
            fps: settings.fps.clone(),
            format: settings.format.clone(),
            output_dir: job.output_dir.clone(),
            pattern: settings.pattern.clone(),
            wait: settings.wait,
        })
    }

    /// Media file handed to the extractor.
    #[must_use]
    pub fn input_path(&self) -> PathBuf {
        self.save_path
            .join(self.relative_path.trim_start_matches('/'))
    }

    /// Frame output pattern path.
    #[must_use]
    pub fn output_pattern(&self) -> PathBuf {
        self.output_dir.join(&self.pattern)
    }

    /// Argument vector passed to the extractor; no shell is involved.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        vec![
            OsString::from("-i"),
            self.input_path().into_os_string(),
            OsString::from("-r"),
            OsString::from(&self.fps),
            OsString::from("-f"),
            OsString::from(&self.format),
            self.output_pattern().into_os_string(),
        ]
    }

    /// Shell-shaped rendering of the invocation, for logs and diagnostics.
    #[must_use]
    pub fn command_line(&self) -> String {
        format!(
            "{} -i {}/{} -r {} -f {} {}/{}",
            self.program,
            self.save_path.display(),
            escape_spaces(&self.relative_path),
            self.fps,
            self.format,
            self.output_dir.display(),
            self.pattern
        )
    }
}
