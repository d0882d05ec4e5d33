//! Descriptor sources for the batch job.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use framegrab_torrent_core::TransferDescriptor;
use framegrab_torrent_libt::read_metainfo;
use tracing::debug;

use crate::cli::{CliError, CliResult, MISSING_SOURCE};

/// Resolve the batch job's descriptors. `--file` wins over `--torrent`; a
/// `--torrent` path that does not parse as a descriptor is read as a list.
pub(crate) fn batch_descriptors(
    file: Option<&Path>,
    torrent: Option<&Path>,
) -> CliResult<Vec<TransferDescriptor>> {
    match (file, torrent) {
        (Some(list), _) => read_list(list),
        (None, Some(path)) => match read_metainfo(path) {
            Ok(_) => Ok(vec![TransferDescriptor::simple(path)]),
            Err(err) => {
                debug!(
                    path = %path.display(),
                    error = %err,
                    "not a descriptor; reading it as a descriptor list"
                );
                read_list(path)
            }
        },
        (None, None) => Err(CliError::usage(MISSING_SOURCE)),
    }
}

fn read_list(path: &Path) -> CliResult<Vec<TransferDescriptor>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read descriptor list {}", path.display()))
        .map_err(CliError::failure)?;
    Ok(list_descriptors(&text))
}

/// Whitespace-separated tokens of `text` that parse as descriptors.
pub(crate) fn list_descriptors(text: &str) -> Vec<TransferDescriptor> {
    text.split_whitespace()
        .map(PathBuf::from)
        .filter(|path| match read_metainfo(path) {
            Ok(_) => true,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping list entry");
                false
            }
        })
        .map(TransferDescriptor::simple)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegrab_test_support::fixtures::{MetainfoBuilder, write_descriptor_list};

    #[test]
    fn list_keeps_only_parseable_descriptors() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let first =
            MetainfoBuilder::single_file("one.mkv", 100).write_to(temp.path(), "one.torrent")?;
        let second = MetainfoBuilder::multi_file("Two")
            .file("a.mkv", 10)
            .file("b.mkv", 20)
            .write_to(temp.path(), "two.torrent")?;
        let junk = temp.path().join("junk.torrent");
        fs::write(&junk, "d4:junke")?;
        let missing = temp.path().join("missing.torrent");

        let text = format!(
            "{}\n\n  {}\t{}\n{}",
            first.display(),
            junk.display(),
            missing.display(),
            second.display()
        );
        let descriptors = list_descriptors(&text);
        assert_eq!(
            descriptors,
            vec![
                TransferDescriptor::simple(&first),
                TransferDescriptor::simple(&second)
            ]
        );
        assert!(list_descriptors(" \n\t").is_empty());
        Ok(())
    }

    #[test]
    fn file_option_overrides_torrent() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let single =
            MetainfoBuilder::single_file("one.mkv", 100).write_to(temp.path(), "one.torrent")?;
        let other =
            MetainfoBuilder::single_file("two.mkv", 100).write_to(temp.path(), "two.torrent")?;
        let list = write_descriptor_list(temp.path(), "list.txt", &[other.clone()])?;

        let resolved = batch_descriptors(Some(&list), Some(&single))
            .map_err(|_| anyhow::anyhow!("list should resolve"))?;
        assert_eq!(resolved, vec![TransferDescriptor::simple(&other)]);
        Ok(())
    }

    #[test]
    fn unparseable_torrent_is_read_as_a_list() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let single =
            MetainfoBuilder::single_file("one.mkv", 100).write_to(temp.path(), "one.torrent")?;
        let list = write_descriptor_list(temp.path(), "batch.torrent", &[single.clone()])?;

        let direct = batch_descriptors(None, Some(&single))
            .map_err(|_| anyhow::anyhow!("descriptor should resolve"))?;
        assert_eq!(direct, vec![TransferDescriptor::simple(&single)]);

        let detected = batch_descriptors(None, Some(&list))
            .map_err(|_| anyhow::anyhow!("list should resolve"))?;
        assert_eq!(detected, vec![TransferDescriptor::simple(&single)]);
        Ok(())
    }

    #[test]
    fn missing_sources_are_usage_errors() {
        let err = batch_descriptors(None, None).expect_err("no source");
        assert_eq!(err.exit_code(), 1);

        let err = batch_descriptors(Some(Path::new("/no/such/list.txt")), None)
            .expect_err("unreadable list");
        assert_eq!(err.exit_code(), 2);
    }
}
