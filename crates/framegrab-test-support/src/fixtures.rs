//! Metainfo fixtures and descriptor files on disk.

use std::io;
use std::path::{Path, PathBuf};

use framegrab_torrent_core::{TorrentFile, TransferMetadata};
use sha1::{Digest, Sha1};

/// Builds bencoded metainfo documents for tests.
#[derive(Debug, Clone)]
pub struct MetainfoBuilder {
    name: String,
    piece_length: u64,
    files: Vec<(String, u64)>,
    multi_file: bool,
}

impl MetainfoBuilder {
    /// Single-file transfer whose only file is `name`.
    #[must_use]
    pub fn single_file(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            piece_length: 16 * 1024,
            files: vec![(name.to_string(), size)],
            multi_file: false,
        }
    }

    /// Multi-file transfer rooted in the folder `name`; add files with [`Self::file`].
    #[must_use]
    pub fn multi_file(name: &str) -> Self {
        Self {
            name: name.to_string(),
            piece_length: 16 * 1024,
            files: Vec::new(),
            multi_file: true,
        }
    }

    /// Append a file (path components separated by `/`).
    #[must_use]
    pub fn file(mut self, path: &str, size: u64) -> Self {
        self.files.push((path.to_string(), size));
        self
    }

    /// Override the piece length.
    #[must_use]
    pub const fn piece_length(mut self, piece_length: u64) -> Self {
        self.piece_length = piece_length;
        self
    }

    fn total_size(&self) -> u64 {
        self.files.iter().map(|(_, size)| size).sum()
    }

    fn piece_count(&self) -> u64 {
        self.total_size().div_ceil(self.piece_length.max(1))
    }

    fn info_bytes(&self) -> Vec<u8> {
        let mut info = Vec::new();
        info.push(b'd');
        if self.multi_file {
            put_str(&mut info, "files");
            info.push(b'l');
            for (path, size) in &self.files {
                info.push(b'd');
                put_str(&mut info, "length");
                put_int(&mut info, *size);
                put_str(&mut info, "path");
                info.push(b'l');
                for component in path.split('/') {
                    put_str(&mut info, component);
                }
                info.extend_from_slice(b"ee");
            }
            info.push(b'e');
        } else {
            put_str(&mut info, "length");
            put_int(&mut info, self.total_size());
        }
        put_str(&mut info, "name");
        put_str(&mut info, &self.name);
        put_str(&mut info, "piece length");
        put_int(&mut info, self.piece_length);
        put_str(&mut info, "pieces");
        let hashes = usize::try_from(self.piece_count()).unwrap_or(0) * 20;
        info.extend_from_slice(format!("{hashes}:").as_bytes());
        info.resize(info.len() + hashes, 0xAB);
        info.push(b'e');
        info
    }

    /// Encode the complete metainfo document.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut doc = Vec::new();
        doc.push(b'd');
        put_str(&mut doc, "announce");
        put_str(&mut doc, "http://tracker.invalid/announce");
        put_str(&mut doc, "info");
        doc.extend_from_slice(&self.info_bytes());
        doc.push(b'e');
        doc
    }

    /// Metadata an engine is expected to report for [`Self::build`].
    #[must_use]
    pub fn metadata(&self) -> TransferMetadata {
        let mut offset = 0;
        let files = self
            .files
            .iter()
            .zip(0_u32..)
            .map(|((path, size), index)| {
                let file = TorrentFile {
                    index,
                    path: path.clone(),
                    size_bytes: *size,
                    offset,
                };
                offset += size;
                file
            })
            .collect();
        TransferMetadata {
            name: self.name.clone(),
            info_hash: hex::encode(Sha1::digest(self.info_bytes())),
            piece_length: self.piece_length,
            piece_count: u32::try_from(self.piece_count()).unwrap_or(u32::MAX),
            total_size: self.total_size(),
            files,
        }
    }

    /// Write the document to `dir/file_name` and return its path.
    ///
    /// # Errors
    ///
    /// Returns the IO error raised while writing the file.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> io::Result<PathBuf> {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build())?;
        Ok(path)
    }
}

/// Write a whitespace-delimited descriptor list naming `entries`.
///
/// # Errors
///
/// Returns the IO error raised while writing the file.
pub fn write_descriptor_list(dir: &Path, file_name: &str, entries: &[PathBuf]) -> io::Result<PathBuf> {
    let path = dir.join(file_name);
    let body = entries
        .iter()
        .map(|entry| entry.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(&path, body)?;
    Ok(path)
}

fn put_str(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(format!("{}:", value.len()).as_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn put_int(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(format!("i{value}e").as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_document_shape() {
        let builder = MetainfoBuilder::single_file("movie.mkv", 40_000);
        let doc = builder.build();
        assert!(doc.starts_with(b"d8:announce"));
        assert!(doc.ends_with(b"e"));
        let meta = builder.metadata();
        assert_eq!(meta.piece_count, 3);
        assert_eq!(meta.files[0].path, "movie.mkv");
        assert_eq!(meta.info_hash.len(), 40);
    }

    #[test]
    fn multi_file_metadata_tracks_offsets() {
        let meta = MetainfoBuilder::multi_file("Show")
            .piece_length(10)
            .file("a.nfo", 5)
            .file("Season 1/ep1.mkv", 30)
            .metadata();
        assert_eq!(meta.files[1].offset, 5);
        assert_eq!(meta.total_size, 35);
        assert_eq!(meta.piece_count, 4);
    }

    #[test]
    fn descriptor_list_is_newline_separated() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let list = write_descriptor_list(
            dir.path(),
            "list.txt",
            &[PathBuf::from("/a.torrent"), PathBuf::from("/b.torrent")],
        )?;
        assert_eq!(std::fs::read_to_string(list)?, "/a.torrent\n/b.torrent");
        Ok(())
    }
}
