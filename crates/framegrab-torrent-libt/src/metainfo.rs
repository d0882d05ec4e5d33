//! Metainfo (`.torrent`) parsing into transfer metadata.
//!
//! File paths are recorded relative to the transfer folder: a single-file
//! transfer exposes its name, a multi-file transfer exposes the `path`
//! components joined with `/` (the top-level folder name is not repeated).

use std::path::Path;

use framegrab_torrent_core::{TorrentFile, TransferMetadata};
use sha1::{Digest, Sha1};

use crate::bencode::{Bencode, decode_document};
use crate::error::MetainfoError;

const PIECE_HASH_LEN: usize = 20;

const PAYLOAD_OVERFLOW: MetainfoError = MetainfoError::InvalidField {
    field: "length",
    reason: "payload size overflows",
};

/// Read and parse the metainfo file at `path`.
///
/// # Errors
///
/// Returns [`MetainfoError::Io`] when the file cannot be read and a decode
/// error when its contents are not a valid metainfo document.
pub fn read_metainfo(path: &Path) -> Result<TransferMetadata, MetainfoError> {
    let bytes = std::fs::read(path).map_err(|source| MetainfoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_metainfo(&bytes)
}

/// Parse bencoded metainfo bytes.
///
/// # Errors
///
/// Returns an error when the input is not bencode or lacks the fields a
/// transfer needs (`info`, `name`, `piece length`, `pieces`, a length).
pub fn parse_metainfo(bytes: &[u8]) -> Result<TransferMetadata, MetainfoError> {
    let document = decode_document(bytes)?;
    let info = document
        .root
        .get(b"info")
        .filter(|value| matches!(value, Bencode::Dict(_)))
        .ok_or(MetainfoError::MissingField { field: "info" })?;
    let span = document
        .info_span
        .ok_or(MetainfoError::MissingField { field: "info" })?;
    let info_hash = hex::encode(Sha1::digest(&bytes[span]));

    let name = utf8_field(info, b"name", "name")?;
    let piece_length = positive_int(info, b"piece length", "piece length")?;
    let pieces = info
        .get(b"pieces")
        .and_then(Bencode::as_bytes)
        .ok_or(MetainfoError::MissingField { field: "pieces" })?;
    if pieces.len() % PIECE_HASH_LEN != 0 {
        return Err(MetainfoError::InvalidField {
            field: "pieces",
            reason: "length is not a multiple of 20",
        });
    }

    let files = match info.get(b"files") {
        Some(list) => multi_file_layout(list)?,
        None => {
            let length = non_negative_int(info, b"length", "length")?;
            vec![TorrentFile {
                index: 0,
                path: name.clone(),
                size_bytes: length,
                offset: 0,
            }]
        }
    };
    let total_size = files
        .iter()
        .try_fold(0_u64, |total, file| total.checked_add(file.size_bytes))
        .ok_or(PAYLOAD_OVERFLOW)?;
    let piece_count = u32::try_from(pieces.len() / PIECE_HASH_LEN).map_err(|_| {
        MetainfoError::InvalidField {
            field: "pieces",
            reason: "too many pieces",
        }
    })?;
    if u64::from(piece_count) != total_size.div_ceil(piece_length) {
        return Err(MetainfoError::InvalidField {
            field: "pieces",
            reason: "piece count does not cover payload",
        });
    }

    Ok(TransferMetadata {
        name,
        info_hash,
        piece_length,
        piece_count,
        total_size,
        files,
    })
}

fn multi_file_layout(list: &Bencode) -> Result<Vec<TorrentFile>, MetainfoError> {
    let entries = list
        .as_list()
        .ok_or(MetainfoError::InvalidField {
            field: "files",
            reason: "expected a list",
        })?;
    let mut offset = 0_u64;
    let mut files = Vec::with_capacity(entries.len());
    for (index, entry) in (0_u32..).zip(entries) {
        let size_bytes = non_negative_int(entry, b"length", "files.length")?;
        let components = entry
            .get(b"path")
            .and_then(Bencode::as_list)
            .filter(|parts| !parts.is_empty())
            .ok_or(MetainfoError::MissingField {
                field: "files.path",
            })?;
        let mut parts = Vec::with_capacity(components.len());
        for component in components {
            let raw = component.as_bytes().ok_or(MetainfoError::InvalidField {
                field: "files.path",
                reason: "component is not a string",
            })?;
            parts.push(String::from_utf8_lossy(raw).into_owned());
        }
        files.push(TorrentFile {
            index,
            path: parts.join("/"),
            size_bytes,
            offset,
        });
        offset = offset.checked_add(size_bytes).ok_or(PAYLOAD_OVERFLOW)?;
    }
    Ok(files)
}

fn utf8_field(dict: &Bencode, key: &[u8], field: &'static str) -> Result<String, MetainfoError> {
    dict.get(key)
        .and_then(Bencode::as_bytes)
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
        .ok_or(MetainfoError::MissingField { field })
}

fn non_negative_int(dict: &Bencode, key: &[u8], field: &'static str) -> Result<u64, MetainfoError> {
    let value = dict
        .get(key)
        .and_then(Bencode::as_int)
        .ok_or(MetainfoError::MissingField { field })?;
    u64::try_from(value).map_err(|_| MetainfoError::InvalidField {
        field,
        reason: "must not be negative",
    })
}

fn positive_int(dict: &Bencode, key: &[u8], field: &'static str) -> Result<u64, MetainfoError> {
    match non_negative_int(dict, key, field)? {
        0 => Err(MetainfoError::InvalidField {
            field,
            reason: "must be positive",
        }),
        value => Ok(value),
    }
}
