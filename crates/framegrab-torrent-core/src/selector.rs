//! File selection for single-file jobs.

use std::collections::BTreeSet;

use crate::model::{FilePriority, FilePriorityVector, TorrentFile, TransferMetadata};

/// Mark every file whose path equals `target_file` for download and skip the rest.
///
/// Returns an empty vector when the file list is empty (metadata unresolved);
/// callers treat that as "select nothing".
#[must_use]
pub fn select_files(files: &[TorrentFile], target_file: &str) -> FilePriorityVector {
    files
        .iter()
        .map(|file| {
            if file.path == target_file {
                FilePriority::Fetch
            } else {
                FilePriority::Skip
            }
        })
        .collect()
}

/// Number of distinct pieces overlapped by the files marked `Fetch`.
#[must_use]
pub fn selected_piece_count(metadata: &TransferMetadata, priorities: &[FilePriority]) -> u32 {
    let mut pieces = BTreeSet::new();
    for (file, priority) in metadata.files.iter().zip(priorities) {
        if !priority.is_selected() {
            continue;
        }
        if let Some((first, last)) = metadata.piece_span(file) {
            pieces.extend(first..=last);
        }
    }
    u32::try_from(pieces.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str], size: u64) -> Vec<TorrentFile> {
        paths
            .iter()
            .zip(0_u32..)
            .map(|(path, index)| TorrentFile {
                index,
                path: (*path).to_string(),
                size_bytes: size,
                offset: u64::from(index) * size,
            })
            .collect()
    }

    fn metadata(files: Vec<TorrentFile>, piece_length: u64) -> TransferMetadata {
        let total_size = files.iter().map(|file| file.size_bytes).sum::<u64>();
        TransferMetadata {
            name: "Show".to_string(),
            info_hash: "ab".repeat(20),
            piece_length,
            piece_count: u32::try_from(total_size.div_ceil(piece_length)).unwrap_or(0),
            total_size,
            files,
        }
    }

    #[test]
    fn single_file_match_selects_it() {
        let list = files(&["movie.mkv"], 100);
        assert_eq!(select_files(&list, "movie.mkv"), vec![FilePriority::Fetch]);
    }

    #[test]
    fn middle_file_selected_among_three() {
        let list = files(&["a.nfo", "Show/ep1.mkv", "b.txt"], 100);
        let priorities = select_files(&list, "Show/ep1.mkv");
        let numeric: Vec<u8> = priorities.iter().map(|p| p.as_u8()).collect();
        assert_eq!(numeric, vec![0, 1, 0]);
    }

    #[test]
    fn empty_file_list_yields_empty_vector() {
        assert!(select_files(&[], "anything").is_empty());
    }

    #[test]
    fn match_is_case_sensitive_and_marks_duplicates() {
        let list = files(&["Movie.mkv", "movie.mkv", "movie.mkv"], 10);
        let numeric: Vec<u8> = select_files(&list, "movie.mkv")
            .iter()
            .map(|p| p.as_u8())
            .collect();
        assert_eq!(numeric, vec![0, 1, 1]);
    }

    #[test]
    fn vector_length_tracks_file_list_for_any_target() {
        for count in 0..6 {
            let names: Vec<String> = (0..count).map(|i| format!("f{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let list = files(&refs, 1);
            for target in ["f0", "f3", "missing", ""] {
                let selected = select_files(&list, target);
                assert_eq!(selected.len(), list.len());
                assert!(selected.iter().all(|p| p.as_u8() <= 1));
            }
        }
    }

    #[test]
    fn selected_piece_count_only_counts_fetch_files() {
        let meta = metadata(files(&["a", "b", "c"], 25), 10);
        let priorities = vec![FilePriority::Skip, FilePriority::Fetch, FilePriority::Skip];
        // b spans bytes 25..50 => pieces 2..=4
        assert_eq!(selected_piece_count(&meta, &priorities), 3);
        assert_eq!(selected_piece_count(&meta, &[]), 0);
    }

    #[test]
    fn shared_boundary_pieces_are_counted_once() {
        let meta = metadata(files(&["a", "b"], 25), 10);
        let all = vec![FilePriority::Fetch, FilePriority::Fetch];
        assert_eq!(selected_piece_count(&meta, &all), 5);
    }
}
