//! Completion heuristic for selective transfers.

use framegrab_torrent_core::{ProgressSnapshot, TransferStatus};

/// Minimum piece count judged enough of the selected file:
/// `ceil(selected / 100) + 1`.
#[must_use]
pub const fn selected_piece_budget(selected_pieces: u32) -> u32 {
    selected_pieces.div_ceil(100).saturating_add(1)
}

/// Combine an engine status with the registered selection.
#[must_use]
pub const fn snapshot(status: &TransferStatus, selected_pieces: u32) -> ProgressSnapshot {
    ProgressSnapshot {
        bytes_downloaded: status.bytes_downloaded,
        total_pieces: status.total_pieces,
        selected_piece_budget: selected_piece_budget(selected_pieces),
    }
}

/// Selective transfers are done once more than `threshold` bytes arrived
/// and the budget is below the transfer's piece count.
#[must_use]
pub const fn is_complete(snapshot: &ProgressSnapshot, threshold: u64) -> bool {
    snapshot.bytes_downloaded > threshold && snapshot.selected_piece_budget < snapshot.total_pieces
}
