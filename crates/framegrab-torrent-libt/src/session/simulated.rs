use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use framegrab_torrent_core::{
    Alert, FilePriority, FilePriorityVector, StartRequest, TorrentError, TorrentResult,
    TransferEngine, TransferHandle, TransferMetadata, TransferState, TransferStatus,
};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{MetainfoError, SessionError, invalid_descriptor, op_failed};
use crate::metainfo::parse_metainfo;
use crate::types::EngineRuntimeConfig;

/// In-process engine session that fetches pieces on a fixed cadence.
///
/// Every `round_interval` the next `pieces_per_round` wanted pieces of each
/// downloading transfer complete. Rounds only advance from `poll_alerts`, so
/// repeated polls inside one interval return an empty queue.
pub struct SimulatedSession {
    config: EngineRuntimeConfig,
    transfers: HashMap<TransferHandle, SimTransfer>,
    by_hash: HashMap<String, TransferHandle>,
    order: Vec<TransferHandle>,
    pending: Vec<Alert>,
    last_round: Instant,
}

struct SimTransfer {
    metadata: TransferMetadata,
    priorities: FilePriorityVector,
    sequential: bool,
    state: TransferState,
    finished: BTreeSet<u32>,
    bytes_downloaded: u64,
}

impl SimTransfer {
    fn wanted_pieces(&self) -> Vec<u32> {
        let mut wanted = BTreeSet::new();
        for (position, file) in self.metadata.files.iter().enumerate() {
            let selected = self
                .priorities
                .get(position)
                .copied()
                .unwrap_or_default()
                .is_selected();
            if selected && let Some((first, last)) = self.metadata.piece_span(file) {
                wanted.extend(first..=last);
            }
        }
        let mut pieces: Vec<u32> = wanted
            .into_iter()
            .filter(|piece| !self.finished.contains(piece))
            .collect();
        if !self.sequential {
            // Rarest-first approximation: even indices before odd ones.
            pieces.sort_by_key(|piece| (piece % 2, *piece));
        }
        pieces
    }

    fn settled_state(&self) -> TransferState {
        if u64::try_from(self.finished.len()).unwrap_or(u64::MAX)
            == u64::from(self.metadata.piece_count)
        {
            TransferState::Seeding
        } else {
            TransferState::Finished
        }
    }
}

impl SimulatedSession {
    /// Build an empty session; the first round is due one interval from now.
    #[must_use]
    pub fn new(config: EngineRuntimeConfig) -> Self {
        Self {
            config,
            transfers: HashMap::new(),
            by_hash: HashMap::new(),
            order: Vec::new(),
            pending: Vec::new(),
            last_round: Instant::now(),
        }
    }

    fn transfer_mut(&mut self, handle: TransferHandle) -> TorrentResult<&mut SimTransfer> {
        self.transfers
            .get_mut(&handle)
            .ok_or(TorrentError::NotFound { handle })
    }

    fn push_state(&mut self, handle: TransferHandle, previous: TransferState, current: TransferState) {
        if self.config.alert_mask.status && previous != current {
            self.pending.push(Alert::StateChanged {
                handle,
                previous,
                current,
            });
        }
    }

    fn advance_round(&mut self) {
        let budget = usize::try_from(self.config.pieces_per_round.max(1)).unwrap_or(usize::MAX);
        for handle in self.order.clone() {
            let Some(transfer) = self.transfers.get_mut(&handle) else {
                continue;
            };
            if transfer.state != TransferState::Downloading {
                continue;
            }
            let batch: Vec<u32> = transfer.wanted_pieces().into_iter().take(budget).collect();
            for piece in &batch {
                transfer.finished.insert(*piece);
                transfer.bytes_downloaded += transfer.metadata.piece_size(*piece);
            }
            let done = transfer.wanted_pieces().is_empty();
            let settled = transfer.settled_state();
            if done {
                transfer.state = settled;
            }
            if self.config.alert_mask.progress {
                self.pending
                    .extend(batch.into_iter().map(|piece_index| Alert::PieceFinished {
                        handle,
                        piece_index,
                    }));
            }
            if done {
                self.push_state(handle, TransferState::Downloading, settled);
            }
        }
    }
}

async fn prepare_storage(
    save_path: &Path,
    metadata: &TransferMetadata,
    priorities: &[FilePriority],
) -> Result<(), SessionError> {
    let root = if metadata.files.len() == 1 {
        save_path.to_path_buf()
    } else {
        save_path.join(&metadata.name)
    };
    for (position, file) in metadata.files.iter().enumerate() {
        let selected = priorities
            .get(position)
            .copied()
            .unwrap_or_default()
            .is_selected();
        if !selected {
            continue;
        }
        let path: PathBuf = root.join(&file.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SessionError::StorageIo {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        let storage_err = |source| SessionError::StorageIo {
            path: path.clone(),
            source,
        };
        let handle = tokio::fs::File::create(&path).await.map_err(storage_err)?;
        handle.set_len(file.size_bytes).await.map_err(storage_err)?;
    }
    Ok(())
}

fn check_priorities(metadata: &TransferMetadata, priorities: &[FilePriority]) -> Result<(), SessionError> {
    if priorities.is_empty() || priorities.len() == metadata.files.len() {
        Ok(())
    } else {
        Err(SessionError::InvalidInput {
            field: "priorities",
            reason: "length differs from file count",
        })
    }
}

#[async_trait]
impl TransferEngine for SimulatedSession {
    async fn parse_descriptor(&mut self, path: &Path) -> TorrentResult<TransferMetadata> {
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            invalid_descriptor(
                path,
                MetainfoError::Io {
                    path: path.to_path_buf(),
                    source,
                },
            )
        })?;
        parse_metainfo(&bytes).map_err(|err| invalid_descriptor(path, err))
    }

    async fn start_transfer(&mut self, request: StartRequest) -> TorrentResult<TransferHandle> {
        let info_hash = request.metadata.info_hash.clone();
        if let Some(existing) = self.by_hash.get(&info_hash) {
            if request.duplicate_is_error {
                return Err(TorrentError::Duplicate { info_hash });
            }
            return Ok(*existing);
        }
        check_priorities(&request.metadata, &request.priorities)
            .map_err(|err| op_failed("start_transfer", None, err))?;
        prepare_storage(&request.save_path, &request.metadata, &request.priorities)
            .await
            .map_err(|err| op_failed("start_transfer", None, err))?;

        let handle = TransferHandle::new();
        let state = if request.paused {
            TransferState::Paused
        } else {
            TransferState::Downloading
        };
        info!(
            %handle,
            name = %request.metadata.name,
            info_hash = %info_hash,
            save_path = %request.save_path.display(),
            sequential = request.sequential,
            auto_managed = request.auto_managed,
            "transfer admitted"
        );
        self.transfers.insert(
            handle,
            SimTransfer {
                metadata: request.metadata,
                priorities: request.priorities,
                sequential: request.sequential,
                state,
                finished: BTreeSet::new(),
                bytes_downloaded: 0,
            },
        );
        self.by_hash.insert(info_hash, handle);
        self.order.push(handle);
        self.push_state(handle, TransferState::CheckingFiles, state);
        Ok(handle)
    }

    async fn poll_alerts(&mut self) -> TorrentResult<Vec<Alert>> {
        let now = Instant::now();
        if now.duration_since(self.last_round) >= self.config.round_interval {
            self.last_round = now;
            self.advance_round();
        }
        Ok(std::mem::take(&mut self.pending))
    }

    async fn status(&mut self, handle: TransferHandle) -> TorrentResult<TransferStatus> {
        let transfer = self.transfer_mut(handle)?;
        Ok(TransferStatus {
            state: transfer.state,
            bytes_downloaded: transfer.bytes_downloaded,
            total_pieces: transfer.metadata.piece_count,
            pieces_finished: u32::try_from(transfer.finished.len()).unwrap_or(u32::MAX),
        })
    }

    async fn metadata(&mut self, handle: TransferHandle) -> TorrentResult<TransferMetadata> {
        Ok(self.transfer_mut(handle)?.metadata.clone())
    }

    async fn set_file_priorities(
        &mut self,
        handle: TransferHandle,
        priorities: &[FilePriority],
    ) -> TorrentResult<()> {
        let transfer = self.transfer_mut(handle)?;
        check_priorities(&transfer.metadata, priorities)
            .map_err(|err| op_failed("set_file_priorities", Some(handle), err))?;
        transfer.priorities = priorities.to_vec();
        let previous = transfer.state;
        let reopened = matches!(previous, TransferState::Finished | TransferState::Seeding)
            && !transfer.wanted_pieces().is_empty();
        if reopened {
            transfer.state = TransferState::Downloading;
            self.push_state(handle, previous, TransferState::Downloading);
        }
        debug!(%handle, files = priorities.len(), "file priorities replaced");
        Ok(())
    }

    async fn pause(&mut self, handle: TransferHandle) -> TorrentResult<()> {
        let transfer = self.transfer_mut(handle)?;
        let previous = transfer.state;
        transfer.state = TransferState::Paused;
        self.push_state(handle, previous, TransferState::Paused);
        debug!(%handle, "transfer paused");
        Ok(())
    }

    async fn shutdown(&mut self) -> TorrentResult<()> {
        info!(transfers = self.transfers.len(), "engine session closed");
        self.transfers.clear();
        self.by_hash.clear();
        self.order.clear();
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegrab_torrent_core::TorrentFile;
    use std::time::Duration;
    use tempfile::TempDir;

    fn metadata(sizes: &[u64], piece_length: u64) -> TransferMetadata {
        let mut offset = 0;
        let files = sizes
            .iter()
            .zip(0_u32..)
            .map(|(size, index)| {
                let file = TorrentFile {
                    index,
                    path: format!("part-{index}.bin"),
                    size_bytes: *size,
                    offset,
                };
                offset += size;
                file
            })
            .collect();
        let total_size = sizes.iter().sum::<u64>();
        TransferMetadata {
            name: "pack".to_string(),
            info_hash: format!("{:040}", sizes.len()),
            piece_length,
            piece_count: u32::try_from(total_size.div_ceil(piece_length)).unwrap_or(0),
            total_size,
            files,
        }
    }

    fn session(pieces_per_round: u32) -> SimulatedSession {
        SimulatedSession::new(EngineRuntimeConfig {
            pieces_per_round,
            round_interval: Duration::from_secs(2),
            ..EngineRuntimeConfig::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn start_emits_checking_to_downloading() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut session = session(2);
        let handle = session
            .start_transfer(StartRequest::new(metadata(&[30], 10), temp.path(), Vec::new()))
            .await?;
        assert_eq!(
            session.poll_alerts().await?,
            vec![Alert::StateChanged {
                handle,
                previous: TransferState::CheckingFiles,
                current: TransferState::Downloading,
            }]
        );
        assert!(session.poll_alerts().await?.is_empty());
        let file = std::fs::metadata(temp.path().join("part-0.bin"))?;
        assert_eq!(file.len(), 30);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn rounds_advance_once_per_interval() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut session = session(2);
        let handle = session
            .start_transfer(StartRequest::new(metadata(&[30], 10), temp.path(), Vec::new()))
            .await?;
        session.poll_alerts().await?;

        tokio::time::advance(Duration::from_secs(2)).await;
        let first = session.poll_alerts().await?;
        assert_eq!(
            first,
            vec![
                Alert::PieceFinished {
                    handle,
                    piece_index: 0
                },
                Alert::PieceFinished {
                    handle,
                    piece_index: 1
                },
            ]
        );
        assert!(session.poll_alerts().await?.is_empty());

        tokio::time::advance(Duration::from_secs(2)).await;
        let second = session.poll_alerts().await?;
        assert_eq!(
            second.last(),
            Some(&Alert::StateChanged {
                handle,
                previous: TransferState::Downloading,
                current: TransferState::Seeding,
            })
        );
        let status = session.status(handle).await?;
        assert_eq!(status.bytes_downloaded, 30);
        assert_eq!(status.pieces_finished, 3);
        assert_eq!(status.state, TransferState::Seeding);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn skipped_files_are_not_fetched() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut session = session(10);
        let priorities = vec![FilePriority::Skip, FilePriority::Fetch, FilePriority::Skip];
        let handle = session
            .start_transfer(StartRequest::new(
                metadata(&[20, 10, 20], 10),
                temp.path(),
                priorities,
            ))
            .await?;
        assert!(temp.path().join("pack").join("part-1.bin").exists());
        assert!(!temp.path().join("pack").join("part-0.bin").exists());

        tokio::time::advance(Duration::from_secs(2)).await;
        let alerts = session.poll_alerts().await?;
        assert!(alerts.contains(&Alert::PieceFinished {
            handle,
            piece_index: 2
        }));
        let status = session.status(handle).await?;
        assert_eq!(status.pieces_finished, 1);
        assert_eq!(status.state, TransferState::Finished);
        Ok(())
    }

    #[tokio::test]
    async fn duplicates_and_bad_priorities_are_rejected() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut session = session(1);
        let meta = metadata(&[10, 10], 10);
        session
            .start_transfer(StartRequest::new(meta.clone(), temp.path(), Vec::new()))
            .await?;
        let err = session
            .start_transfer(StartRequest::new(meta.clone(), temp.path(), Vec::new()))
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, TorrentError::Duplicate { .. }));

        let other = TransferMetadata {
            info_hash: "f".repeat(40),
            ..meta
        };
        let err = session
            .start_transfer(StartRequest::new(
                other,
                temp.path(),
                vec![FilePriority::Fetch],
            ))
            .await
            .expect_err("short priority vector must fail");
        assert!(matches!(
            err,
            TorrentError::OperationFailed {
                operation: "start_transfer",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn pause_and_unknown_handles() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut session = session(1);
        let handle = session
            .start_transfer(StartRequest::new(metadata(&[10], 10), temp.path(), Vec::new()))
            .await?;
        session.poll_alerts().await?;
        session.pause(handle).await?;
        assert_eq!(
            session.poll_alerts().await?,
            vec![Alert::StateChanged {
                handle,
                previous: TransferState::Downloading,
                current: TransferState::Paused,
            }]
        );
        let missing = TransferHandle::new();
        assert!(matches!(
            session.status(missing).await,
            Err(TorrentError::NotFound { .. })
        ));
        session.shutdown().await?;
        assert!(session.metadata(handle).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn parse_descriptor_rejects_missing_and_garbage_files() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut session = session(1);
        let garbage = temp.path().join("garbage.torrent");
        std::fs::write(&garbage, b"hello")?;
        for path in [temp.path().join("missing.torrent"), garbage] {
            let err = session
                .parse_descriptor(&path)
                .await
                .expect_err("invalid descriptor");
            assert!(matches!(err, TorrentError::InvalidDescriptor { .. }));
        }
        Ok(())
    }
}
