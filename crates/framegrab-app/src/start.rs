//! Transfer admission: validate a descriptor, select files, start, register.

use std::path::{Path, PathBuf};

use framegrab_torrent_core::{
    StartRequest, TransferDescriptor, TransferEngine, TransferHandle, select_files,
    selected_piece_count,
};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, StartError};
use crate::registry::{RegisteredTransfer, TransferRegistry};

/// Absolute form of the configured download root.
///
/// # Errors
///
/// Returns an error when the current directory cannot be determined.
pub fn resolve_save_path(download_root: &Path) -> AppResult<PathBuf> {
    std::path::absolute(download_root)
        .map_err(|source| AppError::io("job.save_path", Some(download_root.to_path_buf()), source))
}

/// Start one descriptor and register its handle.
///
/// Selective descriptors fetch only the target file; simple descriptors
/// pass an empty priority vector and fetch everything.
///
/// # Errors
///
/// Returns [`StartError::InvalidDescriptor`] when the descriptor is missing
/// or unparsable, [`StartError::Engine`] when the engine refuses the
/// transfer, and [`StartError::Registry`] when the handle is already known.
/// A transfer the registry refuses is paused before the error is returned.
pub async fn start_transfer(
    session: &mut dyn TransferEngine,
    registry: &mut TransferRegistry,
    descriptor: &TransferDescriptor,
    save_path: &Path,
) -> Result<TransferHandle, StartError> {
    let path = descriptor.source_path();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(StartError::InvalidDescriptor {
            path: path.to_path_buf(),
            source: None,
        });
    }
    let metadata =
        session
            .parse_descriptor(path)
            .await
            .map_err(|source| StartError::InvalidDescriptor {
                path: path.to_path_buf(),
                source: Some(source),
            })?;

    let job = descriptor.job_metadata();
    let priorities = job
        .as_ref()
        .map(|job| select_files(&metadata.files, &job.target_file))
        .unwrap_or_default();
    let selected_pieces = if job.is_some() {
        selected_piece_count(&metadata, &priorities)
    } else {
        metadata.piece_count
    };
    if !metadata.is_resolved() {
        debug!(descriptor = %path.display(), "transfer metadata lists no files");
    } else if let Some(job) = &job
        && !priorities.iter().any(|priority| priority.is_selected())
    {
        warn!(
            descriptor = %path.display(),
            target_file = %job.target_file,
            "target file not present in transfer"
        );
    }

    let name = metadata.name.clone();
    let request = StartRequest::new(metadata, save_path, priorities);
    let handle = session
        .start_transfer(request)
        .await
        .map_err(|source| StartError::Engine {
            path: path.to_path_buf(),
            source,
        })?;
    if let Err(source) = registry.register(handle, RegisteredTransfer::new(job, selected_pieces)) {
        match session.pause(handle).await {
            Ok(()) => warn!(%handle, "unregistered transfer paused"),
            Err(err) => warn!(%handle, error = %err, "unregistered transfer could not be paused"),
        }
        return Err(StartError::Registry { source });
    }
    info!(%handle, name = %name, descriptor = %path.display(), "transfer started");
    Ok(handle)
}

/// Start every descriptor, skipping the ones that fail. Returns the started
/// handles in descriptor order.
pub async fn start_batch(
    session: &mut dyn TransferEngine,
    registry: &mut TransferRegistry,
    descriptors: &[TransferDescriptor],
    save_path: &Path,
) -> Vec<TransferHandle> {
    let mut handles = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        match start_transfer(session, registry, descriptor, save_path).await {
            Ok(handle) => handles.push(handle),
            Err(err @ StartError::InvalidDescriptor { .. }) => {
                debug!(
                    descriptor = %descriptor.source_path().display(),
                    error = %err,
                    "skipping invalid descriptor"
                );
            }
            Err(err) => {
                warn!(
                    descriptor = %descriptor.source_path().display(),
                    error = %err,
                    "skipping descriptor"
                );
            }
        }
    }
    handles
}
