#![allow(clippy::redundant_pub_crate)]

use framegrab_torrent_core::{TorrentResult, TransferEngine};
use tracing::{info, warn};

use crate::types::EngineRuntimeConfig;

mod simulated;

pub use simulated::SimulatedSession;

/// Open the simulated engine session used for the lifetime of one job.
///
/// The session completes pieces on a timer and writes zero-filled storage;
/// it never contacts peers.
///
/// # Errors
///
/// Returns an error when the session cannot be initialised.
pub fn create_session(config: EngineRuntimeConfig) -> TorrentResult<Box<dyn TransferEngine>> {
    info!(
        peer_id_prefix = %config.fingerprint.prefix(),
        listen_start = *config.listen_ports.start(),
        listen_end = *config.listen_ports.end(),
        "opening engine session"
    );
    warn!("simulated engine: no payload data is fetched from peers");
    Ok(Box::new(SimulatedSession::new(config)))
}
