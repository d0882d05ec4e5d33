//! Engine settings to session runtime mapping.

use framegrab_config::EngineSettings;
use framegrab_torrent_libt::EngineRuntimeConfig;

/// Runtime configuration applied when the job's session opens.
#[must_use]
pub fn runtime_config(settings: &EngineSettings) -> EngineRuntimeConfig {
    EngineRuntimeConfig {
        listen_ports: settings.listen_port_start..=settings.listen_port_end,
        pieces_per_round: settings.pieces_per_poll,
        round_interval: settings.poll_interval(),
        ..EngineRuntimeConfig::default()
    }
}
