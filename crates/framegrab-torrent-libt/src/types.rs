//! Strongly typed inputs applied when an engine session is created.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Client fingerprint advertised in the peer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerFingerprint {
    /// Two-letter client identifier.
    pub client_id: [u8; 2],
    /// Major, minor, revision and tag version digits.
    pub version: [u8; 4],
}

impl PeerFingerprint {
    /// Azureus-style peer id prefix, for example `-FG0010-`.
    #[must_use]
    pub fn prefix(&self) -> String {
        let mut prefix = String::with_capacity(8);
        prefix.push('-');
        prefix.extend(self.client_id.iter().map(|byte| char::from(*byte)));
        prefix.extend(
            self.version
                .iter()
                .map(|digit| char::from_digit(u32::from(*digit % 10), 10).unwrap_or('0')),
        );
        prefix.push('-');
        prefix
    }
}

impl Default for PeerFingerprint {
    fn default() -> Self {
        Self {
            client_id: *b"FG",
            version: [0, 0, 1, 0],
        }
    }
}

/// Alert categories the session queues for the grabber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertMask {
    /// State transitions of transfers.
    pub status: bool,
    /// Piece completion notifications.
    pub progress: bool,
}

impl Default for AlertMask {
    fn default() -> Self {
        Self {
            status: true,
            progress: true,
        }
    }
}

/// Runtime parameters applied to the engine session.
#[derive(Debug, Clone)]
pub struct EngineRuntimeConfig {
    /// Inclusive port range the session listens on.
    pub listen_ports: RangeInclusive<u16>,
    /// Identity advertised to peers.
    pub fingerprint: PeerFingerprint,
    /// Alert categories queued for polling.
    pub alert_mask: AlertMask,
    /// Pieces the simulated session completes per round.
    pub pieces_per_round: u32,
    /// Minimum time between two simulated rounds.
    pub round_interval: Duration,
}

impl Default for EngineRuntimeConfig {
    fn default() -> Self {
        Self {
            listen_ports: 6681..=6689,
            fingerprint: PeerFingerprint::default(),
            alert_mask: AlertMask::default(),
            pieces_per_round: 4,
            round_interval: Duration::from_millis(2_000),
        }
    }
}
