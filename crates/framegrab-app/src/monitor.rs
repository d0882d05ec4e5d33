//! Completion monitor: a timer-driven loop draining engine alerts until a
//! selective transfer is judged complete or the job is cancelled.
//!
//! # Design
//! - One `tokio::time::Interval`; the first tick fires one interval after start.
//! - Every tick drains `poll_alerts` until it returns an empty batch.
//! - Dispatch never ends the process; the outcome is returned to the owner.

use std::time::Duration;

use framegrab_config::EngineSettings;
use framegrab_torrent_core::{Alert, TransferEngine, TransferHandle};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::completion::{is_complete, snapshot};
use crate::registry::TransferRegistry;

/// Timer and heuristic parameters of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Delay between ticks.
    pub poll_interval: Duration,
    /// Bytes a selective transfer must exceed before it can complete.
    pub download_size_threshold: u64,
}

impl From<&EngineSettings> for MonitorSettings {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            download_size_threshold: settings.download_size_threshold,
        }
    }
}

/// Why the monitor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// A selective transfer passed the completion test.
    Completed {
        /// Completed transfer.
        handle: TransferHandle,
    },
    /// The cancellation signal fired.
    Cancelled,
}

/// Drives one job's alert loop over an exclusively borrowed session.
pub struct CompletionMonitor<'a> {
    session: &'a mut dyn TransferEngine,
    registry: &'a mut TransferRegistry,
    settings: MonitorSettings,
}

impl<'a> CompletionMonitor<'a> {
    /// Monitor `registry`'s transfers on `session`.
    #[must_use]
    pub fn new(
        session: &'a mut dyn TransferEngine,
        registry: &'a mut TransferRegistry,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            session,
            registry,
            settings,
        }
    }

    /// Tick until a transfer completes or `cancel` turns `true`.
    ///
    /// Dropping the sender disarms cancellation; the monitor then runs
    /// until completion.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) -> MonitorOutcome {
        if *cancel.borrow_and_update() {
            return MonitorOutcome::Cancelled;
        }
        let period = self.settings.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel_armed = true;

        loop {
            tokio::select! {
                changed = cancel.changed(), if cancel_armed => {
                    if changed.is_err() {
                        cancel_armed = false;
                    } else if *cancel.borrow_and_update() {
                        info!("completion monitor cancelled");
                        return MonitorOutcome::Cancelled;
                    }
                }
                _ = ticker.tick() => {
                    if let Some(handle) = self.tick().await {
                        return MonitorOutcome::Completed { handle };
                    }
                }
            }
        }
    }

    /// Drain the alert queue once. Returns the completed transfer, if any;
    /// alerts after a completion are left unprocessed.
    pub async fn tick(&mut self) -> Option<TransferHandle> {
        loop {
            let alerts = match self.session.poll_alerts().await {
                Ok(alerts) => alerts,
                Err(err) => {
                    warn!(error = %err, "alert poll failed; waiting for next tick");
                    return None;
                }
            };
            if alerts.is_empty() {
                return None;
            }
            for alert in alerts {
                if let Some(handle) = self.dispatch(alert).await {
                    return Some(handle);
                }
            }
        }
    }

    async fn dispatch(&mut self, alert: Alert) -> Option<TransferHandle> {
        let handle = alert.handle();
        if self.registry.entry(handle).is_none() {
            debug!(%handle, "alert for unregistered transfer ignored");
            return None;
        }
        match alert {
            Alert::StateChanged {
                handle,
                previous,
                current,
            } => {
                info!(%handle, %previous, %current, "transfer state changed");
                None
            }
            Alert::PieceFinished {
                handle,
                piece_index,
            } => self.piece_finished(handle, piece_index).await,
        }
    }

    async fn piece_finished(
        &mut self,
        handle: TransferHandle,
        piece_index: u32,
    ) -> Option<TransferHandle> {
        let entry = self.registry.entry(handle)?;
        if entry.is_completed() {
            return None;
        }
        let selective = entry.job.is_some();
        let selected_pieces = entry.selected_pieces;

        let status = match self.session.status(handle).await {
            Ok(status) => status,
            Err(err) => {
                warn!(
                    %handle,
                    piece_index,
                    error = %err,
                    "transfer status unavailable; alert discarded"
                );
                return None;
            }
        };

        if !selective {
            info!(
                %handle,
                piece_index,
                percent = status.percent_complete(),
                "transfer progress"
            );
            return None;
        }

        let progress = snapshot(&status, selected_pieces);
        debug!(
            %handle,
            piece_index,
            bytes_downloaded = progress.bytes_downloaded,
            total_pieces = progress.total_pieces,
            budget = progress.selected_piece_budget,
            "piece finished"
        );
        if is_complete(&progress, self.settings.download_size_threshold)
            && self.registry.mark_completed(handle)
        {
            info!(
                %handle,
                bytes_downloaded = progress.bytes_downloaded,
                "selected file ready for extraction"
            );
            return Some(handle);
        }
        None
    }
}
