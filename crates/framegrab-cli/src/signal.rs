//! Cancellation triggers: interrupt signal and a byte on stdin.

use std::future::pending;
use std::io::Read;

use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

/// Read one byte from stdin on a detached thread.
///
/// The receiver errors when stdin closes or fails, which disarms the trigger.
pub(crate) fn spawn_keypress_watch() -> oneshot::Receiver<()> {
    let (pressed_tx, pressed_rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("framegrab-stdin".to_string())
        .spawn(move || {
            let mut byte = [0_u8; 1];
            match std::io::stdin().read(&mut byte) {
                Ok(0) => debug!("stdin closed; keypress cancellation disabled"),
                Ok(_) => {
                    let _ = pressed_tx.send(());
                }
                Err(err) => {
                    warn!(error = %err, "stdin unreadable; keypress cancellation disabled");
                }
            }
        });
    if let Err(err) = spawned {
        warn!(error = %err, "failed to start keypress watcher");
    }
    pressed_rx
}

/// Flip `cancel` to `true` on interrupt or keypress.
pub(crate) async fn watch_for_cancel(
    cancel: watch::Sender<bool>,
    keypress: Option<oneshot::Receiver<()>>,
) {
    let reason = tokio::select! {
        () = interrupt() => "interrupt",
        () = pressed(keypress) => "keypress",
    };
    info!(reason, "cancellation requested");
    let _ = cancel.send(true);
}

async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "interrupt handler unavailable");
        pending::<()>().await;
    }
}

async fn pressed(keypress: Option<oneshot::Receiver<()>>) {
    if let Some(receiver) = keypress
        && receiver.await.is_ok()
    {
        return;
    }
    pending::<()>().await;
}
