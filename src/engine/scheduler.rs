use crate::engine::{PassOutcome, ReconciliationEngine};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Run `engine` every `interval` on the current tokio runtime until `cancel`
/// fires.
///
/// Passes run on the blocking pool because oracle calls are synchronous. The
/// next tick is not taken before the previous pass has finished, and ticks
/// missed meanwhile are dropped rather than replayed.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn(
    engine: Arc<ReconciliationEngine>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(?interval, "reconciler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let engine = Arc::clone(&engine);
            match tokio::task::spawn_blocking(move || engine.run_pass()).await {
                Ok(PassOutcome::Discarded) => break,
                Ok(_) => {}
                Err(e) => warn!(error = %e, "reconciliation pass aborted"),
            }
        }

        debug!("reconciler stopped");
    })
}
