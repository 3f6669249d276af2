//! Periodic background refresh bound to a planner session.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::planner::PlannerStores;

/// Handle to the refresh loop. Dropping it stops the loop.
pub struct RefreshTask {
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Refreshes every cache now and then once per `period`.
    pub fn spawn(stores: PlannerStores, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = period.as_millis() as u64, "refresh task started");
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // A refresh still in flight at cancellation is dropped before it
                // can write to the caches.
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    result = stores.refresh_all() => {
                        if let Err(e) = result {
                            warn!(error = %e, "background refresh incomplete");
                        }
                    }
                }
            }
            debug!("refresh task stopped");
        });

        Self {
            cancel_token,
            handle: Some(handle),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Cancels and waits for the loop to exit.
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "refresh task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
