//! Background compaction of expired rate-limit windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use sharegate_core::traits::clock::Clock;
use sharegate_core::traits::rate_limit::RateLimitStore;

/// Periodically purges counters whose window has ended.
#[derive(Debug, Clone)]
pub struct RateLimitSweeper {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimitSweeper {
    /// Creates a sweeper over `store`.
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Run one compaction pass. Returns the number of purged counters.
    pub async fn sweep(&self) -> u64 {
        match self.store.purge_expired(self.clock.now()).await {
            Ok(purged) => purged,
            Err(e) => {
                warn!(error = %e, "Rate limit sweep failed");
                0
            }
        }
    }

    /// Sweep every `interval` until `shutdown` turns true or its sender is dropped.
    pub fn spawn(self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Rate limit sweeper started");
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let purged = self.sweep().await;
                        debug!(purged, "Rate limit sweep finished");
                    }
                }
            }

            info!("Rate limit sweeper stopped");
        })
    }
}
