//! Timer-driven refresh of the single-sample view.

use crate::aggregator::Sample;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Source of the single most-recent sample.
#[async_trait]
pub trait LatestSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Sample>;
}

/// Currently displayed latest sample, with an explicit out-of-order policy:
/// a response carrying a lower block height than what is already shown is
/// stale and is ignored. Ticks are independent calls, so a slow earlier
/// response can resolve after a later one.
#[derive(Default)]
pub struct LatestDisplay {
    current: Option<Sample>,
}

impl LatestDisplay {
    /// Apply a fetched sample. Returns false when the sample is stale.
    pub fn apply(&mut self, sample: Sample) -> bool {
        if let Some(current) = &self.current {
            if sample.block_height < current.block_height {
                return false;
            }
        }
        self.current = Some(sample);
        true
    }

    pub fn current(&self) -> Option<&Sample> {
        self.current.as_ref()
    }
}

/// Polls the latest sample at a fixed interval and updates the display.
///
/// Each tick is one independent call; failures keep the previous display
/// value. No backoff, no jitter. The running flag is re-checked after every
/// fetch so a late result is never applied to a torn-down display.
pub struct LatestPoller<S: LatestSource> {
    source: S,
    interval: Duration,
    display: Arc<Mutex<LatestDisplay>>,
    running: Arc<AtomicBool>,
}

impl<S: LatestSource> LatestPoller<S> {
    pub fn new(
        source: S,
        interval: Duration,
        display: Arc<Mutex<LatestDisplay>>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            interval,
            display,
            running,
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub async fn run(self) {
        while self.is_running() {
            match self.source.fetch_latest().await {
                Ok(sample) => {
                    if !self.is_running() {
                        // Torn down while the request was in flight
                        break;
                    }
                    let mut display = self.display.lock();
                    if display.apply(sample.clone()) {
                        info!(
                            "Latest block: {} (price {})",
                            sample.block_height, sample.price
                        );
                    } else {
                        debug!(
                            "Ignoring stale poll response: height {}",
                            sample.block_height
                        );
                    }
                }
                Err(DashboardError::NotFound) => {
                    debug!("Store is empty, nothing to display yet");
                }
                Err(e) => {
                    warn!("Latest-sample poll failed: {}", e);
                }
            }

            self.interruptible_sleep(self.interval).await;
        }
    }

    async fn interruptible_sleep(&self, duration: Duration) {
        let check_interval = Duration::from_millis(50);
        let mut elapsed = Duration::ZERO;

        while elapsed < duration && self.is_running() {
            sleep(check_interval).await;
            elapsed += check_interval;
        }
    }
}
