use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::repository::{EventRepository, SyncReport};
use crate::sync::Connectivity;
use crate::utils::error::Result;

/// `tokio::time::interval` panics on a zero period.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically re-pushes unsynced events while the backend is reachable.
pub struct SyncScheduler {
    repository: EventRepository,
    connectivity: Arc<dyn Connectivity>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(
        repository: EventRepository,
        connectivity: Arc<dyn Connectivity>,
        interval: Duration,
    ) -> Self {
        let interval = if interval < MIN_INTERVAL {
            warn!(requested_ms = interval.as_millis() as u64, "Sync interval too short, using 1s");
            MIN_INTERVAL
        } else {
            interval
        };

        Self {
            repository,
            connectivity,
            interval,
        }
    }

    /// One guarded run. `None` when the network precondition did not hold.
    pub async fn run_once(&self) -> Result<Option<SyncReport>> {
        if !self.connectivity.is_online().await {
            debug!("Sync skipped: backend unreachable");
            return Ok(None);
        }

        let report = self.repository.sync_events().await?;
        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                pushed = report.pushed,
                failed = report.failed,
                superseded = report.superseded,
                "Sync run finished"
            );
        } else {
            debug!("Sync run finished, nothing pending");
        }
        Ok(Some(report))
    }

    /// Starts the loop on the current runtime. The first run happens right
    /// away; dropping the handle stops the loop as well.
    pub fn spawn(self) -> SyncHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let trigger = Arc::new(Notify::new());
        let wake = trigger.clone();

        info!(interval_secs = self.interval.as_secs(), "Starting sync scheduler");

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = wake.notified() => debug!("Sync requested"),
                    _ = shutdown_rx.changed() => break,
                }

                if let Err(e) = self.run_once().await {
                    error!("Sync error: {}", e);
                }
            }

            info!("Sync scheduler stopped");
        });

        SyncHandle {
            shutdown_tx,
            trigger,
            task,
        }
    }
}

pub struct SyncHandle {
    shutdown_tx: watch::Sender<bool>,
    trigger: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Runs a sync without waiting for the next tick.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Stops the loop, letting an in-flight run finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("Sync task ended abnormally: {}", e);
        }
    }
}
