// Status poller
//
// Idle until started, then fetches the attack status map on a fixed period
// and reconciles every bound row against it. A failed tick is logged and the next
// tick runs as usual. The loop runs until cancelled through its PollHandle;
// dropping the handle detaches the loop instead of stopping it.

use crate::dispatch::Dashboard;
use crate::reconcile::reconcile_row;
use crate::Result;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// Fetch the status map once and apply it to the view. Returns the number of
/// rows reconciled.
///
/// The backend forgets stopped attacks, so a bound row missing from the map
/// is reconciled as not running, unless its start request is still pending.
pub async fn poll_status_once(dashboard: &Dashboard) -> Result<usize> {
    let status = dashboard.api().attack_status().await?;

    let applied = dashboard.view().update(|view| {
        let mut applied = 0;
        for (kind, running) in &status {
            if reconcile_row(view, kind, *running) {
                applied += 1;
            }
        }

        let absent: Vec<String> = view
            .rows()
            .filter(|row| row.start.enabled && !status.contains_key(&row.kind))
            .map(|row| row.kind.clone())
            .collect();
        for kind in &absent {
            reconcile_row(view, kind, false);
        }

        view.last_poll = Some(Utc::now());
        applied + absent.len()
    });

    debug!(
        target: "poller",
        reported = status.len(),
        applied,
        "Status reconciled"
    );
    Ok(applied)
}

pub struct StatusPoller {
    dashboard: Dashboard,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(dashboard: Dashboard) -> Self {
        let interval = dashboard.config().poll_interval();
        Self {
            dashboard,
            interval,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Leave Idle. Polling only begins when the view has at least one attack
    /// row; otherwise the poller stays Idle and `None` is returned. The first
    /// tick fires immediately.
    pub fn start(self) -> Option<PollHandle> {
        if !self.dashboard.view().read(|v| v.has_rows()) {
            info!(target: "poller", "No attack rows bound; status polling stays idle");
            return None;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let tick_counter = Arc::clone(&ticks);
        let dashboard = self.dashboard;
        let period = self.interval;

        info!(target: "poller", interval_ms = period.as_millis() as u64, "Status polling started");

        let task = tokio::spawn(async move {
            let cancelled = async {
                if shutdown_rx.wait_for(|stop| *stop).await.is_err() {
                    // Handle dropped without cancelling: keep polling
                    std::future::pending::<()>().await;
                }
            };
            tokio::pin!(cancelled);

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = interval.tick() => {
                        tick_counter.fetch_add(1, Ordering::Relaxed);
                        if let Err(e) = poll_status_once(&dashboard).await {
                            warn!(target: "poller", error = %e, "Status poll failed");
                        }
                    }
                }
            }
            info!(target: "poller", "Status polling stopped");
        });

        Some(PollHandle {
            shutdown_tx,
            task,
            ticks,
        })
    }
}

/// Cancellation handle of a running poll loop
pub struct PollHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
}

impl PollHandle {
    pub fn state(&self) -> PollerState {
        if self.task.is_finished() {
            PollerState::Idle
        } else {
            PollerState::Polling
        }
    }

    /// Number of ticks started so far
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Request the loop to stop after the current tick
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Cancel and wait for the loop to exit
    pub async fn shutdown(self) {
        self.cancel();
        if let Err(e) = self.task.await {
            warn!(target: "poller", error = %e, "Poll task ended abnormally");
        }
    }
}
