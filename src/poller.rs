use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::HeatmapBackend;
use crate::host::StatusView;
use crate::query::SessionToken;

/// Cancellable handle on the repeating status refresh.
#[derive(Clone)]
pub struct RefreshTimer {
    cancelled: Arc<watch::Sender<bool>>,
}

impl RefreshTimer {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            cancelled: Arc::new(tx),
        }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_active(&self) -> bool {
        !*self.cancelled.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for RefreshTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Rendered a non-terminal state.
    Pending,
    /// Rendered the terminal state and cancelled the timer.
    Finished,
    /// Fetch failed; the next tick retries.
    FetchFailed,
    /// Timer already cancelled, nothing fetched.
    Stopped,
}

pub struct StatusPoller {
    backend: Arc<dyn HeatmapBackend>,
    view: Arc<dyn StatusView>,
    token: SessionToken,
    period: Duration,
    timer: RefreshTimer,
}

impl StatusPoller {
    pub fn new(
        backend: Arc<dyn HeatmapBackend>,
        view: Arc<dyn StatusView>,
        token: SessionToken,
        period: Duration,
    ) -> Self {
        Self {
            backend,
            view,
            token,
            period,
            timer: RefreshTimer::new(),
        }
    }

    pub fn timer(&self) -> RefreshTimer {
        self.timer.clone()
    }

    /// Polls immediately and then once per period until the terminal state is
    /// reached or the timer is cancelled. Each tick finishes its fetch before
    /// the next one starts.
    pub async fn run(&self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = self.timer.cancelled() => break,
                _ = ticker.tick() => {
                    if self.poll_once().await == PollOutcome::Finished {
                        break;
                    }
                }
            }
        }
        info!("status polling stopped");
    }

    /// One tick. Never fails: fetch errors are logged and left for the next
    /// tick.
    pub async fn poll_once(&self) -> PollOutcome {
        if !self.timer.is_active() {
            return PollOutcome::Stopped;
        }

        let state = match self.backend.processing_state(&self.token).await {
            Ok(state) => state,
            Err(err) => {
                warn!(?err, "failed to fetch processing state");
                return PollOutcome::FetchFailed;
            }
        };

        // cancelled while the request was in flight
        if !self.timer.is_active() {
            return PollOutcome::Stopped;
        }

        debug!(state = state.tag(), "rendering processing state");
        self.view.show_status(&state.status_line());

        if state.is_terminal() {
            self.timer.cancel();
            return PollOutcome::Finished;
        }
        PollOutcome::Pending
    }
}
