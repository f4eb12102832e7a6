use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::HeatmapBackend;
use crate::errors::{AppError, AppResult};
use crate::host::{
    Clipboard, Dialog, GeolocationError, Geolocator, ProfileView, Toast, ToastId, Toaster,
};
use crate::map::LatLng;
use crate::profile::ActivitySummary;
use crate::query::{QueryParams, SessionToken};
use crate::status::ProcessingState;

#[derive(Default)]
pub struct FakeBackend {
    states: Mutex<VecDeque<AppResult<ProcessingState>>>,
    summaries: Mutex<VecDeque<AppResult<ActivitySummary>>>,
    syncs: Mutex<VecDeque<AppResult<()>>>,
    shares: Mutex<VecDeque<AppResult<String>>>,
    forwarded: Mutex<Vec<QueryParams>>,
    sync_calls: AtomicUsize,
    state_tokens: Mutex<Vec<String>>,
    state_latency: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBackend {
    pub fn push_state(&self, state: AppResult<ProcessingState>) {
        self.states.lock().push_back(state);
    }

    /// Every status fetch sleeps this long before answering.
    pub fn set_state_latency(&self, latency: Duration) {
        *self.state_latency.lock() = latency;
    }

    pub fn state_calls(&self) -> usize {
        self.state_tokens.lock().len()
    }

    pub fn state_tokens(&self) -> Vec<String> {
        self.state_tokens.lock().clone()
    }

    /// Highest number of status fetches observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn push_summary(&self, summary: AppResult<ActivitySummary>) {
        self.summaries.lock().push_back(summary);
    }

    pub fn push_sync(&self, result: AppResult<()>) {
        self.syncs.lock().push_back(result);
    }

    pub fn set_share(&self, result: AppResult<String>) {
        self.shares.lock().push_back(result);
    }

    pub fn forwarded(&self) -> Vec<QueryParams> {
        self.forwarded.lock().clone()
    }

    pub fn sync_calls(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HeatmapBackend for FakeBackend {
    async fn processing_state(&self, token: &SessionToken) -> AppResult<ProcessingState> {
        self.state_tokens.lock().push(token.expose().to_string());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let latency = *self.state_latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.states
            .lock()
            .pop_front()
            .unwrap_or(Ok(ProcessingState::ImportingActivities))
    }

    async fn unprocessed_activities(&self, params: &QueryParams) -> AppResult<ActivitySummary> {
        self.forwarded.lock().push(params.clone());
        self.summaries
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Config("no summary scripted".into())))
    }

    async fn sync_activities(&self, params: &QueryParams) -> AppResult<()> {
        self.forwarded.lock().push(params.clone());
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.syncs.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn share_path(&self) -> AppResult<String> {
        self.shares
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok("/shared/default".into()))
    }
}

pub struct FakeClipboard {
    allowed: bool,
    contents: Mutex<Option<String>>,
}

impl FakeClipboard {
    pub fn working() -> Self {
        Self {
            allowed: true,
            contents: Mutex::new(None),
        }
    }

    pub fn denied() -> Self {
        Self {
            allowed: false,
            contents: Mutex::new(None),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

#[async_trait]
impl Clipboard for FakeClipboard {
    async fn write_text(&self, text: &str) -> AppResult<()> {
        if !self.allowed {
            return Err(AppError::Clipboard("document is not focused".into()));
        }
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingToaster {
    shown: Mutex<Vec<(ToastId, Toast)>>,
}

impl RecordingToaster {
    pub fn visible(&self) -> Vec<(ToastId, Toast)> {
        self.shown.lock().clone()
    }
}

impl Toaster for RecordingToaster {
    fn show(&self, id: ToastId, toast: &Toast) {
        let mut shown = self.shown.lock();
        shown.clear();
        shown.push((id, toast.clone()));
    }

    fn dismiss(&self, id: ToastId) {
        self.shown.lock().retain(|(shown, _)| *shown != id);
    }
}

#[derive(Default)]
pub struct RecordingDialog {
    alerts: Mutex<Vec<String>>,
}

impl RecordingDialog {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl Dialog for RecordingDialog {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

pub struct FixedGeolocator {
    result: Result<LatLng, GeolocationError>,
}

impl FixedGeolocator {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            result: Ok(LatLng::new(lat, lng)),
        }
    }

    pub fn failing(err: GeolocationError) -> Self {
        Self { result: Err(err) }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<LatLng, GeolocationError> {
        self.result
    }
}

#[derive(Default)]
pub struct RecordingProfileView {
    pub messages: Mutex<Vec<String>>,
    pub summary: Mutex<Option<ActivitySummary>>,
    pub sync_enabled: Mutex<Vec<bool>>,
}

impl RecordingProfileView {
    pub fn last_message(&self) -> Option<String> {
        self.messages.lock().last().cloned()
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled.lock().last().copied().unwrap_or(false)
    }
}

impl ProfileView for RecordingProfileView {
    fn set_message(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }

    fn show_summary(&self, summary: Option<&ActivitySummary>) {
        *self.summary.lock() = summary.cloned();
    }

    fn set_sync_enabled(&self, enabled: bool) {
        self.sync_enabled.lock().push(enabled);
    }
}
