//! Surfaces supplied by whatever hosts the client: a browser binding, the
//! terminal binary or a test fake. Every trait is object safe and the
//! controllers hold them as `Arc<dyn ..>`.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use thiserror::Error;

use crate::errors::AppResult;
use crate::map::LatLng;
use crate::profile::ActivitySummary;
use crate::status::StatusLine;

/// The page address bar.
pub trait UrlBar: Send + Sync {
    /// Scheme, host and port, e.g. `https://heatmap.example.com`.
    fn origin(&self) -> String;
    /// Current query string including the leading `?`, or empty.
    fn search(&self) -> String;
    /// Swaps the query string of the current history entry. Must not add a
    /// navigation entry or reload the page.
    fn replace_search(&self, search: &str);
}

pub trait PageNavigator: Send + Sync {
    fn navigate(&self, url: &str);
}

pub trait Dialog: Send + Sync {
    /// Blocking alert.
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out waiting for a position")]
    Timeout,
    #[error("geolocation is not supported on this device")]
    Unsupported,
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    /// One-shot fix.
    async fn current_position(&self) -> Result<LatLng, GeolocationError>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub lines: Vec<String>,
}

pub trait Toaster: Send + Sync {
    fn show(&self, id: ToastId, toast: &Toast);
    /// Dismissing an id that is no longer shown is a no-op.
    fn dismiss(&self, id: ToastId);
}

pub trait StatusView: Send + Sync {
    fn show_status(&self, line: &StatusLine);
}

pub trait ProfileView: Send + Sync {
    fn set_message(&self, message: &str);
    fn show_summary(&self, summary: Option<&ActivitySummary>);
    fn set_sync_enabled(&self, enabled: bool);
}

/// Address bar kept in memory. Used by the terminal host and in tests.
pub struct MemoryUrlBar {
    origin: String,
    search: RwLock<String>,
    replacements: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl MemoryUrlBar {
    pub fn new(origin: impl Into<String>, search: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            search: RwLock::new(search.into()),
            replacements: AtomicUsize::new(0),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn replacements(&self) -> usize {
        self.replacements.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }
}

impl UrlBar for MemoryUrlBar {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn search(&self) -> String {
        self.search.read().clone()
    }

    fn replace_search(&self, search: &str) {
        *self.search.write() = search.to_string();
        self.replacements.fetch_add(1, Ordering::SeqCst);
    }
}

impl PageNavigator for MemoryUrlBar {
    fn navigate(&self, url: &str) {
        self.navigations.lock().push(url.to_string());
    }
}
