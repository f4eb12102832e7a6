use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::api::HeatmapBackend;
use crate::errors::AppResult;
use crate::host::{Clipboard, Toast, ToastId, ToastKind, Toaster, UrlBar};

const COPIED_LINE: &str = "Link copied to clipboard!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared { url: String, copied: bool },
    Failed,
}

pub struct ShareWidget {
    backend: Arc<dyn HeatmapBackend>,
    url_bar: Arc<dyn UrlBar>,
    clipboard: Arc<dyn Clipboard>,
    toaster: Arc<dyn Toaster>,
    toast_duration: Duration,
    next_toast: AtomicU64,
}

impl ShareWidget {
    pub fn new(
        backend: Arc<dyn HeatmapBackend>,
        url_bar: Arc<dyn UrlBar>,
        clipboard: Arc<dyn Clipboard>,
        toaster: Arc<dyn Toaster>,
        toast_duration: Duration,
    ) -> Self {
        Self {
            backend,
            url_bar,
            clipboard,
            toaster,
            toast_duration,
            next_toast: AtomicU64::new(1),
        }
    }

    /// Requests a share link, copies it when the clipboard allows and shows a
    /// toast that dismisses itself.
    pub async fn share(&self) -> ShareOutcome {
        let url = match self.create_link().await {
            Ok(url) => url,
            Err(err) => {
                warn!(?err, "failed to create share link");
                self.show_toast(Toast {
                    kind: ToastKind::Error,
                    lines: vec![format!("Could not create a share link. Error: {err}")],
                });
                return ShareOutcome::Failed;
            }
        };

        let copied = match self.clipboard.write_text(&url).await {
            Ok(()) => true,
            Err(err) => {
                debug!(?err, "share link not copied to clipboard");
                false
            }
        };

        let mut lines = vec![format!("Share your map: {url}")];
        if copied {
            lines.push(COPIED_LINE.to_string());
        }
        self.show_toast(Toast {
            kind: ToastKind::Info,
            lines,
        });

        ShareOutcome::Shared { url, copied }
    }

    async fn create_link(&self) -> AppResult<String> {
        let path = self.backend.share_path().await?;
        share_url(&self.url_bar.origin(), &path)
    }

    fn show_toast(&self, toast: Toast) -> ToastId {
        let id = ToastId(self.next_toast.fetch_add(1, Ordering::SeqCst));
        self.toaster.show(id, &toast);

        let toaster = Arc::clone(&self.toaster);
        let delay = self.toast_duration;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            toaster.dismiss(id);
        });
        id
    }
}

fn share_url(origin: &str, path: &str) -> AppResult<String> {
    let base = Url::parse(&format!("{}/", origin.trim_end_matches('/')))?;
    Ok(base.join(path)?.to_string())
}
