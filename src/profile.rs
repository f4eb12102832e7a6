use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::HeatmapBackend;
use crate::host::{Dialog, PageNavigator, ProfileView};
use crate::query::QueryParamStore;

const MISSING_TOKEN_MESSAGE: &str = "Did not find auth token! Please login...";

/// Activity counts from `unprocessedactivities`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub total: u64,
    pub new: usize,
    pub unsynced: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutcome {
    Loaded(ActivitySummary),
    MissingToken,
    Unavailable,
}

pub struct ProfilePage {
    backend: Arc<dyn HeatmapBackend>,
    params: Arc<QueryParamStore>,
    view: Arc<dyn ProfileView>,
    dialog: Arc<dyn Dialog>,
    navigator: Arc<dyn PageNavigator>,
}

impl ProfilePage {
    pub fn new(
        backend: Arc<dyn HeatmapBackend>,
        params: Arc<QueryParamStore>,
        view: Arc<dyn ProfileView>,
        dialog: Arc<dyn Dialog>,
        navigator: Arc<dyn PageNavigator>,
    ) -> Self {
        Self {
            backend,
            params,
            view,
            dialog,
            navigator,
        }
    }

    pub async fn load(&self) -> ProfileOutcome {
        self.view.set_sync_enabled(false);
        self.view.show_summary(None);

        if self.params.token().is_none() {
            self.dialog.alert(MISSING_TOKEN_MESSAGE);
            self.navigator.navigate(&self.params.url_bar().origin());
            return ProfileOutcome::MissingToken;
        }

        self.view.set_message("Loading Profile...");
        match self
            .backend
            .unprocessed_activities(&self.params.snapshot())
            .await
        {
            Ok(summary) => {
                info!(
                    total = summary.total,
                    new = summary.new,
                    unsynced = summary.unsynced,
                    "profile loaded"
                );
                self.view.set_message("Profile Loaded...");
                self.view.show_summary(Some(&summary));
                self.view.set_sync_enabled(summary.unsynced > 0);
                ProfileOutcome::Loaded(summary)
            }
            Err(err) => {
                warn!(?err, "failed to load profile");
                self.view.set_message("Unable to load profile.");
                ProfileOutcome::Unavailable
            }
        }
    }

    /// Syncs pending activities, then reloads the summary.
    pub async fn sync(&self) -> ProfileOutcome {
        self.view.set_sync_enabled(false);
        self.view.set_message("Syncing Activities...");

        if let Err(err) = self
            .backend
            .sync_activities(&self.params.snapshot())
            .await
        {
            warn!(?err, "activity sync failed");
            self.view.set_message("Sync failed. Please try again.");
            self.view.set_sync_enabled(true);
            return ProfileOutcome::Unavailable;
        }

        self.load().await
    }
}
