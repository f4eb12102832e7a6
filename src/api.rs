use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::profile::ActivitySummary;
use crate::query::{QueryParams, SessionToken, PARAM_TOKEN};
use crate::status::{MapTileCounts, ProcessingState};

const PROCESSING_STATE_PATH: &str = "processingstate";
const UNPROCESSED_ACTIVITIES_PATH: &str = "unprocessedactivities";
const SYNC_ACTIVITIES_PATH: &str = "syncactivities";
const SHARE_PATH: &str = "/share";

/// Endpoints the client depends on.
#[async_trait]
pub trait HeatmapBackend: Send + Sync {
    async fn processing_state(&self, token: &SessionToken) -> AppResult<ProcessingState>;
    async fn unprocessed_activities(&self, params: &QueryParams) -> AppResult<ActivitySummary>;
    async fn sync_activities(&self, params: &QueryParams) -> AppResult<()>;
    /// Path component of a freshly created share link.
    async fn share_path(&self) -> AppResult<String>;
}

#[derive(Clone)]
pub struct HeatmapApi {
    http: Client,
    base: Url,
}

impl HeatmapApi {
    /// `base_url` plays the role of the page URL: relative endpoints are
    /// resolved against it and `/share` against its origin.
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|err| AppError::Config(format!("invalid heatmap base URL: {err}")))?;
        let http = Client::builder()
            .user_agent(concat!("heatmap-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        Ok(self.base.join(path)?)
    }

    fn endpoint_with_params(&self, path: &str, params: &QueryParams) -> AppResult<Url> {
        let mut url = self.endpoint(path)?;
        if !params.is_empty() {
            url.set_query(Some(&params.to_query_string()));
        }
        Ok(url)
    }
}

#[async_trait]
impl HeatmapBackend for HeatmapApi {
    async fn processing_state(&self, token: &SessionToken) -> AppResult<ProcessingState> {
        let url = self.endpoint(PROCESSING_STATE_PATH)?;
        let response = self
            .http
            .get(url)
            .query(&[(PARAM_TOKEN, token.expose())])
            .send()
            .await?
            .error_for_status()?;

        let body: ProcessingStateResponse = response.json().await?;
        debug!(state = %body.athlete_state.state, "fetched processing state");
        Ok(ProcessingState::from_tag(
            &body.athlete_state.state,
            body.map_state,
        ))
    }

    async fn unprocessed_activities(&self, params: &QueryParams) -> AppResult<ActivitySummary> {
        let url = self.endpoint_with_params(UNPROCESSED_ACTIVITIES_PATH, params)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body: UnprocessedActivitiesResponse = response.json().await?;
        Ok(ActivitySummary {
            total: body.activity_refresh.total,
            new: body.activity_refresh.new.len(),
            unsynced: body.activity_refresh.unsynced.len(),
        })
    }

    async fn sync_activities(&self, params: &QueryParams) -> AppResult<()> {
        let url = self.endpoint_with_params(SYNC_ACTIVITIES_PATH, params)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        debug!(status = %response.status(), "activity sync accepted");
        Ok(())
    }

    async fn share_path(&self) -> AppResult<String> {
        let url = self.endpoint(SHARE_PATH)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body: ShareResponse = response.json().await?;
        Ok(body.url_path)
    }
}

#[derive(Deserialize)]
struct ProcessingStateResponse {
    athlete_state: AthleteStateWire,
    #[serde(default)]
    map_state: Option<MapTileCounts>,
}

#[derive(Deserialize)]
struct AthleteStateWire {
    #[serde(default)]
    state: String,
}

#[derive(Deserialize)]
struct UnprocessedActivitiesResponse {
    #[serde(rename = "ActivityRefresh")]
    activity_refresh: ActivityRefreshWire,
}

#[derive(Deserialize)]
struct ActivityRefreshWire {
    #[serde(rename = "Total", default)]
    total: u64,
    #[serde(rename = "New", default)]
    new: Vec<serde_json::Value>,
    #[serde(rename = "Unsynced", default)]
    unsynced: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ShareResponse {
    url_path: String,
}
