mod api;
mod config;
mod errors;
mod host;
mod login;
mod map;
mod overlay;
mod poller;
mod profile;
mod query;
mod share;
mod status;
mod theme;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use api::{HeatmapApi, HeatmapBackend};
pub use config::{default_camera, AppConfig, MapSettings, PublicAppConfig};
pub use errors::{AppError, AppResult};
pub use host::{
    Clipboard, Dialog, GeolocationError, Geolocator, MemoryUrlBar, PageNavigator, ProfileView,
    StatusView, Toast, ToastId, ToastKind, Toaster, UrlBar,
};
pub use login::LoginWidget;
pub use map::{
    CameraState, GpsMarker, LatLng, ListenerId, MapEvent, MapListener, MapOptions, MapSurface,
    MapViewController, MarkerIcon, MarkerId, MarkerOptions, MAX_ZOOM, MIN_ZOOM,
};
pub use overlay::{TileCoord, TileImage, TileOverlay, TileSource, TILE_SIZE};
pub use poller::{PollOutcome, RefreshTimer, StatusPoller};
pub use profile::{ActivitySummary, ProfileOutcome, ProfilePage};
pub use query::{ParamValue, QueryParamStore, QueryParams, SessionToken};
pub use share::{ShareOutcome, ShareWidget};
pub use status::{MapTileCounts, ProcessingState, StatusIcon, StatusLine};
pub use theme::{StyleRule, Styler, HEATMAP_STYLE, HEATMAP_THEME_NAME};

/// Configuration plus the backend client, shared by every page.
pub struct HeatmapClient {
    config: AppConfig,
    backend: Arc<dyn HeatmapBackend>,
}

impl HeatmapClient {
    pub fn initialize(config: AppConfig) -> AppResult<Self> {
        init_tracing();
        let api = HeatmapApi::new(&config.base_url, config.http_timeout())?;
        debug!(config = ?config.public_profile(), "heatmap client configured");
        Ok(Self {
            config,
            backend: Arc::new(api),
        })
    }

    pub fn with_backend(config: AppConfig, backend: Arc<dyn HeatmapBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backend(&self) -> Arc<dyn HeatmapBackend> {
        Arc::clone(&self.backend)
    }

    /// Status page poller for the token in `params`.
    pub fn status_poller(
        &self,
        params: &QueryParamStore,
        view: Arc<dyn StatusView>,
    ) -> AppResult<StatusPoller> {
        let token = params
            .token()
            .ok_or_else(|| AppError::Config("missing session token".into()))?;
        Ok(StatusPoller::new(
            self.backend(),
            view,
            token,
            self.config.status_poll_interval(),
        ))
    }

    pub fn login_widget(
        &self,
        url_bar: Arc<dyn UrlBar>,
        navigator: Arc<dyn PageNavigator>,
    ) -> AppResult<LoginWidget> {
        let client_id = self
            .config
            .strava_client_id
            .clone()
            .ok_or_else(|| AppError::Config("STRAVA_CLIENT_ID is not set".into()))?;
        Ok(LoginWidget::new(
            self.config.strava_authorize_endpoint.clone(),
            client_id,
            url_bar,
            navigator,
        ))
    }

    pub fn share_widget(
        &self,
        url_bar: Arc<dyn UrlBar>,
        clipboard: Arc<dyn Clipboard>,
        toaster: Arc<dyn Toaster>,
    ) -> ShareWidget {
        ShareWidget::new(
            self.backend(),
            url_bar,
            clipboard,
            toaster,
            self.config.toast_duration(),
        )
    }

    pub fn profile_page(
        &self,
        params: Arc<QueryParamStore>,
        view: Arc<dyn ProfileView>,
        dialog: Arc<dyn Dialog>,
        navigator: Arc<dyn PageNavigator>,
    ) -> ProfilePage {
        ProfilePage::new(self.backend(), params, view, dialog, navigator)
    }

    /// Spawns the first location fix, so it needs a running tokio runtime.
    pub fn map_view(
        &self,
        map: Arc<dyn MapSurface>,
        params: Arc<QueryParamStore>,
        geolocator: Arc<dyn Geolocator>,
        dialog: Arc<dyn Dialog>,
        share: ShareWidget,
    ) -> Arc<MapViewController> {
        MapViewController::start(
            map,
            params,
            geolocator,
            dialog,
            share,
            &self.config.map_settings(),
        )
    }

    pub fn tile_overlay(&self) -> TileOverlay {
        let settings = self.config.map_settings();
        TileOverlay::new(settings.tile_endpoint, settings.map_id)
    }
}

pub fn init_tracing() {
    static INIT: OnceCell<()> = OnceCell::new();
    let _ = INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,heatmap_client=debug"));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    });
}
