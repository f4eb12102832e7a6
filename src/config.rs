use std::time::Duration;
use std::{env, io};

use secrecy::SecretString;
use serde::Serialize;
use tracing::debug;

use crate::map::{CameraState, LatLng};

const DEFAULT_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_AUTHORIZE_ENDPOINT: &str = "https://www.strava.com/oauth/authorize";
const DEFAULT_STATUS_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_TOAST_DURATION_MS: u64 = 4_000;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5_000;

// Austin, TX
const DEFAULT_LAT: f64 = 30.2729;
const DEFAULT_LNG: f64 = -97.7444;
const DEFAULT_ZOOM: u8 = 13;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: String,
    pub session_token: Option<SecretString>,
    pub strava_client_id: Option<String>,
    pub strava_authorize_endpoint: String,
    pub tile_endpoint: String,
    pub map_id: Option<String>,
    pub status_poll_interval_ms: u64,
    pub toast_duration_ms: u64,
    pub http_timeout_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PublicAppConfig {
    pub base_url: String,
    pub has_session_token: bool,
    pub strava_client_id: Option<String>,
    pub strava_authorize_endpoint: String,
    pub tile_endpoint: String,
    pub map_id: Option<String>,
    pub status_poll_interval_ms: u64,
    pub toast_duration_ms: u64,
    pub http_timeout_ms: u64,
}

/// Everything the map view needs to build its overlay and initial camera.
#[derive(Clone, Debug)]
pub struct MapSettings {
    pub tile_endpoint: String,
    pub map_id: String,
    pub default_camera: CameraState,
}

impl AppConfig {
    pub fn from_env() -> Self {
        load_dotenv_if_applicable();
        Self {
            base_url: normalize_base_url(
                env::var("HEATMAP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ),
            session_token: env::var("HEATMAP_TOKEN")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from),
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            strava_authorize_endpoint: env::var("STRAVA_AUTHORIZE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_AUTHORIZE_ENDPOINT.to_string()),
            tile_endpoint: env::var("TILE_ENDPOINT").unwrap_or_default(),
            map_id: env::var("MAP_ID").ok().filter(|v| !v.trim().is_empty()),
            status_poll_interval_ms: parse_u64(
                "STATUS_POLL_INTERVAL_MS",
                DEFAULT_STATUS_POLL_INTERVAL_MS,
            )
            .max(1),
            toast_duration_ms: parse_u64("TOAST_DURATION_MS", DEFAULT_TOAST_DURATION_MS),
            http_timeout_ms: parse_u64("HTTP_CLIENT_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS),
        }
    }

    pub fn public_profile(&self) -> PublicAppConfig {
        PublicAppConfig {
            base_url: self.base_url.clone(),
            has_session_token: self.session_token.is_some(),
            strava_client_id: self.strava_client_id.clone(),
            strava_authorize_endpoint: self.strava_authorize_endpoint.clone(),
            tile_endpoint: self.tile_endpoint.clone(),
            map_id: self.map_id.clone(),
            status_poll_interval_ms: self.status_poll_interval_ms,
            toast_duration_ms: self.toast_duration_ms,
            http_timeout_ms: self.http_timeout_ms,
        }
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            tile_endpoint: self.tile_endpoint.clone(),
            map_id: self.map_id.clone().unwrap_or_default(),
            default_camera: default_camera(),
        }
    }
}

pub fn default_camera() -> CameraState {
    CameraState {
        center: LatLng::new(DEFAULT_LAT, DEFAULT_LNG),
        zoom: DEFAULT_ZOOM,
    }
}

fn normalize_base_url(value: String) -> String {
    let mut value = value.trim().to_string();
    if !value.ends_with('/') {
        value.push('/');
    }
    value
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load outside dev mode");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions) || parse_bool("ALLOW_DOTENV", false)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}

fn parse_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_public_profile_without_secrets() {
        env::set_var("HEATMAP_TOKEN", "secret-token");
        env::set_var("HEATMAP_BASE_URL", "https://heatmap.example.com/app");
        env::set_var("MAP_ID", "map-42");
        env::set_var("STATUS_POLL_INTERVAL_MS", "2500");

        let config = AppConfig::from_env();
        let public = config.public_profile();

        assert_eq!(public.base_url, "https://heatmap.example.com/app/");
        assert!(public.has_session_token);
        assert!(config.session_token.is_some());
        assert_eq!(public.map_id.as_deref(), Some("map-42"));
        assert_eq!(config.status_poll_interval(), Duration::from_millis(2_500));
        assert_eq!(public.toast_duration_ms, DEFAULT_TOAST_DURATION_MS);

        let rendered = serde_json::to_string(&public).unwrap();
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn keeps_trailing_slash_once() {
        assert_eq!(normalize_base_url("http://a/".into()), "http://a/");
        assert_eq!(normalize_base_url("http://a ".into()), "http://a/");
    }
}
