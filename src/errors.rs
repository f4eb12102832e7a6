use thiserror::Error;

use crate::host::GeolocationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("{0}")]
    Config(String),
}
