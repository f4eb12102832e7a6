use std::sync::Arc;

use reqwest::Url;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::host::{PageNavigator, UrlBar};

const CALLBACK_PATH: &str = "/tokenexchange";
const STRAVA_SCOPE: &str = "activity:read";

/// "Connect with Strava" button.
pub struct LoginWidget {
    authorize_endpoint: String,
    client_id: String,
    url_bar: Arc<dyn UrlBar>,
    navigator: Arc<dyn PageNavigator>,
}

impl LoginWidget {
    pub fn new(
        authorize_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        url_bar: Arc<dyn UrlBar>,
        navigator: Arc<dyn PageNavigator>,
    ) -> Self {
        Self {
            authorize_endpoint: authorize_endpoint.into(),
            client_id: client_id.into(),
            url_bar,
            navigator,
        }
    }

    pub fn callback_url(&self) -> String {
        format!(
            "{}{CALLBACK_PATH}",
            self.url_bar.origin().trim_end_matches('/')
        )
    }

    pub fn authorize_url(&self) -> AppResult<Url> {
        let mut url = Url::parse(&self.authorize_endpoint).map_err(|err| {
            AppError::Config(format!("invalid OAuth authorize endpoint: {err}"))
        })?;
        url.query_pairs_mut()
            .append_pair("scope", STRAVA_SCOPE)
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.callback_url())
            .append_pair("response_type", "code")
            .append_pair("approval_prompt", "auto");
        Ok(url)
    }

    /// Sends the whole page to the identity provider.
    pub fn login(&self) -> AppResult<()> {
        let url = self.authorize_url()?;
        info!(redirect_uri = %self.callback_url(), "redirecting to Strava login");
        self.navigator.navigate(url.as_str());
        Ok(())
    }
}
