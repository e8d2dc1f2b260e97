use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::{FetchError, ForecastRequest, ForecastResponse};

use super::ForecastProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

#[derive(Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

// The key stays out of logs.
impl std::fmt::Debug for WeatherApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WeatherApiProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: Client::new(),
        }
    }

    pub fn with_default_base_url(api_key: impl Into<String>) -> Self {
        Self::new(DEFAULT_BASE_URL, api_key)
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url)
    }

    async fn fetch_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastResponse, FetchError> {
        let url = self.forecast_url();
        debug!(%url, q = %request.location_query(), days = request.days, "requesting forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", request.location_query()),
                ("days", request.days.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::new(format!("request to WeatherAPI failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::new(format!("failed to read WeatherAPI response body: {e}")))?;

        if !status.is_success() {
            return Err(FetchError::new(format!(
                "WeatherAPI forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| FetchError::new(format!("failed to parse WeatherAPI forecast JSON: {e}")))
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    #[instrument(skip(self), fields(q = %request.location_query()))]
    async fn get_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastResponse, FetchError> {
        let result = self.fetch_forecast(request).await;
        if let Err(err) = &result {
            warn!(error = %err, "forecast fetch failed");
        }
        result
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
