use crate::{
    Config, FetchError, ForecastRequest, ForecastResponse,
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// One request, no retry. The decoded payload is returned as received.
    async fn get_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastResponse, FetchError>;
}

/// Construct the weatherapi.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    provider_with_key(config, config.api_key())
}

fn provider_with_key(
    config: &Config,
    api_key: Option<String>,
) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
                 Hint: run `citycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider = WeatherApiProvider::new(config.base_url.clone(), api_key);

    Ok(Arc::new(provider))
}
