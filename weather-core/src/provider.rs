use crate::{Config, WeatherReading, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod openweather;

pub use reqwest::StatusCode;

/// Why a lookup produced no reading.
///
/// Only [`FetchError::NotFound`] is recoverable; the shell treats the rest as fatal.
/// Sources are shared so the error can travel inside UI messages.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Cannot find {place} (provider answered {status})")]
    NotFound { place: String, status: StatusCode },

    #[error("Failed to reach the weather provider")]
    Transport(#[source] Arc<reqwest::Error>),

    #[error("Failed to parse the weather provider response")]
    Decode(#[source] Arc<serde_json::Error>),

    #[error("Weather provider response lists no conditions")]
    MissingCondition,
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(Arc::new(err))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(Arc::new(err))
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, place: &str) -> Result<WeatherReading, FetchError>;
}

/// Construct the provider from the immutable startup configuration.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key();
    if api_key.is_empty() {
        anyhow::bail!(
            "No API key configured.\n\
             Hint: run `weather configure` and enter your API key."
        );
    }

    Ok(Box::new(OpenWeatherProvider::new(
        api_key.to_owned(),
        config.endpoint().to_owned(),
    )))
}
