use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::model::WeatherReading;

use super::{FetchError, WeatherProvider};

/// Current conditions from OpenWeatherMap. Temperatures arrive in Kelvin.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, endpoint: String) -> Self {
        Self {
            api_key,
            endpoint,
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, place: &str) -> Result<WeatherReading, FetchError> {
        tracing::debug!(place, endpoint = %self.endpoint, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("q", place), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            // Body is only logged; an unreadable one still means NotFound.
            let body = res.text().await.unwrap_or_default();
            tracing::debug!(%status, body = %truncate_body(&body), "OpenWeather rejected lookup");
            return Err(FetchError::NotFound {
                place: place.to_string(),
                status,
            });
        }

        let body = res.text().await?;
        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        parsed.into_reading()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
}

impl OwCurrentResponse {
    fn into_reading(self) -> Result<WeatherReading, FetchError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or(FetchError::MissingCondition)?;

        Ok(WeatherReading::from_kelvin(
            self.name,
            self.sys.country,
            self.main.temp,
            condition.icon,
            condition.main,
        ))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, place: &str) -> Result<WeatherReading, FetchError> {
        self.fetch_current(place).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}
