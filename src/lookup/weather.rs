//! OpenWeatherMap current-weather client.

use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;

use super::transport_error;
use crate::config::WeatherConfig;
use crate::error::{ConfigError, LookupError};

const SERVICE: &str = "OpenWeatherMap";

/// `/data/2.5/weather` response, reduced to what we read.
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainBlock,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

pub struct WeatherClient {
    config: WeatherConfig,
    client: Client,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Current temperature for `city`, in °C.
    pub async fn current_temperature(&self, city: &str) -> Result<f64, LookupError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| LookupError::NotConfigured {
                service: SERVICE.into(),
                reason: "OPENWEATHERMAP_API_KEY is not set".into(),
            })?;

        let url = format!("{}/data/2.5/weather", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(city, "Fetching current temperature");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", api_key.expose_secret()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, self.config.timeout, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::CityNotFound {
                city: city.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, city, "Weather lookup failed");
            return Err(LookupError::RequestFailed {
                service: SERVICE.into(),
                reason: format!("status {status}: {body}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(SERVICE, self.config.timeout, e))?;
        let temperature = parse_temperature(&body)?;
        tracing::info!(city, temperature, "Temperature resolved");
        Ok(temperature)
    }
}

fn parse_temperature(body: &str) -> Result<f64, LookupError> {
    let parsed: CurrentWeatherResponse =
        serde_json::from_str(body).map_err(|e| LookupError::InvalidResponse {
            service: SERVICE.into(),
            reason: e.to_string(),
        })?;
    if !parsed.main.temp.is_finite() {
        return Err(LookupError::InvalidResponse {
            service: SERVICE.into(),
            reason: "temperature is not a finite number".into(),
        });
    }
    Ok(parsed.main.temp)
}
