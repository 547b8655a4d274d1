//! External lookups: current temperature by city and calorie density by
//! product name.
//!
//! The tracker only sees the `ExternalLookup` trait; `HttpLookup` backs it
//! with OpenWeatherMap and Open Food Facts.

pub mod food;
pub mod weather;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::BotConfig;
use crate::error::{ConfigError, LookupError};

pub use food::FoodClient;
pub use weather::WeatherClient;

/// Best-matching product for a food query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodInfo {
    pub name: String,
    pub kcal_per_100g: f64,
}

#[async_trait]
pub trait ExternalLookup: Send + Sync {
    /// Current temperature in °C. Unknown city is `LookupError::CityNotFound`.
    async fn temperature(&self, city: &str) -> Result<f64, LookupError>;

    /// Best match for a product. Zero matches is `LookupError::ProductNotFound`.
    async fn food_info(&self, query: &str) -> Result<FoodInfo, LookupError>;
}

/// HTTP-backed lookups.
pub struct HttpLookup {
    weather: WeatherClient,
    food: FoodClient,
}

impl HttpLookup {
    pub fn new(weather: WeatherClient, food: FoodClient) -> Self {
        Self { weather, food }
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            WeatherClient::new(config.weather.clone())?,
            FoodClient::new(config.food.clone())?,
        ))
    }
}

#[async_trait]
impl ExternalLookup for HttpLookup {
    async fn temperature(&self, city: &str) -> Result<f64, LookupError> {
        self.weather.current_temperature(city).await
    }

    async fn food_info(&self, query: &str) -> Result<FoodInfo, LookupError> {
        self.food.search(query).await
    }
}

/// Map a transport error into a lookup error for `service`.
pub(crate) fn transport_error(
    service: &str,
    timeout: std::time::Duration,
    err: reqwest::Error,
) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout {
            service: service.to_string(),
            timeout,
        }
    } else {
        LookupError::RequestFailed {
            service: service.to_string(),
            reason: err.to_string(),
        }
    }
}
