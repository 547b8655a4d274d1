//! Configuration types, built from environment variables.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_FOOD_BASE_URL: &str = "https://world.openfoodfacts.org";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot name for identification in logs.
    pub name: String,
    pub weather: WeatherConfig,
    pub food: FoodConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "hydrafit".to_string(),
            weather: WeatherConfig::default(),
            food: FoodConfig::default(),
        }
    }
}

impl BotConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout = match std::env::var("HYDRAFIT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "HYDRAFIT_HTTP_TIMEOUT_SECS".into(),
                    message: format!("expected a whole number of seconds, got {raw:?}"),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let weather = WeatherConfig {
            api_key: std::env::var("OPENWEATHERMAP_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            base_url: std::env::var("HYDRAFIT_WEATHER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_BASE_URL.to_string()),
            timeout,
        };

        let food = FoodConfig {
            base_url: std::env::var("HYDRAFIT_FOOD_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FOOD_BASE_URL.to_string()),
            timeout,
            ..FoodConfig::default()
        };

        Ok(Self {
            weather,
            food,
            ..Self::default()
        })
    }
}

/// OpenWeatherMap current-weather lookup.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Without a key every temperature lookup fails.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Open Food Facts product search.
#[derive(Debug, Clone)]
pub struct FoodConfig {
    pub base_url: String,
    /// Open Food Facts asks API clients to identify themselves.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FOOD_BASE_URL.to_string(),
            user_agent: format!("hydrafit/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Telegram channel settings. `None` from `from_env` disables the channel.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub allowed_users: Vec<String>,
}

impl TelegramConfig {
    /// Returns `None` if `TELEGRAM_BOT_TOKEN` is not set.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let allowed_users = parse_allowed_users(
            &std::env::var("TELEGRAM_ALLOWED_USERS").unwrap_or_else(|_| "*".to_string()),
        );
        Some(Self {
            bot_token: SecretString::from(bot_token),
            allowed_users,
        })
    }
}

fn parse_allowed_users(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_services() {
        let config = BotConfig::default();
        assert_eq!(config.name, "hydrafit");
        assert!(config.weather.api_key.is_none());
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org");
        assert_eq!(config.food.base_url, "https://world.openfoodfacts.org");
        assert_eq!(config.food.timeout, Duration::from_secs(10));
        assert!(config.food.user_agent.starts_with("hydrafit/"));
    }

    #[test]
    fn allowed_users_are_trimmed() {
        assert_eq!(
            parse_allowed_users(" alice, 12345 ,,bob "),
            vec!["alice", "12345", "bob"]
        );
        assert_eq!(parse_allowed_users("*"), vec!["*"]);
        assert!(parse_allowed_users("").is_empty());
    }
}
