//! Open Food Facts product search.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{FoodInfo, transport_error};
use crate::config::FoodConfig;
use crate::error::{ConfigError, LookupError};

const SERVICE: &str = "Open Food Facts";
const PAGE_SIZE: &str = "10";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Value>,
}

pub struct FoodClient {
    config: FoodConfig,
    client: Client,
}

impl FoodClient {
    pub fn new(config: FoodConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Best match for `query` that reports an energy value.
    pub async fn search(&self, query: &str) -> Result<FoodInfo, LookupError> {
        let url = format!("{}/cgi/search.pl", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(query, "Searching products");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("action", "process"),
                ("search_terms", query),
                ("json", "1"),
                ("page_size", PAGE_SIZE),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, self.config.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, query, "Product search failed");
            return Err(LookupError::RequestFailed {
                service: SERVICE.into(),
                reason: format!("status {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(SERVICE, self.config.timeout, e))?;
        let info = best_match(&body, query)?;
        tracing::info!(query, product = %info.name, kcal = info.kcal_per_100g, "Product resolved");
        Ok(info)
    }
}

/// First product in the result list that carries `energy-kcal_100g`.
///
/// Products without an energy value are skipped rather than counted as
/// zero calories.
fn best_match(body: &str, query: &str) -> Result<FoodInfo, LookupError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| LookupError::InvalidResponse {
            service: SERVICE.into(),
            reason: e.to_string(),
        })?;

    parsed
        .products
        .iter()
        .find_map(|product| {
            let kcal = energy_kcal_100g(product)?;
            let name = product
                .get("product_name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(query)
                .to_string();
            Some(FoodInfo {
                name,
                kcal_per_100g: kcal,
            })
        })
        .ok_or_else(|| LookupError::ProductNotFound {
            query: query.to_string(),
        })
}

/// The field is a number for most products but a string for some.
fn energy_kcal_100g(product: &Value) -> Option<f64> {
    let raw = product.get("nutriments")?.get("energy-kcal_100g")?;
    let kcal = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (kcal.is_finite() && kcal >= 0.0).then_some(kcal)
}
