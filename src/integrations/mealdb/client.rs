// src/integrations/mealdb/client.rs
//
// TheMealDB HTTP client
//
// ARCHITECTURE:
// - GET {host}/{key}/categories.php
// - GET {host}/{key}/filter.php?c={category name}
// - GET {host}/{key}/lookup.php?i={meal id}
// - Maps wire payloads to domain payloads (NO store access)
//
// Transport failures become Network, non-2xx become Http, bad JSON becomes
// Decode. Nothing here retries; callers refresh again later.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::domain::{Category, MealDetail, MealSummary};
use crate::error::{AppError, AppResult};
use crate::integrations::mealdb::api::MealApi;
use crate::integrations::mealdb::wire::{
    meal_detail_from_wire, CategoriesResponse, MealLookupWire, MealSummaryWire, MealsResponse,
};

pub struct MealDbClient {
    base_url: String,
    http_client: Client,
}

impl MealDbClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("{}/{}", config.api_host.trim_end_matches('/'), config.api_key),
            http_client,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn get_json<T>(&self, name: &str, query: &[(&str, &str)]) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(name);
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Network(format!("{} request failed: {}", name, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Decode(format!("{} response: {}", name, e)))
    }
}

#[async_trait]
impl MealApi for MealDbClient {
    async fn categories(&self) -> AppResult<Vec<Category>> {
        let response: CategoriesResponse = self.get_json("categories.php", &[]).await?;
        Ok(response.into_categories())
    }

    async fn meals(&self, category_name: &str) -> AppResult<Vec<MealSummary>> {
        let response: MealsResponse<MealSummaryWire> =
            self.get_json("filter.php", &[("c", category_name)]).await?;

        Ok(response
            .into_meals()?
            .into_iter()
            .map(MealSummary::from)
            .collect())
    }

    async fn meal_lookup(&self, id: &str) -> AppResult<MealDetail> {
        let response: MealsResponse<MealLookupWire> =
            self.get_json("lookup.php", &[("i", id)]).await?;

        let meals = response.into_meals()?;
        let first = meals.first().ok_or(AppError::ContentMissing)?;
        meal_detail_from_wire(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_include_key() {
        let client = MealDbClient::new(&AppConfig::default()).unwrap();
        assert_eq!(
            client.endpoint("categories.php"),
            "https://themealdb.com/api/json/v1/1/categories.php"
        );
    }

    #[test]
    fn test_trailing_slash_in_host_is_ignored() {
        let config = AppConfig {
            api_host: "http://localhost:8080/api/".to_string(),
            api_key: "test".to_string(),
            ..AppConfig::default()
        };
        let client = MealDbClient::new(&config).unwrap();
        assert_eq!(client.endpoint("lookup.php"), "http://localhost:8080/api/test/lookup.php");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let config = AppConfig {
            api_host: "http://127.0.0.1:9".to_string(),
            http_timeout: std::time::Duration::from_secs(2),
            ..AppConfig::default()
        };
        let client = MealDbClient::new(&config).unwrap();

        let err = client.categories().await.unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(matches!(err, AppError::Network(_)));
    }
}
