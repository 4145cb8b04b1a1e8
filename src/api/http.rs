//! HTTP implementation of the boundary clients, bearer-token authenticated.

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::ApiConfig;
use crate::error::ApiError;

use super::types::{OrderRequest, OrderResponse, RecommendationRequest, RecommendationResponse};
use super::{OrderApi, RecommendationApi};

/// Path of the recommendation endpoint under the base URL.
const RECOMMENDATIONS_PATH: &str = "recommendations";
/// Path of the order endpoint under the base URL.
const ORDERS_PATH: &str = "orders";

/// Reqwest-backed client implementing both boundary traits.
pub struct HttpApiClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// POST a JSON body and return the response text of a 2xx reply.
    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(self.config.api_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Request {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl RecommendationApi for HttpApiClient {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Catalog, ApiError> {
        let text = self.post_json(RECOMMENDATIONS_PATH, request).await?;

        let response: RecommendationResponse =
            serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse {
                endpoint: RECOMMENDATIONS_PATH.to_string(),
                reason: e.to_string(),
            })?;

        let catalog: Catalog = response.into();

        // Catalog prices are non-negative; a malformed payload must not
        // reach the session.
        if let Some(bad) = catalog.items.iter().find(|a| a.price < Decimal::ZERO) {
            return Err(ApiError::InvalidResponse {
                endpoint: RECOMMENDATIONS_PATH.to_string(),
                reason: format!("negative price for ancillary {}", bad.id),
            });
        }

        tracing::debug!(
            recommendation = %catalog.recommendation_id,
            items = catalog.items.len(),
            "recommendation received"
        );
        Ok(catalog)
    }
}

#[async_trait]
impl OrderApi for HttpApiClient {
    async fn place_order(&self, request: &OrderRequest) -> Result<(), ApiError> {
        let text = self.post_json(ORDERS_PATH, request).await?;

        let response: OrderResponse =
            serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse {
                endpoint: ORDERS_PATH.to_string(),
                reason: e.to_string(),
            })?;

        if !response.success {
            return Err(ApiError::OrderRejected {
                reason: response
                    .message
                    .unwrap_or_else(|| "no reason given".to_string()),
            });
        }

        tracing::debug!(recommendation = %request.recommendation, "order acknowledged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = HttpApiClient::new(ApiConfig::new("https://api.example.com/v1/", "token"));
        assert_eq!(
            client.endpoint(RECOMMENDATIONS_PATH),
            "https://api.example.com/v1/recommendations"
        );

        let bare = HttpApiClient::new(ApiConfig::new("https://api.example.com/v1", "token"));
        assert_eq!(bare.endpoint(ORDERS_PATH), "https://api.example.com/v1/orders");
    }
}
