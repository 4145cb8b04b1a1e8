//! Boundary clients for the recommendation and order endpoints.

pub mod http;
pub mod types;

pub use http::HttpApiClient;
pub use types::{OrderRequest, RecommendationRequest};

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::error::ApiError;

/// Fetches the personalized ancillary catalog for a passenger.
#[async_trait]
pub trait RecommendationApi: Send + Sync {
    /// Exchange identity + flight for a catalog of ancillaries. A failure
    /// leaves the caller's state untouched.
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Catalog, ApiError>;
}

/// Submits a completed selection as an order.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Place the order. `Ok(())` means the service acknowledged it; a
    /// success-shaped payload with a false status flag is an error.
    async fn place_order(&self, request: &OrderRequest) -> Result<(), ApiError>;
}
