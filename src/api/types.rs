//! Wire types for the ancillary service endpoints.
//!
//! The service uses Mongo-style `_id` keys and an `image` field; these DTOs
//! keep the wire names at the boundary and map into the domain `Catalog`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Ancillary, Catalog};
use crate::session::{Session, TransferChoice, TransferDetails};

/// Request body for the recommendation endpoint. Transfer fields are passed
/// through only when the passenger asked for a transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub email: String,
    pub flight_number: String,
    #[serde(flatten)]
    pub transfer: Option<TransferDetails>,
}

impl RecommendationRequest {
    pub fn from_session(session: &Session) -> Self {
        Self {
            email: session.email.trim().to_string(),
            flight_number: session.flight_number.trim().to_string(),
            transfer: (session.transfer == TransferChoice::Yes)
                .then(|| session.transfer_details.clone()),
        }
    }
}

/// Successful recommendation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub ancillaries: Vec<AncillaryDto>,
}

/// One ancillary as the service ships it.
#[derive(Debug, Clone, Deserialize)]
pub struct AncillaryDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
    pub category: String,
}

impl From<RecommendationResponse> for Catalog {
    fn from(response: RecommendationResponse) -> Self {
        Catalog {
            recommendation_id: response.id,
            items: response
                .ancillaries
                .into_iter()
                .map(|dto| Ancillary {
                    id: dto.id,
                    name: dto.name,
                    description: dto.description,
                    price: dto.price,
                    image_url: dto.image_url,
                    category: dto.category,
                })
                .collect(),
        }
    }
}

/// Request body for the order endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// The recommendation id echoed back for correlation.
    pub recommendation: String,
    /// Selected ancillary ids.
    pub ancillaries: Vec<String>,
    pub email: String,
}

/// Order endpoint payload: a boolean status flag plus an optional message.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
