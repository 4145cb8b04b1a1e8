//! Ancillary catalog — the server-recommended add-ons for one visit.
//!
//! Fetched once per session from the recommendation endpoint, immutable
//! afterwards, and discarded when the session resets.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable add-on offered for the passenger's flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ancillary {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Non-negative price in the catalog currency.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub category: String,
}

/// The recommendation computed for one session: an opaque correlation id
/// plus the ancillaries in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Opaque handle echoed back on order submission.
    pub recommendation_id: String,
    pub items: Vec<Ancillary>,
}

/// One category partition of the catalog, in server item order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<Ancillary>,
}

impl Catalog {
    /// Whether an ancillary with this id is part of the catalog.
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|a| a.id == id)
    }

    /// Look up an ancillary by id.
    pub fn get(&self, id: &str) -> Option<&Ancillary> {
        self.items.iter().find(|a| a.id == id)
    }

    /// Sum of prices over the selected ids. An id with no matching catalog
    /// entry contributes zero.
    pub fn total_for(&self, selected: &BTreeSet<String>) -> Decimal {
        self.items
            .iter()
            .filter(|a| selected.contains(&a.id))
            .map(|a| a.price)
            .sum()
    }

    /// Partition the items by category, preserving first-seen category order.
    /// Each partition keeps the item order returned by the server.
    pub fn grouped(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|g| g.category == item.category) {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(CategoryGroup {
                    category: item.category.clone(),
                    items: vec![item.clone()],
                }),
            }
        }
        groups
    }

    /// Category names in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        self.grouped().into_iter().map(|g| g.category).collect()
    }
}
