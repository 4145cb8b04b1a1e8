//! The single mutable session record, owned by the wizard controller.
//!
//! Lives for the duration of one user visit and is reset to initial values
//! after a completed order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wizard::step::Step;

/// Whether the passenger wants a ground transfer.
///
/// Tri-state: the transfer-choice step requires an explicit answer before
/// the wizard will advance past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferChoice {
    Unset,
    Yes,
    No,
}

impl Default for TransferChoice {
    fn default() -> Self {
        Self::Unset
    }
}

impl std::fmt::Display for TransferChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unset => "unset",
            Self::Yes => "yes",
            Self::No => "no",
        };
        write!(f, "{s}")
    }
}

/// Ground-transfer booking details. Only meaningful when the session's
/// transfer choice is `Yes`; validation ignores these fields otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDetails {
    pub pickup_address: String,
    pub dropoff_address: String,
    pub passenger_count: String,
    pub pickup_date: String,
    pub pickup_time: String,
    pub car_type: String,
}

/// Mutable state for one wizard visit.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Visit correlation id for structured logs.
    pub id: Uuid,
    pub email: String,
    pub flight_number: String,
    pub transfer: TransferChoice,
    pub transfer_details: TransferDetails,
    /// Selected ancillary ids. Membership only; order is irrelevant.
    pub selected: BTreeSet<String>,
    pub current_step: Step,
    /// Category drill-down state while browsing the catalog.
    pub active_category: Option<String>,
    /// Field-keyed messages from the last failed validation attempt.
    pub validation_errors: BTreeMap<String, String>,
    /// True for the entire span of an outstanding boundary call.
    pub is_busy: bool,
    /// Set when the order is confirmed, cleared on reset.
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            email: String::new(),
            flight_number: String::new(),
            transfer: TransferChoice::default(),
            transfer_details: TransferDetails::default(),
            selected: BTreeSet::new(),
            current_step: Step::Email,
            active_category: None,
            validation_errors: BTreeMap::new(),
            is_busy: false,
            confirmed_at: None,
        }
    }

    /// Reset to initial values for a fresh visit. A new session id is issued.
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    /// Toggle an ancillary id in the selection: insert if absent, remove if
    /// present. Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
