//! Step-local validation gates.
//!
//! Pure predicates over the session: no side effects beyond the returned
//! field→message map. The controller stores the map into
//! `Session::validation_errors`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::session::{Session, TransferChoice};

use super::step::Step;

/// Field-keyed validation messages. Keys are the form field identifiers
/// consumed by the hosting UI.
pub type FieldErrors = BTreeMap<String, String>;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Validate the step-local input before forward progress.
///
/// All failing fields are collected in one pass; the gate never
/// short-circuits on the first failure. Steps without input requirements
/// are vacuously valid.
pub fn validate(step: Step, session: &Session) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match step {
        Step::Email => {
            if !EMAIL_RE.is_match(session.email.trim()) {
                errors.insert(
                    "email".to_string(),
                    "Please enter a valid email address".to_string(),
                );
            }
        }
        Step::Flight => {
            if session.flight_number.trim().len() < 3 {
                errors.insert(
                    "flightNumber".to_string(),
                    "Flight number must be at least 3 characters".to_string(),
                );
            }
        }
        Step::TransferChoice => {
            if session.transfer == TransferChoice::Unset {
                errors.insert(
                    "wantsTransfer".to_string(),
                    "Please choose whether you need an airport transfer".to_string(),
                );
            }
        }
        // Only evaluated when a transfer is wanted; skipped entirely otherwise.
        Step::TransferDetails if session.transfer == TransferChoice::Yes => {
            let details = &session.transfer_details;
            if details.pickup_address.trim().len() < 5 {
                errors.insert(
                    "pickupAddress".to_string(),
                    "Pickup address must be at least 5 characters".to_string(),
                );
            }
            if details.dropoff_address.trim().len() < 5 {
                errors.insert(
                    "dropoffAddress".to_string(),
                    "Drop-off address must be at least 5 characters".to_string(),
                );
            }
            if details.passenger_count.trim().is_empty() {
                errors.insert(
                    "passengerCount".to_string(),
                    "Please select the number of passengers".to_string(),
                );
            }
            if details.pickup_date.trim().is_empty() {
                errors.insert(
                    "pickupDate".to_string(),
                    "Please select a pickup date".to_string(),
                );
            }
            if details.pickup_time.trim().is_empty() {
                errors.insert(
                    "pickupTime".to_string(),
                    "Please select a pickup time".to_string(),
                );
            }
            if details.car_type.trim().is_empty() {
                errors.insert(
                    "carType".to_string(),
                    "Please select a car type".to_string(),
                );
            }
        }
        _ => {}
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
