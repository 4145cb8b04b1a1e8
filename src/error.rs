//! Error types for Trip Extras.

use crate::wizard::step::Step;

/// Top-level error type for the upsell flow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the recommendation and order endpoints.
///
/// All of these are recoverable: the controller stays on its current step,
/// clears the busy flag, and the user may retry the same action.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Order was rejected: {reason}")]
    OrderRejected { reason: String },
}

/// Wizard precondition errors, caught locally before any boundary call.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Another request is still in flight")]
    Busy,

    #[error("Cannot place an order with an empty selection")]
    EmptySelection,

    #[error("Unknown ancillary id: {id}")]
    UnknownAncillary { id: String },

    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },

    #[error("No catalog has been loaded for this session")]
    CatalogMissing,

    #[error("Action {action} is not available on step {step}")]
    NotAvailable { action: &'static str, step: Step },

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: Step, to: Step },
}

/// Result type alias for the upsell flow.
pub type Result<T> = std::result::Result<T, Error>;
