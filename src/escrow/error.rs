//! Error taxonomy for the settlement core.
//!
//! Error codes are stable strings used in API responses.

use thiserror::Error;

/// Classified errors surfaced by the escrow and bid services
#[derive(Error, Debug, Clone)]
pub enum MarketError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Actor lacks authority over this resource")]
    Forbidden,

    #[error("Transition not permitted from {from}: {action}")]
    InvalidTransition { from: &'static str, action: &'static str },

    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Webhook signature invalid: {0}")]
    SignatureInvalid(&'static str),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl MarketError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::NotFound(_) => "NOT_FOUND",
            MarketError::Forbidden => "FORBIDDEN",
            MarketError::InvalidTransition { .. } => "INVALID_TRANSITION",
            MarketError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            MarketError::SignatureInvalid(_) => "SIGNATURE_INVALID",
            MarketError::ValidationFailed(_) => "VALIDATION_FAILED",
            MarketError::StoreError(_) => "STORE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            MarketError::NotFound(_) => 404,
            MarketError::Forbidden => 403,
            MarketError::InvalidTransition { .. } => 409,
            MarketError::ProviderUnavailable(_) => 503,
            MarketError::SignatureInvalid(_) => 401,
            MarketError::ValidationFailed(_) => 400,
            MarketError::StoreError(_) => 500,
        }
    }

    /// Shorthand for a validation failure with a formatted reason
    pub fn validation(reason: impl Into<String>) -> Self {
        MarketError::ValidationFailed(reason.into())
    }
}
