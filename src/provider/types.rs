//! Provider result and error types
//!
//! The provider speaks in minor currency units (kobo); conversion happens
//! at this boundary and nowhere else.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Failure modes of the external payment API
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Network failure, timeout, or non-2xx response. The state of the
    /// underlying charge is UNKNOWN - re-verify, never assume.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// 2xx response whose body did not carry the expected fields
    #[error("unexpected provider response: {0}")]
    MalformedResponse(String),

    /// Amount cannot be represented in provider minor units
    #[error("amount not representable in minor units: {0}")]
    InvalidAmount(Decimal),
}

/// Charge authorization payload returned by initialize
///
/// `authorization_url` is handed to the client for redirect;
/// `reference` identifies the charge on the provider side.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderInit {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Provider-side registered payout destination
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipientHandle {
    pub recipient_code: String,
}

/// Accepted transfer instruction
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferHandle {
    pub transfer_code: String,
    pub status: String,
}

/// Convert a major-unit decimal amount to provider minor units (x100)
///
/// Rejects amounts with sub-minor precision or outside u64 range.
pub fn to_minor_units(amount: Decimal) -> Result<u64, ProviderError> {
    let minor = amount * Decimal::from(100);
    if minor.fract() != Decimal::ZERO {
        return Err(ProviderError::InvalidAmount(amount));
    }
    minor.to_u64().ok_or(ProviderError::InvalidAmount(amount))
}
