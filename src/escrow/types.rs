//! Escrow Transaction Record
//!
//! The escrow record is an append-only audit row: it is created once,
//! advanced along the state machine, and never deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::MarketError;
use super::state::EscrowStatus;

/// Ledger currency for the single-currency deployment
pub const DEFAULT_CURRENCY: &str = "NGN";

/// Provider tag recorded on every transaction
pub const DEFAULT_PROVIDER: &str = "paystack";

/// One buyer-to-seller payment held by the platform pending release
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EscrowTransaction {
    /// Unique transaction ID (also the store key)
    pub id: Uuid,
    /// Listing being paid for (referenced, not embedded)
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    /// Gross amount in major currency units
    pub amount: Decimal,
    /// Platform fee withheld from the payout
    pub fee: Decimal,
    pub currency: String,
    pub status: EscrowStatus,
    /// Provider tag, e.g. "paystack"
    pub payment_provider: String,
    /// Provider charge reference, set exactly once at
    /// PendingPayment -> FundsHeld and never overwritten
    pub provider_reference: Option<String>,
    /// Immutable creation timestamp
    pub created_at: DateTime<Utc>,
}

impl EscrowTransaction {
    /// Create a new record in PendingPayment
    pub fn new(
        listing_id: Uuid,
        buyer_id: Uuid,
        seller_id: Uuid,
        amount: Decimal,
        fee: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            buyer_id,
            seller_id,
            amount,
            fee,
            currency: DEFAULT_CURRENCY.to_string(),
            status: EscrowStatus::PendingPayment,
            payment_provider: DEFAULT_PROVIDER.to_string(),
            provider_reference: None,
            created_at: Utc::now(),
        }
    }

    /// Net amount paid out to the seller
    pub fn payout_amount(&self) -> Decimal {
        self.amount - self.fee
    }
}

impl fmt::Display for EscrowTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Escrow[{}] listing={} buyer={} seller={} amount={} {} status={}",
            self.id,
            self.listing_id,
            self.buyer_id,
            self.seller_id,
            self.amount,
            self.currency,
            self.status
        )
    }
}

/// Input for escrow creation
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEscrow {
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    #[schema(value_type = String, example = "100000")]
    pub amount: Decimal,
    #[schema(value_type = String, example = "1000")]
    pub fee: Decimal,
}

impl CreateEscrow {
    /// Validate amounts and parties before a record is allocated
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.amount <= Decimal::ZERO {
            return Err(MarketError::validation("amount must be greater than zero"));
        }
        if self.fee < Decimal::ZERO {
            return Err(MarketError::validation("fee cannot be negative"));
        }
        if self.fee > self.amount {
            return Err(MarketError::validation("fee cannot exceed amount"));
        }
        if self.buyer_id == self.seller_id {
            return Err(MarketError::validation("buyer and seller cannot be the same party"));
        }
        Ok(())
    }
}

/// Payout destination owned by a seller identity
///
/// Stored as its own entity keyed by seller id; bank details never live
/// on the user profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayoutCredentials {
    pub seller_id: Uuid,
    pub account_name: String,
    pub account_number: String,
    pub bank_code: String,
}
