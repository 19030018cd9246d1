//! Auto-Payout Orchestrator
//!
//! Runs immediately after funds are confirmed held, as a best-effort
//! extension of webhook processing. Every failure is absorbed into a
//! typed outcome and logged: the webhook response must acknowledge the
//! provider regardless of payout success, and a failed payout simply
//! leaves the funds held awaiting manual release.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::state::EscrowStatus;
use super::types::EscrowTransaction;
use crate::provider::PaymentProvider;
use crate::store::MarketStore;

/// Result of one payout attempt. Never an error: the caller acknowledges
/// the webhook either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutOutcome {
    /// Transfer initiated and the record advanced to Released
    Released,
    /// Seller has no payout credentials on file; funds stay held
    NoCredentials,
    /// Recipient creation, transfer, or the final status write failed;
    /// funds stay held awaiting manual release
    Failed(String),
}

impl fmt::Display for PayoutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutOutcome::Released => write!(f, "released"),
            PayoutOutcome::NoCredentials => write!(f, "no credentials"),
            PayoutOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

pub struct PayoutOrchestrator {
    store: Arc<dyn MarketStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl PayoutOrchestrator {
    pub fn new(store: Arc<dyn MarketStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    /// Attempt to pay the seller out of a FundsHeld transaction.
    ///
    /// The transfer amount is `amount - fee`. On success the escrow
    /// record moves FundsHeld -> Released through the same status CAS
    /// as every other transition.
    pub async fn run(&self, tx: &EscrowTransaction) -> PayoutOutcome {
        let creds = match self.store.get_payout_credentials(tx.seller_id).await {
            Ok(Some(c)) if !c.account_number.is_empty() && !c.bank_code.is_empty() => c,
            Ok(_) => {
                info!(tx_id = %tx.id, seller_id = %tx.seller_id, "no payout credentials, funds stay held");
                return PayoutOutcome::NoCredentials;
            }
            Err(e) => {
                warn!(tx_id = %tx.id, error = %e, "credential lookup failed, funds stay held");
                return PayoutOutcome::Failed(e.to_string());
            }
        };

        let recipient = match self
            .provider
            .create_recipient(&creds.account_name, &creds.account_number, &creds.bank_code)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(tx_id = %tx.id, error = %e, "recipient creation failed, funds stay held");
                return PayoutOutcome::Failed(e.to_string());
            }
        };

        let reason = format!("Payout for listing {}", tx.listing_id);
        if let Err(e) = self
            .provider
            .initiate_transfer(&recipient.recipient_code, tx.payout_amount(), &reason)
            .await
        {
            warn!(tx_id = %tx.id, error = %e, "transfer initiation failed, funds stay held");
            return PayoutOutcome::Failed(e.to_string());
        }

        match self
            .store
            .update_escrow_status_if(tx.id, EscrowStatus::FundsHeld, EscrowStatus::Released, None)
            .await
        {
            Ok(true) => {
                info!(
                    tx_id = %tx.id,
                    amount = %tx.payout_amount(),
                    recipient = %recipient.recipient_code,
                    "payout initiated, escrow released"
                );
                PayoutOutcome::Released
            }
            Ok(false) => {
                // transfer is already in flight; the record moved under us
                error!(
                    tx_id = %tx.id,
                    "transfer initiated but escrow was no longer FundsHeld, needs ops review"
                );
                PayoutOutcome::Failed("escrow state changed during payout".to_string())
            }
            Err(e) => {
                error!(tx_id = %tx.id, error = %e, "transfer initiated but status write failed");
                PayoutOutcome::Failed(e.to_string())
            }
        }
    }
}
