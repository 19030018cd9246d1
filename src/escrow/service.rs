//! Escrow Service
//!
//! Owns the lifecycle of an escrow transaction record from creation to a
//! terminal state. Every status write goes through the store's
//! compare-and-swap, so concurrent webhook deliveries and admin actions
//! cannot double-apply a transition.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::error::MarketError;
use super::payout::{PayoutOrchestrator, PayoutOutcome};
use super::state::EscrowStatus;
use super::types::{CreateEscrow, EscrowTransaction};
use crate::provider::{PaymentProvider, ProviderError, ProviderInit};
use crate::store::MarketStore;
use crate::webhook::ChargeEvent;

/// Result of escrow creation: the persisted record plus the provider's
/// client-side authorization payload.
#[derive(Debug, Clone)]
pub struct EscrowCreated {
    pub transaction: EscrowTransaction,
    pub init: ProviderInit,
}

/// What processing a verified charge notification amounted to.
///
/// Everything except a provider outage is an acknowledged outcome; the
/// webhook endpoint answers 200 for all of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// Event referenced a transaction this system does not know
    UnknownTransaction,
    /// Transaction already past PendingPayment; duplicate delivery
    AlreadyProcessed,
    /// Provider does not confirm the charge; nothing was changed
    NotVerified,
    /// Funds confirmed held, with the result of the auto-payout attempt
    FundsConfirmed(PayoutOutcome),
}

pub struct EscrowService {
    store: Arc<dyn MarketStore>,
    provider: Arc<dyn PaymentProvider>,
    payout: PayoutOrchestrator,
}

impl EscrowService {
    pub fn new(store: Arc<dyn MarketStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        let payout = PayoutOrchestrator::new(store.clone(), provider.clone());
        Self {
            store,
            provider,
            payout,
        }
    }

    /// Create an escrow record and initialize the charge.
    ///
    /// The record is persisted in PendingPayment before the provider is
    /// called. If initialization fails the record stays in place - the
    /// caller may retry; creation is never rolled back.
    pub async fn create(&self, req: CreateEscrow) -> Result<EscrowCreated, MarketError> {
        req.validate()?;

        let mut tx = EscrowTransaction::new(
            req.listing_id,
            req.buyer_id,
            req.seller_id,
            req.amount,
            req.fee,
        );
        tx.payment_provider = self.provider.name().to_string();
        self.store.insert_escrow(tx.clone()).await?;

        let init = match self.provider.initialize_transaction(&tx).await {
            Ok(init) => init,
            Err(e) => {
                warn!(tx_id = %tx.id, error = %e, "charge initialization failed, record kept for retry");
                return Err(e.into());
            }
        };

        info!(tx_id = %tx.id, listing_id = %tx.listing_id, amount = %tx.amount, "escrow created");
        Ok(EscrowCreated {
            transaction: tx,
            init,
        })
    }

    /// Apply a signature-verified charge-success notification.
    ///
    /// The signature proves origin; the independent verify call proves
    /// current truth. Only when both hold does the record move
    /// PendingPayment -> FundsHeld, exactly once, recording the provider
    /// reference. Duplicate and unknown deliveries are no-ops.
    pub async fn on_charge_succeeded(
        &self,
        event: ChargeEvent,
    ) -> Result<ChargeOutcome, MarketError> {
        let tx = match self.store.get_escrow(event.tx_id).await? {
            Some(tx) => tx,
            None => {
                info!(tx_id = %event.tx_id, "charge event for unknown transaction, ignored");
                return Ok(ChargeOutcome::UnknownTransaction);
            }
        };

        if tx.status != EscrowStatus::PendingPayment {
            info!(tx_id = %tx.id, status = %tx.status, "duplicate charge event, ignored");
            return Ok(ChargeOutcome::AlreadyProcessed);
        }

        // The signed body alone is not trusted with money movement:
        // ask the provider what it currently knows about the charge.
        let verified = self.provider.verify_transaction(&event.reference).await?;
        if !verified {
            warn!(tx_id = %tx.id, reference = %event.reference, "charge did not verify, ignored");
            return Ok(ChargeOutcome::NotVerified);
        }

        let won = self
            .store
            .update_escrow_status_if(
                tx.id,
                EscrowStatus::PendingPayment,
                EscrowStatus::FundsHeld,
                Some(&event.reference),
            )
            .await?;
        if !won {
            info!(tx_id = %tx.id, "concurrent delivery already settled the charge");
            return Ok(ChargeOutcome::AlreadyProcessed);
        }

        info!(tx_id = %tx.id, reference = %event.reference, "funds held");

        // Best-effort: a failed payout never fails the webhook.
        let mut held = tx;
        held.status = EscrowStatus::FundsHeld;
        held.provider_reference = Some(event.reference.clone());
        let outcome = self.payout.run(&held).await;
        Ok(ChargeOutcome::FundsConfirmed(outcome))
    }

    /// Admin action: release held funds to the seller
    pub async fn release_funds(&self, tx_id: Uuid) -> Result<EscrowTransaction, MarketError> {
        self.transition(tx_id, EscrowStatus::FundsHeld, EscrowStatus::Released, "release funds")
            .await
    }

    /// Admin action: freeze the transaction pending manual resolution
    pub async fn mark_dispute(&self, tx_id: Uuid) -> Result<EscrowTransaction, MarketError> {
        let tx = self
            .store
            .get_escrow(tx_id)
            .await?
            .ok_or(MarketError::NotFound("EscrowTransaction"))?;

        match tx.status {
            EscrowStatus::PendingPayment | EscrowStatus::FundsHeld => {
                self.transition(tx_id, tx.status, EscrowStatus::InDispute, "mark dispute")
                    .await
            }
            other => Err(MarketError::InvalidTransition {
                from: other.as_str(),
                action: "mark dispute",
            }),
        }
    }

    /// Admin action: return held funds to the buyer via a provider refund
    pub async fn refund(&self, tx_id: Uuid) -> Result<EscrowTransaction, MarketError> {
        let tx = self
            .store
            .get_escrow(tx_id)
            .await?
            .ok_or(MarketError::NotFound("EscrowTransaction"))?;

        if !tx.status.is_held() {
            return Err(MarketError::InvalidTransition {
                from: tx.status.as_str(),
                action: "refund",
            });
        }
        let reference = tx
            .provider_reference
            .as_deref()
            .ok_or_else(|| MarketError::validation("held transaction has no provider reference"))?;

        let accepted = self.provider.refund(reference, tx.amount).await?;
        if !accepted {
            return Err(MarketError::ProviderUnavailable(
                "provider did not accept the refund".to_string(),
            ));
        }

        self.transition(tx_id, EscrowStatus::FundsHeld, EscrowStatus::Refunded, "refund")
            .await
    }

    pub async fn get(&self, tx_id: Uuid) -> Result<EscrowTransaction, MarketError> {
        self.store
            .get_escrow(tx_id)
            .await?
            .ok_or(MarketError::NotFound("EscrowTransaction"))
    }

    pub async fn list(
        &self,
        status: Option<EscrowStatus>,
    ) -> Result<Vec<EscrowTransaction>, MarketError> {
        self.store.list_escrows(status).await
    }

    /// CAS one edge of the state machine and return the updated record.
    /// A lost race or wrong current state reports InvalidTransition with
    /// the status actually found.
    async fn transition(
        &self,
        tx_id: Uuid,
        from: EscrowStatus,
        to: EscrowStatus,
        action: &'static str,
    ) -> Result<EscrowTransaction, MarketError> {
        debug_assert!(from.allows(to));
        let won = self
            .store
            .update_escrow_status_if(tx_id, from, to, None)
            .await?;

        let tx = self
            .store
            .get_escrow(tx_id)
            .await?
            .ok_or(MarketError::NotFound("EscrowTransaction"))?;

        if !won {
            return Err(MarketError::InvalidTransition {
                from: tx.status.as_str(),
                action,
            });
        }
        info!(tx_id = %tx_id, from = %from, to = %to, "escrow transition");
        Ok(tx)
    }
}

impl From<ProviderError> for MarketError {
    fn from(e: ProviderError) -> Self {
        MarketError::ProviderUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::types::PayoutCredentials;
    use crate::provider::MockProvider;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn service() -> (Arc<MemoryStore>, Arc<MockProvider>, EscrowService) {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(MockProvider::new());
        let svc = EscrowService::new(store.clone(), provider.clone());
        (store, provider, svc)
    }

    fn create_req() -> CreateEscrow {
        CreateEscrow {
            listing_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            amount: dec!(100000),
            fee: dec!(1000),
        }
    }

    fn charge_event(tx_id: Uuid) -> ChargeEvent {
        ChargeEvent {
            tx_id,
            reference: "ref_live".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_yields_pending_without_reference() {
        let (_, _, svc) = service();
        let created = svc.create(create_req()).await.unwrap();

        assert_eq!(created.transaction.status, EscrowStatus::PendingPayment);
        assert!(created.transaction.provider_reference.is_none());
        assert!(!created.init.authorization_url.is_empty());
        assert_eq!(created.transaction.payment_provider, "mock");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_amounts() {
        let (_, provider, svc) = service();
        let mut req = create_req();
        req.amount = dec!(0);
        assert!(matches!(
            svc.create(req).await.unwrap_err(),
            MarketError::ValidationFailed(_)
        ));
        // nothing reached the provider
        assert_eq!(provider.init_count(), 0);
    }

    #[tokio::test]
    async fn test_create_keeps_record_when_init_fails() {
        let (store, provider, svc) = service();
        provider.set_fail_init(true);

        let err = svc.create(create_req()).await.unwrap_err();
        assert!(matches!(err, MarketError::ProviderUnavailable(_)));

        // the record survives for a later retry
        let all = store.list_escrows(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, EscrowStatus::PendingPayment);
    }

    #[tokio::test]
    async fn test_charge_event_moves_to_funds_held() {
        let (store, _, svc) = service();
        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;

        let outcome = svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();
        assert_eq!(
            outcome,
            ChargeOutcome::FundsConfirmed(PayoutOutcome::NoCredentials)
        );

        let tx = store.get_escrow(tx_id).await.unwrap().unwrap();
        assert_eq!(tx.status, EscrowStatus::FundsHeld);
        assert_eq!(tx.provider_reference.as_deref(), Some("ref_live"));
    }

    #[tokio::test]
    async fn test_duplicate_charge_event_is_noop() {
        let (store, provider, svc) = service();
        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;

        svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();
        let second = svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();

        assert_eq!(second, ChargeOutcome::AlreadyProcessed);
        // verify ran only for the first delivery
        assert_eq!(provider.verify_count(), 1);
        let tx = store.get_escrow(tx_id).await.unwrap().unwrap();
        assert_eq!(tx.provider_reference.as_deref(), Some("ref_live"));
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_noop() {
        let (_, provider, svc) = service();
        let outcome = svc
            .on_charge_succeeded(charge_event(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(outcome, ChargeOutcome::UnknownTransaction);
        assert_eq!(provider.verify_count(), 0);
    }

    #[tokio::test]
    async fn test_unverified_charge_does_not_transition() {
        let (store, provider, svc) = service();
        provider.set_verify_result(false);
        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;

        let outcome = svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();
        assert_eq!(outcome, ChargeOutcome::NotVerified);

        let tx = store.get_escrow(tx_id).await.unwrap().unwrap();
        assert_eq!(tx.status, EscrowStatus::PendingPayment);
        assert!(tx.provider_reference.is_none());
    }

    #[tokio::test]
    async fn test_charge_event_with_credentials_auto_releases() {
        let (store, _, svc) = service();
        let req = create_req();
        let seller_id = req.seller_id;
        store
            .upsert_payout_credentials(PayoutCredentials {
                seller_id,
                account_name: "Ade Motors".to_string(),
                account_number: "0123456789".to_string(),
                bank_code: "058".to_string(),
            })
            .await
            .unwrap();

        let created = svc.create(req).await.unwrap();
        let outcome = svc
            .on_charge_succeeded(charge_event(created.transaction.id))
            .await
            .unwrap();

        assert_eq!(outcome, ChargeOutcome::FundsConfirmed(PayoutOutcome::Released));
        let tx = store.get_escrow(created.transaction.id).await.unwrap().unwrap();
        assert_eq!(tx.status, EscrowStatus::Released);
    }

    #[tokio::test]
    async fn test_payout_failure_keeps_webhook_ok() {
        let (store, provider, svc) = service();
        let req = create_req();
        store
            .upsert_payout_credentials(PayoutCredentials {
                seller_id: req.seller_id,
                account_name: "Ade Motors".to_string(),
                account_number: "0123456789".to_string(),
                bank_code: "058".to_string(),
            })
            .await
            .unwrap();
        provider.set_fail_transfer(true);

        let created = svc.create(req).await.unwrap();
        // the webhook outcome is still Ok even though the payout failed
        let outcome = svc
            .on_charge_succeeded(charge_event(created.transaction.id))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ChargeOutcome::FundsConfirmed(PayoutOutcome::Failed(_))
        ));

        let tx = store.get_escrow(created.transaction.id).await.unwrap().unwrap();
        assert_eq!(tx.status, EscrowStatus::FundsHeld);
    }

    #[tokio::test]
    async fn test_release_requires_funds_held() {
        let (_, _, svc) = service();
        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;

        let err = svc.release_funds(tx_id).await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));

        svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();
        let released = svc.release_funds(tx_id).await.unwrap();
        assert_eq!(released.status, EscrowStatus::Released);

        // released is terminal
        let err = svc.release_funds(tx_id).await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_dispute_from_pending_and_held() {
        let (_, _, svc) = service();

        let created = svc.create(create_req()).await.unwrap();
        let disputed = svc.mark_dispute(created.transaction.id).await.unwrap();
        assert_eq!(disputed.status, EscrowStatus::InDispute);

        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;
        svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();
        let disputed = svc.mark_dispute(tx_id).await.unwrap();
        assert_eq!(disputed.status, EscrowStatus::InDispute);

        // disputes are resolved manually, not re-disputed
        let err = svc.mark_dispute(tx_id).await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_release_and_dispute_unknown_id() {
        let (_, _, svc) = service();
        assert!(matches!(
            svc.release_funds(Uuid::new_v4()).await.unwrap_err(),
            MarketError::NotFound(_)
        ));
        assert!(matches!(
            svc.mark_dispute(Uuid::new_v4()).await.unwrap_err(),
            MarketError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_refund_held_transaction() {
        let (store, provider, svc) = service();
        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;
        svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();

        let refunded = svc.refund(tx_id).await.unwrap();
        assert_eq!(refunded.status, EscrowStatus::Refunded);
        assert_eq!(provider.refund_count(), 1);

        // terminal
        let err = svc.refund(tx_id).await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));
        let tx = store.get_escrow(tx_id).await.unwrap().unwrap();
        assert_eq!(tx.status, EscrowStatus::Refunded);
    }

    #[tokio::test]
    async fn test_refund_requires_funds_held() {
        let (_, provider, svc) = service();
        let created = svc.create(create_req()).await.unwrap();

        let err = svc.refund(created.transaction.id).await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));
        assert_eq!(provider.refund_count(), 0);
    }

    #[tokio::test]
    async fn test_refund_provider_failure_keeps_funds_held() {
        let (store, provider, svc) = service();
        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;
        svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap();

        provider.set_fail_refund(true);
        let err = svc.refund(tx_id).await.unwrap_err();
        assert!(matches!(err, MarketError::ProviderUnavailable(_)));

        let tx = store.get_escrow(tx_id).await.unwrap().unwrap();
        assert_eq!(tx.status, EscrowStatus::FundsHeld);
    }

    #[tokio::test]
    async fn test_concurrent_charge_events_settle_once() {
        let (store, provider, svc) = service();
        let created = svc.create(create_req()).await.unwrap();
        let tx_id = created.transaction.id;

        let svc = Arc::new(svc);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.on_charge_succeeded(charge_event(tx_id)).await.unwrap()
            }));
        }

        let mut confirmed = 0;
        for h in handles {
            if matches!(h.await.unwrap(), ChargeOutcome::FundsConfirmed(_)) {
                confirmed += 1;
            }
        }

        assert_eq!(confirmed, 1, "exactly one delivery settles the charge");
        let tx = store.get_escrow(tx_id).await.unwrap().unwrap();
        assert_eq!(tx.status, EscrowStatus::FundsHeld);
        assert_eq!(tx.provider_reference.as_deref(), Some("ref_live"));
        // each non-short-circuited delivery re-verifies at most once
        assert!(provider.verify_count() >= 1);
    }
}
