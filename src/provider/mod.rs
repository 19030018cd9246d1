//! Payment Provider Client
//!
//! Polymorphic client for the external payment API. The capability set is
//! deliberately narrow: initialize a charge, verify a charge, issue a
//! refund, register a payout recipient, initiate a transfer.
//!
//! Every operation is a bounded network call. A timeout or non-2xx
//! response surfaces as [`ProviderError::Unavailable`]; it is never
//! interpreted as the charge having succeeded or failed - callers
//! re-verify through [`PaymentProvider::verify_transaction`] instead of
//! guessing.

pub mod paystack;
pub mod types;

pub use paystack::PaystackClient;
pub use types::{ProviderError, ProviderInit, RecipientHandle, TransferHandle};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::escrow::types::EscrowTransaction;

/// Capability set of the external payment provider
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Provider tag for logging and the transaction record
    fn name(&self) -> &'static str;

    /// Start a charge for the escrow amount. The returned payload carries
    /// the client-side redirect token; the request metadata embeds the
    /// internal transaction id so the webhook can correlate later.
    async fn initialize_transaction(
        &self,
        tx: &EscrowTransaction,
    ) -> Result<ProviderInit, ProviderError>;

    /// Query the authoritative status of a charge reference. Pure read,
    /// no local state is touched. True only for a successful charge.
    async fn verify_transaction(&self, reference: &str) -> Result<bool, ProviderError>;

    /// Request a partial or full refund of a charge
    async fn refund(&self, reference: &str, amount: Decimal) -> Result<bool, ProviderError>;

    /// Register a bank destination for payouts
    async fn create_recipient(
        &self,
        name: &str,
        account_number: &str,
        bank_code: &str,
    ) -> Result<RecipientHandle, ProviderError>;

    /// Push funds to a previously registered recipient
    async fn initiate_transfer(
        &self,
        recipient_code: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<TransferHandle, ProviderError>;
}

/// Mock provider for tests
#[cfg(any(test, feature = "mock-provider"))]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider: counts calls, lets tests flip each operation
    /// between success and failure.
    #[derive(Default)]
    pub struct MockProvider {
        init_count: AtomicUsize,
        verify_count: AtomicUsize,
        refund_count: AtomicUsize,
        recipient_count: AtomicUsize,
        transfer_count: AtomicUsize,
        fail_init: Mutex<bool>,
        verify_result: Mutex<bool>,
        fail_refund: Mutex<bool>,
        fail_recipient: Mutex<bool>,
        fail_transfer: Mutex<bool>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                verify_result: Mutex::new(true),
                ..Self::default()
            }
        }

        pub fn set_fail_init(&self, fail: bool) {
            *self.fail_init.lock().unwrap() = fail;
        }

        pub fn set_verify_result(&self, ok: bool) {
            *self.verify_result.lock().unwrap() = ok;
        }

        pub fn set_fail_refund(&self, fail: bool) {
            *self.fail_refund.lock().unwrap() = fail;
        }

        pub fn set_fail_recipient(&self, fail: bool) {
            *self.fail_recipient.lock().unwrap() = fail;
        }

        pub fn set_fail_transfer(&self, fail: bool) {
            *self.fail_transfer.lock().unwrap() = fail;
        }

        pub fn init_count(&self) -> usize {
            self.init_count.load(Ordering::SeqCst)
        }

        pub fn verify_count(&self) -> usize {
            self.verify_count.load(Ordering::SeqCst)
        }

        pub fn refund_count(&self) -> usize {
            self.refund_count.load(Ordering::SeqCst)
        }

        pub fn recipient_count(&self) -> usize {
            self.recipient_count.load(Ordering::SeqCst)
        }

        pub fn transfer_count(&self) -> usize {
            self.transfer_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn initialize_transaction(
            &self,
            tx: &EscrowTransaction,
        ) -> Result<ProviderInit, ProviderError> {
            self.init_count.fetch_add(1, Ordering::SeqCst);
            if *self.fail_init.lock().unwrap() {
                return Err(ProviderError::Unavailable("mock init failure".to_string()));
            }
            Ok(ProviderInit {
                authorization_url: format!("https://checkout.example/{}", tx.id),
                access_code: "AC_mock".to_string(),
                reference: format!("ref_{}", tx.id.simple()),
            })
        }

        async fn verify_transaction(&self, _reference: &str) -> Result<bool, ProviderError> {
            self.verify_count.fetch_add(1, Ordering::SeqCst);
            Ok(*self.verify_result.lock().unwrap())
        }

        async fn refund(
            &self,
            _reference: &str,
            _amount: Decimal,
        ) -> Result<bool, ProviderError> {
            self.refund_count.fetch_add(1, Ordering::SeqCst);
            if *self.fail_refund.lock().unwrap() {
                return Err(ProviderError::Unavailable("mock refund failure".to_string()));
            }
            Ok(true)
        }

        async fn create_recipient(
            &self,
            _name: &str,
            _account_number: &str,
            _bank_code: &str,
        ) -> Result<RecipientHandle, ProviderError> {
            self.recipient_count.fetch_add(1, Ordering::SeqCst);
            if *self.fail_recipient.lock().unwrap() {
                return Err(ProviderError::Unavailable(
                    "mock recipient failure".to_string(),
                ));
            }
            Ok(RecipientHandle {
                recipient_code: "RCP_mock".to_string(),
            })
        }

        async fn initiate_transfer(
            &self,
            _recipient_code: &str,
            _amount: Decimal,
            _reason: &str,
        ) -> Result<TransferHandle, ProviderError> {
            self.transfer_count.fetch_add(1, Ordering::SeqCst);
            if *self.fail_transfer.lock().unwrap() {
                return Err(ProviderError::Unavailable(
                    "mock transfer failure".to_string(),
                ));
            }
            Ok(TransferHandle {
                transfer_code: "TRF_mock".to_string(),
                status: "pending".to_string(),
            })
        }
    }
}

#[cfg(any(test, feature = "mock-provider"))]
pub use mock::MockProvider;
