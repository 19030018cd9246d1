use std::sync::Arc;

use crate::bids::BidResolver;
use crate::escrow::EscrowService;
use crate::provider::PaymentProvider;
use crate::store::MarketStore;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    pub escrow: Arc<EscrowService>,
    pub bids: Arc<BidResolver>,
    /// Direct provider access for the admin payout passthrough
    pub provider: Arc<dyn PaymentProvider>,
    pub store: Arc<dyn MarketStore>,
    /// Shared secret for webhook signature verification; None when
    /// unconfigured (the webhook endpoint rejects everything)
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MarketStore>,
        provider: Arc<dyn PaymentProvider>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            escrow: Arc::new(EscrowService::new(store.clone(), provider.clone())),
            bids: Arc::new(BidResolver::new(store.clone())),
            provider,
            store,
            webhook_secret,
        }
    }
}
