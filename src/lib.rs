//! Bridge Market - Marketplace Settlement Backend
//!
//! The core of a vehicle marketplace: buyer-to-seller payments held in
//! escrow through an external payment provider, and bid/tender
//! resolution for listings sold by auction.
//!
//! # Modules
//!
//! - [`escrow`] - Escrow transaction state machine and auto-payout
//! - [`provider`] - Payment provider client (Paystack)
//! - [`webhook`] - Signed webhook verification and event envelope
//! - [`bids`] - Bid placement and tender resolution
//! - [`store`] - Generic data store seam + in-memory implementation
//! - [`gateway`] - HTTP surface (axum)
//! - [`config`] / [`logging`] - service configuration and tracing setup

pub mod bids;
pub mod config;
pub mod escrow;
pub mod gateway;
pub mod logging;
pub mod provider;
pub mod store;
pub mod webhook;

// Convenient re-exports at crate root
pub use bids::{Bid, BidResolver, BidStatus, Listing, ListingStatus};
pub use escrow::{
    ChargeOutcome, CreateEscrow, EscrowService, EscrowStatus, EscrowTransaction, MarketError,
    PayoutCredentials, PayoutOutcome,
};
pub use provider::{PaymentProvider, PaystackClient, ProviderError};
pub use store::{MarketStore, MemoryStore};
pub use webhook::{ChargeEvent, WebhookEvent, check_signature};
