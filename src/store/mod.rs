//! Data Store Seam
//!
//! The settlement core treats persistence as a generic data store behind
//! this trait. Two operations carry the concurrency contract the rest of
//! the system relies on:
//!
//! 1. [`MarketStore::update_escrow_status_if`] is a compare-and-swap on
//!    the escrow status. Read-check-write is serialized per transaction
//!    id, so two concurrent webhook deliveries settle
//!    `PendingPayment -> FundsHeld` exactly once.
//! 2. [`MarketStore::settle_listing`] accepts the winning bid, rejects
//!    every other pending bid, and marks the listing sold as one atomic
//!    unit, serialized per listing. No partially settled listing is ever
//!    observable.
//!
//! The unit of locking is the single escrow record or the single
//! listing's bid set. There are no global locks; operations on different
//! listings never contend.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::bids::types::{Bid, Listing};
use crate::escrow::error::MarketError;
use crate::escrow::state::EscrowStatus;
use crate::escrow::types::{EscrowTransaction, PayoutCredentials};

/// Store operations used by the escrow service and the bid resolver
#[async_trait]
pub trait MarketStore: Send + Sync {
    // === Escrow transactions (append-only, never deleted) ===

    async fn insert_escrow(&self, tx: EscrowTransaction) -> Result<(), MarketError>;

    async fn get_escrow(&self, id: Uuid) -> Result<Option<EscrowTransaction>, MarketError>;

    /// List escrow records, optionally filtered by status
    async fn list_escrows(
        &self,
        status: Option<EscrowStatus>,
    ) -> Result<Vec<EscrowTransaction>, MarketError>;

    /// Advance the escrow status only if the current status equals
    /// `expected`. Returns true if the write happened, false if the
    /// record is missing or another writer got there first.
    ///
    /// When `reference` is provided it is recorded in the same atomic
    /// step, and only if no reference was set before.
    async fn update_escrow_status_if(
        &self,
        id: Uuid,
        expected: EscrowStatus,
        next: EscrowStatus,
        reference: Option<&str>,
    ) -> Result<bool, MarketError>;

    // === Listings (tender-relevant subset) ===

    async fn insert_listing(&self, listing: Listing) -> Result<(), MarketError>;

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, MarketError>;

    // === Bids ===

    async fn insert_bid(&self, bid: Bid) -> Result<(), MarketError>;

    async fn get_bid(&self, id: Uuid) -> Result<Option<Bid>, MarketError>;

    /// All bids for a listing, ordered by amount descending (display order)
    async fn bids_for_listing(&self, listing_id: Uuid) -> Result<Vec<Bid>, MarketError>;

    /// Atomically accept `bid_id` and reject every other pending bid for
    /// the listing, marking the listing sold. Serialized per listing:
    /// of two concurrent calls exactly one succeeds, the other observes
    /// `InvalidTransition`.
    async fn settle_listing(&self, listing_id: Uuid, bid_id: Uuid) -> Result<Bid, MarketError>;

    // === Seller payout credentials ===

    async fn upsert_payout_credentials(
        &self,
        creds: PayoutCredentials,
    ) -> Result<(), MarketError>;

    async fn get_payout_credentials(
        &self,
        seller_id: Uuid,
    ) -> Result<Option<PayoutCredentials>, MarketError>;
}
