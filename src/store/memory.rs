//! In-memory store implementation
//!
//! Backs the trait with concurrent maps. The escrow CAS relies on the
//! exclusive shard guard returned by `DashMap::get_mut`; listing
//! settlement additionally holds a per-listing async mutex so the
//! accept-winner/reject-losers/mark-sold sequence is one critical
//! section.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::MarketStore;
use crate::bids::types::{Bid, BidStatus, Listing, ListingStatus};
use crate::escrow::error::MarketError;
use crate::escrow::state::EscrowStatus;
use crate::escrow::types::{EscrowTransaction, PayoutCredentials};

#[derive(Default)]
pub struct MemoryStore {
    escrows: DashMap<Uuid, EscrowTransaction>,
    listings: DashMap<Uuid, Listing>,
    bids: DashMap<Uuid, Bid>,
    credentials: DashMap<Uuid, PayoutCredentials>,
    /// Settlement locks, one per listing, created on first use
    listing_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn settlement_lock(&self, listing_id: Uuid) -> Arc<Mutex<()>> {
        self.listing_locks
            .entry(listing_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn insert_escrow(&self, tx: EscrowTransaction) -> Result<(), MarketError> {
        self.escrows.insert(tx.id, tx);
        Ok(())
    }

    async fn get_escrow(&self, id: Uuid) -> Result<Option<EscrowTransaction>, MarketError> {
        Ok(self.escrows.get(&id).map(|e| e.clone()))
    }

    async fn list_escrows(
        &self,
        status: Option<EscrowStatus>,
    ) -> Result<Vec<EscrowTransaction>, MarketError> {
        let mut items: Vec<EscrowTransaction> = self
            .escrows
            .iter()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .map(|e| e.clone())
            .collect();
        items.sort_by_key(|e| e.created_at);
        Ok(items)
    }

    async fn update_escrow_status_if(
        &self,
        id: Uuid,
        expected: EscrowStatus,
        next: EscrowStatus,
        reference: Option<&str>,
    ) -> Result<bool, MarketError> {
        // get_mut holds the shard guard for the whole read-check-write
        match self.escrows.get_mut(&id) {
            Some(mut tx) => {
                if tx.status != expected {
                    return Ok(false);
                }
                tx.status = next;
                if let Some(r) = reference
                    && tx.provider_reference.is_none()
                {
                    tx.provider_reference = Some(r.to_string());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_listing(&self, listing: Listing) -> Result<(), MarketError> {
        self.listings.insert(listing.id, listing);
        Ok(())
    }

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, MarketError> {
        Ok(self.listings.get(&id).map(|l| l.clone()))
    }

    async fn insert_bid(&self, bid: Bid) -> Result<(), MarketError> {
        self.bids.insert(bid.id, bid);
        Ok(())
    }

    async fn get_bid(&self, id: Uuid) -> Result<Option<Bid>, MarketError> {
        Ok(self.bids.get(&id).map(|b| b.clone()))
    }

    async fn bids_for_listing(&self, listing_id: Uuid) -> Result<Vec<Bid>, MarketError> {
        let mut items: Vec<Bid> = self
            .bids
            .iter()
            .filter(|b| b.listing_id == listing_id)
            .map(|b| b.clone())
            .collect();
        items.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(items)
    }

    async fn settle_listing(&self, listing_id: Uuid, bid_id: Uuid) -> Result<Bid, MarketError> {
        let lock = self.settlement_lock(listing_id);
        let _guard = lock.lock().await;

        let listing_status = self
            .listings
            .get(&listing_id)
            .map(|l| l.status)
            .ok_or(MarketError::NotFound("Listing"))?;
        if listing_status != ListingStatus::Active {
            return Err(MarketError::InvalidTransition {
                from: listing_status.as_str(),
                action: "accept bid",
            });
        }

        let accepted = {
            let mut bid = self
                .bids
                .get_mut(&bid_id)
                .ok_or(MarketError::NotFound("Bid"))?;
            if bid.listing_id != listing_id {
                return Err(MarketError::NotFound("Bid"));
            }
            if bid.status != BidStatus::Pending {
                return Err(MarketError::InvalidTransition {
                    from: bid.status.as_str(),
                    action: "accept bid",
                });
            }
            bid.status = BidStatus::Accepted;
            bid.clone()
        };

        for mut b in self.bids.iter_mut() {
            if b.listing_id == listing_id && b.id != bid_id && b.status == BidStatus::Pending {
                b.status = BidStatus::Rejected;
            }
        }

        if let Some(mut listing) = self.listings.get_mut(&listing_id) {
            listing.status = ListingStatus::Sold;
        }

        Ok(accepted)
    }

    async fn upsert_payout_credentials(
        &self,
        creds: PayoutCredentials,
    ) -> Result<(), MarketError> {
        self.credentials.insert(creds.seller_id, creds);
        Ok(())
    }

    async fn get_payout_credentials(
        &self,
        seller_id: Uuid,
    ) -> Result<Option<PayoutCredentials>, MarketError> {
        Ok(self.credentials.get(&seller_id).map(|c| c.clone()))
    }
}
