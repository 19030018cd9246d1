//! Bid Resolver
//!
//! Validation happens here; the atomic winner/losers/listing settlement
//! lives in the store, serialized per listing.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::types::{Bid, Listing, ListingStatus};
use crate::escrow::error::MarketError;
use crate::store::MarketStore;

pub struct BidResolver {
    store: Arc<dyn MarketStore>,
}

impl BidResolver {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Place a bid against a listing.
    ///
    /// Tender listings only take bids inside the half-open sale window
    /// `[start, end)`: a bid at exactly the end time is rejected. A
    /// configured floor price rejects anything below it.
    pub async fn place_bid(
        &self,
        listing_id: Uuid,
        bidder_id: Uuid,
        amount: Decimal,
    ) -> Result<Bid, MarketError> {
        let listing = self
            .store
            .get_listing(listing_id)
            .await?
            .ok_or(MarketError::NotFound("Listing"))?;

        if listing.status != ListingStatus::Active {
            return Err(MarketError::validation(format!(
                "listing is {}, not open for bids",
                listing.status
            )));
        }

        if listing.is_tender {
            self.check_sale_window(&listing)?;
        }

        if let Some(floor) = listing.minimum_bid
            && amount < floor
        {
            return Err(MarketError::validation(format!(
                "bid must be at least {}",
                floor
            )));
        }

        let bid = Bid::new(listing_id, bidder_id, amount);
        self.store.insert_bid(bid.clone()).await?;
        info!(bid_id = %bid.id, listing_id = %listing_id, amount = %amount, "bid placed");
        Ok(bid)
    }

    /// Accept a bid on behalf of the listing's seller.
    ///
    /// Sets the winner `Accepted`, the listing `Sold`, and every other
    /// pending bid `Rejected` - atomically. Of two concurrent accepts on
    /// the same listing exactly one succeeds; the other gets
    /// `InvalidTransition`.
    pub async fn accept_bid(
        &self,
        bid_id: Uuid,
        acting_seller_id: Uuid,
    ) -> Result<Bid, MarketError> {
        let bid = self
            .store
            .get_bid(bid_id)
            .await?
            .ok_or(MarketError::NotFound("Bid"))?;

        let listing = self
            .store
            .get_listing(bid.listing_id)
            .await?
            .ok_or(MarketError::NotFound("Listing"))?;

        if listing.seller_id != acting_seller_id {
            return Err(MarketError::Forbidden);
        }

        let accepted = self.store.settle_listing(listing.id, bid_id).await?;
        info!(
            bid_id = %accepted.id,
            listing_id = %listing.id,
            amount = %accepted.amount,
            "bid accepted, listing sold"
        );
        Ok(accepted)
    }

    /// Bids for a listing in display order (amount descending)
    pub async fn bids_for_listing(&self, listing_id: Uuid) -> Result<Vec<Bid>, MarketError> {
        self.store.bids_for_listing(listing_id).await
    }

    fn check_sale_window(&self, listing: &Listing) -> Result<(), MarketError> {
        listing.validate_tender_window()?;
        // validate_tender_window guarantees both bounds are present
        let (Some(start), Some(end)) = (listing.sale_start_time, listing.sale_end_time) else {
            return Err(MarketError::validation(
                "tender listing requires both sale start and end times",
            ));
        };

        let now = Utc::now();
        if now < start {
            return Err(MarketError::validation("tender has not started yet"));
        }
        if now >= end {
            return Err(MarketError::validation("tender has ended"));
        }
        Ok(())
    }
}
