//! Bid and Listing Types
//!
//! The tender-relevant subset of a listing lives here; the full listing
//! aggregate (photos, description, external sources) is owned by the
//! listing CRUD service and only referenced by id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::escrow::error::MarketError;

/// Bid lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Pending => "Pending",
            BidStatus::Accepted => "Accepted",
            BidStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One offer against a listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bid {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub bidder_id: Uuid,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: BidStatus,
}

impl Bid {
    /// Create a fresh pending bid stamped with the current time
    pub fn new(listing_id: Uuid, bidder_id: Uuid, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            bidder_id,
            amount,
            timestamp: Utc::now(),
            status: BidStatus::Pending,
        }
    }
}

/// Listing lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ListingStatus {
    Active,
    Sold,
    Cancelled,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "Active",
            ListingStatus::Sold => "Sold",
            ListingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tender-relevant subset of a listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub status: ListingStatus,
    /// Tender sale window opens (appointed hour)
    pub sale_start_time: Option<DateTime<Utc>>,
    /// Tender sale window closes (exclusive)
    pub sale_end_time: Option<DateTime<Utc>>,
    pub is_tender: bool,
    /// Optional floor price for bids
    pub minimum_bid: Option<Decimal>,
}

impl Listing {
    /// Plain (non-tender) active listing
    pub fn new(seller_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            seller_id,
            status: ListingStatus::Active,
            sale_start_time: None,
            sale_end_time: None,
            is_tender: false,
            minimum_bid: None,
        }
    }

    /// Active tender listing with a sale window and optional floor
    pub fn new_tender(
        seller_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        minimum_bid: Option<Decimal>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            seller_id,
            status: ListingStatus::Active,
            sale_start_time: Some(start),
            sale_end_time: Some(end),
            is_tender: true,
            minimum_bid,
        }
    }

    /// Check the tender invariant: both window bounds present, start < end
    pub fn validate_tender_window(&self) -> Result<(), MarketError> {
        if !self.is_tender {
            return Ok(());
        }
        match (self.sale_start_time, self.sale_end_time) {
            (Some(start), Some(end)) if start < end => Ok(()),
            (Some(_), Some(_)) => Err(MarketError::validation(
                "tender sale window must start before it ends",
            )),
            _ => Err(MarketError::validation(
                "tender listing requires both sale start and end times",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_bid_is_pending_now() {
        let bid = Bid::new(Uuid::new_v4(), Uuid::new_v4(), dec!(50000));
        assert_eq!(bid.status, BidStatus::Pending);
        assert!((Utc::now() - bid.timestamp).num_seconds() < 5);
    }

    #[test]
    fn test_tender_window_valid() {
        let now = Utc::now();
        let listing =
            Listing::new_tender(Uuid::new_v4(), now, now + Duration::hours(2), None);
        assert!(listing.validate_tender_window().is_ok());
    }

    #[test]
    fn test_tender_window_inverted() {
        let now = Utc::now();
        let listing =
            Listing::new_tender(Uuid::new_v4(), now + Duration::hours(2), now, None);
        assert!(listing.validate_tender_window().is_err());
    }

    #[test]
    fn test_tender_window_missing_bound() {
        let now = Utc::now();
        let mut listing =
            Listing::new_tender(Uuid::new_v4(), now, now + Duration::hours(2), None);
        listing.sale_end_time = None;
        assert!(listing.validate_tender_window().is_err());
    }

    #[test]
    fn test_non_tender_window_irrelevant() {
        let listing = Listing::new(Uuid::new_v4());
        assert!(listing.validate_tender_window().is_ok());
    }
}
