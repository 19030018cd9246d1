//! Bid/Tender Resolution
//!
//! Accepts bids against a listing, enforces the tender sale window and
//! floor price, and settles the winner.
//!
//! # Invariant
//!
//! For a given listing at most one bid is ever `Accepted`, and accepting
//! it rejects every other pending bid and marks the listing sold in one
//! atomic unit. Two concurrent accepts cannot both win: settlement is
//! serialized per listing and the loser observes a conflict.
//!
//! Acceptance is an explicit seller action - the resolver never
//! auto-picks a highest bid, so equal-amount bids are resolved by
//! whichever one the seller chooses.

pub mod resolver;
pub mod types;

pub use resolver::BidResolver;
pub use types::{Bid, BidStatus, Listing, ListingStatus};
