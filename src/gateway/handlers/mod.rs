//! Gateway handlers
//!
//! Thin axum handlers that delegate to the escrow service and bid
//! resolver; all policy lives in the services.

pub mod bids;
pub mod escrow;
pub mod health;
pub mod payout;
pub mod webhook;

pub use bids::{accept_bid, bids_for_listing, place_bid};
pub use escrow::{
    approve_release, get_escrow, initialize, list_escrows, mark_dispute,
    put_payout_credentials, refund,
};
pub use health::health_check;
pub use payout::{create_recipient, transfer};
pub use webhook::paystack_webhook;
