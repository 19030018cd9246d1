//! Bid handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use super::super::state::AppState;
use super::super::types::{AcceptBidRequest, ApiResult, PlaceBidRequest, ok};
use crate::bids::Bid;

/// Place a bid against a listing
///
/// POST /api/bids
#[utoipa::path(
    post,
    path = "/api/bids",
    request_body = PlaceBidRequest,
    responses(
        (status = 200, description = "Bid placed", body = Bid),
        (status = 400, description = "Outside tender window, below floor, or listing closed"),
        (status = 404, description = "Unknown listing")
    ),
    tag = "Bids"
)]
pub async fn place_bid(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaceBidRequest>,
) -> ApiResult<Bid> {
    let bid = state
        .bids
        .place_bid(req.listing_id, req.bidder_id, req.amount)
        .await?;
    ok(bid)
}

/// Accept a bid; settles the listing atomically
///
/// POST /api/bids/accept/{bid_id}
#[utoipa::path(
    post,
    path = "/api/bids/accept/{bid_id}",
    params(("bid_id" = Uuid, Path, description = "Bid to accept")),
    request_body = AcceptBidRequest,
    responses(
        (status = 200, description = "Bid accepted, listing sold", body = Bid),
        (status = 403, description = "Actor is not the listing's seller"),
        (status = 404, description = "Unknown bid or listing"),
        (status = 409, description = "Listing already settled")
    ),
    tag = "Bids"
)]
pub async fn accept_bid(
    State(state): State<Arc<AppState>>,
    Path(bid_id): Path<Uuid>,
    Json(req): Json<AcceptBidRequest>,
) -> ApiResult<Bid> {
    let bid = state.bids.accept_bid(bid_id, req.seller_id).await?;
    ok(bid)
}

/// Bids for a listing, highest amount first
///
/// GET /api/bids/listing/{listing_id}
#[utoipa::path(
    get,
    path = "/api/bids/listing/{listing_id}",
    params(("listing_id" = Uuid, Path, description = "Listing id")),
    responses((status = 200, description = "Bids in display order", body = [Bid])),
    tag = "Bids"
)]
pub async fn bids_for_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<Vec<Bid>> {
    ok(state.bids.bids_for_listing(listing_id).await?)
}
