//! Admin payout passthrough
//!
//! Thin passthrough to the provider's transfer endpoints for manual
//! payouts (the auto-payout path lives in the escrow service).

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiResult, CreateRecipientRequest, TransferFundsRequest, ok};
use crate::provider::{PaymentProvider, RecipientHandle, TransferHandle};

/// Register a transfer recipient with the provider
///
/// POST /api/payout/create-recipient
#[utoipa::path(
    post,
    path = "/api/payout/create-recipient",
    request_body = CreateRecipientRequest,
    responses(
        (status = 200, description = "Recipient registered", body = RecipientHandle),
        (status = 503, description = "Provider unavailable")
    ),
    tag = "Payout"
)]
pub async fn create_recipient(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRecipientRequest>,
) -> ApiResult<RecipientHandle> {
    let handle = state
        .provider
        .create_recipient(&req.name, &req.account_number, &req.bank_code)
        .await
        .map_err(crate::escrow::MarketError::from)?;
    ok(handle)
}

/// Initiate a transfer to a registered recipient
///
/// POST /api/payout/transfer
#[utoipa::path(
    post,
    path = "/api/payout/transfer",
    request_body = TransferFundsRequest,
    responses(
        (status = 200, description = "Transfer accepted", body = TransferHandle),
        (status = 503, description = "Provider unavailable")
    ),
    tag = "Payout"
)]
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferFundsRequest>,
) -> ApiResult<TransferHandle> {
    let handle = state
        .provider
        .initiate_transfer(&req.recipient, req.amount, &req.reason)
        .await
        .map_err(crate::escrow::MarketError::from)?;
    ok(handle)
}
