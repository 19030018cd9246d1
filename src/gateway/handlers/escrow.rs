//! Escrow handlers: initialize plus the admin lifecycle actions

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use crate::escrow::types::{CreateEscrow, EscrowTransaction};
use crate::escrow::{EscrowStatus, PayoutCredentials};
use crate::provider::ProviderInit;
use crate::store::MarketStore;

/// Escrow creation response: the record plus the provider redirect payload
#[derive(Debug, Serialize, ToSchema)]
pub struct InitializeResponse {
    pub transaction: EscrowTransaction,
    pub init: ProviderInit,
}

/// Create an escrow transaction and initialize the charge
///
/// POST /api/escrow/initialize
#[utoipa::path(
    post,
    path = "/api/escrow/initialize",
    request_body = CreateEscrow,
    responses(
        (status = 200, description = "Escrow created, charge initialized", body = InitializeResponse),
        (status = 400, description = "Invalid amounts or parties"),
        (status = 503, description = "Provider unavailable; record kept in PendingPayment")
    ),
    tag = "Escrow"
)]
pub async fn initialize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEscrow>,
) -> ApiResult<InitializeResponse> {
    let created = state.escrow.create(req).await?;
    ok(InitializeResponse {
        transaction: created.transaction,
        init: created.init,
    })
}

/// Fetch one escrow transaction
///
/// GET /api/escrow/{id}
#[utoipa::path(
    get,
    path = "/api/escrow/{id}",
    params(("id" = Uuid, Path, description = "Escrow transaction id")),
    responses(
        (status = 200, description = "Transaction", body = EscrowTransaction),
        (status = 404, description = "Unknown transaction")
    ),
    tag = "Escrow"
)]
pub async fn get_escrow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<EscrowTransaction> {
    ok(state.escrow.get(id).await?)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EscrowListQuery {
    /// Optional status filter, e.g. "FundsHeld"
    pub status: Option<String>,
}

/// List escrow transactions, optionally filtered by status
///
/// GET /api/admin/escrows?status=FundsHeld
#[utoipa::path(
    get,
    path = "/api/admin/escrows",
    params(("status" = Option<String>, Query, description = "Status filter")),
    responses(
        (status = 200, description = "Transactions", body = [EscrowTransaction]),
        (status = 400, description = "Unknown status value")
    ),
    tag = "Admin"
)]
pub async fn list_escrows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EscrowListQuery>,
) -> ApiResult<Vec<EscrowTransaction>> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            s.parse::<EscrowStatus>()
                .map_err(|_| ApiError::bad_request(format!("unknown status: {}", s)))?,
        ),
    };
    ok(state.escrow.list(status).await?)
}

/// Admin: release held funds to the seller
///
/// POST /api/admin/escrows/{id}/approve-release
#[utoipa::path(
    post,
    path = "/api/admin/escrows/{id}/approve-release",
    params(("id" = Uuid, Path, description = "Escrow transaction id")),
    responses(
        (status = 200, description = "Updated transaction", body = EscrowTransaction),
        (status = 404, description = "Unknown transaction"),
        (status = 409, description = "Funds are not held")
    ),
    tag = "Admin"
)]
pub async fn approve_release(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<EscrowTransaction> {
    ok(state.escrow.release_funds(id).await?)
}

/// Admin: freeze a transaction pending manual resolution
///
/// POST /api/admin/escrows/{id}/mark-dispute
#[utoipa::path(
    post,
    path = "/api/admin/escrows/{id}/mark-dispute",
    params(("id" = Uuid, Path, description = "Escrow transaction id")),
    responses(
        (status = 200, description = "Updated transaction", body = EscrowTransaction),
        (status = 404, description = "Unknown transaction"),
        (status = 409, description = "Transaction is terminal or already disputed")
    ),
    tag = "Admin"
)]
pub async fn mark_dispute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<EscrowTransaction> {
    ok(state.escrow.mark_dispute(id).await?)
}

/// Admin: refund held funds to the buyer via the provider
///
/// POST /api/admin/escrows/{id}/refund
#[utoipa::path(
    post,
    path = "/api/admin/escrows/{id}/refund",
    params(("id" = Uuid, Path, description = "Escrow transaction id")),
    responses(
        (status = 200, description = "Updated transaction", body = EscrowTransaction),
        (status = 404, description = "Unknown transaction"),
        (status = 409, description = "Funds are not held"),
        (status = 503, description = "Provider rejected or unavailable")
    ),
    tag = "Admin"
)]
pub async fn refund(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<EscrowTransaction> {
    ok(state.escrow.refund(id).await?)
}

/// Register a seller's payout destination
///
/// PUT /api/sellers/{seller_id}/payout-credentials
#[utoipa::path(
    put,
    path = "/api/sellers/{seller_id}/payout-credentials",
    params(("seller_id" = Uuid, Path, description = "Seller id")),
    request_body = CredentialsBody,
    responses((status = 200, description = "Credentials stored", body = PayoutCredentials)),
    tag = "Escrow"
)]
pub async fn put_payout_credentials(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<Uuid>,
    Json(body): Json<CredentialsBody>,
) -> ApiResult<PayoutCredentials> {
    if body.account_number.is_empty() || body.bank_code.is_empty() {
        return ApiError::bad_request("account_number and bank_code are required").into_err();
    }
    let creds = PayoutCredentials {
        seller_id,
        account_name: body.account_name,
        account_number: body.account_number,
        bank_code: body.bank_code,
    };
    state.store.upsert_payout_credentials(creds.clone()).await?;
    ok(creds)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsBody {
    pub account_name: String,
    pub account_number: String,
    pub bank_code: String,
}
