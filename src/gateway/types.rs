//! API response types and error mapping
//!
//! - `ApiResponse<T>`: unified response wrapper
//! - `ApiError`: handler error with HTTP status, convertible from the
//!   core taxonomy

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::escrow::error::MarketError;

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: "OK" on success, taxonomy code on error
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// "OK" for success, error code otherwise
    #[schema(example = "OK")]
    pub code: &'static str,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: "OK",
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

/// Handler error carrying the classified code and HTTP status
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
    }

    /// Convenience for `Err(api_error)` in handlers
    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, e.code(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse {
            code: self.code,
            msg: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Handler result: success envelope or classified error
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap a success payload
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Bid placement request
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceBidRequest {
    pub listing_id: uuid::Uuid,
    /// Acting bidder (JWT identity extraction is handled upstream)
    pub bidder_id: uuid::Uuid,
    #[schema(value_type = String, example = "17500000")]
    pub amount: rust_decimal::Decimal,
}

/// Bid acceptance request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AcceptBidRequest {
    /// Acting seller (JWT identity extraction is handled upstream)
    pub seller_id: uuid::Uuid,
}

/// Admin payout recipient request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecipientRequest {
    pub name: String,
    pub account_number: String,
    pub bank_code: String,
}

/// Admin transfer request
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferFundsRequest {
    pub recipient: String,
    #[schema(value_type = String, example = "99000")]
    pub amount: rust_decimal::Decimal,
    pub reason: String,
}
