//! Provider webhook endpoint
//!
//! The single inbound surface the payment provider talks to. Contract:
//! 200 for any handled-or-ignored event, 400 for a missing/malformed
//! signature or body, 401 for a signature mismatch. Downstream payout
//! failures never fail the response - the provider must always receive
//! its acknowledgment.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{info, warn};

use super::super::state::AppState;
use crate::escrow::ChargeOutcome;
use crate::escrow::error::MarketError;
use crate::webhook::{SIGNATURE_HEADER, WebhookEvent, check_signature};

/// Paystack event sink
///
/// POST /api/paystack/webhook
#[utoipa::path(
    post,
    path = "/api/paystack/webhook",
    request_body(content = String, description = "Raw provider event body (signature-verified)", content_type = "application/json"),
    responses(
        (status = 200, description = "Event handled or ignored"),
        (status = 400, description = "Missing/malformed signature or body"),
        (status = 401, description = "Signature mismatch"),
        (status = 503, description = "Provider unreachable during re-verification; retry delivery")
    ),
    tag = "Webhook"
)]
pub async fn paystack_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    // Authenticate the raw bytes before any parsing of the body.
    if let Err(e) = check_signature(state.webhook_secret.as_deref(), signature, &body) {
        warn!(error = %e, "webhook rejected");
        return StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
    }

    let event = match WebhookEvent::parse(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "authenticated webhook body failed to parse");
            return StatusCode::BAD_REQUEST;
        }
    };

    if !event.is_charge_success() {
        info!(event = event.event.as_deref().unwrap_or("<none>"), "event ignored");
        return StatusCode::OK;
    }

    let charge = match event.into_charge_event() {
        Ok(charge) => charge,
        Err(e) => {
            warn!(error = %e, "charge event missing expected fields");
            return StatusCode::BAD_REQUEST;
        }
    };

    match state.escrow.on_charge_succeeded(charge).await {
        Ok(outcome) => {
            match outcome {
                ChargeOutcome::FundsConfirmed(payout) => {
                    info!(payout = %payout, "charge settled");
                }
                other => info!(?other, "charge event was a no-op"),
            }
            StatusCode::OK
        }
        // Could not re-verify the charge: tell the provider to retry the
        // delivery later rather than claiming it was handled.
        Err(MarketError::ProviderUnavailable(e)) => {
            warn!(error = %e, "charge verification unavailable, asking for redelivery");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(e) => {
            warn!(error = %e, "charge processing failed");
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
