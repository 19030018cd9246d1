//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::bids::types::{Bid, BidStatus, Listing, ListingStatus};
use crate::escrow::state::EscrowStatus;
use crate::escrow::types::{CreateEscrow, EscrowTransaction, PayoutCredentials};
use crate::gateway::handlers::escrow::{CredentialsBody, InitializeResponse};
use crate::gateway::handlers::health::HealthResponse;
use crate::gateway::types::{
    AcceptBidRequest, CreateRecipientRequest, PlaceBidRequest, TransferFundsRequest,
};
use crate::provider::types::{ProviderInit, RecipientHandle, TransferHandle};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bridge Market API",
        version = "1.0.0",
        description = "Vehicle marketplace backend: escrow settlement and bid/tender resolution.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::escrow::initialize,
        crate::gateway::handlers::escrow::get_escrow,
        crate::gateway::handlers::escrow::list_escrows,
        crate::gateway::handlers::escrow::approve_release,
        crate::gateway::handlers::escrow::mark_dispute,
        crate::gateway::handlers::escrow::refund,
        crate::gateway::handlers::escrow::put_payout_credentials,
        crate::gateway::handlers::webhook::paystack_webhook,
        crate::gateway::handlers::bids::place_bid,
        crate::gateway::handlers::bids::accept_bid,
        crate::gateway::handlers::bids::bids_for_listing,
        crate::gateway::handlers::payout::create_recipient,
        crate::gateway::handlers::payout::transfer,
    ),
    components(
        schemas(
            HealthResponse,
            EscrowTransaction,
            EscrowStatus,
            CreateEscrow,
            InitializeResponse,
            PayoutCredentials,
            CredentialsBody,
            ProviderInit,
            RecipientHandle,
            TransferHandle,
            Bid,
            BidStatus,
            Listing,
            ListingStatus,
            PlaceBidRequest,
            AcceptBidRequest,
            CreateRecipientRequest,
            TransferFundsRequest,
        )
    ),
    tags(
        (name = "Escrow", description = "Escrow transaction lifecycle"),
        (name = "Webhook", description = "Inbound provider notifications"),
        (name = "Admin", description = "Manual escrow actions"),
        (name = "Bids", description = "Bid placement and tender resolution"),
        (name = "Payout", description = "Manual payout passthrough"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
