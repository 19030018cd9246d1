//! HTTP Gateway
//!
//! Thin axum surface over the settlement core. Routing only - every
//! decision lives in the escrow service and bid resolver.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let escrow_routes = Router::new()
        .route("/initialize", post(handlers::initialize))
        .route("/{id}", get(handlers::get_escrow));

    let admin_routes = Router::new()
        .route("/escrows", get(handlers::list_escrows))
        .route("/escrows/{id}/approve-release", post(handlers::approve_release))
        .route("/escrows/{id}/mark-dispute", post(handlers::mark_dispute))
        .route("/escrows/{id}/refund", post(handlers::refund));

    let bid_routes = Router::new()
        .route("/", post(handlers::place_bid))
        .route("/accept/{bid_id}", post(handlers::accept_bid))
        .route("/listing/{listing_id}", get(handlers::bids_for_listing));

    let payout_routes = Router::new()
        .route("/create-recipient", post(handlers::create_recipient))
        .route("/transfer", post(handlers::transfer));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/paystack/webhook", post(handlers::paystack_webhook))
        .route(
            "/api/sellers/{seller_id}/payout-credentials",
            put(handlers::put_payout_credentials),
        )
        .nest("/api/escrow", escrow_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/bids", bid_routes)
        .nest("/api/payout", payout_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("gateway listening on http://{}", addr);
    info!("API docs: http://{}/docs", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {}", e);
        std::process::exit(1);
    }
}
