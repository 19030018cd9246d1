//! Bridge Market - service entry point
//!
//! Loads `config/{env}.yaml`, wires the store and provider into the
//! settlement services, and serves the gateway.

use std::sync::Arc;

use bridge_market::config::AppConfig;
use bridge_market::gateway::{self, AppState};
use bridge_market::logging::init_logging;
use bridge_market::provider::{PaymentProvider, PaystackClient};
use bridge_market::store::MemoryStore;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--env" && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);

    // Guard must stay alive for the non-blocking file appender
    let _guard = init_logging(&config);

    tracing::info!(env = %env, "starting bridge_market");

    let store = Arc::new(MemoryStore::new());
    let provider: Arc<dyn PaymentProvider> = Arc::new(
        PaystackClient::new(&config.provider)
            .map_err(|e| anyhow::anyhow!("provider client init failed: {}", e))?,
    );

    if config.webhook_secret().is_none() {
        tracing::warn!("provider secret not configured; webhook deliveries will be rejected");
    }

    let state = Arc::new(AppState::new(store, provider, config.webhook_secret()));

    gateway::run_server(&config.gateway.host, config.gateway.port, state).await;
    Ok(())
}
