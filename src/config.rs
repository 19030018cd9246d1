use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Paystack settings. The secret key authenticates outbound API calls
/// AND verifies inbound webhook signatures (the provider signs with the
/// same key).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    pub secret_key: String,
    pub base_url: String,
    pub callback_url: String,
    /// Bound on every outbound provider call
    pub timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            base_url: "https://api.paystack.co".to_string(),
            callback_url: "https://app.example.com/paystack/callback".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }

    /// Webhook verification secret; None when unconfigured so the
    /// boundary can reject instead of verifying against an empty key
    pub fn webhook_secret(&self) -> Option<String> {
        if self.provider.secret_key.is_empty() {
            None
        } else {
            Some(self.provider.secret_key.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults() {
        let cfg = ProviderConfig::default();
        assert_eq!(cfg.base_url, "https://api.paystack.co");
        assert_eq!(cfg.timeout_ms, 30_000);
        assert!(cfg.secret_key.is_empty());
    }

    #[test]
    fn test_webhook_secret_unset_when_empty() {
        let cfg = AppConfig {
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "app.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            enable_tracing: true,
            gateway: GatewayConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            provider: ProviderConfig::default(),
        };
        assert!(cfg.webhook_secret().is_none());
    }
}
