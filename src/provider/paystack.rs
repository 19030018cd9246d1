//! Paystack client
//!
//! Speaks the Paystack REST API: transaction initialize/verify, refunds,
//! transfer recipients and transfers. Amounts cross this boundary in
//! kobo (minor units).

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{ProviderError, ProviderInit, RecipientHandle, TransferHandle, to_minor_units};
use super::PaymentProvider;
use crate::config::ProviderConfig;
use crate::escrow::types::EscrowTransaction;

pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    callback_url: String,
}

// === Request/response wire types ===

#[derive(Serialize)]
struct InitializeRequest<'a> {
    email: &'a str,
    amount: u64,
    callback_url: &'a str,
    metadata: InitializeMetadata,
}

#[derive(Serialize)]
struct InitializeMetadata {
    #[serde(rename = "txId")]
    tx_id: String,
    #[serde(rename = "listingId")]
    listing_id: String,
}

/// Paystack envelope: { status, message, data }
#[derive(Deserialize)]
struct Envelope<T> {
    status: bool,
    #[allow(dead_code)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

#[derive(Deserialize)]
struct VerifyData {
    status: String,
}

#[derive(Deserialize)]
struct RecipientData {
    recipient_code: String,
}

#[derive(Deserialize)]
struct TransferData {
    transfer_code: String,
    status: String,
}

#[derive(Serialize)]
struct RefundRequest<'a> {
    transaction: &'a str,
    amount: u64,
}

#[derive(Serialize)]
struct RecipientRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    account_number: &'a str,
    bank_code: &'a str,
    currency: &'a str,
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    source: &'static str,
    amount: u64,
    recipient: &'a str,
    reason: &'a str,
}

impl PaystackClient {
    /// Build a client with the configured secret, base URL and timeout
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let bearer = format!("Bearer {}", config.secret_key);
        let mut auth_value = reqwest::header::HeaderValue::from_str(&bearer)
            .map_err(|e| ProviderError::Unavailable(format!("invalid secret key: {}", e)))?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ProviderError::Unavailable(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            callback_url: config.callback_url.clone(),
        })
    }

    /// POST a JSON body and decode the Paystack envelope.
    /// Transport errors and non-2xx responses both map to Unavailable.
    async fn post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "{} returned {}: {}",
                path, status, text
            )));
        }

        let envelope: Envelope<T> = res
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        if !envelope.status {
            return Err(ProviderError::Unavailable(format!(
                "{} reported failure",
                path
            )));
        }
        envelope
            .data
            .ok_or_else(|| ProviderError::MalformedResponse(format!("{}: missing data", path)))
    }
}

#[async_trait]
impl PaymentProvider for PaystackClient {
    fn name(&self) -> &'static str {
        "paystack"
    }

    async fn initialize_transaction(
        &self,
        tx: &EscrowTransaction,
    ) -> Result<ProviderInit, ProviderError> {
        let body = InitializeRequest {
            email: "buyer@example.com",
            amount: to_minor_units(tx.amount)?,
            callback_url: &self.callback_url,
            metadata: InitializeMetadata {
                tx_id: tx.id.to_string(),
                listing_id: tx.listing_id.to_string(),
            },
        };

        let data: InitializeData = self.post("/transaction/initialize", &body).await?;
        debug!(tx_id = %tx.id, reference = %data.reference, "charge initialized");
        Ok(ProviderInit {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    async fn verify_transaction(&self, reference: &str) -> Result<bool, ProviderError> {
        let url = format!("{}/transaction/verify/{}", self.base_url, reference);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !res.status().is_success() {
            // verify is a read: an unknown reference is "not successful",
            // a server error is Unavailable
            if res.status().is_client_error() {
                return Ok(false);
            }
            return Err(ProviderError::Unavailable(format!(
                "verify returned {}",
                res.status()
            )));
        }

        let envelope: Envelope<VerifyData> = res
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(envelope.status
            && envelope
                .data
                .map(|d| d.status == "success")
                .unwrap_or(false))
    }

    async fn refund(&self, reference: &str, amount: Decimal) -> Result<bool, ProviderError> {
        let body = RefundRequest {
            transaction: reference,
            amount: to_minor_units(amount)?,
        };
        // refund data payload is provider-shaped; only the envelope verdict matters
        let _: serde_json::Value = self.post("/refund", &body).await?;
        Ok(true)
    }

    async fn create_recipient(
        &self,
        name: &str,
        account_number: &str,
        bank_code: &str,
    ) -> Result<RecipientHandle, ProviderError> {
        let body = RecipientRequest {
            kind: "nuban",
            name,
            account_number,
            bank_code,
            currency: crate::escrow::types::DEFAULT_CURRENCY,
        };
        let data: RecipientData = self.post("/transferrecipient", &body).await?;
        Ok(RecipientHandle {
            recipient_code: data.recipient_code,
        })
    }

    async fn initiate_transfer(
        &self,
        recipient_code: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<TransferHandle, ProviderError> {
        let body = TransferRequest {
            source: "balance",
            amount: to_minor_units(amount)?,
            recipient: recipient_code,
            reason,
        };
        let data: TransferData = self.post("/transfer", &body).await?;
        debug!(recipient = recipient_code, status = %data.status, "transfer initiated");
        Ok(TransferHandle {
            transfer_code: data.transfer_code,
            status: data.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_request_wire_shape() {
        let body = InitializeRequest {
            email: "buyer@example.com",
            amount: 10_000_000,
            callback_url: "https://app.example.com/paystack/callback",
            metadata: InitializeMetadata {
                tx_id: "0c1de6a1-0000-0000-0000-000000000000".to_string(),
                listing_id: "1d2ef7b2-0000-0000-0000-000000000000".to_string(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], 10_000_000);
        assert_eq!(
            json["metadata"]["txId"],
            "0c1de6a1-0000-0000-0000-000000000000"
        );
        assert_eq!(
            json["metadata"]["listingId"],
            "1d2ef7b2-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_recipient_request_uses_nuban() {
        let body = RecipientRequest {
            kind: "nuban",
            name: "Ade Motors",
            account_number: "0123456789",
            bank_code: "058",
            currency: "NGN",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "nuban");
        assert_eq!(json["currency"], "NGN");
    }

    #[test]
    fn test_envelope_decoding() {
        let raw = r#"{"status":true,"message":"Verification successful","data":{"status":"success"}}"#;
        let env: Envelope<VerifyData> = serde_json::from_str(raw).unwrap();
        assert!(env.status);
        assert_eq!(env.data.unwrap().status, "success");

        let raw = r#"{"status":false,"message":"Transaction not found"}"#;
        let env: Envelope<VerifyData> = serde_json::from_str(raw).unwrap();
        assert!(!env.status);
        assert!(env.data.is_none());
    }

    #[test]
    fn test_failed_charge_is_not_success() {
        let raw = r#"{"status":true,"message":"Verification successful","data":{"status":"failed"}}"#;
        let env: Envelope<VerifyData> = serde_json::from_str(raw).unwrap();
        let ok = env.status && env.data.map(|d| d.status == "success").unwrap_or(false);
        assert!(!ok);
    }
}
