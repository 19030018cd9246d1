//! Typed webhook event envelope
//!
//! The provider body is decoded into explicit optional fields instead of
//! being traversed dynamically; a charge event missing its reference or
//! correlation id is a validation failure, not a null dereference.

use serde::Deserialize;
use uuid::Uuid;

use crate::escrow::error::MarketError;

/// Event type emitted when a charge completes successfully
pub const CHARGE_SUCCESS: &str = "charge.success";

/// Raw event envelope as delivered by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: Option<String>,
    #[serde(default)]
    pub data: Option<EventData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub reference: Option<String>,
    #[serde(default)]
    pub metadata: Option<EventMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMetadata {
    #[serde(rename = "txId")]
    pub tx_id: Option<String>,
}

/// A fully validated charge-success notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeEvent {
    pub tx_id: Uuid,
    pub reference: String,
}

impl WebhookEvent {
    /// Decode the raw body. Must only be called after signature
    /// verification has passed.
    pub fn parse(body: &[u8]) -> Result<Self, MarketError> {
        serde_json::from_slice(body)
            .map_err(|e| MarketError::validation(format!("malformed webhook body: {}", e)))
    }

    /// True when this envelope reports a successful charge
    pub fn is_charge_success(&self) -> bool {
        self.event.as_deref() == Some(CHARGE_SUCCESS)
    }

    /// Extract the charge fields this core needs. Absence of any
    /// expected field is a validation failure.
    pub fn into_charge_event(self) -> Result<ChargeEvent, MarketError> {
        let data = self
            .data
            .ok_or_else(|| MarketError::validation("charge event missing data"))?;
        let reference = data
            .reference
            .ok_or_else(|| MarketError::validation("charge event missing data.reference"))?;
        let tx_id_str = data
            .metadata
            .and_then(|m| m.tx_id)
            .ok_or_else(|| MarketError::validation("charge event missing data.metadata.txId"))?;
        let tx_id = Uuid::parse_str(&tx_id_str)
            .map_err(|_| MarketError::validation("data.metadata.txId is not a valid id"))?;
        Ok(ChargeEvent { tx_id, reference })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(event: &str, tx_id: &str) -> Vec<u8> {
        format!(
            r#"{{"event":"{}","data":{{"reference":"ref_42","metadata":{{"txId":"{}"}}}}}}"#,
            event, tx_id
        )
        .into_bytes()
    }

    #[test]
    fn test_parse_charge_success() {
        let id = Uuid::new_v4();
        let event = WebhookEvent::parse(&body(CHARGE_SUCCESS, &id.to_string())).unwrap();
        assert!(event.is_charge_success());

        let charge = event.into_charge_event().unwrap();
        assert_eq!(charge.tx_id, id);
        assert_eq!(charge.reference, "ref_42");
    }

    #[test]
    fn test_other_events_are_not_charge_success() {
        let event = WebhookEvent::parse(&body("transfer.success", "x")).unwrap();
        assert!(!event.is_charge_success());

        let event = WebhookEvent::parse(br#"{"data":{}}"#).unwrap();
        assert!(!event.is_charge_success());
    }

    #[test]
    fn test_malformed_body_is_validation_failure() {
        let err = WebhookEvent::parse(b"{not json").unwrap_err();
        assert!(matches!(err, MarketError::ValidationFailed(_)));
    }

    #[test]
    fn test_missing_reference_is_validation_failure() {
        let raw = format!(
            r#"{{"event":"charge.success","data":{{"metadata":{{"txId":"{}"}}}}}}"#,
            Uuid::new_v4()
        );
        let err = WebhookEvent::parse(raw.as_bytes())
            .unwrap()
            .into_charge_event()
            .unwrap_err();
        assert!(matches!(err, MarketError::ValidationFailed(_)));
    }

    #[test]
    fn test_missing_metadata_is_validation_failure() {
        let raw = r#"{"event":"charge.success","data":{"reference":"ref_42"}}"#;
        let err = WebhookEvent::parse(raw.as_bytes())
            .unwrap()
            .into_charge_event()
            .unwrap_err();
        assert!(matches!(err, MarketError::ValidationFailed(_)));
    }

    #[test]
    fn test_non_uuid_tx_id_is_validation_failure() {
        let err = WebhookEvent::parse(&body(CHARGE_SUCCESS, "not-a-uuid"))
            .unwrap()
            .into_charge_event()
            .unwrap_err();
        assert!(matches!(err, MarketError::ValidationFailed(_)));
    }

    #[test]
    fn test_missing_data_is_validation_failure() {
        let raw = r#"{"event":"charge.success"}"#;
        let err = WebhookEvent::parse(raw.as_bytes())
            .unwrap()
            .into_charge_event()
            .unwrap_err();
        assert!(matches!(err, MarketError::ValidationFailed(_)));
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let raw = format!(
            r#"{{"event":"charge.success","data":{{"reference":"ref_42","amount":10000000,"metadata":{{"txId":"{}","listingId":"whatever"}},"customer":{{"email":"b@example.com"}}}}}}"#,
            Uuid::new_v4()
        );
        let event = WebhookEvent::parse(raw.as_bytes()).unwrap();
        assert!(event.into_charge_event().is_ok());
    }
}
