//! Provider Webhook Handling
//!
//! Inbound notifications from the payment provider arrive as signed HTTP
//! posts. Authentication happens on the exact raw byte sequence of the
//! body, BEFORE any JSON parsing of untrusted content:
//!
//! ```text
//! raw body + x-paystack-signature header
//!        |
//!        v
//!   verify::check_signature   (HMAC-SHA512, constant-time compare)
//!        |
//!        v
//!   event::WebhookEvent       (typed envelope, parsed only on match)
//!        |
//!        v
//!   EscrowService::on_charge_succeeded
//! ```

pub mod event;
pub mod verify;

pub use event::{ChargeEvent, WebhookEvent};
pub use verify::{SIGNATURE_HEADER, SignatureError, check_signature};
