//! Escrow Settlement Engine
//!
//! Moves money from buyer to seller through the payment provider,
//! validated by the signed webhook.
//!
//! # State Machine
//!
//! ```text
//! PendingPayment ──▶ FundsHeld ──▶ Released
//!       │                │    └──▶ Refunded
//!       └────────────────┴───────▶ InDispute
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Dual check**: a charge event is acted on only after the webhook
//!    signature matched AND an independent verify call confirmed the
//!    charge. The signature proves origin; verify proves current truth.
//! 2. **Settle once**: `PendingPayment -> FundsHeld` happens exactly once
//!    per transaction, guarded by a status compare-and-swap. Duplicate
//!    deliveries are no-ops.
//! 3. **Reference set once**: the provider reference is written at that
//!    transition and never overwritten.
//! 4. **Payout never breaks the webhook**: auto-payout failures leave the
//!    record in FundsHeld and are logged, not propagated.

pub mod error;
pub mod payout;
pub mod service;
pub mod state;
pub mod types;

pub use error::MarketError;
pub use payout::{PayoutOrchestrator, PayoutOutcome};
pub use service::{ChargeOutcome, EscrowCreated, EscrowService};
pub use state::EscrowStatus;
pub use types::{CreateEscrow, EscrowTransaction, PayoutCredentials};
