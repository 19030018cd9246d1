//! Escrow Lifecycle State Definitions
//!
//! State IDs are stable for storage and API responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Escrow transaction states
///
/// Terminal states: RELEASED (30), REFUNDED (31).
/// IN_DISPUTE (40) is terminal for automation - only a manual admin
/// action (modeled as an external event) moves a disputed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "PascalCase")]
pub enum EscrowStatus {
    /// Record created, buyer has not completed the charge
    PendingPayment = 10,

    /// Charge verified - platform holds the funds
    /// CRITICAL: the provider reference is recorded exactly once, here
    FundsHeld = 20,

    /// Terminal: funds paid out to the seller
    Released = 30,

    /// Terminal: funds returned to the buyer
    Refunded = 31,

    /// Frozen pending manual resolution
    InDispute = 40,
}

impl EscrowStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscrowStatus::Released | EscrowStatus::Refunded)
    }

    /// Check whether funds are currently held by the platform
    #[inline]
    pub fn is_held(&self) -> bool {
        matches!(self, EscrowStatus::FundsHeld)
    }

    /// Check whether the state machine permits moving to `next`
    ///
    /// Edges: PendingPayment -> FundsHeld | InDispute,
    /// FundsHeld -> Released | Refunded | InDispute.
    /// No edge re-enters PendingPayment.
    pub fn allows(&self, next: EscrowStatus) -> bool {
        matches!(
            (self, next),
            (EscrowStatus::PendingPayment, EscrowStatus::FundsHeld)
                | (EscrowStatus::PendingPayment, EscrowStatus::InDispute)
                | (EscrowStatus::FundsHeld, EscrowStatus::Released)
                | (EscrowStatus::FundsHeld, EscrowStatus::Refunded)
                | (EscrowStatus::FundsHeld, EscrowStatus::InDispute)
        )
    }

    /// Get the numeric state ID for storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from a stored state ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            10 => Some(EscrowStatus::PendingPayment),
            20 => Some(EscrowStatus::FundsHeld),
            30 => Some(EscrowStatus::Released),
            31 => Some(EscrowStatus::Refunded),
            40 => Some(EscrowStatus::InDispute),
            _ => None,
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            EscrowStatus::PendingPayment => "PendingPayment",
            EscrowStatus::FundsHeld => "FundsHeld",
            EscrowStatus::Released => "Released",
            EscrowStatus::Refunded => "Refunded",
            EscrowStatus::InDispute => "InDispute",
        }
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for EscrowStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        EscrowStatus::from_id(value).ok_or(())
    }
}

impl std::str::FromStr for EscrowStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PendingPayment" => Ok(EscrowStatus::PendingPayment),
            "FundsHeld" => Ok(EscrowStatus::FundsHeld),
            "Released" => Ok(EscrowStatus::Released),
            "Refunded" => Ok(EscrowStatus::Refunded),
            "InDispute" => Ok(EscrowStatus::InDispute),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EscrowStatus; 5] = [
        EscrowStatus::PendingPayment,
        EscrowStatus::FundsHeld,
        EscrowStatus::Released,
        EscrowStatus::Refunded,
        EscrowStatus::InDispute,
    ];

    #[test]
    fn test_terminal_states() {
        assert!(EscrowStatus::Released.is_terminal());
        assert!(EscrowStatus::Refunded.is_terminal());

        assert!(!EscrowStatus::PendingPayment.is_terminal());
        assert!(!EscrowStatus::FundsHeld.is_terminal());
        assert!(!EscrowStatus::InDispute.is_terminal());
    }

    #[test]
    fn test_forward_edges_only() {
        assert!(EscrowStatus::PendingPayment.allows(EscrowStatus::FundsHeld));
        assert!(EscrowStatus::PendingPayment.allows(EscrowStatus::InDispute));
        assert!(EscrowStatus::FundsHeld.allows(EscrowStatus::Released));
        assert!(EscrowStatus::FundsHeld.allows(EscrowStatus::Refunded));
        assert!(EscrowStatus::FundsHeld.allows(EscrowStatus::InDispute));

        // nothing re-enters PendingPayment
        for s in ALL {
            assert!(!s.allows(EscrowStatus::PendingPayment));
        }
        // terminal states permit nothing
        for s in ALL {
            assert!(!EscrowStatus::Released.allows(s));
            assert!(!EscrowStatus::Refunded.allows(s));
        }
        // disputes are resolved manually, not by this state machine
        for s in ALL {
            assert!(!EscrowStatus::InDispute.allows(s));
        }
        // skipping FundsHeld is not allowed
        assert!(!EscrowStatus::PendingPayment.allows(EscrowStatus::Released));
        assert!(!EscrowStatus::PendingPayment.allows(EscrowStatus::Refunded));
    }

    #[test]
    fn test_is_held() {
        assert!(EscrowStatus::FundsHeld.is_held());
        assert!(!EscrowStatus::PendingPayment.is_held());
        assert!(!EscrowStatus::Released.is_held());
    }

    #[test]
    fn test_state_id_roundtrip() {
        for state in ALL {
            let id = state.id();
            let recovered = EscrowStatus::from_id(id).unwrap();
            assert_eq!(state, recovered);
        }
    }

    #[test]
    fn test_invalid_state_id() {
        assert!(EscrowStatus::from_id(0).is_none());
        assert!(EscrowStatus::from_id(999).is_none());
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(EscrowStatus::PendingPayment.to_string(), "PendingPayment");
        assert_eq!(
            serde_json::to_string(&EscrowStatus::FundsHeld).unwrap(),
            "\"FundsHeld\""
        );
        let parsed: EscrowStatus = serde_json::from_str("\"InDispute\"").unwrap();
        assert_eq!(parsed, EscrowStatus::InDispute);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Released".parse(), Ok(EscrowStatus::Released));
        assert!("released".parse::<EscrowStatus>().is_err());
    }
}
