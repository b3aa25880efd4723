//! Order status enumeration and the transition validator
//!
//! `OrderStatus` is the single canonical representation of an order's
//! lifecycle stage. External systems speak several dialects for the same
//! states (`pending`/`completed` from the relational store, `New`/`Picked Up`
//! from older board variants); those synonyms are normalized exactly once,
//! at projection time, via [`OrderStatus::parse`]. Downstream code only ever
//! sees this enum.
//!
//! The transition graph is fixed and small:
//!
//! ```text
//! New ──▶ Preparing ──▶ Ready ──▶ PickedUp
//!  │          │           │
//!  └──────────┴───────────┴─────▶ Cancelled
//! ```
//!
//! No backward edges, no self-transitions. `PickedUp` and `Cancelled` are
//! terminal. Moving backward (e.g. Ready → Preparing) would silently revoke
//! a customer-visible promise, so it requires the administrative edit path
//! instead of a board transition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a pickup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the customer, not yet started
    New,
    /// Kitchen is working on it
    Preparing,
    /// Waiting on the pickup shelf
    Ready,
    /// Collected by the customer (terminal)
    PickedUp,
    /// Cancelled by staff (terminal)
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order. Useful for exhaustive table tests
    /// and for rendering board columns.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::PickedUp,
        OrderStatus::Cancelled,
    ];

    /// Parse a wire-format status, accepting every synonym the known
    /// producers emit. Matching is case-insensitive and tolerates the
    /// space/underscore variants of "picked up".
    ///
    /// Returns `None` for unrecognized input; the projection layer decides
    /// the fallback (it defaults to `New` and flags the record).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" | "pending" => Some(OrderStatus::New),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "picked up" | "picked_up" | "pickedup" | "completed" => Some(OrderStatus::PickedUp),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// The canonical lowercase name used on the wire and in logs.
    pub fn wire_name(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a board transition from `self` to `target` is legal.
    ///
    /// Pure and total over the full 5×5 matrix. Cancellation is allowed
    /// from any non-terminal status; everything else follows the single
    /// forward path.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        match (*self, target) {
            (New, Preparing) => true,
            (Preparing, Ready) => true,
            (Ready, PickedUp) => true,
            (New | Preparing | Ready, Cancelled) => true,
            _ => false,
        }
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::PickedUp | OrderStatus::Cancelled)
    }

    /// Whether the order still occupies a board column (not yet handed over
    /// or cancelled).
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::New => "New",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::PickedUp => "Picked Up",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_transition_matrix_exhaustive() {
        // Every legal edge, nothing else.
        let legal = [
            (New, Preparing),
            (Preparing, Ready),
            (Ready, PickedUp),
            (New, Cancelled),
            (Preparing, Cancelled),
            (Ready, Cancelled),
        ];

        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{} -> {} should be {}",
                    from,
                    to,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_outgoing_edges() {
        for from in [PickedUp, Cancelled] {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{} -> {} accepted", from, to);
            }
        }
    }

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!(OrderStatus::parse("new"), Some(New));
        assert_eq!(OrderStatus::parse("preparing"), Some(Preparing));
        assert_eq!(OrderStatus::parse("ready"), Some(Ready));
        assert_eq!(OrderStatus::parse("picked_up"), Some(PickedUp));
        assert_eq!(OrderStatus::parse("cancelled"), Some(Cancelled));
    }

    #[test]
    fn test_parse_store_synonyms() {
        // The relational store speaks lowercase with different names
        assert_eq!(OrderStatus::parse("pending"), Some(New));
        assert_eq!(OrderStatus::parse("completed"), Some(PickedUp));
    }

    #[test]
    fn test_parse_board_variant_synonyms() {
        // Older board variants used title case with spaces
        assert_eq!(OrderStatus::parse("New"), Some(New));
        assert_eq!(OrderStatus::parse("Picked Up"), Some(PickedUp));
        assert_eq!(OrderStatus::parse("Cancelled"), Some(Cancelled));
        // American spelling shows up in some payloads
        assert_eq!(OrderStatus::parse("canceled"), Some(Cancelled));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.wire_name()));
            let back: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(PickedUp.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!New.is_terminal());
        assert!(!Preparing.is_terminal());
        assert!(!Ready.is_terminal());
    }
}
