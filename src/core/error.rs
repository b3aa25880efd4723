//! Typed error handling for the board core
//!
//! Clients handle failures specifically rather than matching on strings, so
//! every failure mode the board can surface is a variant here.
//!
//! # Error Categories
//!
//! - [`TransitionError`]: a requested status change was refused before any
//!   state was touched (illegal edge, busy order, unknown id)
//! - [`SyncError`]: the store and the local cache disagreed (confirmation
//!   failure, refresh failure, stuck transition)
//! - `BoardError::Validation`: placement input refused before reaching the
//!   store
//! - [`ConfigError`]: configuration parsing and validation
//!
//! Validation errors never reach the order store; store-level errors never
//! corrupt the cache: every mutation is all-or-nothing and failed paths
//! revert to the last known authoritative state.
//!
//! # Example
//!
//! ```rust,ignore
//! match board.request_transition(id, OrderStatus::Ready).await {
//!     Ok(()) => {}
//!     Err(BoardError::Transition(TransitionError::ConflictBusy { .. })) => {
//!         // retry after the pending transition settles
//!     }
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use crate::core::status::OrderStatus;
use crate::core::validation::FieldIssue;
use std::fmt;
use uuid::Uuid;

/// The main error type for board operations
#[derive(Debug)]
pub enum BoardError {
    /// A status transition was refused
    Transition(TransitionError),

    /// Synchronization with the order store failed
    Sync(SyncError),

    /// Order placement input was rejected
    Validation(Vec<FieldIssue>),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Transition(e) => write!(f, "{}", e),
            BoardError::Sync(e) => write!(f, "{}", e),
            BoardError::Validation(issues) => {
                let msgs: Vec<String> = issues
                    .iter()
                    .map(|i| format!("{}: {}", i.field, i.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            BoardError::Config(e) => write!(f, "{}", e),
            BoardError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Transition(e) => Some(e),
            BoardError::Sync(e) => Some(e),
            BoardError::Validation(_) => None,
            BoardError::Config(e) => Some(e),
            BoardError::Internal(_) => None,
        }
    }
}

impl BoardError {
    /// Stable code for programmatic handling and log correlation
    pub fn error_code(&self) -> &'static str {
        match self {
            BoardError::Transition(e) => e.error_code(),
            BoardError::Sync(e) => e.error_code(),
            BoardError::Validation(_) => "VALIDATION_ERROR",
            BoardError::Config(_) => "CONFIG_ERROR",
            BoardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same request later can succeed.
    ///
    /// Busy orders settle, store hiccups pass; an illegal edge stays
    /// illegal.
    pub fn is_retryable(&self) -> bool {
        match self {
            BoardError::Transition(TransitionError::ConflictBusy { .. }) => true,
            BoardError::Sync(SyncError::ConfirmationFailed { .. }) => true,
            BoardError::Sync(SyncError::RefreshFailed { .. }) => true,
            _ => false,
        }
    }
}

// =============================================================================
// Transition Errors
// =============================================================================

/// A requested status change was refused before any mutation
#[derive(Debug)]
pub enum TransitionError {
    /// The edge is not in the transition graph
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A transition is already pending on this order; retry after it settles
    ConflictBusy {
        id: Uuid,
        pending: OrderStatus,
    },

    /// No order with this id is in the cache
    UnknownOrder {
        id: Uuid,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::InvalidTransition { from, to } => {
                write!(f, "Transition {} -> {} is not allowed", from, to)
            }
            TransitionError::ConflictBusy { id, pending } => {
                write!(
                    f,
                    "Order '{}' already has a pending transition to {}",
                    id, pending
                )
            }
            TransitionError::UnknownOrder { id } => {
                write!(f, "Order '{}' not found", id)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

impl TransitionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TransitionError::InvalidTransition { .. } => "INVALID_TRANSITION",
            TransitionError::ConflictBusy { .. } => "CONFLICT_BUSY",
            TransitionError::UnknownOrder { .. } => "UNKNOWN_ORDER",
        }
    }
}

impl From<TransitionError> for BoardError {
    fn from(err: TransitionError) -> Self {
        BoardError::Transition(err)
    }
}

// =============================================================================
// Sync Errors
// =============================================================================

/// The store and the local cache disagreed
#[derive(Debug)]
pub enum SyncError {
    /// The store rejected or timed out a status update; the optimistic
    /// move was reverted
    ConfirmationFailed {
        id: Uuid,
        target: OrderStatus,
        message: String,
    },

    /// A periodic fetch failed; the previous cache state was retained
    RefreshFailed {
        message: String,
    },

    /// A pending transition never confirmed and was force-resolved to the
    /// authoritative status
    StuckTransition {
        id: Uuid,
        adopted: OrderStatus,
    },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::ConfirmationFailed {
                id,
                target,
                message,
            } => {
                write!(
                    f,
                    "Failed to confirm transition of '{}' to {}: {}",
                    id, target, message
                )
            }
            SyncError::RefreshFailed { message } => {
                write!(f, "Order refresh failed: {}", message)
            }
            SyncError::StuckTransition { id, adopted } => {
                write!(
                    f,
                    "Pending transition on '{}' never confirmed; adopted authoritative status {}",
                    id, adopted
                )
            }
        }
    }
}

impl std::error::Error for SyncError {}

impl SyncError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::ConfirmationFailed { .. } => "CONFIRMATION_FAILED",
            SyncError::RefreshFailed { .. } => "REFRESH_FAILED",
            SyncError::StuckTransition { .. } => "STUCK_TRANSITION",
        }
    }
}

impl From<SyncError> for BoardError {
    fn from(err: SyncError) -> Self {
        BoardError::Sync(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration content
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// A value is out of its accepted range
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound {
        path: String,
    },

    /// IO error while reading configuration
    IoError {
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for BoardError {
    fn from(err: ConfigError) -> Self {
        BoardError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<Vec<FieldIssue>> for BoardError {
    fn from(issues: Vec<FieldIssue>) -> Self {
        BoardError::Validation(issues)
    }
}

impl From<serde_yaml::Error> for BoardError {
    fn from(err: serde_yaml::Error) -> Self {
        BoardError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        BoardError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for board operations
pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = TransitionError::InvalidTransition {
            from: OrderStatus::Ready,
            to: OrderStatus::Preparing,
        };
        assert!(err.to_string().contains("Ready"));
        assert!(err.to_string().contains("not allowed"));
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }

    #[test]
    fn test_conflict_busy_is_retryable() {
        let err: BoardError = TransitionError::ConflictBusy {
            id: Uuid::nil(),
            pending: OrderStatus::Ready,
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "CONFLICT_BUSY");
    }

    #[test]
    fn test_invalid_transition_is_not_retryable() {
        let err: BoardError = TransitionError::InvalidTransition {
            from: OrderStatus::PickedUp,
            to: OrderStatus::New,
        }
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_confirmation_failed_display() {
        let err = SyncError::ConfirmationFailed {
            id: Uuid::nil(),
            target: OrderStatus::Ready,
            message: "store unreachable".to_string(),
        };
        assert!(err.to_string().contains("store unreachable"));
        assert_eq!(err.error_code(), "CONFIRMATION_FAILED");
    }

    #[test]
    fn test_board_error_conversion_and_source() {
        let err: BoardError = SyncError::RefreshFailed {
            message: "timeout".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "REFRESH_FAILED");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "poll_interval_secs".to_string(),
            value: "0".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn test_validation_error_lists_all_fields() {
        let err = BoardError::Validation(vec![
            FieldIssue {
                field: "customer.name".to_string(),
                message: "name is required".to_string(),
            },
            FieldIssue {
                field: "items".to_string(),
                message: "an order needs at least one item".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("customer.name"));
        assert!(display.contains("items"));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [unclosed").unwrap_err();
        let err: BoardError = yaml_err.into();
        assert!(matches!(
            err,
            BoardError::Config(ConfigError::ParseError { .. })
        ));
    }
}
