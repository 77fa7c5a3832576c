//! Error taxonomy shared by every relaygate layer.

use crate::bridge::BridgeType;
use serde::{Deserialize, Serialize};

/// Stable machine-readable error codes.
///
/// Preflight results carry these as data; Rust error types expose them via
/// `code()` so callers can branch without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AdapterNotRegistered,
    RouteNotConfigured,
    FeeQuoteFailed,
    MissingRequiredField,
    TransportFailure,
    InvalidAddress,
    UnknownBridgeType,
    StepGated,
    SelectionIncomplete,
    OperationInFlight,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdapterNotRegistered => "ADAPTER_NOT_REGISTERED",
            Self::RouteNotConfigured => "ROUTE_NOT_CONFIGURED",
            Self::FeeQuoteFailed => "FEE_QUOTE_FAILED",
            Self::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            Self::TransportFailure => "TRANSPORT_FAILURE",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::UnknownBridgeType => "UNKNOWN_BRIDGE_TYPE",
            Self::StepGated => "STEP_GATED",
            Self::SelectionIncomplete => "SELECTION_INCOMPLETE",
            Self::OperationInFlight => "OPERATION_IN_FLIGHT",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by route-level derivations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A field needed to build a mutation payload could not be resolved.
    #[error("missing required field `{field}` for chain {chain_id} ({bridge})")]
    MissingRequiredField {
        field: &'static str,
        chain_id: String,
        bridge: BridgeType,
    },

    /// An address did not have the expected hex shape.
    #[error("invalid address `{value}`: {reason}")]
    InvalidAddress { value: String, reason: String },

    /// A bridge tag outside the closed protocol set.
    #[error("unknown bridge type tag: {0}")]
    UnknownBridgeType(u8),

    /// Opaque failure reported by the configuration backend.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl RouteError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingRequiredField { .. } => ErrorCode::MissingRequiredField,
            Self::InvalidAddress { .. } => ErrorCode::InvalidAddress,
            Self::UnknownBridgeType(_) => ErrorCode::UnknownBridgeType,
            Self::Transport(_) => ErrorCode::TransportFailure,
        }
    }
}
