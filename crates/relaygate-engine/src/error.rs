//! Engine-level errors.

use crate::backend::BackendError;
use relaygate_core::{ErrorCode, ProvisioningStep, RouteError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A step was requested before its predecessor completed.
    #[error("{step} is gated: {requires} has not completed")]
    StepGated {
        step: ProvisioningStep,
        requires: ProvisioningStep,
    },

    /// The session has no source or destination selected.
    #[error("session selection incomplete: no {missing} selected")]
    SelectionIncomplete { missing: &'static str },

    /// A mutating operation is already running on this control plane.
    #[error("another operation is in flight")]
    OperationInFlight,

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::StepGated { .. } => ErrorCode::StepGated,
            Self::SelectionIncomplete { .. } => ErrorCode::SelectionIncomplete,
            Self::OperationInFlight => ErrorCode::OperationInFlight,
            Self::Route(err) => err.code(),
            Self::Backend(err) => err.code(),
        }
    }
}
