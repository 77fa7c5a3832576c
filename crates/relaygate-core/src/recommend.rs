//! Recommendation Engine: exactly one next action per check-set.
//!
//! Priority follows the dependency chain between checks. Adapter
//! registration gates routing configuration, which gates a meaningful fee
//! quote. The first unmet condition wins.

use crate::preflight::PreflightChecks;
use crate::step::ProvisioningStep;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    RegisterAdapter,
    ConfigureRoute,
    VerifyRoute,
    Ready,
}

impl RecommendedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegisterAdapter => "REGISTER_ADAPTER",
            Self::ConfigureRoute => "CONFIGURE_ROUTE",
            Self::VerifyRoute => "VERIFY_ROUTE",
            Self::Ready => "READY",
        }
    }

    /// Manual stepper step that starts this action.
    pub fn entry_step(self) -> Option<ProvisioningStep> {
        match self {
            Self::RegisterAdapter => Some(ProvisioningStep::RegisterAdapter),
            Self::ConfigureRoute => Some(ProvisioningStep::SetDefaultBridge),
            Self::VerifyRoute => Some(ProvisioningStep::Verify),
            Self::Ready => None,
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn recommend(checks: &PreflightChecks) -> RecommendedAction {
    if !checks.adapter_registered {
        RecommendedAction::RegisterAdapter
    } else if !checks.route_configured {
        RecommendedAction::ConfigureRoute
    } else if !checks.fee_quote_healthy {
        RecommendedAction::VerifyRoute
    } else {
        RecommendedAction::Ready
    }
}
