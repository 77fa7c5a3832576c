//! Directed chain pairs and their configuration health.

use crate::bridge::{BridgeType, PerBridge};
use crate::error::RouteError;
use crate::preflight::{BridgePreflightResult, PreflightChecks};
use serde::{Deserialize, Serialize};

/// Identity of one directed route. Orders by source, then destination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteKey {
    pub source_chain_id: String,
    pub dest_chain_id: String,
}

impl RouteKey {
    pub fn new(source_chain_id: impl Into<String>, dest_chain_id: impl Into<String>) -> Self {
        Self {
            source_chain_id: source_chain_id.into(),
            dest_chain_id: dest_chain_id.into(),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source_chain_id, self.dest_chain_id)
    }
}

/// One reason a route is not ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteIssue {
    pub code: String,
    pub message: String,
}

impl RouteIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Derived overall health of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Ready,
    Error,
    #[default]
    Unknown,
}

impl RouteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::str::FromStr for RouteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "READY" => Ok(Self::Ready),
            "ERROR" => Ok(Self::Error),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(format!("unknown route status `{s}`; expected ready, error or unknown")),
        }
    }
}

/// Route configuration health as fetched from the backend.
///
/// Routes are read-only snapshots: state changes only by mutating the
/// backend and fetching again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub source_chain_id: String,
    pub dest_chain_id: String,
    pub default_bridge_type: u8,
    pub adapter_registered: bool,
    #[serde(default)]
    pub protocol_configured: PerBridge<bool>,
    pub fee_quote_healthy: bool,
    #[serde(default)]
    pub issues: Vec<RouteIssue>,
    #[serde(default)]
    pub overall_status: RouteStatus,
}

impl Route {
    pub fn key(&self) -> RouteKey {
        RouteKey::new(&self.source_chain_id, &self.dest_chain_id)
    }

    pub fn default_bridge(&self) -> Result<BridgeType, RouteError> {
        BridgeType::from_tag(self.default_bridge_type)
    }

    pub fn checks_for(&self, bridge: BridgeType) -> PreflightChecks {
        PreflightChecks::new(
            self.adapter_registered,
            *self.protocol_configured.get(bridge),
            self.fee_quote_healthy,
        )
    }

    pub fn preflight(&self, bridge: BridgeType) -> BridgePreflightResult {
        BridgePreflightResult::evaluate(bridge, self.checks_for(bridge))
    }

    /// Checks for the default bridge; `None` when the default tag is unknown.
    pub fn default_checks(&self) -> Option<PreflightChecks> {
        self.default_bridge()
            .ok()
            .map(|bridge| self.checks_for(bridge))
    }

    /// `Ready` iff the default bridge preflight is ready and no issues remain.
    pub fn derive_status(&self) -> RouteStatus {
        match self.default_bridge() {
            Err(_) => RouteStatus::Unknown,
            Ok(bridge) if self.preflight(bridge).ready && self.issues.is_empty() => {
                RouteStatus::Ready
            }
            Ok(_) => RouteStatus::Error,
        }
    }

    /// Replace any backend-reported status with the derived one.
    pub fn normalized(mut self) -> Self {
        self.overall_status = self.derive_status();
        self
    }

    pub fn is_ready(&self) -> bool {
        self.derive_status() == RouteStatus::Ready
    }
}
