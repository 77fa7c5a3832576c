//! Contract with the external configuration backend.
//!
//! Transport, authentication and encoding live behind this trait. Every call
//! may suspend until the remote service answers, fails or times out.

use crate::session::StepStatus;
use async_trait::async_trait;
use relaygate_core::{
    BridgeType, ErrorCode, PreflightReport, PreflightRow, ProtocolConfig, Route, RouteError,
    RouteKey,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("route not found: {0}")]
    RouteNotFound(RouteKey),
}

impl BackendError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::TransportFailure
    }
}

impl From<RouteError> for BackendError {
    fn from(err: RouteError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Overview filters. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_chain_id: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl RouteQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            source_chain_id: None,
            dest_chain_id: None,
            page,
            limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl Pagination {
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.limit) < self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePage {
    pub routes: Vec<Route>,
    pub pagination: Pagination,
}

/// Raw preflight answer; evaluate with [`PreflightSnapshot::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightSnapshot {
    pub default_bridge_type: u8,
    pub bridges: Vec<PreflightRow>,
}

impl PreflightSnapshot {
    pub fn evaluate(self, key: RouteKey) -> Result<PreflightReport, RouteError> {
        PreflightReport::from_rows(key, self.default_bridge_type, self.bridges)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxBatch {
    pub tx_hashes: Vec<String>,
}

/// Result of rechecking one route inside a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecheckOutcome {
    pub key: RouteKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecheckOutcome {
    pub fn rechecked(route: Route) -> Self {
        Self {
            key: route.key(),
            route: Some(route),
            error: None,
        }
    }

    pub fn failed(key: RouteKey, error: impl Into<String>) -> Self {
        Self {
            key,
            route: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixRequest {
    pub key: RouteKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_type: Option<BridgeType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixStep {
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// Per-route auto-fix result: the corrective steps the backend attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixOutcome {
    pub key: RouteKey,
    pub steps: Vec<AutoFixStep>,
}

impl AutoFixOutcome {
    pub fn failed(key: RouteKey, message: impl Into<String>) -> Self {
        Self {
            key,
            steps: vec![AutoFixStep {
                name: "autoFix".to_string(),
                status: StepStatus::Failed,
                message: Some(message.into()),
                tx_hash: None,
            }],
        }
    }

    pub fn succeeded(&self) -> bool {
        self.steps
            .iter()
            .all(|step| step.status != StepStatus::Failed)
    }

    pub fn tx_hashes(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter_map(|step| step.tx_hash.clone())
            .collect()
    }

    /// Messages of failed steps joined for display.
    pub fn failure_message(&self) -> Option<String> {
        let messages: Vec<String> = self
            .steps
            .iter()
            .filter(|step| step.status == StepStatus::Failed)
            .map(|step| match &step.message {
                Some(message) => format!("{}: {message}", step.name),
                None => step.name.clone(),
            })
            .collect();
        (!messages.is_empty()).then(|| messages.join("; "))
    }
}

/// Abstract configuration backend.
///
/// The bulk methods default to one single-route call per key so that one
/// failing route never fails its siblings. Implementations with a native
/// bulk endpoint should keep that per-route isolation.
#[async_trait]
pub trait RouteBackend: Send + Sync {
    async fn route_overview(&self, query: &RouteQuery) -> Result<RoutePage, BackendError>;

    async fn preflight(&self, key: &RouteKey) -> Result<PreflightSnapshot, BackendError>;

    async fn register_adapter(
        &self,
        key: &RouteKey,
        bridge: BridgeType,
        adapter_address: &str,
    ) -> Result<TxReceipt, BackendError>;

    async fn set_default_bridge(
        &self,
        key: &RouteKey,
        bridge: BridgeType,
    ) -> Result<TxReceipt, BackendError>;

    async fn set_protocol_config(
        &self,
        key: &RouteKey,
        config: &ProtocolConfig,
    ) -> Result<TxBatch, BackendError>;

    async fn recheck_route(&self, key: &RouteKey) -> Result<Route, BackendError>;

    async fn recheck_routes_bulk(
        &self,
        keys: &[RouteKey],
    ) -> Result<Vec<RecheckOutcome>, BackendError> {
        let mut outcomes = Vec::with_capacity(keys.len());
        for key in keys {
            outcomes.push(match self.recheck_route(key).await {
                Ok(route) => RecheckOutcome::rechecked(route),
                Err(err) => RecheckOutcome::failed(key.clone(), err.to_string()),
            });
        }
        Ok(outcomes)
    }

    async fn auto_fix_route(
        &self,
        request: &AutoFixRequest,
    ) -> Result<AutoFixOutcome, BackendError>;

    async fn auto_fix_routes_bulk(
        &self,
        requests: &[AutoFixRequest],
    ) -> Result<Vec<AutoFixOutcome>, BackendError> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            outcomes.push(match self.auto_fix_route(request).await {
                Ok(outcome) => outcome,
                Err(err) => AutoFixOutcome::failed(request.key.clone(), err.to_string()),
            });
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_reports_remaining_pages() {
        let first = Pagination {
            page: 1,
            limit: 2,
            total: 5,
        };
        assert!(first.has_more());
        let last = Pagination {
            page: 3,
            limit: 2,
            total: 5,
        };
        assert!(!last.has_more());
    }

    #[test]
    fn auto_fix_outcome_summarizes_failed_steps() {
        let outcome = AutoFixOutcome {
            key: RouteKey::new("base", "bsc"),
            steps: vec![
                AutoFixStep {
                    name: "registerAdapter".to_string(),
                    status: StepStatus::Success,
                    message: None,
                    tx_hash: Some("0x01".to_string()),
                },
                AutoFixStep {
                    name: "setProtocolConfig".to_string(),
                    status: StepStatus::Failed,
                    message: Some("reverted".to_string()),
                    tx_hash: None,
                },
            ],
        };
        assert!(!outcome.succeeded());
        assert_eq!(outcome.tx_hashes(), vec!["0x01".to_string()]);
        assert_eq!(
            outcome.failure_message().as_deref(),
            Some("setProtocolConfig: reverted")
        );
    }
}
