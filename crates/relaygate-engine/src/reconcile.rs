//! Bulk Reconciler primitives.
//!
//! Both primitives map a set of route keys to one outcome per route. A
//! whole-batch transport failure degrades into a failed outcome for every
//! route in the batch; it is never returned as an aggregate error.

use crate::backend::{AutoFixRequest, RouteBackend};
use relaygate_core::{BridgeType, Route, RouteKey, RouteStatus};
use relaygate_store::{RouteFilter, RouteSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Failed,
    Skipped,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutcome {
    pub key: RouteKey,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tx_hashes: Vec<String>,
}

impl RouteOutcome {
    fn success(key: RouteKey, message: Option<String>, tx_hashes: Vec<String>) -> Self {
        Self {
            key,
            status: OutcomeStatus::Success,
            message,
            tx_hashes,
        }
    }

    fn failed(key: RouteKey, message: impl Into<String>) -> Self {
        Self {
            key,
            status: OutcomeStatus::Failed,
            message: Some(message.into()),
            tx_hashes: Vec::new(),
        }
    }

    fn skipped(key: RouteKey, message: impl Into<String>) -> Self {
        Self {
            key,
            status: OutcomeStatus::Skipped,
            message: Some(message.into()),
            tx_hashes: Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }
}

/// Result of one recheck batch: per-route outcomes plus the routes the
/// backend returned, ready to overlay onto a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecheckBatch {
    pub outcomes: Vec<RouteOutcome>,
    pub routes: Vec<Route>,
}

/// Which routes a bulk operation covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkScope {
    /// Every route from a source chain.
    Source(String),
    /// Routes from a source chain currently in `ERROR`.
    SourceErrors(String),
    /// Whatever the filter currently shows.
    Filter(RouteFilter),
    /// One route.
    Route(RouteKey),
}

impl BulkScope {
    /// Keys in scope as of `snapshot`, in route order.
    ///
    /// A single-route scope yields its key even when the snapshot does not
    /// hold it yet.
    pub fn select(&self, snapshot: &RouteSnapshot) -> Vec<RouteKey> {
        match self {
            Self::Source(source) => snapshot
                .routes_from(source)
                .into_iter()
                .map(Route::key)
                .collect(),
            Self::SourceErrors(source) => snapshot
                .error_routes_from(source)
                .into_iter()
                .map(Route::key)
                .collect(),
            Self::Filter(filter) => snapshot
                .filter(filter)
                .into_iter()
                .map(Route::key)
                .collect(),
            Self::Route(key) => vec![key.clone()],
        }
    }

    /// Source chain recorded in reports; `*` when the scope spans sources.
    pub fn source_chain_id(&self) -> String {
        match self {
            Self::Source(source) | Self::SourceErrors(source) => source.clone(),
            Self::Filter(filter) => filter
                .source_chain_id
                .clone()
                .unwrap_or_else(|| "*".to_string()),
            Self::Route(key) => key.source_chain_id.clone(),
        }
    }

    pub fn dest_chain_id(&self) -> Option<String> {
        match self {
            Self::Source(_) | Self::SourceErrors(_) => None,
            Self::Filter(filter) => filter.dest_chain_id.clone(),
            Self::Route(key) => Some(key.dest_chain_id.clone()),
        }
    }
}

fn dedupe(keys: &[RouteKey]) -> Vec<RouteKey> {
    let mut seen = BTreeSet::new();
    keys.iter()
        .filter(|key| seen.insert((*key).clone()))
        .cloned()
        .collect()
}

fn issue_summary(route: &Route) -> String {
    if route.issues.is_empty() {
        return format!("route is {}", route.overall_status.as_str());
    }
    route
        .issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Recheck `keys` in one batch.
pub async fn bulk_recheck<B>(backend: &B, keys: &[RouteKey]) -> RecheckBatch
where
    B: RouteBackend + ?Sized,
{
    let keys = dedupe(keys);
    if keys.is_empty() {
        return RecheckBatch::default();
    }
    tracing::debug!(routes = keys.len(), "Dispatching recheck batch");

    let results = match backend.recheck_routes_bulk(&keys).await {
        Ok(results) => results,
        Err(err) => {
            tracing::warn!(routes = keys.len(), error = %err, "Recheck batch failed");
            let message = err.to_string();
            return RecheckBatch {
                outcomes: keys
                    .into_iter()
                    .map(|key| RouteOutcome::failed(key, message.clone()))
                    .collect(),
                routes: Vec::new(),
            };
        }
    };

    let mut by_key = BTreeMap::new();
    for result in results {
        by_key.insert(result.key.clone(), result);
    }

    let mut batch = RecheckBatch::default();
    for key in keys {
        let outcome = match by_key.remove(&key) {
            Some(result) => match (result.route, result.error) {
                (_, Some(error)) => RouteOutcome::failed(key, error),
                (Some(route), None) => {
                    let route = route.normalized();
                    let message = (route.overall_status != RouteStatus::Ready)
                        .then(|| issue_summary(&route));
                    batch.routes.push(route);
                    RouteOutcome::success(key, message, Vec::new())
                }
                (None, None) => RouteOutcome::failed(key, "recheck returned no route"),
            },
            None => RouteOutcome::failed(key, "no recheck result returned for route"),
        };
        batch.outcomes.push(outcome);
    }
    batch
}

/// Auto-fix `keys` in one batch. Routes already `READY` in `snapshot` are
/// skipped without any backend call.
pub async fn bulk_auto_fix<B>(
    backend: &B,
    snapshot: &RouteSnapshot,
    keys: &[RouteKey],
    bridge: Option<BridgeType>,
) -> Vec<RouteOutcome>
where
    B: RouteBackend + ?Sized,
{
    let mut outcomes: BTreeMap<RouteKey, RouteOutcome> = BTreeMap::new();
    let mut requests = Vec::new();
    let keys = dedupe(keys);
    for key in &keys {
        let ready = snapshot.route(key).is_some_and(Route::is_ready);
        if ready {
            outcomes.insert(
                key.clone(),
                RouteOutcome::skipped(key.clone(), "route already READY"),
            );
        } else {
            requests.push(AutoFixRequest {
                key: key.clone(),
                bridge_type: bridge,
            });
        }
    }

    if !requests.is_empty() {
        tracing::debug!(
            routes = requests.len(),
            skipped = outcomes.len(),
            "Dispatching auto-fix batch"
        );
        match backend.auto_fix_routes_bulk(&requests).await {
            Ok(results) => {
                for result in results {
                    let key = result.key.clone();
                    let outcome = match result.failure_message() {
                        Some(message) => RouteOutcome::failed(key.clone(), message),
                        None => RouteOutcome::success(key.clone(), None, result.tx_hashes()),
                    };
                    if requests.iter().any(|request| request.key == key) {
                        outcomes.insert(key, outcome);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(routes = requests.len(), error = %err, "Auto-fix batch failed");
                let message = err.to_string();
                for request in &requests {
                    outcomes.insert(
                        request.key.clone(),
                        RouteOutcome::failed(request.key.clone(), message.clone()),
                    );
                }
            }
        }
    }

    keys.into_iter()
        .map(|key| {
            outcomes.remove(&key).unwrap_or_else(|| {
                RouteOutcome::failed(key, "no auto-fix result returned for route")
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        AutoFixOutcome, BackendError, PreflightSnapshot, RecheckOutcome, RoutePage, RouteQuery,
        TxBatch, TxReceipt,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use relaygate_core::{PerBridge, ProtocolConfig};
    use std::sync::Mutex;

    fn route(dest: &str, ready: bool) -> Route {
        Route {
            source_chain_id: "base".to_string(),
            dest_chain_id: dest.to_string(),
            default_bridge_type: 0,
            adapter_registered: ready,
            protocol_configured: PerBridge {
                hyperbridge: ready,
                ..PerBridge::default()
            },
            fee_quote_healthy: true,
            issues: Vec::new(),
            overall_status: RouteStatus::Unknown,
        }
    }

    /// Backend whose bulk endpoints either fail wholesale or drop one route.
    #[derive(Default)]
    struct BatchBackend {
        fail_batches: bool,
        drop_dest: Option<&'static str>,
        auto_fix_calls: Mutex<Vec<RouteKey>>,
    }

    #[async_trait]
    impl RouteBackend for BatchBackend {
        async fn route_overview(&self, _query: &RouteQuery) -> Result<RoutePage, BackendError> {
            Err(BackendError::Transport("unused".to_string()))
        }

        async fn preflight(&self, key: &RouteKey) -> Result<PreflightSnapshot, BackendError> {
            Err(BackendError::RouteNotFound(key.clone()))
        }

        async fn register_adapter(
            &self,
            key: &RouteKey,
            _bridge: BridgeType,
            _adapter_address: &str,
        ) -> Result<TxReceipt, BackendError> {
            Err(BackendError::RouteNotFound(key.clone()))
        }

        async fn set_default_bridge(
            &self,
            key: &RouteKey,
            _bridge: BridgeType,
        ) -> Result<TxReceipt, BackendError> {
            Err(BackendError::RouteNotFound(key.clone()))
        }

        async fn set_protocol_config(
            &self,
            key: &RouteKey,
            _config: &ProtocolConfig,
        ) -> Result<TxBatch, BackendError> {
            Err(BackendError::RouteNotFound(key.clone()))
        }

        async fn recheck_route(&self, key: &RouteKey) -> Result<Route, BackendError> {
            Ok(route(&key.dest_chain_id, true))
        }

        async fn recheck_routes_bulk(
            &self,
            keys: &[RouteKey],
        ) -> Result<Vec<RecheckOutcome>, BackendError> {
            if self.fail_batches {
                return Err(BackendError::Transport("gateway timeout".to_string()));
            }
            Ok(keys
                .iter()
                .filter(|key| Some(key.dest_chain_id.as_str()) != self.drop_dest)
                .map(|key| RecheckOutcome::rechecked(route(&key.dest_chain_id, true)))
                .collect())
        }

        async fn auto_fix_route(
            &self,
            request: &AutoFixRequest,
        ) -> Result<AutoFixOutcome, BackendError> {
            self.auto_fix_calls
                .lock()
                .expect("call log lock")
                .push(request.key.clone());
            Ok(AutoFixOutcome {
                key: request.key.clone(),
                steps: Vec::new(),
            })
        }

        async fn auto_fix_routes_bulk(
            &self,
            requests: &[AutoFixRequest],
        ) -> Result<Vec<AutoFixOutcome>, BackendError> {
            if self.fail_batches {
                return Err(BackendError::Transport("gateway timeout".to_string()));
            }
            let mut outcomes = Vec::new();
            for request in requests {
                if Some(request.key.dest_chain_id.as_str()) == self.drop_dest {
                    continue;
                }
                outcomes.push(self.auto_fix_route(request).await?);
            }
            Ok(outcomes)
        }
    }

    fn snapshot(routes: Vec<Route>) -> RouteSnapshot {
        RouteSnapshot::from_routes(routes, DateTime::<Utc>::UNIX_EPOCH)
    }

    fn keys(dests: &[&str]) -> Vec<RouteKey> {
        dests.iter().map(|dest| RouteKey::new("base", *dest)).collect()
    }

    #[tokio::test]
    async fn batch_transport_failure_fails_every_route() {
        let backend = BatchBackend {
            fail_batches: true,
            ..BatchBackend::default()
        };
        let batch = bulk_recheck(&backend, &keys(&["bsc", "arbitrum"])).await;
        assert_eq!(batch.outcomes.len(), 2);
        assert!(batch.outcomes.iter().all(RouteOutcome::is_failure));
        assert!(batch.routes.is_empty());

        let current = snapshot(vec![route("bsc", false)]);
        let outcomes = bulk_auto_fix(&backend, &current, &keys(&["bsc"]), None).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, OutcomeStatus::Failed);
        assert_eq!(
            outcomes[0].message.as_deref(),
            Some("transport failure: gateway timeout")
        );
    }

    #[tokio::test]
    async fn missing_results_are_reported_as_failures() {
        let backend = BatchBackend {
            drop_dest: Some("arbitrum"),
            ..BatchBackend::default()
        };
        let batch = bulk_recheck(&backend, &keys(&["bsc", "arbitrum"])).await;
        assert_eq!(batch.outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(batch.outcomes[1].status, OutcomeStatus::Failed);
        assert_eq!(batch.routes.len(), 1);

        let current = snapshot(vec![route("bsc", false), route("arbitrum", false)]);
        let outcomes = bulk_auto_fix(&backend, &current, &keys(&["bsc", "arbitrum"]), None).await;
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(outcomes[1].status, OutcomeStatus::Failed);
    }

    #[tokio::test]
    async fn ready_routes_are_skipped_and_duplicates_collapse() {
        let backend = BatchBackend::default();
        let current = snapshot(vec![route("bsc", true), route("arbitrum", false)]);
        let outcomes = bulk_auto_fix(
            &backend,
            &current,
            &keys(&["bsc", "arbitrum", "arbitrum"]),
            Some(BridgeType::Hyperbridge),
        )
        .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, OutcomeStatus::Skipped);
        assert_eq!(outcomes[1].status, OutcomeStatus::Success);
        let calls = backend.auto_fix_calls.lock().expect("call log lock");
        assert_eq!(calls.as_slice(), &[RouteKey::new("base", "arbitrum")]);
    }

    #[test]
    fn scope_selects_routes_from_the_snapshot() {
        let mut broken = route("optimism", true);
        broken.adapter_registered = false;
        let current = snapshot(vec![route("bsc", true), broken]);

        assert_eq!(
            BulkScope::Source("base".to_string()).select(&current).len(),
            2
        );
        assert_eq!(
            BulkScope::SourceErrors("base".to_string()).select(&current),
            vec![RouteKey::new("base", "optimism")]
        );
        let filter = BulkScope::Filter(RouteFilter::default());
        assert_eq!(filter.source_chain_id(), "*");
        assert_eq!(filter.select(&current).len(), 2);
        let single = BulkScope::Route(RouteKey::new("base", "unknown"));
        assert_eq!(single.select(&current).len(), 1);
        assert_eq!(single.dest_chain_id().as_deref(), Some("unknown"));
    }
}
