//! Deterministic in-memory backend.
//!
//! Serves routes from a JSON fixture and simulates the effect of each
//! mutation on them. Transaction hashes come from a monotonically increasing
//! nonce. Failures can be injected per (operation, route) either from the
//! fixture (`failOn`) or at runtime, and every call is recorded so tests can
//! assert which requests were (or were not) made.

use crate::backend::{
    AutoFixOutcome, AutoFixRequest, AutoFixStep, BackendError, Pagination, PreflightSnapshot,
    RoutePage, RouteQuery, RouteBackend, TxBatch, TxReceipt,
};
use crate::session::StepStatus;
use crate::state::{StateError, read_json_file, write_json_file};
use async_trait::async_trait;
use relaygate_core::{BridgeType, PreflightRow, ProtocolConfig, Route, RouteKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixtureOperation {
    RouteOverview,
    Preflight,
    RegisterAdapter,
    SetDefaultBridge,
    SetProtocolConfig,
    Recheck,
    AutoFix,
}

impl FixtureOperation {
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::RegisterAdapter | Self::SetDefaultBridge | Self::SetProtocolConfig | Self::AutoFix
        )
    }
}

/// One recorded backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCall {
    pub operation: FixtureOperation,
    pub key: Option<RouteKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRoute {
    #[serde(flatten)]
    pub route: Route,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub fail_on: BTreeSet<FixtureOperation>,
}

impl From<Route> for FixtureRoute {
    fn from(route: Route) -> Self {
        Self {
            route,
            fail_on: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureDocument {
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub routes: Vec<FixtureRoute>,
}

#[derive(Debug, Default)]
struct FixtureState {
    nonce: u64,
    routes: BTreeMap<RouteKey, FixtureRoute>,
    calls: Vec<BackendCall>,
}

impl FixtureState {
    fn next_tx(&mut self) -> String {
        self.nonce += 1;
        format!("0x{:064x}", self.nonce)
    }

    fn record(&mut self, operation: FixtureOperation, key: Option<&RouteKey>) {
        self.calls.push(BackendCall {
            operation,
            key: key.cloned(),
        });
    }

    /// Record the call, then resolve the route unless a failure is injected.
    fn enter(
        &mut self,
        operation: FixtureOperation,
        key: &RouteKey,
    ) -> Result<&mut FixtureRoute, BackendError> {
        self.record(operation, Some(key));
        let entry = self
            .routes
            .get_mut(key)
            .ok_or_else(|| BackendError::RouteNotFound(key.clone()))?;
        if entry.fail_on.contains(&operation) {
            return Err(BackendError::Transport(format!(
                "injected {operation:?} failure for {key}"
            )));
        }
        Ok(entry)
    }
}

#[derive(Debug, Default)]
pub struct FixtureBackend {
    state: Mutex<FixtureState>,
}

impl FixtureBackend {
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        Self::from_document(FixtureDocument {
            nonce: 0,
            routes: routes.into_iter().map(FixtureRoute::from).collect(),
        })
    }

    pub fn from_document(document: FixtureDocument) -> Self {
        let routes = document
            .routes
            .into_iter()
            .map(|entry| (entry.route.key(), entry))
            .collect();
        Self {
            state: Mutex::new(FixtureState {
                nonce: document.nonce,
                routes,
                calls: Vec::new(),
            }),
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let document: Option<FixtureDocument> = read_json_file(path.as_ref())?;
        Ok(Self::from_document(document.unwrap_or_default()))
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        write_json_file(path.as_ref(), &self.document())
    }

    pub fn document(&self) -> FixtureDocument {
        let state = self.lock();
        FixtureDocument {
            nonce: state.nonce,
            routes: state.routes.values().cloned().collect(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every future `operation` on `key` fail with a transport error.
    pub fn fail_on(&self, key: &RouteKey, operation: FixtureOperation) {
        if let Some(entry) = self.lock().routes.get_mut(key) {
            entry.fail_on.insert(operation);
        }
    }

    pub fn clear_failures(&self, key: &RouteKey) {
        if let Some(entry) = self.lock().routes.get_mut(key) {
            entry.fail_on.clear();
        }
    }

    /// Mutate the backend-side route directly, outside the mutation API.
    pub fn edit_route(&self, key: &RouteKey, edit: impl FnOnce(&mut Route)) {
        if let Some(entry) = self.lock().routes.get_mut(key) {
            edit(&mut entry.route);
        }
    }

    pub fn route(&self, key: &RouteKey) -> Option<Route> {
        self.lock()
            .routes
            .get(key)
            .map(|entry| entry.route.clone().normalized())
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation.is_mutation())
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

fn applied(name: &str, tx_hash: String) -> AutoFixStep {
    AutoFixStep {
        name: name.to_string(),
        status: StepStatus::Success,
        message: None,
        tx_hash: Some(tx_hash),
    }
}

#[async_trait]
impl RouteBackend for FixtureBackend {
    async fn route_overview(&self, query: &RouteQuery) -> Result<RoutePage, BackendError> {
        let mut state = self.lock();
        state.record(FixtureOperation::RouteOverview, None);
        let matching: Vec<&FixtureRoute> = state
            .routes
            .values()
            .filter(|entry| {
                query
                    .source_chain_id
                    .as_deref()
                    .is_none_or(|source| entry.route.source_chain_id == source)
                    && query
                        .dest_chain_id
                        .as_deref()
                        .is_none_or(|dest| entry.route.dest_chain_id == dest)
            })
            .collect();
        if matching
            .iter()
            .any(|entry| entry.fail_on.contains(&FixtureOperation::RouteOverview))
        {
            return Err(BackendError::Transport(
                "injected route overview failure".to_string(),
            ));
        }

        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let skip = usize::try_from(u64::from(page - 1) * u64::from(limit)).unwrap_or(usize::MAX);
        let routes = matching
            .iter()
            .skip(skip)
            .take(limit as usize)
            .map(|entry| entry.route.clone())
            .collect();
        Ok(RoutePage {
            routes,
            pagination: Pagination {
                page,
                limit,
                total: matching.len() as u64,
            },
        })
    }

    async fn preflight(&self, key: &RouteKey) -> Result<PreflightSnapshot, BackendError> {
        let mut state = self.lock();
        let route = &state.enter(FixtureOperation::Preflight, key)?.route;
        Ok(PreflightSnapshot {
            default_bridge_type: route.default_bridge_type,
            bridges: BridgeType::ALL
                .into_iter()
                .map(|bridge| PreflightRow {
                    bridge_type: bridge.tag(),
                    checks: route.checks_for(bridge),
                })
                .collect(),
        })
    }

    async fn register_adapter(
        &self,
        key: &RouteKey,
        _bridge: BridgeType,
        _adapter_address: &str,
    ) -> Result<TxReceipt, BackendError> {
        let mut state = self.lock();
        state
            .enter(FixtureOperation::RegisterAdapter, key)?
            .route
            .adapter_registered = true;
        Ok(TxReceipt {
            tx_hash: state.next_tx(),
        })
    }

    async fn set_default_bridge(
        &self,
        key: &RouteKey,
        bridge: BridgeType,
    ) -> Result<TxReceipt, BackendError> {
        let mut state = self.lock();
        state
            .enter(FixtureOperation::SetDefaultBridge, key)?
            .route
            .default_bridge_type = bridge.tag();
        Ok(TxReceipt {
            tx_hash: state.next_tx(),
        })
    }

    async fn set_protocol_config(
        &self,
        key: &RouteKey,
        config: &ProtocolConfig,
    ) -> Result<TxBatch, BackendError> {
        let mut state = self.lock();
        let route = &mut state.enter(FixtureOperation::SetProtocolConfig, key)?.route;
        *route.protocol_configured.get_mut(config.bridge()) = true;
        // Endpoint-ID routing sets the peer and the enforced options separately.
        let tx_count = match config {
            ProtocolConfig::LayerZero(_) => 2,
            ProtocolConfig::Hyperbridge(_) | ProtocolConfig::Ccip(_) => 1,
        };
        let tx_hashes = (0..tx_count).map(|_| state.next_tx()).collect();
        Ok(TxBatch { tx_hashes })
    }

    async fn recheck_route(&self, key: &RouteKey) -> Result<Route, BackendError> {
        let mut state = self.lock();
        let entry = state.enter(FixtureOperation::Recheck, key)?;
        entry.route = entry.route.clone().normalized();
        Ok(entry.route.clone())
    }

    async fn auto_fix_route(
        &self,
        request: &AutoFixRequest,
    ) -> Result<AutoFixOutcome, BackendError> {
        let mut state = self.lock();
        let mut route = state.enter(FixtureOperation::AutoFix, &request.key)?.route.clone();
        let bridge = match request.bridge_type {
            Some(bridge) => bridge,
            None => route.default_bridge()?,
        };

        let mut steps = Vec::new();
        if !route.adapter_registered {
            route.adapter_registered = true;
            steps.push(applied("registerAdapter", state.next_tx()));
        }
        if route.default_bridge_type != bridge.tag() {
            route.default_bridge_type = bridge.tag();
            steps.push(applied("setDefaultBridge", state.next_tx()));
        }
        if !*route.protocol_configured.get(bridge) {
            *route.protocol_configured.get_mut(bridge) = true;
            steps.push(applied("setProtocolConfig", state.next_tx()));
        }
        if !route.fee_quote_healthy {
            steps.push(AutoFixStep {
                name: "verifyFeeQuote".to_string(),
                status: StepStatus::Failed,
                message: Some(format!("fee quote unavailable for {}", bridge.name())),
                tx_hash: None,
            });
        }

        if let Some(entry) = state.routes.get_mut(&request.key) {
            entry.route = route;
        }
        Ok(AutoFixOutcome {
            key: request.key.clone(),
            steps,
        })
    }
}
