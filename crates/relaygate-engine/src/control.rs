//! Orchestrating control plane.
//!
//! Owns the route snapshot, the active manual session and the last wizard
//! report, and sequences backend calls for both the manual stepper and the
//! bulk operations. One operation runs at a time; shared state is swapped
//! wholesale and never held across a backend call.

use crate::backend::{BackendError, RouteBackend, RouteQuery};
use crate::config::DEFAULT_PAGE_LIMIT;
use crate::error::EngineError;
use crate::reconcile::{BulkScope, RouteOutcome, bulk_auto_fix, bulk_recheck};
use crate::report::{ReportInput, WizardAction, WizardReport};
use crate::session::{ManualProvisioningSession, Selection, SessionEvent, StepStatus};
use chrono::Utc;
use relaygate_core::{
    BridgeType, ChainDirectory, PreflightChecks, PreflightReport, ProvisioningStep,
    RecommendedAction, Route, RouteKey, RouteStatus, derive_protocol_config, recommend,
};
use relaygate_store::{RouteFilter, RouteSnapshot, SnapshotStore};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of one manual step dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: ProvisioningStep,
    pub key: RouteKey,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub tx_hashes: Vec<String>,
    pub session: ManualProvisioningSession,
}

#[derive(Debug, Default)]
struct PlaneState {
    store: SnapshotStore,
    session: ManualProvisioningSession,
    last_report: Option<Arc<WizardReport>>,
}

/// Clears the in-flight flag when the operation ends, however it ends.
struct PendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, EngineError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::OperationInFlight)?;
        Ok(Self { flag })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct ControlPlane<B> {
    backend: B,
    directory: ChainDirectory,
    page_limit: u32,
    pending: AtomicBool,
    state: Mutex<PlaneState>,
}

impl<B: RouteBackend> ControlPlane<B> {
    pub fn new(backend: B, directory: ChainDirectory) -> Self {
        Self {
            backend,
            directory,
            page_limit: DEFAULT_PAGE_LIMIT,
            pending: AtomicBool::new(false),
            state: Mutex::new(PlaneState::default()),
        }
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    /// Seed the store with a cached snapshot.
    pub fn with_snapshot(self, snapshot: RouteSnapshot) -> Self {
        self.lock().store.replace(snapshot);
        self
    }

    pub fn with_session(self, session: ManualProvisioningSession) -> Self {
        self.lock().session = session;
        self
    }

    pub fn with_last_report(self, report: WizardReport) -> Self {
        self.lock().last_report = Some(Arc::new(report));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn directory(&self) -> &ChainDirectory {
        &self.directory
    }

    fn lock(&self) -> MutexGuard<'_, PlaneState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Arc<RouteSnapshot> {
        self.lock().store.current()
    }

    pub fn session(&self) -> ManualProvisioningSession {
        self.lock().session.clone()
    }

    pub fn last_report(&self) -> Option<Arc<WizardReport>> {
        self.lock().last_report.clone()
    }

    pub fn recommendation(&self, checks: &PreflightChecks) -> RecommendedAction {
        recommend(checks)
    }

    /// Recommendation for a route's default bridge in the current snapshot.
    pub fn recommend_for(&self, key: &RouteKey) -> Option<RecommendedAction> {
        self.snapshot()
            .route(key)
            .and_then(Route::default_checks)
            .map(|checks| recommend(&checks))
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    /// Fetch every overview page and replace the snapshot wholesale.
    pub async fn refresh(&self) -> Result<Arc<RouteSnapshot>, EngineError> {
        let _guard = PendingGuard::acquire(&self.pending)?;
        self.refresh_inner().await
    }

    async fn refresh_inner(&self) -> Result<Arc<RouteSnapshot>, EngineError> {
        let snapshot = self.fetch_all().await?;
        tracing::debug!(routes = snapshot.len(), "Route snapshot refreshed");
        Ok(self.install(snapshot))
    }

    async fn fetch_all(&self) -> Result<RouteSnapshot, BackendError> {
        let mut routes = Vec::new();
        let mut page = 1;
        loop {
            let result = self
                .backend
                .route_overview(&RouteQuery::page(page, self.page_limit))
                .await?;
            let received = result.routes.len();
            routes.extend(result.routes);
            if received == 0 || !result.pagination.has_more() {
                break;
            }
            page += 1;
        }
        Ok(RouteSnapshot::from_routes(routes, Utc::now()))
    }

    fn install(&self, snapshot: RouteSnapshot) -> Arc<RouteSnapshot> {
        let mut state = self.lock();
        state.store.replace(snapshot);
        state.store.current()
    }

    /// Replace the snapshot with the current one plus `routes` overlaid.
    fn overlay(&self, routes: Vec<Route>) -> Arc<RouteSnapshot> {
        let current = self.snapshot();
        let mut merged: Vec<Route> = current.routes().cloned().collect();
        merged.extend(routes);
        self.install(RouteSnapshot::from_routes(merged, Utc::now()))
    }

    /// Refresh after a successful mutation. A failed refresh leaves the
    /// stale snapshot in place; the mutation itself already succeeded.
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh_inner().await {
            tracing::warn!(error = %err, "Refresh after mutation failed; snapshot is stale");
        }
    }

    pub async fn preflight(&self, key: &RouteKey) -> Result<PreflightReport, EngineError> {
        let snapshot = self.backend.preflight(key).await?;
        Ok(snapshot.evaluate(key.clone())?)
    }

    // ------------------------------------------------------------------
    // Manual stepper
    // ------------------------------------------------------------------

    fn apply(&self, event: SessionEvent) -> Result<ManualProvisioningSession, EngineError> {
        let _guard = PendingGuard::acquire(&self.pending)?;
        let mut state = self.lock();
        let next = state.session.clone().apply(event)?;
        state.session = next.clone();
        Ok(next)
    }

    pub fn select_source(
        &self,
        source_chain_id: impl Into<String>,
    ) -> Result<ManualProvisioningSession, EngineError> {
        self.apply(SessionEvent::SelectSource(source_chain_id.into()))
    }

    pub fn select_destination(
        &self,
        dest_chain_id: impl Into<String>,
    ) -> Result<ManualProvisioningSession, EngineError> {
        self.apply(SessionEvent::SelectDestination(dest_chain_id.into()))
    }

    pub fn select_bridge(
        &self,
        bridge: BridgeType,
    ) -> Result<ManualProvisioningSession, EngineError> {
        self.apply(SessionEvent::SelectBridge(bridge))
    }

    pub fn reset_session(&self) -> Result<ManualProvisioningSession, EngineError> {
        self.apply(SessionEvent::Reset)
    }

    /// Dispatch one manual step against the selected route.
    ///
    /// Gating and payload derivation happen before any backend call. A
    /// failed mutation is recorded in the session and returned as an error;
    /// a verify that finds the route not ready is recorded as `FAILED` and
    /// returned as a report.
    pub async fn execute_step(&self, step: ProvisioningStep) -> Result<StepReport, EngineError> {
        let _guard = PendingGuard::acquire(&self.pending)?;
        let session = self.session();
        let key = session.check_dispatch(step)?;
        let bridge = session.bridge();
        let dispatched = session.selection;
        tracing::info!(
            %key,
            step = step.number(),
            bridge = bridge.name(),
            "Dispatching manual step"
        );

        let result = match step {
            ProvisioningStep::Verify => return self.verify_step(key, &dispatched).await,
            ProvisioningStep::RegisterAdapter => self.register_adapter(&key, bridge).await,
            ProvisioningStep::SetDefaultBridge => self
                .backend
                .set_default_bridge(&key, bridge)
                .await
                .map(|receipt| vec![receipt.tx_hash])
                .map_err(EngineError::from),
            ProvisioningStep::ConfigureProtocol => self.configure_protocol(&key, bridge).await,
        };

        match result {
            Ok(tx_hashes) => {
                let session = self.record(
                    &dispatched,
                    SessionEvent::StepSucceeded {
                        step,
                        tx_hashes: tx_hashes.clone(),
                        message: None,
                    },
                )?;
                self.refresh_after_mutation().await;
                Ok(StepReport {
                    step,
                    key,
                    status: StepStatus::Success,
                    message: None,
                    tx_hashes,
                    session,
                })
            }
            Err(err) => {
                tracing::warn!(
                    %key,
                    step = step.number(),
                    code = err.code().as_str(),
                    error = %err,
                    "Manual step failed"
                );
                self.record(
                    &dispatched,
                    SessionEvent::StepFailed {
                        step,
                        message: err.to_string(),
                    },
                )?;
                Err(err)
            }
        }
    }

    async fn register_adapter(
        &self,
        key: &RouteKey,
        bridge: BridgeType,
    ) -> Result<Vec<String>, EngineError> {
        let adapter = self.directory.adapter_address(&key.source_chain_id, bridge)?;
        let receipt = self.backend.register_adapter(key, bridge, &adapter).await?;
        Ok(vec![receipt.tx_hash])
    }

    async fn configure_protocol(
        &self,
        key: &RouteKey,
        bridge: BridgeType,
    ) -> Result<Vec<String>, EngineError> {
        let config = derive_protocol_config(&self.directory, &key.dest_chain_id, bridge)?;
        let batch = self.backend.set_protocol_config(key, &config).await?;
        Ok(batch.tx_hashes)
    }

    async fn verify_step(
        &self,
        key: RouteKey,
        dispatched: &Selection,
    ) -> Result<StepReport, EngineError> {
        let step = ProvisioningStep::Verify;
        let mut batch = bulk_recheck(&self.backend, std::slice::from_ref(&key)).await;
        let outcome = batch.outcomes.pop();
        let route = batch.routes.pop();

        let verdict = match (route, outcome) {
            (Some(route), _) => {
                let ready = route.overall_status == RouteStatus::Ready;
                let message = (!ready).then(|| not_ready_message(&route));
                self.overlay(vec![route]);
                Ok(message)
            }
            (None, Some(RouteOutcome { message, .. })) => {
                Err(message.unwrap_or_else(|| "recheck failed".to_string()))
            }
            (None, None) => Err("recheck returned no result".to_string()),
        };

        match verdict {
            Ok(None) => {
                let session = self.record(
                    dispatched,
                    SessionEvent::StepSucceeded {
                        step,
                        tx_hashes: Vec::new(),
                        message: Some("route is READY".to_string()),
                    },
                )?;
                Ok(StepReport {
                    step,
                    key,
                    status: StepStatus::Success,
                    message: Some("route is READY".to_string()),
                    tx_hashes: Vec::new(),
                    session,
                })
            }
            Ok(Some(message)) => {
                tracing::info!(%key, %message, "Route not ready after verify");
                let session = self.record(
                    dispatched,
                    SessionEvent::StepFailed {
                        step,
                        message: message.clone(),
                    },
                )?;
                Ok(StepReport {
                    step,
                    key,
                    status: StepStatus::Failed,
                    message: Some(message),
                    tx_hashes: Vec::new(),
                    session,
                })
            }
            Err(message) => {
                self.record(
                    dispatched,
                    SessionEvent::StepFailed {
                        step,
                        message: message.clone(),
                    },
                )?;
                Err(BackendError::Transport(message).into())
            }
        }
    }

    /// Record a step outcome against the selection it was dispatched for.
    /// If the selection has since changed, the outcome is dropped.
    fn record(
        &self,
        dispatched: &Selection,
        event: SessionEvent,
    ) -> Result<ManualProvisioningSession, EngineError> {
        let mut state = self.lock();
        if state.session.selection != *dispatched {
            tracing::warn!(
                ?event,
                "Selection changed during dispatch; step outcome not recorded"
            );
            return Ok(state.session.clone());
        }
        let next = state.session.clone().apply(event)?;
        state.session = next.clone();
        Ok(next)
    }

    // ------------------------------------------------------------------
    // Bulk operations
    // ------------------------------------------------------------------

    /// Auto-fix then recheck every route from `source`.
    pub async fn setup_selected_source(
        &self,
        source_chain_id: &str,
    ) -> Result<Arc<WizardReport>, EngineError> {
        self.run_bulk(WizardAction::Setup, BulkScope::Source(source_chain_id.to_string()))
            .await
    }

    /// Auto-fix then recheck the routes from `source` currently in `ERROR`.
    pub async fn auto_fix_error_only(
        &self,
        source_chain_id: &str,
    ) -> Result<Arc<WizardReport>, EngineError> {
        self.run_bulk(
            WizardAction::AutoFixErrorOnly,
            BulkScope::SourceErrors(source_chain_id.to_string()),
        )
        .await
    }

    /// Recheck only. Narrowed to the session's destination when the manual
    /// session has reached the verify step on the same source.
    pub async fn verify_selected_source(
        &self,
        source_chain_id: &str,
    ) -> Result<Arc<WizardReport>, EngineError> {
        let session = self.session();
        let scope = match session.route_key() {
            Some(key) if session.reached_verify() && key.source_chain_id == source_chain_id => {
                BulkScope::Route(key)
            }
            _ => BulkScope::Source(source_chain_id.to_string()),
        };
        self.run_bulk(WizardAction::Verify, scope).await
    }

    /// Run `action` over the routes `filter` currently shows.
    pub async fn reconcile_filtered(
        &self,
        filter: RouteFilter,
        action: WizardAction,
    ) -> Result<Arc<WizardReport>, EngineError> {
        let filter = match action {
            WizardAction::AutoFixErrorOnly => RouteFilter {
                status: Some(RouteStatus::Error),
                ..filter
            },
            WizardAction::Setup | WizardAction::Verify => filter,
        };
        self.run_bulk(action, BulkScope::Filter(filter)).await
    }

    async fn run_bulk(
        &self,
        action: WizardAction,
        scope: BulkScope,
    ) -> Result<Arc<WizardReport>, EngineError> {
        let _guard = PendingGuard::acquire(&self.pending)?;
        let before = self.snapshot();
        let keys = scope.select(&before);
        tracing::info!(
            action = action.as_str(),
            source = %scope.source_chain_id(),
            routes = keys.len(),
            "Starting bulk operation"
        );

        let auto_fix = if action.mutates() {
            bulk_auto_fix(&self.backend, &before, &keys, None).await
        } else {
            Vec::new()
        };
        let recheck = bulk_recheck(&self.backend, &keys).await;

        let after = match self.refresh_inner().await {
            Ok(after) => after,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Refresh after recheck failed; overlaying recheck results"
                );
                self.overlay(recheck.routes.clone())
            }
        };

        let report = WizardReport::build(ReportInput {
            action,
            scope: &scope,
            keys: &keys,
            before: &before,
            after: &after,
            auto_fix,
            recheck: recheck.outcomes,
            now: Utc::now(),
        });
        tracing::info!(
            action = action.as_str(),
            before_ready = report.before_ready(),
            after_ready = report.after_ready(),
            failures = report.failures(),
            "Bulk operation finished"
        );
        let report = Arc::new(report);
        self.lock().last_report = Some(Arc::clone(&report));
        Ok(report)
    }
}

fn not_ready_message(route: &Route) -> String {
    if !route.issues.is_empty() {
        return route
            .issues
            .iter()
            .map(|issue| issue.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
    }
    route
        .default_bridge()
        .ok()
        .and_then(|bridge| route.preflight(bridge).error_message)
        .unwrap_or_else(|| format!("route is {}", route.overall_status.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureBackend, FixtureOperation};
    use relaygate_core::{ChainMetadata, ErrorCode, PerBridge, RouteIssue};

    fn route(dest: &str) -> Route {
        Route {
            source_chain_id: "base".to_string(),
            dest_chain_id: dest.to_string(),
            default_bridge_type: BridgeType::Ccip.tag(),
            adapter_registered: false,
            protocol_configured: PerBridge::default(),
            fee_quote_healthy: true,
            issues: Vec::new(),
            overall_status: RouteStatus::Unknown,
        }
    }

    fn directory() -> ChainDirectory {
        let mut directory = ChainDirectory::default();
        directory.insert(ChainMetadata {
            chain_id: "base".to_string(),
            caip2: Some("eip155:8453".to_string()),
            adapters: PerBridge {
                ccip: Some("0x1111111111111111111111111111111111111111".to_string()),
                ..PerBridge::default()
            },
            ..ChainMetadata::default()
        });
        directory.insert(ChainMetadata {
            chain_id: "bsc".to_string(),
            caip2: Some("eip155:56".to_string()),
            ccip_chain_selector: Some(11_344_663_589_394_136_015),
            adapters: PerBridge {
                ccip: Some("0x2222222222222222222222222222222222222222".to_string()),
                ..PerBridge::default()
            },
            ..ChainMetadata::default()
        });
        directory
    }

    fn plane(routes: Vec<Route>) -> ControlPlane<FixtureBackend> {
        ControlPlane::new(FixtureBackend::new(routes), directory())
    }

    fn select(plane: &ControlPlane<FixtureBackend>, dest: &str, bridge: BridgeType) {
        plane.select_source("base").expect("select source");
        plane.select_destination(dest).expect("select destination");
        plane.select_bridge(bridge).expect("select bridge");
    }

    #[tokio::test]
    async fn operations_are_rejected_while_one_is_in_flight() {
        let plane = plane(vec![route("bsc")]);
        select(&plane, "bsc", BridgeType::Ccip);

        let guard = PendingGuard::acquire(&plane.pending).expect("first acquire");
        assert!(plane.is_pending());
        let err = plane
            .execute_step(ProvisioningStep::RegisterAdapter)
            .await
            .expect_err("second operation must be rejected");
        assert_eq!(err.code(), ErrorCode::OperationInFlight);
        assert!(matches!(
            plane.setup_selected_source("base").await,
            Err(EngineError::OperationInFlight)
        ));
        assert!(matches!(
            plane.select_bridge(BridgeType::Hyperbridge),
            Err(EngineError::OperationInFlight)
        ));
        drop(guard);

        assert!(!plane.is_pending());
        assert!(plane.backend().calls().is_empty());
        plane
            .execute_step(ProvisioningStep::RegisterAdapter)
            .await
            .expect("runs once the flag clears");
    }

    #[test]
    fn selection_change_takes_the_in_flight_flag() {
        let plane = plane(vec![route("bsc")]);
        select(&plane, "bsc", BridgeType::Ccip);
        assert!(!plane.is_pending());

        let guard = PendingGuard::acquire(&plane.pending).expect("hold flag");
        assert!(matches!(
            plane.select_destination("arbitrum"),
            Err(EngineError::OperationInFlight)
        ));
        assert!(matches!(
            plane.reset_session(),
            Err(EngineError::OperationInFlight)
        ));
        drop(guard);
        assert_eq!(
            plane.session().route_key(),
            Some(RouteKey::new("base", "bsc"))
        );
    }

    #[test]
    fn outcome_for_a_stale_selection_is_not_credited() {
        let plane = plane(vec![route("bsc")]);
        select(&plane, "bsc", BridgeType::Ccip);
        let dispatched = plane.session().selection;
        plane
            .select_bridge(BridgeType::LayerZero)
            .expect("reselect bridge");

        let session = plane
            .record(
                &dispatched,
                SessionEvent::StepSucceeded {
                    step: ProvisioningStep::RegisterAdapter,
                    tx_hashes: vec!["0x01".to_string()],
                    message: None,
                },
            )
            .expect("stale outcome is dropped, not an error");
        assert_eq!(session.bridge(), BridgeType::LayerZero);
        assert!(!session.is_completed(ProvisioningStep::RegisterAdapter));
        assert_eq!(session.current_step, ProvisioningStep::RegisterAdapter);
        assert_eq!(plane.session(), session);
    }

    #[tokio::test]
    async fn gated_step_makes_no_backend_call() {
        let plane = plane(vec![route("bsc")]);
        select(&plane, "bsc", BridgeType::Ccip);

        let err = plane
            .execute_step(ProvisioningStep::ConfigureProtocol)
            .await
            .expect_err("step 3 is gated");
        assert_eq!(err.code(), ErrorCode::StepGated);
        assert!(plane.backend().calls().is_empty());
        assert_eq!(
            plane
                .session()
                .execution_of(ProvisioningStep::ConfigureProtocol)
                .status,
            StepStatus::Pending
        );
    }

    #[tokio::test]
    async fn missing_adapter_address_fails_before_any_call() {
        let plane = plane(vec![route("bsc")]);
        select(&plane, "bsc", BridgeType::LayerZero);

        let err = plane
            .execute_step(ProvisioningStep::RegisterAdapter)
            .await
            .expect_err("no layer zero adapter configured");
        assert_eq!(err.code(), ErrorCode::MissingRequiredField);
        assert!(plane.backend().calls().is_empty());
        let execution = plane
            .session()
            .execution_of(ProvisioningStep::RegisterAdapter)
            .clone();
        assert_eq!(execution.status, StepStatus::Failed);
        assert!(
            execution
                .message
                .as_deref()
                .is_some_and(|message| message.contains("adapterAddress"))
        );
    }

    #[tokio::test]
    async fn transport_failure_keeps_current_step_and_route() {
        let plane = plane(vec![route("bsc")]);
        select(&plane, "bsc", BridgeType::Ccip);
        let key = RouteKey::new("base", "bsc");
        plane
            .backend()
            .fail_on(&key, FixtureOperation::RegisterAdapter);

        let err = plane
            .execute_step(ProvisioningStep::RegisterAdapter)
            .await
            .expect_err("injected failure");
        assert_eq!(err.code(), ErrorCode::TransportFailure);
        let session = plane.session();
        assert_eq!(session.current_step, ProvisioningStep::RegisterAdapter);
        assert!(!session.is_completed(ProvisioningStep::RegisterAdapter));
        assert_eq!(plane.backend().mutation_count(), 1);
        assert!(
            !plane
                .backend()
                .route(&key)
                .expect("route")
                .adapter_registered
        );
    }

    #[tokio::test]
    async fn verify_reports_issue_messages_when_not_ready() {
        let mut blocked = route("bsc");
        blocked.adapter_registered = true;
        blocked.protocol_configured.ccip = true;
        blocked
            .issues
            .push(RouteIssue::new("LIQUIDITY", "relayer balance below threshold"));
        let plane = plane(vec![blocked]);
        select(&plane, "bsc", BridgeType::Ccip);
        for step in [
            ProvisioningStep::RegisterAdapter,
            ProvisioningStep::SetDefaultBridge,
            ProvisioningStep::ConfigureProtocol,
        ] {
            plane.execute_step(step).await.expect("step succeeds");
        }

        let report = plane
            .execute_step(ProvisioningStep::Verify)
            .await
            .expect("verify returns a report");
        assert_eq!(report.status, StepStatus::Failed);
        assert_eq!(
            report.message.as_deref(),
            Some("relayer balance below threshold")
        );
        assert!(!report.session.is_completed(ProvisioningStep::Verify));
        assert_eq!(report.session.current_step, ProvisioningStep::Verify);
    }

    #[tokio::test]
    async fn verify_narrows_to_session_route_at_step_four() {
        let mut ready = route("bsc");
        ready.adapter_registered = true;
        ready.protocol_configured.ccip = true;
        let plane = plane(vec![ready, route("arbitrum")]);
        plane.refresh().await.expect("refresh");
        select(&plane, "bsc", BridgeType::Ccip);

        let wide = plane
            .verify_selected_source("base")
            .await
            .expect("verify source");
        assert_eq!(wide.total_routes(), 2);
        assert!(wide.dest_chain_id().is_none());

        for step in [
            ProvisioningStep::RegisterAdapter,
            ProvisioningStep::SetDefaultBridge,
            ProvisioningStep::ConfigureProtocol,
        ] {
            plane.execute_step(step).await.expect("step succeeds");
        }
        let narrow = plane
            .verify_selected_source("base")
            .await
            .expect("verify narrowed");
        assert_eq!(narrow.total_routes(), 1);
        assert_eq!(narrow.dest_chain_id(), Some("bsc"));
        assert_eq!(narrow.after_ready(), 1);
        assert!(Arc::ptr_eq(
            &plane.last_report().expect("report stored"),
            &narrow
        ));
    }
}
