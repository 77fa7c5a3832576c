//! # relaygate-engine
//!
//! Orchestration of route remediation over an abstract configuration
//! backend.
//!
//! This crate provides:
//! - `RouteBackend`: the async contract with the configuration backend
//! - `ManualProvisioningSession`: the four-step stepper as a pure value
//! - `bulk_auto_fix` / `bulk_recheck`: per-route-isolated batch primitives
//! - `WizardReport`: before/after counts of one bulk operation
//! - `ControlPlane`: owns the snapshot, session and last report and
//!   sequences every backend call
//! - `FixtureBackend`: deterministic in-memory backend for tests and demos
//!
//! ```text
//! ControlPlane ── refresh ──▶ RouteBackend::route_overview ──▶ SnapshotStore
//!      │
//!      ├── execute_step ──▶ session gate ──▶ one mutation ──▶ refresh
//!      │
//!      └── run_bulk ──▶ auto-fix batch ──▶ recheck batch ──▶ refresh ──▶ WizardReport
//! ```

pub mod backend;
pub mod config;
pub mod control;
pub mod error;
pub mod fixture;
pub mod reconcile;
pub mod report;
pub mod session;
pub mod state;

pub use backend::{
    AutoFixOutcome, AutoFixRequest, AutoFixStep, BackendError, Pagination, PreflightSnapshot,
    RecheckOutcome, RouteBackend, RoutePage, RouteQuery, TxBatch, TxReceipt,
};
pub use config::{ConfigError, ControlPlaneConfig, DEFAULT_PAGE_LIMIT};
pub use control::{ControlPlane, StepReport};
pub use error::EngineError;
pub use fixture::{
    BackendCall, FixtureBackend, FixtureDocument, FixtureOperation, FixtureRoute,
};
pub use reconcile::{
    BulkScope, OutcomeStatus, RecheckBatch, RouteOutcome, bulk_auto_fix, bulk_recheck,
};
pub use report::{ReportInput, WIZARD_REPORT_KIND, WizardAction, WizardReport};
pub use session::{
    ManualProvisioningSession, PerStep, SESSION_KIND, Selection, SessionDocument, SessionEvent,
    StepExecution, StepStatus,
};
pub use state::{StateError, read_json_file, write_json_file};
