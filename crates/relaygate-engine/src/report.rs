//! Wizard Report Builder.
//!
//! A report captures the measurable effect of one bulk operation: ready and
//! error counts over the operation's scope before and after it ran. Reports
//! are immutable once built and superseded by the next one.

use crate::reconcile::{BulkScope, OutcomeStatus, RouteOutcome};
use chrono::{DateTime, Utc};
use relaygate_core::RouteKey;
use relaygate_store::RouteSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const WIZARD_REPORT_KIND: &str = "relaygate.wizard_report.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardAction {
    Setup,
    AutoFixErrorOnly,
    Verify,
}

impl WizardAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "SETUP",
            Self::AutoFixErrorOnly => "AUTO_FIX_ERROR_ONLY",
            Self::Verify => "VERIFY",
        }
    }

    /// Whether the operation runs auto-fix before rechecking.
    pub fn mutates(self) -> bool {
        !matches!(self, Self::Verify)
    }
}

impl std::fmt::Display for WizardAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardReport {
    action: WizardAction,
    source_chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dest_chain_id: Option<String>,
    total_routes: usize,
    before_ready: usize,
    before_error: usize,
    after_ready: usize,
    after_error: usize,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    auto_fix: Vec<RouteOutcome>,
    #[serde(default)]
    recheck: Vec<RouteOutcome>,
}

/// Everything a report is built from.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub action: WizardAction,
    pub scope: &'a BulkScope,
    pub keys: &'a [RouteKey],
    pub before: &'a RouteSnapshot,
    pub after: &'a RouteSnapshot,
    pub auto_fix: Vec<RouteOutcome>,
    pub recheck: Vec<RouteOutcome>,
    pub now: DateTime<Utc>,
}

impl WizardReport {
    /// Both count pairs are taken over the same `keys`, so
    /// `after_ready + after_error <= total_routes`.
    pub fn build(input: ReportInput<'_>) -> Self {
        let before = input.before.counts(input.keys);
        let after = input.after.counts(input.keys);
        Self {
            action: input.action,
            source_chain_id: input.scope.source_chain_id(),
            dest_chain_id: input.scope.dest_chain_id(),
            total_routes: input.keys.len(),
            before_ready: before.ready,
            before_error: before.error,
            after_ready: after.ready,
            after_error: after.error,
            timestamp: input.now,
            auto_fix: input.auto_fix,
            recheck: input.recheck,
        }
    }

    pub fn action(&self) -> WizardAction {
        self.action
    }

    pub fn source_chain_id(&self) -> &str {
        &self.source_chain_id
    }

    pub fn dest_chain_id(&self) -> Option<&str> {
        self.dest_chain_id.as_deref()
    }

    pub fn total_routes(&self) -> usize {
        self.total_routes
    }

    pub fn before_ready(&self) -> usize {
        self.before_ready
    }

    pub fn before_error(&self) -> usize {
        self.before_error
    }

    pub fn after_ready(&self) -> usize {
        self.after_ready
    }

    pub fn after_error(&self) -> usize {
        self.after_error
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn auto_fix(&self) -> &[RouteOutcome] {
        &self.auto_fix
    }

    pub fn recheck(&self) -> &[RouteOutcome] {
        &self.recheck
    }

    /// Routes whose auto-fix or recheck failed.
    pub fn failures(&self) -> usize {
        self.auto_fix
            .iter()
            .chain(&self.recheck)
            .filter(|outcome| outcome.is_failure())
            .count()
    }

    /// The report as a JSON object tagged with [`WIZARD_REPORT_KIND`].
    pub fn to_json_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        tagged_document(WIZARD_REPORT_KIND, self)
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Route wizard report: {}", self.action);
        let _ = writeln!(out);
        let _ = writeln!(out, "- Source chain: `{}`", self.source_chain_id);
        if let Some(dest) = &self.dest_chain_id {
            let _ = writeln!(out, "- Destination chain: `{dest}`");
        }
        let _ = writeln!(out, "- Timestamp: {}", self.timestamp.to_rfc3339());
        let _ = writeln!(out, "- Routes in scope: {}", self.total_routes);
        let _ = writeln!(out);
        let _ = writeln!(out, "| | Ready | Error |");
        let _ = writeln!(out, "|---|---|---|");
        let _ = writeln!(out, "| Before | {} | {} |", self.before_ready, self.before_error);
        let _ = writeln!(out, "| After | {} | {} |", self.after_ready, self.after_error);
        render_outcomes(&mut out, "Auto-fix", &self.auto_fix);
        render_outcomes(&mut out, "Recheck", &self.recheck);
        out
    }
}

fn tagged_document(
    kind: &str,
    value: &impl Serialize,
) -> Result<serde_json::Value, serde_json::Error> {
    let fields = match serde_json::to_value(value)? {
        serde_json::Value::Object(fields) => fields,
        other => {
            return Err(serde::ser::Error::custom(format!(
                "{kind} document must be a JSON object, got {other}"
            )));
        }
    };
    let mut document = serde_json::Map::new();
    document.insert(
        "kind".to_string(),
        serde_json::Value::String(kind.to_string()),
    );
    document.extend(fields);
    Ok(serde_json::Value::Object(document))
}

fn render_outcomes(out: &mut String, title: &str, outcomes: &[RouteOutcome]) {
    if outcomes.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## {title}");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Route | Status | Message | Transactions |");
    let _ = writeln!(out, "|---|---|---|---|");
    for outcome in outcomes {
        let message = outcome
            .message
            .as_deref()
            .unwrap_or("")
            .replace('|', "\\|");
        let status = match outcome.status {
            OutcomeStatus::Failed => format!("**{}**", outcome.status.as_str()),
            other => other.as_str().to_string(),
        };
        let _ = writeln!(
            out,
            "| {} | {status} | {message} | {} |",
            outcome.key,
            outcome.tx_hashes.join(", ")
        );
    }
}
