//! Manual provisioning session.
//!
//! Guided remediation of one (source, destination, bridge) triple as an
//! explicit value. Transitions are pure: `session.apply(event)` returns the
//! next session or an error, and never touches the backend.
//!
//! Invariants:
//! - `current_step` moves to `n + 1` only once step `n` is completed.
//! - completion flags are only ever set, except by a reset.
//! - changing any selector resets the whole session to step 1.

use crate::error::EngineError;
use relaygate_core::{BridgeType, ProvisioningStep, RouteKey};
use serde::{Deserialize, Serialize};

pub const SESSION_KIND: &str = "relaygate.manual_session.v1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

/// One value per provisioning step, serialized as `step1`..`step4`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerStep<T> {
    pub step1: T,
    pub step2: T,
    pub step3: T,
    pub step4: T,
}

impl<T> PerStep<T> {
    pub fn get(&self, step: ProvisioningStep) -> &T {
        match step {
            ProvisioningStep::RegisterAdapter => &self.step1,
            ProvisioningStep::SetDefaultBridge => &self.step2,
            ProvisioningStep::ConfigureProtocol => &self.step3,
            ProvisioningStep::Verify => &self.step4,
        }
    }

    pub fn get_mut(&mut self, step: ProvisioningStep) -> &mut T {
        match step {
            ProvisioningStep::RegisterAdapter => &mut self.step1,
            ProvisioningStep::SetDefaultBridge => &mut self.step2,
            ProvisioningStep::ConfigureProtocol => &mut self.step3,
            ProvisioningStep::Verify => &mut self.step4,
        }
    }
}

/// Recorded outcome of the last attempt at one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepExecution {
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub tx_hashes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_chain_id: Option<String>,
    pub bridge_type: BridgeType,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            source_chain_id: None,
            dest_chain_id: None,
            bridge_type: BridgeType::Hyperbridge,
        }
    }
}

/// Inputs that drive the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SelectSource(String),
    SelectDestination(String),
    SelectBridge(BridgeType),
    StepSucceeded {
        step: ProvisioningStep,
        tx_hashes: Vec<String>,
        message: Option<String>,
    },
    StepFailed {
        step: ProvisioningStep,
        message: String,
    },
    Reset,
}

/// Persisted form of a session, tagged with [`SESSION_KIND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub kind: String,
    pub session: ManualProvisioningSession,
}

impl SessionDocument {
    pub fn new(session: ManualProvisioningSession) -> Self {
        Self {
            kind: SESSION_KIND.to_string(),
            session,
        }
    }

    pub fn into_session(self) -> Result<ManualProvisioningSession, String> {
        if self.kind != SESSION_KIND {
            return Err(format!(
                "unsupported session kind `{}` (expected {SESSION_KIND})",
                self.kind
            ));
        }
        self.session.check_progress()?;
        Ok(self.session)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualProvisioningSession {
    pub selection: Selection,
    pub current_step: ProvisioningStep,
    pub step_completed: PerStep<bool>,
    pub execution: PerStep<StepExecution>,
}

impl Default for ManualProvisioningSession {
    fn default() -> Self {
        Self::with_selection(Selection::default())
    }
}

impl ManualProvisioningSession {
    fn with_selection(selection: Selection) -> Self {
        Self {
            selection,
            current_step: ProvisioningStep::RegisterAdapter,
            step_completed: PerStep::default(),
            execution: PerStep::default(),
        }
    }

    /// Fresh session already pointed at one route and bridge.
    pub fn for_route(key: &RouteKey, bridge: BridgeType) -> Self {
        Self::with_selection(Selection {
            source_chain_id: Some(key.source_chain_id.clone()),
            dest_chain_id: Some(key.dest_chain_id.clone()),
            bridge_type: bridge,
        })
    }

    pub fn bridge(&self) -> BridgeType {
        self.selection.bridge_type
    }

    pub fn route_key(&self) -> Option<RouteKey> {
        match (&self.selection.source_chain_id, &self.selection.dest_chain_id) {
            (Some(source), Some(dest)) => Some(RouteKey::new(source, dest)),
            _ => None,
        }
    }

    pub fn is_completed(&self, step: ProvisioningStep) -> bool {
        *self.step_completed.get(step)
    }

    pub fn execution_of(&self, step: ProvisioningStep) -> &StepExecution {
        self.execution.get(step)
    }

    /// Completed steps must form a prefix of the step order, and the current
    /// step may not run ahead of the first incomplete one.
    fn check_progress(&self) -> Result<(), String> {
        let first_incomplete = ProvisioningStep::ALL
            .into_iter()
            .find(|step| !self.is_completed(*step));
        if let Some(gap) = first_incomplete
            && let Some(stray) = ProvisioningStep::ALL
                .into_iter()
                .find(|step| *step > gap && self.is_completed(*step))
        {
            return Err(format!("session marks {stray} completed but {gap} is not"));
        }
        let frontier = first_incomplete.unwrap_or(ProvisioningStep::Verify);
        if self.current_step > frontier {
            return Err(format!(
                "session current step {} is ahead of {frontier}",
                self.current_step
            ));
        }
        Ok(())
    }

    pub fn reached_verify(&self) -> bool {
        self.current_step == ProvisioningStep::Verify
    }

    /// Whether `step` may be dispatched now. Returns the target route.
    ///
    /// This is checked before any backend call.
    pub fn check_dispatch(&self, step: ProvisioningStep) -> Result<RouteKey, EngineError> {
        let key = self.require_route()?;
        if let Some(requires) = step.previous()
            && !self.is_completed(requires)
        {
            return Err(EngineError::StepGated { step, requires });
        }
        Ok(key)
    }

    fn require_route(&self) -> Result<RouteKey, EngineError> {
        if self.selection.source_chain_id.is_none() {
            return Err(EngineError::SelectionIncomplete {
                missing: "source chain",
            });
        }
        self.route_key()
            .ok_or(EngineError::SelectionIncomplete {
                missing: "destination chain",
            })
    }

    pub fn apply(self, event: SessionEvent) -> Result<Self, EngineError> {
        match event {
            SessionEvent::SelectSource(source) => {
                Ok(self.reselect(|selection| selection.source_chain_id = Some(source)))
            }
            SessionEvent::SelectDestination(dest) => {
                Ok(self.reselect(|selection| selection.dest_chain_id = Some(dest)))
            }
            SessionEvent::SelectBridge(bridge) => {
                Ok(self.reselect(|selection| selection.bridge_type = bridge))
            }
            SessionEvent::Reset => Ok(Self::with_selection(self.selection)),
            SessionEvent::StepSucceeded {
                step,
                tx_hashes,
                message,
            } => {
                self.check_dispatch(step)?;
                let mut next = self;
                *next.step_completed.get_mut(step) = true;
                *next.execution.get_mut(step) = StepExecution {
                    status: StepStatus::Success,
                    message,
                    tx_hashes,
                };
                let advanced = step.next().unwrap_or(step);
                if advanced > next.current_step {
                    next.current_step = advanced;
                }
                Ok(next)
            }
            SessionEvent::StepFailed { step, message } => {
                self.check_dispatch(step)?;
                let mut next = self;
                *next.execution.get_mut(step) = StepExecution {
                    status: StepStatus::Failed,
                    message: Some(message),
                    tx_hashes: Vec::new(),
                };
                Ok(next)
            }
        }
    }

    // Every step is parameterized by the selected triple, so any change
    // invalidates all of them.
    fn reselect(self, change: impl FnOnce(&mut Selection)) -> Self {
        let mut selection = self.selection.clone();
        change(&mut selection);
        if selection == self.selection {
            self
        } else {
            Self::with_selection(selection)
        }
    }
}
