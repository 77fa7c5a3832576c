//! # relaygate core
//!
//! Pure model of cross-chain route health: which routes exist, whether each
//! (route, bridge) pair is usable, what to do next when it is not, and how to
//! encode a protocol's configuration payload.
//!
//! No I/O lives here. Storage, the configuration backend, and orchestration
//! are adapter concerns (`relaygate-store`, `relaygate-engine`).
//!
//! ## Derivation chain
//!
//! ```text
//! Route                 ← raw health fields from the backend
//!     │
//! PreflightChecks       ← adapter / route config / fee quote, per bridge
//!     │
//! BridgePreflightResult ← ready = a && r && f (single definition)
//!     │
//! RecommendedAction     ← first unmet dependency wins
//!     │
//! ProvisioningStep      ← manual step that addresses it
//! ```

pub mod bridge;
pub mod chain;
pub mod error;
pub mod preflight;
pub mod protocol;
pub mod recommend;
pub mod route;
pub mod step;

pub use bridge::{BridgeType, PerBridge};
pub use chain::{ChainDirectory, ChainMetadata};
pub use error::{ErrorCode, RouteError};
pub use preflight::{BridgePreflightResult, PreflightChecks, PreflightReport, PreflightRow};
pub use protocol::{
    CcipConfig, HyperbridgeConfig, LAYER_ZERO_NO_OPTIONS, LayerZeroConfig, ProtocolConfig,
    derive_protocol_config, pad_address_32, state_machine_id, state_machine_reference,
    unpad_address_32,
};
pub use recommend::{RecommendedAction, recommend};
pub use route::{Route, RouteIssue, RouteKey, RouteStatus};
pub use step::ProvisioningStep;
