//! Bridge protocol families.
//!
//! The set is closed: every protocol carries its own configuration payload
//! (see [`crate::protocol::ProtocolConfig`]), so adding one is a compile-time
//! change rather than a new numeric branch.

use crate::error::RouteError;
use serde::{Deserialize, Serialize};

/// Message-passing protocol family used to relay a route.
///
/// On the wire a bridge is its small integer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BridgeType {
    /// Message routing by chain-identifier string.
    Hyperbridge,
    /// Selector routing.
    Ccip,
    /// Endpoint-ID routing.
    LayerZero,
}

impl BridgeType {
    pub const ALL: [BridgeType; 3] = [Self::Hyperbridge, Self::Ccip, Self::LayerZero];

    pub fn tag(self) -> u8 {
        match self {
            Self::Hyperbridge => 0,
            Self::Ccip => 1,
            Self::LayerZero => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, RouteError> {
        match tag {
            0 => Ok(Self::Hyperbridge),
            1 => Ok(Self::Ccip),
            2 => Ok(Self::LayerZero),
            other => Err(RouteError::UnknownBridgeType(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hyperbridge => "Hyperbridge",
            Self::Ccip => "CCIP",
            Self::LayerZero => "LayerZero",
        }
    }
}

impl TryFrom<u8> for BridgeType {
    type Error = RouteError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::from_tag(tag)
    }
}

impl From<BridgeType> for u8 {
    fn from(bridge: BridgeType) -> Self {
        bridge.tag()
    }
}

impl std::fmt::Display for BridgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BridgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "0" | "hyperbridge" => Ok(Self::Hyperbridge),
            "1" | "ccip" => Ok(Self::Ccip),
            "2" | "layerzero" | "layer_zero" | "lz" => Ok(Self::LayerZero),
            _ => Err(format!(
                "unknown bridge type `{s}`; expected hyperbridge, ccip, layerzero or 0-2"
            )),
        }
    }
}

/// One value per protocol family.
///
/// Used wherever state is tracked per bridge (configured flags, adapter
/// addresses) instead of a map keyed by numeric tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerBridge<T> {
    #[serde(default)]
    pub hyperbridge: T,
    #[serde(default)]
    pub ccip: T,
    #[serde(default)]
    pub layer_zero: T,
}

impl<T> PerBridge<T> {
    pub fn get(&self, bridge: BridgeType) -> &T {
        match bridge {
            BridgeType::Hyperbridge => &self.hyperbridge,
            BridgeType::Ccip => &self.ccip,
            BridgeType::LayerZero => &self.layer_zero,
        }
    }

    pub fn get_mut(&mut self, bridge: BridgeType) -> &mut T {
        match bridge {
            BridgeType::Hyperbridge => &mut self.hyperbridge,
            BridgeType::Ccip => &mut self.ccip,
            BridgeType::LayerZero => &mut self.layer_zero,
        }
    }
}
