//! Protocol-specific configuration payloads.
//!
//! Each bridge family encodes "send to this destination" differently. The
//! payload for a route is derived entirely from the chain directory; any
//! field that cannot be resolved fails the derivation before a request is
//! built, so a partially populated payload never reaches the backend.

use crate::bridge::BridgeType;
use crate::chain::ChainDirectory;
use crate::error::RouteError;
use serde::{Deserialize, Serialize};

/// Options blob meaning "no executor options" for endpoint-ID routing.
pub const LAYER_ZERO_NO_OPTIONS: &str = "0x00";

const ADDRESS_HEX_LEN: usize = 40;
const WORD_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperbridgeConfig {
    pub state_machine_id: String,
    pub destination_contract: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcipConfig {
    pub chain_selector: u64,
    pub destination_contract: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerZeroConfig {
    pub dst_eid: u32,
    pub peer: String,
    pub options: String,
}

/// Configuration payload, one variant per bridge family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ProtocolConfig {
    Hyperbridge(HyperbridgeConfig),
    Ccip(CcipConfig),
    LayerZero(LayerZeroConfig),
}

impl ProtocolConfig {
    pub fn bridge(&self) -> BridgeType {
        match self {
            Self::Hyperbridge(_) => BridgeType::Hyperbridge,
            Self::Ccip(_) => BridgeType::Ccip,
            Self::LayerZero(_) => BridgeType::LayerZero,
        }
    }
}

/// Right-align a 20-byte address in a 32-byte word.
///
/// `0x` + 24 zero hex digits + the 40 address digits, original case kept.
pub fn pad_address_32(address: &str) -> Result<String, RouteError> {
    let digits = strip_hex_prefix(address).ok_or_else(|| invalid(address, "missing 0x prefix"))?;
    if digits.len() != ADDRESS_HEX_LEN {
        return Err(invalid(
            address,
            &format!("expected {ADDRESS_HEX_LEN} hex digits, got {}", digits.len()),
        ));
    }
    ensure_hex(address, digits)?;
    Ok(format!("0x{}{digits}", "0".repeat(WORD_HEX_LEN - ADDRESS_HEX_LEN)))
}

/// Recover the address from a 32-byte padded word (the last 40 digits).
pub fn unpad_address_32(word: &str) -> Result<String, RouteError> {
    let digits = strip_hex_prefix(word).ok_or_else(|| invalid(word, "missing 0x prefix"))?;
    if digits.len() != WORD_HEX_LEN {
        return Err(invalid(
            word,
            &format!("expected {WORD_HEX_LEN} hex digits, got {}", digits.len()),
        ));
    }
    ensure_hex(word, digits)?;
    let (high, low) = digits.split_at(WORD_HEX_LEN - ADDRESS_HEX_LEN);
    if high.bytes().any(|b| b != b'0') {
        return Err(invalid(word, "high 12 bytes are not zero"));
    }
    Ok(format!("0x{low}"))
}

/// Canonical state-machine reference for a CAIP-2 chain reference.
///
/// `eip155:<id>` maps to `EVM-<id>`; other namespaces are upper-cased.
pub fn state_machine_reference(caip2: &str) -> Option<String> {
    let (namespace, reference) = caip2.trim().split_once(':')?;
    let namespace = namespace.trim();
    let reference = reference.trim();
    if namespace.is_empty() || reference.is_empty() {
        return None;
    }
    let namespace = match namespace {
        "eip155" => "EVM".to_string(),
        other => other.to_ascii_uppercase(),
    };
    Some(format!("{namespace}-{reference}"))
}

/// `0x`-prefixed lowercase hex of the UTF-8 bytes of the state-machine reference.
pub fn state_machine_id(caip2: &str) -> Option<String> {
    state_machine_reference(caip2).map(|reference| format!("0x{}", hex::encode(reference.as_bytes())))
}

/// Build the payload configuring `bridge` towards `dest_chain_id`.
pub fn derive_protocol_config(
    directory: &ChainDirectory,
    dest_chain_id: &str,
    bridge: BridgeType,
) -> Result<ProtocolConfig, RouteError> {
    let dest = directory.require(dest_chain_id, bridge)?;
    let missing = |field: &'static str| RouteError::MissingRequiredField {
        field,
        chain_id: dest_chain_id.to_string(),
        bridge,
    };
    let destination_contract = dest
        .adapter(bridge)
        .ok_or_else(|| missing("destinationContract"))
        .and_then(pad_address_32)?;

    match bridge {
        BridgeType::Hyperbridge => {
            let state_machine_id = dest
                .caip2
                .as_deref()
                .and_then(state_machine_id)
                .ok_or_else(|| missing("caip2"))?;
            Ok(ProtocolConfig::Hyperbridge(HyperbridgeConfig {
                state_machine_id,
                destination_contract,
            }))
        }
        BridgeType::Ccip => {
            let chain_selector = dest
                .ccip_chain_selector
                .ok_or_else(|| missing("ccipChainSelector"))?;
            Ok(ProtocolConfig::Ccip(CcipConfig {
                chain_selector,
                destination_contract,
            }))
        }
        BridgeType::LayerZero => {
            let dst_eid = dest.layer_zero_eid.ok_or_else(|| missing("layerZeroEid"))?;
            Ok(ProtocolConfig::LayerZero(LayerZeroConfig {
                dst_eid,
                peer: destination_contract,
                options: LAYER_ZERO_NO_OPTIONS.to_string(),
            }))
        }
    }
}

fn strip_hex_prefix(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
}

fn ensure_hex(original: &str, digits: &str) -> Result<(), RouteError> {
    hex::decode(digits)
        .map(|_| ())
        .map_err(|e| invalid(original, &e.to_string()))
}

fn invalid(value: &str, reason: &str) -> RouteError {
    RouteError::InvalidAddress {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
