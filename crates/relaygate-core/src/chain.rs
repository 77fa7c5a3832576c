//! Chain directory: per-chain metadata needed to build mutation payloads.

use crate::bridge::{BridgeType, PerBridge};
use crate::error::RouteError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Metadata for one chain.
///
/// `adapters` holds the gateway adapter contract deployed on this chain for
/// each bridge. It serves as the adapter address when this chain is a route
/// source and as the destination contract when it is a route destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    #[serde(default)]
    pub chain_id: String,
    /// CAIP-2 reference, e.g. `eip155:8453`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caip2: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_selector",
        deserialize_with = "deserialize_selector"
    )]
    pub ccip_chain_selector: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_zero_eid: Option<u32>,
    #[serde(default)]
    pub adapters: PerBridge<Option<String>>,
}

impl ChainMetadata {
    pub fn adapter(&self, bridge: BridgeType) -> Option<&str> {
        self.adapters
            .get(bridge)
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }
}

/// Known chains keyed by chain id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDirectory {
    #[serde(default)]
    chains: BTreeMap<String, ChainMetadata>,
}

impl ChainDirectory {
    /// Build from entries. Blank `chain_id` fields are filled from the key.
    pub fn from_entries(entries: BTreeMap<String, ChainMetadata>) -> Self {
        let chains = entries
            .into_iter()
            .map(|(id, mut meta)| {
                if meta.chain_id.trim().is_empty() {
                    meta.chain_id = id.clone();
                }
                (id, meta)
            })
            .collect();
        Self { chains }
    }

    pub fn insert(&mut self, meta: ChainMetadata) {
        self.chains.insert(meta.chain_id.clone(), meta);
    }

    pub fn get(&self, chain_id: &str) -> Option<&ChainMetadata> {
        self.chains.get(chain_id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Metadata for `chain_id`, or a missing-field error tagged with `bridge`.
    pub fn require(&self, chain_id: &str, bridge: BridgeType) -> Result<&ChainMetadata, RouteError> {
        self.get(chain_id)
            .ok_or_else(|| RouteError::MissingRequiredField {
                field: "chainMetadata",
                chain_id: chain_id.to_string(),
                bridge,
            })
    }

    /// Adapter contract for `bridge` on the source chain of a route.
    pub fn adapter_address(&self, chain_id: &str, bridge: BridgeType) -> Result<String, RouteError> {
        self.require(chain_id, bridge)?
            .adapter(bridge)
            .map(str::to_string)
            .ok_or_else(|| RouteError::MissingRequiredField {
                field: "adapterAddress",
                chain_id: chain_id.to_string(),
                bridge,
            })
    }
}

// CCIP selectors exceed the i64 range TOML integers can hold, so they are
// accepted as strings too and always written as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorRepr {
    Number(u64),
    Text(String),
}

fn deserialize_selector<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<SelectorRepr>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(SelectorRepr::Number(value)) => Ok(Some(value)),
        Some(SelectorRepr::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid ccipChainSelector `{text}`: {e}"))),
    }
}

fn serialize_selector<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(selector) => serializer.serialize_str(&selector.to_string()),
        None => serializer.serialize_none(),
    }
}
