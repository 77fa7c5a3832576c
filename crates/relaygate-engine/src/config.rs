//! Control-plane configuration (`relaygate.toml`).
//!
//! ```toml
//! stateDir = ".relaygate"
//! pageLimit = 100
//! fixture = "fixture.json"
//!
//! [chains.base]
//! caip2 = "eip155:8453"
//! ccipChainSelector = "15971525489660198786"
//! layerZeroEid = 30184
//!
//! [chains.base.adapters]
//! hyperbridge = "0x..."
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use relaygate_core::{ChainDirectory, ChainMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_PAGE_LIMIT: u32 = 100;
const DEFAULT_STATE_DIR: &str = ".relaygate";

const SESSION_FILE: &str = "session.json";
const SNAPSHOT_FILE: &str = "routes.jsonl";
const REPORT_FILE: &str = "last-report.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Route fixture served by the in-memory backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,
    #[serde(default)]
    pub chains: BTreeMap<String, ChainMetadata>,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_DIR)
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            page_limit: DEFAULT_PAGE_LIMIT,
            fixture: None,
            chains: BTreeMap::new(),
            base_dir: PathBuf::new(),
        }
    }
}

impl ControlPlaneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base_dir).map_err(|err| match err {
            ConfigError::ParseToml { source, .. } => ConfigError::ParseToml {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parse TOML text; relative paths resolve against `base_dir`.
    pub fn parse(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: "<inline>".to_string(),
            source,
        })?;
        if config.page_limit == 0 {
            return Err(ConfigError::Invalid("pageLimit must be at least 1".to_string()));
        }
        config.base_dir = base_dir.into();
        Ok(config)
    }

    pub fn directory(&self) -> ChainDirectory {
        ChainDirectory::from_entries(self.chains.clone())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.resolve(&self.state_dir)
    }

    pub fn fixture_path(&self) -> Option<PathBuf> {
        self.fixture.as_deref().map(|path| self.resolve(path))
    }

    pub fn session_path(&self) -> PathBuf {
        self.state_dir().join(SESSION_FILE)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir().join(SNAPSHOT_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.state_dir().join(REPORT_FILE)
    }
}
