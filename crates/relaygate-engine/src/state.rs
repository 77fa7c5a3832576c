//! JSON documents kept in the state directory between invocations.
//!
//! Writes go through a temp file and a rename so a reader never sees a
//! half-written document.

use relaygate_store::write_atomic;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON document. A missing file yields `Ok(None)`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StateError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StateError::ReadFile {
                path: path.display().to_string(),
                source,
            });
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| StateError::ParseJson {
            path: path.display().to_string(),
            source,
        })
}

/// Write a pretty-printed JSON document atomically.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StateError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| StateError::Serialize {
        path: path.display().to_string(),
        source,
    })?;
    text.push('\n');
    write_atomic(path, text.as_bytes()).map_err(|source| StateError::WriteFile {
        path: path.display().to_string(),
        source,
    })
}
