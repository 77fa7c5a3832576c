//! JSONL persistence: one line per route.
//!
//! The first line is a `#` header carrying the snapshot kind and fetch time.
//! Other `#` lines and blank lines are ignored on read.

use crate::atomic::write_atomic;
use crate::snapshot::RouteSnapshot;
use chrono::{DateTime, Utc};
use relaygate_core::Route;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

pub const ROUTE_SNAPSHOT_KIND: &str = "relaygate.route_snapshot.v1";
const FETCHED_AT_MARKER: &str = "fetchedAt=";

/// Read a snapshot from a JSONL reader.
pub fn read_snapshot(reader: impl BufRead) -> Result<RouteSnapshot, JsonlError> {
    let mut routes = Vec::new();
    let mut fetched_at = None;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JsonlError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            if fetched_at.is_none() {
                fetched_at = parse_header(comment, line_no + 1)?;
            }
            continue;
        }
        let route: Route = serde_json::from_str(trimmed)
            .map_err(|e| JsonlError::Parse(line_no + 1, e.to_string()))?;
        routes.push(route);
    }
    Ok(RouteSnapshot::from_routes(
        routes,
        fetched_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    ))
}

fn parse_header(comment: &str, line_no: usize) -> Result<Option<DateTime<Utc>>, JsonlError> {
    let Some(raw) = comment
        .split_whitespace()
        .find_map(|token| token.strip_prefix(FETCHED_AT_MARKER))
    else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(|e| JsonlError::Parse(line_no, format!("invalid {FETCHED_AT_MARKER}{raw}: {e}")))
}

/// Write routes to a JSONL writer, header first.
pub fn write_snapshot(
    writer: &mut impl Write,
    routes: &[Route],
    fetched_at: DateTime<Utc>,
) -> Result<(), JsonlError> {
    writeln!(
        writer,
        "# {ROUTE_SNAPSHOT_KIND} {FETCHED_AT_MARKER}{}",
        fetched_at.to_rfc3339()
    )
    .map_err(|e| JsonlError::Io(0, e.to_string()))?;
    for route in routes {
        let line =
            serde_json::to_string(route).map_err(|e| JsonlError::Serialize(e.to_string()))?;
        writeln!(writer, "{line}").map_err(|e| JsonlError::Io(0, e.to_string()))?;
    }
    Ok(())
}

/// Read a snapshot from a JSONL file path.
pub fn read_snapshot_from_path(path: impl AsRef<Path>) -> Result<RouteSnapshot, JsonlError> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).map_err(|e| JsonlError::Io(0, format!("{}: {e}", path.display())))?;
    validate_substrate_bytes(path, &bytes)?;
    read_snapshot(BufReader::new(bytes.as_slice()))
}

/// Write a snapshot to a JSONL file path via temp file + rename.
pub fn write_snapshot_to_path(
    path: impl AsRef<Path>,
    routes: &[Route],
    fetched_at: DateTime<Utc>,
) -> Result<(), JsonlError> {
    let mut buffer = Vec::new();
    write_snapshot(&mut buffer, routes, fetched_at)?;
    write_atomic(path.as_ref(), &buffer).map_err(|e| JsonlError::Io(0, e.to_string()))
}

fn validate_substrate_bytes(path: &Path, bytes: &[u8]) -> Result<(), JsonlError> {
    if bytes.contains(&0) {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted snapshot file: {0}")]
    Corrupt(String),
}
