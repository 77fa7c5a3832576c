//! # relaygate-store
//!
//! Route Snapshot Store: the last-fetched matrix of routes.
//!
//! This crate provides:
//! - `RouteSnapshot` (immutable, status-normalized route matrix)
//! - `SnapshotStore` (wholesale replacement, shared read handles)
//! - `RouteFilter` / `StatusCounts` queries used by bulk reconciliation
//! - JSONL read/write for caching the last snapshot on disk
//! - `write_atomic`, the temp-file-and-rename write shared with engine state
//!
//! It does not talk to the configuration backend. Refreshing is the
//! engine's job (`relaygate-engine`).
//!
//! ```text
//! backend overview pages
//!     ↓  RouteSnapshot::from_routes
//! SnapshotStore (replace wholesale)
//!     ↕  save_jsonl / load_jsonl
//! JSONL (on disk, one line per route)
//! ```

pub mod atomic;
pub mod jsonl;
pub mod snapshot;

pub use atomic::write_atomic;
pub use jsonl::{JsonlError, ROUTE_SNAPSHOT_KIND, read_snapshot, write_snapshot};
pub use snapshot::{RouteFilter, RouteSnapshot, SnapshotStore, StatusCounts};
