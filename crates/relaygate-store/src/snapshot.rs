//! Route Snapshot Store.
//!
//! Holds the last-fetched route matrix. A refresh replaces the whole
//! snapshot; readers hold an `Arc` to the version they started with, so a
//! refresh never interleaves with a reader field by field.

use crate::jsonl::{JsonlError, read_snapshot_from_path, write_snapshot_to_path};
use chrono::{DateTime, Utc};
use relaygate_core::{Route, RouteKey, RouteStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Immutable matrix of routes as of `fetched_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSnapshot {
    routes: BTreeMap<RouteKey, Route>,
    fetched_at: DateTime<Utc>,
}

impl RouteSnapshot {
    /// Build from fetched routes.
    ///
    /// Statuses are re-derived from the raw checks. Duplicate keys resolve
    /// last-write-wins, matching page overlap during paginated fetches.
    pub fn from_routes(routes: Vec<Route>, fetched_at: DateTime<Utc>) -> Self {
        let mut index = BTreeMap::new();
        for route in routes {
            let route = route.normalized();
            index.insert(route.key(), route);
        }
        Self {
            routes: index,
            fetched_at,
        }
    }

    pub fn empty() -> Self {
        Self::from_routes(Vec::new(), DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn route(&self, key: &RouteKey) -> Option<&Route> {
        self.routes.get(key)
    }

    /// All routes in (source, dest) order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn routes_from(&self, source_chain_id: &str) -> Vec<&Route> {
        self.routes()
            .filter(|route| route.source_chain_id == source_chain_id)
            .collect()
    }

    pub fn error_routes_from(&self, source_chain_id: &str) -> Vec<&Route> {
        self.routes()
            .filter(|route| {
                route.source_chain_id == source_chain_id
                    && route.overall_status == RouteStatus::Error
            })
            .collect()
    }

    pub fn filter(&self, filter: &RouteFilter) -> Vec<&Route> {
        self.routes().filter(|route| filter.matches(route)).collect()
    }

    /// Ready/error/unknown tally over `keys`. Keys absent from the snapshot
    /// count as unknown.
    pub fn counts<'a>(&self, keys: impl IntoIterator<Item = &'a RouteKey>) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for key in keys {
            let status = self
                .route(key)
                .map(|route| route.overall_status)
                .unwrap_or(RouteStatus::Unknown);
            counts.record(status);
        }
        counts
    }

    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, JsonlError> {
        read_snapshot_from_path(path)
    }

    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), JsonlError> {
        let routes: Vec<Route> = self.routes.values().cloned().collect();
        write_snapshot_to_path(path, &routes, self.fetched_at)
    }
}

/// Visible-route filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RouteStatus>,
}

impl RouteFilter {
    pub fn source(source_chain_id: impl Into<String>) -> Self {
        Self {
            source_chain_id: Some(source_chain_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, route: &Route) -> bool {
        self.source_chain_id
            .as_deref()
            .is_none_or(|source| route.source_chain_id == source)
            && self
                .dest_chain_id
                .as_deref()
                .is_none_or(|dest| route.dest_chain_id == dest)
            && self.status.is_none_or(|status| route.overall_status == status)
    }
}

/// Route status tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub ready: usize,
    pub error: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn tally<'a>(routes: impl IntoIterator<Item = &'a Route>) -> Self {
        let mut counts = Self::default();
        for route in routes {
            counts.record(route.overall_status);
        }
        counts
    }

    pub fn record(&mut self, status: RouteStatus) {
        match status {
            RouteStatus::Ready => self.ready += 1,
            RouteStatus::Error => self.error += 1,
            RouteStatus::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ready + self.error + self.unknown
    }
}

/// Owner of the current snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    current: Arc<RouteSnapshot>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(RouteSnapshot::empty())
    }
}

impl SnapshotStore {
    pub fn new(snapshot: RouteSnapshot) -> Self {
        Self {
            current: Arc::new(snapshot),
        }
    }

    /// Shared handle to the current snapshot.
    pub fn current(&self) -> Arc<RouteSnapshot> {
        Arc::clone(&self.current)
    }

    /// Swap in a new snapshot wholesale. Returns the previous one.
    pub fn replace(&mut self, snapshot: RouteSnapshot) -> Arc<RouteSnapshot> {
        std::mem::replace(&mut self.current, Arc::new(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use relaygate_core::{BridgeType, PerBridge, RouteIssue};

    fn route(source: &str, dest: &str, ready: bool) -> Route {
        Route {
            source_chain_id: source.to_string(),
            dest_chain_id: dest.to_string(),
            default_bridge_type: BridgeType::Hyperbridge.tag(),
            adapter_registered: true,
            protocol_configured: PerBridge {
                hyperbridge: ready,
                ..PerBridge::default()
            },
            fee_quote_healthy: true,
            issues: Vec::new(),
            overall_status: RouteStatus::Unknown,
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("fixed time")
    }

    #[test]
    fn snapshot_derives_status_and_orders_routes() {
        let snapshot = RouteSnapshot::from_routes(
            vec![
                route("base", "bsc", false),
                route("arbitrum", "base", true),
                route("base", "arbitrum", true),
            ],
            fixed_time(),
        );

        let keys: Vec<RouteKey> = snapshot.routes().map(Route::key).collect();
        assert_eq!(
            keys,
            vec![
                RouteKey::new("arbitrum", "base"),
                RouteKey::new("base", "arbitrum"),
                RouteKey::new("base", "bsc"),
            ]
        );
        assert_eq!(snapshot.routes_from("base").len(), 2);
        let errors = snapshot.error_routes_from("base");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].dest_chain_id, "bsc");
    }

    #[test]
    fn duplicate_keys_use_last_write_wins() {
        let snapshot = RouteSnapshot::from_routes(
            vec![route("base", "bsc", false), route("base", "bsc", true)],
            fixed_time(),
        );
        assert_eq!(snapshot.len(), 1);
        assert!(
            snapshot
                .route(&RouteKey::new("base", "bsc"))
                .expect("route should exist")
                .is_ready()
        );
    }

    #[test]
    fn counts_treat_missing_keys_as_unknown() {
        let snapshot = RouteSnapshot::from_routes(
            vec![route("base", "bsc", false), route("base", "arbitrum", true)],
            fixed_time(),
        );
        let keys = vec![
            RouteKey::new("base", "bsc"),
            RouteKey::new("base", "arbitrum"),
            RouteKey::new("base", "gone"),
        ];
        let counts = snapshot.counts(&keys);
        assert_eq!(
            counts,
            StatusCounts {
                ready: 1,
                error: 1,
                unknown: 1
            }
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn filter_combines_source_dest_and_status() {
        let mut broken = route("base", "optimism", true);
        broken.issues.push(RouteIssue::new("PAUSED", "route paused"));
        let snapshot = RouteSnapshot::from_routes(
            vec![route("base", "bsc", true), broken, route("bsc", "base", false)],
            fixed_time(),
        );

        let filter = RouteFilter {
            source_chain_id: Some("base".to_string()),
            status: Some(RouteStatus::Error),
            ..RouteFilter::default()
        };
        let matched = snapshot.filter(&filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].dest_chain_id, "optimism");
        assert_eq!(snapshot.filter(&RouteFilter::default()).len(), 3);
    }

    #[test]
    fn replace_swaps_wholesale_and_keeps_old_readers_intact() {
        let mut store = SnapshotStore::new(RouteSnapshot::from_routes(
            vec![route("base", "bsc", false)],
            fixed_time(),
        ));
        let before = store.current();

        let previous = store.replace(RouteSnapshot::from_routes(
            vec![route("base", "bsc", true), route("base", "arbitrum", true)],
            fixed_time(),
        ));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.len(), 1);
        assert!(!before.routes().all(Route::is_ready));
        assert_eq!(store.current().len(), 2);
        assert!(store.current().routes().all(Route::is_ready));
    }
}
