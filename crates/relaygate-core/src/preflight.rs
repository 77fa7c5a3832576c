//! Preflight Evaluator.
//!
//! Readiness of a (route, bridge) pair is defined exactly once, here:
//! `ready == adapter_registered && route_configured && fee_quote_healthy`.
//! Route status, recommendations and bulk selection all go through
//! [`BridgePreflightResult::evaluate`].

use crate::bridge::BridgeType;
use crate::error::{ErrorCode, RouteError};
use crate::route::RouteKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The three independent health probes for one route and one bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightChecks {
    pub adapter_registered: bool,
    pub route_configured: bool,
    pub fee_quote_healthy: bool,
}

impl PreflightChecks {
    pub fn new(adapter_registered: bool, route_configured: bool, fee_quote_healthy: bool) -> Self {
        Self {
            adapter_registered,
            route_configured,
            fee_quote_healthy,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.adapter_registered && self.route_configured && self.fee_quote_healthy
    }

    /// First unmet check in dependency order.
    pub fn first_unmet(&self) -> Option<ErrorCode> {
        if !self.adapter_registered {
            Some(ErrorCode::AdapterNotRegistered)
        } else if !self.route_configured {
            Some(ErrorCode::RouteNotConfigured)
        } else if !self.fee_quote_healthy {
            Some(ErrorCode::FeeQuoteFailed)
        } else {
            None
        }
    }
}

/// Per-protocol health for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgePreflightResult {
    pub bridge_type: BridgeType,
    pub bridge_name: String,
    pub checks: PreflightChecks,
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl BridgePreflightResult {
    pub fn evaluate(bridge: BridgeType, checks: PreflightChecks) -> Self {
        let error_code = checks.first_unmet();
        let error_message = error_code.map(|code| unmet_message(code, bridge));
        Self {
            bridge_type: bridge,
            bridge_name: bridge.name().to_string(),
            checks,
            ready: error_code.is_none(),
            error_code,
            error_message,
        }
    }
}

fn unmet_message(code: ErrorCode, bridge: BridgeType) -> String {
    match code {
        ErrorCode::AdapterNotRegistered => {
            format!("{bridge} adapter is not registered for this route")
        }
        ErrorCode::RouteNotConfigured => {
            format!("{bridge} route parameters are not configured")
        }
        ErrorCode::FeeQuoteFailed => format!("{bridge} fee quote failed"),
        other => format!("{bridge} preflight failed: {other}"),
    }
}

/// Raw per-bridge probe row as reported by the configuration backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightRow {
    pub bridge_type: u8,
    pub checks: PreflightChecks,
}

/// Evaluated preflight for one route across every reported bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightReport {
    pub key: RouteKey,
    pub default_bridge_type: u8,
    pub results: Vec<BridgePreflightResult>,
}

impl PreflightReport {
    /// Evaluate backend rows.
    ///
    /// Duplicate rows for one bridge resolve last-write-wins so each
    /// (route, bridge) pair has exactly one readiness determination.
    /// Results are ordered by bridge tag.
    pub fn from_rows(
        key: RouteKey,
        default_bridge_type: u8,
        rows: Vec<PreflightRow>,
    ) -> Result<Self, RouteError> {
        let mut by_bridge = BTreeMap::new();
        for row in rows {
            let bridge = BridgeType::from_tag(row.bridge_type)?;
            by_bridge.insert(bridge, row.checks);
        }
        let results = by_bridge
            .into_iter()
            .map(|(bridge, checks)| BridgePreflightResult::evaluate(bridge, checks))
            .collect();
        Ok(Self {
            key,
            default_bridge_type,
            results,
        })
    }

    pub fn result_for(&self, bridge: BridgeType) -> Option<&BridgePreflightResult> {
        self.results.iter().find(|r| r.bridge_type == bridge)
    }

    /// Result for the route's default bridge, when the tag is known and reported.
    pub fn default_result(&self) -> Option<&BridgePreflightResult> {
        BridgeType::from_tag(self.default_bridge_type)
            .ok()
            .and_then(|bridge| self.result_for(bridge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RouteKey {
        RouteKey::new("base", "arbitrum")
    }

    #[test]
    fn ready_is_conjunction_of_all_checks() {
        for bits in 0u8..8 {
            let checks = PreflightChecks::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            for bridge in BridgeType::ALL {
                let result = BridgePreflightResult::evaluate(bridge, checks);
                assert_eq!(
                    result.ready,
                    checks.adapter_registered && checks.route_configured && checks.fee_quote_healthy
                );
                assert_eq!(result.ready, result.error_code.is_none());
                assert_eq!(result.ready, result.error_message.is_none());
            }
        }
    }

    #[test]
    fn error_code_reports_first_unmet_dependency() {
        let result =
            BridgePreflightResult::evaluate(BridgeType::Ccip, PreflightChecks::new(false, false, false));
        assert_eq!(result.error_code, Some(ErrorCode::AdapterNotRegistered));

        let result =
            BridgePreflightResult::evaluate(BridgeType::Ccip, PreflightChecks::new(true, false, false));
        assert_eq!(result.error_code, Some(ErrorCode::RouteNotConfigured));

        let result =
            BridgePreflightResult::evaluate(BridgeType::Ccip, PreflightChecks::new(true, true, false));
        assert_eq!(result.error_code, Some(ErrorCode::FeeQuoteFailed));
        assert_eq!(result.bridge_name, "CCIP");
    }

    #[test]
    fn report_dedupes_rows_per_bridge() {
        let report = PreflightReport::from_rows(
            key(),
            1,
            vec![
                PreflightRow {
                    bridge_type: 1,
                    checks: PreflightChecks::new(false, false, false),
                },
                PreflightRow {
                    bridge_type: 0,
                    checks: PreflightChecks::new(true, true, true),
                },
                PreflightRow {
                    bridge_type: 1,
                    checks: PreflightChecks::new(true, true, true),
                },
            ],
        )
        .expect("rows should evaluate");

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].bridge_type, BridgeType::Hyperbridge);
        let default = report.default_result().expect("default bridge reported");
        assert_eq!(default.bridge_type, BridgeType::Ccip);
        assert!(default.ready);
    }

    #[test]
    fn report_rejects_unknown_bridge_rows() {
        let err = PreflightReport::from_rows(
            key(),
            0,
            vec![PreflightRow {
                bridge_type: 5,
                checks: PreflightChecks::default(),
            }],
        )
        .expect_err("unknown tag must be rejected");
        assert_eq!(err, RouteError::UnknownBridgeType(5));
    }
}
