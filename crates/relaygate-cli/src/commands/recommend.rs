use crate::support::print_json;
use relaygate_core::{PreflightChecks, recommend};
use serde_json::json;

pub fn run(adapter_registered: bool, route_configured: bool, fee_quote_healthy: bool, json: bool) {
    let checks = PreflightChecks::new(adapter_registered, route_configured, fee_quote_healthy);
    let action = recommend(&checks);
    let entry_step = action.entry_step();

    if json {
        print_json(&json!({
            "checks": checks,
            "recommendedAction": action,
            "entryStep": entry_step,
        }));
        return;
    }

    println!("{action}");
    if let Some(step) = entry_step {
        println!("  start at: {step}");
    }
}
