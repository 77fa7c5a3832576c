use crate::support::{block_on, fail, load_config_or_exit, open_plane_or_exit, print_json, yes_no};
use relaygate_core::{RouteKey, recommend};
use serde_json::json;

pub fn run(config: String, source: String, dest: String, json: bool) {
    let config = load_config_or_exit(&config);
    let plane = open_plane_or_exit(&config);
    let key = RouteKey::new(source, dest);
    let report = block_on(plane.preflight(&key)).unwrap_or_else(|e| fail(e));
    let recommendation = report
        .default_result()
        .map(|result| plane.recommendation(&result.checks));

    if json {
        print_json(&json!({
            "preflight": report,
            "recommendedAction": recommendation,
            "entryStep": recommendation.and_then(|action| action.entry_step()),
        }));
        return;
    }

    println!("relaygate preflight {key}");
    println!("  default bridge tag: {}", report.default_bridge_type);
    for result in &report.results {
        println!(
            "  - {} ready={} adapter={} configured={} feeQuote={} next={}",
            result.bridge_name,
            yes_no(result.ready),
            yes_no(result.checks.adapter_registered),
            yes_no(result.checks.route_configured),
            yes_no(result.checks.fee_quote_healthy),
            recommend(&result.checks),
        );
        if let Some(message) = &result.error_message {
            println!("      {message}");
        }
    }
    match recommendation {
        Some(action) => {
            println!("  recommended: {action}");
            if let Some(step) = action.entry_step() {
                println!("  start at: {step}");
            }
        }
        None => println!("  recommended: n/a (default bridge not reported)"),
    }
}
