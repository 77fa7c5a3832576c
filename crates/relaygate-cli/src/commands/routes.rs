use crate::cli::StatusArg;
use crate::support::{
    block_on, fail, load_config_or_exit, open_plane_or_exit, persist_or_exit, print_json,
    route_status,
};
use relaygate_core::Route;
use relaygate_store::{RouteFilter, StatusCounts};
use serde_json::json;

pub struct Args {
    pub config: String,
    pub source: Option<String>,
    pub dest: Option<String>,
    pub status: Option<StatusArg>,
    pub json: bool,
}

pub fn run(args: Args) {
    let config = load_config_or_exit(&args.config);
    let plane = open_plane_or_exit(&config);
    let snapshot = block_on(plane.refresh()).unwrap_or_else(|e| fail(e));
    persist_or_exit(&config, &plane);

    let filter = RouteFilter {
        source_chain_id: args.source,
        dest_chain_id: args.dest,
        status: args.status.map(route_status),
    };
    let routes: Vec<&Route> = snapshot.filter(&filter);
    let counts = StatusCounts::tally(routes.iter().copied());

    if args.json {
        print_json(&json!({
            "fetchedAt": snapshot.fetched_at(),
            "filter": filter,
            "counts": counts,
            "routes": routes,
        }));
        return;
    }

    println!("relaygate routes");
    println!(
        "  matched: {} (ready {}, error {}, unknown {})",
        routes.len(),
        counts.ready,
        counts.error,
        counts.unknown
    );
    for route in routes {
        let bridge = route
            .default_bridge()
            .map(|bridge| bridge.name().to_string())
            .unwrap_or_else(|_| format!("tag {}", route.default_bridge_type));
        println!(
            "  - {} [{}] via {bridge}",
            route.key(),
            route.overall_status.as_str()
        );
        if let Some(result) = route.default_bridge().ok().map(|bridge| route.preflight(bridge))
            && let Some(message) = result.error_message
        {
            println!("      {message}");
        }
        for issue in &route.issues {
            println!("      {}: {}", issue.code, issue.message);
        }
    }
}
