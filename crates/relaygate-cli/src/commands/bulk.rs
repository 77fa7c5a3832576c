use crate::cli::{ActionArg, StatusArg};
use crate::support::{
    Plane, block_on, fail, load_config_or_exit, open_plane_or_exit, persist_or_exit, print_json,
    route_status,
};
use relaygate_engine::{ControlPlaneConfig, EngineError, WizardAction, WizardReport};
use relaygate_store::RouteFilter;
use std::sync::Arc;

pub struct FilteredArgs {
    pub config: String,
    pub action: ActionArg,
    pub source: Option<String>,
    pub dest: Option<String>,
    pub status: Option<StatusArg>,
    pub json: bool,
}

pub fn run_source(config: String, action: WizardAction, source: String, json: bool) {
    let config = load_config_or_exit(&config);
    let plane = open_plane_or_exit(&config);
    let report = block_on(async {
        plane.refresh().await?;
        match action {
            WizardAction::Setup => plane.setup_selected_source(&source).await,
            WizardAction::AutoFixErrorOnly => plane.auto_fix_error_only(&source).await,
            WizardAction::Verify => plane.verify_selected_source(&source).await,
        }
    });
    finish(&config, &plane, report, json);
}

pub fn run_filtered(args: FilteredArgs) {
    let config = load_config_or_exit(&args.config);
    let plane = open_plane_or_exit(&config);
    let action = match args.action {
        ActionArg::Setup => WizardAction::Setup,
        ActionArg::Autofix => WizardAction::AutoFixErrorOnly,
        ActionArg::Verify => WizardAction::Verify,
    };
    let filter = RouteFilter {
        source_chain_id: args.source,
        dest_chain_id: args.dest,
        status: args.status.map(route_status),
    };
    let report = block_on(async {
        plane.refresh().await?;
        plane.reconcile_filtered(filter, action).await
    });
    finish(&config, &plane, report, args.json);
}

fn finish(
    config: &ControlPlaneConfig,
    plane: &Plane,
    report: Result<Arc<WizardReport>, EngineError>,
    json: bool,
) {
    let report = report.unwrap_or_else(|e| fail(format!("{e} [{}]", e.code())));
    persist_or_exit(config, plane);

    if json {
        let document = report
            .to_json_document()
            .unwrap_or_else(|e| fail(format!("failed to render report: {e}")));
        print_json(&document);
        return;
    }

    println!("relaygate {}", report.action());
    match report.dest_chain_id() {
        Some(dest) => println!("  scope: {} -> {dest}", report.source_chain_id()),
        None => println!("  scope: {}", report.source_chain_id()),
    }
    println!("  routes: {}", report.total_routes());
    println!(
        "  before: ready {} / error {}",
        report.before_ready(),
        report.before_error()
    );
    println!(
        "  after:  ready {} / error {}",
        report.after_ready(),
        report.after_error()
    );
    for outcome in report.auto_fix().iter().chain(report.recheck()) {
        if outcome.is_failure() {
            println!(
                "  failed: {} {}",
                outcome.key,
                outcome.message.as_deref().unwrap_or("")
            );
        }
    }
}
