use crate::cli::StatusArg;
use relaygate_core::RouteStatus;
use relaygate_engine::{
    ControlPlane, ControlPlaneConfig, FixtureBackend, ManualProvisioningSession, SessionDocument,
    WizardReport, read_json_file, write_json_file,
};
use relaygate_store::RouteSnapshot;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

pub type Plane = ControlPlane<FixtureBackend>;

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

pub fn block_on<F: Future>(future: F) -> F::Output {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
    runtime.block_on(future)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(format!("failed to render json: {e}")),
    }
}

pub fn route_status(arg: StatusArg) -> RouteStatus {
    match arg {
        StatusArg::Ready => RouteStatus::Ready,
        StatusArg::Error => RouteStatus::Error,
        StatusArg::Unknown => RouteStatus::Unknown,
    }
}

pub fn load_config_or_exit(path: &str) -> ControlPlaneConfig {
    ControlPlaneConfig::load(path).unwrap_or_else(|e| fail(e))
}

/// Build the control plane from config plus whatever state the previous
/// invocation left in the state directory.
pub fn open_plane_or_exit(config: &ControlPlaneConfig) -> Plane {
    let fixture_path = config.fixture_path().unwrap_or_else(|| {
        fail("no backend configured: set `fixture` in the config to a route fixture")
    });
    let backend = FixtureBackend::load_json(&fixture_path).unwrap_or_else(|e| fail(e));
    let mut plane =
        ControlPlane::new(backend, config.directory()).with_page_limit(config.page_limit);

    let snapshot_path = config.snapshot_path();
    if snapshot_path.exists() {
        let snapshot = RouteSnapshot::load_jsonl(&snapshot_path).unwrap_or_else(|e| {
            fail(format!("failed to load {}: {e}", snapshot_path.display()))
        });
        plane = plane.with_snapshot(snapshot);
    }

    let session: Option<SessionDocument> =
        read_json_file(&config.session_path()).unwrap_or_else(|e| fail(e));
    if let Some(document) = session {
        plane = plane.with_session(document.into_session().unwrap_or_else(|e| fail(e)));
    }

    let report: Option<WizardReport> =
        read_json_file(&config.report_path()).unwrap_or_else(|e| fail(e));
    if let Some(report) = report {
        plane = plane.with_last_report(report);
    }
    tracing::debug!(
        state_dir = %config.state_dir().display(),
        cached_routes = plane.snapshot().len(),
        "Loaded control-plane state"
    );
    plane
}

/// Write back backend state, snapshot, session and last report.
pub fn persist_or_exit(config: &ControlPlaneConfig, plane: &Plane) {
    if let Some(fixture_path) = config.fixture_path() {
        plane
            .backend()
            .save_json(&fixture_path)
            .unwrap_or_else(|e| fail(e));
    }
    let snapshot_path = config.snapshot_path();
    plane
        .snapshot()
        .save_jsonl(&snapshot_path)
        .unwrap_or_else(|e| fail(format!("failed to write {}: {e}", snapshot_path.display())));
    save_session_or_exit(config, &plane.session());
    if let Some(report) = plane.last_report() {
        let document = report
            .to_json_document()
            .unwrap_or_else(|e| fail(format!("failed to render report: {e}")));
        write_json_file(&config.report_path(), &document).unwrap_or_else(|e| fail(e));
    }
    tracing::debug!(
        state_dir = %config.state_dir().display(),
        routes = plane.snapshot().len(),
        "Persisted control-plane state"
    );
}

pub fn save_session_or_exit(config: &ControlPlaneConfig, session: &ManualProvisioningSession) {
    write_json_file(
        &config.session_path(),
        &SessionDocument::new(session.clone()),
    )
    .unwrap_or_else(|e| fail(e));
}

pub fn write_output_or_exit(out: Option<&str>, text: &str) {
    match out {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .unwrap_or_else(|e| fail(format!("{}: {e}", parent.display())));
            }
            std::fs::write(path, text)
                .unwrap_or_else(|e| fail(format!("failed to write {}: {e}", path.display())));
            eprintln!("wrote {}", path.display());
        }
        None => print!("{text}"),
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
