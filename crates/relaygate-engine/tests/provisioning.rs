use relaygate_core::{
    BridgeType, ChainDirectory, ChainMetadata, PerBridge, ProvisioningStep, RecommendedAction,
    Route, RouteKey, RouteStatus,
};
use relaygate_engine::{
    ControlPlane, FixtureBackend, FixtureOperation, OutcomeStatus, StepStatus, WizardAction,
};
use relaygate_store::RouteFilter;

fn route(source: &str, dest: &str) -> Route {
    Route {
        source_chain_id: source.to_string(),
        dest_chain_id: dest.to_string(),
        default_bridge_type: BridgeType::Ccip.tag(),
        adapter_registered: false,
        protocol_configured: PerBridge::default(),
        fee_quote_healthy: true,
        issues: Vec::new(),
        overall_status: RouteStatus::Unknown,
    }
}

fn ready_route(source: &str, dest: &str) -> Route {
    let mut route = route(source, dest);
    route.adapter_registered = true;
    route.protocol_configured.ccip = true;
    route
}

fn chain(chain_id: &str, caip2: &str, selector: u64, adapter: &str) -> ChainMetadata {
    ChainMetadata {
        chain_id: chain_id.to_string(),
        caip2: Some(caip2.to_string()),
        ccip_chain_selector: Some(selector),
        layer_zero_eid: None,
        adapters: PerBridge {
            ccip: Some(adapter.to_string()),
            ..PerBridge::default()
        },
    }
}

fn directory() -> ChainDirectory {
    let mut directory = ChainDirectory::default();
    directory.insert(chain(
        "base",
        "eip155:8453",
        15_971_525_489_660_198_786,
        "0x1111111111111111111111111111111111111111",
    ));
    directory.insert(chain(
        "bsc",
        "eip155:56",
        11_344_663_589_394_136_015,
        "0x2222222222222222222222222222222222222222",
    ));
    directory
}

#[tokio::test]
async fn end_to_end_route_reaches_ready_through_manual_steps() {
    let key = RouteKey::new("base", "bsc");
    let plane = ControlPlane::new(FixtureBackend::new([route("base", "bsc")]), directory());
    plane.refresh().await.expect("initial refresh");

    assert_eq!(
        plane.recommend_for(&key),
        Some(RecommendedAction::RegisterAdapter)
    );
    assert_eq!(
        RecommendedAction::RegisterAdapter.entry_step(),
        Some(ProvisioningStep::RegisterAdapter)
    );

    plane.select_source("base").expect("select source");
    plane.select_destination("bsc").expect("select destination");
    plane.select_bridge(BridgeType::Ccip).expect("select bridge");

    let step1 = plane
        .execute_step(ProvisioningStep::RegisterAdapter)
        .await
        .expect("register adapter");
    assert_eq!(step1.status, StepStatus::Success);
    assert_eq!(step1.tx_hashes.len(), 1);
    assert_eq!(step1.session.current_step, ProvisioningStep::SetDefaultBridge);

    let refreshed = plane.snapshot();
    let current = refreshed.route(&key).expect("route in snapshot");
    assert!(current.adapter_registered);
    assert!(!current.protocol_configured.ccip);
    assert_eq!(
        plane.recommend_for(&key),
        Some(RecommendedAction::ConfigureRoute)
    );

    plane
        .execute_step(ProvisioningStep::SetDefaultBridge)
        .await
        .expect("set default bridge");
    let step3 = plane
        .execute_step(ProvisioningStep::ConfigureProtocol)
        .await
        .expect("configure protocol");
    assert_eq!(step3.session.current_step, ProvisioningStep::Verify);

    assert_eq!(plane.recommend_for(&key), Some(RecommendedAction::Ready));
    assert_eq!(
        plane
            .snapshot()
            .route(&key)
            .expect("route in snapshot")
            .overall_status,
        RouteStatus::Ready
    );

    let verify = plane
        .execute_step(ProvisioningStep::Verify)
        .await
        .expect("verify");
    assert_eq!(verify.status, StepStatus::Success);
    for step in ProvisioningStep::ALL {
        assert!(verify.session.is_completed(step));
    }
}

#[tokio::test]
async fn bulk_setup_isolates_a_failing_route() {
    let dests = ["d1", "d2", "d3", "d4", "d5"];
    let backend = FixtureBackend::new(dests.map(|dest| route("base", dest)));
    backend.fail_on(&RouteKey::new("base", "d3"), FixtureOperation::AutoFix);
    let plane = ControlPlane::new(backend, directory());
    plane.refresh().await.expect("refresh");

    let report = plane
        .setup_selected_source("base")
        .await
        .expect("bulk setup never fails as a whole");

    assert_eq!(report.action(), WizardAction::Setup);
    assert_eq!(report.auto_fix().len(), 5);
    let succeeded = report
        .auto_fix()
        .iter()
        .filter(|outcome| outcome.status == OutcomeStatus::Success)
        .count();
    assert_eq!(succeeded, 4);
    let failed: Vec<&RouteKey> = report
        .auto_fix()
        .iter()
        .filter(|outcome| outcome.is_failure())
        .map(|outcome| &outcome.key)
        .collect();
    assert_eq!(failed, vec![&RouteKey::new("base", "d3")]);
    assert_eq!(report.recheck().len(), 5);

    assert_eq!(report.total_routes(), 5);
    assert_eq!((report.before_ready(), report.before_error()), (0, 5));
    assert_eq!((report.after_ready(), report.after_error()), (4, 1));
    assert!(report.after_ready() + report.after_error() <= report.total_routes());
    assert!(report.after_ready() >= report.before_ready());
}

#[tokio::test]
async fn auto_fix_makes_no_mutations_for_ready_routes() {
    let backend = FixtureBackend::new([ready_route("base", "bsc"), ready_route("base", "arbitrum")]);
    let plane = ControlPlane::new(backend, directory());
    plane.refresh().await.expect("refresh");
    let before = plane.snapshot();

    for _ in 0..2 {
        let report = plane
            .setup_selected_source("base")
            .await
            .expect("setup");
        assert!(
            report
                .auto_fix()
                .iter()
                .all(|outcome| outcome.status == OutcomeStatus::Skipped)
        );
        assert_eq!(report.after_ready(), 2);
    }

    assert_eq!(plane.backend().mutation_count(), 0);
    let after = plane.snapshot();
    let before_routes: Vec<&Route> = before.routes().collect();
    let after_routes: Vec<&Route> = after.routes().collect();
    assert_eq!(before_routes, after_routes);
}

#[tokio::test]
async fn error_only_auto_fix_leaves_ready_routes_out_of_scope() {
    let backend = FixtureBackend::new([
        ready_route("base", "arbitrum"),
        route("base", "bsc"),
        route("bsc", "base"),
    ]);
    let plane = ControlPlane::new(backend, directory());
    plane.refresh().await.expect("refresh");

    let report = plane
        .auto_fix_error_only("base")
        .await
        .expect("auto-fix error routes");
    assert_eq!(report.action(), WizardAction::AutoFixErrorOnly);
    assert_eq!(report.total_routes(), 1);
    assert_eq!(report.auto_fix()[0].key, RouteKey::new("base", "bsc"));
    assert_eq!((report.after_ready(), report.after_error()), (1, 0));

    let untouched = plane
        .snapshot()
        .route(&RouteKey::new("bsc", "base"))
        .expect("other source")
        .overall_status;
    assert_eq!(untouched, RouteStatus::Error);
}

#[tokio::test]
async fn verify_only_rechecks() {
    let plane = ControlPlane::new(
        FixtureBackend::new([route("base", "bsc"), ready_route("base", "arbitrum")]),
        directory(),
    );
    plane.refresh().await.expect("refresh");

    let report = plane
        .verify_selected_source("base")
        .await
        .expect("verify");
    assert_eq!(report.action(), WizardAction::Verify);
    assert!(report.auto_fix().is_empty());
    assert_eq!(report.recheck().len(), 2);
    assert_eq!((report.after_ready(), report.after_error()), (1, 1));
    assert_eq!(plane.backend().mutation_count(), 0);
}

#[tokio::test]
async fn filtered_reconcile_follows_the_visible_routes() {
    let plane = ControlPlane::new(
        FixtureBackend::new([
            route("base", "bsc"),
            route("bsc", "base"),
            route("arbitrum", "bsc"),
        ]),
        directory(),
    );
    plane.refresh().await.expect("refresh");

    let filter = RouteFilter {
        dest_chain_id: Some("bsc".to_string()),
        ..RouteFilter::default()
    };
    let report = plane
        .reconcile_filtered(filter, WizardAction::Setup)
        .await
        .expect("filtered setup");
    assert_eq!(report.source_chain_id(), "*");
    assert_eq!(report.dest_chain_id(), Some("bsc"));
    assert_eq!(report.total_routes(), 2);
    assert_eq!(report.after_ready(), 2);

    let last = plane.last_report().expect("report kept");
    assert_eq!(last.total_routes(), 2);
}

#[tokio::test]
async fn refresh_failure_surfaces_and_keeps_the_old_snapshot() {
    let backend = FixtureBackend::new([route("base", "bsc")]);
    let plane = ControlPlane::new(backend, directory());
    plane.refresh().await.expect("refresh");
    let before = plane.snapshot();

    plane
        .backend()
        .fail_on(&RouteKey::new("base", "bsc"), FixtureOperation::RouteOverview);
    let err = plane.refresh().await.expect_err("overview fails");
    assert_eq!(err.code().as_str(), "TRANSPORT_FAILURE");
    assert!(std::sync::Arc::ptr_eq(&before, &plane.snapshot()));
    assert!(!plane.is_pending());
}
