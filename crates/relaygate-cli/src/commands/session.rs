use crate::cli::SessionCommands;
use crate::support::{
    Plane, block_on, fail, load_config_or_exit, open_plane_or_exit, persist_or_exit, print_json,
    save_session_or_exit,
};
use relaygate_core::{BridgeType, ProvisioningStep};
use relaygate_engine::{ControlPlaneConfig, ManualProvisioningSession, StepStatus};
use std::process;

pub fn run(config: String, command: SessionCommands) {
    let config = load_config_or_exit(&config);
    let plane = open_plane_or_exit(&config);

    match command {
        SessionCommands::Show { json } => render(&plane.session(), json),

        SessionCommands::Select {
            source,
            dest,
            bridge,
            json,
        } => {
            let bridge = bridge.map(|raw| raw.parse::<BridgeType>().unwrap_or_else(|e| fail(e)));
            if let Some(source) = source {
                plane.select_source(source).unwrap_or_else(|e| fail(e));
            }
            if let Some(dest) = dest {
                plane.select_destination(dest).unwrap_or_else(|e| fail(e));
            }
            if let Some(bridge) = bridge {
                plane.select_bridge(bridge).unwrap_or_else(|e| fail(e));
            }
            save_session_or_exit(&config, &plane.session());
            render(&plane.session(), json);
        }

        SessionCommands::Step { number, json } => run_step(&config, &plane, number, json),

        SessionCommands::Reset { json } => {
            let session = plane.reset_session().unwrap_or_else(|e| fail(e));
            save_session_or_exit(&config, &session);
            render(&session, json);
        }
    }
}

fn run_step(config: &ControlPlaneConfig, plane: &Plane, number: u8, json: bool) {
    let step = ProvisioningStep::from_number(number)
        .unwrap_or_else(|| fail(format!("step must be 1-4 (got {number})")));
    let result = block_on(plane.execute_step(step));
    // Failed steps are recorded in the session too.
    persist_or_exit(config, plane);

    match result {
        Ok(report) => {
            let failed = report.status == StepStatus::Failed;
            if json {
                print_json(&report);
            } else {
                println!("{} {}: {}", report.key, report.step, report.status.as_str());
                if let Some(message) = &report.message {
                    println!("  {message}");
                }
                for tx_hash in &report.tx_hashes {
                    println!("  tx: {tx_hash}");
                }
            }
            if failed {
                process::exit(1);
            }
        }
        Err(err) => fail(format!("{} [{}]", err, err.code())),
    }
}

fn render(session: &ManualProvisioningSession, json: bool) {
    if json {
        print_json(session);
        return;
    }

    println!("relaygate session");
    println!(
        "  source: {}",
        session.selection.source_chain_id.as_deref().unwrap_or("-")
    );
    println!(
        "  destination: {}",
        session.selection.dest_chain_id.as_deref().unwrap_or("-")
    );
    println!("  bridge: {}", session.bridge());
    println!("  current: {}", session.current_step);
    for step in ProvisioningStep::ALL {
        let execution = session.execution_of(step);
        let marker = if session.is_completed(step) { "x" } else { " " };
        print!("  [{marker}] {step}: {}", execution.status.as_str());
        if let Some(message) = &execution.message {
            print!(" ({message})");
        }
        println!();
        for tx_hash in &execution.tx_hashes {
            println!("        tx: {tx_hash}");
        }
    }
}
