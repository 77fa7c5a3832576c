//! Relaygate CLI: the `relaygate` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use relaygate_engine::WizardAction;

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.verbose);
    let config = cli.config;

    match cli.command {
        Commands::Routes {
            source,
            dest,
            status,
            json,
        } => commands::routes::run(commands::routes::Args {
            config,
            source,
            dest,
            status,
            json,
        }),

        Commands::Preflight { source, dest, json } => {
            commands::preflight::run(config, source, dest, json)
        }

        Commands::Recommend {
            adapter_registered,
            route_configured,
            fee_quote_healthy,
            json,
        } => commands::recommend::run(
            adapter_registered,
            route_configured,
            fee_quote_healthy,
            json,
        ),

        Commands::Session { command } => commands::session::run(config, command),

        Commands::Setup { source, json } => {
            commands::bulk::run_source(config, WizardAction::Setup, source, json)
        }

        Commands::Autofix { source, json } => {
            commands::bulk::run_source(config, WizardAction::AutoFixErrorOnly, source, json)
        }

        Commands::Verify { source, json } => {
            commands::bulk::run_source(config, WizardAction::Verify, source, json)
        }

        Commands::Reconcile {
            action,
            source,
            dest,
            status,
            json,
        } => commands::bulk::run_filtered(commands::bulk::FilteredArgs {
            config,
            action,
            source,
            dest,
            status,
            json,
        }),

        Commands::Report { format, out } => commands::report::run(config, format, out),
    }
}
