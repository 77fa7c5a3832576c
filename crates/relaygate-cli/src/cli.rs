use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "relaygate",
    about = "Relaygate: cross-chain route provisioning and reconciliation",
    version
)]
pub struct Cli {
    /// Path to the control-plane config
    #[arg(long, global = true, default_value = "relaygate.toml")]
    pub config: String,

    /// Log engine activity to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the route matrix and list routes
    Routes {
        /// Only routes from this source chain
        #[arg(long)]
        source: Option<String>,

        /// Only routes to this destination chain
        #[arg(long)]
        dest: Option<String>,

        /// Only routes with this overall status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-bridge preflight for one route, with the next recommended action
    Preflight {
        /// Source chain ID
        source: String,

        /// Destination chain ID
        dest: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recommend the next action for a set of preflight checks
    Recommend {
        #[arg(long)]
        adapter_registered: bool,

        #[arg(long)]
        route_configured: bool,

        #[arg(long)]
        fee_quote_healthy: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manual provisioning session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Auto-fix then recheck every route from a source chain
    Setup {
        /// Source chain ID
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Auto-fix then recheck the routes from a source chain in ERROR
    Autofix {
        /// Source chain ID
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recheck routes from a source chain without mutating them
    Verify {
        /// Source chain ID
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a bulk action over the routes matching a filter
    Reconcile {
        #[arg(long, value_enum)]
        action: ActionArg,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        dest: Option<String>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the last wizard report
    Report {
        #[arg(long, value_enum, default_value = "markdown")]
        format: ReportFormatArg,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Print the session
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the selected route or bridge (resets progress on change)
    Select {
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        dest: Option<String>,

        /// hyperbridge, ccip, layerzero or 0-2
        #[arg(long)]
        bridge: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one step (1 register adapter, 2 set default bridge,
    /// 3 configure protocol, 4 verify)
    Step {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        number: u8,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clear all step progress, keeping the selection
    Reset {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Ready,
    Error,
    Unknown,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ActionArg {
    Setup,
    Autofix,
    Verify,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Json,
    Markdown,
}
