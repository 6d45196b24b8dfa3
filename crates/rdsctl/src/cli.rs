//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};
use rdsctl_core::{Operation, ResourceKind};

/// Wait for relational-database control-plane resources to settle
#[derive(Parser, Debug)]
#[command(name = "rdsctl")]
#[command(
    version,
    about = "Wait for database clusters, instances, snapshots and tenant databases to settle"
)]
#[command(long_about = "
Wait for database clusters, instances, snapshots and tenant databases to settle

Mutating calls on the control plane return immediately. rdsctl polls the
describe API until the resource reaches the state the operation promised.

EXAMPLES:
    # Block until a new instance is available
    rdsctl wait db-instance orders-1 --for create

    # Wait for a cluster to be gone, giving up after 30 minutes
    rdsctl wait cluster orders --for delete --timeout 1800

    # Tenant databases are addressed as <instance>/<name>
    rdsctl wait tenant-database mt-1/orders --for update

    # A blue/green update waits for the switchover to complete
    rdsctl wait blue-green bgd-1234 --for update

    # Look at the current state
    rdsctl describe snapshot nightly -o yaml

    # Point at an endpoint without a profile
    RDSCTL_API_URL=http://localhost:8080 rdsctl describe instance orders-1

For more help on a specific command, run:
    rdsctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "RDSCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "RDSCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Control-plane API URL, overriding the profile
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for a create, update or delete to finish
    #[command(after_help = "EXAMPLES:
    rdsctl wait db-cluster orders --for create
    rdsctl wait instance orders-1 --for update --poll-interval 30
    rdsctl wait snapshot nightly --for delete --no-progress -o json
    rdsctl wait blue-green bgd-1234 --for update --timeout 7200

Exit status is 0 once the resource settles, 1 on failure and 130 when
interrupted with Ctrl-C.
")]
    Wait(WaitArgs),

    /// Describe a resource
    Describe {
        /// Resource kind
        #[arg(value_enum)]
        kind: ResourceKind,

        /// Resource identifier (tenant databases: <instance>/<name>)
        id: String,
    },

    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver")]
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Resource kind
    #[arg(value_enum)]
    pub kind: ResourceKind,

    /// Resource identifier (tenant databases: <instance>/<name>)
    pub id: String,

    /// Operation to wait for
    #[arg(long = "for", value_enum)]
    pub operation: Operation,

    /// Maximum time to wait in seconds (defaults per resource and operation)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Fixed polling interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Seconds to sleep before the first check
    #[arg(long)]
    pub delay: Option<u64>,

    /// Consecutive target observations required
    #[arg(long)]
    pub occurrence: Option<u32>,

    /// Consecutive not-found results tolerated
    #[arg(long)]
    pub not_found_checks: Option<u32>,

    /// Do not show a progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the configuration file path
    Path,

    /// Show one profile
    Show {
        /// Profile name (defaults to the resolved profile)
        name: Option<String>,
    },
}
