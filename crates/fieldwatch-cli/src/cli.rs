//! Command-line arguments.

use clap::{Args, Parser, Subcommand};

/// Fieldwatch - crop disease outbreak map
#[derive(Parser, Debug)]
#[command(name = "fieldwatch")]
#[command(version, about = "Crop disease outbreak map and report sync", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the report persistence server
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Follow the outbreak map and print every change
    Watch {
        /// Print views as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report a detection at a given position
    Report(ReportArgs),
    /// Fetch reports once and print the zones
    Clusters {
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
        /// Also print one line per member report
        #[arg(short, long)]
        details: bool,
    },
    /// Delete every stored report
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Manage the configuration file
    Config {
        /// Config operation
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `fieldwatch report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
    /// Disease label, e.g. "Late blight"
    #[arg(long, conflicts_with = "class", required_unless_present = "class")]
    pub disease: Option<String>,
    /// Raw classifier class, e.g. "Tomato___Late_blight"; gated by confidence
    #[arg(long)]
    pub class: Option<String>,
    /// Classifier confidence in [0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub confidence: f64,
    /// Reporter (overrides sync.user_id)
    #[arg(long)]
    pub user: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file (defaults to the standard location)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env` flags for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
