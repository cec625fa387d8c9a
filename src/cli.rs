// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "glaukos")]
#[command(about = "Zero-downtime blue-green promotion for containerized services")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new glaukos.yml configuration file
    Init {
        /// Service name
        #[arg(long)]
        service: Option<String>,

        /// Container image
        #[arg(long)]
        image: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Promote the standby color to the traffic-serving role
    Promote {
        /// Break an existing promotion lock
        #[arg(long)]
        force: bool,

        /// On a pre-switch abort, leave the standby running for inspection
        #[arg(long)]
        keep_standby: bool,

        /// Minimal output (CI)
        #[arg(long, conflicts_with = "json")]
        quiet: bool,

        /// JSON output for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the active color and the promotion target
    Status,

    /// Roll back to the previous color (not implemented)
    Rollback,
}
