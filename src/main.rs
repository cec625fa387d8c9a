// ABOUTME: Entry point for the glaukos CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use glaukos::config::{self, Config};
use glaukos::error::{Error, Result};
use glaukos::output::{Output, OutputMode};
use glaukos::promote::{PromoteOptions, run_promotion};
use glaukos::proxy::ProxyConfigStore;
use glaukos::runtime::BollardRuntime;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init {
            service,
            image,
            force,
        } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, service.as_deref(), image.as_deref(), force)
        }
        Commands::Promote {
            force,
            keep_standby,
            quiet,
            json,
        } => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;

            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Normal
            };

            promote(config, PromoteOptions { force, keep_standby }, Output::new(mode)).await
        }
        Commands::Status => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            status(config).await
        }
        Commands::Rollback => Err(Error::RollbackUnimplemented),
    }
}

/// Run the full promotion state machine and print its report.
async fn promote(config: Config, options: PromoteOptions, output: Output) -> Result<()> {
    let runtime = BollardRuntime::connect(config.runtime.socket.as_deref())
        .map_err(|e| Error::RuntimeConnection(e.to_string()))?;

    output.progress(&format!(
        "Promoting standby of {} ({})",
        config.service, config.image
    ));

    let report = run_promotion(&config, &runtime, options).await?;
    output.report(&report);
    Ok(())
}

/// Print the active color and the color a promotion would activate.
/// Reads the proxy config only; mutates nothing.
async fn status(config: Config) -> Result<()> {
    let store = ProxyConfigStore::from_config(&config);
    let active = store.read_active_color().await?;

    println!("Service: {}", config.service);
    println!("Active color: {} ({})", active, config.address(active));
    println!(
        "Next promotion target: {} ({})",
        active.opposite(),
        config.address(active.opposite())
    );
    Ok(())
}
