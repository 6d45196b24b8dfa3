use anyhow::Result;
use clap::Parser;
use rdsctl_core::config::Config;
use tracing::{debug, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::RdsCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let conn_mgr = match load_connection_manager(&cli) {
        Ok(conn_mgr) => conn_mgr,
        Err(e) => {
            e.print_diagnostic();
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over -v
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "rdsctl=warn,rdsctl_core=warn",
            1 => "rdsctl=info,rdsctl_core=info",
            2 => "rdsctl=debug,rdsctl_core=debug",
            _ => "rdsctl=trace,rdsctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    // Logs go to stderr so -o json output stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

fn load_connection_manager(cli: &Cli) -> Result<ConnectionManager, RdsCtlError> {
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    Ok(ConnectionManager::with_config_path(config, config_path))
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), RdsCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let profile = cli.profile.as_deref();
    let api_url = cli.api_url.as_deref();

    let result = match &cli.command {
        Commands::Version => {
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    });
                    output::print_output(&output_data, cli.output.into())?;
                }
                cli::OutputFormat::Auto => {
                    println!("rdsctl {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(())
        }
        Commands::Wait(args) => {
            commands::wait::handle_wait(args, conn_mgr, profile, api_url, cli.output).await
        }
        Commands::Describe { kind, id } => {
            commands::describe::handle_describe(*kind, id, conn_mgr, profile, api_url, cli.output)
                .await
        }
        Commands::Profile(profile_cmd) => {
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output).await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => debug!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Short command description for logs, without secrets
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Wait(args) => format!("wait {} {} --for {}", args.kind, args.id, args.operation),
        Commands::Describe { kind, id } => format!("describe {kind} {id}"),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name.as_deref().unwrap_or("")),
            }
        }
    }
}
