//! Profile inspection commands

use colored::Colorize;
use comfy_table::{Cell, Table};
use rdsctl_core::config::Profile;
use serde_json::{Value, json};
use tracing::{debug, info, trace};

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{RdsCtlError, Result as CliResult};
use crate::output::print_output;

pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    match profile_cmd {
        ProfileCommands::List => handle_list(conn_mgr, output_format),
        ProfileCommands::Path => handle_path(conn_mgr, output_format),
        ProfileCommands::Show { name } => handle_show(conn_mgr, name.as_deref(), output_format),
    }
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let config_path = conn_mgr.effective_config_path();
    let default = conn_mgr.config.default_profile.as_deref();

    if output_format != OutputFormat::Auto {
        let profile_list: Vec<Value> = profiles
            .iter()
            .map(|(name, profile)| {
                json!({
                    "name": name,
                    "api_url": profile.api_url,
                    "region": profile.region,
                    "is_default": default == Some(name.as_str()),
                    "waiter_overrides": !profile.waiters.is_empty(),
                })
            })
            .collect();

        let output_data = json!({
            "config_path": config_path.map(|p| p.display().to_string()),
            "profiles": profile_list,
            "count": profiles.len(),
        });
        print_output(&output_data, output_format.into())?;
        return Ok(());
    }

    if let Some(path) = &config_path {
        println!("Configuration file: {}", path.display());
        println!();
    }

    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Add a [profiles.<name>] section with an api_url to the configuration file.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "API URL", "Region", "Waiters"]);
    for (name, profile) in &profiles {
        let label = if default == Some(name.as_str()) {
            format!("{name} *")
        } else {
            name.to_string()
        };
        let waiters = if profile.waiters.is_empty() {
            "defaults"
        } else {
            "custom"
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(&profile.api_url),
            Cell::new(profile.region.as_deref().unwrap_or("-")),
            Cell::new(waiters),
        ]);
    }
    println!("{table}");
    if default.is_some() {
        println!("{}", "* default profile".dimmed());
    }
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let config_path = conn_mgr.effective_config_path().ok_or_else(|| {
        RdsCtlError::Config("could not determine configuration directory".to_string())
    })?;

    match output_format {
        OutputFormat::Auto => println!("{}", config_path.display()),
        OutputFormat::Json | OutputFormat::Yaml => {
            let output_data = json!({ "config_path": config_path.display().to_string() });
            print_output(&output_data, output_format.into())?;
        }
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    let name = conn_mgr.config.resolve_profile(name)?;
    let profile = conn_mgr.config.profile(&name)?;
    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name.as_str());

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let output_data = profile_json(&name, profile, is_default)?;
            print_output(&output_data, output_format.into())?;
        }
        OutputFormat::Auto => {
            println!("Profile: {}{}", name, if is_default { " (default)" } else { "" });
            println!("API URL: {}", profile.api_url);
            if let Some(region) = &profile.region {
                println!("Region: {region}");
            }
            match &profile.api_key {
                Some(key) => println!("API Key: {}", key_preview(key)),
                None => println!("API Key: (not set)"),
            }
            if profile.waiters.is_empty() {
                println!("Waiters: built-in defaults");
            } else {
                let waiters = toml::to_string_pretty(&profile.waiters)
                    .map_err(|e| RdsCtlError::OutputError { message: e.to_string() })?;
                println!("Waiters:");
                for line in waiters.lines() {
                    println!("  {line}");
                }
            }
        }
    }
    Ok(())
}

fn profile_json(name: &str, profile: &Profile, is_default: bool) -> CliResult<Value> {
    let mut data = json!({
        "name": name,
        "api_url": profile.api_url,
        "region": profile.region,
        "is_default": is_default,
        "api_key_configured": profile.api_key.is_some(),
    });
    if let Some(key) = &profile.api_key {
        data["api_key_preview"] = json!(key_preview(key));
    }
    if !profile.waiters.is_empty() {
        data["waiters"] = serde_json::to_value(&profile.waiters)
            .map_err(|e| RdsCtlError::OutputError { message: e.to_string() })?;
    }
    Ok(data)
}

/// First few characters of a secret, never the whole thing
fn key_preview(key: &str) -> String {
    let shown: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{shown}...")
    }
}
