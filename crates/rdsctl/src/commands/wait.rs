//! `rdsctl wait` - block until a resource settles
//!
//! Wraps the core wait workflows with a progress spinner, Ctrl-C handling
//! and CLI output formatting.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rdsctl_core::Operation;
use rdsctl_core::waiter::{WaitEvent, WaitEventCallback};
use rdsctl_core::workflows::{WaitOptions, WaitOutcome, wait_for};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::{OutputFormat, WaitArgs};
use crate::connection::ConnectionManager;
use crate::error::{RdsCtlError, Result as CliResult};
use crate::output::print_output;

pub async fn handle_wait(
    args: &WaitArgs,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    api_url: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    if args.timeout == Some(0) {
        return Err(RdsCtlError::InvalidInput {
            message: "--timeout must be greater than zero".to_string(),
        });
    }

    let (client, connection) = conn_mgr.create_client(profile_name, api_url)?;
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .or_else(|| connection.waiters.timeout_for(args.kind, args.operation));

    let token = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(token.clone()));

    let options = connection
        .waiters
        .wait_options(args.kind)
        .overridden_by(flag_options(args))
        .with_cancel(token);
    debug!(?options, ?timeout, "wait options");

    let label = format!("{} '{}'", args.kind, args.id);
    let spinner = (!args.no_progress).then(|| new_spinner(&label));
    let options = match &spinner {
        Some(pb) => options.with_events(spinner_callback(pb.clone(), label.clone())),
        None => options,
    };

    let result = wait_for(
        &client,
        args.kind,
        args.operation,
        &args.id,
        timeout,
        options,
    )
    .await;
    interrupt.abort();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(pb) = &spinner
                && !pb.is_finished()
            {
                pb.abandon();
            }
            return Err(e.into());
        }
    };
    info!(
        kind = %outcome.kind,
        id = %outcome.id,
        elapsed_secs = outcome.elapsed_secs,
        "wait finished"
    );

    match output_format {
        OutputFormat::Auto => println!("{}", summary(&outcome)),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_output(&outcome, output_format.into())?
        }
    }
    Ok(())
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        debug!("Ctrl-C received, cancelling wait");
        token.cancel();
    }
}

/// Tuning overrides given on the command line
fn flag_options(args: &WaitArgs) -> WaitOptions {
    WaitOptions {
        poll_interval: args.poll_interval.map(Duration::from_secs),
        delay: args.delay.map(Duration::from_secs),
        continuous_target_occurrence: args.occurrence,
        not_found_checks: args.not_found_checks,
        ..WaitOptions::default()
    }
}

fn new_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Waiting for {label}"));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn spinner_callback(pb: ProgressBar, label: String) -> WaitEventCallback {
    Arc::new(move |event: &WaitEvent| match event {
        WaitEvent::Completed { .. } => {
            pb.finish_with_message(format!("\u{2713} {label}"));
        }
        WaitEvent::Failed { error, .. } => {
            pb.abandon_with_message(format!("\u{2717} {label}: {error}"));
        }
        _ => {
            if let Some(message) = event_message(&label, event) {
                pb.set_message(message);
            }
        }
    })
}

/// Spinner text for an in-progress event
fn event_message(label: &str, event: &WaitEvent) -> Option<String> {
    match event {
        WaitEvent::Started { delay, .. } if !delay.is_zero() => Some(format!(
            "{label}: first check in {}s",
            delay.as_secs()
        )),
        WaitEvent::Polling {
            attempt, status, ..
        } => Some(format!("{label}: {status} (check {attempt})")),
        WaitEvent::NotFound {
            attempt,
            consecutive,
            ..
        } => Some(format!(
            "{label}: not found {consecutive} in a row (check {attempt})"
        )),
        _ => None,
    }
}

/// One-line human summary of a finished wait
fn summary(outcome: &WaitOutcome) -> String {
    let label = format!("{} '{}'", outcome.kind, outcome.id);
    let elapsed = format!("{:.1}s", outcome.elapsed_secs);

    if outcome.operation == Operation::Delete {
        return format!("\u{2713} {label} deleted after {elapsed}");
    }

    let status = outcome
        .object
        .as_ref()
        .and_then(|o| o.get("status").or_else(|| o.get("dbInstanceStatus")))
        .and_then(|s| s.as_str())
        .unwrap_or("ready");
    format!("\u{2713} {label} is {status} after {elapsed}")
}
