//! `rdsctl describe` - show the current state of a resource

use rdsctl_core::ResourceKind;
use tracing::debug;

use crate::cli::OutputFormat;
use crate::connection::ConnectionManager;
use crate::error::{RdsCtlError, Result as CliResult};
use crate::output::print_output;

pub async fn handle_describe(
    kind: ResourceKind,
    id: &str,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    api_url: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    let (client, _) = conn_mgr.create_client(profile_name, api_url)?;
    debug!(%kind, id, "describing resource");

    let object = client
        .describe(kind, id)
        .await?
        .ok_or_else(|| RdsCtlError::ResourceNotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        })?;

    print_output(&object, output_format.into())?;
    Ok(())
}
