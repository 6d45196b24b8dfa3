//! Tenant database waits
//!
//! Tenant databases live inside a multi-tenant instance and are addressed
//! by [`TenantDatabaseId`].

use std::time::Duration;

use tracing::debug;

use super::WaitOptions;
use crate::client::{ControlPlaneClient, TenantDatabase, TenantDatabaseId};
use crate::status::TenantDatabaseStatus;
use crate::waiter::{Probe, ProbeResult, Refresh, StateChangeConf, WaitError, WaitResult};

const DELAY: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_secs(10);
const UPDATE_CONTINUOUS_TARGET_OCCURRENCE: u32 = 2;

pub async fn probe_tenant_database(
    client: &ControlPlaneClient,
    id: &TenantDatabaseId,
) -> ProbeResult<TenantDatabase, TenantDatabaseStatus> {
    Ok(match client.describe_tenant_database(id).await? {
        Some(tenant) => {
            let status = tenant.status.clone();
            Probe::found(tenant, status)
        }
        None => Probe::NotFound,
    })
}

fn conf(
    client: &ControlPlaneClient,
    id: &TenantDatabaseId,
    timeout: Duration,
    options: &WaitOptions,
) -> StateChangeConf<impl Refresh<Object = TenantDatabase, Status = TenantDatabaseStatus> + use<>>
{
    let client = client.clone();
    let id = id.clone();
    let refresh = move || {
        let client = client.clone();
        let id = id.clone();
        async move { probe_tenant_database(&client, &id).await }
    };

    options.apply(
        StateChangeConf::new(refresh, timeout)
            .delay(DELAY)
            .poll_interval(POLL_INTERVAL),
    )
}

pub async fn wait_tenant_database_created(
    client: &ControlPlaneClient,
    id: &TenantDatabaseId,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<TenantDatabase> {
    debug!(tenant_database = %id, "waiting for tenant database creation");
    conf(client, id, timeout, &options)
        .pending([TenantDatabaseStatus::Creating])
        .target([TenantDatabaseStatus::Available])
        .wait_for_state()
        .await
}

/// Wait for a modified tenant database to settle
///
/// The control plane can briefly report `available` before a modification
/// starts, so two consecutive observations are required.
pub async fn wait_tenant_database_updated(
    client: &ControlPlaneClient,
    id: &TenantDatabaseId,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<TenantDatabase> {
    debug!(tenant_database = %id, "waiting for tenant database update");
    // the built-in occurrence goes in before the caller's overrides
    let options = WaitOptions {
        continuous_target_occurrence: Some(UPDATE_CONTINUOUS_TARGET_OCCURRENCE),
        ..Default::default()
    }
    .overridden_by(options);

    conf(client, id, timeout, &options)
        .pending([TenantDatabaseStatus::Modifying])
        .target([TenantDatabaseStatus::Available])
        .wait_for_state()
        .await
}

pub async fn wait_tenant_database_deleted(
    client: &ControlPlaneClient,
    id: &TenantDatabaseId,
    timeout: Duration,
    options: WaitOptions,
) -> Result<Option<TenantDatabase>, WaitError<TenantDatabase>> {
    debug!(tenant_database = %id, "waiting for tenant database deletion");
    conf(client, id, timeout, &options)
        .pending([TenantDatabaseStatus::Available, TenantDatabaseStatus::Deleting])
        .wait_until_gone()
        .await
}
