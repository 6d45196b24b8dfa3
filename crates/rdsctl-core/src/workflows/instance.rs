//! Database instance waits
//!
//! Instances flap between `available` and maintenance statuses right after
//! creation, so the target has to be seen three probes in a row.

use std::time::Duration;

use tracing::debug;

use super::WaitOptions;
use crate::client::{ControlPlaneClient, DbInstance};
use crate::status::InstanceStatus;
use crate::waiter::{Probe, ProbeResult, Refresh, StateChangeConf, WaitError, WaitResult};

const POLL_INTERVAL: Duration = Duration::from_secs(10);
const DELAY: Duration = Duration::from_secs(60);
const CONTINUOUS_TARGET_OCCURRENCE: u32 = 3;

pub const INSTANCE_AVAILABLE_PENDING: [InstanceStatus; 15] = [
    InstanceStatus::BackingUp,
    InstanceStatus::ConfiguringEnhancedMonitoring,
    InstanceStatus::ConfiguringIamDatabaseAuth,
    InstanceStatus::ConfiguringLogExports,
    InstanceStatus::Creating,
    InstanceStatus::Maintenance,
    InstanceStatus::Modifying,
    InstanceStatus::MovingToVpc,
    InstanceStatus::Rebooting,
    InstanceStatus::Renaming,
    InstanceStatus::ResettingMasterCredentials,
    InstanceStatus::Starting,
    InstanceStatus::Stopping,
    InstanceStatus::StorageFull,
    InstanceStatus::Upgrading,
];

pub const INSTANCE_AVAILABLE_TARGET: [InstanceStatus; 2] = [
    InstanceStatus::Available,
    InstanceStatus::StorageOptimization,
];

pub const INSTANCE_DELETE_PENDING: [InstanceStatus; 14] = [
    InstanceStatus::Available,
    InstanceStatus::BackingUp,
    InstanceStatus::ConfiguringEnhancedMonitoring,
    InstanceStatus::ConfiguringLogExports,
    InstanceStatus::Creating,
    InstanceStatus::DeletePrecheck,
    InstanceStatus::Deleting,
    InstanceStatus::IncompatibleParameters,
    InstanceStatus::IncompatibleRestore,
    InstanceStatus::Modifying,
    InstanceStatus::Starting,
    InstanceStatus::Stopping,
    InstanceStatus::StorageFull,
    InstanceStatus::StorageOptimization,
];

pub async fn probe_db_instance(
    client: &ControlPlaneClient,
    id: &str,
) -> ProbeResult<DbInstance, InstanceStatus> {
    Ok(match client.describe_db_instance(id).await? {
        Some(instance) => {
            let status = instance.db_instance_status.clone();
            Probe::found(instance, status)
        }
        None => Probe::NotFound,
    })
}

fn conf(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: &WaitOptions,
) -> StateChangeConf<impl Refresh<Object = DbInstance, Status = InstanceStatus> + use<>> {
    let client = client.clone();
    let id = id.to_string();
    let refresh = move || {
        let client = client.clone();
        let id = id.clone();
        async move { probe_db_instance(&client, &id).await }
    };

    options.apply(
        StateChangeConf::new(refresh, timeout)
            .poll_interval(POLL_INTERVAL)
            .delay(DELAY)
            .continuous_target_occurrence(CONTINUOUS_TARGET_OCCURRENCE),
    )
}

/// Wait for an instance to become available after a create or modify
pub async fn wait_db_instance_available(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<DbInstance> {
    debug!(instance = id, "waiting for DB instance to become available");
    conf(client, id, timeout, &options)
        .pending(INSTANCE_AVAILABLE_PENDING)
        .target(INSTANCE_AVAILABLE_TARGET)
        .wait_for_state()
        .await
}

pub async fn wait_db_instance_deleted(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> Result<Option<DbInstance>, WaitError<DbInstance>> {
    debug!(instance = id, "waiting for DB instance deletion");
    conf(client, id, timeout, &options)
        .pending(INSTANCE_DELETE_PENDING)
        .wait_until_gone()
        .await
}
