//! Database cluster waits
//!
//! Create, update and delete waits back off from a 10s floor. The available
//! wait used around blue/green switchovers polls every 10s and needs the
//! target three checks in a row.

use std::time::Duration;

use tracing::debug;

use super::WaitOptions;
use crate::client::{ControlPlaneClient, DbCluster};
use crate::status::ClusterStatus;
use crate::waiter::{Probe, ProbeResult, Refresh, StateChangeConf, WaitError, WaitResult};

const DELAY: Duration = Duration::from_secs(30);
const MIN_TIMEOUT: Duration = Duration::from_secs(10);

const AVAILABLE_POLL_INTERVAL: Duration = Duration::from_secs(10);
const AVAILABLE_DELAY: Duration = Duration::from_secs(60);
const AVAILABLE_CONTINUOUS_TARGET_OCCURRENCE: u32 = 3;

pub const CLUSTER_CREATE_PENDING: [ClusterStatus; 7] = [
    ClusterStatus::BackingUp,
    ClusterStatus::Creating,
    ClusterStatus::Migrating,
    ClusterStatus::Modifying,
    ClusterStatus::PreparingDataMigration,
    ClusterStatus::Rebooting,
    ClusterStatus::ResettingMasterCredentials,
];

pub const CLUSTER_UPDATE_PENDING: [ClusterStatus; 7] = [
    ClusterStatus::BackingUp,
    ClusterStatus::ConfiguringIamDatabaseAuth,
    ClusterStatus::Modifying,
    ClusterStatus::Renaming,
    ClusterStatus::ResettingMasterCredentials,
    ClusterStatus::ScalingCompute,
    ClusterStatus::Upgrading,
];

pub const CLUSTER_DELETE_PENDING: [ClusterStatus; 4] = [
    ClusterStatus::Available,
    ClusterStatus::BackingUp,
    ClusterStatus::Deleting,
    ClusterStatus::Modifying,
];

pub const CLUSTER_AVAILABLE_PENDING: [ClusterStatus; 12] = [
    ClusterStatus::BackingUp,
    ClusterStatus::ConfiguringIamDatabaseAuth,
    ClusterStatus::Creating,
    ClusterStatus::Deleting,
    ClusterStatus::Migrating,
    ClusterStatus::Modifying,
    ClusterStatus::PreparingDataMigration,
    ClusterStatus::Rebooting,
    ClusterStatus::Renaming,
    ClusterStatus::ResettingMasterCredentials,
    ClusterStatus::ScalingCompute,
    ClusterStatus::Upgrading,
];

/// Describe a cluster and report its status
pub async fn probe_db_cluster(
    client: &ControlPlaneClient,
    id: &str,
) -> ProbeResult<DbCluster, ClusterStatus> {
    match client.describe_db_cluster(id).await? {
        Some(cluster) => {
            let status = cluster.status.clone();
            Ok(Probe::found(cluster, status))
        }
        None => Ok(Probe::NotFound),
    }
}

fn refresh(
    client: &ControlPlaneClient,
    id: &str,
) -> impl Refresh<Object = DbCluster, Status = ClusterStatus> + use<> {
    let client = client.clone();
    let id = id.to_string();
    move || {
        let client = client.clone();
        let id = id.clone();
        async move { probe_db_cluster(&client, &id).await }
    }
}

fn conf(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: &WaitOptions,
) -> StateChangeConf<impl Refresh<Object = DbCluster, Status = ClusterStatus> + use<>> {
    options.apply(
        StateChangeConf::new(refresh(client, id), timeout)
            .delay(DELAY)
            .min_timeout(MIN_TIMEOUT),
    )
}

/// Wait for a new cluster to become available
pub async fn wait_db_cluster_created(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<DbCluster> {
    debug!(cluster = id, "waiting for DB cluster creation");
    conf(client, id, timeout, &options)
        .pending(CLUSTER_CREATE_PENDING)
        .target([ClusterStatus::Available])
        .wait_for_state()
        .await
}

/// Wait for a modified cluster to settle back to available
pub async fn wait_db_cluster_updated(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<DbCluster> {
    debug!(cluster = id, "waiting for DB cluster update");
    conf(client, id, timeout, &options)
        .pending(CLUSTER_UPDATE_PENDING)
        .target([ClusterStatus::Available])
        .wait_for_state()
        .await
}

/// Wait for a cluster to be available and stay that way for three checks
///
/// Tolerates every transitional status, including `deleting` of the old
/// members while a switchover finishes.
pub async fn wait_db_cluster_available(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<DbCluster> {
    debug!(cluster = id, "waiting for DB cluster to be available");
    let conf = StateChangeConf::new(refresh(client, id), timeout)
        .poll_interval(AVAILABLE_POLL_INTERVAL)
        .delay(AVAILABLE_DELAY)
        .continuous_target_occurrence(AVAILABLE_CONTINUOUS_TARGET_OCCURRENCE);

    options
        .apply(conf)
        .pending(CLUSTER_AVAILABLE_PENDING)
        .target([ClusterStatus::Available])
        .wait_for_state()
        .await
}

/// Wait for a cluster to disappear
///
/// Returns the last description seen before it went away.
pub async fn wait_db_cluster_deleted(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> Result<Option<DbCluster>, WaitError<DbCluster>> {
    debug!(cluster = id, "waiting for DB cluster deletion");
    conf(client, id, timeout, &options)
        .pending(CLUSTER_DELETE_PENDING)
        .wait_until_gone()
        .await
}
