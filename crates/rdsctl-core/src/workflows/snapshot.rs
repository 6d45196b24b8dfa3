use std::time::Duration;

use tracing::debug;

use super::WaitOptions;
use crate::client::{ControlPlaneClient, DbSnapshot};
use crate::status::SnapshotStatus;
use crate::waiter::{Probe, ProbeResult, Refresh, StateChangeConf, WaitError, WaitResult};

const DELAY: Duration = Duration::from_secs(5);
const MIN_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn probe_db_snapshot(
    client: &ControlPlaneClient,
    id: &str,
) -> ProbeResult<DbSnapshot, SnapshotStatus> {
    Ok(match client.describe_db_snapshot(id).await? {
        Some(snapshot) => {
            let status = snapshot.status.clone();
            Probe::found(snapshot, status)
        }
        None => Probe::NotFound,
    })
}

fn conf(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: &WaitOptions,
) -> StateChangeConf<impl Refresh<Object = DbSnapshot, Status = SnapshotStatus> + use<>> {
    let client = client.clone();
    let id = id.to_string();
    let refresh = move || {
        let client = client.clone();
        let id = id.clone();
        async move { probe_db_snapshot(&client, &id).await }
    };

    options.apply(
        StateChangeConf::new(refresh, timeout)
            .delay(DELAY)
            .min_timeout(MIN_TIMEOUT),
    )
}

pub async fn wait_db_snapshot_created(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<DbSnapshot> {
    debug!(snapshot = id, "waiting for DB snapshot creation");
    conf(client, id, timeout, &options)
        .pending([SnapshotStatus::Creating])
        .target([SnapshotStatus::Available])
        .wait_for_state()
        .await
}

pub async fn wait_db_snapshot_deleted(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> Result<Option<DbSnapshot>, WaitError<DbSnapshot>> {
    debug!(snapshot = id, "waiting for DB snapshot deletion");
    conf(client, id, timeout, &options)
        .pending([SnapshotStatus::Available, SnapshotStatus::Deleting])
        .wait_until_gone()
        .await
}
