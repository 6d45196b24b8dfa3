//! Blue/green deployment waits
//!
//! A deployment stages a copy of a database, then swaps it in during a
//! switchover. When a switchover goes wrong the deployment lands in
//! `INVALID_CONFIGURATION` or `SWITCHOVER_FAILED` and the reason is only
//! available in its status details, so the switchover waits surface those
//! details as [`BlueGreenError::Failed`].

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::WaitOptions;
use crate::client::{BlueGreenDeployment, ControlPlaneClient};
use crate::status::BlueGreenDeploymentStatus;
use crate::waiter::{Probe, ProbeResult, Refresh, StateChangeConf, WaitError, WaitResult};

const POLL_INTERVAL: Duration = Duration::from_secs(10);
const DELAY: Duration = Duration::from_secs(60);

/// Statuses a deployment passes through on its way back to `AVAILABLE`
pub const BLUE_GREEN_SETTLE_PENDING: [BlueGreenDeploymentStatus; 6] = [
    BlueGreenDeploymentStatus::Provisioning,
    BlueGreenDeploymentStatus::SwitchoverInProgress,
    BlueGreenDeploymentStatus::SwitchoverCompleted,
    BlueGreenDeploymentStatus::InvalidConfiguration,
    BlueGreenDeploymentStatus::SwitchoverFailed,
    BlueGreenDeploymentStatus::Deleting,
];

pub const BLUE_GREEN_DELETE_PENDING: [BlueGreenDeploymentStatus; 7] = [
    BlueGreenDeploymentStatus::Provisioning,
    BlueGreenDeploymentStatus::Available,
    BlueGreenDeploymentStatus::SwitchoverInProgress,
    BlueGreenDeploymentStatus::SwitchoverCompleted,
    BlueGreenDeploymentStatus::InvalidConfiguration,
    BlueGreenDeploymentStatus::SwitchoverFailed,
    BlueGreenDeploymentStatus::Deleting,
];

/// A blue/green wait that failed
#[derive(Error, Debug)]
pub enum BlueGreenError {
    /// The deployment reached a failed status; `details` is the reason it gave
    #[error("blue/green deployment '{id}' is {status}: {details}")]
    Failed {
        id: String,
        status: BlueGreenDeploymentStatus,
        details: String,
        deployment: Box<BlueGreenDeployment>,
    },

    #[error(transparent)]
    Wait(#[from] WaitError<BlueGreenDeployment>),
}

impl BlueGreenError {
    /// The deployment as last observed, if the error carries it
    pub fn deployment(&self) -> Option<&BlueGreenDeployment> {
        match self {
            BlueGreenError::Failed { deployment, .. } => Some(deployment.as_ref()),
            BlueGreenError::Wait(e) => e.last_object(),
        }
    }
}

pub async fn probe_blue_green_deployment(
    client: &ControlPlaneClient,
    id: &str,
) -> ProbeResult<BlueGreenDeployment, BlueGreenDeploymentStatus> {
    Ok(match client.describe_blue_green_deployment(id).await? {
        Some(deployment) => {
            let status = deployment.status.clone();
            Probe::found(deployment, status)
        }
        None => Probe::NotFound,
    })
}

fn conf(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: &WaitOptions,
) -> StateChangeConf<
    impl Refresh<Object = BlueGreenDeployment, Status = BlueGreenDeploymentStatus> + use<>,
> {
    let client = client.clone();
    let id = id.to_string();
    let refresh = move || {
        let client = client.clone();
        let id = id.clone();
        async move { probe_blue_green_deployment(&client, &id).await }
    };

    options.apply(
        StateChangeConf::new(refresh, timeout)
            .poll_interval(POLL_INTERVAL)
            .delay(DELAY),
    )
}

/// Attach the deployment's own explanation when it stopped in a failed status
fn with_status_details(id: &str, err: WaitError<BlueGreenDeployment>) -> BlueGreenError {
    match err {
        WaitError::UnexpectedState { object, .. } if object.status.is_failed() => {
            let details = object
                .status_details
                .clone()
                .unwrap_or_else(|| "no status details reported".to_string());
            warn!(
                deployment = id,
                status = %object.status,
                %details,
                "blue/green deployment failed"
            );
            BlueGreenError::Failed {
                id: id.to_string(),
                status: object.status.clone(),
                details,
                deployment: Box::new(object),
            }
        }
        other => BlueGreenError::Wait(other),
    }
}

/// Wait for a new deployment to finish provisioning its green copy
pub async fn wait_blue_green_deployment_available(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<BlueGreenDeployment> {
    debug!(deployment = id, "waiting for blue/green deployment to be available");
    conf(client, id, timeout, &options)
        .pending([BlueGreenDeploymentStatus::Provisioning])
        .target([BlueGreenDeploymentStatus::Available])
        .wait_for_state()
        .await
}

/// Wait for a deployment to come back to `AVAILABLE` from any status
pub async fn wait_blue_green_deployment_settled(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> WaitResult<BlueGreenDeployment> {
    debug!(deployment = id, "waiting for blue/green deployment to settle");
    conf(client, id, timeout, &options)
        .pending(BLUE_GREEN_SETTLE_PENDING)
        .target([BlueGreenDeploymentStatus::Available])
        .wait_for_state()
        .await
}

/// Wait for a requested switchover to be picked up
pub async fn wait_blue_green_switchover_started(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> Result<BlueGreenDeployment, BlueGreenError> {
    debug!(deployment = id, "waiting for blue/green switchover to start");
    conf(client, id, timeout, &options)
        .pending([BlueGreenDeploymentStatus::Available])
        .target([BlueGreenDeploymentStatus::SwitchoverInProgress])
        .wait_for_state()
        .await
        .map_err(|e| with_status_details(id, e))
}

/// Wait for a switchover to complete
///
/// Fails with [`BlueGreenError::Failed`] carrying the status details when
/// the deployment ends in `INVALID_CONFIGURATION` or `SWITCHOVER_FAILED`.
pub async fn wait_blue_green_switchover_completed(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> Result<BlueGreenDeployment, BlueGreenError> {
    debug!(deployment = id, "waiting for blue/green switchover to complete");
    conf(client, id, timeout, &options)
        .pending([
            BlueGreenDeploymentStatus::Available,
            BlueGreenDeploymentStatus::SwitchoverInProgress,
        ])
        .target([BlueGreenDeploymentStatus::SwitchoverCompleted])
        .wait_for_state()
        .await
        .map_err(|e| with_status_details(id, e))
}

pub async fn wait_blue_green_deployment_deleted(
    client: &ControlPlaneClient,
    id: &str,
    timeout: Duration,
    options: WaitOptions,
) -> Result<Option<BlueGreenDeployment>, WaitError<BlueGreenDeployment>> {
    debug!(deployment = id, "waiting for blue/green deployment deletion");
    conf(client, id, timeout, &options)
        .pending(BLUE_GREEN_DELETE_PENDING)
        .wait_until_gone()
        .await
}
