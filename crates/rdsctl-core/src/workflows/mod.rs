//! Wait workflows - per-resource state waits
//!
//! Each workflow pairs a status probe with the pending/target sets and
//! tuning for one resource operation, then runs the generic waiter. Tuning
//! can be overridden through [`WaitOptions`].

mod blue_green;
mod cluster;
mod instance;
mod snapshot;
mod tenant_database;

pub use blue_green::{
    BLUE_GREEN_DELETE_PENDING, BLUE_GREEN_SETTLE_PENDING, BlueGreenError,
    probe_blue_green_deployment, wait_blue_green_deployment_available,
    wait_blue_green_deployment_deleted, wait_blue_green_deployment_settled,
    wait_blue_green_switchover_completed, wait_blue_green_switchover_started,
};
pub use cluster::{
    CLUSTER_AVAILABLE_PENDING, CLUSTER_CREATE_PENDING, CLUSTER_DELETE_PENDING,
    CLUSTER_UPDATE_PENDING, probe_db_cluster, wait_db_cluster_available, wait_db_cluster_created,
    wait_db_cluster_deleted, wait_db_cluster_updated,
};
pub use instance::{
    INSTANCE_AVAILABLE_PENDING, INSTANCE_AVAILABLE_TARGET, INSTANCE_DELETE_PENDING,
    probe_db_instance, wait_db_instance_available, wait_db_instance_deleted,
};
pub use snapshot::{probe_db_snapshot, wait_db_snapshot_created, wait_db_snapshot_deleted};
pub use tenant_database::{
    probe_tenant_database, wait_tenant_database_created, wait_tenant_database_deleted,
    wait_tenant_database_updated,
};

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::{ControlPlaneClient, TenantDatabaseId};
use crate::error::{CoreError, Result};
use crate::resource::{Operation, ResourceKind};
use crate::waiter::{Refresh, StateChangeConf, WaitEventCallback};

/// Overrides for a workflow's built-in tuning
///
/// Unset fields keep the workflow default.
#[derive(Clone, Default)]
pub struct WaitOptions {
    pub poll_interval: Option<Duration>,
    pub delay: Option<Duration>,
    pub min_timeout: Option<Duration>,
    pub continuous_target_occurrence: Option<u32>,
    pub not_found_checks: Option<u32>,
    pub cancel: Option<CancellationToken>,
    pub on_event: Option<WaitEventCallback>,
}

impl fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitOptions")
            .field("poll_interval", &self.poll_interval)
            .field("delay", &self.delay)
            .field("min_timeout", &self.min_timeout)
            .field(
                "continuous_target_occurrence",
                &self.continuous_target_occurrence,
            )
            .field("not_found_checks", &self.not_found_checks)
            .field("cancel", &self.cancel.is_some())
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

impl WaitOptions {
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_events(mut self, callback: WaitEventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Layer `other` on top of `self`; set fields in `other` win
    pub fn overridden_by(self, other: WaitOptions) -> Self {
        WaitOptions {
            poll_interval: other.poll_interval.or(self.poll_interval),
            delay: other.delay.or(self.delay),
            min_timeout: other.min_timeout.or(self.min_timeout),
            continuous_target_occurrence: other
                .continuous_target_occurrence
                .or(self.continuous_target_occurrence),
            not_found_checks: other.not_found_checks.or(self.not_found_checks),
            cancel: other.cancel.or(self.cancel),
            on_event: other.on_event.or(self.on_event),
        }
    }

    /// Apply the overrides to a poll configuration
    pub fn apply<R>(&self, mut conf: StateChangeConf<R>) -> StateChangeConf<R>
    where
        R: Refresh,
        R::Object: fmt::Debug,
    {
        if let Some(interval) = self.poll_interval {
            conf = conf.poll_interval(interval);
        }
        if let Some(delay) = self.delay {
            conf = conf.delay(delay);
        }
        if let Some(min_timeout) = self.min_timeout {
            conf = conf.min_timeout(min_timeout);
        }
        if let Some(occurrences) = self.continuous_target_occurrence {
            conf = conf.continuous_target_occurrence(occurrences);
        }
        if let Some(checks) = self.not_found_checks {
            conf = conf.not_found_checks(checks);
        }
        if let Some(token) = &self.cancel {
            conf = conf.cancel_on(token.clone());
        }
        if let Some(callback) = &self.on_event {
            conf = conf.on_event(callback.clone());
        }
        conf
    }
}

/// Result of a generic wait
#[derive(Debug, Clone, Serialize)]
pub struct WaitOutcome {
    pub kind: ResourceKind,
    pub operation: Operation,
    pub id: String,
    pub elapsed_secs: f64,
    /// The object when the wait finished; for deletes, the last object seen
    pub object: Option<serde_json::Value>,
}

/// Wait for `operation` on the `kind` object `id` to settle
///
/// `timeout` defaults to the kind's built-in timeout for the operation.
/// Tenant database ids are `instance/name`. For blue/green deployments an
/// update is a switchover.
pub async fn wait_for(
    client: &ControlPlaneClient,
    kind: ResourceKind,
    operation: Operation,
    id: &str,
    timeout: Option<Duration>,
    options: WaitOptions,
) -> Result<WaitOutcome> {
    let unsupported = || CoreError::Unsupported { kind, operation };
    let timeout = timeout
        .or_else(|| kind.default_timeout(operation))
        .ok_or_else(unsupported)?;

    info!(%kind, %operation, id, ?timeout, "waiting for resource");
    let started = Instant::now();

    let object = match (kind, operation) {
        (ResourceKind::DbCluster, Operation::Create) => to_json(Some(
            wait_db_cluster_created(client, id, timeout, options).await?,
        ))?,
        (ResourceKind::DbCluster, Operation::Update) => to_json(Some(
            wait_db_cluster_updated(client, id, timeout, options).await?,
        ))?,
        (ResourceKind::DbCluster, Operation::Delete) => {
            to_json(wait_db_cluster_deleted(client, id, timeout, options).await?)?
        }
        (ResourceKind::DbInstance, Operation::Create | Operation::Update) => to_json(Some(
            wait_db_instance_available(client, id, timeout, options).await?,
        ))?,
        (ResourceKind::DbInstance, Operation::Delete) => {
            to_json(wait_db_instance_deleted(client, id, timeout, options).await?)?
        }
        (ResourceKind::DbSnapshot, Operation::Create) => to_json(Some(
            wait_db_snapshot_created(client, id, timeout, options).await?,
        ))?,
        (ResourceKind::DbSnapshot, Operation::Delete) => {
            to_json(wait_db_snapshot_deleted(client, id, timeout, options).await?)?
        }
        (ResourceKind::TenantDatabase, _) => {
            let tenant: TenantDatabaseId = id.parse()?;
            match operation {
                Operation::Create => to_json(Some(
                    wait_tenant_database_created(client, &tenant, timeout, options).await?,
                ))?,
                Operation::Update => to_json(Some(
                    wait_tenant_database_updated(client, &tenant, timeout, options).await?,
                ))?,
                Operation::Delete => to_json(
                    wait_tenant_database_deleted(client, &tenant, timeout, options).await?,
                )?,
            }
        }
        (ResourceKind::BlueGreenDeployment, Operation::Create) => to_json(Some(
            wait_blue_green_deployment_available(client, id, timeout, options).await?,
        ))?,
        (ResourceKind::BlueGreenDeployment, Operation::Update) => to_json(Some(
            wait_blue_green_switchover_completed(client, id, timeout, options).await?,
        ))?,
        (ResourceKind::BlueGreenDeployment, Operation::Delete) => {
            to_json(wait_blue_green_deployment_deleted(client, id, timeout, options).await?)?
        }
        (ResourceKind::DbSnapshot, Operation::Update) | (ResourceKind::DbSubnetGroup, _) => {
            return Err(unsupported());
        }
    };

    let elapsed = started.elapsed();
    info!(%kind, %operation, id, ?elapsed, "resource settled");

    Ok(WaitOutcome {
        kind,
        operation,
        id: id.to_string(),
        elapsed_secs: elapsed.as_secs_f64(),
        object,
    })
}

fn to_json<T: Serialize>(object: Option<T>) -> Result<Option<serde_json::Value>> {
    object
        .map(|o| serde_json::to_value(o).map_err(CoreError::from))
        .transpose()
}
