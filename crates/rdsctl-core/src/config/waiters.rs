//! Per-resource waiter tuning stored in profiles
//!
//! Every field is optional; anything left out falls back to the built-in
//! tuning of the workflow.
//!
//! ```toml
//! [profiles.prod.waiters.db_instance]
//! poll_interval_secs = 15
//! continuous_target_occurrence = 2
//! create_timeout_secs = 3600
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, Result};
use crate::resource::{Operation, ResourceKind};
use crate::workflows::WaitOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaiterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_cluster: Option<WaiterTuning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_instance: Option<WaiterTuning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_snapshot: Option<WaiterTuning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_database: Option<WaiterTuning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue_green_deployment: Option<WaiterTuning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaiterTuning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuous_target_occurrence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found_checks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_timeout_secs: Option<u64>,
}

impl WaiterConfig {
    pub fn is_empty(&self) -> bool {
        self == &WaiterConfig::default()
    }

    /// Tuning for `kind`, if the profile sets any
    pub fn tuning(&self, kind: ResourceKind) -> Option<&WaiterTuning> {
        match kind {
            ResourceKind::DbCluster => self.db_cluster.as_ref(),
            ResourceKind::DbInstance => self.db_instance.as_ref(),
            ResourceKind::DbSnapshot => self.db_snapshot.as_ref(),
            ResourceKind::TenantDatabase => self.tenant_database.as_ref(),
            ResourceKind::BlueGreenDeployment => self.blue_green_deployment.as_ref(),
            ResourceKind::DbSubnetGroup => None,
        }
    }

    /// Timeout for `operation` on `kind`: profile override, then the
    /// built-in default
    pub fn timeout_for(&self, kind: ResourceKind, operation: Operation) -> Option<Duration> {
        self.tuning(kind)
            .and_then(|t| t.timeout_for(operation))
            .or_else(|| kind.default_timeout(operation))
    }

    /// Wait options carrying the profile's tuning for `kind`
    pub fn wait_options(&self, kind: ResourceKind) -> WaitOptions {
        self.tuning(kind)
            .map(WaiterTuning::to_wait_options)
            .unwrap_or_default()
    }

    /// Reject settings that can never produce a successful wait
    pub fn validate(&self) -> Result<()> {
        let sections = [
            (ResourceKind::DbCluster, &self.db_cluster),
            (ResourceKind::DbInstance, &self.db_instance),
            (ResourceKind::DbSnapshot, &self.db_snapshot),
            (ResourceKind::TenantDatabase, &self.tenant_database),
            (ResourceKind::BlueGreenDeployment, &self.blue_green_deployment),
        ];
        for (kind, tuning) in sections {
            if let Some(tuning) = tuning {
                tuning.validate(kind)?;
            }
        }
        Ok(())
    }
}

impl WaiterTuning {
    pub fn timeout_for(&self, operation: Operation) -> Option<Duration> {
        let secs = match operation {
            Operation::Create => self.create_timeout_secs,
            Operation::Update => self.update_timeout_secs,
            Operation::Delete => self.delete_timeout_secs,
        };
        secs.map(Duration::from_secs)
    }

    pub fn to_wait_options(&self) -> WaitOptions {
        WaitOptions {
            poll_interval: self.poll_interval_secs.map(Duration::from_secs),
            delay: self.delay_secs.map(Duration::from_secs),
            min_timeout: self.min_timeout_secs.map(Duration::from_secs),
            continuous_target_occurrence: self.continuous_target_occurrence,
            not_found_checks: self.not_found_checks,
            ..WaitOptions::default()
        }
    }

    fn validate(&self, kind: ResourceKind) -> Result<()> {
        let timeouts = [
            ("create_timeout_secs", self.create_timeout_secs),
            ("update_timeout_secs", self.update_timeout_secs),
            ("delete_timeout_secs", self.delete_timeout_secs),
        ];
        for (field, value) in timeouts {
            if value == Some(0) {
                return Err(ConfigError::InvalidWaiter {
                    kind: kind.config_key().to_string(),
                    reason: format!("{field} must be greater than zero"),
                });
            }
        }
        Ok(())
    }
}
