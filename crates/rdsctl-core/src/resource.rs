//! Resource kinds and the operations that can be waited on

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const MINUTE: u64 = 60;

/// Kind of control-plane object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    #[value(alias = "cluster")]
    DbCluster,
    #[value(alias = "instance")]
    DbInstance,
    #[value(alias = "snapshot")]
    DbSnapshot,
    #[value(alias = "subnet-group")]
    DbSubnetGroup,
    #[value(alias = "tenant-db")]
    TenantDatabase,
    #[value(alias = "blue-green")]
    BlueGreenDeployment,
}

/// Mutating operation whose completion is awaited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::DbCluster,
        ResourceKind::DbInstance,
        ResourceKind::DbSnapshot,
        ResourceKind::DbSubnetGroup,
        ResourceKind::TenantDatabase,
        ResourceKind::BlueGreenDeployment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::DbCluster => "db-cluster",
            ResourceKind::DbInstance => "db-instance",
            ResourceKind::DbSnapshot => "db-snapshot",
            ResourceKind::DbSubnetGroup => "db-subnet-group",
            ResourceKind::TenantDatabase => "tenant-database",
            ResourceKind::BlueGreenDeployment => "blue-green-deployment",
        }
    }

    /// Key of the per-kind section in the `waiters` config table
    pub fn config_key(&self) -> &'static str {
        match self {
            ResourceKind::DbCluster => "db_cluster",
            ResourceKind::DbInstance => "db_instance",
            ResourceKind::DbSnapshot => "db_snapshot",
            ResourceKind::DbSubnetGroup => "db_subnet_group",
            ResourceKind::TenantDatabase => "tenant_database",
            ResourceKind::BlueGreenDeployment => "blue_green_deployment",
        }
    }

    /// Returns true if this kind has state waits
    ///
    /// Subnet groups change synchronously and never need one.
    pub fn has_waits(&self) -> bool {
        !matches!(self, ResourceKind::DbSubnetGroup)
    }

    /// Default overall timeout for waiting on `operation`
    pub fn default_timeout(&self, operation: Operation) -> Option<Duration> {
        let minutes = match (self, operation) {
            (ResourceKind::DbCluster, _) => 120,
            (ResourceKind::DbInstance, Operation::Create) => 40,
            (ResourceKind::DbInstance, Operation::Update) => 80,
            (ResourceKind::DbInstance, Operation::Delete) => 60,
            (ResourceKind::DbSnapshot, _) => 20,
            (ResourceKind::TenantDatabase, _) => 60,
            (ResourceKind::BlueGreenDeployment, _) => 60,
            (ResourceKind::DbSubnetGroup, _) => return None,
        };
        Some(Duration::from_secs(minutes * MINUTE))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
