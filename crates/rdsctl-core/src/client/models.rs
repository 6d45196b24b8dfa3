//! Describe response bodies
//!
//! Field names follow the control plane's camelCase JSON. Unknown fields are
//! ignored so newer API versions keep deserializing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::status::{
    BlueGreenDeploymentStatus, ClusterStatus, InstanceStatus, SnapshotStatus, TenantDatabaseStatus,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbCluster {
    pub db_cluster_identifier: String,
    pub status: ClusterStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_cluster_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub db_cluster_members: Vec<DbClusterMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbClusterMember {
    pub db_instance_identifier: String,
    #[serde(default)]
    pub is_cluster_writer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInstance {
    pub db_instance_identifier: String,
    pub db_instance_status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_instance_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_storage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_cluster_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_az: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSnapshot {
    pub db_snapshot_identifier: String,
    pub status: SnapshotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_instance_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSubnetGroup {
    pub db_subnet_group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_subnet_group_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_group_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub subnet_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDatabase {
    pub tenant_db_name: String,
    pub db_instance_identifier: String,
    pub status: TenantDatabaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_database_create_time: Option<DateTime<Utc>>,
}

/// A blue/green deployment pairing a source database with its staged copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueGreenDeployment {
    pub blue_green_deployment_identifier: String,
    pub status: BlueGreenDeploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue_green_deployment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Free-form explanation, set when the deployment is in a failed state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

/// Identifier of a tenant database, written `instance/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantDatabaseId {
    pub instance: String,
    pub name: String,
}

impl TenantDatabaseId {
    pub fn new(instance: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            name: name.into(),
        }
    }
}

impl FromStr for TenantDatabaseId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((instance, name))
                if !instance.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(instance, name))
            }
            _ => Err(ApiError::InvalidId {
                id: s.to_string(),
                reason: "expected <instance>/<name>".to_string(),
            }),
        }
    }
}

impl fmt::Display for TenantDatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.instance, self.name)
    }
}
