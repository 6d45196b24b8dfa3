//! Typed remote statuses
//!
//! The control plane reports statuses as lowercase kebab-case strings, except
//! for blue/green deployments which use uppercase snake case. Each resource
//! kind gets its own enum so pending/target sets are checked by the compiler;
//! anything unrecognised lands in `Other` with the wire value intact.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! resource_status {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A status not known to this crate, kept verbatim
            Other(String),
        }

        impl $name {
            /// Wire representation of the status
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(value) => value,
                }
            }

            /// Returns true if the status was not recognised
            pub fn is_other(&self) -> bool {
                matches!(self, Self::Other(_))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($wire => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::from)
            }
        }
    };
}

resource_status! {
    /// Status of a database cluster
    pub enum ClusterStatus {
        Available => "available",
        BackingUp => "backing-up",
        ConfiguringIamDatabaseAuth => "configuring-iam-database-auth",
        Creating => "creating",
        Deleting => "deleting",
        Failed => "failed",
        InaccessibleEncryptionCredentials => "inaccessible-encryption-credentials",
        Migrating => "migrating",
        Modifying => "modifying",
        PreparingDataMigration => "preparing-data-migration",
        Rebooting => "rebooting",
        Renaming => "renaming",
        ResettingMasterCredentials => "resetting-master-credentials",
        ScalingCompute => "scaling-compute",
        Stopped => "stopped",
        Upgrading => "upgrading",
    }
}

resource_status! {
    /// Status of a database instance
    pub enum InstanceStatus {
        Available => "available",
        BackingUp => "backing-up",
        ConfiguringEnhancedMonitoring => "configuring-enhanced-monitoring",
        ConfiguringIamDatabaseAuth => "configuring-iam-database-auth",
        ConfiguringLogExports => "configuring-log-exports",
        Creating => "creating",
        DeletePrecheck => "delete-precheck",
        Deleting => "deleting",
        Failed => "failed",
        IncompatibleParameters => "incompatible-parameters",
        IncompatibleRestore => "incompatible-restore",
        Maintenance => "maintenance",
        Modifying => "modifying",
        MovingToVpc => "moving-to-vpc",
        Rebooting => "rebooting",
        Renaming => "renaming",
        ResettingMasterCredentials => "resetting-master-credentials",
        Starting => "starting",
        Stopped => "stopped",
        Stopping => "stopping",
        StorageFull => "storage-full",
        StorageOptimization => "storage-optimization",
        Upgrading => "upgrading",
    }
}

resource_status! {
    /// Status of a manual or automated snapshot
    pub enum SnapshotStatus {
        Available => "available",
        Creating => "creating",
        Deleting => "deleting",
        Failed => "failed",
    }
}

resource_status! {
    /// Status of a tenant database inside a multi-tenant instance
    pub enum TenantDatabaseStatus {
        Available => "available",
        Creating => "creating",
        Deleting => "deleting",
        Failed => "failed",
        Modifying => "modifying",
    }
}

resource_status! {
    /// Status of a blue/green deployment
    pub enum BlueGreenDeploymentStatus {
        Provisioning => "PROVISIONING",
        Available => "AVAILABLE",
        SwitchoverInProgress => "SWITCHOVER_IN_PROGRESS",
        SwitchoverCompleted => "SWITCHOVER_COMPLETED",
        InvalidConfiguration => "INVALID_CONFIGURATION",
        SwitchoverFailed => "SWITCHOVER_FAILED",
        Deleting => "DELETING",
    }
}

impl BlueGreenDeploymentStatus {
    /// Terminal failure states, reported together with status details
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::InvalidConfiguration | Self::SwitchoverFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_status_parses() {
        assert_eq!(ClusterStatus::from("backing-up"), ClusterStatus::BackingUp);
        assert_eq!(
            InstanceStatus::from("storage-optimization"),
            InstanceStatus::StorageOptimization
        );
        assert_eq!(
            "deleting".parse::<SnapshotStatus>().unwrap(),
            SnapshotStatus::Deleting
        );
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let status = InstanceStatus::from("inaccessible-encryption-credentials-recoverable");
        assert!(status.is_other());
        assert_eq!(
            status.to_string(),
            "inaccessible-encryption-credentials-recoverable"
        );
    }

    #[test]
    fn test_status_matching_is_exact() {
        // the control plane always reports lowercase
        assert!(ClusterStatus::from("Available").is_other());
    }

    #[test]
    fn test_blue_green_statuses_are_uppercase() {
        assert_eq!(
            BlueGreenDeploymentStatus::from("SWITCHOVER_IN_PROGRESS"),
            BlueGreenDeploymentStatus::SwitchoverInProgress
        );
        assert!(BlueGreenDeploymentStatus::from("available").is_other());
        assert!(BlueGreenDeploymentStatus::SwitchoverFailed.is_failed());
        assert!(BlueGreenDeploymentStatus::InvalidConfiguration.is_failed());
        assert!(!BlueGreenDeploymentStatus::Deleting.is_failed());
    }

    #[test]
    fn test_status_serde() {
        let status: TenantDatabaseStatus = serde_json::from_str("\"modifying\"").unwrap();
        assert_eq!(status, TenantDatabaseStatus::Modifying);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"modifying\"");

        let other: TenantDatabaseStatus = serde_json::from_str("\"restoring\"").unwrap();
        assert_eq!(other, TenantDatabaseStatus::Other("restoring".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"restoring\"");
    }
}
