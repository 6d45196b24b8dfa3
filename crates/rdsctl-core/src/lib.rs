//! # rdsctl-core
//!
//! Resource state waiting for a relational-database control plane, covering
//! clusters, instances, snapshots, tenant databases and blue/green deployments.
//!
//! Mutating calls on the control plane return before the change is done.
//! This crate blocks until the remote object settles:
//!
//! - [`waiter`] - the generic poll loop ([`waiter::StateChangeConf`])
//! - [`status`] - typed statuses per resource kind
//! - [`client`] - read-only describe client used by the status probes
//! - [`workflows`] - create/update/delete waits per resource kind
//! - [`config`] - profiles and waiter tuning
//!
//! ```rust,ignore
//! use rdsctl_core::client::ControlPlaneClient;
//! use rdsctl_core::workflows::{WaitOptions, wait_db_instance_available};
//! use std::time::Duration;
//!
//! let client = ControlPlaneClient::new("https://rds.internal.example/v1", None)?;
//! let instance = wait_db_instance_available(
//!     &client,
//!     "orders-primary",
//!     Duration::from_secs(40 * 60),
//!     WaitOptions::default(),
//! )
//! .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod resource;
pub mod status;
pub mod waiter;
pub mod workflows;

pub use error::{CoreError, Result};
pub use resource::{Operation, ResourceKind};
