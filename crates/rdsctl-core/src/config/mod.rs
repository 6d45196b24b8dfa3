//! Configuration and profile management
//!
// The inner config module mirrors the subsystem name
#![allow(clippy::module_inception)]
//!
//! - Multiple named profiles, one per control-plane endpoint
//! - Environment variable expansion in config files
//! - Platform-specific config file locations
//! - Waiter tuning per resource kind

pub mod config;
pub mod error;
pub mod waiters;

pub use config::{API_KEY_ENV, API_URL_ENV, Config, Connection, Profile};
pub use error::{ConfigError, Result};
pub use waiters::{WaiterConfig, WaiterTuning};
