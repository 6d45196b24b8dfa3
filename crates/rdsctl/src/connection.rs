//! Connection management for the control-plane client

use std::path::PathBuf;

use rdsctl_core::client::ControlPlaneClient;
use rdsctl_core::config::{Config, Connection};
use tracing::{debug, trace};

use crate::error::Result as CliResult;

/// Resolves profiles and builds describe clients
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Path of the config file in use, explicit or default
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(|| Config::config_path().ok())
    }

    /// Resolve the connection and build a client for it
    ///
    /// Precedence for the API URL: `--api-url`, then `RDSCTL_API_URL`, then
    /// the profile.
    pub fn create_client(
        &self,
        profile_name: Option<&str>,
        api_url: Option<&str>,
    ) -> CliResult<(ControlPlaneClient, Connection)> {
        debug!("Creating control-plane client");
        trace!("Profile name: {:?}, api_url override: {:?}", profile_name, api_url);

        let connection = self.config.resolve_connection(profile_name, api_url)?;
        debug!(
            profile = connection.profile.as_deref().unwrap_or("<none>"),
            api_url = %connection.api_url,
            "resolved connection"
        );

        let client = ControlPlaneClient::new(&connection.api_url, connection.api_key.clone())?;
        Ok((client, connection))
    }
}
