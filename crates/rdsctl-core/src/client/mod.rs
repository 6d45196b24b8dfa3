//! Read-only client for the control-plane describe API
//!
//! Every describe call maps HTTP 404 to `Ok(None)` so status probes can
//! report a missing object without treating it as a failure.

mod error;
mod models;

pub use error::{ApiError, Result};
pub use models::{
    BlueGreenDeployment, DbCluster, DbClusterMember, DbInstance, DbSnapshot, DbSubnetGroup,
    Endpoint, Subnet, TenantDatabase, TenantDatabaseId,
};

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::resource::ResourceKind;

const API_KEY_HEADER: &str = "X-Api-Key";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Describe client for clusters, instances, snapshots, subnet groups, tenant
/// databases and blue/green deployments
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ControlPlaneClient {
    /// Create a client for `api_url` with the default request timeout
    pub fn new(api_url: &str, api_key: Option<String>) -> Result<Self> {
        Self::with_timeout(api_url, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        api_url: &str,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let parsed = reqwest::Url::parse(api_url).map_err(|e| ApiError::InvalidUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: api_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("rdsctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn describe_db_cluster(&self, id: &str) -> Result<Option<DbCluster>> {
        self.get(&["clusters", id]).await
    }

    pub async fn describe_db_instance(&self, id: &str) -> Result<Option<DbInstance>> {
        self.get(&["instances", id]).await
    }

    pub async fn describe_db_snapshot(&self, id: &str) -> Result<Option<DbSnapshot>> {
        self.get(&["snapshots", id]).await
    }

    pub async fn describe_db_subnet_group(&self, name: &str) -> Result<Option<DbSubnetGroup>> {
        self.get(&["subnet-groups", name]).await
    }

    pub async fn describe_tenant_database(
        &self,
        id: &TenantDatabaseId,
    ) -> Result<Option<TenantDatabase>> {
        self.get(&["instances", &id.instance, "tenant-databases", &id.name])
            .await
    }

    pub async fn describe_blue_green_deployment(
        &self,
        id: &str,
    ) -> Result<Option<BlueGreenDeployment>> {
        self.get(&["blue-green-deployments", id]).await
    }

    /// Describe any kind by its string id, returning the raw JSON body
    ///
    /// Tenant database ids are `instance/name`.
    pub async fn describe(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<serde_json::Value>> {
        match kind {
            ResourceKind::DbCluster => self.get(&["clusters", id]).await,
            ResourceKind::DbInstance => self.get(&["instances", id]).await,
            ResourceKind::DbSnapshot => self.get(&["snapshots", id]).await,
            ResourceKind::DbSubnetGroup => self.get(&["subnet-groups", id]).await,
            ResourceKind::TenantDatabase => {
                let id: TenantDatabaseId = id.parse()?;
                self.get(&["instances", &id.instance, "tenant-databases", &id.name])
                    .await
            }
            ResourceKind::BlueGreenDeployment => {
                self.get(&["blue-green-deployments", id]).await
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>> {
        let url = self.url_for(segments)?;
        debug!(%url, "GET");

        let mut request = self.http.get(&url).header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        trace!(%url, status = status.as_u16(), "response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(response.json::<T>().await?))
    }

    fn url_for(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base_url.clone();
        for segment in segments {
            if segment.is_empty() {
                return Err(ApiError::InvalidId {
                    id: segments.join("/"),
                    reason: "empty path segment".to_string(),
                });
            }
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            ControlPlaneClient::new("not a url", None),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ControlPlaneClient::new("ftp://rds.example", None),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let client = ControlPlaneClient::new("https://rds.example/v1/", None).unwrap();
        assert_eq!(client.base_url(), "https://rds.example/v1");

        let url = client.url_for(&["clusters", "db one/two"]).unwrap();
        assert_eq!(url, "https://rds.example/v1/clusters/db%20one%2Ftwo");
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let client = ControlPlaneClient::new("https://rds.example", None).unwrap();
        assert!(matches!(
            client.url_for(&["instances", ""]),
            Err(ApiError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_empty_api_key_is_dropped() {
        let client = ControlPlaneClient::new("https://rds.example", Some(String::new())).unwrap();
        assert!(client.api_key.is_none());
    }
}
