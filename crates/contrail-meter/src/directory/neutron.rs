//! Neutron v2.0 REST implementation of the resource directory

use super::ResourceDirectory;
use crate::config::DirectorySettings;
use crate::error::{Error, Result};
use crate::models::{FloatingIp, Port};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[derive(Deserialize)]
struct FloatingIpList {
    #[serde(default)]
    floatingips: Vec<FloatingIp>,
}

#[derive(Deserialize)]
struct PortEnvelope {
    port: Option<Port>,
}

#[derive(Deserialize)]
struct PortList {
    #[serde(default)]
    ports: Vec<Port>,
}

/// Neutron API client
#[derive(Debug, Clone)]
pub struct NeutronClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl NeutronClient {
    pub fn new(settings: &DirectorySettings) -> Result<Self> {
        let mut base_url =
            Url::parse(&settings.endpoint).map_err(|e| Error::InvalidResourceUrl {
                url: settings.endpoint.clone(),
                reason: e.to_string(),
            })?;
        // Relative joins replace the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(settings.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: settings.auth_token.clone(),
        })
    }

    /// GET a path below the endpoint; `Ok(None)` on 404.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::InvalidResourceUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })?;
        debug!(url = %url, "Querying resource directory");

        let mut request = self
            .client
            .get(url.clone())
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("X-Auth-Token", token);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::DirectoryApi {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                path: path.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| Error::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl ResourceDirectory for NeutronClient {
    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
        let list: Option<FloatingIpList> = self.get("v2.0/floatingips").await?;
        Ok(list.map(|l| l.floatingips).unwrap_or_default())
    }

    async fn show_port(&self, port_id: &str) -> Result<Option<Port>> {
        let envelope: Option<PortEnvelope> = self.get(&format!("v2.0/ports/{port_id}")).await?;
        Ok(envelope.and_then(|e| e.port))
    }

    async fn list_ports(&self) -> Result<Vec<Port>> {
        let list: Option<PortList> = self.get("v2.0/ports").await?;
        Ok(list.map(|l| l.ports).unwrap_or_default())
    }
}
