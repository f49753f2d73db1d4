//! HTTP client for the analytics UVE endpoints

use super::paths;
use crate::config::AnalyticsSettings;
use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Analytics API client bound to one endpoint
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    client: Client,
    endpoint: Url,
    debug: bool,
}

impl AnalyticsClient {
    /// Create a client for `endpoint` (e.g. `http://analytics:8081/`).
    pub fn new(endpoint: &str, settings: &AnalyticsSettings) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| Error::InvalidResourceUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(settings.http_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            endpoint,
            debug: settings.debug,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Interfaces of a virtual machine.
    ///
    /// `GET {endpoint}/analytics/uves/virtual-machine/{fqdn_uuid}?cfilt=UveVirtualMachineAgent:interface_list`
    pub async fn get_vm_interfaces(
        &self,
        fqdn_uuid: &str,
        token: Option<&str>,
    ) -> Result<Option<Vec<String>>> {
        let body = self
            .request(
                paths::VIRTUAL_MACHINE,
                fqdn_uuid,
                Some(paths::INTERFACE_LIST_FILTER),
                token,
            )
            .await?;

        Ok(uve_field(&body, paths::VM_AGENT, "interface_list")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }))
    }

    /// Floating IP statistics of a virtual machine interface.
    ///
    /// `GET {endpoint}/analytics/uves/virtual-machine-interface/{fqdn_uuid}?cfilt=UveVMInterfaceAgent:fip_agg_stats`
    pub async fn get_vmi_fip_stats(
        &self,
        fqdn_uuid: &str,
        token: Option<&str>,
    ) -> Result<Option<Vec<Value>>> {
        let body = self
            .request(
                paths::VIRTUAL_MACHINE_INTERFACE,
                fqdn_uuid,
                Some(paths::FIP_AGG_STATS_FILTER),
                token,
            )
            .await?;

        Ok(uve_field(&body, paths::VMI_AGENT, "fip_agg_stats")
            .and_then(Value::as_array)
            .cloned())
    }

    /// Full, unfiltered UVE of one virtual machine, or of all of them for `*`.
    ///
    /// `GET {endpoint}/analytics/uves/virtual-machine/{fqdn_uuid}`
    pub async fn get_vm_statistics(
        &self,
        fqdn_uuid: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>> {
        let body = self
            .request(paths::VIRTUAL_MACHINE, fqdn_uuid, None, token)
            .await?;

        match &body {
            Value::Object(map) if !map.is_empty() => Ok(Some(body)),
            _ => Ok(None),
        }
    }

    async fn request(
        &self,
        path: &str,
        fqdn_uuid: &str,
        query: Option<&str>,
        token: Option<&str>,
    ) -> Result<Value> {
        let relative = match query {
            Some(query) => format!("{path}{fqdn_uuid}?{query}"),
            None => format!("{path}{fqdn_uuid}"),
        };
        let url = self
            .endpoint
            .join(&relative)
            .map_err(|e| Error::InvalidResourceUrl {
                url: relative.clone(),
                reason: e.to_string(),
            })?;

        let mut headers = vec![("Accept", "application/json")];
        if let Some(token) = token {
            headers.push(("X-Auth-Token", token));
        }
        if self.debug {
            log_request(&url, &headers);
        }

        let mut builder = self.client.get(url.clone());
        for (name, value) in &headers {
            builder = builder.header(*name, *value);
        }
        let response = builder.send().await?;

        let status = response.status();
        let version = response.version();
        let response_headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if self.debug {
            log_response(version, status, &response_headers, &bytes);
        }

        if status != StatusCode::OK {
            return Err(Error::AnalyticsApi {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// `body[agent][field]`, treating an empty or non-object body as absent.
fn uve_field<'a>(body: &'a Value, agent: &str, field: &str) -> Option<&'a Value> {
    body.as_object()
        .filter(|map| !map.is_empty())?
        .get(agent)?
        .get(field)
}

fn log_request(url: &Url, headers: &[(&str, &str)]) {
    let mut line = format!("REQ: curl -i -X GET \"{url}\"");
    for (name, value) in headers {
        line.push_str(&format!(" -H \"{name}: {value}\""));
    }
    debug!("{}", line);
}

fn log_response(
    version: reqwest::Version,
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) {
    let mut dump = format!(
        "RES: \n{:?} {} {}\n",
        version,
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in headers {
        dump.push_str(&format!(
            "{}: {}\n",
            name,
            value.to_str().unwrap_or("<binary>")
        ));
    }
    dump.push('\n');
    if !body.is_empty() {
        dump.push_str(&String::from_utf8_lossy(body));
        dump.push('\n');
    }
    debug!("{}", dump);
}
