//! Resource URLs from the polling pipeline, e.g.
//! `opencontrail://localhost:8081/?resource=fip_stats_list&virtual_network=default-domain:openstack:public`

use crate::error::{Error, Result};
use std::collections::HashMap;
use url::Url;

/// Parsed resource URL handed to a driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrl {
    raw: String,
    scheme: String,
    netloc: String,
    path: String,
    params: HashMap<String, Vec<String>>,
}

impl ResourceUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidResourceUrl {
            url: raw.to_string(),
            reason,
        };
        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host".to_string()))?;

        let mut netloc = String::new();
        if !url.username().is_empty() {
            netloc.push_str(url.username());
            if let Some(password) = url.password() {
                netloc.push(':');
                netloc.push_str(password);
            }
            netloc.push('@');
        }
        netloc.push_str(host);
        if let Some(port) = url.port() {
            netloc.push_str(&format!(":{port}"));
        }

        // Blank values are dropped, as query string parsers usually do.
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            params
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        Ok(Self {
            raw: raw.to_string(),
            scheme: url.scheme().to_string(),
            netloc,
            path: url.path().to_string(),
            params,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Driver scheme, e.g. `contrail` or `opencontrail`
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn netloc(&self) -> &str {
        &self.netloc
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, Vec<String>> {
        &self.params
    }

    /// Analytics endpoint: the `scheme` parameter (default `http`), netloc and path.
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}{}",
            self.param("scheme").unwrap_or("http"),
            self.netloc,
            self.path
        )
    }
}
