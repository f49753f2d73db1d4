//! Core data models shared by the drivers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form annotations attached to a sample.
pub type ResourceMeta = Map<String, Value>;

/// Floating IP as listed by the resource directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub floating_ip_address: Option<String>,
    /// Any other attribute returned by the directory (tenant, router, status...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FloatingIp {
    /// Port and address, when the floating IP is associated.
    pub fn binding(&self) -> Option<(&str, &str)> {
        match (&self.port_id, &self.floating_ip_address) {
            (Some(port_id), Some(address)) => Some((port_id, address)),
            _ => None,
        }
    }
}

/// Port as exposed by the resource directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Port {
    /// Owning device, ignoring unbound ports that carry an empty id.
    pub fn device(&self) -> Option<&str> {
        self.device_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Output of a metric extractor, before a timestamp is attached
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub value: i128,
    pub resource_id: String,
    pub resource_meta: ResourceMeta,
}

impl Reading {
    pub fn at(self, timestamp: impl Into<String>) -> Sample {
        Sample {
            value: self.value,
            resource_id: self.resource_id,
            resource_meta: self.resource_meta,
            timestamp: timestamp.into(),
        }
    }
}

/// Normalized sample handed to the publisher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub value: i128,
    pub resource_id: String,
    pub resource_meta: ResourceMeta,
    /// ISO-8601 UTC timestamp
    pub timestamp: String,
}

/// Current UTC time in ISO-8601 with microsecond precision.
pub fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
