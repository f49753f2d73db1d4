//! Switch port join
//!
//! One unfiltered virtual-machine UVE query returns the per-interface
//! counters of every VM; each counter stat names its port through a fully
//! qualified `domain:project:port_id` name.

use super::{DriverClients, PendingReading};
use crate::analytics::{paths, WILDCARD};
use crate::error::Result;
use crate::meters::Extractor;
use crate::models::{utc_timestamp, Port, ResourceMeta, Sample};
use regex::Regex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;
use tracing::debug;

/// Counter list read when the resource URL does not name one
pub const DEFAULT_RESOURCE: &str = "if_stats_list";
/// Counter list of floating IP traffic, keyed by interface name
pub const FIP_STATS_LIST: &str = "fip_stats_list";

static FQ_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<domain>[^:]+):(?P<project>.+):(?P<port_id>[^:]+)")
        .expect("fully qualified name pattern is valid")
});

/// Query parameters of the switch port meters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchPortQuery {
    /// Counter list inside `UveVirtualMachineAgent`
    pub resource: String,
    /// VM to query, `*` for all of them
    pub fqdn_uuid: String,
    /// Only keep floating IP stats of this virtual network
    pub virtual_network: Option<String>,
}

impl Default for SwitchPortQuery {
    fn default() -> Self {
        Self {
            resource: DEFAULT_RESOURCE.to_string(),
            fqdn_uuid: WILDCARD.to_string(),
            virtual_network: None,
        }
    }
}

/// Lazy sample cursor for the `switch.port.*` meters
pub struct SwitchPortSamples {
    clients: DriverClients,
    extractor: Extractor,
    query: SwitchPortQuery,
    token: Option<String>,
    started: bool,
    ready: VecDeque<PendingReading>,
}

impl SwitchPortSamples {
    pub(crate) fn new(
        clients: DriverClients,
        extractor: Extractor,
        query: SwitchPortQuery,
        token: Option<String>,
    ) -> Self {
        Self {
            clients,
            extractor,
            query,
            token,
            started: false,
            ready: VecDeque::new(),
        }
    }

    pub(crate) async fn next(&mut self) -> Result<Option<Sample>> {
        if !self.started {
            self.started = true;
            self.load().await?;
        }
        match self.ready.pop_front() {
            Some(pending) => pending.extract(self.extractor).map(Some),
            None => Ok(None),
        }
    }

    async fn load(&mut self) -> Result<()> {
        let ports: HashMap<String, Port> = self
            .clients
            .directory
            .list_ports()
            .await?
            .into_iter()
            .map(|port| (port.id.clone(), port))
            .collect();

        let timestamp = utc_timestamp();
        let statistics = self
            .clients
            .analytics
            .get_vm_statistics(&self.query.fqdn_uuid, self.token.as_deref())
            .await?;
        let Some(statistics) = statistics else {
            return Ok(());
        };
        let Some(entries) = statistics.get("value").and_then(Value::as_array) else {
            debug!(fqdn_uuid = %self.query.fqdn_uuid, "No UVE values in analytics response");
            return Ok(());
        };

        for entry in entries {
            for stat in counter_stats(entry, &self.query.resource) {
                let Some((port_id, resource_meta)) = port_resource_meta(
                    &ports,
                    stat,
                    &self.query.resource,
                    self.query.virtual_network.as_deref(),
                ) else {
                    continue;
                };
                self.ready.push_back(PendingReading {
                    stat: stat.clone(),
                    resource_id: port_id,
                    resource_meta,
                    timestamp: timestamp.clone(),
                });
            }
        }
        debug!(stats = self.ready.len(), "Matched switch port stats");
        Ok(())
    }
}

/// Counter stats of one UVE value entry.
///
/// Entries of the counter list are either stats or pair-encoded lists
/// `[sub_stats, node, sub_stats, node, ...]`; pairs are un-nested and the
/// node marker dropped.
pub(crate) fn counter_stats<'a>(entry: &'a Value, resource: &str) -> Vec<&'a Value> {
    let Some(stats) = entry
        .get("value")
        .and_then(|v| v.get(paths::VM_AGENT))
        .and_then(|agent| agent.get(resource))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut flat = Vec::new();
    for stat in stats {
        match stat {
            Value::Array(pairs) => {
                for pair in pairs.chunks_exact(2) {
                    if let Some(sub_stats) = pair[0].as_array() {
                        flat.extend(sub_stats);
                    }
                }
            }
            other => flat.push(other),
        }
    }
    flat
}

/// Split `domain:project:port_id`; the project may itself contain colons.
pub(crate) fn explode_name(fq_name: &str) -> Option<(&str, &str, &str)> {
    let caps = FQ_NAME.captures(fq_name)?;
    Some((
        caps.name("domain")?.as_str(),
        caps.name("project")?.as_str(),
        caps.name("port_id")?.as_str(),
    ))
}

fn port_resource_meta(
    ports: &HashMap<String, Port>,
    stat: &Value,
    resource: &str,
    virtual_network: Option<&str>,
) -> Option<(String, ResourceMeta)> {
    let name_field = if resource == FIP_STATS_LIST {
        if let Some(network) = virtual_network.filter(|n| !n.is_empty()) {
            if stat.get("virtual_network").and_then(Value::as_str) != Some(network) {
                return None;
            }
        }
        "iface_name"
    } else {
        "name"
    };
    let name = stat.get(name_field)?.as_str()?;
    let (domain, project, port_id) = explode_name(name)?;
    let port = ports.get(port_id);

    let meta = json!({
        "device_owner_id": port.and_then(|p| p.device_id.clone()),
        "network_id": port.and_then(|p| p.network_id.clone()),
        "project_id": port.and_then(|p| p.tenant_id.clone()),
        "project": project,
        "resource": resource,
        "domain": domain,
    });
    let Value::Object(meta) = meta else {
        return None;
    };
    Some((port_id.to_string(), meta))
}
