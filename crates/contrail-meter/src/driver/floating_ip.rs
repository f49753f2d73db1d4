//! Floating IP join
//!
//! Floating IPs come from the resource directory, traffic counters from the
//! analytics UVEs of the virtual machine behind each floating IP's port.
//! Counters are matched to the floating IP by address.

use super::{DriverClients, PendingReading};
use crate::analytics::paths;
use crate::error::Result;
use crate::meters::Extractor;
use crate::models::{utc_timestamp, FloatingIp, Port, ResourceMeta, Sample};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Where the floating IP counters of a virtual machine are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsLookup {
    /// Interface list of the VM, then `fip_agg_stats` of each interface
    Interfaces,
    /// `fip_stats_list` of the VM's own, unfiltered UVE
    VmStatistics,
}

/// Port being walked, with the interfaces still to query
struct PortCursor {
    floatingip: FloatingIp,
    port: Port,
    timestamp: String,
    interfaces: VecDeque<String>,
}

/// Lazy sample cursor for the `ip.floating.*` meters
pub struct FloatingIpSamples {
    clients: DriverClients,
    extractor: Extractor,
    lookup: StatsLookup,
    token: Option<String>,
    started: bool,
    pending_ports: VecDeque<(String, FloatingIp)>,
    current: Option<PortCursor>,
    ready: VecDeque<PendingReading>,
}

impl FloatingIpSamples {
    pub(crate) fn new(
        clients: DriverClients,
        extractor: Extractor,
        lookup: StatsLookup,
        token: Option<String>,
    ) -> Self {
        Self {
            clients,
            extractor,
            lookup,
            token,
            started: false,
            pending_ports: VecDeque::new(),
            current: None,
            ready: VecDeque::new(),
        }
    }

    pub(crate) async fn next(&mut self) -> Result<Option<Sample>> {
        if !self.started {
            self.started = true;
            let floatingips = self.clients.directory.list_floating_ips().await?;
            self.pending_ports = index_by_port(floatingips).into();
            debug!(
                floating_ips = self.pending_ports.len(),
                "Listed bound floating IPs"
            );
        }

        loop {
            if let Some(pending) = self.ready.pop_front() {
                return pending.extract(self.extractor).map(Some);
            }

            if let Some(cursor) = self.current.as_mut() {
                if let Some(vmi) = cursor.interfaces.pop_front() {
                    let stats = self
                        .clients
                        .analytics
                        .get_vmi_fip_stats(&vmi, self.token.as_deref())
                        .await?;
                    if let Some(stats) = stats {
                        self.ready.extend(matching_stats(
                            &stats,
                            &cursor.floatingip,
                            &cursor.port,
                            &cursor.timestamp,
                        ));
                    }
                    continue;
                }
                self.current = None;
            }

            let Some((port_id, floatingip)) = self.pending_ports.pop_front() else {
                return Ok(None);
            };
            self.visit_port(&port_id, floatingip).await?;
        }
    }

    /// Resolve the VM behind a port and queue what its counters produce.
    async fn visit_port(&mut self, port_id: &str, floatingip: FloatingIp) -> Result<()> {
        let Some(port) = self.clients.directory.show_port(port_id).await? else {
            debug!(port_id, "Port not found, skipping floating IP");
            return Ok(());
        };
        let Some(vm_fqdn_uuid) = port.device().map(str::to_string) else {
            debug!(port_id, "Port has no device, skipping floating IP");
            return Ok(());
        };
        let token = self.token.as_deref();

        match self.lookup {
            StatsLookup::Interfaces => {
                let interfaces = self
                    .clients
                    .analytics
                    .get_vm_interfaces(&vm_fqdn_uuid, token)
                    .await?;
                let Some(interfaces) = interfaces else {
                    return Ok(());
                };
                self.current = Some(PortCursor {
                    floatingip,
                    port,
                    timestamp: utc_timestamp(),
                    interfaces: interfaces.into(),
                });
            }
            StatsLookup::VmStatistics => {
                let statistics = self
                    .clients
                    .analytics
                    .get_vm_statistics(&vm_fqdn_uuid, token)
                    .await?;
                let stats = statistics.as_ref().and_then(|s| {
                    s.get(paths::VM_AGENT)?
                        .get("fip_stats_list")?
                        .as_array()
                });
                if let Some(stats) = stats {
                    let timestamp = utc_timestamp();
                    self.ready
                        .extend(matching_stats(stats, &floatingip, &port, &timestamp));
                }
            }
        }
        Ok(())
    }
}

/// Bound floating IPs keyed by port, in first-seen port order.
///
/// A later floating IP on an already seen port replaces the earlier one.
pub(crate) fn index_by_port(floatingips: Vec<FloatingIp>) -> Vec<(String, FloatingIp)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut by_port: Vec<(String, FloatingIp)> = Vec::new();

    for floatingip in floatingips {
        let Some((port_id, _)) = floatingip.binding() else {
            continue;
        };
        let port_id = port_id.to_string();
        match positions.get(&port_id) {
            Some(&index) => by_port[index].1 = floatingip,
            None => {
                positions.insert(port_id.clone(), by_port.len());
                by_port.push((port_id, floatingip));
            }
        }
    }
    by_port
}

/// Floating IP attributes plus the device owning its port.
pub(crate) fn floatingip_resource_meta(floatingip: &FloatingIp, port: &Port) -> ResourceMeta {
    let mut meta = match serde_json::to_value(floatingip) {
        Ok(Value::Object(map)) => map,
        _ => ResourceMeta::new(),
    };
    meta.insert(
        "device_id".to_string(),
        port.device_id.clone().map(Value::String).unwrap_or(Value::Null),
    );
    meta
}

fn matching_stats(
    stats: &[Value],
    floatingip: &FloatingIp,
    port: &Port,
    timestamp: &str,
) -> Vec<PendingReading> {
    let Some(address) = floatingip.floating_ip_address.as_deref() else {
        return Vec::new();
    };
    stats
        .iter()
        .filter(|stat| stat.get("ip_address").and_then(Value::as_str) == Some(address))
        .map(|stat| PendingReading {
            stat: stat.clone(),
            resource_id: floatingip.id.clone(),
            resource_meta: floatingip_resource_meta(floatingip, port),
            timestamp: timestamp.to_string(),
        })
        .collect()
}
