//! Meter table and counter extractors
//!
//! Every supported meter maps to a family (which join the driver runs) and
//! an extractor (which counter of a stat becomes the sample value).

use crate::error::{Error, Result};
use crate::models::{Reading, ResourceMeta};
use serde_json::Value;

/// Turns one counter stat into a reading for `resource_id`.
pub type Extractor = fn(&Value, String, ResourceMeta) -> Result<Reading>;

/// Which join produces the samples of a meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterFamily {
    FloatingIp,
    SwitchPort,
}

impl MeterFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeterFamily::FloatingIp => "ip.floating",
            MeterFamily::SwitchPort => "switch.port",
        }
    }
}

/// One row of the meter table
#[derive(Debug, Clone, Copy)]
pub struct MeterSpec {
    pub name: &'static str,
    pub family: MeterFamily,
    pub unit: &'static str,
    /// Counter read from each stat
    pub field: &'static str,
    pub extractor: Extractor,
}

pub static METERS: [MeterSpec; 8] = [
    MeterSpec {
        name: "ip.floating.receive.bytes",
        family: MeterFamily::FloatingIp,
        unit: "B",
        field: "in_bytes",
        extractor: receive_bytes,
    },
    MeterSpec {
        name: "ip.floating.receive.packets",
        family: MeterFamily::FloatingIp,
        unit: "packet",
        field: "in_pkts",
        extractor: receive_packets,
    },
    MeterSpec {
        name: "ip.floating.transmit.bytes",
        family: MeterFamily::FloatingIp,
        unit: "B",
        field: "out_bytes",
        extractor: transmit_bytes,
    },
    MeterSpec {
        name: "ip.floating.transmit.packets",
        family: MeterFamily::FloatingIp,
        unit: "packet",
        field: "out_pkts",
        extractor: transmit_packets,
    },
    MeterSpec {
        name: "switch.port.receive.bytes",
        family: MeterFamily::SwitchPort,
        unit: "B",
        field: "in_bytes",
        extractor: receive_bytes,
    },
    MeterSpec {
        name: "switch.port.receive.packets",
        family: MeterFamily::SwitchPort,
        unit: "packet",
        field: "in_pkts",
        extractor: receive_packets,
    },
    MeterSpec {
        name: "switch.port.transmit.bytes",
        family: MeterFamily::SwitchPort,
        unit: "B",
        field: "out_bytes",
        extractor: transmit_bytes,
    },
    MeterSpec {
        name: "switch.port.transmit.packets",
        family: MeterFamily::SwitchPort,
        unit: "packet",
        field: "out_pkts",
        extractor: transmit_packets,
    },
];

/// Look up a meter by its dotted name.
pub fn lookup(name: &str) -> Option<&'static MeterSpec> {
    METERS.iter().find(|meter| meter.name == name)
}

pub fn receive_packets(stat: &Value, resource_id: String, meta: ResourceMeta) -> Result<Reading> {
    read(stat, "in_pkts", resource_id, meta)
}

pub fn transmit_packets(stat: &Value, resource_id: String, meta: ResourceMeta) -> Result<Reading> {
    read(stat, "out_pkts", resource_id, meta)
}

pub fn receive_bytes(stat: &Value, resource_id: String, meta: ResourceMeta) -> Result<Reading> {
    read(stat, "in_bytes", resource_id, meta)
}

pub fn transmit_bytes(stat: &Value, resource_id: String, meta: ResourceMeta) -> Result<Reading> {
    read(stat, "out_bytes", resource_id, meta)
}

fn read(
    stat: &Value,
    field: &'static str,
    resource_id: String,
    resource_meta: ResourceMeta,
) -> Result<Reading> {
    let raw = stat.get(field).ok_or_else(|| Error::Extraction {
        field,
        reason: "field is missing".to_string(),
    })?;
    Ok(Reading {
        value: counter_value(field, raw)?,
        resource_id,
        resource_meta,
    })
}

/// Integer value of a counter: integers as is, floats truncated, integer strings parsed.
///
/// Counters are unsigned 64-bit on the agents, so the full `u64` range is accepted.
fn counter_value(field: &'static str, raw: &Value) -> Result<i128> {
    let invalid = |reason: String| Error::Extraction { field, reason };
    match raw {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(v.into())
            } else if let Some(v) = n.as_u64() {
                Ok(v.into())
            } else {
                let v = n.as_f64().unwrap_or(f64::NAN);
                if v.is_finite() && v.abs() < i128::MAX as f64 {
                    Ok(v.trunc() as i128)
                } else {
                    Err(invalid(format!("{n} is not a finite counter")))
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|e| invalid(format!("{s:?} is not an integer: {e}"))),
        other => Err(invalid(format!("unexpected value {other}"))),
    }
}
