//! Resource directory: floating IPs and ports
//!
//! The directory is owned by the networking control plane. The drivers only
//! consume it through [`ResourceDirectory`]; [`NeutronClient`] talks to the
//! Neutron v2.0 REST API.

mod neutron;

pub use neutron::NeutronClient;

use crate::error::Result;
use crate::models::{FloatingIp, Port};
use async_trait::async_trait;

/// Read-only view of floating IPs and ports
#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    /// All floating IPs visible to the poller
    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>>;

    /// A single port, `None` when it does not exist
    async fn show_port(&self, port_id: &str) -> Result<Option<Port>>;

    /// All ports visible to the poller
    async fn list_ports(&self) -> Result<Vec<Port>>;
}
