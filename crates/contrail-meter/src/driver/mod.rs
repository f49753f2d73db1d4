//! Network statistics drivers
//!
//! A driver turns `(meter name, resource URL, session cache)` into a lazy
//! [`SampleStream`]. Two backends are provided:
//! - [`ContrailDriver`] (`contrail://`): floating IP meters, counters read
//!   per virtual machine interface
//! - [`OpenContrailDriver`] (`opencontrail://`): floating IP meters from the
//!   VM UVE, and the switch port meters

mod cache;
mod contrail;
mod floating_ip;
mod opencontrail;
mod resource;
mod stream;
mod switch_port;


pub use cache::{DriverClients, SessionCache};
pub use contrail::ContrailDriver;
pub use floating_ip::{FloatingIpSamples, StatsLookup};
pub use opencontrail::OpenContrailDriver;
pub use resource::ResourceUrl;
pub use stream::SampleStream;
pub use switch_port::{SwitchPortQuery, SwitchPortSamples, DEFAULT_RESOURCE, FIP_STATS_LIST};

use crate::config::PollerConfig;
use crate::directory::ResourceDirectory;
use crate::error::Result;
use crate::meters::Extractor;
use crate::models::{ResourceMeta, Sample};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Backend producing samples for the meters it implements
pub trait Driver: Send + Sync {
    /// Resource URL scheme served by this driver
    fn scheme(&self) -> &'static str;

    /// Samples of `meter_name` for one polling invocation.
    ///
    /// Meters the driver does not implement give an empty stream.
    fn get_sample_data(
        &self,
        meter_name: &str,
        resource: &ResourceUrl,
        cache: &mut SessionCache,
    ) -> Result<SampleStream>;
}

/// Drivers by resource URL scheme
#[derive(Default, Clone)]
pub struct DriverRegistry {
    drivers: HashMap<&'static str, Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `contrail` and `opencontrail` drivers.
    pub fn with_defaults(config: &PollerConfig, directory: Arc<dyn ResourceDirectory>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ContrailDriver::new(
            config.analytics.clone(),
            Arc::clone(&directory),
        )));
        registry.register(Arc::new(OpenContrailDriver::new(
            config.analytics.clone(),
            directory,
        )));
        registry
    }

    pub fn register(&mut self, driver: Arc<dyn Driver>) {
        self.drivers.insert(driver.scheme(), driver);
    }

    pub fn get(&self, scheme: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(scheme).cloned()
    }

    pub fn schemes(&self) -> Vec<&'static str> {
        let mut schemes: Vec<_> = self.drivers.keys().copied().collect();
        schemes.sort_unstable();
        schemes
    }
}

/// Matched counter stat waiting to be extracted when pulled
pub(crate) struct PendingReading {
    stat: Value,
    resource_id: String,
    resource_meta: ResourceMeta,
    timestamp: String,
}

impl PendingReading {
    fn extract(self, extractor: Extractor) -> Result<Sample> {
        Ok(extractor(&self.stat, self.resource_id, self.resource_meta)?.at(self.timestamp))
    }
}
