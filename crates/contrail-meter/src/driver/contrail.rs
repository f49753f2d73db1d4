//! Contrail analytics driver
//!
//! Resource URLs look like `contrail://localhost:8081/`. Supported query
//! parameters:
//! - `scheme`: scheme of the analytics endpoint (default `http`)

use super::{
    Driver, DriverClients, FloatingIpSamples, ResourceUrl, SampleStream, SessionCache,
    StatsLookup,
};
use crate::config::AnalyticsSettings;
use crate::directory::ResourceDirectory;
use crate::error::Result;
use crate::meters::{self, MeterFamily};
use std::sync::Arc;
use tracing::debug;

pub const SCHEME: &str = "contrail";
pub const CACHE_KEY: &str = "network.statistics.contrail";

pub struct ContrailDriver {
    settings: AnalyticsSettings,
    directory: Arc<dyn ResourceDirectory>,
}

impl ContrailDriver {
    pub fn new(settings: AnalyticsSettings, directory: Arc<dyn ResourceDirectory>) -> Self {
        Self {
            settings,
            directory,
        }
    }
}

impl Driver for ContrailDriver {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn get_sample_data(
        &self,
        meter_name: &str,
        resource: &ResourceUrl,
        cache: &mut SessionCache,
    ) -> Result<SampleStream> {
        let Some(meter) = meters::lookup(meter_name).filter(|m| m.family == MeterFamily::FloatingIp)
        else {
            debug!(meter = meter_name, driver = SCHEME, "Meter not implemented");
            return Ok(SampleStream::empty());
        };

        let endpoint = resource.endpoint();
        let clients = cache.get_or_try_insert_with(CACHE_KEY, || {
            DriverClients::connect(&endpoint, &self.settings, &self.directory)
        })?;

        Ok(SampleStream::floating_ip(FloatingIpSamples::new(
            clients,
            meter.extractor,
            StatsLookup::Interfaces,
            self.settings.auth_token.clone(),
        )))
    }
}
