//! OpenContrail analytics driver
//!
//! Resource URLs look like
//! `opencontrail://localhost:8081/?resource=fip_stats_list&virtual_network=default-domain:openstack:public`.
//!
//! Supported query parameters:
//! - `scheme`: scheme of the analytics endpoint (default `http`)
//! - `virtual_network`: only count floating IP stats of this network (default none)
//! - `fqdn_uuid`: VM to query (default `*`)
//! - `resource`: counter list to read, `if_stats_list` (VM interfaces, default)
//!   or `fip_stats_list` (floating IPs)
//!
//! The floating IP meters only use `scheme`.

use super::{
    Driver, DriverClients, FloatingIpSamples, ResourceUrl, SampleStream, SessionCache,
    StatsLookup, SwitchPortQuery, SwitchPortSamples,
};
use crate::analytics::WILDCARD;
use crate::config::AnalyticsSettings;
use crate::directory::ResourceDirectory;
use crate::error::Result;
use crate::meters::{self, MeterFamily};
use std::sync::Arc;
use tracing::debug;

pub const SCHEME: &str = "opencontrail";
pub const CACHE_KEY: &str = "network.statistics.opencontrail";

pub struct OpenContrailDriver {
    settings: AnalyticsSettings,
    directory: Arc<dyn ResourceDirectory>,
}

impl OpenContrailDriver {
    pub fn new(settings: AnalyticsSettings, directory: Arc<dyn ResourceDirectory>) -> Self {
        Self {
            settings,
            directory,
        }
    }

    fn switch_port_query(resource: &ResourceUrl) -> SwitchPortQuery {
        let defaults = SwitchPortQuery::default();
        SwitchPortQuery {
            resource: resource
                .param("resource")
                .map(str::to_string)
                .unwrap_or(defaults.resource),
            fqdn_uuid: resource
                .param("fqdn_uuid")
                .unwrap_or(WILDCARD)
                .to_string(),
            virtual_network: resource.param("virtual_network").map(str::to_string),
        }
    }
}

impl Driver for OpenContrailDriver {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn get_sample_data(
        &self,
        meter_name: &str,
        resource: &ResourceUrl,
        cache: &mut SessionCache,
    ) -> Result<SampleStream> {
        let Some(meter) = meters::lookup(meter_name) else {
            debug!(meter = meter_name, driver = SCHEME, "Meter not implemented");
            return Ok(SampleStream::empty());
        };

        let endpoint = resource.endpoint();
        let clients = cache.get_or_try_insert_with(CACHE_KEY, || {
            DriverClients::connect(&endpoint, &self.settings, &self.directory)
        })?;
        let token = self.settings.auth_token.clone();

        let stream = match meter.family {
            MeterFamily::FloatingIp => SampleStream::floating_ip(FloatingIpSamples::new(
                clients,
                meter.extractor,
                StatsLookup::VmStatistics,
                token,
            )),
            MeterFamily::SwitchPort => SampleStream::switch_port(SwitchPortSamples::new(
                clients,
                meter.extractor,
                Self::switch_port_query(resource),
                token,
            )),
        };
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_port_query_defaults() {
        let url = ResourceUrl::parse("opencontrail://localhost:8081/").unwrap();
        assert_eq!(
            OpenContrailDriver::switch_port_query(&url),
            SwitchPortQuery::default()
        );
    }

    #[test]
    fn test_switch_port_query_from_params() {
        let url = ResourceUrl::parse(
            "opencontrail://localhost:8081/?resource=fip_stats_list&fqdn_uuid=vm-1&virtual_network=default-domain:openstack:public",
        )
        .unwrap();
        let query = OpenContrailDriver::switch_port_query(&url);
        assert_eq!(query.resource, "fip_stats_list");
        assert_eq!(query.fqdn_uuid, "vm-1");
        assert_eq!(
            query.virtual_network.as_deref(),
            Some("default-domain:openstack:public")
        );
    }
}
