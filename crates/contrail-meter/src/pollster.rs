//! Pollsters: the per-meter entry points exposed to the polling host
//!
//! A pollster polls one meter across the resource URLs of a pipeline,
//! dispatching each URL to the driver registered for its scheme.

use crate::driver::{DriverRegistry, ResourceUrl, SessionCache};
use crate::error::Error;
use crate::meters::{self, MeterSpec, METERS};
use crate::models::Sample;
use crate::observability::{PollerMetrics, StructuredLogger};
use std::time::Instant;

/// Resource whose emission stopped with an error
#[derive(Debug)]
pub struct ResourceFailure {
    pub resource: String,
    pub error: Error,
}

/// Outcome of polling one meter once
#[derive(Debug)]
pub struct CycleReport {
    pub meter: &'static str,
    pub unit: &'static str,
    /// Samples emitted before any failure, in emission order
    pub samples: Vec<Sample>,
    pub failures: Vec<ResourceFailure>,
}

impl CycleReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Poller of a single meter
#[derive(Debug, Clone, Copy)]
pub struct Pollster {
    meter: &'static MeterSpec,
}

impl Pollster {
    pub fn for_meter(name: &str) -> Option<Self> {
        meters::lookup(name).map(|meter| Self { meter })
    }

    /// One pollster per known meter
    pub fn all() -> impl Iterator<Item = Pollster> {
        METERS.iter().map(|meter| Pollster { meter })
    }

    pub fn meter(&self) -> &'static MeterSpec {
        self.meter
    }

    /// Poll every resource once, in order.
    ///
    /// A failing resource keeps the samples it yielded before the error and
    /// does not prevent the following resources from being polled.
    pub async fn poll(
        &self,
        registry: &DriverRegistry,
        resources: &[ResourceUrl],
        cache: &mut SessionCache,
    ) -> CycleReport {
        let metrics = PollerMetrics::new();
        let logger = StructuredLogger::new(self.meter.name);
        let started = Instant::now();
        logger.log_cycle_start(resources.len());

        let mut report = CycleReport {
            meter: self.meter.name,
            unit: self.meter.unit,
            samples: Vec::new(),
            failures: Vec::new(),
        };

        for resource in resources {
            let emitted_before = report.samples.len();
            if let Err(error) = self.poll_resource(registry, resource, cache, &mut report.samples).await {
                if error.is_analytics_failure() {
                    metrics.inc_analytics_failures();
                }
                metrics.inc_cycle_errors(self.meter.name);
                logger.log_resource_failure(resource.as_str(), &error);
                report.failures.push(ResourceFailure {
                    resource: resource.as_str().to_string(),
                    error,
                });
            }
            metrics.inc_samples(
                self.meter.name,
                (report.samples.len() - emitted_before) as u64,
            );
        }

        let elapsed = started.elapsed();
        metrics.observe_cycle(elapsed);
        logger.log_cycle_complete(report.samples.len(), report.failures.len(), elapsed);
        report
    }

    async fn poll_resource(
        &self,
        registry: &DriverRegistry,
        resource: &ResourceUrl,
        cache: &mut SessionCache,
        samples: &mut Vec<Sample>,
    ) -> crate::Result<()> {
        let driver = registry
            .get(resource.scheme())
            .ok_or_else(|| Error::UnknownDriver {
                scheme: resource.scheme().to_string(),
            })?;

        let mut stream = driver.get_sample_data(self.meter.name, resource, cache)?;
        while let Some(sample) = stream.next().await? {
            samples.push(sample);
        }
        Ok(())
    }
}
