//! One-shot polling command

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use contrail_meter::directory::NeutronClient;
use contrail_meter::{
    CycleReport, DriverRegistry, PollerConfig, PollerMetrics, Pollster, ResourceUrl, Sample,
    SessionCache,
};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;
use tracing::debug;

use crate::output::{format_value, print_success, print_table, print_warning, OutputFormat};

/// Row for the sample table
#[derive(Tabled, Serialize)]
struct SampleRow {
    #[tabled(rename = "Resource")]
    resource_id: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
}

#[derive(Serialize)]
struct FailureJson {
    resource: String,
    error: String,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    meter: &'static str,
    unit: &'static str,
    samples: &'a [Sample],
    failures: Vec<FailureJson>,
}

/// Poll `meter` once across `resources` and print the samples
pub async fn poll_meter(
    config: &PollerConfig,
    meter: &str,
    resources: &[String],
    show_metrics: bool,
    format: OutputFormat,
) -> Result<()> {
    let pollster = Pollster::for_meter(meter).ok_or_else(|| {
        anyhow!(
            "Unknown meter '{}' (run `contrail-poll meters` for the list)",
            meter
        )
    })?;

    let resources = resources
        .iter()
        .map(|url| ResourceUrl::parse(url))
        .collect::<contrail_meter::Result<Vec<_>>>()
        .context("Invalid resource URL")?;

    let directory =
        NeutronClient::new(&config.directory).context("Failed to create Neutron client")?;
    let registry = DriverRegistry::with_defaults(config, Arc::new(directory));
    debug!(schemes = ?registry.schemes(), "Drivers registered");

    let mut cache = SessionCache::new();
    let report = pollster.poll(&registry, &resources, &mut cache).await;

    print_report(&report, format)?;

    if show_metrics {
        println!();
        print!("{}", PollerMetrics::new().render());
    }

    if !report.is_complete() {
        bail!(
            "{} of {} resource(s) failed for meter {}",
            report.failures.len(),
            resources.len(),
            report.meter
        );
    }
    Ok(())
}

fn print_report(report: &CycleReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = ReportJson {
                meter: report.meter,
                unit: report.unit,
                samples: &report.samples,
                failures: report
                    .failures
                    .iter()
                    .map(|failure| FailureJson {
                        resource: failure.resource.clone(),
                        error: failure.error.to_string(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("{} ({})", report.meter.bold(), report.unit);
            let rows: Vec<SampleRow> = report
                .samples
                .iter()
                .map(|sample| SampleRow {
                    resource_id: sample.resource_id.clone(),
                    value: format_value(sample.value, report.unit),
                    timestamp: sample.timestamp.clone(),
                })
                .collect();
            print_table(&rows, format);

            for failure in &report.failures {
                print_warning(&format!("{}: {}", failure.resource, failure.error));
            }
            if report.is_complete() {
                print_success(&format!("{} sample(s) emitted", report.samples.len()));
            }
        }
    }
    Ok(())
}
