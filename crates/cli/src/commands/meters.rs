//! Meter listing command

use anyhow::Result;
use contrail_meter::Pollster;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct MeterRow {
    #[tabled(rename = "Meter")]
    name: &'static str,
    #[tabled(rename = "Family")]
    family: &'static str,
    #[tabled(rename = "Unit")]
    unit: &'static str,
    #[tabled(rename = "Counter")]
    field: &'static str,
}

/// List the meters a pollster exists for
pub fn list_meters(format: OutputFormat) -> Result<()> {
    let rows: Vec<MeterRow> = Pollster::all()
        .map(|pollster| {
            let meter = pollster.meter();
            MeterRow {
                name: meter.name,
                family: meter.family.as_str(),
                unit: meter.unit,
                field: meter.field,
            }
        })
        .collect();

    print_table(&rows, format);
    Ok(())
}
