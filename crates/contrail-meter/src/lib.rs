//! Network traffic meters backed by Contrail analytics
//!
//! This crate provides:
//! - A client for the Contrail analytics UVE REST API
//! - A resource directory interface for floating IPs and ports (Neutron)
//! - Drivers joining both into floating IP and switch port traffic samples
//! - Pollsters, the per-meter entry points for a polling host
//! - Configuration and observability

pub mod analytics;
pub mod config;
pub mod directory;
pub mod driver;
pub mod error;
pub mod meters;
pub mod models;
pub mod observability;
pub mod pollster;

pub use crate::config::PollerConfig;
pub use crate::driver::{Driver, DriverRegistry, ResourceUrl, SampleStream, SessionCache};
pub use crate::error::{Error, Result};
pub use crate::models::*;
pub use crate::observability::{PollerMetrics, StructuredLogger};
pub use crate::pollster::{CycleReport, Pollster};
