//! Contrail analytics REST API
//!
//! Thin request/response mapping over the `/analytics/uves` endpoints:
//! each call issues one GET and pulls a nested field out of the UVE
//! (User-Visible Entity) returned for a virtual machine or interface.

mod client;

pub use client::AnalyticsClient;

/// UVE paths and the `cfilt` filters used by the meters
pub mod paths {
    pub const VIRTUAL_MACHINE: &str = "/analytics/uves/virtual-machine/";
    pub const VIRTUAL_MACHINE_INTERFACE: &str = "/analytics/uves/virtual-machine-interface/";

    pub const VM_AGENT: &str = "UveVirtualMachineAgent";
    pub const VMI_AGENT: &str = "UveVMInterfaceAgent";

    pub const INTERFACE_LIST_FILTER: &str = "cfilt=UveVirtualMachineAgent:interface_list";
    pub const FIP_AGG_STATS_FILTER: &str = "cfilt=UveVMInterfaceAgent:fip_agg_stats";
}

/// Identifier matching every virtual machine
pub const WILDCARD: &str = "*";
