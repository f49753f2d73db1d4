//! CLI integration tests

use serde_json::{json, Value};
use std::process::{Command, Output};

fn contrail_poll(args: &[&str], home: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_contrail-poll"))
        .args(args)
        .env("HOME", home)
        .env_remove("OS_AUTH_TOKEN")
        .env_remove("NEUTRON_URL")
        .env_remove("CONTRAIL_METER_CONFIG")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = contrail_poll(&["--help"], home.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Contrail traffic meters"), "Should show about");
    assert!(stdout.contains("poll"), "Should show poll command");
    assert!(stdout.contains("meters"), "Should show meters command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = contrail_poll(&["--version"], home.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("contrail-poll"), "Should show binary name");
}

#[test]
fn test_poll_help() {
    let home = tempfile::tempdir().unwrap();
    let output = contrail_poll(&["poll", "--help"], home.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--auth-token"));
    assert!(stdout.contains("--directory-url"));
    assert!(stdout.contains("--show-metrics"));
}

#[test]
fn test_poll_requires_resources() {
    let home = tempfile::tempdir().unwrap();
    let output = contrail_poll(&["poll", "ip.floating.receive.bytes"], home.path());
    assert!(!output.status.success());
}

#[test]
fn test_meters_json() {
    let home = tempfile::tempdir().unwrap();
    let output = contrail_poll(&["--format", "json", "meters"], home.path());
    assert!(output.status.success());

    let meters: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(meters.len(), 8);
    assert!(meters.iter().any(|m| m["name"] == "switch.port.transmit.bytes"
        && m["unit"] == "B"
        && m["family"] == "switch.port"));
    assert!(meters.iter().any(|m| m["name"] == "ip.floating.receive.packets"
        && m["unit"] == "packet"));
}

#[test]
fn test_unknown_meter_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = contrail_poll(
        &["poll", "network.incoming.bytes", "contrail://localhost:8081/"],
        home.path(),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Unknown meter"));
}

#[test]
fn test_poll_switch_ports_end_to_end() {
    let mut server = mockito::Server::new();
    let _ports = server
        .mock("GET", "/v2.0/ports")
        .with_status(200)
        .with_body(
            json!({"ports": [{
                "id": "P1", "device_id": "VM1", "tenant_id": "T1", "network_id": "N1"
            }]})
            .to_string(),
        )
        .create();
    let _uve = server
        .mock("GET", "/analytics/uves/virtual-machine/*")
        .with_status(200)
        .with_body(
            json!({"value": [{
                "name": "VM1",
                "value": {"UveVirtualMachineAgent": {"if_stats_list": [{
                    "name": "default-domain:demo:P1",
                    "in_pkts": 3, "out_pkts": 4, "in_bytes": 300, "out_bytes": 400
                }]}}
            }]})
            .to_string(),
        )
        .create();

    let home = tempfile::tempdir().unwrap();
    let directory_url = server.url();
    let resource = format!("opencontrail://{}/", server.host_with_port());
    let output = contrail_poll(
        &[
            "--format",
            "json",
            "poll",
            "switch.port.receive.bytes",
            &resource,
            "--directory-url",
            &directory_url,
        ],
        home.path(),
    );
    assert!(
        output.status.success(),
        "poll failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["meter"], "switch.port.receive.bytes");
    assert_eq!(report["unit"], "B");
    assert_eq!(report["failures"], json!([]));
    assert_eq!(report["samples"][0]["value"], 300);
    assert_eq!(report["samples"][0]["resource_id"], "P1");
    assert_eq!(report["samples"][0]["resource_meta"]["project"], "demo");
}

#[test]
fn test_poll_reports_failing_resource() {
    let mut server = mockito::Server::new();
    let _ports = server
        .mock("GET", "/v2.0/ports")
        .with_status(200)
        .with_body(json!({"ports": []}).to_string())
        .create();
    let _uve = server
        .mock("GET", "/analytics/uves/virtual-machine/*")
        .with_status(500)
        .create();

    let home = tempfile::tempdir().unwrap();
    let directory_url = server.url();
    let resource = format!("opencontrail://{}/", server.host_with_port());
    let output = contrail_poll(
        &[
            "--format",
            "json",
            "poll",
            "switch.port.receive.packets",
            &resource,
            "--directory-url",
            &directory_url,
        ],
        home.path(),
    );

    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["samples"], json!([]));
    assert_eq!(report["failures"][0]["resource"], resource.as_str());
}
