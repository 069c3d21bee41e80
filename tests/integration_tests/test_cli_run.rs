// integration tests for the eval and run commands

use crate::common::*;
use serde_json::json;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn status(speed: i64) -> serde_json::Value {
    json!([
        { "name": "AB12", "speed": speed, "direction": "forward" },
        { "name": "CD34", "speed": 0 }
    ])
}

#[test]
fn test_eval_condition() {
    let ws = Workspace::new();
    ws.write_json("status.json", &status(600));

    let output = ws.run(&["eval", "AB12:speed >= 500", "--devices", "status.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "true");

    let output = ws.run(&["--json", "eval", "CD34:speed == 1", "--devices", "status.json"]);
    let response = json_response(&output);
    assert_eq!(response["result"]["result"], false);
    assert_eq!(response["result"]["condition"], "CD34:speed == 1");
}

#[test]
fn test_eval_uses_configured_devices_file() {
    let ws = Workspace::new();
    let status_path = ws.write_json("status.json", &status(10));
    ws.write_json(
        "config.json",
        &json!({ "devices_file": status_path.to_str().unwrap() }),
    );

    let output = ws.run(&["eval", "AB12:speed < 20"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "true");
}

#[test]
fn test_eval_errors() {
    let ws = Workspace::new();
    ws.write_json("status.json", &status(600));

    let output = ws.run(&["eval", "ZZ99:speed > 1", "--devices", "status.json"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("ZZ99"));

    let output = ws.run(&["eval", "speed > 1", "--devices", "status.json"]);
    assert_eq!(output.status.code(), Some(5));

    let output = ws.run(&["eval", "AB12:speed > 1"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--devices"));
}

#[test]
fn test_run_once_prints_logs_and_device_writes() {
    let ws = Workspace::new();
    ws.write_json(
        "program.json",
        &json!([
            { "id": "setup", "type": "once", "children": [
                { "id": "l1", "type": "log", "value": "starting" },
                { "id": "d1", "type": "device-set", "device": "AB12", "prop": "speed", "value": 300 },
                { "id": "r", "type": "loop", "count": 2, "children": [
                    { "id": "l2", "type": "log", "value": "lap" }
                ]}
            ]},
            { "id": "main", "type": "forever", "children": [] }
        ]),
    );

    let output = ws.run(&["run", "program.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.lines().any(|l| l == "starting"));
    assert_eq!(text.lines().filter(|l| *l == "lap").count(), 2);

    let write: serde_json::Value = text
        .lines()
        .find(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).unwrap())
        .expect("no device write printed");
    assert_eq!(write, json!({ "device": "AB12", "prop": "speed", "value": 300 }));
}

#[test]
fn test_run_forever_with_pass_limit() {
    let ws = Workspace::new();
    ws.write_json(
        "program.json",
        &json!([
            { "id": "main", "type": "forever", "children": [
                { "id": "t", "type": "log", "value": "tick" }
            ]}
        ]),
    );

    let output = ws.run(&["--json", "run", "program.json", "--passes", "3"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert_eq!(text.lines().filter(|l| *l == "tick").count(), 3);

    let response = json_response(&output);
    assert_eq!(response["result"]["forever_passes"], 3);
    assert_eq!(response["result"]["once_ran"], false);
    assert_eq!(response["result"]["cancelled"], false);
}

#[test]
fn test_run_simulate_feeds_writes_back_into_conditions() {
    let ws = Workspace::new();
    ws.write_json("status.json", &status(0));
    ws.write_json(
        "program.json",
        &json!([
            { "id": "setup", "type": "once", "children": [
                { "id": "go", "type": "device-set", "device": "AB12", "prop": "speed", "value": "600" },
                { "id": "w", "type": "wait", "condition": "AB12:speed >= 500" },
                { "id": "i", "type": "if", "condition": "CD34:speed = 0", "children": [
                    { "id": "ok", "type": "log", "value": "ready" }
                ]}
            ]}
        ]),
    );

    let output = ws.run(&["run", "program.json", "--devices", "status.json", "--simulate"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).lines().any(|l| l == "ready"));
}

#[test]
fn test_run_picks_up_device_file_changes() {
    let ws = Workspace::new();
    let status_path = ws.write_json("status.json", &status(0));
    ws.write_json(
        "program.json",
        &json!([
            { "id": "setup", "type": "once", "children": [
                { "id": "w", "type": "wait", "condition": "AB12:speed > 100" },
                { "id": "l", "type": "log", "value": "moving" }
            ]}
        ]),
    );

    let mut child = Command::new(railblocks_binary())
        .current_dir(ws.dir.path())
        .arg("--config")
        .arg(ws.config_path())
        .args(["run", "program.json", "--devices", "status.json"])
        .env_remove("RAILBLOCKS_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run railblocks");

    std::thread::sleep(Duration::from_millis(200));
    assert!(child.try_wait().unwrap().is_none(), "run finished before the device moved");

    std::fs::write(&status_path, status(250).to_string()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while child.try_wait().unwrap().is_none() {
        if Instant::now() > deadline {
            child.kill().ok();
            panic!("run did not notice the device status change");
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).lines().any(|l| l == "moving"));
}

#[test]
fn test_run_condition_failure_is_fatal() {
    let ws = Workspace::new();
    ws.write_json(
        "program.json",
        &json!([
            { "id": "setup", "type": "once", "children": [
                { "id": "before", "type": "log", "value": "before" },
                { "id": "bad", "type": "if", "condition": "XX99:speed > 1", "children": [] },
                { "id": "after", "type": "log", "value": "after" }
            ]}
        ]),
    );

    let output = ws.run(&["run", "program.json"]);
    assert_eq!(output.status.code(), Some(6));

    let text = stdout(&output);
    assert!(text.lines().any(|l| l == "before"));
    assert!(!text.lines().any(|l| l == "after"));
    assert!(stderr(&output).contains("XX99"));
}

#[test]
fn test_run_bad_devices_file() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());
    ws.write("status.json", "{\"AB12\": 5}");

    let output = ws.run(&["run", "program.json", "--devices", "status.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("device status"));
}
