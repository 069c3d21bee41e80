// integration tests for the config command

use crate::common::*;
use serde_json::json;

#[test]
fn test_config_show_fills_defaults() {
    let ws = Workspace::new();

    let output = ws.run(&["config", "show"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let shown: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(shown["settings"]["tick_hz"], 1000);
    assert_eq!(shown["settings"]["poll_interval_ms"], 20);
    assert_eq!(shown["settings"]["log_level"], "warn");
    assert_eq!(shown["devices_file"], serde_json::Value::Null);
}

#[test]
fn test_config_path_prints_override() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "path"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), ws.config_path().display().to_string());
}

#[test]
fn test_config_set_persists() {
    let ws = Workspace::new();

    let output = ws.run(&["config", "set", "settings.tick_hz", "30"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Set settings.tick_hz = 30"));
    assert_eq!(ws.read_json("config.json")["settings"]["tick_hz"], 30);

    let output = ws.run(&["config", "set", "settings.tick_hz", "fast"]);
    assert_eq!(output.status.code(), Some(2));

    let output = ws.run(&["config", "set", "settings.colour", "red"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown config key"));
}

#[test]
fn test_config_default_is_valid_json() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "default"]);
    assert!(output.status.success());

    let default: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(default["settings"]["tick_hz"], 60);
    assert_eq!(default["settings"]["spawn_position"], json!({ "x": 50.0, "y": 50.0 }));
}

#[test]
fn test_config_verify() {
    let ws = Workspace::new();

    let output = ws.run(&["config", "verify"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("valid"));

    ws.write(
        "config.json",
        "{ settings: { tick_hz: 0, poll_interval_ms: 0, }, // json5 is accepted\n }",
    );
    let output = ws.run(&["config", "verify"]);
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("2 error(s)"), "stderr: {}", err);
    assert!(err.contains("tick_hz"));
    assert!(err.contains("poll_interval_ms"));
}

#[test]
fn test_broken_config_only_fails_commands_that_need_it() {
    let ws = Workspace::new();
    ws.write("config.json", "{ not json");
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["tree", "program.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = ws.run(&["run", "program.json"]);
    assert_eq!(output.status.code(), Some(3));

    let output = ws.run(&["--json", "config", "show"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(json_response(&output)["error"]["code"], -32003);
}
