// integration tests for the new, check and tree commands

use crate::common::*;
use serde_json::json;

#[test]
fn test_new_writes_starter_program() {
    let ws = Workspace::new();

    let output = ws.run(&["new"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Created"));

    let program = ws.read_json("program.json");
    assert_eq!(program[0]["id"], "setup");
    assert_eq!(program[0]["type"], "once");
    assert_eq!(program[1]["id"], "loop");
    assert_eq!(program[1]["type"], "forever");
    assert_eq!(program[1]["children"], json!([]));
}

#[test]
fn test_new_refuses_to_overwrite() {
    let ws = Workspace::new();
    ws.write("program.json", "[]");

    let output = ws.run(&["new", "program.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--force"));
    assert_eq!(ws.read_json("program.json"), json!([]));

    let output = ws.run(&["new", "program.json", "--force"]);
    assert!(output.status.success());
    assert_eq!(ws.read_json("program.json").as_array().unwrap().len(), 2);
}

#[test]
fn test_check_valid_program() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["check", "program.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("valid"));

    let output = ws.run(&["--json", "check", "program.json"]);
    let response = json_response(&output);
    assert_eq!(response["result"]["valid"], true);
    assert_eq!(response["result"]["blocks"], 4);
}

#[test]
fn test_check_reports_every_problem() {
    let ws = Workspace::new();
    ws.write_json(
        "program.json",
        &json!([
            { "id": "setup", "type": "once", "children": [
                { "id": "w", "type": "wait", "condition": "speed above 5" },
                { "id": "w", "type": "log", "value": "dup" }
            ]},
            { "id": "stray", "type": "sleep", "value": 10 }
        ]),
    );

    let output = ws.run(&["check", "program.json"]);
    assert_eq!(output.status.code(), Some(4));
    let err = stderr(&output);
    assert!(err.contains("3 problem(s)"), "stderr: {}", err);
    assert!(err.contains("duplicate block id 'w'"));
    assert!(err.contains("stray"));
    assert!(err.contains("wait 'w'"));
}

#[test]
fn test_check_json_error_envelope() {
    let ws = Workspace::new();
    ws.write_json(
        "program.json",
        &json!([{ "id": "stray", "type": "log", "value": "x" }]),
    );

    let output = ws.run(&["--json", "check", "program.json"]);
    assert_eq!(output.status.code(), Some(4));

    let response = json_response(&output);
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["error"]["code"], -32004);
    assert_eq!(response["error"]["data"]["problems"].as_array().unwrap().len(), 1);
}

#[test]
fn test_check_malformed_and_missing_program() {
    let ws = Workspace::new();
    ws.write("broken.json", "[{\"id\": ");

    let output = ws.run(&["check", "broken.json"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("invalid program JSON"));

    let output = ws.run(&["check", "missing.json"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_tree_outline() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["tree", "program.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "once #setup @(0, 0)",
            "  log(first) #a",
            "  log(second) #b",
            "forever #main @(400, 0)",
        ]
    );
}

#[test]
fn test_tree_json_round_trips_program() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["--json", "tree", "program.json"]);
    let response = json_response(&output);
    assert_eq!(response["result"]["program"], sample_program());
}

#[test]
fn test_quiet_suppresses_success_output() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["--quiet", "tree", "program.json"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}
