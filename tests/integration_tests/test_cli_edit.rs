// integration tests for the add and move commands

use crate::common::*;
use serde_json::json;

fn child_ids(block: &serde_json::Value) -> Vec<String> {
    block["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

fn find<'a>(program: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    program
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == id)
        .unwrap_or_else(|| panic!("no top-level block {}", id))
}

#[test]
fn test_add_statement_parks_it_in_a_holder() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["add", "program.json", "--kind", "log", "--value", "hello"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let id = stdout(&output).trim().to_string();
    assert!(!id.is_empty());

    let program = ws.read_json("program.json");
    let holder = find(&program, "DUMMY_1");
    assert_eq!(holder["type"], "dummy");
    assert_eq!(holder["position"], json!({ "x": 50.0, "y": 50.0 }));
    assert_eq!(holder["children"][0]["id"], id.as_str());
    assert_eq!(holder["children"][0]["value"], "hello");
}

#[test]
fn test_add_uses_configured_spawn_position() {
    let ws = Workspace::new();
    ws.write_json(
        "config.json",
        &json!({ "settings": { "spawn_position": { "x": 10.0, "y": 20.0 } } }),
    );
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["--json", "add", "program.json", "--kind", "sleep", "--value", "250"]);
    let response = json_response(&output);
    assert_eq!(response["result"]["type"], "sleep");
    assert_eq!(response["result"]["dummy"], "DUMMY_1");

    let program = ws.read_json("program.json");
    let holder = find(&program, "DUMMY_1");
    assert_eq!(holder["position"], json!({ "x": 10.0, "y": 20.0 }));
    assert_eq!(holder["children"][0]["value"], 250);
}

#[test]
fn test_add_container_goes_top_level() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["--json", "add", "program.json", "--kind", "forever"]);
    let response = json_response(&output);
    assert!(response["result"].get("dummy").is_none());

    let program = ws.read_json("program.json");
    assert_eq!(program.as_array().unwrap().len(), 3);
    assert_eq!(program[2]["type"], "forever");
}

#[test]
fn test_add_invalid_arguments() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["add", "program.json", "--kind", "device-set", "--device", "AB12"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--prop"));

    let output = ws.run(&["add", "program.json", "--kind", "dummy"]);
    assert_eq!(output.status.code(), Some(2));

    // rejected by clap before the command runs
    let output = ws.run(&["add", "program.json", "--kind", "teleport"]);
    assert_eq!(output.status.code(), Some(2));

    assert_eq!(ws.read_json("program.json"), sample_program());
}

#[test]
fn test_move_nests_list_into_container() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    let output = ws.run(&["move", "program.json", "a", "--onto", "main", "--snap", "inner"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Moved 2 block(s) into main at 0"));

    let program = ws.read_json("program.json");
    assert_eq!(child_ids(find(&program, "main")), vec!["a", "b"]);
    assert!(child_ids(find(&program, "setup")).is_empty());
    assert_eq!(program.as_array().unwrap().len(), 2);
}

#[test]
fn test_move_append_after_sibling() {
    let ws = Workspace::new();
    ws.write_json(
        "program.json",
        &json!([
            { "id": "setup", "type": "once", "children": [
                { "id": "a", "type": "log", "value": "a" },
                { "id": "b", "type": "log", "value": "b" }
            ]},
            { "id": "main", "type": "forever", "children": [
                { "id": "c", "type": "log", "value": "c" },
                { "id": "d", "type": "log", "value": "d" }
            ]}
        ]),
    );

    let output = ws.run(&["--json", "move", "program.json", "b", "--onto", "c"]);
    let response = json_response(&output);
    assert_eq!(response["result"]["outcome"], "committed");
    assert_eq!(response["result"]["parent"], "main");
    assert_eq!(response["result"]["index"], 1);
    assert_eq!(response["result"]["moved"], 1);

    let program = ws.read_json("program.json");
    assert_eq!(child_ids(find(&program, "main")), vec!["c", "b", "d"]);
    assert_eq!(child_ids(find(&program, "setup")), vec!["a"]);
}

#[test]
fn test_move_floating_list_by_its_head() {
    let ws = Workspace::new();
    ws.write_json(
        "program.json",
        &json!([
            { "id": "main", "type": "forever", "children": [] },
            { "id": "DUMMY_1", "type": "dummy", "position": { "x": 5.0, "y": 5.0 }, "children": [
                { "id": "x", "type": "sleep", "value": 10 },
                { "id": "y", "type": "log", "value": "y" }
            ]}
        ]),
    );

    let output = ws.run(&["move", "program.json", "x", "--onto", "main", "--snap", "inner"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let program = ws.read_json("program.json");
    assert_eq!(program.as_array().unwrap().len(), 1);
    assert_eq!(child_ids(&program[0]), vec!["x", "y"]);
}

#[test]
fn test_move_rejections() {
    let ws = Workspace::new();
    ws.write_json("program.json", &sample_program());

    // onto itself
    let output = ws.run(&["move", "program.json", "a", "--onto", "a"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("itself"));

    // onto a block that travels with it
    let output = ws.run(&["--json", "move", "program.json", "a", "--onto", "b"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json_response(&output)["error"]["code"], -32002);

    // top-level blocks are never split
    let output = ws.run(&["move", "program.json", "setup", "--onto", "main"]);
    assert_eq!(output.status.code(), Some(2));

    let output = ws.run(&["move", "program.json", "zz", "--onto", "main"]);
    assert_eq!(output.status.code(), Some(2));

    assert_eq!(ws.read_json("program.json"), sample_program());
}
