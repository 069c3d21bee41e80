//! output formatting for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}

use serde::Serialize;

use crate::blocks::{BlockId, BlockProgram};
use crate::editor::SnapOutcome;

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// priority: quiet > json > text
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if json {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

/// JSON-RPC 2.0 error object
#[derive(Serialize)]
pub struct RpcError {
    /// exit code offset by -32000 (application error range)
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

#[derive(Serialize)]
pub struct ErrorData {
    pub problems: Vec<String>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: None,
            },
            id: None,
        }
    }

    pub fn with_problems(code: i32, message: impl Into<String>, problems: Vec<String>) -> Self {
        let mut error = Self::new(code, message);
        if !problems.is_empty() {
            error.error.data = Some(ErrorData { problems });
        }
        error
    }
}

/// convert an exit code to a JSON-RPC error code
/// JSON-RPC reserves -32000 to -32099 for server/application errors
fn to_jsonrpc_code(exit_code: i32) -> i32 {
    -32000 - exit_code
}

// ============================================================================
// Result data structures for different commands
// ============================================================================

#[derive(Serialize)]
pub struct NewData {
    pub path: String,
    pub blocks: usize,
}

#[derive(Serialize)]
pub struct CheckData {
    pub program: String,
    pub blocks: usize,
    pub valid: bool,
}

#[derive(Serialize)]
pub struct TreeData<'a> {
    pub program: &'a BlockProgram,
}

#[derive(Serialize)]
pub struct AddData {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: &'static str,
    /// holder the new block was parked in, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dummy: Option<BlockId>,
}

#[derive(Serialize)]
pub struct MoveData {
    pub block: BlockId,
    pub onto: BlockId,
    #[serde(flatten)]
    pub outcome: SnapOutcome,
}

#[derive(Serialize)]
pub struct EvalData {
    pub condition: String,
    pub result: bool,
}

// ============================================================================
// Output functions
// ============================================================================

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

/// print JSON-RPC error to stdout
pub fn print_json_error(code: i32, message: &str, problems: Vec<String>) {
    let error = JsonRpcError::with_problems(code, message, problems);
    if let Ok(json) = serde_json::to_string(&error) {
        println!("{}", json);
    }
}
