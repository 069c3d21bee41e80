//! exit codes for railblocks commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

use thiserror::Error;

use crate::blocks::ProgramError;
use crate::conditions::ConditionError;
use crate::editor::StructuralError;
use crate::interpreter::RunError;

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// invalid command-line arguments or an edit that cannot be applied
pub const INVALID_ARGS: i32 = 2;

/// configuration file error
pub const CONFIG_ERROR: i32 = 3;

/// program file missing, malformed or breaking a tree invariant
pub const PROGRAM_ERROR: i32 = 4;

/// condition text that does not parse or names an unknown device
pub const CONDITION_ERROR: i32 = 5;

/// program stopped on a fatal run error
pub const RUN_ERROR: i32 = 6;

/// failure carrying an explicit exit code and any per-item problems
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
    pub problems: Vec<String>,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            problems: Vec::new(),
        }
    }

    pub fn with_problems(mut self, problems: Vec<String>) -> Self {
        self.problems = problems;
        self
    }
}

/// exit code for an error returned by a command
///
/// looks through the whole context chain so `.context(...)` keeps the code
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ExitError>() {
            return e.code;
        }
        if cause.is::<ProgramError>() {
            return PROGRAM_ERROR;
        }
        if cause.is::<ConditionError>() {
            return CONDITION_ERROR;
        }
        if cause.is::<StructuralError>() {
            return INVALID_ARGS;
        }
        if cause.is::<RunError>() {
            return RUN_ERROR;
        }
    }
    ERROR
}
