//! program loading and validation errors

use std::path::PathBuf;

use thiserror::Error;

use super::types::BlockType;

/// error reading or writing a program document
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("invalid program JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// a broken tree invariant found by `BlockProgram::validate`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("duplicate block id '{0}'")]
    DuplicateId(String),

    #[error("block with empty id")]
    EmptyId,

    #[error("top-level block [{index}] '{id}' is a {block_type} statement; only once, forever or dummy may be top-level")]
    StatementAtTopLevel {
        id: String,
        block_type: BlockType,
        index: usize,
    },

    #[error("dummy '{id}' is nested inside '{parent}'")]
    NestedDummy { id: String, parent: String },

    #[error("{block_type} block '{id}' is nested inside '{parent}'")]
    NestedTopLevel {
        id: String,
        block_type: BlockType,
        parent: String,
    },
}
