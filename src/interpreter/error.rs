use thiserror::Error;

use super::runner::RunnerError;
use crate::blocks::{BlockId, BlockType};
use crate::conditions::ConditionError;

/// fatal errors that stop a run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("block {block}: {source}")]
    Condition {
        block: BlockId,
        #[source]
        source: ConditionError,
    },

    #[error("cannot run block type {block_type} (block {block})")]
    UnknownBlockType { block: BlockId, block_type: BlockType },

    #[error("runner for block {block} failed: {source}")]
    Runner {
        block: BlockId,
        #[source]
        source: RunnerError,
    },
}

impl RunError {
    /// id of the block that failed
    pub fn block(&self) -> &str {
        match self {
            RunError::Condition { block, .. }
            | RunError::UnknownBlockType { block, .. }
            | RunError::Runner { block, .. } => block,
        }
    }
}
