use thiserror::Error;

use crate::blocks::BlockId;

/// a structural edit that cannot be applied; the tree is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("block '{0}' not found")]
    NotFound(BlockId),

    #[error("block '{0}' is top-level and cannot be split from a parent")]
    TopLevel(BlockId),
}
