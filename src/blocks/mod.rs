//! block programs: the nested document edited by the diagram and walked by the interpreter
//!
//! a program is an ordered list of top-level blocks. each top-level block is a
//! long-lived container (once, forever) or a floating dummy; statements only
//! ever appear as children of a container.

mod error;
mod ids;
mod tree;
mod types;

pub use error::{InvariantViolation, ProgramError};
pub use ids::IdGenerator;
pub use tree::{find_block, find_parent_block, BlockProgram};
pub use types::{
    Block, BlockId, BlockKind, BlockType, Position, Scalar, DEFAULT_LOOP_COUNT, DEFAULT_SLEEP_MS,
};

pub(crate) use types::numeric_text;
