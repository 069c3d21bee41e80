//! structural editor for block programs
//!
//! [`Diagram`] holds the canonical program and applies split, move, commit
//! and add edits; [`DragController`] drives those edits from pointer events.

mod diagram;
mod drag;
mod error;

pub use diagram::{extract_blocks, Diagram, RejectReason, SnapOutcome, DEFAULT_SPAWN_POSITION};
pub use drag::{DragController, DragSession, GeometryProvider, HoverTarget};
pub use error::StructuralError;
