//! pointer-driven drag gestures
//!
//! turns pointer down/move/up into diagram edits. rendering is external:
//! a [`GeometryProvider`] answers which blocks sit under a point and where a
//! block is drawn.

use serde::Serialize;
use tracing::debug;

use super::diagram::{Diagram, SnapOutcome};
use super::error::StructuralError;
use crate::blocks::{find_block, BlockId, Position};
use crate::snap::{choose_snap, declared_snap_points, resolve_snap_points, BoundingBox, SnapType};

/// access to the rendered layout
pub trait GeometryProvider {
    /// ids of the blocks drawn at a point, topmost first
    fn blocks_at(&self, point: Position) -> Vec<BlockId>;

    /// current on-screen box of a block
    fn bounding_box(&self, id: &str) -> Option<BoundingBox>;
}

/// block and snap type a drop would attach to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverTarget {
    pub id: BlockId,
    pub snap_type: SnapType,
}

/// state of one pointer gesture
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub dragged_id: BlockId,
    /// holder created by the first move, if the dragged block was split out
    pub dummy_id: Option<BlockId>,
    /// pointer position at pointer-down
    pub anchor: Position,
    /// element position at pointer-down
    pub initial: Position,
    pub hover: Option<HoverTarget>,
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// start dragging `id`; returns false when the block does not exist
    pub fn pointer_down(
        &mut self,
        diagram: &Diagram,
        geometry: &dyn GeometryProvider,
        id: &str,
        pointer: Position,
    ) -> bool {
        let Some(block) = diagram.program().find_block(id) else {
            return false;
        };

        let initial = block
            .position
            .or_else(|| geometry.bounding_box(id).map(|b| Position::new(b.x, b.y)))
            .unwrap_or(pointer);

        self.session = Some(DragSession {
            dragged_id: id.to_string(),
            dummy_id: None,
            anchor: pointer,
            initial,
            hover: None,
        });
        true
    }

    /// follow the pointer, returning the current snap candidate
    ///
    /// the first move of a nested block splits it (and its trailing
    /// siblings) out into a holder; top-level blocks just move
    pub fn pointer_move(
        &mut self,
        diagram: &mut Diagram,
        geometry: &dyn GeometryProvider,
        pointer: Position,
    ) -> Result<Option<HoverTarget>, StructuralError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        if diagram.program().find_block(&session.dragged_id).is_none() {
            debug!(block = %session.dragged_id, "dragged block not found");
            return Ok(None);
        }

        let splittable = !diagram.program().is_top_level(&session.dragged_id);

        if session.dummy_id.is_none() && splittable {
            let dummy = diagram.on_split(&session.dragged_id, session.initial)?;
            diagram.set_position(&dummy, session.initial);
            session.dummy_id = Some(dummy);
        } else {
            let moved = session.dummy_id.as_deref().unwrap_or(&session.dragged_id);
            let position = session
                .initial
                .offset(pointer.x - session.anchor.x, pointer.y - session.anchor.y);
            diagram.set_position(moved, position);
        }

        session.hover = if splittable {
            find_hover(diagram, geometry, &session.dragged_id, pointer)
        } else {
            None
        };
        Ok(session.hover.clone())
    }

    /// end the gesture, committing the snap under the pointer if any
    pub fn pointer_up(&mut self, diagram: &mut Diagram) -> Option<SnapOutcome> {
        let session = self.session.take()?;
        let hover = session.hover?;
        Some(diagram.commit_snap(&hover.id, hover.snap_type, &session.dragged_id))
    }
}

/// topmost block under the pointer that can take the dragged list
fn find_hover(
    diagram: &Diagram,
    geometry: &dyn GeometryProvider,
    dragged: &str,
    pointer: Position,
) -> Option<HoverTarget> {
    let holder = diagram.dummy_for(dragged);
    let dragged_list = holder.and_then(|d| d.children());
    // the holder and its list follow the pointer and are drawn on top
    let id = geometry.blocks_at(pointer).into_iter().find(|id| {
        id != dragged
            && holder.map_or(true, |h| &h.id != id)
            && dragged_list.map_or(true, |list| find_block(list, id).is_none())
    })?;

    let block = diagram.program().find_block(&id)?;
    let bbox = geometry.bounding_box(&id)?;
    let points = resolve_snap_points(&bbox, &declared_snap_points(block.block_type()));
    let snap_type = choose_snap(&points, pointer.y)?.snap_type;

    Some(HoverTarget { id, snap_type })
}
