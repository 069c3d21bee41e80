//! structural edits over a block program
//!
//! a drag detaches a block and every sibling after it into a floating
//! `dummy` holder, then a commit splices the holder's children into their new
//! parent and drops the holder. a holder whose drop found no parent stays
//! on the canvas as a permanent top-level block.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::StructuralError;
use crate::blocks::{find_block, Block, BlockId, BlockKind, BlockProgram, IdGenerator, Position};
use crate::snap::SnapType;

/// where new statements are parked until the user drags them into place
pub const DEFAULT_SPAWN_POSITION: Position = Position { x: 50.0, y: 50.0 };

/// why a commit was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// hover target is the dragged block
    SelfSnap,
    /// hover target is part of the dragged list
    InsideDragged,
}

/// result of [`Diagram::commit_snap`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SnapOutcome {
    /// the dragged list was spliced into `parent` starting at `index`
    Committed {
        parent: BlockId,
        index: usize,
        moved: usize,
    },
    /// no parent resolved; the holder stays floating
    Floating { dummy: BlockId },
    /// nothing is being dragged out of a holder
    NothingToCommit,
    Rejected { reason: RejectReason },
}

/// remove `first_id` and every following sibling from its parent
///
/// returns the remaining tree and the detached list in order; the input is
/// not modified
pub fn extract_blocks(
    program: &BlockProgram,
    first_id: &str,
) -> Result<(BlockProgram, Vec<Block>), StructuralError> {
    let mut remaining = program.clone();
    let extracted = take_blocks(&mut remaining, first_id)?;
    Ok((remaining, extracted))
}

/// in-place form of [`extract_blocks`]; on error nothing is changed
fn take_blocks(program: &mut BlockProgram, first_id: &str) -> Result<Vec<Block>, StructuralError> {
    if program.is_top_level(first_id) {
        return Err(StructuralError::TopLevel(first_id.to_string()));
    }

    let not_found = || StructuralError::NotFound(first_id.to_string());
    let children = program
        .find_parent_block_mut(first_id)
        .and_then(Block::children_mut)
        .ok_or_else(not_found)?;
    let index = children
        .iter()
        .position(|b| b.id == first_id)
        .ok_or_else(not_found)?;

    Ok(children.split_off(index))
}

/// owner of the canonical program plus the state needed to edit it
#[derive(Debug, Clone)]
pub struct Diagram {
    program: BlockProgram,
    ids: IdGenerator,
    spawn_position: Position,
}

impl Diagram {
    pub fn new(program: BlockProgram) -> Self {
        Self {
            program,
            ids: IdGenerator::new(),
            spawn_position: DEFAULT_SPAWN_POSITION,
        }
    }

    pub fn with_spawn_position(mut self, position: Position) -> Self {
        self.spawn_position = position;
        self
    }

    pub fn program(&self) -> &BlockProgram {
        &self.program
    }

    pub fn into_program(self) -> BlockProgram {
        self.program
    }

    /// a new empty holder at `position`; not yet part of the program
    pub fn create_dummy(&mut self, position: Position) -> Block {
        let id = self.ids.dummy_id(&self.program);
        Block::new(id, BlockKind::Dummy { children: vec![] }).with_position(position)
    }

    /// the top-level holder whose first child is `id`
    pub fn dummy_for(&self, id: &str) -> Option<&Block> {
        self.program.blocks().iter().find(|b| {
            b.is_dummy()
                && b.children()
                    .and_then(|c| c.first())
                    .is_some_and(|first| first.id == id)
        })
    }

    /// detach `id` and its trailing siblings into a new holder at `position`
    ///
    /// when a holder already starts with `id` it is reused, so one gesture
    /// never detaches twice. returns the holder id.
    pub fn on_split(&mut self, id: &str, position: Position) -> Result<BlockId, StructuralError> {
        if let Some(existing) = self.dummy_for(id) {
            return Ok(existing.id.clone());
        }

        let mut dummy = self.create_dummy(position);
        let extracted = take_blocks(&mut self.program, id)?;
        debug!(block = %id, dummy = %dummy.id, count = extracted.len(), "split");

        if let Some(children) = dummy.children_mut() {
            *children = extracted;
        }
        let dummy_id = dummy.id.clone();
        self.program.push(dummy);
        Ok(dummy_id)
    }

    /// move a top-level block and raise it to the end of the list
    ///
    /// returns false when `id` is not a top-level block
    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        let blocks = self.program.blocks_mut();
        let Some(index) = blocks.iter().position(|b| b.id == id) else {
            return false;
        };
        let block = blocks.remove(index);
        blocks.push(block.with_position(position));
        true
    }

    /// attach the list being dragged by `dragging` to `hover`
    pub fn commit_snap(&mut self, hover: &str, snap_type: SnapType, dragging: &str) -> SnapOutcome {
        let Some(dummy) = self.dummy_for(dragging) else {
            debug!(block = %dragging, "no detached list to commit");
            return SnapOutcome::NothingToCommit;
        };

        if hover == dragging {
            warn!(block = %hover, "trying to snap block to itself");
            return SnapOutcome::Rejected {
                reason: RejectReason::SelfSnap,
            };
        }
        let inside = hover == dummy.id || dummy.children().is_some_and(|c| find_block(c, hover).is_some());
        if inside {
            warn!(block = %dragging, hover = %hover, "trying to snap list into itself");
            return SnapOutcome::Rejected {
                reason: RejectReason::InsideDragged,
            };
        }
        let dummy_id = dummy.id.clone();

        info!("committing snap {} -> {}:{}", dragging, hover, snap_type);

        let Some((parent, index)) = self.resolve_target(hover, snap_type) else {
            debug!(dummy = %dummy_id, hover = %hover, "no parent resolved, list stays floating");
            return SnapOutcome::Floating { dummy: dummy_id };
        };

        let blocks = self.program.blocks_mut();
        let Some(position) = blocks.iter().position(|b| b.id == dummy_id) else {
            return SnapOutcome::NothingToCommit;
        };
        let mut holder = blocks.remove(position);
        let list = holder.children_mut().map(std::mem::take).unwrap_or_default();
        let moved = list.len();

        match self
            .program
            .find_block_mut(&parent)
            .and_then(Block::children_mut)
        {
            Some(children) => {
                let index = index.min(children.len());
                children.splice(index..index, list);
            }
            None => {
                // resolve_target only returns containers; put the holder back untouched
                if let Some(children) = holder.children_mut() {
                    *children = list;
                }
                self.program.blocks_mut().insert(position, holder);
                return SnapOutcome::Floating { dummy: dummy_id };
            }
        }

        SnapOutcome::Committed {
            parent,
            index,
            moved,
        }
    }

    /// new parent and insertion index for a drop on `hover`
    fn resolve_target(&self, hover: &str, snap_type: SnapType) -> Option<(BlockId, usize)> {
        match snap_type {
            SnapType::Inner => self
                .program
                .find_block(hover)
                .filter(|b| b.is_container())
                .map(|b| (b.id.clone(), 0)),
            SnapType::Append => {
                let parent = self.program.find_parent_block(hover)?;
                let index = parent.children()?.iter().position(|b| b.id == hover)?;
                Some((parent.id.clone(), index + 1))
            }
        }
    }

    /// add a new block with a fresh id
    ///
    /// `once`/`forever` go straight to the top level; anything else is parked
    /// in a new holder at the spawn position. returns the new block's id.
    pub fn add_block(&mut self, kind: BlockKind) -> BlockId {
        let id = self.ids.block_id(&self.program);
        let block = Block::new(id.clone(), kind);

        if block.block_type().is_top_level() {
            self.program.push(block.with_position(self.spawn_position));
        } else {
            let mut dummy = self.create_dummy(self.spawn_position);
            if let Some(children) = dummy.children_mut() {
                children.push(block);
            }
            self.program.push(dummy);
        }

        debug!(block = %id, "added block");
        id
    }

    /// edit a block's fields in place
    ///
    /// the id, position and children are kept; only the kind-specific fields
    /// of `kind` are applied
    pub fn update_block(&mut self, id: &str, kind: BlockKind) -> Result<(), StructuralError> {
        let block = self
            .program
            .find_block_mut(id)
            .ok_or_else(|| StructuralError::NotFound(id.to_string()))?;

        let children = block.children_mut().map(std::mem::take);
        block.kind = kind;
        if let (Some(old), Some(new)) = (children, block.children_mut()) {
            *new = old;
        }
        Ok(())
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(BlockProgram::starter())
    }
}
