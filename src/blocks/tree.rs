//! the program tree: top-level list, lookups and invariant checks

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{InvariantViolation, ProgramError};
use super::types::{Block, BlockType};

/// ordered list of top-level blocks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockProgram {
    blocks: Vec<Block>,
}

impl BlockProgram {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// a fresh program with one `once` and one `forever` container
    pub fn starter() -> Self {
        Self::new(vec![
            Block::new("setup", BlockType::Once.default_kind()),
            Block::new("loop", BlockType::Forever.default_kind()),
        ])
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// depth-first search over the whole tree
    pub fn find_block(&self, id: &str) -> Option<&Block> {
        find_block(&self.blocks, id)
    }

    pub fn find_block_mut(&mut self, id: &str) -> Option<&mut Block> {
        find_block_mut(&mut self.blocks, id)
    }

    /// the container whose children hold `id`; None when `id` is top-level or absent
    pub fn find_parent_block(&self, id: &str) -> Option<&Block> {
        find_parent_block(&self.blocks, id)
    }

    pub fn find_parent_block_mut(&mut self, id: &str) -> Option<&mut Block> {
        find_parent_block_mut(&mut self.blocks, id)
    }

    pub fn is_top_level(&self, id: &str) -> bool {
        self.blocks.iter().any(|b| b.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find_block(id).is_some()
    }

    /// the first top-level block of the given type
    pub fn first_of_type(&self, block_type: BlockType) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_type() == block_type)
    }

    /// every block id, depth-first in document order
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_ids(&self.blocks, &mut out);
        out
    }

    /// check the structural invariants, returning every violation found
    pub fn validate(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for (index, block) in self.blocks.iter().enumerate() {
            let block_type = block.block_type();
            if !block_type.is_top_level() && block_type != BlockType::Dummy {
                violations.push(InvariantViolation::StatementAtTopLevel {
                    id: block.id.clone(),
                    block_type,
                    index,
                });
            }
            validate_subtree(block, &mut seen, &mut violations);
        }

        violations
    }

    /// indented outline, one block per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            write_outline(block, 0, &mut out);
        }
        out
    }

    pub fn from_json(content: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ProgramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ProgramError> {
        let content = fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProgramError> {
        let content = self.to_json_pretty()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ProgramError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        // write to temp, then rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|source| ProgramError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, path).map_err(|source| ProgramError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl From<Vec<Block>> for BlockProgram {
    fn from(blocks: Vec<Block>) -> Self {
        Self::new(blocks)
    }
}

pub fn find_block<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = block.children().and_then(|c| find_block(c, id)) {
            return Some(found);
        }
    }
    None
}

pub fn find_block_mut<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    for block in blocks.iter_mut() {
        if block.id == id {
            return Some(block);
        }
        if let Some(children) = block.children_mut() {
            if let Some(found) = find_block_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_parent_block<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    for block in blocks {
        if block.id == id {
            return None;
        }
        if let Some(children) = block.children() {
            if children.iter().any(|c| c.id == id) {
                return Some(block);
            }
            if let Some(parent) = find_parent_block(children, id) {
                return Some(parent);
            }
        }
    }
    None
}

pub fn find_parent_block_mut<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    for block in blocks.iter_mut() {
        if block.id == id {
            return None;
        }
        let holds = block
            .children()
            .is_some_and(|children| children.iter().any(|c| c.id == id));
        if holds {
            return Some(block);
        }
        if let Some(children) = block.children_mut() {
            if let Some(parent) = find_parent_block_mut(children, id) {
                return Some(parent);
            }
        }
    }
    None
}

fn collect_ids<'a>(blocks: &'a [Block], out: &mut Vec<&'a str>) {
    for block in blocks {
        out.push(&block.id);
        if let Some(children) = block.children() {
            collect_ids(children, out);
        }
    }
}

fn validate_subtree<'a>(
    block: &'a Block,
    seen: &mut HashSet<&'a str>,
    violations: &mut Vec<InvariantViolation>,
) {
    if block.id.is_empty() {
        violations.push(InvariantViolation::EmptyId);
    } else if !seen.insert(&block.id) {
        violations.push(InvariantViolation::DuplicateId(block.id.clone()));
    }

    if let Some(children) = block.children() {
        for child in children {
            match child.block_type() {
                BlockType::Dummy => violations.push(InvariantViolation::NestedDummy {
                    id: child.id.clone(),
                    parent: block.id.clone(),
                }),
                t if t.is_top_level() => violations.push(InvariantViolation::NestedTopLevel {
                    id: child.id.clone(),
                    block_type: t,
                    parent: block.id.clone(),
                }),
                _ => {}
            }
            validate_subtree(child, seen, violations);
        }
    }
}

fn write_outline(block: &Block, depth: usize, out: &mut String) {
    let _ = write!(out, "{}{}", "  ".repeat(depth), block);
    if let Some(p) = block.position {
        let _ = write!(out, " @({}, {})", p.x, p.y);
    }
    out.push('\n');
    if let Some(children) = block.children() {
        for child in children {
            write_outline(child, depth + 1, out);
        }
    }
}
