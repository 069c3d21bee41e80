//! declared snap points for each block kind

use crate::blocks::BlockType;

use super::SnapPoint;

/// vertical inset of the nesting slot inside a container
const INNER_TOP: f64 = 88.0;
/// horizontal inset of the nesting slot inside a container
const INNER_LEFT: f64 = 29.0;

/// anchors a block of this type offers to a dragged list
pub fn declared_snap_points(block_type: BlockType) -> Vec<SnapPoint> {
    match block_type {
        BlockType::Once | BlockType::Forever => vec![SnapPoint::inner(INNER_TOP, INNER_LEFT)],
        BlockType::Loop | BlockType::If => vec![
            SnapPoint::inner(INNER_TOP, INNER_LEFT),
            SnapPoint::append(0.0),
        ],
        BlockType::Wait
        | BlockType::Sleep
        | BlockType::Log
        | BlockType::Alert
        | BlockType::DeviceSet => vec![SnapPoint::append(0.0)],
        // dummies render as plain holders
        BlockType::Dummy => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::SnapType;

    #[test]
    fn test_inner_only_on_containers() {
        for t in BlockType::all() {
            let has_inner = declared_snap_points(*t)
                .iter()
                .any(|p| p.snap_type == SnapType::Inner);
            if has_inner {
                assert!(t.is_container(), "{} declares inner but is not a container", t);
            }
        }
    }

    #[test]
    fn test_every_non_top_level_block_can_be_appended_to() {
        for t in BlockType::all() {
            if t.is_top_level() || *t == BlockType::Dummy {
                continue;
            }
            assert!(declared_snap_points(*t)
                .iter()
                .any(|p| p.snap_type == SnapType::Append));
        }
    }

    #[test]
    fn test_dummy_declares_nothing() {
        assert!(declared_snap_points(BlockType::Dummy).is_empty());
    }
}
