//! snap point resolution
//!
//! blocks declare anchor points relative to their own rendered box. while a
//! list is dragged, the anchors of the block under the pointer are converted
//! to absolute coordinates and the nearest one decides where a drop lands.

mod catalog;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use catalog::declared_snap_points;

/// where a dropped list attaches relative to the target block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapType {
    /// nest as the first children of the target container
    Inner,
    /// insert as siblings immediately after the target
    Append,
}

impl SnapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapType::Inner => "inner",
            SnapType::Append => "append",
        }
    }
}

impl fmt::Display for SnapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(SnapType::Inner),
            "append" => Ok(SnapType::Append),
            _ => Err(format!("unknown snap type '{}': use inner or append", s)),
        }
    }
}

/// on-screen box of a rendered block
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// anchor declared relative to a block's own box
///
/// `x`/`left` and `y`/`top` are insets from the top-left corner, `right` and
/// `bottom` are insets from the far edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    #[serde(rename = "type")]
    pub snap_type: SnapType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

impl SnapPoint {
    fn empty(snap_type: SnapType) -> Self {
        Self {
            snap_type,
            x: None,
            left: None,
            y: None,
            top: None,
            right: None,
            bottom: None,
        }
    }

    /// `inner` anchor at an inset from the top-left corner
    pub fn inner(top: f64, left: f64) -> Self {
        Self {
            top: Some(top),
            left: Some(left),
            ..Self::empty(SnapType::Inner)
        }
    }

    /// `append` anchor at an inset from the bottom edge
    pub fn append(bottom: f64) -> Self {
        Self {
            bottom: Some(bottom),
            ..Self::empty(SnapType::Append)
        }
    }
}

/// a snap point converted to absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedSnapPoint {
    #[serde(rename = "type")]
    pub snap_type: SnapType,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
}

/// convert declared anchors to absolute coordinates using the target's box
pub fn resolve_snap_points(target: &BoundingBox, declared: &[SnapPoint]) -> Vec<ResolvedSnapPoint> {
    declared.iter().map(|p| resolve_one(target, p)).collect()
}

fn resolve_one(target: &BoundingBox, p: &SnapPoint) -> ResolvedSnapPoint {
    let mut out = ResolvedSnapPoint {
        snap_type: p.snap_type,
        x: None,
        y: None,
        left: None,
        top: None,
        right: None,
        bottom: None,
    };

    if let Some(dx) = p.x.or(p.left) {
        out.x = Some(dx + target.x);
        out.left = out.x;
    }
    if let Some(dy) = p.y.or(p.top) {
        out.y = Some(dy + target.y);
        out.top = out.y;
    }
    if let Some(inset) = p.right {
        let right = target.right() - inset;
        out.right = Some(right);
        out.x = out.x.or(Some(right));
    }
    if let Some(inset) = p.bottom {
        let bottom = target.bottom() - inset;
        out.bottom = Some(bottom);
        out.y = out.y.or(Some(bottom));
    }

    out
}

/// pick the snap point closest to the pointer on the vertical axis
///
/// a single candidate always wins. among several, points without a vertical
/// coordinate are skipped and ties keep the earliest declared point.
pub fn choose_snap(points: &[ResolvedSnapPoint], pointer_y: f64) -> Option<&ResolvedSnapPoint> {
    match points {
        [] => None,
        [only] => Some(only),
        _ => {
            let mut best: Option<(&ResolvedSnapPoint, f64)> = None;
            for p in points {
                let Some(y) = p.y else { continue };
                let distance = (y - pointer_y).abs();
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((p, distance));
                }
            }
            best.map(|(p, _)| p)
        }
    }
}
