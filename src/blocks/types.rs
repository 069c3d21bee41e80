//! core types for block programs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// unique block identifier
pub type BlockId = String;

/// default repeat count for a new loop block
pub const DEFAULT_LOOP_COUNT: u32 = 1;

/// default sleep for a new sleep block, in milliseconds
pub const DEFAULT_SLEEP_MS: u64 = 1000;

/// floating position of a top-level block on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// offset this position by a delta
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// literal carried by sleep, log, alert and device-set blocks
///
/// kept as entered (number or text) so programs round-trip unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn number(n: u64) -> Self {
        Scalar::Number(serde_json::Number::from(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Scalar::Text(s.into())
    }

    /// numeric cast: text is trimmed and parsed, empty text is 0, anything else is NaN
    pub fn as_number(&self) -> f64 {
        match self {
            Scalar::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Scalar::Text(s) => numeric_text(s),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Text(String::new())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

/// parse text the way a numeric cast would
pub(crate) fn numeric_text(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn default_loop_count() -> u32 {
    DEFAULT_LOOP_COUNT
}

fn default_sleep_value() -> Scalar {
    Scalar::number(DEFAULT_SLEEP_MS)
}

/// the fixed set of block kinds, each with only its own fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockKind {
    /// runs its children once at program start
    Once {
        #[serde(default)]
        children: Vec<Block>,
    },
    /// runs its children repeatedly until the program is stopped
    Forever {
        #[serde(default)]
        children: Vec<Block>,
    },
    /// runs its children `count` times
    Loop {
        #[serde(default = "default_loop_count")]
        count: u32,
        #[serde(default)]
        children: Vec<Block>,
    },
    /// runs its children when the condition holds
    If {
        #[serde(default)]
        condition: String,
        #[serde(default)]
        children: Vec<Block>,
    },
    /// blocks until the condition holds
    Wait {
        #[serde(default)]
        condition: String,
    },
    /// suspends for `value` milliseconds
    Sleep {
        #[serde(default = "default_sleep_value")]
        value: Scalar,
    },
    Log {
        #[serde(default)]
        value: Scalar,
    },
    Alert {
        #[serde(default)]
        value: Scalar,
    },
    /// sets a device property; executed by an injected runner
    #[serde(alias = "loco-set")]
    DeviceSet {
        #[serde(default)]
        device: String,
        #[serde(default, alias = "property")]
        prop: String,
        #[serde(default)]
        value: Scalar,
    },
    /// floating holder for a detached list of blocks
    Dummy {
        #[serde(default)]
        children: Vec<Block>,
    },
}

impl BlockKind {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Once { .. } => BlockType::Once,
            BlockKind::Forever { .. } => BlockType::Forever,
            BlockKind::Loop { .. } => BlockType::Loop,
            BlockKind::If { .. } => BlockType::If,
            BlockKind::Wait { .. } => BlockType::Wait,
            BlockKind::Sleep { .. } => BlockType::Sleep,
            BlockKind::Log { .. } => BlockType::Log,
            BlockKind::Alert { .. } => BlockType::Alert,
            BlockKind::DeviceSet { .. } => BlockType::DeviceSet,
            BlockKind::Dummy { .. } => BlockType::Dummy,
        }
    }

    /// children of a container kind, None for statements
    pub fn children(&self) -> Option<&[Block]> {
        match self {
            BlockKind::Once { children }
            | BlockKind::Forever { children }
            | BlockKind::Loop { children, .. }
            | BlockKind::If { children, .. }
            | BlockKind::Dummy { children } => Some(children),
            BlockKind::Wait { .. }
            | BlockKind::Sleep { .. }
            | BlockKind::Log { .. }
            | BlockKind::Alert { .. }
            | BlockKind::DeviceSet { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            BlockKind::Once { children }
            | BlockKind::Forever { children }
            | BlockKind::Loop { children, .. }
            | BlockKind::If { children, .. }
            | BlockKind::Dummy { children } => Some(children),
            BlockKind::Wait { .. }
            | BlockKind::Sleep { .. }
            | BlockKind::Log { .. }
            | BlockKind::Alert { .. }
            | BlockKind::DeviceSet { .. } => None,
        }
    }
}

/// a node in the program tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// only set on blocks floating at the top level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            position: None,
            kind,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn children(&self) -> Option<&[Block]> {
        self.kind.children()
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        self.kind.children_mut()
    }

    pub fn is_container(&self) -> bool {
        self.block_type().is_container()
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, BlockKind::Dummy { .. })
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BlockKind::Loop { count, .. } => write!(f, "loop({})", count)?,
            BlockKind::If { condition, .. } => write!(f, "if({})", condition)?,
            BlockKind::Wait { condition } => write!(f, "wait({})", condition)?,
            BlockKind::Sleep { value } => write!(f, "sleep({})", value)?,
            BlockKind::Log { value } => write!(f, "log({})", value)?,
            BlockKind::Alert { value } => write!(f, "alert({})", value)?,
            BlockKind::DeviceSet {
                device,
                prop,
                value,
            } => write!(f, "device-set({}:{}={})", device, prop, value)?,
            kind => write!(f, "{}", kind.block_type())?,
        }
        write!(f, " #{}", self.id)
    }
}

/// block kind without its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Once,
    Forever,
    Loop,
    If,
    Wait,
    Sleep,
    Log,
    Alert,
    DeviceSet,
    Dummy,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Once => "once",
            BlockType::Forever => "forever",
            BlockType::Loop => "loop",
            BlockType::If => "if",
            BlockType::Wait => "wait",
            BlockType::Sleep => "sleep",
            BlockType::Log => "log",
            BlockType::Alert => "alert",
            BlockType::DeviceSet => "device-set",
            BlockType::Dummy => "dummy",
        }
    }

    pub fn all() -> &'static [BlockType] {
        &[
            BlockType::Once,
            BlockType::Forever,
            BlockType::Loop,
            BlockType::If,
            BlockType::Wait,
            BlockType::Sleep,
            BlockType::Log,
            BlockType::Alert,
            BlockType::DeviceSet,
            BlockType::Dummy,
        ]
    }

    /// kinds owning an ordered children list
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockType::Once | BlockType::Forever | BlockType::Loop | BlockType::If | BlockType::Dummy
        )
    }

    /// kinds that live directly in the top-level list and are never split or snapped
    pub fn is_top_level(&self) -> bool {
        matches!(self, BlockType::Once | BlockType::Forever)
    }

    /// a fresh kind with default fields
    pub fn default_kind(&self) -> BlockKind {
        match self {
            BlockType::Once => BlockKind::Once { children: vec![] },
            BlockType::Forever => BlockKind::Forever { children: vec![] },
            BlockType::Loop => BlockKind::Loop {
                count: DEFAULT_LOOP_COUNT,
                children: vec![],
            },
            BlockType::If => BlockKind::If {
                condition: String::new(),
                children: vec![],
            },
            BlockType::Wait => BlockKind::Wait {
                condition: String::new(),
            },
            BlockType::Sleep => BlockKind::Sleep {
                value: default_sleep_value(),
            },
            BlockType::Log => BlockKind::Log {
                value: Scalar::default(),
            },
            BlockType::Alert => BlockKind::Alert {
                value: Scalar::default(),
            },
            BlockType::DeviceSet => BlockKind::DeviceSet {
                device: String::new(),
                prop: String::new(),
                value: Scalar::default(),
            },
            BlockType::Dummy => BlockKind::Dummy { children: vec![] },
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loco-set" => Ok(BlockType::DeviceSet),
            _ => BlockType::all()
                .iter()
                .find(|t| t.as_str() == s)
                .copied()
                .ok_or_else(|| {
                    let names: Vec<&str> = BlockType::all().iter().map(|t| t.as_str()).collect();
                    format!("unknown block type '{}': valid types are {}", s, names.join(", "))
                }),
        }
    }
}
