//! condition evaluation system for wait and if blocks
//!
//! a condition is a single comparison, `DEVICE_ID:property OP number`:
//! - device ids are uppercase letters and digits, properties lowercase and `_`
//! - operators: =, ==, !=, >, >=, <, <= (`==` normalizes to `=`)
//! - the right side is an unsigned integer
//!
//! there is no boolean composition or nesting.

mod eval;
mod parser;
mod types;

pub use eval::evaluate;
pub use parser::parse_condition;
pub use types::{CompareOp, Condition, ConditionError, NumberLiteral, PropertyRef};

/// parse and evaluate in one step
pub fn check(input: &str, snapshot: &crate::devices::DeviceSnapshot) -> Result<bool, ConditionError> {
    evaluate(&parse_condition(input)?, snapshot)
}
