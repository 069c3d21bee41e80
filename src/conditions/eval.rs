//! condition evaluator
//!
//! evaluates parsed conditions against a device snapshot

use super::types::{Condition, ConditionError};
use crate::devices::DeviceSnapshot;

/// evaluate a condition against the given snapshot
///
/// the property value is cast to a number (see [`crate::devices::coerce_number`]);
/// a missing property is NaN, which only satisfies `!=`
pub fn evaluate(condition: &Condition, snapshot: &DeviceSnapshot) -> Result<bool, ConditionError> {
    let device = snapshot
        .get(condition.device())
        .ok_or_else(|| ConditionError::UnknownDevice(condition.device().to_string()))?;

    let left = device.numeric(condition.property());
    Ok(condition.operator.apply(left, condition.literal()))
}
