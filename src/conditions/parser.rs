//! condition parser - converts `DEVICE:property OP number` text to the AST
//!
//! the match is a search, not a full-string match: text around the
//! comparison is ignored

use lazy_static::lazy_static;
use regex::Regex;

use super::types::{CompareOp, Condition, ConditionError};

lazy_static! {
    static ref CONDITION_RE: Regex =
        Regex::new(r"([A-Z0-9]+):([a-z_]+)\s*(==|!=|>=|<=|=|>|<)\s*(\d+)")
            .unwrap_or_else(|e| panic!("invalid condition pattern: {}", e));
}

/// parse a condition string into a condition AST
pub fn parse_condition(input: &str) -> Result<Condition, ConditionError> {
    let parse_error = || ConditionError::Parse {
        input: input.to_string(),
    };

    let caps = CONDITION_RE.captures(input).ok_or_else(parse_error)?;

    let operator: CompareOp = caps[3].parse()?;
    let value: f64 = caps[4].parse().map_err(|_| parse_error())?;

    Ok(Condition::new(&caps[1], &caps[2], operator, value))
}
