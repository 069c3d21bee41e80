//! core types for the condition system

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// errors raised while parsing or evaluating a condition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("invalid condition '{input}': expected DEVICE:property OP number")]
    Parse { input: String },

    #[error("unknown device '{0}'")]
    UnknownDevice(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
}

/// comparison operators supported in conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    /// equality: =, ==
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// compare two numbers; NaN on either side only satisfies `!=`
    pub fn apply(&self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Gt => left > right,
            CompareOp::Gte => left >= right,
            CompareOp::Lt => left < right,
            CompareOp::Lte => left <= right,
        }
    }
}

impl FromStr for CompareOp {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Gte),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Lte),
            other => Err(ConditionError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// left operand: a property of one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRef {
    pub device: String,
    pub property: String,
}

/// right operand: an unsigned integer literal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberLiteral {
    pub value: f64,
}

/// the condition AST - one comparison between a device property and a number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub operator: CompareOp,
    pub children: (PropertyRef, NumberLiteral),
}

impl Condition {
    pub fn new(device: impl Into<String>, property: impl Into<String>, operator: CompareOp, value: f64) -> Self {
        Self {
            operator,
            children: (
                PropertyRef {
                    device: device.into(),
                    property: property.into(),
                },
                NumberLiteral { value },
            ),
        }
    }

    pub fn device(&self) -> &str {
        &self.children.0.device
    }

    pub fn property(&self) -> &str {
        &self.children.0.property
    }

    pub fn literal(&self) -> f64 {
        self.children.1.value
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {}",
            self.device(),
            self.property(),
            self.operator,
            self.literal()
        )
    }
}
