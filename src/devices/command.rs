//! device property writes issued by running programs

use std::fmt;

use serde::Serialize;

use crate::blocks::{BlockKind, Scalar};

/// a single `device:prop=value` write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceCommand {
    pub device: String,
    pub prop: String,
    pub value: Scalar,
}

impl DeviceCommand {
    pub fn new(device: impl Into<String>, prop: impl Into<String>, value: Scalar) -> Self {
        Self {
            device: device.into(),
            prop: prop.into(),
            value,
        }
    }

    /// the write described by a device-set block
    pub fn from_kind(kind: &BlockKind) -> Option<Self> {
        match kind {
            BlockKind::DeviceSet {
                device,
                prop,
                value,
            } => Some(Self::new(device.clone(), prop.clone(), value.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.device, self.prop, self.value)
    }
}
