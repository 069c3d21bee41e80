//! point-in-time view of device state

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::command::DeviceCommand;
use super::error::DeviceError;
use crate::blocks::{numeric_text, Scalar};

/// device name that addresses every device at once
pub const ALL_DEVICES: &str = "all";

/// one controllable device and its reported properties
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Device {
    pub id: String,
    pub properties: Map<String, JsonValue>,
}

impl Device {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: Map::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&JsonValue> {
        self.properties.get(property)
    }

    /// numeric view of a property; a missing property is NaN
    pub fn numeric(&self, property: &str) -> f64 {
        self.get(property).map(coerce_number).unwrap_or(f64::NAN)
    }

    fn set(&mut self, property: &str, value: &Scalar) {
        let json = match value {
            Scalar::Number(n) => JsonValue::Number(n.clone()),
            Scalar::Text(s) => JsonValue::String(s.clone()),
        };
        self.properties.insert(property.to_string(), json);
    }
}

/// numeric cast of a reported property value
pub fn coerce_number(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => numeric_text(s),
        JsonValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        JsonValue::Null => 0.0,
        JsonValue::Array(_) | JsonValue::Object(_) => f64::NAN,
    }
}

/// devices keyed by id
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DeviceSnapshot {
    devices: BTreeMap<String, Device>,
}

impl DeviceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.insert(device);
        self
    }

    pub fn insert(&mut self, device: Device) {
        self.devices.insert(device.id.clone(), device);
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// apply a property write; `all` writes to every known device
    pub fn apply(&mut self, command: &DeviceCommand) {
        if command.device == ALL_DEVICES {
            for device in self.devices.values_mut() {
                device.set(&command.prop, &command.value);
            }
            return;
        }

        self.devices
            .entry(command.device.clone())
            .or_insert_with(|| Device::new(command.device.clone()))
            .set(&command.prop, &command.value);
    }

    /// build from a device status document
    ///
    /// accepts the controller's list form, `[{"name": "AB12", "speed": 600}]`
    /// (`id` is accepted in place of `name`), or a map keyed by device id,
    /// `{"AB12": {"speed": 600}}`
    pub fn from_status(status: &JsonValue) -> Result<Self, DeviceError> {
        let mut snapshot = Self::new();

        match status {
            JsonValue::Array(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    let obj = entry.as_object().ok_or_else(|| {
                        DeviceError::Shape(format!("status[{}] must be an object", i))
                    })?;
                    let id = obj
                        .get("name")
                        .or_else(|| obj.get("id"))
                        .and_then(JsonValue::as_str)
                        .ok_or_else(|| {
                            DeviceError::Shape(format!("status[{}] has no 'name' or 'id'", i))
                        })?;
                    snapshot.insert(Device {
                        id: id.to_string(),
                        properties: obj.clone(),
                    });
                }
            }
            JsonValue::Object(map) => {
                for (id, props) in map {
                    let obj = props.as_object().ok_or_else(|| {
                        DeviceError::Shape(format!("status.{} must be an object", id))
                    })?;
                    snapshot.insert(Device {
                        id: id.clone(),
                        properties: obj.clone(),
                    });
                }
            }
            _ => {
                return Err(DeviceError::Shape(
                    "device status must be a list or an object".to_string(),
                ))
            }
        }

        Ok(snapshot)
    }

    pub fn from_status_str(content: &str) -> Result<Self, DeviceError> {
        let json: JsonValue = serde_json::from_str(content)?;
        Self::from_status(&json)
    }

    pub fn load(path: &Path) -> Result<Self, DeviceError> {
        let content = fs::read_to_string(path).map_err(|source| DeviceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_status_str(&content)
    }
}
