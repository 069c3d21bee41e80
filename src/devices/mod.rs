//! device state seen by conditions and written by device-set blocks
//!
//! the interpreter reads devices through [`DeviceSource`], which hands out
//! immutable snapshots. writes are [`DeviceCommand`]s routed to whatever sink
//! the host wires in.

mod command;
mod error;
mod snapshot;
mod source;

pub use command::DeviceCommand;
pub use error::DeviceError;
pub use snapshot::{coerce_number, Device, DeviceSnapshot, ALL_DEVICES};
pub use source::{spawn_file_poller, DeviceSource, SharedDevices};
