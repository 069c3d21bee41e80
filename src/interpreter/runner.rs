//! pluggable per-block runners
//!
//! a host binds statement kinds the interpreter has no built-in meaning for
//! (device writes) by implementing [`BlockRunnerProvider`]

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::blocks::Block;
use crate::devices::{DeviceCommand, SharedDevices};

/// failure reported by an external runner
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct RunnerError(pub String);

impl RunnerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type RunnerFuture<'a> = BoxFuture<'a, Result<(), RunnerError>>;

/// resolves an external runner for a block, if the host has one for its kind
pub trait BlockRunnerProvider: Send + Sync {
    fn runner_for<'a>(&'a self, block: &'a Block) -> Option<RunnerFuture<'a>>;
}

/// runs device-set blocks by forwarding their writes to a channel
///
/// with a simulation target attached, each write is also applied to it so
/// conditions observe the new value
#[derive(Debug, Clone)]
pub struct DeviceSetRunner {
    sender: mpsc::UnboundedSender<DeviceCommand>,
    simulate: Option<SharedDevices>,
}

impl DeviceSetRunner {
    pub fn new(sender: mpsc::UnboundedSender<DeviceCommand>) -> Self {
        Self {
            sender,
            simulate: None,
        }
    }

    pub fn simulating(mut self, devices: SharedDevices) -> Self {
        self.simulate = Some(devices);
        self
    }
}

impl BlockRunnerProvider for DeviceSetRunner {
    fn runner_for<'a>(&'a self, block: &'a Block) -> Option<RunnerFuture<'a>> {
        let command = DeviceCommand::from_kind(&block.kind)?;
        Some(
            async move {
                tracing::debug!(block = %block.id, command = %command, "device write");
                let sent = command.clone();
                self.sender
                    .send(sent)
                    .map_err(|_| RunnerError::new("device command channel closed"))?;
                // only writes that reached the host show up in the local view
                if let Some(devices) = &self.simulate {
                    devices.apply(&command);
                }
                Ok(())
            }
            .boxed(),
        )
    }
}
