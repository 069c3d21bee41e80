//! device snapshot providers

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::command::DeviceCommand;
use super::snapshot::DeviceSnapshot;

/// supplies the current device view on demand
pub trait DeviceSource: Send + Sync {
    fn snapshot(&self) -> Arc<DeviceSnapshot>;
}

/// snapshot holder shared between the poller, command sinks and the interpreter
///
/// readers get a cheap `Arc` of the latest snapshot; writers swap in a new one
#[derive(Debug, Clone, Default)]
pub struct SharedDevices {
    inner: Arc<RwLock<Arc<DeviceSnapshot>>>,
}

impl SharedDevices {
    pub fn new(snapshot: DeviceSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn replace(&self, snapshot: DeviceSnapshot) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(snapshot);
    }

    /// apply a write to the held snapshot
    pub fn apply(&self, command: &DeviceCommand) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let mut next = DeviceSnapshot::clone(&guard);
        next.apply(command);
        *guard = Arc::new(next);
    }
}

impl DeviceSource for SharedDevices {
    fn snapshot(&self) -> Arc<DeviceSnapshot> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }
}

/// reload a device status file into `shared` every `interval`
///
/// a failed read or parse keeps the previous snapshot
pub fn spawn_file_poller(path: PathBuf, interval: Duration, shared: SharedDevices) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "device status read failed");
                    continue;
                }
            };
            match DeviceSnapshot::from_status_str(&content) {
                Ok(snapshot) => {
                    tracing::trace!(devices = snapshot.len(), "device status reloaded");
                    shared.replace(snapshot);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "device status parse failed")
                }
            }
        }
    })
}
