//! execution context for program runs

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};

use super::runner::{BlockRunnerProvider, RunnerFuture};
use crate::blocks::{Block, Scalar};
use crate::devices::{DeviceSnapshot, DeviceSource};

/// default scheduling rate for forever passes and wait polling
pub const DEFAULT_TICK_HZ: u32 = 60;

/// shared cooperative cancellation flag
///
/// clones observe the same flag; a stopped flag never restarts
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// receives the id of the block being executed, `None` once it finishes
pub trait ActiveBlockObserver: Send + Sync {
    fn on_active_block(&self, id: Option<&str>);
}

impl<F> ActiveBlockObserver for F
where
    F: Fn(Option<&str>) + Send + Sync,
{
    fn on_active_block(&self, id: Option<&str>) {
        self(id)
    }
}

/// sink for log and alert blocks
pub trait Notifier: Send + Sync {
    fn log(&self, value: &Scalar);
    fn alert(&self, value: &Scalar);
}

/// writes log and alert values as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn log(&self, value: &Scalar) {
        tracing::info!(target: "railblocks::program", "{}", value);
    }

    fn alert(&self, value: &Scalar) {
        tracing::warn!(target: "railblocks::program", alert = true, "{}", value);
    }
}

/// source of suspension for sleep, wait polling and the forever tick
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// tokio timer backed clock; follows paused time in tests
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// tick length for a rate in hz; 0 is treated as 1
pub fn tick_from_hz(hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(hz.max(1)))
}

/// everything a run needs besides the program itself
pub struct ExecutionContext {
    running: RunFlag,
    devices: Arc<dyn DeviceSource>,
    runners: Option<Arc<dyn BlockRunnerProvider>>,
    observer: Option<Arc<dyn ActiveBlockObserver>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    tick: Duration,
    max_passes: Option<u64>,
}

impl ExecutionContext {
    /// context with a fresh running flag, tracing notifier and tokio clock
    pub fn new(devices: Arc<dyn DeviceSource>) -> Self {
        Self {
            running: RunFlag::new(),
            devices,
            runners: None,
            observer: None,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(TokioClock),
            tick: tick_from_hz(DEFAULT_TICK_HZ),
            max_passes: None,
        }
    }

    pub fn with_running(mut self, running: RunFlag) -> Self {
        self.running = running;
        self
    }

    pub fn with_runners(mut self, runners: Arc<dyn BlockRunnerProvider>) -> Self {
        self.runners = Some(runners);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ActiveBlockObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_tick_hz(self, hz: u32) -> Self {
        self.with_tick(tick_from_hz(hz))
    }

    /// stop after this many forever passes
    pub fn with_max_passes(mut self, passes: u64) -> Self {
        self.max_passes = Some(passes);
        self
    }

    pub fn running(&self) -> &RunFlag {
        &self.running
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn max_passes(&self) -> Option<u64> {
        self.max_passes
    }

    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.devices.snapshot()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.clock.sleep(duration)
    }

    pub(crate) fn runner_for<'a>(&'a self, block: &'a Block) -> Option<RunnerFuture<'a>> {
        self.runners.as_ref()?.runner_for(block)
    }

    pub(crate) fn notify_active(&self, id: Option<&str>) {
        if let Some(observer) = &self.observer {
            observer.on_active_block(id);
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("running", &self.is_running())
            .field("has_runners", &self.runners.is_some())
            .field("has_observer", &self.observer.is_some())
            .field("tick", &self.tick)
            .field("max_passes", &self.max_passes)
            .finish()
    }
}
