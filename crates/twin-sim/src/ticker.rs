//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Periodic reading replacement with scoped cancellation."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::generator::ReadingGenerator;
use crate::store::ReadingStore;

/// Async rate limiter whose first tick fires one full period after creation.
#[derive(Debug)]
pub struct RateLimiter {
    interval: tokio::time::Interval,
}

impl RateLimiter {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

/// Spawns the task that regenerates the reading every period.
pub struct Ticker;

impl Ticker {
    /// Arm the timer now and return the guard that owns it.
    ///
    /// Must be called from within a tokio runtime. The store and generator
    /// move into the task, so the ticker is the only writer.
    pub fn spawn(
        store: ReadingStore,
        mut generator: ReadingGenerator,
        period: Duration,
    ) -> TickerGuard {
        let mut limiter = RateLimiter::new(period);
        let handle = tokio::spawn(async move {
            loop {
                limiter.tick().await;
                let reading = generator.tick_reading();
                let tick = store.replace(reading);
                debug!(
                    tick,
                    voltage = reading.voltage,
                    current = reading.current,
                    power = reading.power,
                    energy = reading.energy,
                    "reading replaced"
                );
            }
        });
        info!(period_ms = period.as_millis() as u64, "ticker started");
        TickerGuard {
            handle: Some(handle),
        }
    }
}

/// Scoped ownership of the ticker task. Dropping the guard cancels the task.
#[derive(Debug)]
pub struct TickerGuard {
    handle: Option<JoinHandle<()>>,
}

impl TickerGuard {
    /// Abort the ticker. No replacement is published after this returns
    /// control to the runtime. Calling it twice is a no-op.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("ticker cancelled");
        }
    }

    /// Abort the ticker and wait until the task has stopped, so no
    /// replacement can race the caller on a multi-threaded runtime.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            info!("ticker stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}
