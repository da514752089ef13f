//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Single-writer holder of the current reading."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::Utc;
use tokio::sync::watch;

use crate::generator::ReadingGenerator;
use crate::reading::{Reading, ReadingSnapshot};

/// Observer handle on the current snapshot.
pub type SnapshotReceiver = watch::Receiver<ReadingSnapshot>;

/// Owns the one current reading. Observers subscribe and are notified on
/// every replacement.
#[derive(Debug)]
pub struct ReadingStore {
    sender: watch::Sender<ReadingSnapshot>,
}

impl ReadingStore {
    /// Create the store with a fresh mount reading.
    pub fn mount(generator: &mut ReadingGenerator) -> Self {
        Self::with_reading(generator.mount_reading())
    }

    pub fn with_reading(reading: Reading) -> Self {
        let (sender, _) = watch::channel(ReadingSnapshot::mounted(reading));
        Self { sender }
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.sender.subscribe()
    }

    pub fn current(&self) -> ReadingSnapshot {
        self.sender.borrow().clone()
    }

    /// Swap in `reading` as a whole and return the new tick number.
    pub fn replace(&self, reading: Reading) -> u64 {
        let mut tick = 0;
        self.sender.send_modify(|snapshot| {
            tick = snapshot.tick + 1;
            *snapshot = ReadingSnapshot {
                tick,
                captured_at: Utc::now(),
                reading,
            };
        });
        tick
    }
}
