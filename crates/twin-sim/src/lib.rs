//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "01-bootstrap"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulation module exports and shared types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Simulated device telemetry for the electricity digital twin.
//!
//! A [`ReadingStore`] holds the one current [`Reading`]; a [`Ticker`]
//! replaces it wholesale on a fixed period until its [`TickerGuard`] is
//! dropped. Observers follow the store through a `watch` channel.

pub mod generator;
pub mod reading;
pub mod store;
pub mod ticker;

pub use generator::ReadingGenerator;
pub use reading::{Metric, MetricRange, Reading, ReadingRanges, ReadingSnapshot};
pub use store::{ReadingStore, SnapshotReceiver};
pub use ticker::{RateLimiter, Ticker, TickerGuard};
