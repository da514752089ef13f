//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Random reading generation for mount and ticks."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use rand::prelude::*;

use crate::reading::{MetricRange, Reading, ReadingRanges};

/// Draws independent uniform readings for the simulated device.
#[derive(Debug)]
pub struct ReadingGenerator {
    rng: StdRng,
}

impl ReadingGenerator {
    /// Seeded generators replay the same sequence; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Reading created at mount: raw draws over [`ReadingRanges::MOUNT`].
    pub fn mount_reading(&mut self) -> Reading {
        self.draw(&ReadingRanges::MOUNT)
    }

    /// Reading produced by a tick: draws over [`ReadingRanges::TICK`],
    /// rounded to two decimals.
    pub fn tick_reading(&mut self) -> Reading {
        self.draw(&ReadingRanges::TICK).rounded()
    }

    fn draw(&mut self, ranges: &ReadingRanges) -> Reading {
        Reading {
            voltage: self.sample(ranges.voltage),
            current: self.sample(ranges.current),
            power: self.sample(ranges.power),
            energy: self.sample(ranges.energy),
        }
    }

    fn sample(&mut self, range: MetricRange) -> f64 {
        range.low + self.rng.gen::<f64>() * range.span()
    }
}
