//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Device reading model and value ranges."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One of the four quantities carried by a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Voltage,
    Current,
    Power,
    Energy,
}

impl Metric {
    /// Display order shared by the value card and every chart.
    pub const ALL: [Metric; 4] = [
        Metric::Voltage,
        Metric::Current,
        Metric::Power,
        Metric::Energy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Voltage => "Voltage",
            Metric::Current => "Current",
            Metric::Power => "Power",
            Metric::Energy => "Energy",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Voltage => "V",
            Metric::Current => "A",
            Metric::Power => "W",
            Metric::Energy => "kWh",
        }
    }
}

/// Value interval for one metric. Draws always land in `[low, high)`.
/// Ranges of rounded readings are closed, since rounding to two decimals can
/// reach `high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub low: f64,
    pub high: f64,
    pub high_inclusive: bool,
}

impl MetricRange {
    /// `[low, high)`
    pub const fn half_open(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            high_inclusive: false,
        }
    }

    /// `[low, high]`
    pub const fn closed(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            high_inclusive: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if value < self.low {
            return false;
        }
        if self.high_inclusive {
            value <= self.high
        } else {
            value < self.high
        }
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }
}

/// Per-metric value ranges used by the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingRanges {
    pub voltage: MetricRange,
    pub current: MetricRange,
    pub power: MetricRange,
    pub energy: MetricRange,
}

impl ReadingRanges {
    /// Ranges of the reading created when the dashboard mounts.
    pub const MOUNT: ReadingRanges = ReadingRanges {
        voltage: MetricRange::half_open(0.0, 240.0),
        current: MetricRange::half_open(0.0, 10.0),
        power: MetricRange::half_open(0.0, 2000.0),
        energy: MetricRange::half_open(0.0, 100.0),
    };

    /// Ranges of every reading produced by the ticker.
    pub const TICK: ReadingRanges = ReadingRanges {
        voltage: MetricRange::closed(210.0, 240.0),
        current: MetricRange::closed(5.0, 10.0),
        power: MetricRange::closed(500.0, 2000.0),
        energy: MetricRange::closed(50.0, 100.0),
    };

    pub fn get(&self, metric: Metric) -> MetricRange {
        match metric {
            Metric::Voltage => self.voltage,
            Metric::Current => self.current,
            Metric::Power => self.power,
            Metric::Energy => self.energy,
        }
    }

    /// True when every field of `reading` lies inside its range.
    pub fn admits(&self, reading: &Reading) -> bool {
        Metric::ALL
            .iter()
            .all(|metric| self.get(*metric).contains(reading.value(*metric)))
    }
}

/// Four-field telemetry snapshot of the simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    pub energy: f64,
}

impl Reading {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Voltage => self.voltage,
            Metric::Current => self.current,
            Metric::Power => self.power,
            Metric::Energy => self.energy,
        }
    }

    /// Values in [`Metric::ALL`] order.
    pub fn values(&self) -> [f64; 4] {
        Metric::ALL.map(|metric| self.value(metric))
    }

    /// Value rendered with exactly two decimals, without unit.
    pub fn formatted(&self, metric: Metric) -> String {
        format!("{:.2}", self.value(metric))
    }

    /// Copy of the reading with every field rounded to two decimals.
    pub fn rounded(&self) -> Self {
        Self {
            voltage: round_cents(self.voltage),
            current: round_cents(self.current),
            power: round_cents(self.power),
            energy: round_cents(self.energy),
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The current reading together with its position in the tick sequence.
///
/// Tick `0` is the reading created at mount; each ticker replacement
/// increments the counter by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSnapshot {
    pub tick: u64,
    pub captured_at: DateTime<Utc>,
    pub reading: Reading,
}

impl ReadingSnapshot {
    pub fn mounted(reading: Reading) -> Self {
        Self {
            tick: 0,
            captured_at: Utc::now(),
            reading,
        }
    }

    pub fn is_mount(&self) -> bool {
        self.tick == 0
    }
}
