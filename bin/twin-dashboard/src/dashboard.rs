//! ---
//! ems_section: "12-gui-setup-wizard"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Dashboard state binding between the ticker and the views."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use twin_common::DashboardConfig;
use twin_sim::{
    Metric, Reading, ReadingGenerator, ReadingSnapshot, ReadingStore, SnapshotReceiver, Ticker,
    TickerGuard,
};

/// Effective dashboard settings after CLI overrides.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub title: String,
    pub tick_interval: Duration,
    pub seed: Option<u64>,
}

impl From<&DashboardConfig> for DashboardSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            title: config.title.clone(),
            tick_interval: config.tick_interval,
            seed: config.seed,
        }
    }
}

/// The four-point dataset shared by the line, bar and pie charts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    points: [(Metric, f64); 4],
}

impl ChartSeries {
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            points: Metric::ALL.map(|metric| (metric, reading.value(metric))),
        }
    }

    pub fn points(&self) -> &[(Metric, f64)] {
        &self.points
    }

    pub fn labels(&self) -> [&'static str; 4] {
        self.points.map(|(metric, _)| metric.label())
    }

    /// `(index, value)` pairs for an x axis of evenly spaced categories.
    pub fn indexed(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, (_, value))| (idx as f64, *value))
            .collect()
    }

    pub fn max(&self) -> f64 {
        self.points
            .iter()
            .map(|(_, value)| *value)
            .fold(0.0, f64::max)
    }

    /// Fraction of the total carried by each point; all zero when the total
    /// is not positive.
    pub fn shares(&self) -> [f64; 4] {
        let total: f64 = self.points.iter().map(|(_, value)| value.max(0.0)).sum();
        if total <= 0.0 {
            return [0.0; 4];
        }
        self.points.map(|(_, value)| value.max(0.0) / total)
    }
}

/// Mounted dashboard: owns the ticker and observes the reading store.
#[derive(Debug)]
pub struct TelemetryDashboard {
    title: String,
    receiver: SnapshotReceiver,
    snapshot: ReadingSnapshot,
    series: ChartSeries,
    ticker: TickerGuard,
}

impl TelemetryDashboard {
    /// Create the mount reading and arm the ticker. Requires a tokio runtime
    /// context.
    pub fn mount(settings: &DashboardSettings) -> Self {
        let mut generator = ReadingGenerator::new(settings.seed);
        let store = ReadingStore::mount(&mut generator);
        let mut receiver = store.subscribe();
        let snapshot = receiver.borrow_and_update().clone();
        let series = ChartSeries::from_reading(&snapshot.reading);
        let ticker = Ticker::spawn(store, generator, settings.tick_interval);
        Self {
            title: settings.title.clone(),
            receiver,
            snapshot,
            series,
            ticker,
        }
    }

    /// Pull the latest snapshot if the ticker published one since the last
    /// call, recomputing the chart series. Returns whether anything changed.
    pub fn refresh(&mut self) -> bool {
        match self.receiver.has_changed() {
            Ok(true) => {
                self.snapshot = self.receiver.borrow_and_update().clone();
                self.series = ChartSeries::from_reading(&self.snapshot.reading);
                true
            }
            _ => false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snapshot(&self) -> &ReadingSnapshot {
        &self.snapshot
    }

    pub fn series(&self) -> &ChartSeries {
        &self.series
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    /// Stop the ticker. Dropping the dashboard has the same effect.
    pub fn unmount(mut self) {
        self.ticker.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::time::sleep;
    use twin_sim::ReadingRanges;

    fn settings(seed: u64) -> DashboardSettings {
        DashboardSettings {
            title: "Test Bench".to_owned(),
            tick_interval: Duration::from_millis(3000),
            seed: Some(seed),
        }
    }

    fn reading(values: [f64; 4]) -> Reading {
        Reading {
            voltage: values[0],
            current: values[1],
            power: values[2],
            energy: values[3],
        }
    }

    #[test]
    fn series_keeps_fixed_labels() {
        let series = ChartSeries::from_reading(&reading([230.0, 7.5, 1500.0, 80.0]));
        assert_eq!(series.labels(), ["Voltage", "Current", "Power", "Energy"]);
        assert_eq!(
            series.indexed(),
            vec![(0.0, 230.0), (1.0, 7.5), (2.0, 1500.0), (3.0, 80.0)]
        );
        assert_eq!(series.max(), 1500.0);
    }

    #[test]
    fn shares_sum_to_one() {
        let series = ChartSeries::from_reading(&reading([100.0, 100.0, 200.0, 600.0]));
        assert_eq!(series.shares(), [0.1, 0.1, 0.2, 0.6]);
    }

    #[test]
    fn shares_of_zero_reading_are_empty() {
        let series = ChartSeries::from_reading(&reading([0.0; 4]));
        assert_eq!(series.shares(), [0.0; 4]);
    }

    #[test]
    fn settings_follow_config() {
        let config = DashboardConfig::default();
        let settings = DashboardSettings::from(&config);
        assert_eq!(settings.title, "Smart Electricity Digital Twin");
        assert_eq!(settings.tick_interval, Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_tracks_ticks() {
        let mut dashboard = TelemetryDashboard::mount(&settings(21));
        assert!(dashboard.snapshot().is_mount());
        assert!(!dashboard.refresh());
        let mounted = dashboard.series().clone();

        sleep(Duration::from_millis(3001)).await;
        assert!(dashboard.refresh());
        assert_eq!(dashboard.snapshot().tick, 1);
        assert!(ReadingRanges::TICK.admits(&dashboard.snapshot().reading));
        assert_ne!(dashboard.series(), &mounted);
        assert_eq!(dashboard.series().labels(), mounted.labels());
        assert!(!dashboard.refresh());

        sleep(Duration::from_millis(3000)).await;
        assert!(dashboard.refresh());
        assert_eq!(dashboard.snapshot().tick, 2);
        let ticked = ChartSeries::from_reading(&dashboard.snapshot().reading);
        assert_eq!(ticked.labels(), mounted.labels());
        dashboard.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_dashboard_stops_ticker() {
        let dashboard = TelemetryDashboard::mount(&settings(4));
        assert!(dashboard.is_ticking());
        let mut observer = dashboard.receiver.clone();
        drop(dashboard);

        sleep(Duration::from_millis(9000)).await;
        assert_eq!(observer.borrow_and_update().tick, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn footer_reports_cancelled_ticker() {
        let mut dashboard = TelemetryDashboard::mount(&settings(6));
        dashboard.ticker.cancel();
        assert!(!dashboard.is_ticking());

        let mut terminal = Terminal::new(TestBackend::new(140, 48)).unwrap();
        terminal
            .draw(|frame| crate::view::draw_ui(frame, &dashboard))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("ticker stopped"));
        assert!(!text.contains("ticker live"));
    }
}
