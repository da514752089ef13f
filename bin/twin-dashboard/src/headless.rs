//! ---
//! ems_section: "12-gui-setup-wizard"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "JSON-lines output of reading snapshots without a terminal UI."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;
use twin_sim::{ReadingGenerator, ReadingSnapshot, ReadingStore, Ticker};

use crate::dashboard::DashboardSettings;

fn write_snapshot<W: Write>(out: &mut W, snapshot: &ReadingSnapshot) -> Result<()> {
    serde_json::to_writer(&mut *out, snapshot).context("failed to encode snapshot")?;
    writeln!(out).context("failed to write snapshot")?;
    out.flush().context("failed to flush output")
}

/// Emit the mount snapshot followed by `frames` ticked snapshots.
///
/// With `wait` the real ticker drives the output, one snapshot per period.
/// Without it the ticks are generated back to back.
pub async fn run<W: Write>(
    settings: &DashboardSettings,
    frames: u64,
    wait: bool,
    out: &mut W,
) -> Result<()> {
    let mut generator = ReadingGenerator::new(settings.seed);
    let store = ReadingStore::mount(&mut generator);
    write_snapshot(out, &store.current())?;

    if wait {
        let mut receiver = store.subscribe();
        let ticker = Ticker::spawn(store, generator, settings.tick_interval);
        for _ in 0..frames {
            receiver
                .changed()
                .await
                .context("ticker stopped before all frames were produced")?;
            let snapshot = receiver.borrow_and_update().clone();
            write_snapshot(out, &snapshot)?;
        }
        ticker.shutdown().await;
    } else {
        for _ in 0..frames {
            store.replace(generator.tick_reading());
            write_snapshot(out, &store.current())?;
        }
    }
    info!(frames, wait, "headless run complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use twin_sim::ReadingRanges;

    fn settings() -> DashboardSettings {
        DashboardSettings {
            title: "Headless".to_owned(),
            tick_interval: Duration::from_millis(3000),
            seed: Some(31),
        }
    }

    fn parse(output: &[u8]) -> Vec<ReadingSnapshot> {
        std::str::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn emits_mount_and_ticked_snapshots() {
        let mut out = Vec::new();
        run(&settings(), 3, false, &mut out).await.unwrap();
        let snapshots = parse(&out);
        assert_eq!(snapshots.len(), 4);
        assert!(snapshots[0].is_mount());
        for (idx, snapshot) in snapshots.iter().enumerate().skip(1) {
            assert_eq!(snapshot.tick, idx as u64);
            assert!(ReadingRanges::TICK.admits(&snapshot.reading));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_mode_follows_the_ticker() {
        let mut out = Vec::new();
        let started = tokio::time::Instant::now();
        run(&settings(), 2, true, &mut out).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(6000));
        let ticks: Vec<u64> = parse(&out).iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn zero_frames_prints_only_mount() {
        let mut out = Vec::new();
        run(&settings(), 0, false, &mut out).await.unwrap();
        assert_eq!(parse(&out).len(), 1);
    }
}
