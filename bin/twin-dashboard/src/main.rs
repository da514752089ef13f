//! ---
//! ems_section: "12-gui-setup-wizard"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Terminal dashboard launcher for simulated device telemetry."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};
use twin_common::{init_tracing, AppConfig, LoadedAppConfig, LogSink};

mod dashboard;
mod headless;
mod view;

use dashboard::{DashboardSettings, TelemetryDashboard};

const SERVICE_NAME: &str = "twin-dashboard";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(
    author,
    disable_version_flag = true,
    about = "Live dashboard of simulated electricity device telemetry",
    propagate_version = false
)]
struct Cli {
    /// Configuration file (defaults to $TWIN_CONFIG, then configs/twin.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the reading refresh period in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Fixed random seed for reproducible readings
    #[arg(long)]
    seed: Option<u64>,

    /// Print this many ticked snapshots as JSON lines instead of drawing the UI
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// In --frames mode, generate ticks back to back instead of once per period
    #[arg(long, requires = "frames")]
    no_wait: bool,

    /// Print version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,
}

impl Cli {
    fn load_config(&self) -> Result<LoadedAppConfig> {
        match &self.config {
            Some(path) => Ok(LoadedAppConfig {
                config: AppConfig::from_path(path)?,
                source: Some(path.clone()),
            }),
            None => AppConfig::load_with_source(&[AppConfig::DEFAULT_PATH]),
        }
    }

    fn settings(&self, config: &AppConfig) -> Result<DashboardSettings> {
        let mut settings = DashboardSettings::from(&config.dashboard);
        if let Some(ms) = self.interval_ms {
            if ms == 0 {
                return Err(anyhow!("interval-ms must be greater than zero"));
            }
            settings.tick_interval = Duration::from_millis(ms);
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{} {}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let loaded = cli.load_config()?;
    let settings = cli.settings(&loaded.config)?;
    let sink = if cli.frames.is_some() {
        LogSink::FileAndStderr
    } else {
        LogSink::FileOnly
    };
    // Declared before the runtime so it drops last and flushes shutdown events.
    let _tracing = init_tracing(SERVICE_NAME, &loaded.config.logging, sink)?;
    info!(
        source = ?loaded.source,
        interval_ms = settings.tick_interval.as_millis() as u64,
        seeded = settings.seed.is_some(),
        "configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("twin-ticker")
        .enable_time()
        .build()
        .context("failed to build tokio runtime")?;

    if let Some(frames) = cli.frames {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let result = runtime.block_on(headless::run(&settings, frames, !cli.no_wait, &mut out));
        if let Err(err) = &result {
            error!(error = %err, "headless run failed");
        }
        return result;
    }

    let _guard = runtime.enter();
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run_app(&mut terminal, &settings);
    cleanup_terminal(&mut terminal)?;
    if let Err(err) = &result {
        error!(error = %err, "dashboard loop failed");
    }
    result
}

/// Restore the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, Show);
        default_hook(info);
    }));
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &DashboardSettings,
) -> Result<()> {
    let mut dashboard = TelemetryDashboard::mount(settings);
    let mut dirty = true;
    loop {
        if dashboard.refresh() {
            dirty = true;
        }
        if dirty {
            terminal.draw(|frame| view::draw_ui(frame, &dashboard))?;
            dirty = false;
        }
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        break;
                    }
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    dashboard.unmount();
    Ok(())
}

fn should_quit(key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
