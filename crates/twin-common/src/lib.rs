//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the dashboard runtime."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the electricity digital twin workspace.
//! This crate exposes configuration loading and tracing initialisation
//! consumed by the simulation crate and the dashboard binary.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, DashboardConfig, LoadedAppConfig, LoggingConfig};
pub use logging::{init_tracing, LogFormat, LogSink, TracingGuard};
