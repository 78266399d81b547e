//! # Ember Engine
//!
//! Headless host for the Ember particle runtime.
//!
//! Ties the subsystems together:
//! - Particles: store, lifecycle, emission and billboard rendering
//! - Tools: debug console commands
//! - A scene object table, perspective camera and batching renderer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod renderer;
mod scene;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
///
/// `ember --write-config` writes the effective configuration to the
/// config path and exits.
fn main() -> Result<()> {
    let path = EngineConfig::config_path();
    let loaded = EngineConfig::read(&path);

    let mut filter = EnvFilter::from_default_env().add_directive("ember=info".parse()?);
    if let Ok(Some(config)) = &loaded {
        for directive in config.log_filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            filter = filter.add_directive(directive.parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Ember starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = EngineConfig::finish_load(&path, loaded);
    config.validate();

    if std::env::args().skip(1).any(|arg| arg == "--write-config") {
        config.save_to(&path)?;
        return Ok(());
    }

    let summary = app::run(config)?;
    info!(
        "Simulated {} frames: {} particles created, peak {}, {} detached, {} draw calls",
        summary.frames, summary.created, summary.peak, summary.detached, summary.draw_calls
    );

    info!("Ember shutdown complete");
    Ok(())
}
