//! # Keepsake
//!
//! Runs the "Our Love Story" page headless: petal rain, timeline sparkles,
//! cursor glow, and soundtrack, with optional PNG snapshots.
//!
//! ```text
//! keepsake [CONFIG]          run with CONFIG (default: ./keepsake.toml)
//! keepsake --init [PATH]     write the default configuration and exit
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use keepsake_engine::config::CONFIG_FILE;
use keepsake_engine::EngineConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("keepsake=info".parse()?))
        .init();

    info!("Keepsake starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args_os().skip(1);
    let first = args.next();

    if first.as_deref().is_some_and(|a| a == "--init") {
        let path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
        EngineConfig::default()
            .save_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        return Ok(());
    }

    let mut config = match first {
        Some(path) => EngineConfig::load_from(PathBuf::from(path)),
        None => EngineConfig::load(),
    };
    config.validate();

    let summary = keepsake_engine::run(config)?;
    info!(
        "Rendered {} frames, {} snapshots, music {}",
        summary.frames,
        summary.snapshots.len(),
        if summary.music_available { "loaded" } else { "unavailable" }
    );

    info!("Keepsake shutdown complete");
    Ok(())
}
