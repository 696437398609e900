//! Engine configuration.
//!
//! Provides viewport, pacing, run length, snapshot, and page settings.
//! Configuration can be loaded from and saved to a TOML file.

use keepsake_common::{KeepsakeError, KeepsakeResult, SurfaceSize};
use keepsake_page::PageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "keepsake.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Viewport Settings ===
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,

    // === Pacing ===
    /// Repaint rate in frames per second
    pub target_fps: u32,
    /// Pace frames against the wall clock instead of running flat out
    pub realtime: bool,
    /// Number of frames to run (0 = until interrupted; only honored in realtime)
    pub frames: u32,

    // === Scripted Input ===
    /// Frame at which the viewport is resized (None = never)
    pub resize_at_frame: Option<u32>,
    /// Viewport size after the scripted resize
    pub resize_to: (u32, u32),
    /// Move a simulated pointer around the viewport center
    pub simulate_pointer: bool,

    // === Snapshots ===
    /// Directory for PNG snapshots (None = no snapshots)
    pub snapshot_dir: Option<PathBuf>,
    /// Snapshot every N frames (0 = only the last frame)
    pub snapshot_every: u32,

    // === Audio ===
    /// Play the soundtrack on the default device when built with audio support
    pub audio: bool,

    // === Page ===
    /// Page layout and decorations
    pub page: PageConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Viewport
            viewport_width: 1280,
            viewport_height: 720,

            // Pacing
            target_fps: 60,
            realtime: false,
            frames: 600,

            // Scripted input
            resize_at_frame: None,
            resize_to: (1024, 768),
            simulate_pointer: true,

            // Snapshots
            snapshot_dir: None,
            snapshot_every: 0,

            // Audio
            audio: false,

            // Page
            page: PageConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `keepsake.toml` in the working directory.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match Self::parse(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn parse(contents: &str) -> KeepsakeResult<Self> {
        toml::from_str(contents).map_err(|e| KeepsakeError::Config(e.to_string()))
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> KeepsakeResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| KeepsakeError::Config(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.viewport_width = self.viewport_width.clamp(1, 7680);
        self.viewport_height = self.viewport_height.clamp(1, 4320);
        self.resize_to.0 = self.resize_to.0.clamp(1, 7680);
        self.resize_to.1 = self.resize_to.1.clamp(1, 4320);
        self.target_fps = self.target_fps.clamp(1, 240);
        if self.frames == 0 && !self.realtime {
            warn!("Unbounded run requires realtime pacing, limiting to 600 frames");
            self.frames = 600;
        }
        self.page.validate();
    }

    /// Initial viewport size.
    #[must_use]
    pub fn viewport(&self) -> SurfaceSize {
        SurfaceSize::new(self.viewport_width, self.viewport_height)
    }

    /// Viewport size after the scripted resize.
    #[must_use]
    pub fn resized_viewport(&self) -> SurfaceSize {
        SurfaceSize::new(self.resize_to.0, self.resize_to.1)
    }
}
