//! Headless page runner.
//!
//! Drives the page the way a browser tab would: one repaint per frame from
//! the clock, a scripted pointer, an optional viewport resize, and PNG
//! snapshots of every backdrop canvas.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec2;
use keepsake_common::AudioError;
use keepsake_kernel::{AnimatorStats, FrameLoop, PixelCanvas, ResizeSource, Viewport};
use keepsake_page::{AudioBackend, BackdropSlot, NullAudio, Page, TrackSource};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::timing::FrameClock;

/// Audio output chosen at startup.
#[derive(Debug)]
pub enum EngineAudio {
    /// No output device; playback is only tracked.
    Silent(NullAudio),
    /// Default output device.
    #[cfg(feature = "audio")]
    Device(keepsake_page::RodioAudio),
}

impl EngineAudio {
    /// Open the device if requested and available, silent otherwise.
    pub fn open(enabled: bool) -> Self {
        #[cfg(feature = "audio")]
        if enabled {
            match keepsake_page::RodioAudio::new() {
                Ok(device) => return Self::Device(device),
                Err(e) => warn!("Falling back to silent audio: {e}"),
            }
        }
        #[cfg(not(feature = "audio"))]
        if enabled {
            warn!("Built without audio support, soundtrack will be silent");
        }
        Self::Silent(NullAudio::new())
    }
}

impl AudioBackend for EngineAudio {
    fn load(&mut self, source: &TrackSource) -> Result<(), AudioError> {
        match self {
            Self::Silent(audio) => audio.load(source),
            #[cfg(feature = "audio")]
            Self::Device(audio) => audio.load(source),
        }
    }

    fn play(&mut self) {
        match self {
            Self::Silent(audio) => audio.play(),
            #[cfg(feature = "audio")]
            Self::Device(audio) => audio.play(),
        }
    }

    fn pause(&mut self) {
        match self {
            Self::Silent(audio) => audio.pause(),
            #[cfg(feature = "audio")]
            Self::Device(audio) => audio.pause(),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        match self {
            Self::Silent(audio) => audio.set_volume(volume),
            #[cfg(feature = "audio")]
            Self::Device(audio) => audio.set_volume(volume),
        }
    }

    fn stop(&mut self) {
        match self {
            Self::Silent(audio) => audio.stop(),
            #[cfg(feature = "audio")]
            Self::Device(audio) => audio.stop(),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Frames rendered
    pub frames: u64,
    /// Final counters of every backdrop that was running
    pub backdrops: Vec<(BackdropSlot, AnimatorStats)>,
    /// Snapshot files written
    pub snapshots: Vec<PathBuf>,
    /// Whether the soundtrack loaded
    pub music_available: bool,
}

/// The running page plus its display plumbing.
pub struct KeepsakeApp {
    config: EngineConfig,
    page: Page<PixelCanvas, EngineAudio>,
    frames: FrameLoop,
    viewport: Viewport,
    clock: FrameClock,
    snapshots: Vec<PathBuf>,
}

impl std::fmt::Debug for KeepsakeApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepsakeApp")
            .field("page", &self.page)
            .field("frames", &self.frames)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl KeepsakeApp {
    /// Create the app on the landing screen.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let clock = FrameClock::new(config.target_fps).with_realtime(config.realtime);
        Self {
            page: Page::new(config.page.clone()),
            frames: FrameLoop::new(),
            viewport: Viewport::new(config.viewport()),
            clock,
            snapshots: Vec::new(),
            config,
        }
    }

    /// Press "begin": start the story and its soundtrack.
    pub fn begin(&mut self) {
        let audio = EngineAudio::open(self.config.audio);
        self.page.begin(
            |slot, size| {
                debug!("Acquiring {} canvas at {size}", slot.name());
                PixelCanvas::new(size)
            },
            audio,
            &mut self.frames,
            &mut self.viewport,
        );
    }

    /// Run a single frame.
    pub fn step(&mut self) -> Result<()> {
        let timestamp_ms = self.clock.next_timestamp_ms();
        let frame = self.clock.frames();

        if self.config.resize_at_frame.is_some_and(|at| u64::from(at) == frame) {
            let size = self.config.resized_viewport();
            info!("Viewport resized to {size}");
            self.viewport.resize(size);
        }

        if self.config.simulate_pointer {
            self.page.pointer_moved(self.pointer_at(timestamp_ms));
        }

        self.frames.tick(timestamp_ms);

        let every = u64::from(self.config.snapshot_every);
        if every > 0 && frame % every == 0 {
            self.snapshot(frame)?;
        }
        Ok(())
    }

    /// Run the configured number of frames, then tear the page down.
    pub fn run(mut self) -> Result<RunSummary> {
        self.begin();
        let limit = u64::from(self.config.frames);
        while limit == 0 || self.clock.frames() < limit {
            self.step()?;
            self.clock.sleep_remainder();
            if self.clock.frames() % u64::from(self.clock.target_fps()) == 0 {
                debug!(
                    "Frame {} ({:.1} fps)",
                    self.clock.frames(),
                    self.clock.current_fps()
                );
            }
        }
        self.finish()
    }

    /// Take the final snapshot and unmount everything.
    pub fn finish(mut self) -> Result<RunSummary> {
        let frame = self.clock.frames();
        let every = u64::from(self.config.snapshot_every);
        if self.config.snapshot_dir.is_some() && (every == 0 || frame % every != 0) {
            self.snapshot(frame)?;
        }

        let music_available = self
            .page
            .music()
            .is_some_and(keepsake_page::MusicPlayer::is_available);
        let backdrops = self.page.unmount_all(&mut self.frames, &mut self.viewport);
        for (slot, stats) in &backdrops {
            info!(
                "{}: spawned {}, expired {}, peak {}",
                slot.name(),
                stats.spawned,
                stats.expired,
                stats.peak_live
            );
        }

        Ok(RunSummary {
            frames: frame,
            backdrops,
            snapshots: self.snapshots,
            music_available,
        })
    }

    /// Write every backdrop canvas to `snapshot_dir`.
    fn snapshot(&mut self, frame: u64) -> Result<()> {
        let Some(dir) = self.config.snapshot_dir.clone() else {
            return Ok(());
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;

        let cursor = self.page.cursor();
        let draw_cursor = self.config.page.cursor_glow;
        for (slot, handle) in self.page.backdrops() {
            let path = snapshot_path(&dir, slot, frame);
            let written = handle.with_animator(|animator| {
                if slot == BackdropSlot::Hero && draw_cursor {
                    let mut canvas = animator.canvas().clone();
                    cursor.draw(&mut canvas);
                    canvas.save_png(&path)
                } else {
                    animator.canvas().save_png(&path)
                }
            });
            match written {
                Some(result) => {
                    result.with_context(|| format!("Snapshot {} failed", path.display()))?;
                    self.snapshots.push(path);
                },
                None => debug!("Skipping inert {} backdrop", slot.name()),
            }
        }
        Ok(())
    }

    /// Scripted pointer: a slow loop around the viewport center.
    fn pointer_at(&self, timestamp_ms: f64) -> Vec2 {
        let size = self.viewport.size();
        let center = Vec2::new(size.width_f32(), size.height_f32()) * 0.5;
        let t = timestamp_ms as f32 * 0.001;
        center + Vec2::new(t.cos() * center.x * 0.5, (t * 1.3).sin() * center.y * 0.5)
    }

    /// The page.
    #[must_use]
    pub fn page(&self) -> &Page<PixelCanvas, EngineAudio> {
        &self.page
    }
}

fn snapshot_path(dir: &Path, slot: BackdropSlot, frame: u64) -> PathBuf {
    dir.join(format!("{}-{frame:05}.png", slot.name()))
}

/// Runs the page with the given configuration.
pub fn run(config: EngineConfig) -> Result<RunSummary> {
    info!("Configuration loaded:");
    info!(
        "  Viewport: {}x{}",
        config.viewport_width, config.viewport_height
    );
    info!(
        "  Frames: {} at {} fps ({})",
        config.frames,
        config.target_fps,
        if config.realtime { "realtime" } else { "simulated" }
    );
    if let Some(dir) = &config.snapshot_dir {
        info!("  Snapshots: {}", dir.display());
    }

    KeepsakeApp::new(config).run()
}
