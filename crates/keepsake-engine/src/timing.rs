//! Frame timing.
//!
//! Produces the repaint timestamps handed to the frame loop. Headless runs
//! advance a simulated clock by exactly one frame per tick; realtime runs
//! read the wall clock and sleep off the rest of each frame budget.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Repaint clock.
#[derive(Debug)]
pub struct FrameClock {
    /// Target frames per second
    target_fps: u32,
    /// Time budget per frame
    frame_budget: Duration,
    /// Wall-clock start of the run
    started: Instant,
    /// Time of last frame start
    last_frame: Instant,
    /// Read the wall clock instead of simulating
    realtime: bool,
    /// Frames produced so far
    frames: u64,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameClock {
    /// Create a simulated clock at `target_fps`.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        let now = Instant::now();
        Self {
            target_fps,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            started: now,
            last_frame: now,
            realtime: false,
            frames: 0,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Read the wall clock instead of simulating.
    #[must_use]
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Length of one frame in milliseconds.
    #[must_use]
    pub fn frame_ms(&self) -> f64 {
        1000.0 / f64::from(self.target_fps)
    }

    /// Timestamp of the next frame in milliseconds since the run started.
    ///
    /// The first frame is stamped one frame length after the start, the way
    /// a repaint callback never fires at time zero.
    pub fn next_timestamp_ms(&mut self) -> f64 {
        self.frames += 1;
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }

        if self.realtime {
            (now - self.started).as_secs_f64() * 1000.0 + self.frame_ms()
        } else {
            self.frames as f64 * self.frame_ms()
        }
    }

    /// Sleep for the remainder of the frame budget (realtime only).
    pub fn sleep_remainder(&self) {
        if !self.realtime {
            return;
        }

        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Frames produced so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Get the current FPS (averaged over recent frames).
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let avg_frame_time: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;

        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }

    /// Get the target FPS.
    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }
}
