//! Frame scheduling and resize notification.
//!
//! The display side of the animation loop: a registry of repeating frame
//! callbacks fired once per repaint, and a viewport that notifies resize
//! listeners. Both are plain single-threaded registries; nothing runs
//! outside of an explicit `tick` or `resize` call.

use keepsake_common::SurfaceSize;
use tracing::trace;

/// Callback invoked once per frame with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnMut(f64) + Send>;

/// Listener invoked with the new viewport size.
pub type ResizeListener = Box<dyn FnMut(SurfaceSize) + Send>;

/// Handle to a registered frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    /// Build a token from a raw value, for schedulers outside this crate.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a registered resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

impl ListenerToken {
    /// Build a token from a raw value, for schedulers outside this crate.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A source of repaint-cadence frame callbacks.
pub trait FrameScheduler {
    /// Register a callback that fires on every frame until unregistered.
    fn register(&mut self, callback: FrameCallback) -> FrameToken;

    /// Unregister a callback. Returns false if the token was unknown.
    fn unregister(&mut self, token: FrameToken) -> bool;
}

/// A source of viewport resize events.
pub trait ResizeSource {
    /// Current viewport size.
    fn size(&self) -> SurfaceSize;

    /// Subscribe to resize events.
    fn subscribe(&mut self, listener: ResizeListener) -> ListenerToken;

    /// Remove a listener. Returns false if the token was unknown.
    fn unsubscribe(&mut self, token: ListenerToken) -> bool;
}

/// Repaint loop that fires every registered callback once per tick.
#[derive(Default)]
pub struct FrameLoop {
    callbacks: Vec<(FrameToken, FrameCallback)>,
    next_token: u64,
    ticks: u64,
    last_timestamp_ms: f64,
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("callbacks", &self.callbacks.len())
            .field("ticks", &self.ticks)
            .field("last_timestamp_ms", &self.last_timestamp_ms)
            .finish_non_exhaustive()
    }
}

impl FrameLoop {
    /// Create an empty loop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every registered callback with `timestamp_ms`.
    ///
    /// Returns the number of callbacks fired.
    pub fn tick(&mut self, timestamp_ms: f64) -> usize {
        self.ticks += 1;
        self.last_timestamp_ms = timestamp_ms;
        for (_, callback) in &mut self.callbacks {
            callback(timestamp_ms);
        }
        trace!(
            "Frame {} at {:.1}ms fired {} callbacks",
            self.ticks,
            timestamp_ms,
            self.callbacks.len()
        );
        self.callbacks.len()
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Timestamp of the most recent tick.
    #[must_use]
    pub fn last_timestamp_ms(&self) -> f64 {
        self.last_timestamp_ms
    }
}

impl FrameScheduler for FrameLoop {
    fn register(&mut self, callback: FrameCallback) -> FrameToken {
        let token = FrameToken(self.next_token);
        self.next_token += 1;
        self.callbacks.push((token, callback));
        token
    }

    fn unregister(&mut self, token: FrameToken) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(t, _)| *t != token);
        self.callbacks.len() != before
    }
}

/// The page viewport: current size plus resize listeners.
pub struct Viewport {
    size: SurfaceSize,
    listeners: Vec<(ListenerToken, ResizeListener)>,
    next_token: u64,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("size", &self.size)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Viewport {
    /// Create a viewport of the given size.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            listeners: Vec::new(),
            next_token: 0,
        }
    }

    /// Change the viewport size and notify every listener.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        for (_, listener) in &mut self.listeners {
            listener(size);
        }
    }

    /// Number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ResizeSource for Viewport {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn subscribe(&mut self, listener: ResizeListener) -> ListenerToken {
        let token = ListenerToken(self.next_token);
        self.next_token += 1;
        self.listeners.push((token, listener));
        token
    }

    fn unsubscribe(&mut self, token: ListenerToken) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(t, _)| *t != token);
        self.listeners.len() != before
    }
}
