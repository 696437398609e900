//! Background music player.
//!
//! The player keeps the UI state (playing, muted, volume) and forwards every
//! change to an [`AudioBackend`]. The track always loops. Backends:
//!
//! - [`NullAudio`]: silent, records every call; used headless and in tests
//! - `RodioAudio` (feature `rodio`): streams the track to the default device

use std::path::PathBuf;
use std::sync::Arc;

use keepsake_common::AudioError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Volume a fresh player starts at.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Where the soundtrack comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    /// A local audio file.
    File(PathBuf),
    /// A remote URL. Only backends with network support can play it.
    Url(String),
}

impl std::fmt::Display for TrackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Playback device abstraction.
///
/// Implementations need not be `Send`; audio output handles usually are not.
pub trait AudioBackend {
    /// Prepare `source` for looping playback, paused.
    fn load(&mut self, source: &TrackSource) -> Result<(), AudioError>;

    /// Start or resume playback.
    fn play(&mut self);

    /// Pause playback, keeping the position.
    fn pause(&mut self);

    /// Set output volume in [0, 1].
    fn set_volume(&mut self, volume: f32);

    /// Stop playback and release the track.
    fn stop(&mut self);
}

/// A call received by [`NullAudio`].
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    /// `load`
    Load(TrackSource),
    /// `play`
    Play,
    /// `pause`
    Pause,
    /// `set_volume`
    SetVolume(f32),
    /// `stop`
    Stop,
}

/// Shared log of calls made to a [`NullAudio`].
pub type AudioLog = Arc<Mutex<Vec<AudioCall>>>;

/// Silent backend that records what it was asked to do.
#[derive(Debug, Default)]
pub struct NullAudio {
    log: AudioLog,
    fail_load: bool,
}

impl NullAudio {
    /// A backend that accepts every track.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `load` always fails, as on a machine without audio.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    /// Handle to the call log. Stays readable after the backend is dropped.
    #[must_use]
    pub fn log(&self) -> AudioLog {
        Arc::clone(&self.log)
    }
}

impl AudioBackend for NullAudio {
    fn load(&mut self, source: &TrackSource) -> Result<(), AudioError> {
        self.log.lock().push(AudioCall::Load(source.clone()));
        if self.fail_load {
            return Err(AudioError::DeviceInitFailed("no audio output".into()));
        }
        Ok(())
    }

    fn play(&mut self) {
        self.log.lock().push(AudioCall::Play);
    }

    fn pause(&mut self) {
        self.log.lock().push(AudioCall::Pause);
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.lock().push(AudioCall::SetVolume(volume));
    }

    fn stop(&mut self) {
        self.log.lock().push(AudioCall::Stop);
    }
}

#[cfg(feature = "rodio")]
pub use self::device::RodioAudio;

#[cfg(feature = "rodio")]
mod device {
    use std::fs::File;
    use std::io::BufReader;

    use keepsake_common::AudioError;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::info;

    use super::{AudioBackend, TrackSource};

    /// Backend that streams through rodio to the default output device.
    pub struct RodioAudio {
        // Dropping the stream silences every sink created from it.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sink: Option<Sink>,
    }

    impl std::fmt::Debug for RodioAudio {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RodioAudio")
                .field("loaded", &self.sink.is_some())
                .finish_non_exhaustive()
        }
    }

    impl RodioAudio {
        /// Open the default output device.
        pub fn new() -> Result<Self, AudioError> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| AudioError::DeviceInitFailed(e.to_string()))?;
            info!("Audio device initialized");
            Ok(Self {
                _stream: stream,
                handle,
                sink: None,
            })
        }
    }

    impl AudioBackend for RodioAudio {
        fn load(&mut self, source: &TrackSource) -> Result<(), AudioError> {
            let path = match source {
                TrackSource::File(path) => path,
                TrackSource::Url(url) => {
                    return Err(AudioError::LoadFailed {
                        path: url.into(),
                        message: "remote tracks are not supported".into(),
                    });
                },
            };
            let load_failed = |message: String| AudioError::LoadFailed {
                path: path.clone(),
                message,
            };
            let file = File::open(path).map_err(|e| load_failed(e.to_string()))?;
            let decoder =
                Decoder::new(BufReader::new(file)).map_err(|e| load_failed(e.to_string()))?;
            let sink = Sink::try_new(&self.handle).map_err(|e| load_failed(e.to_string()))?;
            sink.pause();
            sink.append(decoder.repeat_infinite());
            if let Some(old) = self.sink.replace(sink) {
                old.stop();
            }
            Ok(())
        }

        fn play(&mut self) {
            if let Some(sink) = &self.sink {
                sink.play();
            }
        }

        fn pause(&mut self) {
            if let Some(sink) = &self.sink {
                sink.pause();
            }
        }

        fn set_volume(&mut self, volume: f32) {
            if let Some(sink) = &self.sink {
                sink.set_volume(volume);
            }
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }
    }
}

/// Looping soundtrack with play/pause, mute, and volume controls.
pub struct MusicPlayer<B: AudioBackend> {
    backend: B,
    source: TrackSource,
    loaded: bool,
    playing: bool,
    muted: bool,
    volume: f32,
}

impl<B: AudioBackend> std::fmt::Debug for MusicPlayer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicPlayer")
            .field("source", &self.source)
            .field("loaded", &self.loaded)
            .field("playing", &self.playing)
            .field("muted", &self.muted)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

impl<B: AudioBackend> MusicPlayer<B> {
    /// Load `source` on `backend` and start playing if `autoplay` is set.
    ///
    /// A track that fails to load leaves the player unavailable: controls
    /// still update state but nothing plays.
    pub fn new(source: TrackSource, autoplay: bool, mut backend: B) -> Self {
        let loaded = match backend.load(&source) {
            Ok(()) => true,
            Err(e) => {
                warn!("Music unavailable ({source}): {e}");
                false
            },
        };
        let mut player = Self {
            backend,
            source,
            loaded,
            playing: false,
            muted: false,
            volume: DEFAULT_VOLUME,
        };
        if player.loaded {
            player.backend.set_volume(player.effective_volume());
            if autoplay {
                player.backend.play();
                player.playing = true;
            }
            info!("Music loaded: {} (autoplay {autoplay})", player.source);
        }
        player
    }

    /// Pause if playing, play otherwise. No-op when the track never loaded.
    pub fn toggle_play(&mut self) {
        if !self.loaded {
            return;
        }
        if self.playing {
            self.backend.pause();
        } else {
            self.backend.play();
        }
        self.playing = !self.playing;
        debug!("Music {}", if self.playing { "playing" } else { "paused" });
    }

    /// Flip the mute flag. The stored volume is kept.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.apply_volume();
    }

    /// Set the volume, clamped to [0, 1]. Moving the slider unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.muted = false;
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        if self.loaded {
            self.backend.set_volume(self.effective_volume());
        }
    }

    /// Volume actually sent to the device: zero while muted.
    #[must_use]
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Stored volume, independent of mute.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// True while playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True while muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// True if the track loaded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.loaded
    }

    /// The track this player loops.
    #[must_use]
    pub fn source(&self) -> &TrackSource {
        &self.source
    }

    /// Backend reference.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn stop(&mut self) {
        if self.loaded {
            self.backend.stop();
            self.loaded = false;
            self.playing = false;
            debug!("Music stopped: {}", self.source);
        }
    }
}

impl<B: AudioBackend> Drop for MusicPlayer<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> TrackSource {
        TrackSource::File(PathBuf::from("music/slow-motion.mp3"))
    }

    #[test]
    fn test_autoplay_starts_playback() {
        let backend = NullAudio::new();
        let log = backend.log();
        let player = MusicPlayer::new(track(), true, backend);
        assert!(player.is_playing());
        assert_eq!(
            *log.lock(),
            vec![
                AudioCall::Load(track()),
                AudioCall::SetVolume(DEFAULT_VOLUME),
                AudioCall::Play,
            ]
        );
    }

    #[test]
    fn test_no_autoplay_stays_paused() {
        let player = MusicPlayer::new(track(), false, NullAudio::new());
        assert!(!player.is_playing());
        assert_eq!(player.volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn test_toggle_play() {
        let backend = NullAudio::new();
        let log = backend.log();
        let mut player = MusicPlayer::new(track(), false, backend);
        player.toggle_play();
        assert!(player.is_playing());
        player.toggle_play();
        assert!(!player.is_playing());
        let calls = log.lock();
        assert_eq!(&calls[calls.len() - 2..], &[AudioCall::Play, AudioCall::Pause]);
    }

    #[test]
    fn test_mute_keeps_volume() {
        let backend = NullAudio::new();
        let log = backend.log();
        let mut player = MusicPlayer::new(track(), true, backend);
        player.set_volume(0.8);
        player.toggle_mute();
        assert!(player.is_muted());
        assert_eq!(player.effective_volume(), 0.0);
        assert_eq!(player.volume(), 0.8);
        assert_eq!(log.lock().last(), Some(&AudioCall::SetVolume(0.0)));

        player.toggle_mute();
        assert_eq!(player.effective_volume(), 0.8);
    }

    #[test]
    fn test_volume_change_unmutes() {
        let mut player = MusicPlayer::new(track(), true, NullAudio::new());
        player.toggle_mute();
        player.set_volume(0.3);
        assert!(!player.is_muted());
        assert_eq!(player.effective_volume(), 0.3);
    }

    #[test]
    fn test_volume_clamped() {
        let mut player = MusicPlayer::new(track(), false, NullAudio::new());
        player.set_volume(1.7);
        assert_eq!(player.volume(), 1.0);
        player.set_volume(-2.0);
        assert_eq!(player.volume(), 0.0);
        player.set_volume(f32::NAN);
        assert_eq!(player.volume(), 0.0);
    }

    #[test]
    fn test_failed_load_is_inert() {
        let backend = NullAudio::failing();
        let log = backend.log();
        let mut player = MusicPlayer::new(track(), true, backend);
        assert!(!player.is_available());
        assert!(!player.is_playing());
        player.toggle_play();
        assert!(!player.is_playing());
        player.set_volume(0.9);
        drop(player);
        assert_eq!(*log.lock(), vec![AudioCall::Load(track())]);
    }

    #[test]
    fn test_drop_stops_once() {
        let backend = NullAudio::new();
        let log = backend.log();
        let player = MusicPlayer::new(track(), true, backend);
        drop(player);
        let stops = log.lock().iter().filter(|c| **c == AudioCall::Stop).count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn test_track_source_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            track: TrackSource,
        }
        let w: Wrapper = toml::from_str("track = { url = \"https://example.com/a.mp3\" }")
            .expect("parse");
        assert_eq!(w.track, TrackSource::Url("https://example.com/a.mp3".into()));
    }

    proptest::proptest! {
        #[test]
        fn prop_effective_volume_in_range(
            ops in proptest::collection::vec((0u8..3, -1.0f32..2.0), 0..40),
        ) {
            let mut player = MusicPlayer::new(track(), true, NullAudio::new());
            for (op, v) in ops {
                match op {
                    0 => player.toggle_play(),
                    1 => player.toggle_mute(),
                    _ => player.set_volume(v),
                }
                let eff = player.effective_volume();
                proptest::prop_assert!((0.0..=1.0).contains(&eff));
                if player.is_muted() {
                    proptest::prop_assert_eq!(eff, 0.0);
                }
            }
        }
    }
}
