//! Page composition.
//!
//! The page opens on a landing screen. `begin` dismisses it, starts the
//! soundtrack, and mounts the decorative layers of the story: petal rain
//! behind the hero and footer, sparkles behind the timeline, the cursor
//! glow, and the floating hearts. The story's interactive pieces (the
//! photo lightbox, hidden notes, and letters) only respond once it has
//! begun.

use std::sync::Arc;

use glam::Vec2;
use keepsake_common::{SurfaceError, SurfaceSize};
use keepsake_kernel::{
    mount, AnimatorConfig, AnimatorHandle, AnimatorStats, Canvas, CursorGlow, DensityTier,
    FastRandSource, FloatingBob, FrameScheduler, FrameToken, ResizeSource, SurfaceFit,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::gallery::{sample_photos, Lightbox, Photo};
use crate::music::{AudioBackend, MusicPlayer, TrackSource};
use crate::notes::{sample_notes, HiddenNote, LoveLetter, FINAL_MESSAGE};

/// Default soundtrack.
pub const DEFAULT_TRACK_URL: &str = "https://www.bensound.com/bensound-music/bensound-slowmotion.mp3";

/// Which screen the page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PagePhase {
    /// Full-screen landing with the begin button.
    #[default]
    Landing,
    /// The scrolling story with its backdrops.
    Story,
}

/// Page sections that carry a particle backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackdropSlot {
    /// Hero section at the top.
    Hero,
    /// Milestone timeline.
    Timeline,
    /// Closing "Forever & Always" section.
    Footer,
}

impl BackdropSlot {
    /// Every slot in page order.
    pub const ALL: [Self; 3] = [Self::Hero, Self::Timeline, Self::Footer];

    /// Lowercase section name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Timeline => "timeline",
            Self::Footer => "footer",
        }
    }

    const fn seed_offset(self) -> u64 {
        match self {
            Self::Hero => 0,
            Self::Timeline => 1,
            Self::Footer => 2,
        }
    }
}

/// One backdrop placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Mount this backdrop at all.
    pub enabled: bool,
    /// Particle settings.
    pub animator: AnimatorConfig,
    /// Surface sizing.
    pub fit: SurfaceFit,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            animator: AnimatorConfig::petal(),
            fit: SurfaceFit::Viewport,
        }
    }
}

impl BackdropConfig {
    /// Petal rain over the viewport at the given density.
    #[must_use]
    pub fn petal_rain(density: DensityTier) -> Self {
        Self {
            animator: AnimatorConfig::petal().with_density(density),
            ..Self::default()
        }
    }

    /// Sparkles over a section container.
    #[must_use]
    pub fn sparkles(width_ratio: f32, height_ratio: f32) -> Self {
        Self {
            animator: AnimatorConfig::sparkle(),
            fit: SurfaceFit::Container {
                width_ratio,
                height_ratio,
            },
            ..Self::default()
        }
    }
}

/// Page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Backdrop behind the hero.
    pub hero: BackdropConfig,
    /// Backdrop behind the timeline.
    pub timeline: BackdropConfig,
    /// Backdrop behind the footer.
    pub footer: BackdropConfig,
    /// Soundtrack.
    pub track: TrackSource,
    /// Seed for every backdrop's random source; entropy when unset.
    pub seed: Option<u64>,
    /// Show the cursor glow.
    pub cursor_glow: bool,
    /// Gallery photos.
    pub photos: Vec<Photo>,
    /// Notes hidden along the story, in page order.
    pub notes: Vec<HiddenNote>,
    /// Sealed letters.
    pub letters: Vec<LoveLetter>,
    /// Closing message.
    pub final_message: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            hero: BackdropConfig::petal_rain(DensityTier::Medium),
            timeline: BackdropConfig::sparkles(1.0, 0.75),
            footer: BackdropConfig::petal_rain(DensityTier::Light),
            track: TrackSource::Url(DEFAULT_TRACK_URL.to_string()),
            seed: None,
            cursor_glow: true,
            photos: sample_photos(),
            notes: sample_notes(),
            letters: Vec::new(),
            final_message: FINAL_MESSAGE.to_string(),
        }
    }
}

impl PageConfig {
    /// Clamp every backdrop's particle settings.
    pub fn validate(&mut self) {
        for placement in [&mut self.hero, &mut self.timeline, &mut self.footer] {
            placement.animator.validate();
        }
    }

    /// Placement for `slot`.
    #[must_use]
    pub fn backdrop(&self, slot: BackdropSlot) -> &BackdropConfig {
        match slot {
            BackdropSlot::Hero => &self.hero,
            BackdropSlot::Timeline => &self.timeline,
            BackdropSlot::Footer => &self.footer,
        }
    }
}

/// A heart icon bobbing in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingHeart {
    /// Section the heart sits in.
    pub section: BackdropSlot,
    /// Its motion.
    pub bob: FloatingBob,
}

/// Floating hearts of the story, hero first.
pub const FLOATING_HEARTS: [FloatingHeart; 6] = [
    FloatingHeart {
        section: BackdropSlot::Hero,
        bob: FloatingBob::new(4.0, 15.0),
    },
    FloatingHeart {
        section: BackdropSlot::Hero,
        bob: FloatingBob::new(5.0, 20.0),
    },
    FloatingHeart {
        section: BackdropSlot::Hero,
        bob: FloatingBob::new(6.0, 12.0),
    },
    FloatingHeart {
        section: BackdropSlot::Footer,
        bob: FloatingBob::new(2.0, 8.0),
    },
    FloatingHeart {
        section: BackdropSlot::Footer,
        bob: FloatingBob::new(2.5, 8.0),
    },
    FloatingHeart {
        section: BackdropSlot::Footer,
        bob: FloatingBob::new(3.0, 8.0),
    },
];

/// Backdrop handle type used by the page.
pub type Backdrop<C> = AnimatorHandle<C, FastRandSource>;

/// The tribute page.
pub struct Page<C: Canvas + 'static, B: AudioBackend> {
    config: PageConfig,
    phase: PagePhase,
    backdrops: Vec<(BackdropSlot, Backdrop<C>)>,
    music: Option<MusicPlayer<B>>,
    cursor: Arc<Mutex<CursorGlow>>,
    cursor_token: Option<FrameToken>,
    gallery: Lightbox,
    notes: Vec<HiddenNote>,
    letters: Vec<LoveLetter>,
}

impl<C: Canvas + 'static, B: AudioBackend> std::fmt::Debug for Page<C, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("phase", &self.phase)
            .field("backdrops", &self.backdrops.len())
            .field("music", &self.music)
            .field("gallery", &self.gallery.selected())
            .finish_non_exhaustive()
    }
}

impl<C: Canvas + 'static, B: AudioBackend> Page<C, B> {
    /// A page on its landing screen.
    #[must_use]
    pub fn new(config: PageConfig) -> Self {
        Self {
            gallery: Lightbox::new(config.photos.clone()),
            notes: config.notes.clone(),
            letters: config.letters.clone(),
            config,
            phase: PagePhase::Landing,
            backdrops: Vec::new(),
            music: None,
            cursor: Arc::new(Mutex::new(CursorGlow::new())),
            cursor_token: None,
        }
    }

    /// Dismiss the landing screen and start the story.
    ///
    /// `acquire` is asked for one canvas per enabled backdrop; a backdrop
    /// whose canvas is unavailable stays inert. Returns false if the story
    /// had already begun.
    pub fn begin<A>(
        &mut self,
        mut acquire: A,
        audio: B,
        scheduler: &mut dyn FrameScheduler,
        resize_source: &mut dyn ResizeSource,
    ) -> bool
    where
        A: FnMut(BackdropSlot, SurfaceSize) -> Result<C, SurfaceError>,
    {
        if self.phase == PagePhase::Story {
            return false;
        }
        self.phase = PagePhase::Story;
        self.music = Some(MusicPlayer::new(self.config.track.clone(), true, audio));

        for slot in BackdropSlot::ALL {
            let placement = *self.config.backdrop(slot);
            if !placement.enabled {
                debug!("Backdrop {slot:?} disabled");
                continue;
            }
            let rng = FastRandSource::from_optional_seed(
                self.config.seed.map(|s| s.wrapping_add(slot.seed_offset())),
            );
            let handle = mount(
                placement.animator,
                placement.fit,
                |size| acquire(slot, size),
                rng,
                scheduler,
                resize_source,
            );
            self.backdrops.push((slot, handle));
        }

        if self.config.cursor_glow {
            self.cursor_token = Some(CursorGlow::attach(&self.cursor, scheduler));
        }

        info!(
            "Story began: {} backdrops ({} active), music {}",
            self.backdrops.len(),
            self.backdrops.iter().filter(|(_, h)| h.is_active()).count(),
            self.music.as_ref().is_some_and(MusicPlayer::is_available)
        );
        true
    }

    /// Tear down every backdrop, the cursor glow, and the soundtrack.
    ///
    /// Returns the final counters of each backdrop that was running.
    pub fn unmount_all(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        resize_source: &mut dyn ResizeSource,
    ) -> Vec<(BackdropSlot, AnimatorStats)> {
        let mut finished = Vec::new();
        for (slot, handle) in self.backdrops.drain(..) {
            if let Some(stats) = handle.unmount(scheduler, resize_source) {
                finished.push((slot, stats));
            }
        }
        if let Some(token) = self.cursor_token.take() {
            CursorGlow::detach(token, scheduler);
        }
        self.music = None;
        info!("Page torn down ({} backdrops stopped)", finished.len());
        finished
    }

    /// Forward a pointer move to the cursor glow.
    pub fn pointer_moved(&mut self, position: Vec2) {
        self.cursor.lock().pointer_moved(position);
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// The mounted backdrop for `slot`, if any.
    #[must_use]
    pub fn backdrop(&self, slot: BackdropSlot) -> Option<&Backdrop<C>> {
        self.backdrops
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, handle)| handle)
    }

    /// Every mounted backdrop in page order.
    pub fn backdrops(&self) -> impl Iterator<Item = (BackdropSlot, &Backdrop<C>)> {
        self.backdrops.iter().map(|(slot, handle)| (*slot, handle))
    }

    /// The music player, once the story has begun.
    #[must_use]
    pub fn music(&self) -> Option<&MusicPlayer<B>> {
        self.music.as_ref()
    }

    /// Mutable music player, for the on-page controls.
    pub fn music_mut(&mut self) -> Option<&mut MusicPlayer<B>> {
        self.music.as_mut()
    }

    /// Snapshot of the cursor glow.
    #[must_use]
    pub fn cursor(&self) -> CursorGlow {
        *self.cursor.lock()
    }

    /// The photo lightbox.
    #[must_use]
    pub fn gallery(&self) -> &Lightbox {
        &self.gallery
    }

    /// The lightbox, for clicks and key presses. `None` on the landing screen.
    pub fn gallery_mut(&mut self) -> Option<&mut Lightbox> {
        (self.phase == PagePhase::Story).then_some(&mut self.gallery)
    }

    /// Hidden notes in page order.
    #[must_use]
    pub fn notes(&self) -> &[HiddenNote] {
        &self.notes
    }

    /// Reveal the note at `index`. Returns true only when it was hidden
    /// and the story is showing.
    pub fn reveal_note(&mut self, index: usize) -> bool {
        if self.phase != PagePhase::Story {
            return false;
        }
        self.notes.get_mut(index).is_some_and(HiddenNote::reveal)
    }

    /// Sealed letters.
    #[must_use]
    pub fn letters(&self) -> &[LoveLetter] {
        &self.letters
    }

    /// The letter at `index`, for opening and closing. `None` on the
    /// landing screen.
    pub fn letter_mut(&mut self, index: usize) -> Option<&mut LoveLetter> {
        if self.phase != PagePhase::Story {
            return None;
        }
        self.letters.get_mut(index)
    }

    /// Vertical offsets of every floating heart at `time_secs`.
    #[must_use]
    pub fn heart_offsets(&self, time_secs: f64) -> Vec<(BackdropSlot, f32)> {
        if self.phase != PagePhase::Story {
            return Vec::new();
        }
        FLOATING_HEARTS
            .iter()
            .map(|heart| (heart.section, heart.bob.offset_at(time_secs)))
            .collect()
    }
}
