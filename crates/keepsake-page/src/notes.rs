//! Hidden love notes and sealed letters.

use keepsake_common::Rgba;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hint shown over a note that has no hint of its own.
pub const DEFAULT_NOTE_HINT: &str = "Click to reveal";

/// Hint shown on a closed envelope that has no hint of its own.
pub const DEFAULT_LETTER_HINT: &str = "A message for you...";

/// Wax seal gradients, cycled by card index.
pub const SEAL_COLORS: [(Rgba, Rgba); 3] = [
    (Rgba::from_hex(0xF2_A7B8), Rgba::from_hex(0xC9_858A)),
    (Rgba::from_hex(0xC9_A9E9), Rgba::from_hex(0x9B_72CF)),
    (Rgba::from_hex(0xFF_D6A5), Rgba::from_hex(0xE8_A96B)),
];

/// A message blurred behind a hint until clicked.
///
/// Revealing is one-way; there is no way to blur a note again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenNote {
    /// Hint shown while blurred.
    #[serde(default = "default_note_hint")]
    pub hint: String,
    /// The message.
    pub message: String,
    #[serde(skip)]
    revealed: bool,
}

fn default_note_hint() -> String {
    DEFAULT_NOTE_HINT.to_string()
}

impl HiddenNote {
    /// A blurred note.
    pub fn new(hint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hint: hint.into(),
            message: message.into(),
            revealed: false,
        }
    }

    /// Reveal the note. Returns true the first time only.
    pub fn reveal(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        debug!("Revealed note \"{}\"", self.hint);
        self.revealed = true;
        true
    }

    /// Whether the message is visible.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// The message once revealed.
    #[must_use]
    pub fn visible_message(&self) -> Option<&str> {
        self.revealed.then_some(self.message.as_str())
    }
}

/// The three notes hidden along the story, in page order.
#[must_use]
pub fn sample_notes() -> Vec<HiddenNote> {
    vec![
        HiddenNote::new(
            "💕 A secret message awaits...",
            "Every day with you is a new adventure. Thank you for being my partner in everything.",
        ),
        HiddenNote::new(
            "✨ Click to reveal something special",
            "You make ordinary moments extraordinary just by being there.",
        ),
        HiddenNote::new(
            "💝 One more secret...",
            "I fall in love with you more and more each day.",
        ),
    ]
}

/// Closing message under "Forever & Always".
pub const FINAL_MESSAGE: &str = "You are my today and all of my tomorrows.";

/// A letter sealed in an envelope that opens and closes on click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoveLetter {
    /// Hint on the envelope.
    #[serde(default = "default_letter_hint")]
    pub hint: String,
    /// The letter body.
    pub message: String,
    /// Position among the letters; picks the seal color.
    #[serde(default)]
    pub card_index: usize,
    #[serde(skip)]
    open: bool,
}

fn default_letter_hint() -> String {
    DEFAULT_LETTER_HINT.to_string()
}

impl LoveLetter {
    /// A sealed letter with the default hint.
    pub fn new(message: impl Into<String>, card_index: usize) -> Self {
        Self {
            hint: default_letter_hint(),
            message: message.into(),
            card_index,
            open: false,
        }
    }

    /// Break the seal.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Fold the letter back into its envelope.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Whether the letter is out of its envelope.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Seal gradient as `(highlight, shadow)`.
    #[must_use]
    pub fn seal(&self) -> (Rgba, Rgba) {
        SEAL_COLORS[self.card_index % SEAL_COLORS.len()]
    }
}
