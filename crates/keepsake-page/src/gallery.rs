//! Photo gallery and its lightbox.
//!
//! Clicking a thumbnail opens the lightbox on that photo. While open, the
//! previous and next controls wrap around the collection, Escape closes
//! it, and the arrow keys navigate.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One gallery photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Image location.
    pub src: String,
    /// Alternate text.
    pub alt: String,
    /// Caption shown under the enlarged image.
    #[serde(default)]
    pub caption: Option<String>,
}

impl Photo {
    /// A photo with a caption.
    pub fn new(src: impl Into<String>, alt: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            caption: Some(caption.into()),
        }
    }
}

/// Sample photos shipped with the page, as `(src, alt, caption)`.
const SAMPLE_PHOTOS: [(&str, &str, &str); 8] = [
    (
        "https://images.unsplash.com/photo-1516589178581-6cd7833ae3b2?w=600",
        "Beautiful moment together",
        "Our first adventure",
    ),
    (
        "https://images.unsplash.com/photo-1518199266791-5375a83190b7?w=600",
        "Sunset memories",
        "Watching the sunset",
    ),
    (
        "https://images.unsplash.com/photo-1522673607159-d9e8d3a28b50?w=600",
        "Happy times",
        "Laughter and joy",
    ),
    (
        "https://images.unsplash.com/photo-1514846326710-096e4a8035e0?w=600",
        "Special celebration",
        "Celebrating us",
    ),
    (
        "https://images.unsplash.com/photo-1476900164809-ff19b8ae5968?w=600",
        "Nature walk",
        "Walking together",
    ),
    (
        "https://images.unsplash.com/photo-1522663107331-e4d7e5e5c11d?w=600",
        "Cozy moments",
        "Comfortable silence",
    ),
    (
        "https://images.unsplash.com/photo-1518568814500-bf0f8d125f46?w=600",
        "City adventures",
        "Urban exploring",
    ),
    (
        "https://images.unsplash.com/photo-1522673607159-7b4f90e9e120?w=600",
        "Sweet memories",
        "Forever in my heart",
    ),
];

/// The default gallery.
#[must_use]
pub fn sample_photos() -> Vec<Photo> {
    SAMPLE_PHOTOS
        .iter()
        .map(|(src, alt, caption)| Photo::new(*src, *alt, *caption))
        .collect()
}

/// Keys the lightbox listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Close the lightbox.
    Escape,
    /// Previous photo.
    ArrowLeft,
    /// Next photo.
    ArrowRight,
    /// Anything else; ignored.
    Other,
}

/// Lightbox over a photo collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lightbox {
    photos: Vec<Photo>,
    selected: Option<usize>,
}

impl Lightbox {
    /// A closed lightbox over `photos`.
    #[must_use]
    pub fn new(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            selected: None,
        }
    }

    /// Open on the photo at `index`. Out-of-range indices are ignored.
    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.photos.len() {
            debug!("Ignoring lightbox open at {index} of {}", self.photos.len());
            return false;
        }
        self.selected = Some(index);
        true
    }

    /// Close the lightbox.
    pub fn close(&mut self) {
        self.selected = None;
    }

    /// Step to the next photo, wrapping to the first.
    pub fn next(&mut self) {
        if let Some(index) = self.selected {
            self.selected = Some((index + 1) % self.photos.len());
        }
    }

    /// Step to the previous photo, wrapping to the last.
    pub fn prev(&mut self) {
        if let Some(index) = self.selected {
            let len = self.photos.len();
            self.selected = Some((index + len - 1) % len);
        }
    }

    /// Handle a key press while the lightbox has focus.
    pub fn key(&mut self, key: Key) {
        match key {
            Key::Escape => self.close(),
            Key::ArrowLeft => self.prev(),
            Key::ArrowRight => self.next(),
            Key::Other => {},
        }
    }

    /// Whether a photo is enlarged.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Index of the enlarged photo.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The enlarged photo.
    #[must_use]
    pub fn current(&self) -> Option<&Photo> {
        self.selected.and_then(|index| self.photos.get(index))
    }

    /// Position counter, e.g. `"3 / 8"`.
    #[must_use]
    pub fn counter(&self) -> Option<String> {
        self.selected
            .map(|index| format!("{} / {}", index + 1, self.photos.len()))
    }

    /// Every photo in the gallery.
    #[must_use]
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_gallery() {
        let photos = sample_photos();
        assert_eq!(photos.len(), 8);
        assert_eq!(photos[7].caption.as_deref(), Some("Forever in my heart"));
    }

    #[test]
    fn test_open_and_close() {
        let mut lightbox = Lightbox::new(sample_photos());
        assert!(!lightbox.is_open());
        assert!(lightbox.counter().is_none());

        assert!(lightbox.open(2));
        assert_eq!(lightbox.counter().as_deref(), Some("3 / 8"));
        assert_eq!(lightbox.current().map(|p| p.alt.as_str()), Some("Happy times"));

        lightbox.close();
        assert!(lightbox.current().is_none());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut lightbox = Lightbox::new(sample_photos());
        lightbox.open(7);
        lightbox.next();
        assert_eq!(lightbox.selected(), Some(0));
        lightbox.prev();
        assert_eq!(lightbox.selected(), Some(7));
        lightbox.prev();
        assert_eq!(lightbox.selected(), Some(6));
    }

    #[test]
    fn test_keys() {
        let mut lightbox = Lightbox::new(sample_photos());
        lightbox.open(0);
        lightbox.key(Key::ArrowLeft);
        assert_eq!(lightbox.counter().as_deref(), Some("8 / 8"));
        lightbox.key(Key::ArrowRight);
        lightbox.key(Key::ArrowRight);
        assert_eq!(lightbox.selected(), Some(1));
        lightbox.key(Key::Other);
        assert_eq!(lightbox.selected(), Some(1));
        lightbox.key(Key::Escape);
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_closed_lightbox_ignores_navigation() {
        let mut lightbox = Lightbox::new(sample_photos());
        lightbox.next();
        lightbox.key(Key::ArrowLeft);
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_empty_gallery_does_nothing() {
        let mut lightbox = Lightbox::new(Vec::new());
        assert!(!lightbox.open(0));
        lightbox.next();
        lightbox.prev();
        lightbox.key(Key::ArrowRight);
        assert!(!lightbox.is_open());
        assert!(lightbox.counter().is_none());
    }

    #[test]
    fn test_open_out_of_range() {
        let mut lightbox = Lightbox::new(sample_photos());
        assert!(!lightbox.open(8));
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_single_photo_wraps_onto_itself() {
        let mut lightbox = Lightbox::new(vec![Photo::new("a.jpg", "a", "only")]);
        lightbox.open(0);
        lightbox.next();
        lightbox.prev();
        assert_eq!(lightbox.counter().as_deref(), Some("1 / 1"));
    }

    #[test]
    fn test_photo_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            photos: Vec<Photo>,
        }
        let doc: Doc = toml::from_str(
            r#"
            [[photos]]
            src = "images/beach.jpg"
            alt = "Beach"
            "#,
        )
        .expect("parse");
        assert_eq!(doc.photos[0].caption, None);
    }
}
