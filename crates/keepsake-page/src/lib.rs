//! # Keepsake Page
//!
//! Composition of the "Our Love Story" tribute page.
//!
//! This crate wires the kernel's decorative layers into the page:
//! - Landing and story phases
//! - Backdrop placements (hero and footer petal rain, timeline sparkles)
//! - Cursor glow and floating hearts
//! - Looping soundtrack with play, mute, and volume controls
//! - Photo lightbox, hidden notes, and sealed letters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod gallery;
pub mod music;
pub mod notes;
pub mod page;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::gallery::*;
    pub use crate::music::*;
    pub use crate::notes::*;
    pub use crate::page::*;
}

pub use prelude::*;
