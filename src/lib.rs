//! # marquee-tui
//!
//! Reactive terminal chrome for a single-page wedding website.
//!
//! Built on [spark-signals](https://crates.io/crates/spark-signals) for
//! fine-grained reactivity and crossterm for terminal I/O.
//!
//! ## Architecture
//!
//! Every widget is an isolated state object owned by the app shell and
//! mutated only on the event thread. Timers and the RSVP worker run on
//! helper threads but communicate exclusively by posting events:
//!
//! ```text
//! input / timers / worker → AppEvent channel → App::tick → widgets → view
//! ```
//!
//! The core is the [`carousel`] engine: an infinite-loop slideshow with
//! boundary clones, interruption-safe autoplay, and skip-animation
//! snap-backs that make the wraparound seamless. Around it sit the
//! page's peer widgets: lightbox viewer, masonry gallery with lazy
//! loaded images, flip cards, RSVP form, and the one-time welcome
//! overlay.
//!
//! ## Modules
//!
//! - [`types`] - Page content types (slides, photos, cards)
//! - [`state`] - Keyboard, focus, motion preference, timer slots
//! - [`carousel`] - The slideshow engine
//! - [`widgets`] - Lightbox, gallery, flip cards, first view, RSVP
//! - [`rsvp`] - Wire document and submission client
//! - [`app`] - Composition root and event loop
//! - [`view`] - Frame assembly and terminal output
//! - [`theme`] - Page palette

pub mod app;
pub mod carousel;
pub mod error;
pub mod rsvp;
pub mod state;
pub mod theme;
pub mod types;
pub mod view;
pub mod widgets;

// Re-export commonly used items
pub use types::*;

pub use carousel::{
    AutoplayPhase, CarouselConfig, CarouselEngine, CarouselTimer, ClonedTrack,
    TrackMetrics,
};

pub use state::{
    FocusEntry, FocusId, InputEvent, KeyState, KeyboardEvent, Modifiers, TimerSlot,
};

pub use widgets::{
    FirstView, FlipCard, Gallery, LazyLoader, Lightbox, LightboxItem, LoadState,
    OverlayState, RsvpForm, SubmitState,
};

pub use app::{App, AppEvent, PageContent};

pub use error::MarqueeError;

pub use theme::{Theme, ThemeColor, active_theme, get_preset, set_theme};
