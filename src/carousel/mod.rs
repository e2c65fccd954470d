//! Carousel - infinite-loop slideshow engine
//!
//! The hero slideshow: slide order, autoplay timing, and seamless
//! wraparound via boundary clones. One engine instance per carousel on
//! the page; all state lives in the instance and every mutation happens
//! on the event thread.
//!
//! ```text
//! SlideSet → ClonedTrack → CarouselEngine ─┬→ offset signal (track transform)
//!                                          ├→ active-slide signal (dots)
//!                                          └→ live-region announcements
//! ```

use std::sync::Arc;
use std::time::Duration;

pub mod autoplay;
pub mod engine;
pub mod metrics;
pub mod track;

pub use autoplay::{Autoplay, AutoplayPhase};
pub use engine::CarouselEngine;
pub use metrics::TrackMetrics;
pub use track::{ClonedTrack, TrackEntry};

// =============================================================================
// Timer wiring
// =============================================================================

/// Timer roles owned by one carousel instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselTimer {
    /// Initial delay before autoplay first starts.
    Start,
    /// Autoplay cadence tick.
    Tick,
    /// Auto-resume after interaction ends.
    Resume,
    /// Slide-change animation completion (the transition-end signal).
    Transition,
}

/// Posts a timer firing back into the app loop. Runs on the sleeper
/// thread; must only enqueue, never touch widget state.
pub type TimerPoster = Arc<dyn Fn(CarouselTimer, u64) + Send + Sync>;

// =============================================================================
// Configuration
// =============================================================================

/// Per-instance carousel configuration, read from the host at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselConfig {
    /// Time each slide is shown during autoplay.
    pub autoplay_interval: Duration,
    /// Slide transition animation length.
    pub transition_duration: Duration,
    /// Delay before autoplay first starts, decoupling page-load
    /// settling from animation start.
    pub initial_delay: Duration,
    /// Auto-resume delay after the last interaction.
    pub resume_delay: Duration,
    /// Clones on each side of the track.
    pub clone_count: usize,
    /// Which real slide the page opens on.
    pub start_offset: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay_interval: Duration::from_millis(5000),
            transition_duration: Duration::from_millis(700),
            initial_delay: Duration::from_millis(3000),
            resume_delay: Duration::from_millis(2000),
            clone_count: 3,
            start_offset: 2,
        }
    }
}
