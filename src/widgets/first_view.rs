//! First-View Overlay - one-time welcome screen
//!
//! Shown on top of the page only until the visitor dismisses it once.
//! Dismissal writes a marker file in the platform state directory,
//! fades the overlay out, then removes it. A missing or unwritable
//! state directory degrades to always-show; it is never an error.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::state::timer::TimerSlot;

/// Fade-out length before the overlay is removed.
pub const FADE_DURATION: Duration = Duration::from_millis(1000);

const MARKER_FILE: &str = "first_view_seen";

/// The welcome lines, in display order.
pub const WELCOME_LINES: [&str; 7] = [
    "You've waited long enough",
    "We've been asked many times",
    "SO many times",
    "The time has come",
    "May 30, 2026",
    "The Tower, 101 Arlington Street, Boston, MA",
    "The Kiernan/Smith Wedding",
];

pub const CTA_LABEL: &str = "View Details";

/// Overlay lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Marker present; never shown this session.
    Hidden,
    Showing,
    FadingOut,
    Dismissed,
}

/// Posts the fade-complete timer firing back into the app loop.
pub type FadePoster = Arc<dyn Fn(u64) + Send + Sync>;

/// The one-time overlay.
pub struct FirstView {
    state: OverlayState,
    marker_path: Option<PathBuf>,
    fade_slot: TimerSlot,
    poster: FadePoster,
}

impl FirstView {
    /// Check the marker and decide whether to show.
    pub fn new(poster: FadePoster) -> Self {
        Self::with_marker_dir(default_marker_dir(), poster)
    }

    /// Same, with an explicit marker directory (tests, portable mode).
    pub fn with_marker_dir(dir: Option<PathBuf>, poster: FadePoster) -> Self {
        let marker_path = dir.map(|d| d.join(MARKER_FILE));
        let seen = marker_path
            .as_deref()
            .map(|p| p.exists())
            .unwrap_or(false);

        Self {
            state: if seen { OverlayState::Hidden } else { OverlayState::Showing },
            marker_path,
            fade_slot: TimerSlot::new("first-view-fade"),
            poster,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Whether the overlay currently covers the page.
    pub fn is_visible(&self) -> bool {
        matches!(self.state, OverlayState::Showing | OverlayState::FadingOut)
    }

    /// The visitor activated the call-to-action: mark as seen, start
    /// the fade.
    pub fn dismiss(&mut self) {
        if self.state != OverlayState::Showing {
            return;
        }
        self.write_marker();
        self.state = OverlayState::FadingOut;
        let poster = self.poster.clone();
        self.fade_slot.arm(FADE_DURATION, move |generation| {
            poster(generation);
        });
        debug!("first-view overlay dismissed");
    }

    /// The fade timer fired: remove the overlay.
    pub fn on_fade_complete(&mut self, generation: u64) {
        if !self.fade_slot.accept(generation) {
            return;
        }
        self.state = OverlayState::Dismissed;
    }

    fn write_marker(&self) {
        let Some(path) = &self.marker_path else {
            return;
        };
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, b"")
        };
        if let Err(err) = write() {
            warn!(?path, %err, "could not persist first-view marker");
        }
    }

    pub fn dispose(&mut self) {
        self.fade_slot.cancel();
    }

    #[cfg(test)]
    pub(crate) fn fade_generation(&self) -> Option<u64> {
        self.fade_slot.armed_generation()
    }
}

fn default_marker_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "RLabs", "marquee-tui")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
}

// =============================================================================
// TESTS
// =============================================================================
