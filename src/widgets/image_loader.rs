//! Lazy Image Loader - placeholder to full-resolution progression
//!
//! Each photo starts on its low-quality placeholder and upgrades to the
//! full-resolution reference exactly once, triggered by visibility:
//! items already above the fold load immediately, the rest load as they
//! come within the prefetch margin of the viewport. A failed load keeps
//! the placeholder and clears the loading state; it does not retry.

use tracing::{debug, warn};

use crate::types::GalleryPhoto;

/// How far below the viewport loading starts, in layout units.
pub const PREFETCH_MARGIN: f32 = 50.0;

/// Load progression of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Showing the placeholder, not yet requested.
    Placeholder,
    /// Full-resolution request in flight; placeholder still shown
    /// (blurred).
    Loading,
    /// Full resolution displayed.
    Loaded,
    /// Request failed; placeholder stays, no retry.
    Failed,
}

/// Tracks load state for a photo collection.
pub struct LazyLoader {
    states: Vec<LoadState>,
}

impl LazyLoader {
    pub fn new(count: usize) -> Self {
        Self {
            states: vec![LoadState::Placeholder; count],
        }
    }

    pub fn state(&self, index: usize) -> LoadState {
        self.states.get(index).copied().unwrap_or(LoadState::Placeholder)
    }

    /// Begin loading every untouched item whose top edge is within the
    /// prefetch margin of the viewport bottom. Returns the indices that
    /// started, for the caller to fetch.
    pub fn request_visible(&mut self, item_tops: &[f32], viewport_bottom: f32) -> Vec<usize> {
        let threshold = viewport_bottom + PREFETCH_MARGIN;
        let mut started = Vec::new();
        for (index, top) in item_tops.iter().enumerate() {
            if *top >= threshold {
                continue;
            }
            if let Some(state) = self.states.get_mut(index) {
                if *state == LoadState::Placeholder {
                    *state = LoadState::Loading;
                    started.push(index);
                }
            }
        }
        if !started.is_empty() {
            debug!(count = started.len(), "image loads started");
        }
        started
    }

    /// A fetch finished. The swap to full resolution happens exactly
    /// once; completions for already-settled items are ignored.
    pub fn finish(&mut self, index: usize, ok: bool) {
        let Some(state) = self.states.get_mut(index) else {
            return;
        };
        if *state != LoadState::Loading {
            return;
        }
        *state = if ok {
            LoadState::Loaded
        } else {
            warn!(index, "image failed to load");
            LoadState::Failed
        };
    }

    /// The reference to display for a photo right now.
    pub fn display_src<'a>(&self, index: usize, photo: &'a GalleryPhoto) -> &'a str {
        match self.state(index) {
            LoadState::Loaded => &photo.src,
            _ => &photo.placeholder,
        }
    }

    /// Whether the blur treatment applies (placeholder shown while a
    /// request is in flight).
    pub fn is_blurred(&self, index: usize) -> bool {
        self.state(index) == LoadState::Loading
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> GalleryPhoto {
        GalleryPhoto {
            src: "full.jpg".into(),
            placeholder: "lqip.jpg".into(),
            alt: "photo".into(),
            width: 800,
            height: 600,
        }
    }

    #[test]
    fn test_visibility_triggers_with_margin() {
        let mut loader = LazyLoader::new(3);
        // Viewport bottom 100, margin 50: tops 0 and 120 qualify, 400
        // does not.
        let started = loader.request_visible(&[0.0, 120.0, 400.0], 100.0);
        assert_eq!(started, vec![0, 1]);
        assert_eq!(loader.state(0), LoadState::Loading);
        assert_eq!(loader.state(2), LoadState::Placeholder);

        // Requesting again does not restart in-flight items.
        let started = loader.request_visible(&[0.0, 120.0, 400.0], 100.0);
        assert!(started.is_empty());
    }

    #[test]
    fn test_swap_happens_once() {
        let photo = photo();
        let mut loader = LazyLoader::new(1);
        assert_eq!(loader.display_src(0, &photo), "lqip.jpg");

        loader.request_visible(&[0.0], 100.0);
        assert!(loader.is_blurred(0));

        loader.finish(0, true);
        assert_eq!(loader.state(0), LoadState::Loaded);
        assert_eq!(loader.display_src(0, &photo), "full.jpg");
        assert!(!loader.is_blurred(0));

        // A late duplicate completion is ignored.
        loader.finish(0, false);
        assert_eq!(loader.state(0), LoadState::Loaded);
    }

    #[test]
    fn test_failure_keeps_placeholder() {
        let photo = photo();
        let mut loader = LazyLoader::new(1);
        loader.request_visible(&[0.0], 100.0);
        loader.finish(0, false);

        assert_eq!(loader.state(0), LoadState::Failed);
        assert_eq!(loader.display_src(0, &photo), "lqip.jpg");
        assert!(!loader.is_blurred(0));

        // Failed items do not re-request on later scrolls.
        let started = loader.request_visible(&[0.0], 100.0);
        assert!(started.is_empty());
    }

    #[test]
    fn test_finish_out_of_range_ignored() {
        let mut loader = LazyLoader::new(1);
        loader.finish(7, true);
        assert_eq!(loader.state(0), LoadState::Placeholder);
    }
}
