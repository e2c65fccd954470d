//! Cloned Track - slide sequence with boundary clones
//!
//! The track is the full rendered sequence: C clones of the last C real
//! slides, then the N real slides, then C clones of the first C. The
//! clones make the wraparound seamless: stepping past either end lands
//! on a clone that renders identically to the real slide at the other
//! end, and the engine snaps back without a visible jump.
//!
//! Clones are rendered pixels only: never focusable, hidden from
//! assistive technology.

use crate::types::{Slide, SlideSet};

/// One rendered entry of the track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEntry {
    pub slide: Slide,
    /// Index of the real slide this entry renders.
    pub source_index: usize,
    pub is_clone: bool,
}

/// The derived sequence of N + 2·C slide views.
#[derive(Debug, Clone)]
pub struct ClonedTrack {
    entries: Vec<TrackEntry>,
    real_count: usize,
    clone_count: usize,
}

impl ClonedTrack {
    /// Build the track from the real slides.
    ///
    /// `slides` must be non-empty; the engine refuses to activate on an
    /// empty set before ever building a track.
    pub fn build(slides: &SlideSet, clone_count: usize) -> Self {
        let n = slides.len();
        debug_assert!(n > 0, "track built from empty slide set");
        let mut entries = Vec::with_capacity(n + 2 * clone_count);

        // Clones of the last C slides, prepended. The modular form also
        // covers C > N, where the clone blocks wrap the real set.
        for i in 0..clone_count {
            let source = (i as isize - clone_count as isize).rem_euclid(n as isize) as usize;
            if let Some(slide) = slides.get(source) {
                entries.push(TrackEntry {
                    slide: slide.clone(),
                    source_index: source,
                    is_clone: true,
                });
            }
        }

        // The real slides.
        for (i, slide) in slides.iter().enumerate() {
            entries.push(TrackEntry {
                slide: slide.clone(),
                source_index: i,
                is_clone: false,
            });
        }

        // Clones of the first C slides, appended.
        for i in 0..clone_count {
            let source = i % n;
            if let Some(slide) = slides.get(source) {
                entries.push(TrackEntry {
                    slide: slide.clone(),
                    source_index: source,
                    is_clone: true,
                });
            }
        }

        Self {
            entries,
            real_count: n,
            clone_count,
        }
    }

    /// Total entries including clones: N + 2·C.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of real slides (N).
    pub fn real_count(&self) -> usize {
        self.real_count
    }

    /// Clones on each side (C).
    pub fn clone_count(&self) -> usize {
        self.clone_count
    }

    pub fn get(&self, track_index: usize) -> Option<&TrackEntry> {
        self.entries.get(track_index)
    }

    pub fn entries(&self) -> &[TrackEntry] {
        &self.entries
    }

    /// Whether a track position sits in either clone block.
    pub fn is_clone_position(&self, track_index: usize) -> bool {
        track_index < self.clone_count || track_index >= self.clone_count + self.real_count
    }

    /// Fold a track position onto the real range [0, N) for display
    /// (dot highlighting, announcements). The visual track position
    /// keeps using the raw index including the clone range.
    pub fn fold(&self, track_index: usize) -> usize {
        let n = self.real_count as isize;
        let mut real = track_index as isize - self.clone_count as isize;
        if real < 0 {
            real += n;
        } else if real >= n {
            real -= n;
        }
        real as usize
    }
}

// =============================================================================
// TESTS
// =============================================================================
