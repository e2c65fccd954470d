//! Core types for marquee-tui.
//!
//! These types define the page content that everything builds on:
//! slides, gallery photos, flip-card faces, and the shared widget
//! identity used for event routing and focus bookkeeping.

use std::cell::Cell;

// =============================================================================
// Widget Identity
// =============================================================================

/// Opaque identity for a widget instance.
///
/// Used to route events back to their source (e.g. a transition-end
/// signal is only honored by the track that started the transition)
/// and as the key for focus registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

thread_local! {
    static NEXT_WIDGET_ID: Cell<u64> = const { Cell::new(1) };
}

impl WidgetId {
    /// Allocate a fresh widget id. Ids are unique per thread for the
    /// lifetime of the session and never reused.
    pub fn next() -> Self {
        NEXT_WIDGET_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            WidgetId(id)
        })
    }

    /// Raw value, for logging.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// Slides
// =============================================================================

/// One photo in the hero slideshow.
///
/// `src` is the image reference as served to the page; `alt` is the
/// assistive description. Slides are immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub src: String,
    pub alt: String,
}

impl Slide {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
        }
    }
}

/// The ordered set of real slides, fixed at initialization.
#[derive(Debug, Clone, Default)]
pub struct SlideSet {
    slides: Vec<Slide>,
}

impl SlideSet {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }
}

// =============================================================================
// Gallery photos
// =============================================================================

/// One photo in the masonry gallery.
///
/// `placeholder` is the low-quality placeholder shown before the full
/// resolution `src` finishes loading. `width`/`height` are the declared
/// dimensions used for aspect-ratio layout before any pixels arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPhoto {
    pub src: String,
    pub placeholder: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

impl GalleryPhoto {
    /// Declared aspect ratio (width / height), falling back to square
    /// when either dimension is missing or zero.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width > 0 && self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }
}

// =============================================================================
// Flip cards
// =============================================================================

/// Content for one 3D flip card in the details section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub front: String,
    pub back: String,
    /// An embedded link on the card, if any. Activating the link must
    /// not flip the card.
    pub link: Option<String>,
}

// =============================================================================
// Text attributes
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_ids_unique() {
        let a = WidgetId::next();
        let b = WidgetId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_aspect_ratio_fallback() {
        let photo = GalleryPhoto {
            src: "full.jpg".into(),
            placeholder: "lqip.jpg".into(),
            alt: "photo".into(),
            width: 1600,
            height: 0,
        };
        assert_eq!(photo.aspect_ratio(), 1.0);

        let photo = GalleryPhoto { width: 1600, height: 800, ..photo };
        assert_eq!(photo.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_slide_set_fixed_order() {
        let set = SlideSet::new(vec![
            Slide::new("hero-02.jpg", "First dance"),
            Slide::new("hero-03.jpg", "Proposal"),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().src, "hero-03.jpg");
        assert!(set.get(2).is_none());
    }
}
