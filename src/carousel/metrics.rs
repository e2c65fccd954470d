//! Track Metrics - live layout measurements and the centering offset
//!
//! The engine reads layout metrics, it never owns them: the host
//! supplies container width and padding (for the terminal, columns and
//! the configured gutter), and the centering math places the active
//! slide in the middle of the content area whatever the viewport size.

use tracing::warn;

/// Layout measurements for one positioning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMetrics {
    /// Total container width.
    pub container_width: f32,
    pub padding_left: f32,
    pub padding_right: f32,
    /// Rendered width of a single slide.
    pub slide_width: f32,
}

impl TrackMetrics {
    /// Metrics for a terminal viewport: symmetric gutter, slides at
    /// half the content area (the layout the page styles declare).
    pub fn from_viewport(columns: u16, gutter: u16) -> Self {
        let container_width = columns as f32;
        let padding = gutter as f32;
        let content = (container_width - 2.0 * padding).max(0.0);
        Self {
            container_width,
            padding_left: padding,
            padding_right: padding,
            slide_width: content / 2.0,
        }
    }

    /// Width of the content area where slides live.
    pub fn content_width(&self) -> f32 {
        self.container_width - self.padding_left - self.padding_right
    }

    /// Offset that horizontally centers the slide at `track_index`.
    ///
    /// content center − (natural left edge + half a slide). A zero or
    /// degenerate layout clamps instead of dividing into artifacts: a
    /// collapsed content area centers nothing and positions the track
    /// at zero until real metrics arrive with the next resize.
    pub fn centering_offset(&self, track_index: usize) -> f32 {
        let content_width = self.content_width();
        if content_width <= 0.0 {
            warn!(content_width = content_width as f64, "degenerate layout, positioning track at origin");
            return 0.0;
        }
        let slide_width = self.slide_width.max(1.0);

        let natural_left = track_index as f32 * slide_width;
        let natural_center = natural_left + slide_width / 2.0;
        let content_center = content_width / 2.0;

        content_center - natural_center
    }
}

// =============================================================================
// TESTS
// =============================================================================
