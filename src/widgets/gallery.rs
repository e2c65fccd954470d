//! Gallery - column-based masonry layout with staggered reveal
//!
//! Positions photos into the shortest column to eliminate gaps,
//! using declared aspect ratios so the layout is stable before any
//! pixels arrive. Column count follows the viewport width; a resize
//! repositions only when the count actually changes. Items fade in
//! with a small stagger as they become visible, unless reduced motion
//! is active.

use std::time::Duration;

use tracing::debug;

use crate::types::GalleryPhoto;

/// Gap between items, in layout units.
pub const GALLERY_GAP: f32 = 12.0;
/// Stagger step between items revealed in the same group.
pub const REVEAL_STAGGER: Duration = Duration::from_millis(40);
/// Items per stagger group.
pub const REVEAL_GROUP: usize = 8;

/// Column count for a viewport width, matching the page breakpoints.
pub fn column_count_for(width: f32) -> usize {
    if width < 640.0 {
        1
    } else if width < 768.0 {
        2
    } else if width < 1024.0 {
        3
    } else {
        4
    }
}

/// Computed placement of one item, rounded to whole units to prevent
/// sub-pixel gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPlacement {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub column: usize,
}

/// Reveal animation state of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Visible,
}

/// The masonry gallery.
pub struct Gallery {
    photos: Vec<GalleryPhoto>,
    container_width: f32,
    column_count: usize,
    column_heights: Vec<f32>,
    placements: Vec<ItemPlacement>,
    reveals: Vec<RevealState>,
    reduced_motion: bool,
}

impl Gallery {
    /// Lay out the photos for a container width. An empty photo set is
    /// a valid gallery that renders nothing.
    pub fn new(photos: Vec<GalleryPhoto>, container_width: f32, reduced_motion: bool) -> Self {
        let reveals = vec![
            if reduced_motion { RevealState::Visible } else { RevealState::Hidden };
            photos.len()
        ];
        let mut gallery = Self {
            photos,
            container_width,
            column_count: column_count_for(container_width),
            column_heights: Vec::new(),
            placements: Vec::new(),
            reveals,
            reduced_motion,
        };
        gallery.layout();
        gallery
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn photos(&self) -> &[GalleryPhoto] {
        &self.photos
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn placements(&self) -> &[ItemPlacement] {
        &self.placements
    }

    pub fn placement(&self, index: usize) -> Option<&ItemPlacement> {
        self.placements.get(index)
    }

    /// Container height: the tallest column.
    pub fn total_height(&self) -> f32 {
        self.column_heights.iter().copied().fold(0.0, f32::max)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn layout(&mut self) {
        self.column_heights = vec![0.0; self.column_count];
        self.placements.clear();

        let gap = GALLERY_GAP;
        let cols = self.column_count as f32;
        let column_width = (self.container_width - gap * (cols - 1.0)) / cols;

        for photo in &self.photos {
            let item_height = column_width / photo.aspect_ratio();

            // Shortest column wins.
            let mut shortest = 0;
            for i in 1..self.column_heights.len() {
                if self.column_heights[i] < self.column_heights[shortest] {
                    shortest = i;
                }
            }

            let left = (shortest as f32 * (column_width + gap)).round() as i32;
            let top = self.column_heights[shortest].round() as i32;
            let width = column_width.round() as i32;
            let height = item_height.round() as i32;

            self.placements.push(ItemPlacement {
                left,
                top,
                width,
                height,
                column: shortest,
            });
            self.column_heights[shortest] += height as f32 + gap;
        }
    }

    /// Viewport resized. Recomputes the column count and repositions
    /// only when it changed. Returns true when a relayout happened.
    pub fn handle_resize(&mut self, container_width: f32) -> bool {
        self.container_width = container_width;
        let new_count = column_count_for(container_width);
        if new_count == self.column_count {
            return false;
        }
        debug!(from = self.column_count, to = new_count, "masonry column count changed");
        self.column_count = new_count;
        self.layout();
        true
    }

    // =========================================================================
    // Reveal
    // =========================================================================

    /// Stagger delay before item `index` fades in, grouped so only
    /// nearby items stagger against each other. Zero under reduced
    /// motion.
    pub fn reveal_delay(&self, index: usize) -> Duration {
        if self.reduced_motion {
            return Duration::ZERO;
        }
        REVEAL_STAGGER * ((index % REVEAL_GROUP) as u32)
    }

    /// Mark an item's reveal animation as finished.
    pub fn mark_revealed(&mut self, index: usize) {
        if let Some(state) = self.reveals.get_mut(index) {
            *state = RevealState::Visible;
        }
    }

    pub fn reveal_state(&self, index: usize) -> RevealState {
        self.reveals.get(index).copied().unwrap_or(RevealState::Hidden)
    }

    /// Indices of hidden items that have scrolled into view (with the
    /// prefetch margin applied by the caller).
    pub fn hidden_items_above(&self, viewport_bottom: f32) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(i, placement)| {
                self.reveals[*i] == RevealState::Hidden
                    && (placement.top as f32) < viewport_bottom
            })
            .map(|(i, _)| i)
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(width: u32, height: u32) -> GalleryPhoto {
        GalleryPhoto {
            src: "full.jpg".into(),
            placeholder: "lqip.jpg".into(),
            alt: "photo".into(),
            width,
            height,
        }
    }

    #[test]
    fn test_breakpoints() {
        assert_eq!(column_count_for(320.0), 1);
        assert_eq!(column_count_for(640.0), 2);
        assert_eq!(column_count_for(768.0), 3);
        assert_eq!(column_count_for(1024.0), 4);
        assert_eq!(column_count_for(1920.0), 4);
    }

    #[test]
    fn test_items_fill_shortest_column() {
        // Four-column layout: the first four items land in distinct
        // columns, the fifth goes under the shortest (the landscape
        // one, which is the shortest column).
        let photos = vec![
            photo(800, 1200), // tall
            photo(800, 400),  // short landscape
            photo(800, 1200),
            photo(800, 1200),
            photo(800, 800),
        ];
        let gallery = Gallery::new(photos, 1200.0, false);
        assert_eq!(gallery.column_count(), 4);

        let columns: Vec<usize> = gallery.placements().iter().map(|p| p.column).collect();
        assert_eq!(&columns[..4], &[0, 1, 2, 3]);
        assert_eq!(columns[4], 1);
        // Stacked below the landscape item, gap included.
        let first = gallery.placement(1).unwrap();
        let fifth = gallery.placement(4).unwrap();
        assert_eq!(fifth.top, first.height + GALLERY_GAP as i32);
    }

    #[test]
    fn test_heights_follow_aspect_ratio() {
        let gallery = Gallery::new(vec![photo(800, 400)], 500.0, false);
        let placement = gallery.placement(0).unwrap();
        // One column 500 wide; aspect 2.0 gives height 250.
        assert_eq!(placement.width, 500);
        assert_eq!(placement.height, 250);
    }

    #[test]
    fn test_zero_declared_dims_fall_back_to_square() {
        let gallery = Gallery::new(vec![photo(0, 0)], 500.0, false);
        let placement = gallery.placement(0).unwrap();
        assert_eq!(placement.height, placement.width);
    }

    #[test]
    fn test_total_height_is_tallest_column() {
        let gallery = Gallery::new(vec![photo(800, 800), photo(800, 1600)], 700.0, false);
        // Two columns; the portrait one dominates.
        let tallest = gallery
            .placements()
            .iter()
            .map(|p| p.height)
            .max()
            .unwrap() as f32;
        assert_eq!(gallery.total_height(), tallest + GALLERY_GAP);
    }

    #[test]
    fn test_resize_repositions_only_on_column_change() {
        let photos: Vec<GalleryPhoto> = (0..6).map(|_| photo(800, 600)).collect();
        let mut gallery = Gallery::new(photos, 1200.0, false);

        // Width changes within the same breakpoint: no relayout.
        assert!(!gallery.handle_resize(1100.0));
        // Crossing a breakpoint relayouts.
        assert!(gallery.handle_resize(700.0));
        assert_eq!(gallery.column_count(), 2);
    }

    #[test]
    fn test_reveal_stagger() {
        let photos: Vec<GalleryPhoto> = (0..10).map(|_| photo(800, 600)).collect();
        let gallery = Gallery::new(photos, 1200.0, false);

        assert_eq!(gallery.reveal_delay(0), Duration::ZERO);
        assert_eq!(gallery.reveal_delay(3), REVEAL_STAGGER * 3);
        // Stagger restarts every group of 8.
        assert_eq!(gallery.reveal_delay(8), Duration::ZERO);
        assert_eq!(gallery.reveal_delay(9), REVEAL_STAGGER);
    }

    #[test]
    fn test_reduced_motion_reveals_everything_immediately() {
        let photos: Vec<GalleryPhoto> = (0..4).map(|_| photo(800, 600)).collect();
        let gallery = Gallery::new(photos, 1200.0, true);
        for i in 0..4 {
            assert_eq!(gallery.reveal_state(i), RevealState::Visible);
            assert_eq!(gallery.reveal_delay(i), Duration::ZERO);
        }
    }

    #[test]
    fn test_hidden_items_above_viewport() {
        let photos: Vec<GalleryPhoto> = (0..8).map(|_| photo(800, 800)).collect();
        let mut gallery = Gallery::new(photos, 320.0, false);
        assert_eq!(gallery.column_count(), 1);

        // Single column of 320-tall items: only the first fits above
        // the fold (plus margin).
        let due = gallery.hidden_items_above(400.0);
        assert_eq!(due, vec![0, 1]);

        gallery.mark_revealed(0);
        let due = gallery.hidden_items_above(400.0);
        assert_eq!(due, vec![1]);
    }
}
