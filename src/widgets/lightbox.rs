//! Lightbox - full-screen photo viewer with zoom and pan
//!
//! Opens keyed by photo index (carousel slides, gallery items and
//! wedding-party portraits all feed the same viewer), wraps navigation
//! modulo the photo count, and resets zoom on every navigation. Zoom is
//! clamped to [1x, 4x]; panning only engages while zoomed in. Opening
//! saves the current focus and moves it to the close control; closing
//! restores it.

use tracing::debug;

use crate::state::focus;
use crate::state::keyboard::KeyboardEvent;
use crate::types::WidgetId;

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 4.0;
/// Zoom step for the +/- controls.
pub const ZOOM_STEP: f32 = 0.25;
/// Zoom step for modifier-wheel zooming.
pub const WHEEL_ZOOM_STEP: f32 = 0.1;
/// Minimum horizontal drag to count as a swipe while unzoomed.
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// One photo the lightbox can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxItem {
    /// Currently displayed reference (may be a placeholder).
    pub src: String,
    /// Full-resolution reference, when one exists.
    pub full_src: Option<String>,
    pub alt: String,
}

impl LightboxItem {
    /// The reference the viewer should show: full resolution when
    /// available, never the placeholder.
    pub fn display_src(&self) -> &str {
        self.full_src.as_deref().unwrap_or(&self.src)
    }
}

/// Image transform published to the view, matching the
/// `scale() translate()` order the page styles use: the translation is
/// expressed in pre-scale units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

/// The lightbox viewer. One instance per photo collection.
pub struct Lightbox {
    id: WidgetId,
    items: Vec<LightboxItem>,
    current: usize,
    is_open: bool,

    scale: f32,
    translate: (f32, f32),
    dragging: bool,
    drag_anchor: (f32, f32),
    swipe_origin: Option<(f32, f32)>,

    image_loading: bool,
    pending_preloads: Vec<String>,
    close_control: focus::FocusId,
}

impl Lightbox {
    pub fn new(items: Vec<LightboxItem>) -> Self {
        let id = WidgetId::next();
        let close_control = focus::register(focus::FocusEntry::new(id, 0));
        Self {
            id,
            items,
            current: 0,
            is_open: false,
            scale: MIN_ZOOM,
            translate: (0.0, 0.0),
            dragging: false,
            drag_anchor: (0.0, 0.0),
            swipe_origin: None,
            image_loading: false,
            pending_preloads: Vec::new(),
            close_control,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_item(&self) -> Option<&LightboxItem> {
        self.items.get(self.current)
    }

    /// Counter as displayed: (current, total), 1-based.
    pub fn counter(&self) -> (usize, usize) {
        (self.current + 1, self.items.len())
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_image_loading(&self) -> bool {
        self.image_loading
    }

    /// Transform for the displayed image.
    pub fn transform(&self) -> ImageTransform {
        ImageTransform {
            scale: self.scale,
            translate_x: self.translate.0 / self.scale,
            translate_y: self.translate.1 / self.scale,
        }
    }

    /// Preload requests accumulated since the last call (adjacent
    /// photos of every navigation target). The caller hands these to
    /// the image loader.
    pub fn take_preload_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_preloads)
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    /// Open at a photo index. Saves focus and moves it to the close
    /// control.
    pub fn open(&mut self, index: usize) {
        if self.items.is_empty() {
            return;
        }
        self.current = index % self.items.len();
        self.is_open = true;
        self.reset_zoom();
        self.load_current();
        self.preload_adjacent();

        focus::save_focus_to_history();
        focus::focus(self.close_control);
        debug!(index = self.current, "lightbox opened");
    }

    /// Close and restore the focus that was active before opening.
    pub fn close(&mut self) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.reset_zoom();
        focus::restore_focus_from_history();
        debug!("lightbox closed");
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Previous photo, wrapping.
    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current = (self.current + self.items.len() - 1) % self.items.len();
        self.load_current();
        self.preload_adjacent();
        self.reset_zoom();
    }

    /// Next photo, wrapping.
    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.items.len();
        self.load_current();
        self.preload_adjacent();
        self.reset_zoom();
    }

    fn load_current(&mut self) {
        self.image_loading = true;
    }

    /// The full-resolution image finished arriving.
    pub fn image_loaded(&mut self) {
        self.image_loading = false;
    }

    fn preload_adjacent(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let prev = (self.current + len - 1) % len;
        let next = (self.current + 1) % len;
        for index in [prev, next] {
            if let Some(item) = self.items.get(index) {
                self.pending_preloads.push(item.display_src().to_string());
            }
        }
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - ZOOM_STEP).max(MIN_ZOOM);
        if self.scale == MIN_ZOOM {
            self.translate = (0.0, 0.0);
        }
    }

    /// Modifier-wheel zoom. Ignored without the zoom modifier.
    pub fn wheel_zoom(&mut self, zoom_in: bool, has_modifier: bool) {
        if !has_modifier {
            return;
        }
        let delta = if zoom_in { WHEEL_ZOOM_STEP } else { -WHEEL_ZOOM_STEP };
        self.scale = (self.scale + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.scale = MIN_ZOOM;
        self.translate = (0.0, 0.0);
    }

    // =========================================================================
    // Pan / swipe
    // =========================================================================

    /// Pointer pressed on the image. Starts a pan while zoomed in, or
    /// tracks a potential swipe while at 1x.
    pub fn begin_drag(&mut self, x: f32, y: f32) {
        if self.scale > MIN_ZOOM {
            self.dragging = true;
            self.swipe_origin = None;
            self.drag_anchor = (x - self.translate.0, y - self.translate.1);
        } else {
            self.swipe_origin = Some((x, y));
        }
    }

    /// Pointer moved while pressed.
    pub fn drag_move(&mut self, x: f32, y: f32) {
        if self.dragging && self.scale > MIN_ZOOM {
            self.translate = (x - self.drag_anchor.0, y - self.drag_anchor.1);
        }
    }

    /// Pointer released. A dominant horizontal drag while unzoomed
    /// navigates (the swipe gesture).
    pub fn end_drag(&mut self, x: f32, y: f32) {
        self.dragging = false;
        if self.scale > MIN_ZOOM {
            self.swipe_origin = None;
            return;
        }
        if let Some((ox, oy)) = self.swipe_origin.take() {
            let dx = x - ox;
            let dy = y - oy;
            if dx.abs() > dy.abs() && dx.abs() > SWIPE_THRESHOLD {
                if dx > 0.0 {
                    self.prev();
                } else {
                    self.next();
                }
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Keyboard contract while open. Returns true when handled.
    pub fn handle_key(&mut self, event: &KeyboardEvent) -> bool {
        if !self.is_open || !event.is_press() {
            return false;
        }

        match event.key.as_str() {
            "Escape" => {
                self.close();
                true
            }
            "ArrowLeft" => {
                self.prev();
                true
            }
            "ArrowRight" => {
                self.next();
                true
            }
            "+" | "=" => {
                self.zoom_in();
                true
            }
            "-" | "_" => {
                self.zoom_out();
                true
            }
            "0" => {
                self.reset_zoom();
                true
            }
            _ => false,
        }
    }

    /// Tear down focus registrations.
    pub fn dispose(&mut self) {
        focus::unregister(self.close_control);
    }
}

// =============================================================================
// TESTS
// =============================================================================
