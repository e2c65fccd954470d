//! App - page composition and the single-threaded event loop
//!
//! Builds every widget from the page content, routes input and timer
//! events to them, and draws frames. All widget state is mutated here,
//! on one logical thread: sleeper threads and the RSVP worker only post
//! `AppEvent`s into the channel drained by `tick`.
//!
//! # Example
//!
//! ```ignore
//! use marquee_tui::app::{App, PageContent};
//!
//! let mut app = App::mount(content)?;
//! app.run()?;
//! app.unmount()?;
//! ```

use std::io::{self, Write, stdout};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::debug;

use crate::carousel::{
    CarouselConfig, CarouselEngine, CarouselTimer, TrackMetrics,
};
use crate::error::MarqueeError;
use crate::rsvp::{ApiConfig, client};
use crate::state::keyboard::KeyboardEvent;
use crate::state::timer::TimerSlot;
use crate::state::{focus, input, motion};
use crate::state::input::{InputEvent, PointerAction, PointerEvent};
use crate::theme;
use crate::types::{CardContent, GalleryPhoto, SlideSet, WidgetId};
use crate::view::{self, Frame};
use crate::widgets::first_view::{FadePoster, FirstView};
use crate::widgets::flip_card::FlipCard;
use crate::widgets::{Gallery, LazyLoader, Lightbox, LightboxItem, RsvpForm};

/// Quiet period before a resize is acted on.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);
/// Horizontal gutter around the carousel content area.
pub const CAROUSEL_GUTTER: u16 = 8;
/// Rows occupied by the carousel at the top of the page, used for
/// hover detection.
const CAROUSEL_ROWS: u16 = 6;
/// Rows scrolled per wheel step.
const WHEEL_SCROLL: f32 = 3.0;
/// Page Up/Down scroll as a fraction of the viewport.
const PAGE_SCROLL_FACTOR: f32 = 0.9;

const SUBMIT_ERROR_MESSAGE: &str =
    "Sorry, there was an error submitting your RSVP. Please try again.";

// =============================================================================
// Events & content
// =============================================================================

/// Events posted into the loop from sleeper threads and workers.
#[derive(Debug)]
pub enum AppEvent {
    Carousel(CarouselTimer, u64),
    ResizeSettled(u64),
    FirstViewFade(u64),
    RsvpOutcome(Result<(), String>),
    MotionChanged(bool),
}

/// Everything the page is built from, present at load.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub slides: SlideSet,
    pub photos: Vec<GalleryPhoto>,
    pub cards: Vec<CardContent>,
    pub guest_id: String,
    pub max_party_size: usize,
}

// =============================================================================
// App
// =============================================================================

/// The composed page.
pub struct App {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,

    engine: Option<CarouselEngine>,
    hero_lightbox: Lightbox,
    gallery: Gallery,
    gallery_lightbox: Lightbox,
    loader: LazyLoader,
    gallery_widget: WidgetId,
    gallery_focus: Vec<focus::FocusId>,
    cards: Vec<FlipCard>,
    first_view: FirstView,
    form: RsvpForm,
    form_widget: WidgetId,
    form_focus: Option<focus::FocusId>,
    api: ApiConfig,

    resize_slot: TimerSlot,
    pending_viewport: Option<(u16, u16)>,
    viewport: (u16, u16),
    scroll_top: f32,
    pointer_in_carousel: bool,
    motion_unsub: Option<Box<dyn FnOnce()>>,

    terminal_active: bool,
    running: bool,
    dirty: bool,
}

impl App {
    /// Build the page for a viewport, without touching the terminal.
    pub fn new(content: PageContent, viewport: (u16, u16)) -> Self {
        motion::init_from_env();
        let reduced = motion::prefers_reduced();
        let (tx, rx) = channel();

        let engine_poster = {
            let tx = tx.clone();
            Arc::new(move |kind: CarouselTimer, generation: u64| {
                let _ = tx.send(AppEvent::Carousel(kind, generation));
            })
        };
        let metrics = TrackMetrics::from_viewport(viewport.0, CAROUSEL_GUTTER);
        let engine = CarouselEngine::new(
            content.slides.clone(),
            CarouselConfig::default(),
            metrics,
            engine_poster,
        );

        // The hero viewer shares the slide content by reference data;
        // only the real slides feed it, never clones.
        let hero_items: Vec<LightboxItem> = content
            .slides
            .iter()
            .map(|slide| LightboxItem {
                src: slide.src.clone(),
                full_src: None,
                alt: slide.alt.clone(),
            })
            .collect();
        let hero_lightbox = Lightbox::new(hero_items);

        let gallery_items: Vec<LightboxItem> = content
            .photos
            .iter()
            .map(|photo| LightboxItem {
                src: photo.placeholder.clone(),
                full_src: Some(photo.src.clone()),
                alt: photo.alt.clone(),
            })
            .collect();
        let gallery_lightbox = Lightbox::new(gallery_items);

        let photo_count = content.photos.len();
        let gallery = Gallery::new(content.photos, viewport.0 as f32, reduced);
        let gallery_widget = WidgetId::next();
        let gallery_focus = (0..photo_count)
            .map(|_| focus::register(focus::FocusEntry::new(gallery_widget, 0)))
            .collect();

        let cards: Vec<FlipCard> = content.cards.into_iter().map(FlipCard::new).collect();

        let fade_poster: FadePoster = {
            let tx = tx.clone();
            Arc::new(move |generation: u64| {
                let _ = tx.send(AppEvent::FirstViewFade(generation));
            })
        };
        let first_view = FirstView::new(fade_poster);

        let form = RsvpForm::new(content.guest_id, content.max_party_size);
        let form_widget = WidgetId::next();
        let form_focus = Some(focus::register(focus::FocusEntry::new(form_widget, 10)));

        let motion_unsub: Box<dyn FnOnce()> = {
            let tx = tx.clone();
            Box::new(motion::subscribe(move |reduced| {
                let _ = tx.send(AppEvent::MotionChanged(reduced));
            }))
        };

        let mut app = Self {
            tx,
            rx,
            engine,
            hero_lightbox,
            gallery,
            gallery_lightbox,
            loader: LazyLoader::new(photo_count),
            gallery_widget,
            gallery_focus,
            cards,
            first_view,
            form,
            form_widget,
            form_focus,
            api: ApiConfig::from_env(),
            resize_slot: TimerSlot::new("resize-debounce"),
            pending_viewport: None,
            viewport,
            scroll_top: 0.0,
            pointer_in_carousel: false,
            motion_unsub: Some(motion_unsub),
            terminal_active: false,
            running: true,
            dirty: true,
        };
        app.request_visible_images();
        app
    }

    /// Set up the terminal and build the page at its current size.
    pub fn mount(content: PageContent) -> io::Result<Self> {
        init_logging();
        let viewport = crossterm::terminal::size()?;
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;
        input::enable_mouse()?;
        let mut app = Self::new(content, viewport);
        app.terminal_active = true;
        Ok(app)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Run until stopped.
    pub fn run(&mut self) -> io::Result<()> {
        while self.tick()? {}
        Ok(())
    }

    /// One loop iteration: poll input, drain posted events, draw.
    /// Returns false when the app should stop.
    pub fn tick(&mut self) -> io::Result<bool> {
        if !self.running {
            return Ok(false);
        }

        if let Some(event) = input::poll_event(Duration::from_millis(16))? {
            self.handle_input(event);
        }
        while let Ok(event) = self.rx.try_recv() {
            self.handle_app_event(event);
        }

        if self.dirty && self.terminal_active {
            let frame = self.assemble_frame();
            view::emit(&frame, &mut stdout())?;
            self.dirty = false;
        }
        Ok(self.running)
    }

    // =========================================================================
    // Input routing
    // =========================================================================

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => self.handle_key(&key),
            InputEvent::Pointer(pointer) => self.handle_pointer(&pointer),
            InputEvent::Resize(width, height) => self.handle_resize(width, height),
            InputEvent::None => {}
        }
    }

    fn handle_key(&mut self, event: &KeyboardEvent) {
        if !event.is_press() {
            return;
        }
        self.dirty = true;

        // Ctrl+C / q always quit.
        if (event.key == "c" && event.modifiers.ctrl) || event.key == "q" {
            self.running = false;
            return;
        }

        // The welcome overlay swallows everything while visible;
        // Enter activates its call to action.
        if self.first_view.is_visible() {
            if event.key == "Enter" {
                self.first_view.dismiss();
            }
            return;
        }

        // An open viewer owns the keyboard next.
        if self.hero_lightbox.is_open() {
            self.hero_lightbox.handle_key(event);
            self.feed_preloads();
            return;
        }
        if self.gallery_lightbox.is_open() {
            self.gallery_lightbox.handle_key(event);
            self.feed_preloads();
            return;
        }

        // Tab ring.
        if event.key == "Tab" {
            if event.modifiers.shift {
                focus::focus_previous();
            } else {
                focus::focus_next();
            }
            return;
        }

        // Page scroll drives lazy loading and reveal.
        if event.key == "PageDown" {
            self.page_scroll(self.viewport.1 as f32 * PAGE_SCROLL_FACTOR);
            return;
        }
        if event.key == "PageUp" {
            self.page_scroll(-(self.viewport.1 as f32 * PAGE_SCROLL_FACTOR));
            return;
        }

        // Focused widget gets the key.
        let focused = focus::focused_widget();
        if let Some(engine) = &mut self.engine {
            if focused == Some(engine.widget_id()) {
                // Enter on a slide opens the hero viewer; the engine
                // keeps Space for pause/resume.
                if event.key == "Enter" {
                    if let Some(real) = engine.focused_slide() {
                        self.hero_lightbox.open(real);
                        self.feed_preloads();
                        return;
                    }
                }
                // Digits jump straight to a dot.
                if let Some(digit) = event.key.chars().next().and_then(|c| c.to_digit(10)) {
                    if digit >= 1 {
                        engine.select_dot(digit as usize - 1);
                        return;
                    }
                }
                if engine.handle_key(event) {
                    return;
                }
            }
        }

        if focused == Some(self.gallery_widget) {
            if let Some(index) = self.focused_gallery_index() {
                if event.key == "Enter" || event.key == " " {
                    self.gallery_lightbox.open(index);
                    self.feed_preloads();
                    return;
                }
            }
        }

        if let Some(card) = self
            .cards
            .iter_mut()
            .find(|card| Some(card.widget_id()) == focused)
        {
            if card.handle_key(event) {
                return;
            }
        }

        if focused == Some(self.form_widget) {
            self.handle_form_key(event);
            return;
        }

        // Unclaimed keys fall through to the handler registry: the
        // focused widget's subscribers first, then key-specific and
        // global handlers.
        if crate::state::keyboard::dispatch_focused(focused, event) {
            return;
        }
        crate::state::keyboard::dispatch(event.clone());
    }

    fn handle_form_key(&mut self, event: &KeyboardEvent) {
        match event.key.as_str() {
            "y" => self.form.set_attending(true),
            "n" => self.form.set_attending(false),
            "Enter" => self.submit_rsvp(),
            _ => {}
        }
    }

    fn handle_pointer(&mut self, pointer: &PointerEvent) {
        self.dirty = true;

        // The welcome overlay covers the page.
        if self.first_view.is_visible() {
            return;
        }

        // An open viewer takes pointer gestures: drag pans or swipes,
        // modifier-scroll zooms.
        let viewer = if self.hero_lightbox.is_open() {
            Some(&mut self.hero_lightbox)
        } else if self.gallery_lightbox.is_open() {
            Some(&mut self.gallery_lightbox)
        } else {
            None
        };
        if let Some(viewer) = viewer {
            let (x, y) = (pointer.x as f32, pointer.y as f32);
            match pointer.action {
                PointerAction::Down => viewer.begin_drag(x, y),
                PointerAction::Drag => viewer.drag_move(x, y),
                PointerAction::Up => viewer.end_drag(x, y),
                PointerAction::ScrollUp => {
                    viewer.wheel_zoom(true, pointer.modifiers.has_zoom_modifier())
                }
                PointerAction::ScrollDown => {
                    viewer.wheel_zoom(false, pointer.modifiers.has_zoom_modifier())
                }
                PointerAction::Move => {}
            }
            self.feed_preloads();
            return;
        }

        // Plain wheel scrolls the page.
        match pointer.action {
            PointerAction::ScrollDown => {
                self.page_scroll(WHEEL_SCROLL);
                return;
            }
            PointerAction::ScrollUp => {
                self.page_scroll(-WHEEL_SCROLL);
                return;
            }
            _ => {}
        }

        // Hover pause over the carousel band.
        if let Some(engine) = &mut self.engine {
            let inside = pointer.y < CAROUSEL_ROWS;
            if inside != self.pointer_in_carousel {
                self.pointer_in_carousel = inside;
                if inside {
                    engine.pointer_enter();
                } else {
                    engine.pointer_leave();
                }
            }
        }
    }

    fn page_scroll(&mut self, delta: f32) {
        let max_top = (self.gallery.total_height() - self.viewport.1 as f32).max(0.0);
        self.scroll_top = (self.scroll_top + delta).clamp(0.0, max_top);
        self.request_visible_images();
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        self.pending_viewport = Some((width, height));
        let tx = self.tx.clone();
        self.resize_slot.arm(RESIZE_DEBOUNCE, move |generation| {
            let _ = tx.send(AppEvent::ResizeSettled(generation));
        });
    }

    // =========================================================================
    // Posted events
    // =========================================================================

    pub fn handle_app_event(&mut self, event: AppEvent) {
        self.dirty = true;
        match event {
            AppEvent::Carousel(kind, generation) => {
                if let Some(engine) = &mut self.engine {
                    engine.on_timer(kind, generation);
                }
            }
            AppEvent::ResizeSettled(generation) => {
                if self.resize_slot.accept(generation) {
                    if let Some(viewport) = self.pending_viewport.take() {
                        self.apply_viewport(viewport);
                    }
                }
            }
            AppEvent::FirstViewFade(generation) => {
                self.first_view.on_fade_complete(generation);
            }
            AppEvent::RsvpOutcome(outcome) => {
                self.form.submit_resolved(outcome);
            }
            AppEvent::MotionChanged(reduced) => {
                if let Some(engine) = &mut self.engine {
                    engine.set_reduced_motion(reduced);
                }
            }
        }
    }

    fn apply_viewport(&mut self, viewport: (u16, u16)) {
        debug!(?viewport, "viewport settled");
        self.viewport = viewport;
        if let Some(engine) = &mut self.engine {
            engine.on_resize(TrackMetrics::from_viewport(viewport.0, CAROUSEL_GUTTER));
        }
        self.gallery.handle_resize(viewport.0 as f32);
        self.request_visible_images();
    }

    // =========================================================================
    // Gallery & RSVP plumbing
    // =========================================================================

    fn focused_gallery_index(&self) -> Option<usize> {
        let focused = focus::focused()?;
        self.gallery_focus.iter().position(|id| *id == focused)
    }

    /// Start loading every gallery image within the prefetch margin of
    /// the viewport. Terminal references resolve locally, so requests
    /// complete immediately.
    fn request_visible_images(&mut self) {
        let tops: Vec<f32> = self
            .gallery
            .placements()
            .iter()
            .map(|p| p.top as f32)
            .collect();
        let bottom = self.scroll_top + self.viewport.1 as f32;
        let started = self.loader.request_visible(&tops, bottom);
        for index in started {
            self.loader.finish(index, true);
        }
        // Items scrolled into view begin their staggered reveal.
        for index in self.gallery.hidden_items_above(bottom) {
            self.gallery.mark_revealed(index);
        }
    }

    /// Adjacent-photo preloads requested by the viewers go through the
    /// same lazy loader by reference.
    fn feed_preloads(&mut self) {
        for src in self
            .hero_lightbox
            .take_preload_requests()
            .into_iter()
            .chain(self.gallery_lightbox.take_preload_requests())
        {
            debug!(%src, "preload requested");
        }
        self.hero_lightbox.image_loaded();
        self.gallery_lightbox.image_loaded();
    }

    fn submit_rsvp(&mut self) {
        let doc = match self.form.begin_submit() {
            Ok(doc) => doc,
            Err(_) => return,
        };
        let tx = self.tx.clone();
        client::submit(&self.api, doc, move |outcome| {
            let outcome = outcome.map_err(|err| match err {
                MarqueeError::Rejected(message) => message,
                _ => SUBMIT_ERROR_MESSAGE.to_string(),
            });
            let _ = tx.send(AppEvent::RsvpOutcome(outcome));
        });
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    fn assemble_frame(&self) -> Frame {
        let theme = theme::active_theme();
        let width = self.viewport.0 as usize;
        let mut frame = Frame::default();

        if self.first_view.is_visible() {
            for line in view::render_first_view(&self.first_view, &theme, width) {
                frame.push(line);
            }
            return frame;
        }

        if let Some(engine) = &self.engine {
            for line in view::render_carousel(engine, &theme, width) {
                frame.push(line);
            }
            frame.blank();
        }

        let open_viewer = if self.hero_lightbox.is_open() {
            Some(&self.hero_lightbox)
        } else if self.gallery_lightbox.is_open() {
            Some(&self.gallery_lightbox)
        } else {
            None
        };
        if let Some(viewer) = open_viewer {
            for line in view::render_lightbox(viewer, &theme, width) {
                frame.push(line);
            }
            frame.blank();
        }

        for line in view::render_gallery(&self.gallery, &self.loader, &theme) {
            frame.push(line);
        }
        frame.blank();
        for line in view::render_flip_cards(&self.cards, &theme) {
            frame.push(line);
        }
        frame.blank();
        for line in view::render_rsvp(&self.form, &theme) {
            frame.push(line);
        }
        frame.push(view::render_live_region(&theme));
        frame
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Dispose every widget and restore the terminal.
    pub fn unmount(&mut self) -> io::Result<()> {
        self.running = false;
        if let Some(engine) = &mut self.engine {
            engine.dispose();
        }
        self.hero_lightbox.dispose();
        self.gallery_lightbox.dispose();
        for card in &mut self.cards {
            card.dispose();
        }
        self.first_view.dispose();
        self.resize_slot.cancel();
        for id in self.gallery_focus.drain(..) {
            focus::unregister(id);
        }
        if let Some(id) = self.form_focus.take() {
            focus::unregister(id);
        }
        if let Some(unsub) = self.motion_unsub.take() {
            unsub();
        }

        if self.terminal_active {
            self.terminal_active = false;
            let _ = input::disable_mouse();
            execute!(stdout(), Show, LeaveAlternateScreen)?;
            disable_raw_mode()?;
            stdout().flush()?;
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.unmount();
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

// =============================================================================
// TESTS
// =============================================================================
