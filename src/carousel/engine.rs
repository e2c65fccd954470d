//! Carousel Engine - navigation, wraparound correction, autoplay wiring
//!
//! One instance per carousel. The engine owns the mutable carousel
//! state and is the only writer: navigation commands, timer firings and
//! layout changes all arrive as method calls on the event thread.
//!
//! Navigation moves the raw track index (including the clone range) and
//! publishes a centering offset; landing inside a clone block is fixed
//! up on the transition-end signal with a skip-animation jump to the
//! equivalent real position. The jump relies on the track invariant
//! that clone position `i` and real position `i + N` render
//! identically, so it is visually undetectable.

use spark_signals::{Signal, signal};
use tracing::{debug, warn};

use crate::state::keyboard::{self, KeyboardEvent};
use crate::state::timer::TimerSlot;
use crate::state::{announcer, focus, motion};
use crate::types::{SlideSet, WidgetId};

use super::autoplay::{Autoplay, AutoplayPhase};
use super::metrics::TrackMetrics;
use super::track::ClonedTrack;
use super::{CarouselConfig, CarouselTimer, TimerPoster};

/// The slideshow engine.
///
/// Create with [`CarouselEngine::new`]; it returns `None` when the host
/// has no slides (the carousel may be absent on some pages — silent
/// no-activation, not an error).
pub struct CarouselEngine {
    id: WidgetId,
    cfg: CarouselConfig,
    track: ClonedTrack,
    metrics: TrackMetrics,

    track_index: usize,
    real_index: usize,
    is_transitioning: bool,

    autoplay: Autoplay,
    start_slot: TimerSlot,
    transition_slot: TimerSlot,

    offset: Signal<f32>,
    active_real: Signal<usize>,

    poster: TimerPoster,
    focus_ids: Vec<focus::FocusId>,
    disposed: bool,
}

impl CarouselEngine {
    /// Build and position the carousel.
    ///
    /// Reads the motion preference once; under reduced motion autoplay
    /// is never armed and every position change skips animation. The
    /// preferred start slide is centered immediately, before first
    /// paint.
    pub fn new(
        slides: SlideSet,
        cfg: CarouselConfig,
        metrics: TrackMetrics,
        poster: TimerPoster,
    ) -> Option<Self> {
        if slides.is_empty() {
            warn!("no carousel slides found");
            return None;
        }

        let reduced = motion::prefers_reduced();
        let id = WidgetId::next();
        let track = ClonedTrack::build(&slides, cfg.clone_count);

        // Real slides join the tab ring; clones are rendered pixels
        // only, unreachable by keyboard or screen reader.
        let focus_ids = track
            .entries()
            .iter()
            .map(|entry| {
                if entry.is_clone {
                    focus::register(focus::FocusEntry::hidden_clone(id))
                } else {
                    focus::register(focus::FocusEntry::new(id, 0))
                }
            })
            .collect();

        let n = track.real_count();
        let start_index = cfg.clone_count + cfg.start_offset.min(n - 1);

        let mut engine = Self {
            id,
            track,
            metrics,
            track_index: start_index,
            real_index: 0,
            is_transitioning: false,
            autoplay: Autoplay::new(
                cfg.autoplay_interval,
                cfg.resume_delay,
                reduced,
                poster.clone(),
            ),
            start_slot: TimerSlot::new("autoplay-start"),
            transition_slot: TimerSlot::new("transition"),
            offset: signal(0.0),
            active_real: signal(0),
            poster,
            focus_ids,
            disposed: false,
            cfg,
        };

        // Center the preferred slide with no animation.
        engine.go_to_slide(start_index, true);

        if !reduced {
            let poster = engine.poster.clone();
            engine.start_slot.arm(engine.cfg.initial_delay, move |generation| {
                poster(CarouselTimer::Start, generation);
            });
        }

        Some(engine)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    pub fn track(&self) -> &ClonedTrack {
        &self.track
    }

    pub fn track_index(&self) -> usize {
        self.track_index
    }

    /// Logical slide in [0, N), for dots and announcements.
    pub fn real_index(&self) -> usize {
        self.real_index
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn autoplay(&self) -> &Autoplay {
        &self.autoplay
    }

    pub fn autoplay_phase(&self) -> AutoplayPhase {
        self.autoplay.phase()
    }

    /// Track transform signal, consumed by the view.
    pub fn offset_signal(&self) -> Signal<f32> {
        self.offset.clone()
    }

    /// Active real slide signal, consumed by the dot indicators.
    pub fn active_signal(&self) -> Signal<usize> {
        self.active_real.clone()
    }

    /// Whether the initial-delay timer is armed (autoplay scheduled but
    /// not yet started).
    pub fn autoplay_scheduled(&self) -> bool {
        self.start_slot.is_armed()
    }

    /// Real index of the slide holding keyboard focus, if any. Clones
    /// never hold focus, so this is always a real slide.
    pub fn focused_slide(&self) -> Option<usize> {
        let focused = focus::focused()?;
        let position = self.focus_ids.iter().position(|id| *id == focused)?;
        self.track.get(position).map(|entry| entry.source_index)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Go to a track position.
    ///
    /// `skip_animation` is the privileged path used by the clone
    /// snap-back and by resize re-centering; it is never blocked by an
    /// in-flight transition. Animated navigation while a transition is
    /// in flight is dropped, not queued.
    pub fn go_to_slide(&mut self, target: usize, skip_animation: bool) {
        if self.disposed {
            return;
        }
        // Under reduced motion every position change is instantaneous.
        let skip_animation = skip_animation || self.autoplay.reduced_motion();

        if target == self.track_index && !skip_animation {
            return;
        }
        if self.is_transitioning && !skip_animation {
            return;
        }
        debug_assert!(target < self.track.len());

        self.track_index = target;
        self.real_index = self.track.fold(target);

        let offset = self.metrics.centering_offset(target);
        if skip_animation {
            // Instantaneous jump: transition disabled for this single
            // update, then normal service resumes.
            self.transition_slot.cancel();
            self.is_transitioning = false;
            self.offset.set(offset);
        } else {
            self.is_transitioning = true;
            self.offset.set(offset);
            let poster = self.poster.clone();
            self.transition_slot
                .arm(self.cfg.transition_duration, move |generation| {
                    poster(CarouselTimer::Transition, generation);
                });
        }

        self.active_real.set(self.real_index);
        announcer::announce_photo(self.real_index, self.track.real_count());
        debug!(
            track_index = self.track_index,
            real_index = self.real_index,
            skip_animation,
            "slide committed"
        );

        if skip_animation {
            self.snap_if_clone();
        }
    }

    /// Advance one slide. Wrapping is handled by the clone range and
    /// the transition-end correction, not by modulo.
    pub fn next_slide(&mut self) {
        if self.is_transitioning {
            return;
        }
        self.go_to_slide(self.track_index + 1, false);
    }

    /// Go back one slide.
    pub fn previous_slide(&mut self) {
        if self.is_transitioning {
            return;
        }
        let Some(target) = self.track_index.checked_sub(1) else {
            return;
        };
        self.go_to_slide(target, false);
    }

    fn snap_if_clone(&mut self) {
        let c = self.track.clone_count();
        let n = self.track.real_count();
        if self.track_index < c {
            // Landed in the prepended clones; jump to the real end.
            let target = self.track_index + n;
            self.go_to_slide(target, true);
        } else if self.track_index >= c + n {
            // Landed in the appended clones; jump to the real beginning.
            let target = self.track_index - n;
            self.go_to_slide(target, true);
        }
    }

    /// Transition-end signal. Only the track's own signal triggers the
    /// wraparound correction; signals bubbling from child widgets are
    /// ignored, as are stale timer generations.
    pub fn on_transition_end(&mut self, source: WidgetId, generation: u64) {
        if source != self.id {
            return;
        }
        if !self.transition_slot.accept(generation) {
            return;
        }
        self.is_transitioning = false;
        self.snap_if_clone();
    }

    // =========================================================================
    // User interaction
    // =========================================================================

    /// Previous-control activation: pause, navigate, schedule resume.
    pub fn user_previous(&mut self) {
        if self.is_transitioning {
            return;
        }
        self.autoplay.pause();
        self.previous_slide();
        self.autoplay.request_resume();
    }

    /// Next-control activation.
    pub fn user_next(&mut self) {
        if self.is_transitioning {
            return;
        }
        self.autoplay.pause();
        self.next_slide();
        self.autoplay.request_resume();
    }

    /// Dot activation: jump to a real slide.
    pub fn select_dot(&mut self, real_index: usize) {
        if self.is_transitioning || real_index >= self.track.real_count() {
            return;
        }
        self.autoplay.pause();
        let target = self.track.clone_count() + real_index;
        self.go_to_slide(target, false);
        self.autoplay.request_resume();
    }

    /// Hover enter: pause with no scheduled resume.
    pub fn pointer_enter(&mut self) {
        self.autoplay.pause();
    }

    /// Hover leave: ask for the auto-resume.
    pub fn pointer_leave(&mut self) {
        self.autoplay.request_resume();
    }

    /// Keyboard contract while the carousel has focus. Returns true
    /// when the key was handled.
    pub fn handle_key(&mut self, event: &KeyboardEvent) -> bool {
        if !event.is_press() || self.is_transitioning {
            return false;
        }

        match event.key.as_str() {
            " " | "Enter" => {
                self.autoplay.toggle();
                true
            }
            "ArrowLeft" => {
                self.user_previous();
                true
            }
            "ArrowRight" => {
                self.user_next();
                true
            }
            "Escape" => {
                self.autoplay.pause();
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // Timers, resize, motion
    // =========================================================================

    /// Route a timer firing to its role.
    pub fn on_timer(&mut self, kind: CarouselTimer, generation: u64) {
        if self.disposed {
            return;
        }
        match kind {
            CarouselTimer::Start => {
                if self.start_slot.accept(generation) {
                    self.autoplay.start();
                }
            }
            CarouselTimer::Tick => {
                if self.autoplay.accept_tick(generation) {
                    self.next_slide();
                }
            }
            CarouselTimer::Resume => {
                self.autoplay.accept_resume(generation);
            }
            CarouselTimer::Transition => {
                self.on_transition_end(self.id, generation);
            }
        }
    }

    /// Viewport changed (already debounced by the app loop): recompute
    /// the centering offset against the new metrics. Pure re-centering,
    /// no index change.
    pub fn on_resize(&mut self, metrics: TrackMetrics) {
        self.metrics = metrics;
        let current = self.track_index;
        self.go_to_slide(current, true);
    }

    /// Live motion-preference change.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.autoplay.set_reduced_motion(reduced);
        if reduced {
            self.start_slot.cancel();
        }
    }

    // =========================================================================
    // Disposal
    // =========================================================================

    /// Tear down: clears every timer, removes focus and keyboard
    /// registrations, detaches the live region. Required for reuse in
    /// contexts where carousels mount and unmount repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.autoplay.stop();
        self.start_slot.cancel();
        self.transition_slot.cancel();
        for id in self.focus_ids.drain(..) {
            focus::unregister(id);
        }
        keyboard::cleanup_widget(self.id);
        announcer::detach();
        debug!(widget = self.id.raw(), "carousel disposed");
    }

    #[cfg(test)]
    fn force_position(&mut self, track_index: usize) {
        self.track_index = track_index;
        self.real_index = self.track.fold(track_index);
        self.is_transitioning = false;
    }

    #[cfg(test)]
    fn transition_generation(&self) -> Option<u64> {
        self.transition_slot.armed_generation()
    }
}

impl Drop for CarouselEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::state::{focus, motion};
    use crate::types::Slide;

    use super::*;

    fn slides(n: usize) -> SlideSet {
        SlideSet::new(
            (0..n)
                .map(|i| Slide::new(format!("hero-{:02}.jpg", i + 2), format!("photo {}", i)))
                .collect(),
        )
    }

    fn metrics() -> TrackMetrics {
        TrackMetrics {
            container_width: 1000.0,
            padding_left: 80.0,
            padding_right: 80.0,
            slide_width: 420.0,
        }
    }

    fn engine() -> CarouselEngine {
        engine_with(slides(6), CarouselConfig::default())
    }

    fn engine_with(set: SlideSet, cfg: CarouselConfig) -> CarouselEngine {
        CarouselEngine::new(set, cfg, metrics(), Arc::new(|_, _| {})).unwrap()
    }

    fn finish_transition(engine: &mut CarouselEngine) {
        let generation = engine.transition_generation().expect("transition armed");
        engine.on_transition_end(engine.widget_id(), generation);
    }

    fn setup() {
        focus::reset_focus_state();
        motion::reset_motion_state();
        announcer::detach();
    }

    #[test]
    fn test_empty_slide_set_does_not_activate() {
        setup();
        assert!(
            CarouselEngine::new(
                SlideSet::default(),
                CarouselConfig::default(),
                metrics(),
                Arc::new(|_, _| {}),
            )
            .is_none()
        );
    }

    #[test]
    fn test_initial_position() {
        setup();
        // N=6, C=3, start offset 2: track 5, real 2, dot 2 active.
        let engine = engine();
        assert_eq!(engine.track_index(), 5);
        assert_eq!(engine.real_index(), 2);
        assert_eq!(engine.active_signal().get(), 2);
        assert!(!engine.is_transitioning());
        assert_eq!(announcer::latest(), "Photo 3 of 6");
        // Autoplay is scheduled but not yet running.
        assert!(engine.autoplay_scheduled());
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::Paused);
    }

    #[test]
    fn test_clones_not_in_tab_ring() {
        setup();
        let engine = engine();
        // 6 real entries reachable; 6 clones excluded.
        assert_eq!(focus::reachable_ids().len(), 6);
        assert_eq!(engine.track().len(), 12);
    }

    #[test]
    fn test_next_commits_and_blocks_until_transition_end() {
        setup();
        let mut engine = engine();
        engine.next_slide();
        assert_eq!(engine.track_index(), 6);
        assert_eq!(engine.real_index(), 3);
        assert!(engine.is_transitioning());

        // A second command during the transition is dropped, not queued.
        engine.next_slide();
        assert_eq!(engine.track_index(), 6);
        engine.previous_slide();
        assert_eq!(engine.track_index(), 6);

        finish_transition(&mut engine);
        assert!(!engine.is_transitioning());
        engine.next_slide();
        assert_eq!(engine.track_index(), 7);
    }

    #[test]
    fn test_transition_end_from_child_ignored() {
        setup();
        let mut engine = engine();
        engine.next_slide();
        let generation = engine.transition_generation().unwrap();

        // A signal bubbling from some other widget must not clear the
        // in-flight flag.
        engine.on_transition_end(WidgetId::next(), generation);
        assert!(engine.is_transitioning());

        engine.on_transition_end(engine.widget_id(), generation);
        assert!(!engine.is_transitioning());
    }

    #[test]
    fn test_stale_transition_generation_ignored() {
        setup();
        let mut engine = engine();
        engine.next_slide();
        let stale = engine.transition_generation().unwrap();
        finish_transition(&mut engine);

        engine.next_slide();
        engine.on_transition_end(engine.widget_id(), stale);
        assert!(engine.is_transitioning());
    }

    #[test]
    fn test_forward_wraparound_correction() {
        setup();
        let mut engine = engine();
        // Walk from track 5 (real 2) to the appended clone region.
        for _ in 0..4 {
            engine.next_slide();
            finish_transition(&mut engine);
        }
        // 5 → 6 → 7 → 8 → 9; 9 is the first appended clone (real 0),
        // and the correction snapped it back to track 3.
        assert_eq!(engine.real_index(), 0);
        assert_eq!(engine.track_index(), 3);
        assert!(!engine.is_transitioning());
    }

    #[test]
    fn test_backward_from_clone_scenario() {
        setup();
        let mut engine = engine();
        // From track C−1 = 2 (last prepended clone), go back once.
        engine.force_position(2);
        engine.previous_slide();
        assert_eq!(engine.track_index(), 1);
        assert!(engine.is_transitioning());

        // Transition-end: correction jump to C−2+N = 7, real N−2 = 4,
        // with no animation armed after the jump.
        finish_transition(&mut engine);
        assert_eq!(engine.track_index(), 7);
        assert_eq!(engine.real_index(), 4);
        assert!(!engine.is_transitioning());
        assert!(engine.transition_generation().is_none());
    }

    #[test]
    fn test_wraparound_idempotence() {
        setup();
        let mut engine = engine();
        let start_real = engine.real_index();
        let start_offset = engine.offset_signal().get();
        let mut corrections = 0;

        for _ in 0..6 {
            let before = engine.track_index();
            engine.next_slide();
            finish_transition(&mut engine);
            // A correction happened when the index did not simply
            // advance by one.
            if engine.track_index() != before + 1 {
                corrections += 1;
            }
        }

        assert_eq!(engine.real_index(), start_real);
        assert_eq!(engine.offset_signal().get(), start_offset);
        assert!(corrections <= 1, "at most one correction jump, saw {corrections}");
    }

    #[test]
    fn test_dot_selection() {
        setup();
        let mut engine = engine();
        engine.select_dot(4);
        assert_eq!(engine.track_index(), 7);
        assert_eq!(engine.real_index(), 4);
        // Interaction paused autoplay and scheduled the resume.
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::PendingResume);

        finish_transition(&mut engine);
        // Out-of-range dot is ignored.
        engine.select_dot(6);
        assert_eq!(engine.real_index(), 4);
    }

    #[test]
    fn test_keyboard_contract() {
        setup();
        let mut engine = engine();

        assert!(engine.handle_key(&KeyboardEvent::new("ArrowRight")));
        assert_eq!(engine.real_index(), 3);
        assert!(engine.is_transitioning());

        // All keys are dropped mid-transition.
        assert!(!engine.handle_key(&KeyboardEvent::new("ArrowLeft")));
        assert!(!engine.handle_key(&KeyboardEvent::new("Escape")));
        finish_transition(&mut engine);

        assert!(engine.handle_key(&KeyboardEvent::new("ArrowLeft")));
        assert_eq!(engine.real_index(), 2);
        finish_transition(&mut engine);

        // Escape: paused, nothing scheduled.
        assert!(engine.handle_key(&KeyboardEvent::new("Escape")));
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::Paused);
        assert_eq!(engine.autoplay().armed_timers(), 0);

        // Space resumes immediately.
        assert!(engine.handle_key(&KeyboardEvent::new(" ")));
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::Running);

        assert!(!engine.handle_key(&KeyboardEvent::new("x")));
    }

    #[test]
    fn test_arrow_wraps_pause_navigate_resume() {
        setup();
        let mut engine = engine();
        engine.handle_key(&KeyboardEvent::new("ArrowRight"));
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::PendingResume);
    }

    #[test]
    fn test_reduced_motion_at_init() {
        setup();
        motion::set_reduced(true);
        let mut engine = engine();

        // No autoplay timer is ever created.
        assert!(!engine.autoplay_scheduled());
        assert_eq!(engine.autoplay().armed_timers(), 0);

        // Manual navigation still works, instantly, and still updates
        // dots and the live region.
        engine.user_next();
        assert_eq!(engine.real_index(), 3);
        assert!(!engine.is_transitioning());
        assert_eq!(engine.active_signal().get(), 3);
        assert_eq!(announcer::latest(), "Photo 4 of 6");
        // The interaction never arms a resume under reduced motion.
        assert_eq!(engine.autoplay().armed_timers(), 0);
    }

    #[test]
    fn test_reduced_motion_navigation_snaps_through_clones() {
        setup();
        motion::set_reduced(true);
        let mut engine = engine();
        // Walk forward past the end; corrections are inline since there
        // is no transition-end to wait for.
        for _ in 0..6 {
            engine.next_slide();
        }
        assert_eq!(engine.real_index(), 2);
        assert!(engine.track_index() >= 3 && engine.track_index() < 9);
    }

    #[test]
    fn test_live_motion_change_stops_autoplay() {
        setup();
        let mut engine = engine();
        // Simulate the initial-delay firing: autoplay runs.
        let generation = engine.start_slot.armed_generation().unwrap();
        engine.on_timer(CarouselTimer::Start, generation);
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::Running);

        engine.set_reduced_motion(true);
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::Paused);
        assert_eq!(engine.autoplay().armed_timers(), 0);
        assert!(!engine.autoplay_scheduled());
    }

    #[test]
    fn test_autoplay_tick_advances() {
        setup();
        let mut engine = engine();
        let generation = engine.start_slot.armed_generation().unwrap();
        engine.on_timer(CarouselTimer::Start, generation);

        let tick = engine.autoplay().armed_timers();
        assert_eq!(tick, 1);
        let generation = engine.autoplay.tick_slot_generation().unwrap();
        engine.on_timer(CarouselTimer::Tick, generation);
        assert_eq!(engine.real_index(), 3);
        assert!(engine.is_transitioning());
        // Cadence continues on a fresh handle.
        assert_eq!(engine.autoplay_phase(), AutoplayPhase::Running);
    }

    #[test]
    fn test_resize_recenters_without_index_change() {
        setup();
        let mut engine = engine();
        let before_index = engine.track_index();
        let before_offset = engine.offset_signal().get();

        engine.on_resize(TrackMetrics {
            container_width: 500.0,
            padding_left: 40.0,
            padding_right: 40.0,
            slide_width: 210.0,
        });

        assert_eq!(engine.track_index(), before_index);
        assert_ne!(engine.offset_signal().get(), before_offset);
        assert!(!engine.is_transitioning());
    }

    #[test]
    fn test_dispose_clears_everything() {
        setup();
        let mut engine = engine();
        engine.next_slide();
        assert!(engine.transition_generation().is_some());

        engine.dispose();
        assert!(engine.transition_generation().is_none());
        assert_eq!(engine.autoplay().armed_timers(), 0);
        assert!(!engine.autoplay_scheduled());
        assert!(focus::reachable_ids().is_empty());
        assert!(!announcer::is_attached());

        // Commands after disposal are inert.
        engine.next_slide();
        assert_eq!(engine.track_index(), 6);
    }
}
