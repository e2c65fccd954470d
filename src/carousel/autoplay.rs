//! Autoplay State Machine - Running / Paused / PendingResume
//!
//! Owns the two autoplay-related timer slots and every transition
//! between phases:
//!
//! - `Running → Paused` on any user interaction (cancels the tick timer)
//! - `Paused → PendingResume` on interaction end (arms the resume timer)
//! - `PendingResume → Running` when the resume timer fires uninterrupted
//! - `PendingResume → Paused` when another interaction arrives first
//!   (the timer resets rather than stacking)
//!
//! Explicit pauses (Escape, hover) never schedule a resume themselves;
//! only a later interaction end does. While the reduced-motion
//! preference is active the machine never leaves `Paused` and the tick
//! timer is never armed.

use std::time::Duration;

use crate::state::timer::TimerSlot;

use super::{CarouselTimer, TimerPoster};

/// Observable autoplay phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayPhase {
    Running,
    Paused,
    PendingResume,
}

/// The autoplay machine. Single-owner, mutated only on the event thread.
pub struct Autoplay {
    interval: Duration,
    resume_delay: Duration,
    reduced_motion: bool,
    is_paused: bool,
    tick_slot: TimerSlot,
    resume_slot: TimerSlot,
    poster: TimerPoster,
}

impl Autoplay {
    pub fn new(
        interval: Duration,
        resume_delay: Duration,
        reduced_motion: bool,
        poster: TimerPoster,
    ) -> Self {
        Self {
            interval,
            resume_delay,
            reduced_motion,
            is_paused: false,
            tick_slot: TimerSlot::new("autoplay-tick"),
            resume_slot: TimerSlot::new("autoplay-resume"),
            poster,
        }
    }

    /// Current phase, derived from the paused flag and armed slots.
    pub fn phase(&self) -> AutoplayPhase {
        if self.resume_slot.is_armed() {
            AutoplayPhase::PendingResume
        } else if self.tick_slot.is_armed() {
            AutoplayPhase::Running
        } else {
            AutoplayPhase::Paused
        }
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Number of armed timers across both roles. The machine maintains
    /// at most one at any instant.
    pub fn armed_timers(&self) -> usize {
        usize::from(self.tick_slot.is_armed()) + usize::from(self.resume_slot.is_armed())
    }

    fn arm_tick(&mut self) {
        let poster = self.poster.clone();
        self.tick_slot.arm(self.interval, move |generation| {
            poster(CarouselTimer::Tick, generation);
        });
        debug_assert!(self.armed_timers() <= 1);
    }

    /// Begin ticking. No-op while paused or under reduced motion.
    pub fn start(&mut self) {
        if self.is_paused || self.reduced_motion {
            return;
        }
        self.arm_tick();
    }

    /// Tear down both timers without changing the paused flag.
    pub fn stop(&mut self) {
        self.tick_slot.cancel();
        self.resume_slot.cancel();
    }

    /// User interaction: suspend autoplay. A pending resume resets to
    /// plain paused; the next interaction end re-requests it.
    pub fn pause(&mut self) {
        self.is_paused = true;
        self.stop();
    }

    /// Interaction end: schedule the auto-resume. No-op unless paused,
    /// and never under reduced motion. Re-requesting while pending
    /// resets the delay rather than stacking timers.
    pub fn request_resume(&mut self) {
        if !self.is_paused || self.reduced_motion {
            return;
        }
        let poster = self.poster.clone();
        self.resume_slot.arm(self.resume_delay, move |generation| {
            poster(CarouselTimer::Resume, generation);
        });
        debug_assert!(self.armed_timers() <= 1);
    }

    /// Space/Enter toggle: paused (or pending) goes straight back to
    /// running; running pauses with no scheduled resume.
    pub fn toggle(&mut self) {
        if self.is_paused {
            self.resume_slot.cancel();
            self.is_paused = false;
            self.start();
        } else {
            self.pause();
        }
    }

    /// Validate a tick firing. Returns true when the caller should
    /// advance a slide; the next tick is re-armed here so the cadence
    /// continues.
    pub fn accept_tick(&mut self, generation: u64) -> bool {
        if !self.tick_slot.accept(generation) {
            return false;
        }
        debug_assert!(!self.is_paused, "tick accepted while paused");
        self.arm_tick();
        true
    }

    /// Validate a resume firing. On success the machine transitions
    /// back to Running.
    pub fn accept_resume(&mut self, generation: u64) -> bool {
        if !self.resume_slot.accept(generation) {
            return false;
        }
        self.is_paused = false;
        self.start();
        true
    }

    /// Live motion-preference change. Turning reduced motion on forces
    /// Running → Paused and tears both timers down; turning it off
    /// leaves the machine paused until the user resumes.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if reduced {
            self.stop();
            self.is_paused = true;
        }
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    #[cfg(test)]
    pub(crate) fn tick_slot_generation(&self) -> Option<u64> {
        self.tick_slot.armed_generation()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn machine(reduced: bool) -> Autoplay {
        // Long delays: tests drive firings by hand via accept_*.
        Autoplay::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
            reduced,
            Arc::new(|_, _| {}),
        )
    }

    fn fire_resume(autoplay: &mut Autoplay) -> bool {
        let generation = autoplay.resume_slot.armed_generation().unwrap();
        autoplay.accept_resume(generation)
    }

    #[test]
    fn test_initial_phase_paused() {
        let autoplay = machine(false);
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);
        assert!(!autoplay.is_paused());
        assert_eq!(autoplay.armed_timers(), 0);
    }

    #[test]
    fn test_start_arms_tick() {
        let mut autoplay = machine(false);
        autoplay.start();
        assert_eq!(autoplay.phase(), AutoplayPhase::Running);
        assert_eq!(autoplay.armed_timers(), 1);
    }

    #[test]
    fn test_hover_cycle() {
        let mut autoplay = machine(false);
        autoplay.start();

        // Hover-enter while Running: timer cleared, Paused.
        autoplay.pause();
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);
        assert_eq!(autoplay.armed_timers(), 0);

        // Hover-leave: PendingResume.
        autoplay.request_resume();
        assert_eq!(autoplay.phase(), AutoplayPhase::PendingResume);

        // Resume delay elapses uninterrupted: Running, tick re-armed.
        assert!(fire_resume(&mut autoplay));
        assert_eq!(autoplay.phase(), AutoplayPhase::Running);
        assert_eq!(autoplay.armed_timers(), 1);
    }

    #[test]
    fn test_interaction_during_pending_resume_resets() {
        let mut autoplay = machine(false);
        autoplay.start();
        autoplay.pause();
        autoplay.request_resume();
        let first = autoplay.resume_slot.armed_generation().unwrap();

        // Another interaction: back to Paused, timer reset not stacked.
        autoplay.pause();
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);

        autoplay.request_resume();
        let second = autoplay.resume_slot.armed_generation().unwrap();
        assert_ne!(first, second);

        // The stale firing is rejected.
        assert!(!autoplay.accept_resume(first));
        assert_eq!(autoplay.phase(), AutoplayPhase::PendingResume);
    }

    #[test]
    fn test_explicit_pause_schedules_nothing() {
        let mut autoplay = machine(false);
        autoplay.start();
        autoplay.pause();
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);
        assert_eq!(autoplay.armed_timers(), 0);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut autoplay = machine(false);
        autoplay.start();

        autoplay.toggle();
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);

        autoplay.toggle();
        assert_eq!(autoplay.phase(), AutoplayPhase::Running);
    }

    #[test]
    fn test_toggle_from_pending_resume_runs_immediately() {
        let mut autoplay = machine(false);
        autoplay.start();
        autoplay.pause();
        autoplay.request_resume();

        autoplay.toggle();
        assert_eq!(autoplay.phase(), AutoplayPhase::Running);
        assert_eq!(autoplay.armed_timers(), 1);
    }

    #[test]
    fn test_reduced_motion_never_arms() {
        let mut autoplay = machine(true);
        autoplay.start();
        assert_eq!(autoplay.armed_timers(), 0);

        autoplay.pause();
        autoplay.request_resume();
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);
        assert_eq!(autoplay.armed_timers(), 0);
    }

    #[test]
    fn test_live_reduced_motion_change_forces_pause() {
        let mut autoplay = machine(false);
        autoplay.start();
        assert_eq!(autoplay.phase(), AutoplayPhase::Running);

        autoplay.set_reduced_motion(true);
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);
        assert!(autoplay.is_paused());
        assert_eq!(autoplay.armed_timers(), 0);

        // Flipping back off does not silently restart.
        autoplay.set_reduced_motion(false);
        assert_eq!(autoplay.phase(), AutoplayPhase::Paused);
    }

    #[test]
    fn test_tick_rearms() {
        let mut autoplay = machine(false);
        autoplay.start();
        let generation = autoplay.tick_slot.armed_generation().unwrap();

        assert!(autoplay.accept_tick(generation));
        // Still running on a fresh handle.
        assert_eq!(autoplay.phase(), AutoplayPhase::Running);
        assert_ne!(autoplay.tick_slot.armed_generation().unwrap(), generation);
    }

    #[test]
    fn test_at_most_one_timer_through_full_cycle() {
        let mut autoplay = machine(false);
        assert!(autoplay.armed_timers() <= 1);
        autoplay.start();
        assert!(autoplay.armed_timers() <= 1);
        autoplay.pause();
        assert!(autoplay.armed_timers() <= 1);
        autoplay.request_resume();
        assert!(autoplay.armed_timers() <= 1);
        assert!(fire_resume(&mut autoplay));
        assert!(autoplay.armed_timers() <= 1);
    }
}
