//! Timer Slots - at-most-one-armed timers with a cancel-then-arm discipline
//!
//! Every timed behavior on the page (autoplay tick, resume delay,
//! transition completion, resize settling, overlay fade) owns one
//! `TimerSlot` per role. A slot holds at most one live handle; arming
//! always cancels the predecessor first, so duplicate firings are
//! impossible by construction.
//!
//! # Pattern
//!
//! - Arming spawns a sleeper thread that invokes the notify callback
//!   with the slot's generation, unless cancelled first
//! - Callbacks post events into the single-threaded app loop; no state
//!   is mutated off the event thread
//! - Delivery is validated with `accept(generation)`: a cancelled or
//!   superseded timer may still deliver, and stale generations are
//!   rejected at the door
//!
//! # Example
//!
//! ```ignore
//! use marquee_tui::state::timer::TimerSlot;
//!
//! let mut slot = TimerSlot::new("autoplay");
//! slot.arm(Duration::from_secs(5), move |generation| {
//!     let _ = tx.send(Event::AutoplayTick { generation });
//! });
//!
//! // Later, on delivery:
//! if slot.accept(generation) {
//!     // the firing is current — act on it
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::trace;

// =============================================================================
// TIMER SLOT
// =============================================================================

struct Armed {
    cancelled: Arc<AtomicBool>,
    generation: u64,
}

/// A single timer role: at most one armed handle at a time.
pub struct TimerSlot {
    label: &'static str,
    generation: u64,
    armed: Option<Armed>,
}

impl TimerSlot {
    /// Create an empty slot. `label` names the role in trace output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            generation: 0,
            armed: None,
        }
    }

    /// Arm the slot, cancelling any previous handle first.
    ///
    /// After `delay`, `notify` is invoked with the generation stamped on
    /// this arming — unless the slot was cancelled or re-armed in the
    /// meantime. `notify` runs on the sleeper thread and must only post
    /// a message; it must not touch widget state.
    pub fn arm<F>(&mut self, delay: Duration, notify: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let cancelled = Arc::new(AtomicBool::new(false));
        trace!(slot = self.label, generation, ?delay, "arm");

        let flag = cancelled.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            if !flag.load(Ordering::SeqCst) {
                notify(generation);
            }
        });

        self.armed = Some(Armed { cancelled, generation });
    }

    /// Cancel the armed handle, if any.
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            trace!(slot = self.label, generation = armed.generation, "cancel");
            armed.cancelled.store(true, Ordering::SeqCst);
        }
    }

    /// True while a handle is armed and its firing has not been accepted.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Validate a delivered firing. Returns true (and disarms the slot)
    /// only when `generation` matches the currently armed handle; stale
    /// deliveries from cancelled or superseded handles return false.
    pub fn accept(&mut self, generation: u64) -> bool {
        match &self.armed {
            Some(armed) if armed.generation == generation => {
                self.armed = None;
                true
            }
            _ => {
                trace!(slot = self.label, generation, "stale firing dropped");
                false
            }
        }
    }

    /// Generation of the current armed handle, if any. Exposed for the
    /// app loop's stale-event filtering.
    pub fn armed_generation(&self) -> Option<u64> {
        self.armed.as_ref().map(|a| a.generation)
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_arm_fires_with_generation() {
        let (tx, rx) = mpsc::channel();
        let mut slot = TimerSlot::new("test");
        slot.arm(Duration::from_millis(10), move |generation| {
            let _ = tx.send(generation);
        });

        let generation = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(slot.accept(generation));
        assert!(!slot.is_armed());
    }

    #[test]
    fn test_cancel_suppresses_firing() {
        let (tx, rx) = mpsc::channel();
        let mut slot = TimerSlot::new("test");
        slot.arm(Duration::from_millis(30), move |generation| {
            let _ = tx.send(generation);
        });
        slot.cancel();
        assert!(!slot.is_armed());

        assert!(rx.recv_timeout(Duration::from_millis(120)).is_err());
    }

    #[test]
    fn test_rearm_cancels_predecessor() {
        let (tx, rx) = mpsc::channel();
        let tx2 = tx.clone();
        let mut slot = TimerSlot::new("test");
        slot.arm(Duration::from_millis(30), move |generation| {
            let _ = tx.send(("first", generation));
        });
        slot.arm(Duration::from_millis(10), move |generation| {
            let _ = tx2.send(("second", generation));
        });

        let (label, generation) = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(label, "second");
        assert!(slot.accept(generation));
        // The first handle never fires.
        assert!(rx.recv_timeout(Duration::from_millis(120)).is_err());
    }

    #[test]
    fn test_stale_generation_rejected() {
        let (tx, rx) = mpsc::channel();
        let tx2 = tx.clone();
        let mut slot = TimerSlot::new("test");
        slot.arm(Duration::from_millis(5), move |generation| {
            let _ = tx.send(generation);
        });
        let stale = rx.recv_timeout(Duration::from_secs(1)).unwrap();

        // Re-arm before the first firing is accepted: the old
        // generation must be rejected, the new one accepted.
        slot.arm(Duration::from_millis(5), move |generation| {
            let _ = tx2.send(generation);
        });
        assert!(!slot.accept(stale));

        let fresh = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(slot.accept(fresh));
    }

    #[test]
    fn test_accept_twice_fails() {
        let (tx, rx) = mpsc::channel();
        let mut slot = TimerSlot::new("test");
        slot.arm(Duration::from_millis(5), move |generation| {
            let _ = tx.send(generation);
        });
        let generation = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(slot.accept(generation));
        assert!(!slot.accept(generation));
    }
}
