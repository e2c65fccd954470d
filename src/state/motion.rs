//! Motion Preference - reduced-motion accessibility signal
//!
//! The terminal has no media query, so the preference is sniffed from
//! the environment at startup (`MARQUEE_REDUCED_MOTION`, falling back
//! to the more widely honored `REDUCE_MOTION`) and can change live via
//! `set_reduced`. Widgets read the current value once at init and
//! subscribe for live changes, mirroring a `matchMedia` listener.
//!
//! While the preference is active, autoplay never runs and position
//! changes skip animation.

use std::cell::RefCell;
use std::env;

use spark_signals::{Signal, signal};

// =============================================================================
// STATE
// =============================================================================

type ChangeListener = Box<dyn Fn(bool)>;

thread_local! {
    static PREFERENCE: Signal<bool> = signal(false);
    static LISTENERS: RefCell<Vec<(usize, ChangeListener)>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: RefCell<usize> = const { RefCell::new(0) };
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| {
            let v = v.trim();
            !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
        })
        .unwrap_or(false)
}

/// Read the preference from the environment without touching state.
pub fn detect_from_env() -> bool {
    env_flag("MARQUEE_REDUCED_MOTION") || env_flag("REDUCE_MOTION")
}

/// Initialize the signal from the environment. Called once at mount.
pub fn init_from_env() {
    let reduced = detect_from_env();
    PREFERENCE.with(|s| s.set(reduced));
}

/// Current preference.
pub fn prefers_reduced() -> bool {
    PREFERENCE.with(|s| s.get())
}

/// Update the preference and notify subscribers of an actual change.
pub fn set_reduced(reduced: bool) {
    let changed = PREFERENCE.with(|s| {
        if s.get() == reduced {
            false
        } else {
            s.set(reduced);
            true
        }
    });
    if changed {
        LISTENERS.with(|listeners| {
            for (_, listener) in listeners.borrow().iter() {
                listener(reduced);
            }
        });
    }
}

/// Subscribe to live preference changes. Returns an unsubscribe function.
pub fn subscribe<F>(listener: F) -> impl FnOnce()
where
    F: Fn(bool) + 'static,
{
    let id = NEXT_ID.with(|next| {
        let mut next = next.borrow_mut();
        let id = *next;
        *next += 1;
        id
    });
    LISTENERS.with(|listeners| {
        listeners.borrow_mut().push((id, Box::new(listener)));
    });

    move || {
        LISTENERS.with(|listeners| {
            listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
        });
    }
}

/// Reset all motion state (for testing).
pub fn reset_motion_state() {
    PREFERENCE.with(|s| s.set(false));
    LISTENERS.with(|listeners| listeners.borrow_mut().clear());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn setup() {
        reset_motion_state();
    }

    #[test]
    fn test_default_off() {
        setup();
        assert!(!prefers_reduced());
    }

    #[test]
    fn test_set_notifies_on_change_only() {
        setup();
        let seen = Rc::new(Cell::new(0));
        let seen_clone = seen.clone();
        let _unsub = subscribe(move |_| {
            seen_clone.set(seen_clone.get() + 1);
        });

        set_reduced(true);
        set_reduced(true); // No change, no notification
        set_reduced(false);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        setup();
        let seen = Rc::new(Cell::new(0));
        let seen_clone = seen.clone();
        let unsub = subscribe(move |_| {
            seen_clone.set(seen_clone.get() + 1);
        });

        set_reduced(true);
        unsub();
        set_reduced(false);
        assert_eq!(seen.get(), 1);
    }
}
