//! Focus System - Keyboard reachability and focus state
//!
//! Manages which page elements can receive keyboard focus and which one
//! currently has it:
//! - `focused` signal (currently focused entry)
//! - Focus cycling (Tab/Shift+Tab order by tab index)
//! - Tab-reachability: entries can be registered non-focusable, and
//!   entries hidden from assistive technology (carousel clones) are
//!   never reachable regardless of their focusable flag
//! - Focus history for restoration (the lightbox saves focus on open
//!   and restores it on close)
//!
//! # Example
//!
//! ```ignore
//! use marquee_tui::state::focus;
//!
//! let id = focus::register(focus::FocusEntry::new(widget, 0));
//! focus::focus(id);
//! focus::focus_next();
//! ```

use std::cell::RefCell;

use spark_signals::{Signal, signal};

use crate::types::WidgetId;

// =============================================================================
// TYPES
// =============================================================================

/// Handle to a registered focus entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusId(u64);

/// A focusable (or deliberately unfocusable) page element.
#[derive(Debug, Clone)]
pub struct FocusEntry {
    /// The widget this entry belongs to.
    pub widget: WidgetId,
    /// Tab order; lower values come first, ties keep registration order.
    pub tab_index: i32,
    /// Whether the entry can take focus at all.
    pub focusable: bool,
    /// Hidden from assistive technology. Hidden entries are rendered
    /// pixels only and are never reachable by keyboard, whatever
    /// `focusable` says. Carousel clones register with this set.
    pub assistive_hidden: bool,
}

impl FocusEntry {
    /// A plain focusable entry.
    pub fn new(widget: WidgetId, tab_index: i32) -> Self {
        Self {
            widget,
            tab_index,
            focusable: true,
            assistive_hidden: false,
        }
    }

    /// A clone entry: rendered but unreachable.
    pub fn hidden_clone(widget: WidgetId) -> Self {
        Self {
            widget,
            tab_index: -1,
            focusable: false,
            assistive_hidden: true,
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

struct Registered {
    id: FocusId,
    entry: FocusEntry,
}

thread_local! {
    static REGISTRY: RefCell<Vec<Registered>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: RefCell<u64> = const { RefCell::new(1) };
    static FOCUSED: Signal<Option<u64>> = signal(None);
    static HISTORY: RefCell<Vec<FocusId>> = const { RefCell::new(Vec::new()) };
}

const MAX_HISTORY: usize = 10;

/// Register an entry. Returns its handle.
pub fn register(entry: FocusEntry) -> FocusId {
    let id = NEXT_ID.with(|next| {
        let mut next = next.borrow_mut();
        let id = FocusId(*next);
        *next += 1;
        id
    });
    REGISTRY.with(|reg| {
        reg.borrow_mut().push(Registered { id, entry });
    });
    id
}

/// Remove an entry. Blurs it first if it is focused.
pub fn unregister(id: FocusId) {
    if is_focused(id) {
        FOCUSED.with(|s| s.set(None));
    }
    REGISTRY.with(|reg| {
        reg.borrow_mut().retain(|r| r.id != id);
    });
    HISTORY.with(|h| h.borrow_mut().retain(|entry| *entry != id));
}

/// Change an entry's focusable flag in place.
pub fn set_focusable(id: FocusId, focusable: bool) {
    REGISTRY.with(|reg| {
        if let Some(r) = reg.borrow_mut().iter_mut().find(|r| r.id == id) {
            r.entry.focusable = focusable;
        }
    });
    if !focusable && is_focused(id) {
        FOCUSED.with(|s| s.set(None));
    }
}

fn lookup(id: FocusId) -> Option<FocusEntry> {
    REGISTRY.with(|reg| {
        reg.borrow()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.entry.clone())
    })
}

// =============================================================================
// QUERIES
// =============================================================================

/// Currently focused entry, if any.
pub fn focused() -> Option<FocusId> {
    FOCUSED.with(|s| s.get()).map(FocusId)
}

/// Widget owning the currently focused entry.
pub fn focused_widget() -> Option<WidgetId> {
    focused().and_then(lookup).map(|entry| entry.widget)
}

/// Check if a specific entry is focused.
pub fn is_focused(id: FocusId) -> bool {
    focused() == Some(id)
}

/// All reachable entries, sorted by tab index (ties keep registration
/// order). Entries that are non-focusable or assistive-hidden are
/// excluded — this is the tab ring.
pub fn reachable_ids() -> Vec<FocusId> {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        let mut ids: Vec<(i32, usize, FocusId)> = reg
            .iter()
            .enumerate()
            .filter(|(_, r)| r.entry.focusable && !r.entry.assistive_hidden)
            .map(|(pos, r)| (r.entry.tab_index, pos, r.id))
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        ids.into_iter().map(|(_, _, id)| id).collect()
    })
}

// =============================================================================
// NAVIGATION
// =============================================================================

fn step(direction: i32) -> Option<FocusId> {
    let ring = reachable_ids();
    if ring.is_empty() {
        return None;
    }

    let current = focused().and_then(|id| ring.iter().position(|r| *r == id));
    let next = match current {
        None => {
            if direction > 0 { 0 } else { ring.len() - 1 }
        }
        Some(pos) => {
            let len = ring.len() as i32;
            (((pos as i32 + direction) % len + len) % len) as usize
        }
    };
    Some(ring[next])
}

/// Focus a specific entry. Returns false if it is not reachable.
pub fn focus(id: FocusId) -> bool {
    let Some(entry) = lookup(id) else {
        return false;
    };
    if !entry.focusable || entry.assistive_hidden {
        return false;
    }
    if !is_focused(id) {
        save_focus_to_history();
        FOCUSED.with(|s| s.set(Some(id.0)));
    }
    true
}

/// Clear focus.
pub fn blur() {
    if focused().is_some() {
        save_focus_to_history();
        FOCUSED.with(|s| s.set(None));
    }
}

/// Move focus forward in the tab ring. Returns true if focus moved.
pub fn focus_next() -> bool {
    match step(1) {
        Some(id) if Some(id) != focused() => focus(id),
        _ => false,
    }
}

/// Move focus backward in the tab ring. Returns true if focus moved.
pub fn focus_previous() -> bool {
    match step(-1) {
        Some(id) if Some(id) != focused() => focus(id),
        _ => false,
    }
}

/// Focus the first reachable entry.
pub fn focus_first() -> bool {
    reachable_ids().first().copied().is_some_and(focus)
}

// =============================================================================
// HISTORY
// =============================================================================

/// Save current focus to history.
pub fn save_focus_to_history() {
    if let Some(id) = focused() {
        HISTORY.with(|h| {
            let mut h = h.borrow_mut();
            h.push(id);
            if h.len() > MAX_HISTORY {
                h.remove(0);
            }
        });
    }
}

/// Restore the most recent still-reachable entry from history.
/// Returns true if focus was restored.
pub fn restore_focus_from_history() -> bool {
    loop {
        let candidate = HISTORY.with(|h| h.borrow_mut().pop());
        match candidate {
            None => return false,
            Some(id) => {
                let reachable = lookup(id)
                    .map(|entry| entry.focusable && !entry.assistive_hidden)
                    .unwrap_or(false);
                if reachable {
                    FOCUSED.with(|s| s.set(Some(id.0)));
                    return true;
                }
            }
        }
    }
}

// =============================================================================
// RESET (for testing)
// =============================================================================

/// Reset all focus state (for testing).
pub fn reset_focus_state() {
    FOCUSED.with(|s| s.set(None));
    REGISTRY.with(|reg| reg.borrow_mut().clear());
    HISTORY.with(|h| h.borrow_mut().clear());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset_focus_state();
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert!(focused().is_none());
        assert!(reachable_ids().is_empty());
    }

    #[test]
    fn test_focus_and_blur() {
        setup();
        let widget = WidgetId::next();
        let id = register(FocusEntry::new(widget, 0));

        assert!(focus(id));
        assert!(is_focused(id));
        assert_eq!(focused_widget(), Some(widget));

        blur();
        assert!(focused().is_none());
    }

    #[test]
    fn test_hidden_clone_unreachable() {
        setup();
        let widget = WidgetId::next();
        let real = register(FocusEntry::new(widget, 0));
        let clone = register(FocusEntry::hidden_clone(widget));

        // Clones are excluded from the tab ring and refuse direct focus.
        assert_eq!(reachable_ids(), vec![real]);
        assert!(!focus(clone));

        focus_first();
        assert!(is_focused(real));
        // Cycling never lands on the clone.
        focus_next();
        assert!(is_focused(real));
    }

    #[test]
    fn test_tab_order() {
        setup();
        let w = WidgetId::next();
        let c = register(FocusEntry { tab_index: 30, ..FocusEntry::new(w, 0) });
        let a = register(FocusEntry { tab_index: 10, ..FocusEntry::new(w, 0) });
        let b = register(FocusEntry { tab_index: 20, ..FocusEntry::new(w, 0) });

        assert_eq!(reachable_ids(), vec![a, b, c]);

        focus_first();
        assert!(is_focused(a));
        focus_next();
        assert!(is_focused(b));
        focus_next();
        assert!(is_focused(c));
        // Wrap around
        focus_next();
        assert!(is_focused(a));
        focus_previous();
        assert!(is_focused(c));
    }

    #[test]
    fn test_set_focusable_drops_focus() {
        setup();
        let w = WidgetId::next();
        let id = register(FocusEntry::new(w, 0));
        focus(id);
        set_focusable(id, false);
        assert!(focused().is_none());
        assert!(!focus(id));
    }

    #[test]
    fn test_history_restore() {
        setup();
        let w = WidgetId::next();
        let a = register(FocusEntry::new(w, 0));
        let b = register(FocusEntry::new(w, 0));

        focus(a);
        focus(b); // saves a
        blur(); // saves b

        assert!(restore_focus_from_history());
        assert!(is_focused(b));
    }

    #[test]
    fn test_history_skips_unregistered() {
        setup();
        let w = WidgetId::next();
        let a = register(FocusEntry::new(w, 0));
        let b = register(FocusEntry::new(w, 0));

        focus(b);
        focus(a); // history: [b]
        blur(); // history: [b, a]
        unregister(a);

        // a is gone from history; restore falls back to b.
        assert!(restore_focus_from_history());
        assert!(is_focused(b));
    }
}
