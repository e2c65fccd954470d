//! Keyboard Module - Keyboard event state and handler registry
//!
//! State and handler registry for keyboard events. Does NOT own stdin
//! (that is the input module). Widgets subscribe here and receive events
//! routed by the app loop.
//!
//! # API
//!
//! - `last_event` - Get last keyboard event
//! - `on(handler)` - Subscribe to all keyboard events
//! - `on_key(key, fn)` - Subscribe to specific key(s)
//! - `on_focused(id, fn)` - Subscribe while a widget has focus
//!
//! # Example
//!
//! ```ignore
//! use marquee_tui::state::keyboard;
//!
//! let cleanup = keyboard::on_key("Escape", || {
//!     // close the overlay
//!     true // Consume event
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use spark_signals::{Signal, signal};

use crate::types::WidgetId;

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with ctrl
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    /// True when a zoom-style modifier (ctrl or meta) is held.
    pub fn has_zoom_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowRight")
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    /// Check if this is a press event
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }
}

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Box<dyn Fn(&KeyboardEvent) -> bool>;

/// Handler for a specific key. Return true to consume the event.
pub type KeySpecificHandler = Box<dyn Fn() -> bool>;

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<KeyboardEvent>> = signal(None);
}

/// Get the last keyboard event
pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.get())
}

/// Get the last key pressed
pub fn last_key() -> String {
    last_event().map(|e| e.key).unwrap_or_default()
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    global_handlers: Vec<(usize, KeyHandler)>,
    key_handlers: HashMap<String, Vec<(usize, KeySpecificHandler)>>,
    focused_handlers: HashMap<WidgetId, Vec<(usize, KeyHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            global_handlers: Vec::new(),
            key_handlers: HashMap::new(),
            focused_handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Dispatch a keyboard event to all registered handlers.
/// Returns true if any handler consumed the event.
pub fn dispatch(event: KeyboardEvent) -> bool {
    // Always update reactive state
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    // Only dispatch press events to handlers
    if event.state != KeyState::Press {
        return false;
    }

    dispatch_to_handlers(&event)
}

/// Dispatch to key-specific and global handlers only (not focused).
///
/// The app loop gives the focused widget first chance via
/// `dispatch_focused`, then falls back to this.
pub fn dispatch_to_handlers(event: &KeyboardEvent) -> bool {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();

        if let Some(handlers) = reg.key_handlers.get(&event.key) {
            for (_, handler) in handlers {
                if handler() {
                    return true;
                }
            }
        }

        for (_, handler) in &reg.global_handlers {
            if handler(event) {
                return true;
            }
        }

        false
    })
}

/// Dispatch to the handlers registered for a focused widget.
/// Returns true if consumed.
pub fn dispatch_focused(focused: Option<WidgetId>, event: &KeyboardEvent) -> bool {
    let Some(widget) = focused else {
        return false;
    };
    if event.state != KeyState::Press {
        return false;
    }

    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        if let Some(handlers) = reg.focused_handlers.get(&widget) {
            for (_, handler) in handlers {
                if handler(event) {
                    return true;
                }
            }
        }
        false
    })
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to all keyboard events.
/// Return true from handler to consume the event.
/// Returns cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_handlers.push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            reg.global_handlers.retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Subscribe to a specific key.
/// Return true to consume the event.
/// Returns cleanup function.
pub fn on_key<F>(key: &str, handler: F) -> impl FnOnce()
where
    F: Fn() -> bool + 'static,
{
    let key = key.to_string();
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.key_handlers
            .entry(key.clone())
            .or_default()
            .push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.key_handlers.get_mut(&key) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.key_handlers.remove(&key);
                }
            }
        });
    }
}

/// Subscribe to multiple keys with the same handler.
/// Returns cleanup function.
pub fn on_keys<F>(keys: &[&str], handler: F) -> impl FnOnce()
where
    F: Fn() -> bool + Clone + 'static,
{
    let ids: Vec<(String, usize)> = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        keys.iter()
            .map(|key| {
                let id = reg.next_id();
                reg.key_handlers
                    .entry(key.to_string())
                    .or_default()
                    .push((id, Box::new(handler.clone())));
                (key.to_string(), id)
            })
            .collect()
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            for (key, id) in &ids {
                if let Some(handlers) = reg.key_handlers.get_mut(key) {
                    handlers.retain(|(handler_id, _)| *handler_id != *id);
                    if handlers.is_empty() {
                        reg.key_handlers.remove(key);
                    }
                }
            }
        });
    }
}

/// Subscribe to events while a specific widget has focus.
/// Return true from handler to consume the event.
/// Returns cleanup function.
pub fn on_focused<F>(widget: WidgetId, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.focused_handlers
            .entry(widget)
            .or_default()
            .push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.focused_handlers.get_mut(&widget) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.focused_handlers.remove(&widget);
                }
            }
        });
    }
}

/// Remove every handler registered for a widget.
/// Called on widget disposal to prevent leaks.
pub fn cleanup_widget(widget: WidgetId) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().focused_handlers.remove(&widget);
    });
}

/// Reset all keyboard state (for testing).
pub fn reset_keyboard_state() {
    LAST_EVENT.with(|s| s.set(None));
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        reg.global_handlers.clear();
        reg.key_handlers.clear();
        reg.focused_handlers.clear();
    });
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
        reset_keyboard_state();
    }

    #[test]
    fn test_dispatch_updates_last_event() {
        setup();
        dispatch(KeyboardEvent::new("ArrowRight"));
        assert_eq!(last_key(), "ArrowRight");
    }

    #[test]
    fn test_on_key_consumes() {
        setup();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let _cleanup = on_key("Enter", move || {
            hits_clone.set(hits_clone.get() + 1);
            true
        });

        assert!(dispatch(KeyboardEvent::new("Enter")));
        assert!(!dispatch(KeyboardEvent::new("a")));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_release_not_dispatched() {
        setup();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let _cleanup = on_key("Enter", move || {
            hits_clone.set(hits_clone.get() + 1);
            true
        });

        let mut event = KeyboardEvent::new("Enter");
        event.state = KeyState::Release;
        assert!(!dispatch(event));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_cleanup_unsubscribes() {
        setup();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let cleanup = on_key("Escape", move || {
            hits_clone.set(hits_clone.get() + 1);
            true
        });

        dispatch(KeyboardEvent::new("Escape"));
        cleanup();
        dispatch(KeyboardEvent::new("Escape"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_focused_dispatch_targets_widget() {
        setup();
        let a = WidgetId::next();
        let b = WidgetId::next();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let _cleanup = on_focused(a, move |_| {
            hits_clone.set(hits_clone.get() + 1);
            true
        });

        let event = KeyboardEvent::new("ArrowLeft");
        assert!(dispatch_focused(Some(a), &event));
        assert!(!dispatch_focused(Some(b), &event));
        assert!(!dispatch_focused(None, &event));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_on_keys_multiple() {
        setup();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let _cleanup = on_keys(&["+", "="], move || {
            hits_clone.set(hits_clone.get() + 1);
            true
        });

        dispatch(KeyboardEvent::new("+"));
        dispatch(KeyboardEvent::new("="));
        assert_eq!(hits.get(), 2);
    }
}
