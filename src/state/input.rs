//! Input Module - Event conversion and polling
//!
//! Bridges crossterm's event system with our keyboard and pointer
//! types. Provides event polling and conversion; routing lives in the
//! app loop, which knows which widget owns which region.

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent,
    KeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers,
    MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent,
    MouseEventKind, poll, read,
};
use crossterm::execute;

use super::keyboard::{KeyState, KeyboardEvent, Modifiers};

// =============================================================================
// EVENT TYPES
// =============================================================================

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    None,
}

/// Pointer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Up,
    Drag,
    Move,
    ScrollUp,
    ScrollDown,
}

/// Pointer event in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub button: PointerButton,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

/// Unified input event.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Keyboard event (key press, release, etc.)
    Key(KeyboardEvent),
    /// Pointer event (click, drag, scroll, move)
    Pointer(PointerEvent),
    /// Terminal resize event (new width, height)
    Resize(u16, u16),
    /// Unhandled event type
    None,
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Convert a crossterm KeyEvent to our KeyboardEvent
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => String::new(),
    };

    let state = match event.kind {
        crossterm::event::KeyEventKind::Press => KeyState::Press,
        crossterm::event::KeyEventKind::Repeat => KeyState::Repeat,
        crossterm::event::KeyEventKind::Release => KeyState::Release,
    };

    KeyboardEvent {
        key,
        modifiers: convert_modifiers(event.modifiers),
        state,
    }
}

/// Convert a crossterm MouseEvent to our PointerEvent
pub fn convert_pointer_event(event: CrosstermMouseEvent) -> PointerEvent {
    let (action, button) = match event.kind {
        MouseEventKind::Down(btn) => (PointerAction::Down, convert_button(btn)),
        MouseEventKind::Up(btn) => (PointerAction::Up, convert_button(btn)),
        MouseEventKind::Drag(btn) => (PointerAction::Drag, convert_button(btn)),
        MouseEventKind::Moved => (PointerAction::Move, PointerButton::None),
        MouseEventKind::ScrollUp | MouseEventKind::ScrollLeft => {
            (PointerAction::ScrollUp, PointerButton::None)
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollRight => {
            (PointerAction::ScrollDown, PointerButton::None)
        }
    };

    PointerEvent {
        action,
        button,
        x: event.column,
        y: event.row,
        modifiers: convert_modifiers(event.modifiers),
    }
}

fn convert_button(btn: CrosstermMouseButton) -> PointerButton {
    match btn {
        CrosstermMouseButton::Left => PointerButton::Left,
        CrosstermMouseButton::Right => PointerButton::Right,
        CrosstermMouseButton::Middle => PointerButton::Middle,
    }
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: mods.contains(KeyModifiers::SUPER),
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event arrived within the timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<InputEvent>> {
    if !poll(timeout)? {
        return Ok(None);
    }

    let event = match read()? {
        CrosstermEvent::Key(key) => InputEvent::Key(convert_key_event(key)),
        CrosstermEvent::Mouse(mouse) => InputEvent::Pointer(convert_pointer_event(mouse)),
        CrosstermEvent::Resize(w, h) => InputEvent::Resize(w, h),
        _ => InputEvent::None,
    };
    Ok(Some(event))
}

/// Enable mouse capture so hover and drag reach the widgets.
pub fn enable_mouse() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse capture.
pub fn disable_mouse() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// TESTS
// =============================================================================
