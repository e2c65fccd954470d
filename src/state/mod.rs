//! State Module - Runtime state systems shared by the page widgets
//!
//! - **Keyboard** - Event types, dispatch, handler registry
//! - **Focus** - Tab ring, reachability, history for restoration
//! - **Motion** - Reduced-motion preference signal with live changes
//! - **Timer** - TimerSlot: at-most-one-armed, cancel-then-arm timers
//! - **Announcer** - Polite live region for screen-reader text
//! - **Input** - crossterm event conversion and polling

pub mod announcer;
pub mod focus;
pub mod input;
pub mod keyboard;
pub mod motion;
pub mod timer;

pub use focus::{FocusEntry, FocusId};
pub use input::{InputEvent, PointerAction, PointerButton, PointerEvent};
pub use keyboard::{KeyState, KeyboardEvent, Modifiers};
pub use timer::TimerSlot;
