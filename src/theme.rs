//! Theme - the page palette
//!
//! Semantic colors the view renders with. The default "blush" preset
//! carries the wedding site's soft palette; "terminal" defers to the
//! user's terminal colors for maximum compatibility.

use std::cell::RefCell;

use crossterm::style::Color;

/// A theme color: terminal default, ANSI palette index, or explicit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeColor {
    /// Use the terminal's default color.
    Default,
    /// ANSI palette index (0-255).
    Ansi(u8),
    /// Explicit RGB color.
    Rgb(u8, u8, u8),
}

impl ThemeColor {
    /// Resolve to a crossterm color.
    pub fn resolve(self) -> Color {
        match self {
            ThemeColor::Default => Color::Reset,
            ThemeColor::Ansi(index) => Color::AnsiValue(index),
            ThemeColor::Rgb(r, g, b) => Color::Rgb { r, g, b },
        }
    }
}

/// Semantic palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub primary: ThemeColor,
    pub accent: ThemeColor,
    pub text: ThemeColor,
    pub text_muted: ThemeColor,
    pub background: ThemeColor,
    pub surface: ThemeColor,
    pub success: ThemeColor,
    pub error: ThemeColor,
}

/// Blush - the wedding palette. Default.
pub fn blush() -> Theme {
    Theme {
        name: "blush",
        primary: ThemeColor::Rgb(196, 113, 137),
        accent: ThemeColor::Rgb(212, 175, 55),
        text: ThemeColor::Rgb(60, 48, 50),
        text_muted: ThemeColor::Rgb(146, 131, 134),
        background: ThemeColor::Rgb(250, 243, 240),
        surface: ThemeColor::Rgb(244, 230, 228),
        success: ThemeColor::Rgb(108, 148, 108),
        error: ThemeColor::Rgb(182, 76, 76),
    }
}

/// Terminal - uses ANSI colors to respect the user's terminal theme.
pub fn terminal() -> Theme {
    Theme {
        name: "terminal",
        primary: ThemeColor::Ansi(13),
        accent: ThemeColor::Ansi(11),
        text: ThemeColor::Default,
        text_muted: ThemeColor::Ansi(8),
        background: ThemeColor::Default,
        surface: ThemeColor::Default,
        success: ThemeColor::Ansi(2),
        error: ThemeColor::Ansi(1),
    }
}

/// Look up a preset by name.
pub fn get_preset(name: &str) -> Option<Theme> {
    match name {
        "blush" => Some(blush()),
        "terminal" => Some(terminal()),
        _ => None,
    }
}

thread_local! {
    static ACTIVE: RefCell<Theme> = RefCell::new(blush());
}

/// The active theme.
pub fn active_theme() -> Theme {
    ACTIVE.with(|theme| theme.borrow().clone())
}

/// Switch to a preset. Returns false for an unknown name.
pub fn set_theme(name: &str) -> bool {
    match get_preset(name) {
        Some(theme) => {
            ACTIVE.with(|active| *active.borrow_mut() = theme);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_blush() {
        set_theme("blush");
        assert_eq!(active_theme().name, "blush");
    }

    #[test]
    fn test_preset_switch() {
        assert!(set_theme("terminal"));
        assert_eq!(active_theme().name, "terminal");
        assert!(!set_theme("vaporwave"));
        assert_eq!(active_theme().name, "terminal");
        set_theme("blush");
    }

    #[test]
    fn test_resolve() {
        assert_eq!(ThemeColor::Ansi(8).resolve(), Color::AnsiValue(8));
        assert_eq!(
            ThemeColor::Rgb(1, 2, 3).resolve(),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
        assert_eq!(ThemeColor::Default.resolve(), Color::Reset);
    }
}
