//! Live Region - polite screen-reader announcements
//!
//! A single page-level status region, updated on every committed
//! carousel navigation ("Photo 3 of 6") and readable by the view for
//! the status footer. The region is created lazily on first
//! announcement and detached on carousel disposal.

use std::cell::Cell;

use spark_signals::{Signal, signal};

thread_local! {
    static ANNOUNCEMENT: Signal<String> = signal(String::new());
    static ATTACHED: Cell<bool> = const { Cell::new(false) };
}

/// Publish an announcement. Attaches the region on first use.
pub fn announce(text: impl Into<String>) {
    ATTACHED.with(|attached| attached.set(true));
    ANNOUNCEMENT.with(|s| s.set(text.into()));
}

/// Announce the committed slide position, 1-based.
pub fn announce_photo(real_index: usize, total: usize) {
    announce(format!("Photo {} of {}", real_index + 1, total));
}

/// Latest announcement text, empty before the first one.
pub fn latest() -> String {
    ANNOUNCEMENT.with(|s| s.get())
}

/// Whether the region has been attached.
pub fn is_attached() -> bool {
    ATTACHED.with(|attached| attached.get())
}

/// Detach the region and clear its text. Called on disposal.
pub fn detach() {
    ATTACHED.with(|attached| attached.set(false));
    ANNOUNCEMENT.with(|s| s.set(String::new()));
}
