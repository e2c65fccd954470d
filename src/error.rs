//! Crate error type.
//!
//! Failures here are local and non-fatal by design: widgets degrade to
//! static rather than surfacing errors to the page. The error enum exists
//! for the few genuinely fallible seams (terminal I/O, RSVP submission,
//! first-view marker persistence).

use std::io;

/// Errors surfaced by marquee-tui operations.
#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    /// Terminal setup or output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The RSVP endpoint could not be reached.
    #[error("RSVP submission failed: {0}")]
    Submit(String),

    /// The RSVP endpoint answered with a rejection.
    #[error("RSVP rejected: {0}")]
    Rejected(String),
}
