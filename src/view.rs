//! View - frame assembly and styled terminal output
//!
//! Pure functions build a frame (styled lines) from widget state; the
//! emitter writes it with crossterm in one buffered pass. Keeping
//! assembly pure lets tests assert page text without a terminal.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};
use unicode_width::UnicodeWidthStr;

use crate::carousel::CarouselEngine;
use crate::state::announcer;
use crate::theme::{Theme, ThemeColor};
use crate::types::Attr;
use crate::widgets::first_view::{CTA_LABEL, FirstView, WELCOME_LINES};
use crate::widgets::{Gallery, LazyLoader, Lightbox, RsvpForm, SubmitState};
use crate::widgets::flip_card::FlipCard;

// =============================================================================
// Frame model
// =============================================================================

/// A styled run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub color: ThemeColor,
    pub attrs: Attr,
}

impl Span {
    pub fn new(text: impl Into<String>, color: ThemeColor) -> Self {
        Self {
            text: text.into(),
            color,
            attrs: Attr::NONE,
        }
    }

    pub fn bold(mut self) -> Self {
        self.attrs |= Attr::BOLD;
        self
    }

    pub fn dim(mut self) -> Self {
        self.attrs |= Attr::DIM;
        self
    }
}

/// One row of spans.
pub type Line = Vec<Span>;

/// The assembled page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub lines: Vec<Line>,
}

impl Frame {
    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.lines.push(Vec::new());
    }

    /// Plain text of the frame, for tests and logs.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.iter().map(|span| span.text.as_str()).collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Center `text` in `width` columns, measured in display cells.
pub fn center_text(text: &str, width: usize) -> String {
    let text_width = UnicodeWidthStr::width(text);
    if text_width >= width {
        return text.to_string();
    }
    let pad = (width - text_width) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

// =============================================================================
// Sections
// =============================================================================

/// Hero carousel: the centered slide, dot indicators, autoplay hint.
pub fn render_carousel(engine: &CarouselEngine, theme: &Theme, width: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let n = engine.track().real_count();
    // Read the published signals, not the internals: the dots follow
    // the active-slide signal exactly as a reactive consumer would.
    let real = engine.active_signal().get();

    let slide_alt = engine
        .track()
        .get(engine.track_index())
        .map(|entry| entry.slide.alt.clone())
        .unwrap_or_default();

    let box_width = (width / 2).max(20);
    let border: String = "─".repeat(box_width);
    lines.push(vec![Span::new(
        center_text(&format!("┌{}┐", border), width),
        theme.primary,
    )]);
    lines.push(vec![Span::new(
        center_text(&format!("│{}│", center_text(&slide_alt, box_width)), width),
        theme.text,
    )]);
    lines.push(vec![Span::new(
        center_text(&format!("└{}┘", border), width),
        theme.primary,
    )]);

    // Dot indicators track the real index, never the clone range.
    let dots: String = (0..n)
        .map(|i| if i == real { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ");
    lines.push(vec![Span::new(center_text(&dots, width), theme.accent)]);

    let hint = match engine.autoplay_phase() {
        crate::carousel::AutoplayPhase::Running => "autoplay on",
        crate::carousel::AutoplayPhase::PendingResume => "resuming soon",
        crate::carousel::AutoplayPhase::Paused => "paused",
    };
    lines.push(vec![
        Span::new(center_text(hint, width), theme.text_muted).dim(),
    ]);

    lines
}

/// The polite live region, rendered as a status footer.
pub fn render_live_region(theme: &Theme) -> Line {
    if !announcer::is_attached() {
        return Vec::new();
    }
    vec![Span::new(announcer::latest(), theme.text_muted).dim()]
}

/// Masonry gallery summary: items per column with their load state.
pub fn render_gallery(gallery: &Gallery, loader: &LazyLoader, theme: &Theme) -> Vec<Line> {
    let mut lines = Vec::new();
    if gallery.is_empty() {
        return lines;
    }
    lines.push(vec![
        Span::new(
            format!(
                "Gallery — {} photos in {} columns",
                gallery.len(),
                gallery.column_count()
            ),
            theme.primary,
        )
        .bold(),
    ]);

    for (index, photo) in gallery.photos().iter().enumerate() {
        let marker = if loader.is_blurred(index) {
            "~"
        } else {
            match loader.state(index) {
                crate::widgets::LoadState::Loaded => "■",
                _ => "□",
            }
        };
        let Some(placement) = gallery.placement(index) else {
            continue;
        };
        lines.push(vec![
            Span::new(format!("  {} ", marker), theme.accent),
            Span::new(photo.alt.clone(), theme.text),
            Span::new(
                format!("  (col {}, y {})", placement.column + 1, placement.top),
                theme.text_muted,
            )
            .dim(),
        ]);
    }
    lines
}

/// The lightbox chrome when open: counter, zoom, current photo.
pub fn render_lightbox(lightbox: &Lightbox, theme: &Theme, width: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    if !lightbox.is_open() {
        return lines;
    }
    let (current, total) = lightbox.counter();
    let alt = lightbox
        .current_item()
        .map(|item| item.alt.clone())
        .unwrap_or_default();

    lines.push(vec![Span::new(
        center_text(&format!("▣ {}", alt), width),
        theme.text,
    )
    .bold()]);
    lines.push(vec![Span::new(
        center_text(
            &format!("{} / {}   zoom {:.2}x", current, total, lightbox.scale()),
            width,
        ),
        theme.text_muted,
    )]);
    lines.push(vec![Span::new(
        center_text("Esc close · ←/→ navigate · +/−/0 zoom", width),
        theme.text_muted,
    )
    .dim()]);
    lines
}

/// Flip cards, front or back per card state.
pub fn render_flip_cards(cards: &[FlipCard], theme: &Theme) -> Vec<Line> {
    let mut lines = Vec::new();
    for card in cards {
        lines.push(vec![
            Span::new("▸ ", theme.accent),
            Span::new(card.visible_face().to_string(), theme.text),
            Span::new(format!("  [{}]", card.assistive_label()), theme.text_muted).dim(),
        ]);
    }
    lines
}

/// RSVP form section.
pub fn render_rsvp(form: &RsvpForm, theme: &Theme) -> Vec<Line> {
    let mut lines = Vec::new();
    lines.push(vec![Span::new("RSVP", theme.primary).bold()]);

    let attending = match form.attending() {
        None => "(choose one) Joyfully accepts / Regretfully declines".to_string(),
        Some(true) => "Joyfully accepts".to_string(),
        Some(false) => "Regretfully declines".to_string(),
    };
    lines.push(vec![Span::new(format!("  Attending: {attending}"), theme.text)]);

    if form.details_visible() {
        lines.push(vec![Span::new(
            format!("  Party of {} (max {})", form.party_size(), form.max_party_size()),
            theme.text,
        )]);
        for (i, entry) in form.attendees().iter().enumerate() {
            let meal = entry.meal.as_deref().unwrap_or("meal not chosen");
            lines.push(vec![Span::new(
                format!("    Guest {}: {} — {}", i + 1, entry.name, meal),
                theme.text_muted,
            )]);
        }
        if !form.special_requests().is_empty() {
            lines.push(vec![Span::new(
                format!("    Requests: {}", form.special_requests()),
                theme.text_muted,
            )]);
        }
    }

    let (label_color, status) = match form.submit_state() {
        SubmitState::Succeeded => (theme.success, "RSVP received — thank you!".to_string()),
        SubmitState::Failed(message) => (theme.error, message.clone()),
        _ => (theme.text_muted, String::new()),
    };
    lines.push(vec![Span::new(format!("  [{}]", form.submit_label()), theme.accent).bold()]);
    if !status.is_empty() {
        lines.push(vec![Span::new(format!("  {status}"), label_color)]);
    }
    lines
}

/// The welcome overlay, covering everything else while visible.
pub fn render_first_view(overlay: &FirstView, theme: &Theme, width: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    if !overlay.is_visible() {
        return lines;
    }
    lines.push(vec![Span::new(center_text("♥ ♥ ♥", width), theme.primary)]);
    for text in WELCOME_LINES {
        lines.push(vec![Span::new(center_text(text, width), theme.text)]);
    }
    lines.push(vec![Span::new(
        center_text(&format!("[ {} ]", CTA_LABEL), width),
        theme.accent,
    )
    .bold()]);
    lines
}

// =============================================================================
// Emission
// =============================================================================

/// Write a frame to the terminal in one buffered pass.
pub fn emit(frame: &Frame, out: &mut impl Write) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in frame.lines.iter().enumerate() {
        queue!(out, MoveTo(0, row as u16))?;
        for span in line {
            queue!(out, SetForegroundColor(span.color.resolve()))?;
            if span.attrs.contains(Attr::BOLD) {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if span.attrs.contains(Attr::DIM) {
                queue!(out, SetAttribute(Attribute::Dim))?;
            }
            queue!(out, Print(&span.text), SetAttribute(Attribute::Reset))?;
        }
        queue!(out, ResetColor)?;
    }
    out.flush()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::blush;

    #[test]
    fn test_center_text_by_display_width() {
        assert_eq!(center_text("ab", 6), "  ab");
        // Wider than the field: returned unchanged.
        assert_eq!(center_text("abcdef", 4), "abcdef");
    }

    #[test]
    fn test_frame_to_text() {
        let theme = blush();
        let mut frame = Frame::default();
        frame.push(vec![
            Span::new("Photo ", theme.text),
            Span::new("3 of 6", theme.text_muted),
        ]);
        frame.blank();
        frame.push(vec![Span::new("RSVP", theme.primary).bold()]);
        assert_eq!(frame.to_text(), "Photo 3 of 6\n\nRSVP");
    }

    #[test]
    fn test_rsvp_section_states() {
        let theme = blush();
        let mut form = RsvpForm::new("g-1", 2);
        let text = Frame { lines: render_rsvp(&form, &theme) }.to_text();
        assert!(text.contains("choose one"));
        assert!(text.contains("[Submit RSVP]"));

        form.set_attending(true);
        form.set_attendee_name(0, "Avery");
        let text = Frame { lines: render_rsvp(&form, &theme) }.to_text();
        assert!(text.contains("Joyfully accepts"));
        assert!(text.contains("Party of 1 (max 2)"));
        assert!(text.contains("Guest 1: Avery — meal not chosen"));
    }

    #[test]
    fn test_emit_writes_ansi() {
        let theme = blush();
        let mut frame = Frame::default();
        frame.push(vec![Span::new("hello", theme.text)]);
        let mut buffer: Vec<u8> = Vec::new();
        emit(&frame, &mut buffer).unwrap();
        let written = String::from_utf8_lossy(&buffer);
        assert!(written.contains("hello"));
    }
}
