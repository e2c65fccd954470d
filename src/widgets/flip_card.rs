//! Flip Cards - two-sided detail cards
//!
//! Each card toggles between its front and back on activation (click,
//! Enter or Space). Activation that lands on an embedded link follows
//! the link instead of flipping. The assistive label always describes
//! what the next activation will do.

use std::time::Duration;

use crate::state::focus;
use crate::state::keyboard::KeyboardEvent;
use crate::types::{CardContent, WidgetId};

/// Flip animation length, zero under reduced motion.
pub const FLIP_DURATION: Duration = Duration::from_millis(700);

/// What an activation landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationTarget {
    Card,
    Link,
}

/// One flip card.
pub struct FlipCard {
    id: WidgetId,
    content: CardContent,
    flipped: bool,
    focus_id: focus::FocusId,
}

impl FlipCard {
    pub fn new(content: CardContent) -> Self {
        let id = WidgetId::next();
        // Cards are buttons: focusable, activated from the keyboard.
        let focus_id = focus::register(focus::FocusEntry::new(id, 0));
        Self {
            id,
            content,
            flipped: false,
            focus_id,
        }
    }

    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    pub fn content(&self) -> &CardContent {
        &self.content
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// The side currently facing the reader.
    pub fn visible_face(&self) -> &str {
        if self.flipped { &self.content.back } else { &self.content.front }
    }

    /// Assistive label describing the next activation.
    pub fn assistive_label(&self) -> &'static str {
        if self.flipped {
            "Flip card back to front"
        } else {
            "Flip card to see details"
        }
    }

    /// Animation length for the current motion preference.
    pub fn flip_duration(reduced_motion: bool) -> Duration {
        if reduced_motion { Duration::ZERO } else { FLIP_DURATION }
    }

    fn toggle(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Pointer activation. Returns the link to follow when the
    /// activation landed on one; the card does not flip in that case.
    pub fn activate(&mut self, target: ActivationTarget) -> Option<&str> {
        match target {
            ActivationTarget::Link => self.content.link.as_deref(),
            ActivationTarget::Card => {
                self.toggle();
                None
            }
        }
    }

    /// Keyboard contract while focused: Enter or Space flips.
    pub fn handle_key(&mut self, event: &KeyboardEvent) -> bool {
        if !event.is_press() {
            return false;
        }
        match event.key.as_str() {
            "Enter" | " " => {
                self.toggle();
                true
            }
            _ => false,
        }
    }

    pub fn dispose(&mut self) {
        focus::unregister(self.focus_id);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        focus::reset_focus_state();
    }

    fn card(link: Option<&str>) -> FlipCard {
        FlipCard::new(CardContent {
            front: "The Tower".into(),
            back: "101 Arlington Street, Boston, MA".into(),
            link: link.map(str::to_string),
        })
    }

    #[test]
    fn test_activation_toggles() {
        setup();
        let mut card = card(None);
        assert!(!card.is_flipped());
        assert_eq!(card.visible_face(), "The Tower");
        assert_eq!(card.assistive_label(), "Flip card to see details");

        assert!(card.activate(ActivationTarget::Card).is_none());
        assert!(card.is_flipped());
        assert_eq!(card.visible_face(), "101 Arlington Street, Boston, MA");
        assert_eq!(card.assistive_label(), "Flip card back to front");

        card.activate(ActivationTarget::Card);
        assert!(!card.is_flipped());
    }

    #[test]
    fn test_link_activation_does_not_flip() {
        setup();
        let mut card = card(Some("https://maps.example.com/the-tower"));
        let link = card.activate(ActivationTarget::Link);
        assert_eq!(link, Some("https://maps.example.com/the-tower"));
        assert!(!card.is_flipped());
    }

    #[test]
    fn test_keyboard_flip() {
        setup();
        let mut card = card(None);
        assert!(card.handle_key(&KeyboardEvent::new("Enter")));
        assert!(card.is_flipped());
        assert!(card.handle_key(&KeyboardEvent::new(" ")));
        assert!(!card.is_flipped());
        assert!(!card.handle_key(&KeyboardEvent::new("ArrowLeft")));
    }

    #[test]
    fn test_cards_are_focusable() {
        setup();
        let card = card(None);
        assert_eq!(focus::reachable_ids().len(), 1);
        assert_eq!(
            focus::reachable_ids().first().and_then(|id| {
                focus::focus(*id);
                focus::focused_widget()
            }),
            Some(card.widget_id())
        );
    }

    #[test]
    fn test_flip_duration_respects_motion_preference() {
        assert_eq!(FlipCard::flip_duration(false), FLIP_DURATION);
        assert_eq!(FlipCard::flip_duration(true), Duration::ZERO);
    }
}
