//! RSVP Form - attendance, party details, submission state
//!
//! Form state for one invited household: attending yes/no, party size
//! up to the household maximum, a name and meal choice per attending
//! guest, and free-form special requests. Choosing "not attending"
//! hides the detail section; party-size changes grow or shrink the
//! guest rows while preserving what was already typed. Submission is a
//! single fire-and-forget POST; while it is in flight the submit
//! control is disabled, and a rejection re-enables it with the message.

use tracing::debug;

use crate::rsvp::{RsvpAttendee, RsvpSubmission};

/// The fixed menu. Every attending guest picks one.
pub const MEAL_OPTIONS: [&str; 3] = [
    "Roasted Boneless Chicken Breast",
    "Grilled Brandt Farms 10z NY Strip",
    "Roasted Cauliflower Al Pastor (GF-V)",
];

/// One guest row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeEntry {
    pub name: String,
    pub meal: Option<String>,
}

/// Submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// The RSVP form.
pub struct RsvpForm {
    guest_id: String,
    max_party_size: usize,
    attending: Option<bool>,
    party_size: usize,
    attendees: Vec<AttendeeEntry>,
    special_requests: String,
    submit: SubmitState,
}

impl RsvpForm {
    pub fn new(guest_id: impl Into<String>, max_party_size: usize) -> Self {
        let max_party_size = max_party_size.max(1);
        Self {
            guest_id: guest_id.into(),
            max_party_size,
            attending: None,
            party_size: 1,
            attendees: vec![AttendeeEntry::default()],
            special_requests: String::new(),
            submit: SubmitState::Idle,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn guest_id(&self) -> &str {
        &self.guest_id
    }

    pub fn max_party_size(&self) -> usize {
        self.max_party_size
    }

    pub fn attending(&self) -> Option<bool> {
        self.attending
    }

    /// The attending-details section is only shown after a "yes".
    pub fn details_visible(&self) -> bool {
        self.attending == Some(true)
    }

    pub fn party_size(&self) -> usize {
        self.party_size
    }

    pub fn attendees(&self) -> &[AttendeeEntry] {
        &self.attendees
    }

    pub fn special_requests(&self) -> &str {
        &self.special_requests
    }

    pub fn submit_state(&self) -> &SubmitState {
        &self.submit
    }

    /// Submit control label.
    pub fn submit_label(&self) -> &'static str {
        match self.submit {
            SubmitState::Submitting => "Submitting...",
            _ => "Submit RSVP",
        }
    }

    /// The submit control is disabled while a request is in flight.
    pub fn can_submit(&self) -> bool {
        !matches!(self.submit, SubmitState::Submitting)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    pub fn set_attending(&mut self, attending: bool) {
        self.attending = Some(attending);
    }

    /// Change the party size, clamped to [1, max]. Existing guest rows
    /// keep their contents; extra rows are dropped from the end, new
    /// rows start blank.
    pub fn set_party_size(&mut self, size: usize) {
        let size = size.clamp(1, self.max_party_size);
        self.party_size = size;
        if size > self.attendees.len() {
            self.attendees.resize(size, AttendeeEntry::default());
        } else {
            self.attendees.truncate(size);
        }
    }

    pub fn set_attendee_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(entry) = self.attendees.get_mut(index) {
            entry.name = name.into();
        }
    }

    /// Pick a meal for a guest. Unknown meals are ignored.
    pub fn set_attendee_meal(&mut self, index: usize, meal: &str) {
        if !MEAL_OPTIONS.contains(&meal) {
            return;
        }
        if let Some(entry) = self.attendees.get_mut(index) {
            entry.meal = Some(meal.to_string());
        }
    }

    pub fn set_special_requests(&mut self, text: impl Into<String>) {
        self.special_requests = text.into();
    }

    // =========================================================================
    // Validation & submission
    // =========================================================================

    /// Validate the current state. Messages match what the endpoint
    /// would reject with, so the round trip is avoided.
    pub fn validate(&self) -> Result<(), String> {
        let Some(attending) = self.attending else {
            return Err("Please select whether you will be attending.".to_string());
        };
        if !attending {
            return Ok(());
        }

        let named: Vec<&AttendeeEntry> = self
            .attendees
            .iter()
            .filter(|entry| !entry.name.trim().is_empty())
            .collect();
        if named.is_empty() {
            return Err("Please enter at least one guest name.".to_string());
        }
        for entry in &named {
            match &entry.meal {
                Some(meal) if MEAL_OPTIONS.contains(&meal.as_str()) => {}
                _ => return Err("Each attending guest must select a meal".to_string()),
            }
        }
        Ok(())
    }

    /// Validate and, if clean, transition to Submitting and hand back
    /// the wire document for the client. A validation failure sets the
    /// failed state and returns the message.
    pub fn begin_submit(&mut self) -> Result<RsvpSubmission, String> {
        if !self.can_submit() {
            return Err("Submission already in progress".to_string());
        }
        if let Err(message) = self.validate() {
            self.submit = SubmitState::Failed(message.clone());
            return Err(message);
        }

        let attending = self.attending == Some(true);
        let attendees: Vec<RsvpAttendee> = if attending {
            self.attendees
                .iter()
                .filter(|entry| !entry.name.trim().is_empty())
                .map(|entry| RsvpAttendee {
                    name: entry.name.trim().to_string(),
                    meal: entry.meal.clone().unwrap_or_default(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let doc = RsvpSubmission {
            guest_id: self.guest_id.clone(),
            attending,
            party_size: if attending { attendees.len() } else { 0 },
            attendees,
            special_requests: if attending {
                self.special_requests.clone()
            } else {
                String::new()
            },
        };

        self.submit = SubmitState::Submitting;
        debug!(guest_id = %self.guest_id, attending, "RSVP submit started");
        Ok(doc)
    }

    /// The worker reported back.
    pub fn submit_resolved(&mut self, outcome: Result<(), String>) {
        if !matches!(self.submit, SubmitState::Submitting) {
            return;
        }
        self.submit = match outcome {
            Ok(()) => SubmitState::Succeeded,
            Err(message) => SubmitState::Failed(message),
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================
