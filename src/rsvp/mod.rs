//! RSVP Submission - wire document and fire-and-forget client
//!
//! The page's only network interaction: one POST of the RSVP document
//! to the API endpoint, answered with `{success, error?}`. The request
//! runs on a detached worker thread and reports back through a
//! callback that posts into the app loop; the event thread never
//! blocks on the network.

use serde::{Deserialize, Serialize};

pub mod client;

pub use client::{ApiConfig, submit};

// =============================================================================
// Wire types
// =============================================================================

/// One attending guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpAttendee {
    pub name: String,
    pub meal: String,
}

/// The submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RsvpSubmission {
    pub guest_id: String,
    pub attending: bool,
    pub party_size: usize,
    pub attendees: Vec<RsvpAttendee>,
    pub special_requests: String,
}

/// The endpoint's answer.
#[derive(Debug, Clone, Deserialize)]
pub struct RsvpAck {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// TESTS
// =============================================================================
