//! RSVP client - blocking POST on a detached worker thread.

use std::env;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::MarqueeError;

use super::{RsvpAck, RsvpSubmission};

const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// API endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
}

impl ApiConfig {
    /// Endpoint from `MARQUEE_API_ENDPOINT`, defaulting to the local
    /// development server.
    pub fn from_env() -> Self {
        let endpoint = env::var("MARQUEE_API_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self { endpoint }
    }

    /// Full submit URL.
    pub fn submit_url(&self) -> String {
        format!("{}/rsvp/submit", self.endpoint.trim_end_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Fire-and-forget submission.
///
/// Spawns a worker thread for the POST; `on_done` runs on that thread
/// and must only post the outcome back into the app loop. The event
/// thread never blocks. A reply that never arrives leaves the form in
/// its failed-pending state until the visitor retries.
pub fn submit<F>(config: &ApiConfig, doc: RsvpSubmission, on_done: F)
where
    F: FnOnce(Result<(), MarqueeError>) + Send + 'static,
{
    let url = config.submit_url();
    thread::spawn(move || {
        debug!(%url, guest_id = %doc.guest_id, "submitting RSVP");
        let outcome = post(&url, &doc);
        if let Err(err) = &outcome {
            warn!(%err, "RSVP submission failed");
        }
        on_done(outcome);
    });
}

fn post(url: &str, doc: &RsvpSubmission) -> Result<(), MarqueeError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|err| MarqueeError::Submit(err.to_string()))?;

    let response = client
        .post(url)
        .json(doc)
        .send()
        .map_err(|err| MarqueeError::Submit(err.to_string()))?;

    let status = response.status();
    let ack: RsvpAck = response
        .json()
        .map_err(|err| MarqueeError::Submit(err.to_string()))?;

    if status.is_success() && ack.success {
        Ok(())
    } else {
        Err(MarqueeError::Rejected(
            ack.error.unwrap_or_else(|| "Failed to submit RSVP".to_string()),
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================
