//! Widgets - the page's interactive chrome besides the carousel
//!
//! Each widget is an isolated state object with a small contract:
//! - **Lightbox** - zoomable full-screen viewer shared by carousel,
//!   gallery and wedding-party photos
//! - **Gallery** - masonry layout with staggered reveal
//! - **Image loader** - placeholder to full-resolution progression
//! - **Flip cards** - two-sided detail cards
//! - **First view** - one-time welcome overlay
//! - **RSVP form** - attendance details and submission state

pub mod first_view;
pub mod flip_card;
pub mod gallery;
pub mod image_loader;
pub mod lightbox;
pub mod rsvp_form;

pub use first_view::{FirstView, OverlayState};
pub use flip_card::{ActivationTarget, FlipCard};
pub use gallery::{Gallery, ItemPlacement, RevealState};
pub use image_loader::{LazyLoader, LoadState};
pub use lightbox::{ImageTransform, Lightbox, LightboxItem};
pub use rsvp_form::{AttendeeEntry, RsvpForm, SubmitState};
