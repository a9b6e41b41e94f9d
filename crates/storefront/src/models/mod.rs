//! Domain models for the storefront.
//!
//! Cart, address, delivery and favorite types live in `bramble_core::store`
//! because the checkout state tree holds them. The types here are only
//! ever read from or written to the database.

pub mod event;
pub mod product;
pub mod profile;
pub mod session;

pub use event::{Event, EventDraft, EventInput, FieldError, NewRsvp, Rsvp, RsvpInput, RsvpSummary};
pub use product::Product;
pub use profile::{Profile, ProfileChange};
pub use session::keys as session_keys;
