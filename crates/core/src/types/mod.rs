//! Core types for Bramble.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod schedule;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError, TaxRate, round_currency};
pub use schedule::{EventDate, EventTime, ScheduleError};
pub use status::{RsvpStatus, UnknownRsvpStatus};
