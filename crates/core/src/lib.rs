//! Bramble Core - shared types and checkout state.
//!
//! This crate is used by every Bramble component:
//! - `storefront` - Blog, storefront, checkout and the events API
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no database access, no HTTP clients. The storefront persists a
//! [`store::StoreState`] per visitor session and drives it through a
//! [`store::Store`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and event schedules
//! - [`store`] - Actions, reducers and the pricing selector for the cart/checkout state tree

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod store;
pub mod types;

pub use types::*;
