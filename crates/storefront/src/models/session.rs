//! Session-related types.
//!
//! Everything a visitor accumulates between requests lives in their
//! server-side session, keyed by the constants below.

/// Session keys.
pub mod keys {
    /// The visitor's checkout state tree (`bramble_core::store::StoreState`),
    /// including who is signed in.
    pub const STORE_STATE: &str = "store_state";
}
