//! Clients and in-process services used by the route handlers.
//!
//! - `auth` - Resolve auth provider access tokens to users
//! - `stripe` - Hosted checkout sessions
//! - `legacy_blog` - Firestore-backed archive posts
//! - `realtime` - Per-user profile change channels

pub mod auth;
pub mod legacy_blog;
pub mod realtime;
pub mod stripe;

pub use auth::{AuthClient, AuthError};
pub use legacy_blog::{LegacyBlogClient, LegacyBlogError, LegacyPost};
pub use realtime::{ProfileHub, ProfileSubscription};
pub use stripe::{CheckoutRequest, CheckoutSession, StripeClient, StripeError};
