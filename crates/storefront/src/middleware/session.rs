//! Visitor sessions.
//!
//! Every visitor gets a server-side session holding their checkout state.
//! Records live in the `tower_sessions.session` table, which
//! `bramble-cli migrate` creates.

use sqlx::PgPool;
use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Cookie carrying the session id.
pub const SESSION_COOKIE_NAME: &str = "bramble_session";

/// A cart left alone this long is forgotten.
const IDLE_DAYS: i64 = 7;

/// Whether the site is served over TLS, judging by its public URL.
fn served_over_https(config: &StorefrontConfig) -> bool {
    url::Url::parse(&config.base_url).is_ok_and(|url| url.scheme() == "https")
}

/// Session layer backed by the storefront database.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(IDLE_DAYS)))
        .with_secure(served_over_https(config))
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
