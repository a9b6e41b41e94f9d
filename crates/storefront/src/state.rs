//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::content::ContentStore;
use crate::services::{AuthClient, LegacyBlogClient, ProfileHub, StripeClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    content: ContentStore,
    auth: AuthClient,
    stripe: StripeClient,
    legacy_blog: Option<LegacyBlogClient>,
    profiles: ProfileHub,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `content` - Blog posts loaded at startup
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, content: ContentStore) -> Self {
        let auth = AuthClient::new(&config.supabase);
        let stripe = StripeClient::new(&config.stripe);
        let legacy_blog = config
            .firestore_project_id
            .as_deref()
            .map(LegacyBlogClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                content,
                auth,
                stripe,
                legacy_blog,
                profiles: ProfileHub::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Blog posts.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Auth provider client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Stripe client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Legacy blog client, when a Firestore project is configured.
    #[must_use]
    pub fn legacy_blog(&self) -> Option<&LegacyBlogClient> {
        self.inner.legacy_blog.as_ref()
    }

    /// Realtime profile channels.
    #[must_use]
    pub fn profiles(&self) -> &ProfileHub {
        &self.inner.profiles
    }
}
