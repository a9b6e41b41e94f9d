//! Favorited products.

use bramble_core::store::Favorite;
use bramble_core::{ProductId, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    user_id: Uuid,
    product_id: String,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for favorites.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's favorites, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r"
            SELECT user_id, product_id, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Star a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already starred,
    /// `RepositoryError::Database` for anything else.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: &ProductId,
    ) -> Result<Favorite, RepositoryError> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            r"
            INSERT INTO favorites (user_id, product_id)
            VALUES ($1, $2)
            RETURNING user_id, product_id, created_at
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "favorite already exists"))?;

        Ok(row.into())
    }

    /// Unstar a product. Returns `false` if it was not starred.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: &ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
