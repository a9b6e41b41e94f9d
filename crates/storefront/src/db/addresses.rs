//! Stored shipping addresses, one per user.

use bramble_core::UserId;
use bramble_core::store::ShippingAddress;
use sqlx::PgPool;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    line1: String,
    line2: Option<String>,
    city: String,
    postal_code: String,
    state: String,
    country: String,
}

impl From<AddressRow> for ShippingAddress {
    fn from(row: AddressRow) -> Self {
        Self {
            line1: row.line1,
            line2: row.line2,
            city: row.city,
            postal_code: row.postal_code,
            state: row.state,
            country: row.country,
        }
    }
}

/// Repository for user addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's address, if they have saved one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShippingAddress>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT line1, line2, city, postal_code, state, country
            FROM addresses
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Save the user's address, replacing any previous one wholesale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_for_user(
        &self,
        user_id: UserId,
        address: &ShippingAddress,
    ) -> Result<ShippingAddress, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            INSERT INTO addresses (user_id, line1, line2, city, postal_code, state, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE
            SET line1 = EXCLUDED.line1,
                line2 = EXCLUDED.line2,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                state = EXCLUDED.state,
                country = EXCLUDED.country,
                updated_at = NOW()
            RETURNING line1, line2, city, postal_code, state, country
            ",
        )
        .bind(user_id)
        .bind(&address.line1)
        .bind(address.line2.as_deref())
        .bind(&address.city)
        .bind(&address.postal_code)
        .bind(&address.state)
        .bind(&address.country)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Remove the user's address. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
