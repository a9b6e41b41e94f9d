//! Delivery option catalog.

use bramble_core::DeliveryOptionId;
use bramble_core::store::DeliveryOption;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct DeliveryOptionRow {
    id: i32,
    name: String,
    price: Decimal,
    description: Option<String>,
}

impl From<DeliveryOptionRow> for DeliveryOption {
    fn from(row: DeliveryOptionRow) -> Self {
        Self {
            id: DeliveryOptionId::new(row.id),
            name: row.name,
            price: row.price,
            description: row.description,
        }
    }
}

/// Repository for delivery options.
pub struct DeliveryOptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DeliveryOptionRepository<'a> {
    /// Create a new delivery option repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List options, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<DeliveryOption>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeliveryOptionRow>(
            r"
            SELECT id, name, price, description
            FROM delivery_options
            ORDER BY price, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get one option.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DeliveryOptionId) -> Result<Option<DeliveryOption>, RepositoryError> {
        let row = sqlx::query_as::<_, DeliveryOptionRow>(
            r"
            SELECT id, name, price, description
            FROM delivery_options
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert an option, or update the one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        name: &str,
        price: Decimal,
        description: Option<&str>,
    ) -> Result<DeliveryOption, RepositoryError> {
        let row = sqlx::query_as::<_, DeliveryOptionRow>(
            r"
            INSERT INTO delivery_options (name, price, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET price = EXCLUDED.price,
                description = EXCLUDED.description
            RETURNING id, name, price, description
            ",
        )
        .bind(name)
        .bind(price)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
