//! RSVPs.

use bramble_core::{Email, EventId, RsvpId, RsvpStatus};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{NewRsvp, Rsvp, RsvpSummary};

#[derive(Debug, sqlx::FromRow)]
struct RsvpRow {
    id: i32,
    event_id: i32,
    name: String,
    email: String,
    status: RsvpStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<RsvpRow> for Rsvp {
    type Error = RepositoryError;

    fn try_from(row: RsvpRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: RsvpId::new(row.id),
            event_id: EventId::new(row.event_id),
            name: row.name,
            email,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Repository for RSVPs.
pub struct RsvpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RsvpRepository<'a> {
    /// Create a new RSVP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a guest's answer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn create(&self, rsvp: &NewRsvp) -> Result<Rsvp, RepositoryError> {
        let row = sqlx::query_as::<_, RsvpRow>(
            r"
            INSERT INTO rsvps (event_id, name, email, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, name, email, status, created_at
            ",
        )
        .bind(rsvp.event_id)
        .bind(&rsvp.name)
        .bind(&rsvp.email)
        .bind(rsvp.status)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Change an RSVP's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no RSVP has this id.
    pub async fn update_status(
        &self,
        id: RsvpId,
        status: RsvpStatus,
    ) -> Result<Rsvp, RepositoryError> {
        let row = sqlx::query_as::<_, RsvpRow>(
            r"
            UPDATE rsvps
            SET status = $2
            WHERE id = $1
            RETURNING id, event_id, name, email, status, created_at
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete an RSVP.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no RSVP has this id.
    pub async fn delete(&self, id: RsvpId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count answers per status for one event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, event_id: EventId) -> Result<RsvpSummary, RepositoryError> {
        let rows = sqlx::query_as::<_, (RsvpStatus, i64)>(
            r"
            SELECT status, COUNT(*)
            FROM rsvps
            WHERE event_id = $1
            GROUP BY status
            ",
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(RsvpSummary::from_counts(event_id, &rows))
    }
}
