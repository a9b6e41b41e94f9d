//! Events.

use bramble_core::{EventId, UserId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::{Event, EventDraft};

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i32,
    title: String,
    description: Option<String>,
    date: NaiveDate,
    time: NaiveTime,
    location: String,
    organizer_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            title: row.title,
            description: row.description,
            date: row.date.into(),
            time: row.time.into(),
            location: row.location,
            organizer_id: UserId::new(row.organizer_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for events.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an event by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, date, "time", location, organizer_id, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert an event owned by `organizer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        draft: &EventDraft,
        organizer: UserId,
    ) -> Result<Event, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (title, description, date, "time", location, organizer_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, date, "time", location, organizer_id, created_at
            "#,
        )
        .bind(&draft.title)
        .bind(draft.description.as_deref())
        .bind(draft.date)
        .bind(draft.time)
        .bind(&draft.location)
        .bind(organizer)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Overwrite an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no event has this id.
    pub async fn update(
        &self,
        id: EventId,
        draft: &EventDraft,
        organizer: UserId,
    ) -> Result<Event, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                date = $4,
                "time" = $5,
                location = $6,
                organizer_id = $7
            WHERE id = $1
            RETURNING id, title, description, date, "time", location, organizer_id, created_at
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(draft.description.as_deref())
        .bind(draft.date)
        .bind(draft.time)
        .bind(&draft.location)
        .bind(organizer)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete an event and, through the foreign key, its RSVPs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no event has this id.
    pub async fn delete(&self, id: EventId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
