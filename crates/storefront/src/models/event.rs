//! Events, RSVPs and the validation of their JSON payloads.
//!
//! Payloads arrive with every field optional so a missing field produces a
//! 400 listing what is missing, rather than a deserialization rejection.

use std::collections::BTreeMap;

use bramble_core::{
    Email, EmailError, EventDate, EventId, EventTime, RsvpId, RsvpStatus, ScheduleError,
    UnknownRsvpStatus, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an events or RSVP payload was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Missing required fields: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
    #[error(transparent)]
    Status(#[from] UnknownRsvpStatus),
}

/// Collects missing-field names while extracting required values.
#[derive(Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    fn text(&mut self, name: &'static str, value: Option<&String>) -> String {
        match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn id(&mut self, name: &'static str, value: Option<i32>) -> i32 {
        value.unwrap_or_else(|| {
            self.missing.push(name);
            0
        })
    }

    fn finish(self) -> Result<(), FieldError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(FieldError::Missing(self.missing))
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub date: EventDate,
    pub time: EventTime,
    pub location: String,
    pub organizer_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Raw `/api/events` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub organizer_id: Option<String>,
}

/// A validated event ready to insert or overwrite.
///
/// `organizer_id` is whatever the caller claimed. It is only checked
/// against the admin id by the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub date: EventDate,
    pub time: EventTime,
    pub location: String,
    pub organizer_id: String,
}

impl EventInput {
    fn draft_fields(&self, required: &mut Required) -> [String; 5] {
        [
            required.text("title", self.title.as_ref()),
            required.text("date", self.date.as_ref()),
            required.text("time", self.time.as_ref()),
            required.text("location", self.location.as_ref()),
            required.text("organizer_id", self.organizer_id.as_ref()),
        ]
    }

    fn build_draft(&self, fields: [String; 5]) -> Result<EventDraft, FieldError> {
        let [title, date, time, location, organizer_id] = fields;
        Ok(EventDraft {
            title,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            date: EventDate::parse(&date)?,
            time: EventTime::parse(&time)?,
            location,
            organizer_id,
        })
    }

    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns `FieldError` for missing fields or a malformed date or time.
    pub fn validate_create(&self) -> Result<EventDraft, FieldError> {
        let mut required = Required::default();
        let fields = self.draft_fields(&mut required);
        required.finish()?;
        self.build_draft(fields)
    }

    /// Validate an update request: every create field plus `id`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate_create`], with `id` also required.
    pub fn validate_update(&self) -> Result<(EventId, EventDraft), FieldError> {
        let mut required = Required::default();
        let id = required.id("id", self.id);
        let fields = self.draft_fields(&mut required);
        required.finish()?;
        Ok((EventId::new(id), self.build_draft(fields)?))
    }

    /// Validate a delete request: `id` plus the caller's `organizer_id`.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Missing` if either is absent.
    pub fn validate_delete(&self) -> Result<(EventId, String), FieldError> {
        let mut required = Required::default();
        let id = required.id("id", self.id);
        let organizer_id = required.text("organizer_id", self.organizer_id.as_ref());
        required.finish()?;
        Ok((EventId::new(id), organizer_id))
    }
}

// =============================================================================
// RSVPs
// =============================================================================

/// A stored RSVP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: RsvpId,
    pub event_id: EventId,
    pub name: String,
    pub email: Email,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
}

/// Raw `/api/rsvp` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsvpInput {
    pub id: Option<i32>,
    pub event_id: Option<i32>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

/// A validated RSVP ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRsvp {
    pub event_id: EventId,
    pub name: String,
    pub email: Email,
    pub status: RsvpStatus,
}

impl RsvpInput {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns `FieldError` for missing fields, a bad email or an unknown status.
    pub fn validate_create(&self) -> Result<NewRsvp, FieldError> {
        let mut required = Required::default();
        let event_id = required.id("event_id", self.event_id);
        let name = required.text("name", self.name.as_ref());
        let email = required.text("email", self.email.as_ref());
        let status = required.text("status", self.status.as_ref());
        required.finish()?;

        Ok(NewRsvp {
            event_id: EventId::new(event_id),
            name,
            email: Email::parse(&email)?,
            status: status.parse()?,
        })
    }

    /// Validate a status change.
    ///
    /// # Errors
    ///
    /// Returns `FieldError` if `id` or `status` is missing or the status is unknown.
    pub fn validate_update(&self) -> Result<(RsvpId, RsvpStatus), FieldError> {
        let mut required = Required::default();
        let id = required.id("id", self.id);
        let status = required.text("status", self.status.as_ref());
        required.finish()?;
        Ok((RsvpId::new(id), status.parse()?))
    }

    /// Validate a delete request.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Missing` if `id` is absent.
    pub fn validate_delete(&self) -> Result<RsvpId, FieldError> {
        let mut required = Required::default();
        let id = required.id("id", self.id);
        required.finish()?;
        Ok(RsvpId::new(id))
    }
}

/// Head counts for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RsvpSummary {
    pub event_id: EventId,
    pub counts: BTreeMap<String, i64>,
    pub total: i64,
}

impl RsvpSummary {
    /// Build a summary from per-status counts. Statuses with no RSVPs report zero.
    #[must_use]
    pub fn from_counts(event_id: EventId, rows: &[(RsvpStatus, i64)]) -> Self {
        let mut counts: BTreeMap<String, i64> = RsvpStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for (status, count) in rows {
            *counts.entry(status.as_str().to_string()).or_insert(0) += count;
        }
        let total = counts.values().sum();
        Self {
            event_id,
            counts,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ORGANIZER: &str = "7d7b3c52-3f4e-4d8e-9c1a-0f7f6b2a9e11";

    fn event_input() -> EventInput {
        EventInput {
            id: None,
            title: Some("Book swap".to_string()),
            description: Some("  ".to_string()),
            date: Some("2024-06-15".to_string()),
            time: Some("7:00 PM".to_string()),
            location: Some("Library".to_string()),
            organizer_id: Some(ORGANIZER.to_string()),
        }
    }

    #[test]
    fn test_valid_event() {
        let draft = event_input().validate_create().unwrap();
        assert_eq!(draft.date.to_string(), "2024-06-15");
        assert_eq!(draft.time.to_string(), "7:00 PM");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let input = EventInput {
            title: None,
            location: Some(String::new()),
            ..event_input()
        };
        assert_eq!(
            input.validate_create(),
            Err(FieldError::Missing(vec!["title", "location"]))
        );
    }

    #[test]
    fn test_impossible_date() {
        let input = EventInput {
            date: Some("2024-13-40".to_string()),
            ..event_input()
        };
        assert!(matches!(
            input.validate_create(),
            Err(FieldError::Schedule(ScheduleError::DateOutOfRange(_)))
        ));
    }

    #[test]
    fn test_bad_time() {
        let input = EventInput {
            time: Some("19:00".to_string()),
            ..event_input()
        };
        assert!(matches!(
            input.validate_create(),
            Err(FieldError::Schedule(ScheduleError::TimeFormat(_)))
        ));
    }

    #[test]
    fn test_update_requires_id() {
        assert_eq!(
            event_input().validate_update(),
            Err(FieldError::Missing(vec!["id"]))
        );
        let input = EventInput {
            id: Some(4),
            ..event_input()
        };
        assert_eq!(input.validate_update().unwrap().0, EventId::new(4));
    }

    #[test]
    fn test_delete_needs_only_id_and_organizer() {
        let input = EventInput {
            id: Some(9),
            organizer_id: Some(ORGANIZER.to_string()),
            ..EventInput::default()
        };
        let (id, organizer) = input.validate_delete().unwrap();
        assert_eq!(id, EventId::new(9));
        assert_eq!(organizer, ORGANIZER);
    }

    #[test]
    fn test_any_organizer_text_passes_validation() {
        let input = EventInput {
            organizer_id: Some(" someone-else ".to_string()),
            ..event_input()
        };
        assert_eq!(input.validate_create().unwrap().organizer_id, "someone-else");
    }

    #[test]
    fn test_rsvp_create() {
        let input = RsvpInput {
            event_id: Some(1),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            status: Some("Not_Going".to_string()),
            ..RsvpInput::default()
        };
        let rsvp = input.validate_create().unwrap();
        assert_eq!(rsvp.status, RsvpStatus::NotGoing);

        let bad = RsvpInput {
            email: Some("ada".to_string()),
            ..input
        };
        assert!(matches!(bad.validate_create(), Err(FieldError::Email(_))));
    }

    #[test]
    fn test_rsvp_update_and_delete() {
        let input = RsvpInput {
            id: Some(3),
            status: Some("maybe".to_string()),
            ..RsvpInput::default()
        };
        assert_eq!(
            input.validate_update().unwrap(),
            (RsvpId::new(3), RsvpStatus::Maybe)
        );
        assert_eq!(
            RsvpInput::default().validate_delete(),
            Err(FieldError::Missing(vec!["id"]))
        );
    }

    #[test]
    fn test_summary_fills_missing_statuses() {
        let summary = RsvpSummary::from_counts(EventId::new(1), &[(RsvpStatus::Going, 3)]);
        assert_eq!(summary.counts["going"], 3);
        assert_eq!(summary.counts["maybe"], 0);
        assert_eq!(summary.counts["not_going"], 0);
        assert_eq!(summary.total, 3);
    }
}
