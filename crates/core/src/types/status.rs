//! Status enums for various entities.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A guest's answer to an event invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "rsvp_status", rename_all = "snake_case")
)]
pub enum RsvpStatus {
    Going,
    Maybe,
    NotGoing,
}

impl RsvpStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Going, Self::Maybe, Self::NotGoing];

    /// Wire/database spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Maybe => "maybe",
            Self::NotGoing => "not_going",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown RSVP status string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown RSVP status: {0} (expected going, maybe or not_going)")]
pub struct UnknownRsvpStatus(pub String);

impl FromStr for RsvpStatus {
    type Err = UnknownRsvpStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRsvpStatus(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("GOING".parse::<RsvpStatus>().unwrap(), RsvpStatus::Going);
        assert_eq!(" not_going ".parse::<RsvpStatus>().unwrap(), RsvpStatus::NotGoing);
        assert!("attending".parse::<RsvpStatus>().is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        for status in RsvpStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
