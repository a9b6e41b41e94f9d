//! User profiles and the change notifications pushed to subscribers.

use bramble_core::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A profile update, as broadcast on the user's realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChange {
    pub user_id: UserId,
    pub profile: Profile,
}

impl From<Profile> for ProfileChange {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            profile,
        }
    }
}
