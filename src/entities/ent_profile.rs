use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ProfileId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar_url: self.avatar_url.clone(),
            username: self.username.clone(),
        }
    }
}

/// The joined slice of a profile that posts, comments and notifications carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
}

impl AuthorSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload for the profiles collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
}

/// Full replacement of the editable profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

/// Edit form as submitted by the user, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

/// Case-insensitive substring lookup over names and username.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSearch {
    pub term: String,
    pub exclude: Option<ProfileId>,
    pub limit: usize,
}
