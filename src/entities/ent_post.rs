use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ent_profile::AuthorSummary;
use crate::core::{PostId, ProfileId};

/// A feed row with its server-computed aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: ProfileId,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub media_url: Option<String>,
    pub like_count: u64,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub author_id: ProfileId,
    pub content: String,
    pub media_url: Option<String>,
}

/// Posts are always returned newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostQuery {
    pub author: Option<ProfileId>,
    pub limit: Option<usize>,
}

impl PostQuery {
    pub fn feed() -> Self {
        Self::default()
    }

    pub fn by_author(author: ProfileId) -> Self {
        Self {
            author: Some(author),
            limit: None,
        }
    }
}
