use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ent_profile::AuthorSummary;
use crate::core::{CommentId, PostId, ProfileId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: ProfileId,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: ProfileId,
    pub content: String,
}
