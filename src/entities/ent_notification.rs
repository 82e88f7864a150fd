use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ent_profile::AuthorSummary;
use crate::core::{CommentId, NotificationId, PostId, ProfileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    FriendRequest,
    FriendAccept,
    Like,
    Comment,
    Mention,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::FriendRequest => "friend_request",
            NotificationType::FriendAccept => "friend_accept",
            NotificationType::Like => "like",
            NotificationType::Comment => "comment",
            NotificationType::Mention => "mention",
        }
    }

    /// Icon name used by the list view.
    pub fn icon(self) -> &'static str {
        match self {
            NotificationType::FriendRequest => "user-plus",
            NotificationType::FriendAccept => "user-check",
            NotificationType::Like => "heart",
            NotificationType::Comment => "comment",
            NotificationType::Mention => "at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub owner_id: ProfileId,
    pub kind: NotificationType,
    pub message: String,
    pub is_read: bool,
    pub sender: Option<AuthorSummary>,
    pub post_id: Option<PostId>,
    pub post_excerpt: Option<String>,
    pub comment_id: Option<CommentId>,
    pub comment_excerpt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn sender_id(&self) -> Option<ProfileId> {
        self.sender.as_ref().map(|s| s.id)
    }
}

/// Arguments of the server-side notification procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub owner_id: ProfileId,
    pub kind: NotificationType,
    pub message: String,
    pub sender_id: Option<ProfileId>,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
}

impl NewNotification {
    pub fn from_sender(
        owner_id: ProfileId,
        kind: NotificationType,
        message: String,
        sender_id: ProfileId,
    ) -> Self {
        Self {
            owner_id,
            kind,
            message,
            sender_id: Some(sender_id),
            post_id: None,
            comment_id: None,
        }
    }
}
