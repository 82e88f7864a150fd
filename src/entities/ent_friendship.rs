// Friendship rows and their one-way status machine:
// pending -> accepted | rejected, both terminal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ent_profile::Profile;
use crate::core::{FriendshipId, ProfileId};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, FriendshipStatus::Pending)
    }

    pub fn can_transition_to(self, next: FriendshipStatus) -> bool {
        matches!(
            (self, next),
            (FriendshipStatus::Pending, FriendshipStatus::Accepted)
                | (FriendshipStatus::Pending, FriendshipStatus::Rejected)
        )
    }

    pub fn transition(self, next: FriendshipStatus) -> AppResult<FriendshipStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::Validation(format!(
                "Friend request cannot move from {} to {}",
                self, next
            )))
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: FriendshipId,
    pub requester_id: ProfileId,
    pub target_id: ProfileId,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    pub fn involves(&self, profile: ProfileId) -> bool {
        self.requester_id == profile || self.target_id == profile
    }

    /// The side of the friendship that is not `me`.
    pub fn other_side(&self, me: ProfileId) -> ProfileId {
        if self.requester_id == me {
            self.target_id
        } else {
            self.requester_id
        }
    }

    pub fn connects(&self, a: ProfileId, b: ProfileId) -> bool {
        (self.requester_id == a && self.target_id == b)
            || (self.requester_id == b && self.target_id == a)
    }
}

/// An incoming pending request joined with the requester's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub friendship: Friendship,
    pub requester: Profile,
}

/// An accepted friendship joined with both sides' profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendshipWithProfiles {
    pub friendship: Friendship,
    pub requester: Profile,
    pub target: Profile,
}

impl FriendshipWithProfiles {
    pub fn friend_of(&self, me: ProfileId) -> &Profile {
        if self.friendship.requester_id == me {
            &self.target
        } else {
            &self.requester
        }
    }
}
