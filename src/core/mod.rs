// Core types and pure helpers shared by every layer

pub mod format;
pub mod strong_types;
pub mod validation;

pub use strong_types::{CommentId, FriendshipId, NotificationId, PostId, ProfileId};
