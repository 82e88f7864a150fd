// Entity definitions - local, disposable copies of remote rows

pub mod ent_comment;
pub mod ent_friendship;
pub mod ent_notification;
pub mod ent_post;
pub mod ent_profile;
pub mod ent_session;

pub use ent_comment::{Comment, NewComment};
pub use ent_friendship::{
    FriendRequest, Friendship, FriendshipStatus, FriendshipWithProfiles,
};
pub use ent_notification::{NewNotification, Notification, NotificationType};
pub use ent_post::{NewPost, Post, PostQuery};
pub use ent_profile::{
    AuthorSummary, NewProfile, Profile, ProfileForm, ProfileSearch, ProfileUpdate,
};
pub use ent_session::{AuthEvent, Session, SignUpForm, SignUpRequest, UserMetadata};
