// Remote collaborator contract - the backend-as-a-service the client talks to
// Every persistent fact lives behind this trait; the client only holds copies

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

use crate::core::{CommentId, FriendshipId, NotificationId, PostId, ProfileId};
use crate::entities::{
    AuthEvent, Comment, FriendRequest, Friendship, FriendshipStatus, FriendshipWithProfiles,
    NewComment, NewNotification, NewPost, NewProfile, Notification, Post, PostQuery, Profile,
    ProfileSearch, ProfileUpdate, Session, SignUpRequest,
};
use crate::error::AppResult;

#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    // Auth surface
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<()>;
    async fn verify_email_code(&self, email: &str, code: &str) -> AppResult<Session>;
    async fn resend_verification(&self, email: &str) -> AppResult<()>;
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_out(&self) -> AppResult<()>;
    async fn current_user(&self) -> AppResult<Option<Session>>;
    fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent>;

    // profiles
    async fn get_profile(&self, id: ProfileId) -> AppResult<Option<Profile>>;
    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile>;
    async fn update_profile(&self, id: ProfileId, update: ProfileUpdate) -> AppResult<Profile>;
    async fn search_profiles(&self, search: ProfileSearch) -> AppResult<Vec<Profile>>;

    // posts, newest first
    async fn list_posts(&self, query: PostQuery) -> AppResult<Vec<Post>>;
    async fn create_post(&self, post: NewPost) -> AppResult<Post>;
    async fn delete_post(&self, id: PostId, author: ProfileId) -> AppResult<()>;

    // post_likes
    async fn liked_post_ids(&self, user: ProfileId) -> AppResult<Vec<PostId>>;
    async fn add_like(&self, post: PostId, user: ProfileId) -> AppResult<()>;
    async fn remove_like(&self, post: PostId, user: ProfileId) -> AppResult<()>;

    // comments, oldest first
    async fn list_comments(&self, post: PostId) -> AppResult<Vec<Comment>>;
    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment>;
    /// `NotFound` when `author` has no comment `id`.
    async fn delete_comment(&self, id: CommentId, author: ProfileId) -> AppResult<()>;

    // friendships
    /// Any row between the pair, in either direction.
    async fn find_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<Option<Friendship>>;
    async fn create_friendship(
        &self,
        requester: ProfileId,
        target: ProfileId,
    ) -> AppResult<Friendship>;
    async fn get_friendship(&self, id: FriendshipId) -> AppResult<Option<Friendship>>;
    async fn update_friendship_status(
        &self,
        id: FriendshipId,
        status: FriendshipStatus,
    ) -> AppResult<Friendship>;
    async fn incoming_friend_requests(&self, target: ProfileId) -> AppResult<Vec<FriendRequest>>;
    async fn accepted_friendships(
        &self,
        profile: ProfileId,
    ) -> AppResult<Vec<FriendshipWithProfiles>>;
    async fn count_friends(&self, profile: ProfileId) -> AppResult<u64>;
    async fn delete_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<()>;

    // notifications, newest first
    async fn list_notifications(
        &self,
        owner: ProfileId,
        limit: Option<usize>,
    ) -> AppResult<Vec<Notification>>;
    /// Server-side procedure; the caller never writes notification rows directly.
    async fn create_notification(&self, notification: NewNotification) -> AppResult<()>;
    async fn mark_notification_read(&self, id: NotificationId, owner: ProfileId) -> AppResult<()>;
    async fn mark_all_notifications_read(&self, owner: ProfileId) -> AppResult<()>;
    /// Marks every unread friend_request notification `owner` holds from `sender`.
    async fn mark_friend_request_notifications_read(
        &self,
        owner: ProfileId,
        sender: ProfileId,
    ) -> AppResult<u64>;
}

/// One variant per remote operation, used by the decorators for accounting
/// and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOp {
    SignUp,
    VerifyEmailCode,
    ResendVerification,
    SignIn,
    SignOut,
    CurrentUser,
    GetProfile,
    CreateProfile,
    UpdateProfile,
    SearchProfiles,
    ListPosts,
    CreatePost,
    DeletePost,
    LikedPostIds,
    AddLike,
    RemoveLike,
    ListComments,
    CreateComment,
    DeleteComment,
    FindFriendship,
    CreateFriendship,
    GetFriendship,
    UpdateFriendshipStatus,
    IncomingFriendRequests,
    AcceptedFriendships,
    CountFriends,
    DeleteFriendship,
    ListNotifications,
    CreateNotification,
    MarkNotificationRead,
    MarkAllNotificationsRead,
    MarkFriendRequestNotificationsRead,
}

impl BackendOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendOp::SignUp => "sign_up",
            BackendOp::VerifyEmailCode => "verify_email_code",
            BackendOp::ResendVerification => "resend_verification",
            BackendOp::SignIn => "sign_in",
            BackendOp::SignOut => "sign_out",
            BackendOp::CurrentUser => "current_user",
            BackendOp::GetProfile => "get_profile",
            BackendOp::CreateProfile => "create_profile",
            BackendOp::UpdateProfile => "update_profile",
            BackendOp::SearchProfiles => "search_profiles",
            BackendOp::ListPosts => "list_posts",
            BackendOp::CreatePost => "create_post",
            BackendOp::DeletePost => "delete_post",
            BackendOp::LikedPostIds => "liked_post_ids",
            BackendOp::AddLike => "add_like",
            BackendOp::RemoveLike => "remove_like",
            BackendOp::ListComments => "list_comments",
            BackendOp::CreateComment => "create_comment",
            BackendOp::DeleteComment => "delete_comment",
            BackendOp::FindFriendship => "find_friendship",
            BackendOp::CreateFriendship => "create_friendship",
            BackendOp::GetFriendship => "get_friendship",
            BackendOp::UpdateFriendshipStatus => "update_friendship_status",
            BackendOp::IncomingFriendRequests => "incoming_friend_requests",
            BackendOp::AcceptedFriendships => "accepted_friendships",
            BackendOp::CountFriends => "count_friends",
            BackendOp::DeleteFriendship => "delete_friendship",
            BackendOp::ListNotifications => "list_notifications",
            BackendOp::CreateNotification => "create_notification",
            BackendOp::MarkNotificationRead => "mark_notification_read",
            BackendOp::MarkAllNotificationsRead => "mark_all_notifications_read",
            BackendOp::MarkFriendRequestNotificationsRead => {
                "mark_friend_request_notifications_read"
            }
        }
    }

    /// Whether the operation changes remote state.
    pub fn is_mutation(self) -> bool {
        !matches!(
            self,
            BackendOp::CurrentUser
                | BackendOp::GetProfile
                | BackendOp::SearchProfiles
                | BackendOp::ListPosts
                | BackendOp::LikedPostIds
                | BackendOp::ListComments
                | BackendOp::FindFriendship
                | BackendOp::GetFriendship
                | BackendOp::IncomingFriendRequests
                | BackendOp::AcceptedFriendships
                | BackendOp::CountFriends
                | BackendOp::ListNotifications
        )
    }
}

impl fmt::Display for BackendOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
