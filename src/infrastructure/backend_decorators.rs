// Backend Decorators - pluggable cross-cutting behaviour around any Backend
// Each decorator is itself a Backend, so they compose in any order

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::core::{CommentId, FriendshipId, NotificationId, PostId, ProfileId};
use crate::entities::{
    AuthEvent, Comment, FriendRequest, Friendship, FriendshipStatus, FriendshipWithProfiles,
    NewComment, NewNotification, NewPost, NewProfile, Notification, Post, PostQuery, Profile,
    ProfileSearch, ProfileUpdate, Session, SignUpRequest,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::backend::{Backend, BackendOp};

/// All decorators implement this
pub trait BackendDecorator: Backend {
    /// Name of this decorator for logging
    fn decorator_name(&self) -> &'static str;
}

/// Per-operation call accounting
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpStats {
    pub calls: u64,
    pub failures: u64,
    pub total_latency_ms: f64,
}

impl OpStats {
    pub fn avg_latency_ms(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_latency_ms / self.calls as f64
        }
    }
}

/// Metrics Decorator - logs every remote call with its latency and keeps counters
#[derive(Debug)]
pub struct MetricsBackend {
    inner: Arc<dyn Backend>,
    stats: RwLock<HashMap<BackendOp, OpStats>>,
}

impl MetricsBackend {
    pub fn new(inner: Arc<dyn Backend>) -> Self {
        Self {
            inner,
            stats: RwLock::new(HashMap::new()),
        }
    }

    async fn track<T, F>(&self, op: BackendOp, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        match &result {
            Ok(_) => debug!(operation = %op, elapsed_ms, "remote call ok"),
            Err(e) => warn!(operation = %op, elapsed_ms, error = %e, "remote call failed"),
        }
        self.record(op, elapsed, result.is_ok()).await;
        result
    }

    async fn record(&self, op: BackendOp, elapsed: Duration, success: bool) {
        let mut stats = self.stats.write().await;
        let entry = stats.entry(op).or_default();
        entry.calls += 1;
        if !success {
            entry.failures += 1;
        }
        entry.total_latency_ms += elapsed.as_secs_f64() * 1000.0;
    }

    pub async fn calls(&self, op: BackendOp) -> u64 {
        self.stats.read().await.get(&op).map(|s| s.calls).unwrap_or(0)
    }

    pub async fn total_calls(&self) -> u64 {
        self.stats.read().await.values().map(|s| s.calls).sum()
    }

    /// Stable, name-ordered copy of the counters
    pub async fn snapshot(&self) -> BTreeMap<BackendOp, OpStats> {
        self.stats
            .read()
            .await
            .iter()
            .map(|(op, s)| (*op, s.clone()))
            .collect()
    }

    pub async fn reset(&self) {
        self.stats.write().await.clear();
    }
}

#[async_trait]
impl Backend for MetricsBackend {
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<()> {
        self.track(BackendOp::SignUp, self.inner.sign_up(request))
            .await
    }

    async fn verify_email_code(&self, email: &str, code: &str) -> AppResult<Session> {
        self.track(BackendOp::VerifyEmailCode, self.inner.verify_email_code(email, code))
            .await
    }

    async fn resend_verification(&self, email: &str) -> AppResult<()> {
        self.track(BackendOp::ResendVerification, self.inner.resend_verification(email))
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        self.track(BackendOp::SignIn, self.inner.sign_in(email, password))
            .await
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.track(BackendOp::SignOut, self.inner.sign_out())
            .await
    }

    async fn current_user(&self) -> AppResult<Option<Session>> {
        self.track(BackendOp::CurrentUser, self.inner.current_user())
            .await
    }

    async fn get_profile(&self, id: ProfileId) -> AppResult<Option<Profile>> {
        self.track(BackendOp::GetProfile, self.inner.get_profile(id))
            .await
    }

    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        self.track(BackendOp::CreateProfile, self.inner.create_profile(profile))
            .await
    }

    async fn update_profile(&self, id: ProfileId, update: ProfileUpdate) -> AppResult<Profile> {
        self.track(BackendOp::UpdateProfile, self.inner.update_profile(id, update))
            .await
    }

    async fn search_profiles(&self, search: ProfileSearch) -> AppResult<Vec<Profile>> {
        self.track(BackendOp::SearchProfiles, self.inner.search_profiles(search))
            .await
    }

    async fn list_posts(&self, query: PostQuery) -> AppResult<Vec<Post>> {
        self.track(BackendOp::ListPosts, self.inner.list_posts(query))
            .await
    }

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        self.track(BackendOp::CreatePost, self.inner.create_post(post))
            .await
    }

    async fn delete_post(&self, id: PostId, author: ProfileId) -> AppResult<()> {
        self.track(BackendOp::DeletePost, self.inner.delete_post(id, author))
            .await
    }

    async fn liked_post_ids(&self, user: ProfileId) -> AppResult<Vec<PostId>> {
        self.track(BackendOp::LikedPostIds, self.inner.liked_post_ids(user))
            .await
    }

    async fn add_like(&self, post: PostId, user: ProfileId) -> AppResult<()> {
        self.track(BackendOp::AddLike, self.inner.add_like(post, user))
            .await
    }

    async fn remove_like(&self, post: PostId, user: ProfileId) -> AppResult<()> {
        self.track(BackendOp::RemoveLike, self.inner.remove_like(post, user))
            .await
    }

    async fn list_comments(&self, post: PostId) -> AppResult<Vec<Comment>> {
        self.track(BackendOp::ListComments, self.inner.list_comments(post))
            .await
    }

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        self.track(BackendOp::CreateComment, self.inner.create_comment(comment))
            .await
    }

    async fn delete_comment(&self, id: CommentId, author: ProfileId) -> AppResult<()> {
        self.track(BackendOp::DeleteComment, self.inner.delete_comment(id, author))
            .await
    }

    async fn find_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<Option<Friendship>> {
        self.track(BackendOp::FindFriendship, self.inner.find_friendship(a, b))
            .await
    }

    async fn create_friendship(
        &self,
        requester: ProfileId,
        target: ProfileId,
    ) -> AppResult<Friendship> {
        self.track(BackendOp::CreateFriendship, self.inner.create_friendship(requester, target))
            .await
    }

    async fn get_friendship(&self, id: FriendshipId) -> AppResult<Option<Friendship>> {
        self.track(BackendOp::GetFriendship, self.inner.get_friendship(id))
            .await
    }

    async fn update_friendship_status(
        &self,
        id: FriendshipId,
        status: FriendshipStatus,
    ) -> AppResult<Friendship> {
        self.track(
            BackendOp::UpdateFriendshipStatus,
            self.inner.update_friendship_status(id, status),
        )
        .await
    }

    async fn incoming_friend_requests(&self, target: ProfileId) -> AppResult<Vec<FriendRequest>> {
        self.track(BackendOp::IncomingFriendRequests, self.inner.incoming_friend_requests(target))
            .await
    }

    async fn accepted_friendships(
        &self,
        profile: ProfileId,
    ) -> AppResult<Vec<FriendshipWithProfiles>> {
        self.track(BackendOp::AcceptedFriendships, self.inner.accepted_friendships(profile))
            .await
    }

    async fn count_friends(&self, profile: ProfileId) -> AppResult<u64> {
        self.track(BackendOp::CountFriends, self.inner.count_friends(profile))
            .await
    }

    async fn delete_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<()> {
        self.track(BackendOp::DeleteFriendship, self.inner.delete_friendship(a, b))
            .await
    }

    async fn list_notifications(
        &self,
        owner: ProfileId,
        limit: Option<usize>,
    ) -> AppResult<Vec<Notification>> {
        self.track(BackendOp::ListNotifications, self.inner.list_notifications(owner, limit))
            .await
    }

    async fn create_notification(&self, notification: NewNotification) -> AppResult<()> {
        self.track(BackendOp::CreateNotification, self.inner.create_notification(notification))
            .await
    }

    async fn mark_notification_read(&self, id: NotificationId, owner: ProfileId) -> AppResult<()> {
        self.track(BackendOp::MarkNotificationRead, self.inner.mark_notification_read(id, owner))
            .await
    }

    async fn mark_all_notifications_read(&self, owner: ProfileId) -> AppResult<()> {
        self.track(
            BackendOp::MarkAllNotificationsRead,
            self.inner.mark_all_notifications_read(owner),
        )
        .await
    }

    async fn mark_friend_request_notifications_read(
        &self,
        owner: ProfileId,
        sender: ProfileId,
    ) -> AppResult<u64> {
        self.track(
            BackendOp::MarkFriendRequestNotificationsRead,
            self.inner.mark_friend_request_notifications_read(owner, sender),
        )
        .await
    }

    fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.subscribe_auth_events()
    }
}

impl BackendDecorator for MetricsBackend {
    fn decorator_name(&self) -> &'static str {
        "metrics"
    }
}

/// Fault Injection Decorator - fails or slows down selected operations
#[derive(Debug)]
pub struct FaultInjectionBackend {
    inner: Arc<dyn Backend>,
    failing: RwLock<HashSet<BackendOp>>,
    delays: RwLock<HashMap<BackendOp, Duration>>,
}

impl FaultInjectionBackend {
    pub fn new(inner: Arc<dyn Backend>) -> Self {
        Self {
            inner,
            failing: RwLock::new(HashSet::new()),
            delays: RwLock::new(HashMap::new()),
        }
    }

    pub async fn fail(&self, op: BackendOp) {
        self.failing.write().await.insert(op);
    }

    pub async fn heal(&self, op: BackendOp) {
        self.failing.write().await.remove(&op);
    }

    pub async fn heal_all(&self) {
        self.failing.write().await.clear();
        self.delays.write().await.clear();
    }

    pub async fn delay(&self, op: BackendOp, by: Duration) {
        self.delays.write().await.insert(op, by);
    }

    async fn guard<T, F>(&self, op: BackendOp, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let delay = self.delays.read().await.get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.read().await.contains(&op) {
            warn!(operation = %op, "injected failure");
            return Err(AppError::Remote(format!("injected failure in {}", op)));
        }
        call.await
    }
}

#[async_trait]
impl Backend for FaultInjectionBackend {
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<()> {
        self.guard(BackendOp::SignUp, self.inner.sign_up(request))
            .await
    }

    async fn verify_email_code(&self, email: &str, code: &str) -> AppResult<Session> {
        self.guard(BackendOp::VerifyEmailCode, self.inner.verify_email_code(email, code))
            .await
    }

    async fn resend_verification(&self, email: &str) -> AppResult<()> {
        self.guard(BackendOp::ResendVerification, self.inner.resend_verification(email))
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        self.guard(BackendOp::SignIn, self.inner.sign_in(email, password))
            .await
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.guard(BackendOp::SignOut, self.inner.sign_out())
            .await
    }

    async fn current_user(&self) -> AppResult<Option<Session>> {
        self.guard(BackendOp::CurrentUser, self.inner.current_user())
            .await
    }

    async fn get_profile(&self, id: ProfileId) -> AppResult<Option<Profile>> {
        self.guard(BackendOp::GetProfile, self.inner.get_profile(id))
            .await
    }

    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        self.guard(BackendOp::CreateProfile, self.inner.create_profile(profile))
            .await
    }

    async fn update_profile(&self, id: ProfileId, update: ProfileUpdate) -> AppResult<Profile> {
        self.guard(BackendOp::UpdateProfile, self.inner.update_profile(id, update))
            .await
    }

    async fn search_profiles(&self, search: ProfileSearch) -> AppResult<Vec<Profile>> {
        self.guard(BackendOp::SearchProfiles, self.inner.search_profiles(search))
            .await
    }

    async fn list_posts(&self, query: PostQuery) -> AppResult<Vec<Post>> {
        self.guard(BackendOp::ListPosts, self.inner.list_posts(query))
            .await
    }

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        self.guard(BackendOp::CreatePost, self.inner.create_post(post))
            .await
    }

    async fn delete_post(&self, id: PostId, author: ProfileId) -> AppResult<()> {
        self.guard(BackendOp::DeletePost, self.inner.delete_post(id, author))
            .await
    }

    async fn liked_post_ids(&self, user: ProfileId) -> AppResult<Vec<PostId>> {
        self.guard(BackendOp::LikedPostIds, self.inner.liked_post_ids(user))
            .await
    }

    async fn add_like(&self, post: PostId, user: ProfileId) -> AppResult<()> {
        self.guard(BackendOp::AddLike, self.inner.add_like(post, user))
            .await
    }

    async fn remove_like(&self, post: PostId, user: ProfileId) -> AppResult<()> {
        self.guard(BackendOp::RemoveLike, self.inner.remove_like(post, user))
            .await
    }

    async fn list_comments(&self, post: PostId) -> AppResult<Vec<Comment>> {
        self.guard(BackendOp::ListComments, self.inner.list_comments(post))
            .await
    }

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        self.guard(BackendOp::CreateComment, self.inner.create_comment(comment))
            .await
    }

    async fn delete_comment(&self, id: CommentId, author: ProfileId) -> AppResult<()> {
        self.guard(BackendOp::DeleteComment, self.inner.delete_comment(id, author))
            .await
    }

    async fn find_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<Option<Friendship>> {
        self.guard(BackendOp::FindFriendship, self.inner.find_friendship(a, b))
            .await
    }

    async fn create_friendship(
        &self,
        requester: ProfileId,
        target: ProfileId,
    ) -> AppResult<Friendship> {
        self.guard(BackendOp::CreateFriendship, self.inner.create_friendship(requester, target))
            .await
    }

    async fn get_friendship(&self, id: FriendshipId) -> AppResult<Option<Friendship>> {
        self.guard(BackendOp::GetFriendship, self.inner.get_friendship(id))
            .await
    }

    async fn update_friendship_status(
        &self,
        id: FriendshipId,
        status: FriendshipStatus,
    ) -> AppResult<Friendship> {
        self.guard(
            BackendOp::UpdateFriendshipStatus,
            self.inner.update_friendship_status(id, status),
        )
        .await
    }

    async fn incoming_friend_requests(&self, target: ProfileId) -> AppResult<Vec<FriendRequest>> {
        self.guard(BackendOp::IncomingFriendRequests, self.inner.incoming_friend_requests(target))
            .await
    }

    async fn accepted_friendships(
        &self,
        profile: ProfileId,
    ) -> AppResult<Vec<FriendshipWithProfiles>> {
        self.guard(BackendOp::AcceptedFriendships, self.inner.accepted_friendships(profile))
            .await
    }

    async fn count_friends(&self, profile: ProfileId) -> AppResult<u64> {
        self.guard(BackendOp::CountFriends, self.inner.count_friends(profile))
            .await
    }

    async fn delete_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<()> {
        self.guard(BackendOp::DeleteFriendship, self.inner.delete_friendship(a, b))
            .await
    }

    async fn list_notifications(
        &self,
        owner: ProfileId,
        limit: Option<usize>,
    ) -> AppResult<Vec<Notification>> {
        self.guard(BackendOp::ListNotifications, self.inner.list_notifications(owner, limit))
            .await
    }

    async fn create_notification(&self, notification: NewNotification) -> AppResult<()> {
        self.guard(BackendOp::CreateNotification, self.inner.create_notification(notification))
            .await
    }

    async fn mark_notification_read(&self, id: NotificationId, owner: ProfileId) -> AppResult<()> {
        self.guard(BackendOp::MarkNotificationRead, self.inner.mark_notification_read(id, owner))
            .await
    }

    async fn mark_all_notifications_read(&self, owner: ProfileId) -> AppResult<()> {
        self.guard(
            BackendOp::MarkAllNotificationsRead,
            self.inner.mark_all_notifications_read(owner),
        )
        .await
    }

    async fn mark_friend_request_notifications_read(
        &self,
        owner: ProfileId,
        sender: ProfileId,
    ) -> AppResult<u64> {
        self.guard(
            BackendOp::MarkFriendRequestNotificationsRead,
            self.inner.mark_friend_request_notifications_read(owner, sender),
        )
        .await
    }

    fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.subscribe_auth_events()
    }
}

impl BackendDecorator for FaultInjectionBackend {
    fn decorator_name(&self) -> &'static str {
        "fault_injection"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_backend::InMemoryBackend;

    #[tokio::test]
    async fn test_metrics_count_calls_and_failures() {
        let faults = Arc::new(FaultInjectionBackend::new(Arc::new(InMemoryBackend::new())));
        let metrics = MetricsBackend::new(faults.clone());

        metrics.list_posts(PostQuery::feed()).await.unwrap();
        faults.fail(BackendOp::ListPosts).await;
        assert!(metrics.list_posts(PostQuery::feed()).await.is_err());

        let snapshot = metrics.snapshot().await;
        let stats = &snapshot[&BackendOp::ListPosts];
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(metrics.total_calls().await, 2);
        assert_eq!(metrics.decorator_name(), "metrics");
    }

    #[tokio::test]
    async fn test_failing_op_never_reaches_inner() {
        let inner = Arc::new(InMemoryBackend::new());
        let faults = FaultInjectionBackend::new(inner.clone());
        faults.fail(BackendOp::CreateNotification).await;

        let owner = ProfileId::new();
        let result = faults
            .create_notification(NewNotification {
                owner_id: owner,
                kind: crate::entities::NotificationType::Mention,
                message: "hi".to_string(),
                sender_id: None,
                post_id: None,
                comment_id: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Remote(_))));
        assert!(inner.list_notifications(owner, None).await.unwrap().is_empty());

        faults.heal(BackendOp::CreateNotification).await;
        assert!(faults.list_notifications(owner, None).await.is_ok());
    }
}
