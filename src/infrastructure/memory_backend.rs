// In-process implementation of the remote contract
// Mirrors the hosted service closely enough to drive the client end to end:
// email-code sign-up, joined author summaries, aggregate counts, ilike search

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument};

use crate::core::{CommentId, FriendshipId, NotificationId, PostId, ProfileId};
use crate::entities::{
    AuthEvent, AuthorSummary, Comment, FriendRequest, Friendship, FriendshipStatus,
    FriendshipWithProfiles, NewComment, NewNotification, NewPost, NewProfile, Notification,
    NotificationType, Post, PostQuery, Profile, ProfileSearch, ProfileUpdate, Session,
    SignUpRequest, UserMetadata,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::backend::Backend;

const AUTH_EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
struct Account {
    user_id: ProfileId,
    email: String,
    password: String,
    metadata: UserMetadata,
    confirmed: bool,
    pending_code: Option<String>,
}

impl Account {
    fn session(&self) -> Session {
        Session {
            user_id: self.user_id,
            email: self.email.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct PostRow {
    id: PostId,
    author_id: ProfileId,
    content: String,
    media_url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: CommentId,
    post_id: PostId,
    author_id: ProfileId,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct NotificationRow {
    id: NotificationId,
    owner_id: ProfileId,
    kind: NotificationType,
    message: String,
    is_read: bool,
    sender_id: Option<ProfileId>,
    post_id: Option<PostId>,
    comment_id: Option<CommentId>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    /// Keyed by lowercased email
    accounts: HashMap<String, Account>,
    current: Option<Session>,
    profiles: HashMap<ProfileId, Profile>,
    posts: Vec<PostRow>,
    likes: HashSet<(PostId, ProfileId)>,
    comments: Vec<CommentRow>,
    friendships: Vec<Friendship>,
    notifications: Vec<NotificationRow>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing clock so creation order is always recoverable.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn summary(&self, id: ProfileId) -> Option<AuthorSummary> {
        self.profiles.get(&id).map(Profile::summary)
    }

    fn post_view(&self, row: &PostRow) -> Post {
        Post {
            id: row.id,
            author_id: row.author_id,
            author: self.summary(row.author_id),
            content: row.content.clone(),
            media_url: row.media_url.clone(),
            like_count: self.likes.iter().filter(|(p, _)| *p == row.id).count() as u64,
            comment_count: self.comments.iter().filter(|c| c.post_id == row.id).count() as u64,
            created_at: row.created_at,
        }
    }

    fn comment_view(&self, row: &CommentRow) -> Comment {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author: self.summary(row.author_id),
            content: row.content.clone(),
            created_at: row.created_at,
        }
    }

    fn notification_view(&self, row: &NotificationRow) -> Notification {
        let post_excerpt = row
            .post_id
            .and_then(|id| self.posts.iter().find(|p| p.id == id))
            .map(|p| p.content.clone());
        let comment_excerpt = row
            .comment_id
            .and_then(|id| self.comments.iter().find(|c| c.id == id))
            .map(|c| c.content.clone());
        Notification {
            id: row.id,
            owner_id: row.owner_id,
            kind: row.kind,
            message: row.message.clone(),
            is_read: row.is_read,
            sender: row.sender_id.and_then(|id| self.summary(id)),
            post_id: row.post_id,
            post_excerpt,
            comment_id: row.comment_id,
            comment_excerpt,
            created_at: row.created_at,
        }
    }

    fn profile(&self, id: ProfileId) -> AppResult<Profile> {
        self.profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("profile {}", id)))
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    tables: Arc<RwLock<Tables>>,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            auth_events,
        }
    }

    /// The code that would have been emailed to `email`.
    pub async fn verification_code(&self, email: &str) -> Option<String> {
        let tables = self.tables.read().await;
        tables
            .accounts
            .get(&email.to_lowercase())
            .and_then(|a| a.pending_code.clone())
    }

    /// Registers an already-confirmed account without a profile row.
    pub async fn register_confirmed(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> Session {
        let mut tables = self.tables.write().await;
        let account = Account {
            user_id: ProfileId::new(),
            email: email.to_string(),
            password: password.to_string(),
            metadata,
            confirmed: true,
            pending_code: None,
        };
        let session = account.session();
        tables.accounts.insert(email.to_lowercase(), account);
        session
    }

    /// Confirmed account plus its profile row.
    pub async fn seed_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        username: Option<&str>,
    ) -> AppResult<Profile> {
        let session = self
            .register_confirmed(
                email,
                password,
                UserMetadata {
                    first_name: Some(first_name.to_string()),
                    last_name: Some(last_name.to_string()),
                },
            )
            .await;
        let profile = self
            .create_profile(NewProfile {
                id: session.user_id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                date_of_birth: None,
                phone: None,
            })
            .await?;
        if let Some(username) = username {
            let mut tables = self.tables.write().await;
            if let Some(row) = tables.profiles.get_mut(&profile.id) {
                row.username = Some(username.to_string());
                return Ok(row.clone());
            }
        }
        Ok(profile)
    }

    pub async fn friendship_between(&self, a: ProfileId, b: ProfileId) -> Option<Friendship> {
        let tables = self.tables.read().await;
        tables.friendships.iter().find(|f| f.connects(a, b)).cloned()
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.auth_events.send(event);
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<()> {
        let key = request.email.to_lowercase();
        let mut tables = self.tables.write().await;
        if tables.accounts.get(&key).map(|a| a.confirmed).unwrap_or(false) {
            return Err(AppError::Remote("User already registered".to_string()));
        }
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        tables.accounts.insert(
            key,
            Account {
                user_id: ProfileId::new(),
                email: request.email,
                password: request.password,
                metadata: request.metadata,
                confirmed: false,
                pending_code: Some(code),
            },
        );
        debug!("Issued verification code");
        Ok(())
    }

    #[instrument(skip(self, code))]
    async fn verify_email_code(&self, email: &str, code: &str) -> AppResult<Session> {
        let session = {
            let mut tables = self.tables.write().await;
            let account = tables
                .accounts
                .get_mut(&email.to_lowercase())
                .ok_or_else(|| AppError::Remote("Token has expired or is invalid".to_string()))?;
            if account.pending_code.as_deref() != Some(code) {
                return Err(AppError::Remote(
                    "Token has expired or is invalid".to_string(),
                ));
            }
            account.confirmed = true;
            account.pending_code = None;
            let session = account.session();
            tables.current = Some(session.clone());
            session
        };
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn resend_verification(&self, email: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .get_mut(&email.to_lowercase())
            .filter(|a| !a.confirmed)
            .ok_or_else(|| AppError::Remote("No pending sign-up for this email".to_string()))?;
        account.pending_code = Some(format!("{:06}", rand::rng().random_range(0..1_000_000u32)));
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let session = {
            let mut tables = self.tables.write().await;
            let account = tables
                .accounts
                .get(&email.to_lowercase())
                .filter(|a| a.password == password)
                .ok_or_else(|| AppError::Remote("Invalid login credentials".to_string()))?;
            if !account.confirmed {
                return Err(AppError::Remote("Email not confirmed".to_string()));
            }
            let session = account.session();
            tables.current = Some(session.clone());
            session
        };
        info!("Signed in {}", session.user_id);
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.tables.write().await.current = None;
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> AppResult<Option<Session>> {
        Ok(self.tables.read().await.current.clone())
    }

    fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    async fn get_profile(&self, id: ProfileId) -> AppResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.id) {
            return Err(AppError::Remote(
                "duplicate key value violates unique constraint \"profiles_pkey\"".to_string(),
            ));
        }
        let now = tables.next_timestamp();
        let row = Profile {
            id: profile.id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            username: None,
            bio: None,
            avatar_url: None,
            website: None,
            phone: profile.phone,
            date_of_birth: profile.date_of_birth,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_profile(&self, id: ProfileId, update: ProfileUpdate) -> AppResult<Profile> {
        let mut tables = self.tables.write().await;
        let now = tables.next_timestamp();
        let row = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("profile {}", id)))?;
        row.first_name = update.first_name;
        row.last_name = update.last_name;
        row.bio = Some(update.bio);
        row.website = update.website;
        row.phone = update.phone;
        row.avatar_url = update.avatar_url;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn search_profiles(&self, search: ProfileSearch) -> AppResult<Vec<Profile>> {
        let needle = search.term.to_lowercase();
        let tables = self.tables.read().await;
        let mut hits: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| Some(p.id) != search.exclude)
            .filter(|p| {
                p.first_name.to_lowercase().contains(&needle)
                    || p.last_name.to_lowercase().contains(&needle)
                    || p.username
                        .as_deref()
                        .map(|u| u.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        hits.sort_by_key(|p| p.created_at);
        hits.truncate(search.limit);
        Ok(hits)
    }

    async fn list_posts(&self, query: PostQuery) -> AppResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&PostRow> = tables
            .posts
            .iter()
            .filter(|p| query.author.map(|a| p.author_id == a).unwrap_or(true))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows.into_iter().map(|r| tables.post_view(r)).collect())
    }

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        let mut tables = self.tables.write().await;
        let row = PostRow {
            id: PostId::new(),
            author_id: post.author_id,
            content: post.content,
            media_url: post.media_url,
            created_at: tables.next_timestamp(),
        };
        let view = tables.post_view(&row);
        tables.posts.push(row);
        Ok(view)
    }

    async fn delete_post(&self, id: PostId, author: ProfileId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| !(p.id == id && p.author_id == author));
        if tables.posts.len() != before {
            tables.likes.retain(|(p, _)| *p != id);
            tables.comments.retain(|c| c.post_id != id);
        }
        Ok(())
    }

    async fn liked_post_ids(&self, user: ProfileId) -> AppResult<Vec<PostId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .iter()
            .filter(|(_, u)| *u == user)
            .map(|(p, _)| *p)
            .collect())
    }

    async fn add_like(&self, post: PostId, user: ProfileId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == post) {
            return Err(AppError::Remote(format!("post {} does not exist", post)));
        }
        if !tables.likes.insert((post, user)) {
            return Err(AppError::Remote(
                "duplicate key value violates unique constraint \"post_likes_pkey\"".to_string(),
            ));
        }
        Ok(())
    }

    async fn remove_like(&self, post: PostId, user: ProfileId) -> AppResult<()> {
        self.tables.write().await.likes.remove(&(post, user));
        Ok(())
    }

    async fn list_comments(&self, post: PostId) -> AppResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&CommentRow> =
            tables.comments.iter().filter(|c| c.post_id == post).collect();
        rows.sort_by_key(|c| c.created_at);
        Ok(rows.into_iter().map(|r| tables.comment_view(r)).collect())
    }

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(AppError::Remote(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        let row = CommentRow {
            id: CommentId::new(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: tables.next_timestamp(),
        };
        let view = tables.comment_view(&row);
        tables.comments.push(row);
        Ok(view)
    }

    async fn delete_comment(&self, id: CommentId, author: ProfileId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables
            .comments
            .retain(|c| !(c.id == id && c.author_id == author));
        if tables.comments.len() == before {
            return Err(AppError::NotFound(format!("comment {}", id)));
        }
        Ok(())
    }

    async fn find_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<Option<Friendship>> {
        Ok(self.friendship_between(a, b).await)
    }

    async fn create_friendship(
        &self,
        requester: ProfileId,
        target: ProfileId,
    ) -> AppResult<Friendship> {
        let mut tables = self.tables.write().await;
        if requester == target {
            return Err(AppError::Remote("cannot befriend yourself".to_string()));
        }
        if tables.friendships.iter().any(|f| f.connects(requester, target)) {
            return Err(AppError::Remote(
                "duplicate key value violates unique constraint \"friendships_pair\"".to_string(),
            ));
        }
        let now = tables.next_timestamp();
        let row = Friendship {
            id: FriendshipId::new(),
            requester_id: requester,
            target_id: target,
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.friendships.push(row.clone());
        Ok(row)
    }

    async fn get_friendship(&self, id: FriendshipId) -> AppResult<Option<Friendship>> {
        let tables = self.tables.read().await;
        Ok(tables.friendships.iter().find(|f| f.id == id).cloned())
    }

    async fn update_friendship_status(
        &self,
        id: FriendshipId,
        status: FriendshipStatus,
    ) -> AppResult<Friendship> {
        let mut tables = self.tables.write().await;
        let now = tables.next_timestamp();
        let row = tables
            .friendships
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound(format!("friendship {}", id)))?;
        row.status = row
            .status
            .transition(status)
            .map_err(|e| AppError::Remote(e.user_message().to_string()))?;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn incoming_friend_requests(&self, target: ProfileId) -> AppResult<Vec<FriendRequest>> {
        let tables = self.tables.read().await;
        tables
            .friendships
            .iter()
            .filter(|f| f.target_id == target && f.status == FriendshipStatus::Pending)
            .map(|f| {
                Ok(FriendRequest {
                    friendship: f.clone(),
                    requester: tables.profile(f.requester_id)?,
                })
            })
            .collect()
    }

    async fn accepted_friendships(
        &self,
        profile: ProfileId,
    ) -> AppResult<Vec<FriendshipWithProfiles>> {
        let tables = self.tables.read().await;
        tables
            .friendships
            .iter()
            .filter(|f| f.involves(profile) && f.status == FriendshipStatus::Accepted)
            .map(|f| {
                Ok(FriendshipWithProfiles {
                    friendship: f.clone(),
                    requester: tables.profile(f.requester_id)?,
                    target: tables.profile(f.target_id)?,
                })
            })
            .collect()
    }

    async fn count_friends(&self, profile: ProfileId) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .friendships
            .iter()
            .filter(|f| f.involves(profile) && f.status == FriendshipStatus::Accepted)
            .count() as u64)
    }

    async fn delete_friendship(&self, a: ProfileId, b: ProfileId) -> AppResult<()> {
        self.tables
            .write()
            .await
            .friendships
            .retain(|f| !f.connects(a, b));
        Ok(())
    }

    async fn list_notifications(
        &self,
        owner: ProfileId,
        limit: Option<usize>,
    ) -> AppResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&NotificationRow> = tables
            .notifications
            .iter()
            .filter(|n| n.owner_id == owner)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows.into_iter().map(|r| tables.notification_view(r)).collect())
    }

    async fn create_notification(&self, notification: NewNotification) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let row = NotificationRow {
            id: NotificationId::new(),
            owner_id: notification.owner_id,
            kind: notification.kind,
            message: notification.message,
            is_read: false,
            sender_id: notification.sender_id,
            post_id: notification.post_id,
            comment_id: notification.comment_id,
            created_at: tables.next_timestamp(),
        };
        tables.notifications.push(row);
        Ok(())
    }

    async fn mark_notification_read(&self, id: NotificationId, owner: ProfileId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(row) = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.owner_id == owner)
        {
            row.is_read = true;
        }
        Ok(())
    }

    async fn mark_all_notifications_read(&self, owner: ProfileId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .notifications
            .iter_mut()
            .filter(|n| n.owner_id == owner && !n.is_read)
            .for_each(|n| n.is_read = true);
        Ok(())
    }

    async fn mark_friend_request_notifications_read(
        &self,
        owner: ProfileId,
        sender: ProfileId,
    ) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut marked = 0;
        for row in tables.notifications.iter_mut().filter(|n| {
            n.owner_id == owner
                && n.sender_id == Some(sender)
                && n.kind == NotificationType::FriendRequest
                && !n.is_read
        }) {
            row.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }
}
