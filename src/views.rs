// View models - serializable projections of the store, one per page
//
// The projections are pure functions over slot snapshots; the NexusClient
// methods at the bottom only gather the snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::client::NexusClient;
use crate::config::ProfileDefaults;
use crate::core::format::{badge_text, format_relative_time, truncate_text};
use crate::core::{CommentId, FriendshipId, NotificationId, PostId, ProfileId};
use crate::entities::{
    AuthorSummary, Comment, FriendRequest, Notification, NotificationType, Post, Profile,
};
use crate::state::{Notice, NotificationsTab, Page, SearchTab};

const EXCERPT_LEN: usize = 50;
const BIO_EXCERPT_LEN: usize = 80;

/// Follow-up a front end offers from an empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreatePost,
    FindFriends,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyState {
    pub icon: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub action: Option<Action>,
}

impl EmptyState {
    fn new(icon: &'static str, title: &'static str, message: &'static str) -> Self {
        Self {
            icon,
            title,
            message,
            action: None,
        }
    }

    fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCard {
    pub id: PostId,
    pub author_id: ProfileId,
    pub author_name: String,
    pub author_username: Option<String>,
    pub author_avatar: Option<String>,
    pub content: String,
    pub media_url: Option<String>,
    pub like_count: u64,
    pub comment_count: u64,
    pub liked: bool,
    pub own: bool,
    pub comments_open: bool,
    pub posted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedView {
    pub posts: Vec<PostCard>,
    pub media_draft: Option<String>,
    pub empty_state: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub id: ProfileId,
    pub display_name: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: String,
    pub avatar_url: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub member_since: String,
    pub post_count: usize,
    pub likes_received: u64,
    pub friend_count: u64,
    pub avatar_draft: Option<String>,
    pub posts: Vec<PostCard>,
    pub empty_state: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCard {
    pub id: ProfileId,
    pub display_name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub request_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestCard {
    pub friendship_id: FriendshipId,
    pub requester: UserCard,
    pub sent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub tab: SearchTab,
    pub results: Vec<UserCard>,
    pub friends: Vec<UserCard>,
    pub requests: Vec<RequestCard>,
    pub empty_state: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationCard {
    pub id: NotificationId,
    pub kind: NotificationType,
    pub icon: &'static str,
    pub message: String,
    pub is_read: bool,
    pub sender_name: Option<String>,
    pub sender_avatar: Option<String>,
    pub post_excerpt: Option<String>,
    pub comment_excerpt: Option<String>,
    pub received: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationsView {
    pub tab: NotificationsTab,
    pub unread: usize,
    pub badge: Option<String>,
    pub items: Vec<NotificationCard>,
    pub empty_state: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentCard {
    pub id: CommentId,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub own: bool,
    pub posted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentsView {
    pub post_id: PostId,
    pub expanded: bool,
    pub comments: Vec<CommentCard>,
    pub empty_state: Option<EmptyState>,
}

/// Chrome shared by every page: where we are, the badge and the notice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavView {
    pub page: Page,
    pub signed_in: bool,
    pub display_name: Option<String>,
    pub badge: Option<String>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", content = "view", rename_all = "snake_case")]
pub enum PageView {
    Loading,
    Auth,
    Verification { email: Option<String> },
    Feed(FeedView),
    Profile(Box<ProfileView>),
    Search(SearchView),
    Notifications(NotificationsView),
}

fn author_fields(author: Option<&AuthorSummary>) -> (String, Option<String>, Option<String>) {
    match author {
        Some(a) => (a.display_name(), a.username.clone(), a.avatar_url.clone()),
        None => ("Unknown user".to_string(), None, None),
    }
}

pub struct PostContext<'a> {
    pub me: Option<ProfileId>,
    pub liked: &'a HashSet<PostId>,
    pub expanded: &'a HashSet<PostId>,
    pub now: DateTime<Utc>,
}

pub fn post_card(post: &Post, ctx: &PostContext<'_>) -> PostCard {
    let (author_name, author_username, author_avatar) = author_fields(post.author.as_ref());
    PostCard {
        id: post.id,
        author_id: post.author_id,
        author_name,
        author_username,
        author_avatar,
        content: post.content.clone(),
        media_url: post.media_url.clone(),
        like_count: post.like_count,
        comment_count: post.comment_count,
        liked: ctx.liked.contains(&post.id),
        own: ctx.me == Some(post.author_id),
        comments_open: ctx.expanded.contains(&post.id),
        posted: format_relative_time(post.created_at, ctx.now),
    }
}

pub fn render_feed(posts: &[Post], ctx: &PostContext<'_>, media_draft: Option<String>) -> FeedView {
    let empty_state = posts.is_empty().then(|| {
        EmptyState::new("newspaper", "No Posts Yet", "Be the first to share something!")
            .with_action(Action::CreatePost)
    });
    FeedView {
        posts: posts.iter().map(|p| post_card(p, ctx)).collect(),
        media_draft,
        empty_state,
    }
}

pub struct ProfileContext<'a> {
    pub profile: &'a Profile,
    pub email: Option<String>,
    pub friend_count: u64,
    pub avatar_draft: Option<String>,
    pub defaults: &'a ProfileDefaults,
}

pub fn render_profile(
    posts: &[Post],
    ctx: &PostContext<'_>,
    profile: ProfileContext<'_>,
) -> ProfileView {
    let p = profile.profile;
    let empty_state = posts.is_empty().then(|| {
        EmptyState::new("pen", "No posts yet", "Share your first post with your friends")
            .with_action(Action::CreatePost)
    });
    ProfileView {
        id: p.id,
        display_name: p.display_name(),
        username: p.username.clone(),
        email: profile.email,
        bio: p.bio.clone().unwrap_or_else(|| profile.defaults.bio.clone()),
        avatar_url: p
            .avatar_url
            .clone()
            .unwrap_or_else(|| profile.defaults.avatar_url.clone()),
        website: p.website.clone(),
        phone: p.phone.clone(),
        date_of_birth: p.date_of_birth,
        member_since: p.created_at.format("%Y-%m-%d").to_string(),
        post_count: posts.len(),
        likes_received: posts.iter().map(|post| post.like_count).sum(),
        friend_count: profile.friend_count,
        avatar_draft: profile.avatar_draft,
        posts: posts.iter().map(|post| post_card(post, ctx)).collect(),
        empty_state,
    }
}

pub fn user_card(profile: &Profile, outgoing: &HashSet<ProfileId>) -> UserCard {
    UserCard {
        id: profile.id,
        display_name: profile.display_name(),
        username: profile.username.clone(),
        avatar_url: profile.avatar_url.clone(),
        bio: profile
            .bio
            .as_deref()
            .map(|bio| truncate_text(bio, BIO_EXCERPT_LEN)),
        request_sent: outgoing.contains(&profile.id),
    }
}

pub struct SearchContext<'a> {
    pub query: String,
    pub tab: SearchTab,
    pub results: &'a [Profile],
    pub friends: &'a [Profile],
    pub requests: &'a [FriendRequest],
    pub outgoing: &'a HashSet<ProfileId>,
    pub now: DateTime<Utc>,
}

pub fn render_search(ctx: SearchContext<'_>) -> SearchView {
    let empty_state = match ctx.tab {
        SearchTab::Users if ctx.query.is_empty() => Some(EmptyState::new(
            "search",
            "Start Searching",
            "Enter a name or username to find friends",
        )),
        SearchTab::Users if ctx.results.is_empty() => Some(EmptyState::new(
            "user-slash",
            "No users found",
            "Try a different search term",
        )),
        SearchTab::Friends if ctx.friends.is_empty() => Some(
            EmptyState::new("user-friends", "No Friends Yet", "Start connecting with people!")
                .with_action(Action::FindFriends),
        ),
        SearchTab::Requests if ctx.requests.is_empty() => Some(EmptyState::new(
            "user-clock",
            "No pending requests",
            "When someone sends you a friend request, it will appear here",
        )),
        _ => None,
    };

    SearchView {
        results: ctx
            .results
            .iter()
            .map(|p| user_card(p, ctx.outgoing))
            .collect(),
        friends: ctx
            .friends
            .iter()
            .map(|p| user_card(p, ctx.outgoing))
            .collect(),
        requests: ctx
            .requests
            .iter()
            .map(|r| RequestCard {
                friendship_id: r.friendship.id,
                requester: user_card(&r.requester, ctx.outgoing),
                sent: format_relative_time(r.friendship.created_at, ctx.now),
            })
            .collect(),
        query: ctx.query,
        tab: ctx.tab,
        empty_state,
    }
}

pub fn visible_under(tab: NotificationsTab, notification: &Notification) -> bool {
    match tab {
        NotificationsTab::All => true,
        NotificationsTab::Unread => !notification.is_read,
        NotificationsTab::FriendRequests => notification.kind == NotificationType::FriendRequest,
    }
}

pub fn notification_card(n: &Notification, now: DateTime<Utc>) -> NotificationCard {
    NotificationCard {
        id: n.id,
        kind: n.kind,
        icon: n.kind.icon(),
        message: n.message.clone(),
        is_read: n.is_read,
        sender_name: n.sender.as_ref().map(AuthorSummary::display_name),
        sender_avatar: n.sender.as_ref().and_then(|s| s.avatar_url.clone()),
        post_excerpt: n
            .post_excerpt
            .as_deref()
            .map(|text| truncate_text(text, EXCERPT_LEN)),
        comment_excerpt: n
            .comment_excerpt
            .as_deref()
            .map(|text| truncate_text(text, EXCERPT_LEN)),
        received: format_relative_time(n.created_at, now),
    }
}

pub fn render_notifications(
    notifications: &[Notification],
    tab: NotificationsTab,
    now: DateTime<Utc>,
) -> NotificationsView {
    let unread = notifications.iter().filter(|n| !n.is_read).count();
    let items: Vec<NotificationCard> = notifications
        .iter()
        .filter(|n| visible_under(tab, n))
        .map(|n| notification_card(n, now))
        .collect();

    let empty_state = items.is_empty().then(|| match tab {
        NotificationsTab::All => EmptyState::new(
            "bell-slash",
            "No notifications",
            "When you get notifications, they'll appear here",
        ),
        _ => EmptyState::new(
            "inbox",
            "No notifications",
            "There are no notifications in this category",
        ),
    });

    NotificationsView {
        tab,
        unread,
        badge: badge_text(unread),
        items,
        empty_state,
    }
}

pub fn render_comments(
    post: PostId,
    expanded: bool,
    comments: &[Comment],
    me: Option<ProfileId>,
    now: DateTime<Utc>,
) -> CommentsView {
    let cards: Vec<CommentCard> = comments
        .iter()
        .map(|c| {
            let (author_name, _, author_avatar) = author_fields(c.author.as_ref());
            CommentCard {
                id: c.id,
                author_name,
                author_avatar,
                content: c.content.clone(),
                own: me == Some(c.author_id),
                posted: format_relative_time(c.created_at, now),
            }
        })
        .collect();
    let empty_state = (expanded && cards.is_empty()).then(|| {
        EmptyState::new("comment", "No comments yet", "Be the first to comment!")
    });
    CommentsView {
        post_id: post,
        expanded,
        comments: cards,
        empty_state,
    }
}

impl NexusClient {
    pub async fn feed_view(&self) -> FeedView {
        let me = self.session().current_session().await.map(|s| s.user_id);
        let liked = self.store().liked_posts().await;
        let expanded = self.ui().expanded_comments().await;
        let ctx = PostContext {
            me,
            liked: &liked,
            expanded: &expanded,
            now: Utc::now(),
        };
        let posts = self.store().posts().await;
        render_feed(posts.items(), &ctx, self.ui().drafts().await.post_media_url)
    }

    /// `None` until a session and its profile exist.
    pub async fn profile_view(&self) -> Option<ProfileView> {
        let session = self.session().current_session().await?;
        let profile = self.session().current_profile().await?;
        let liked = self.store().liked_posts().await;
        let expanded = self.ui().expanded_comments().await;
        let ctx = PostContext {
            me: Some(session.user_id),
            liked: &liked,
            expanded: &expanded,
            now: Utc::now(),
        };
        let posts = self.store().profile_posts().await;
        Some(render_profile(
            posts.items(),
            &ctx,
            ProfileContext {
                profile: &profile,
                email: Some(session.email),
                friend_count: self.store().friend_count().await.unwrap_or(0),
                avatar_draft: self.ui().drafts().await.avatar_url,
                defaults: &self.config().profile,
            },
        ))
    }

    pub async fn search_view(&self) -> SearchView {
        let results = self.store().search_results().await;
        let friends = self.store().friends().await;
        let requests = self.store().friend_requests().await;
        let mut outgoing = HashSet::new();
        for profile in results.items().iter().chain(friends.items()) {
            if self.store().has_outgoing_request(profile.id).await {
                outgoing.insert(profile.id);
            }
        }
        render_search(SearchContext {
            query: self.ui().search_query().await,
            tab: self.ui().search_tab().await,
            results: results.items(),
            friends: friends.items(),
            requests: requests.items(),
            outgoing: &outgoing,
            now: Utc::now(),
        })
    }

    pub async fn notifications_view(&self) -> NotificationsView {
        let notifications = self.store().notifications().await;
        render_notifications(
            notifications.items(),
            self.ui().notifications_tab().await,
            Utc::now(),
        )
    }

    pub async fn comments_view(&self, post: PostId) -> CommentsView {
        let me = self.session().current_session().await.map(|s| s.user_id);
        let comments = self.store().comments(post).await;
        render_comments(
            post,
            self.ui().comments_expanded(post).await,
            comments.items(),
            me,
            Utc::now(),
        )
    }

    pub async fn nav_view(&self) -> NavView {
        NavView {
            page: self.ui().page().await,
            signed_in: self.session().is_authenticated().await,
            display_name: self
                .session()
                .current_profile()
                .await
                .map(|p| p.display_name()),
            badge: badge_text(self.store().unread_count().await),
            notice: self.ui().notice().await,
        }
    }

    /// The view for whatever page is current.
    pub async fn page_view(&self) -> PageView {
        match self.ui().page().await {
            Page::Loading => PageView::Loading,
            Page::Auth => PageView::Auth,
            Page::Verification => PageView::Verification {
                email: self.session().pending_sign_up().await.map(|f| f.email),
            },
            Page::Feed => PageView::Feed(self.feed_view().await),
            Page::Profile => match self.profile_view().await {
                Some(view) => PageView::Profile(Box::new(view)),
                None => PageView::Auth,
            },
            Page::Search => PageView::Search(self.search_view().await),
            Page::Notifications => PageView::Notifications(self.notifications_view().await),
        }
    }
}
