use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tokio::sync::RwLock;

use crate::core::PostId;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Loading,
    Auth,
    Verification,
    Feed,
    Profile,
    Search,
    Notifications,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Loading => "loading",
            Page::Auth => "auth",
            Page::Verification => "verification",
            Page::Feed => "feed",
            Page::Profile => "profile",
            Page::Search => "search",
            Page::Notifications => "notifications",
        }
    }

    /// Unknown page names land on the feed.
    pub fn parse_or_feed(name: &str) -> Page {
        name.parse().unwrap_or(Page::Feed)
    }

    /// The feed is public; the other app pages need a signed-in user.
    pub fn requires_session(self) -> bool {
        matches!(self, Page::Profile | Page::Search | Page::Notifications)
    }
}

impl FromStr for Page {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loading" => Ok(Page::Loading),
            "auth" => Ok(Page::Auth),
            "verification" => Ok(Page::Verification),
            "feed" => Ok(Page::Feed),
            "profile" => Ok(Page::Profile),
            "search" => Ok(Page::Search),
            "notifications" => Ok(Page::Notifications),
            other => Err(AppError::NotFound(format!("unknown page '{}'", other))),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTab {
    #[default]
    Users,
    Friends,
    Requests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationsTab {
    #[default]
    All,
    Unread,
    FriendRequests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Transient message shown to the user. A newer notice replaces an older one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Media staged before it is attached to a post or saved on the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drafts {
    pub post_media_url: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct UiState {
    page: RwLock<Page>,
    search_tab: RwLock<SearchTab>,
    notifications_tab: RwLock<NotificationsTab>,
    notice: RwLock<Option<Notice>>,
    drafts: RwLock<Drafts>,
    expanded_comments: RwLock<HashSet<PostId>>,
    search_query: RwLock<String>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn page(&self) -> Page {
        *self.page.read().await
    }

    pub async fn set_page(&self, page: Page) {
        *self.page.write().await = page;
    }

    pub async fn search_tab(&self) -> SearchTab {
        *self.search_tab.read().await
    }

    pub async fn set_search_tab(&self, tab: SearchTab) {
        *self.search_tab.write().await = tab;
    }

    pub async fn notifications_tab(&self) -> NotificationsTab {
        *self.notifications_tab.read().await
    }

    pub async fn set_notifications_tab(&self, tab: NotificationsTab) {
        *self.notifications_tab.write().await = tab;
    }

    pub async fn notice(&self) -> Option<Notice> {
        self.notice.read().await.clone()
    }

    pub async fn raise(&self, kind: NoticeKind, message: impl Into<String>) {
        *self.notice.write().await = Some(Notice {
            kind,
            message: message.into(),
            raised_at: Utc::now(),
        });
    }

    pub async fn dismiss_notice(&self) {
        *self.notice.write().await = None;
    }

    pub async fn drafts(&self) -> Drafts {
        self.drafts.read().await.clone()
    }

    pub async fn stage_post_media(&self, url: Option<String>) {
        self.drafts.write().await.post_media_url = url;
    }

    pub async fn stage_avatar(&self, url: Option<String>) {
        self.drafts.write().await.avatar_url = url;
    }

    /// Flips the expanded flag; returns the new state.
    pub async fn toggle_comments(&self, post: PostId) -> bool {
        let mut expanded = self.expanded_comments.write().await;
        if expanded.remove(&post) {
            false
        } else {
            expanded.insert(post);
            true
        }
    }

    pub async fn comments_expanded(&self, post: PostId) -> bool {
        self.expanded_comments.read().await.contains(&post)
    }

    pub async fn expanded_comments(&self) -> HashSet<PostId> {
        self.expanded_comments.read().await.clone()
    }

    pub async fn search_query(&self) -> String {
        self.search_query.read().await.clone()
    }

    pub async fn set_search_query(&self, query: &str) {
        *self.search_query.write().await = query.to_string();
    }

    /// Everything except the page itself goes back to defaults.
    pub async fn reset(&self) {
        *self.search_tab.write().await = SearchTab::default();
        *self.notifications_tab.write().await = NotificationsTab::default();
        *self.drafts.write().await = Drafts::default();
        self.expanded_comments.write().await.clear();
        self.search_query.write().await.clear();
    }
}
