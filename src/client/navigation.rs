use tracing::debug;

use super::NexusClient;
use crate::state::{Page, SearchTab};

impl NexusClient {
    /// Switches page and runs that page's loaders. Pages that need a session
    /// fall back to the auth page without one. Returns the page landed on.
    pub async fn navigate(&self, page: Page) -> Page {
        let page = if page.requires_session() && !self.session().is_authenticated().await {
            Page::Auth
        } else {
            page
        };
        debug!("Navigating to {}", page);
        self.ui().set_page(page).await;

        match page {
            Page::Feed => {
                let _ = self.load_posts().await;
                self.load_notifications().await;
            }
            Page::Profile => {
                let _ = self.load_user_posts().await;
                self.load_friend_count().await;
            }
            Page::Search => self.ui().set_search_tab(SearchTab::Users).await,
            Page::Notifications => {
                let _ = self.load_notification_list().await;
            }
            Page::Loading | Page::Auth | Page::Verification => {}
        }
        page
    }

    /// Navigation by name; unknown names land on the feed.
    pub async fn navigate_to(&self, name: &str) -> Page {
        self.navigate(Page::parse_or_feed(name)).await
    }
}
