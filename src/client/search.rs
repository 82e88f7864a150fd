// User search with a trailing-edge debounce on keystrokes

use tracing::debug;

use super::NexusClient;
use crate::entities::{Profile, ProfileSearch};
use crate::error::AppResult;

impl NexusClient {
    /// Feeds one keystroke's worth of input. Blank input clears everything;
    /// anything else reschedules the lookup.
    pub async fn on_search_input(&self, raw: &str) {
        let query = raw.trim().to_string();
        self.ui().set_search_query(&query).await;

        if query.is_empty() {
            self.search_debouncer().cancel();
            self.store().clear_search_results().await;
            return;
        }

        let client = self.clone();
        self.search_debouncer()
            .schedule(async move {
                let Ok(Some(results)) = client.lookup_users(&query).await else {
                    return;
                };
                // A later keystroke owns the slot now
                if client.ui().search_query().await != query {
                    debug!("Dropping stale results for '{}'", query);
                    return;
                }
                client.store().replace_search_results(results).await;
            })
            .await;
    }

    /// Immediate lookup, bypassing the debounce.
    pub async fn search_users(&self, query: &str) -> AppResult<()> {
        if let Some(results) = self.lookup_users(query).await? {
            self.store().replace_search_results(results).await;
        }
        Ok(())
    }

    pub async fn clear_search(&self) {
        self.search_debouncer().cancel();
        self.ui().set_search_query("").await;
        self.store().clear_search_results().await;
    }

    /// Waits for the most recent scheduled lookup to run or be dropped.
    pub async fn settle_search(&self) {
        self.search_debouncer().settle().await;
    }

    /// `None` when the query is too short to search.
    async fn lookup_users(&self, query: &str) -> AppResult<Option<Vec<Profile>>> {
        let query = query.trim();
        let settings = &self.config().search;
        if query.chars().count() < settings.min_query_chars {
            debug!("Query '{}' too short, not searching", query);
            return Ok(None);
        }

        let session = self.require_session("Please login to search").await?;
        let search = ProfileSearch {
            term: query.to_string(),
            exclude: Some(session.user_id),
            limit: settings.result_limit,
        };
        let results = self
            .surface(
                "Failed to search users",
                self.backend().search_profiles(search).await,
            )
            .await?;
        debug!("Search '{}' matched {} users", query, results.len());
        Ok(Some(results))
    }
}
