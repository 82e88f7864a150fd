use tracing::{debug, warn};

use super::NexusClient;
use crate::core::NotificationId;
use crate::error::AppResult;
use crate::state::NotificationsTab;

impl NexusClient {
    /// Badge refresh: the newest notifications up to the badge limit. Failures
    /// are only logged.
    pub async fn load_notifications(&self) {
        let Some(session) = self.session().current_session().await else {
            return;
        };
        let limit = self.config().notifications.badge_fetch_limit;
        match self
            .backend()
            .list_notifications(session.user_id, Some(limit))
            .await
        {
            Ok(notifications) => {
                self.store().replace_notifications(notifications).await;
                debug!("Unread notifications: {}", self.store().unread_count().await);
            }
            Err(err) => warn!("Failed to load notifications: {}", err),
        }
    }

    /// Every notification, for the notifications page.
    pub async fn load_notification_list(&self) -> AppResult<()> {
        let session = self.require_session("Please login to see notifications").await?;
        let notifications = self
            .surface(
                "Failed to load notifications",
                self.backend()
                    .list_notifications(session.user_id, None)
                    .await,
            )
            .await?;
        self.store().replace_notifications(notifications).await;
        Ok(())
    }

    pub async fn refresh_notifications(&self) -> AppResult<()> {
        self.load_notification_list().await?;
        self.succeed("Notifications refreshed").await;
        Ok(())
    }

    pub async fn mark_notification_read(&self, id: NotificationId) -> AppResult<()> {
        let session = self.require_session("Please login to see notifications").await?;
        self.surface(
            "Failed to mark notification as read",
            self.backend()
                .mark_notification_read(id, session.user_id)
                .await,
        )
        .await?;
        self.store().mark_notification_read(id).await;
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self) -> AppResult<()> {
        let session = self.require_session("Please login to see notifications").await?;
        self.surface(
            "Failed to mark all as read",
            self.backend()
                .mark_all_notifications_read(session.user_id)
                .await,
        )
        .await?;
        self.store().mark_all_notifications_read().await;
        self.succeed("All notifications marked as read").await;
        Ok(())
    }

    pub async fn switch_notifications_tab(&self, tab: NotificationsTab) {
        self.ui().set_notifications_tab(tab).await;
    }
}
