// Friend requests, acceptance and the friends list
//
// None of the multi-step flows here are atomic. Each step's failure is
// handled on its own and later steps still run where that makes sense.

use serde::Serialize;
use tracing::{info, warn};

use super::NexusClient;
use crate::core::{FriendshipId, ProfileId};
use crate::entities::{
    Friendship, FriendshipStatus, NewNotification, NotificationType, Profile, Session,
};
use crate::error::{AppError, AppResult};
use crate::state::{Page, SearchTab};

/// What `send_friend_request` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    Sent,
    AlreadyFriends,
    AlreadyPending,
    Declined,
}

impl NexusClient {
    pub async fn send_friend_request(&self, target: ProfileId) -> AppResult<RequestOutcome> {
        let session = self.require_session("Please login to add friends").await?;
        let me = session.user_id;
        if target == me {
            let err = AppError::Validation("You cannot add yourself as a friend".to_string());
            self.report("Failed to send friend request", &err).await;
            return Err(err);
        }

        let existing = self
            .surface(
                "Failed to send friend request",
                self.backend().find_friendship(me, target).await,
            )
            .await?;
        if let Some(row) = existing {
            return Ok(self.explain_existing(me, &row).await);
        }

        self.surface(
            "Failed to send friend request",
            self.backend().create_friendship(me, target).await,
        )
        .await?;
        self.store().record_outgoing_request(target).await;
        info!("Friend request sent from {} to {}", me, target);

        let message = format!("{} sent you a friend request", self.display_name(&session).await);
        let notification =
            NewNotification::from_sender(target, NotificationType::FriendRequest, message, me);
        if let Err(err) = self.backend().create_notification(notification).await {
            warn!("Friend request notification failed: {}", err);
        }

        self.succeed("Friend request sent!").await;
        self.load_notifications().await;
        Ok(RequestOutcome::Sent)
    }

    async fn explain_existing(&self, me: ProfileId, row: &Friendship) -> RequestOutcome {
        match row.status {
            FriendshipStatus::Accepted => {
                self.inform("You are already friends").await;
                RequestOutcome::AlreadyFriends
            }
            FriendshipStatus::Pending => {
                if row.requester_id == me {
                    self.store().record_outgoing_request(row.target_id).await;
                }
                self.inform("Friend request already pending").await;
                RequestOutcome::AlreadyPending
            }
            FriendshipStatus::Rejected => {
                self.inform("This friend request was declined").await;
                RequestOutcome::Declined
            }
        }
    }

    pub async fn accept_friend_request(&self, request: FriendshipId) -> AppResult<Friendship> {
        self.answer_friend_request(request, FriendshipStatus::Accepted)
            .await
    }

    pub async fn reject_friend_request(&self, request: FriendshipId) -> AppResult<Friendship> {
        self.answer_friend_request(request, FriendshipStatus::Rejected)
            .await
    }

    async fn answer_friend_request(
        &self,
        request: FriendshipId,
        decision: FriendshipStatus,
    ) -> AppResult<Friendship> {
        let accept = decision == FriendshipStatus::Accepted;
        let context = if accept {
            "Failed to accept friend request"
        } else {
            "Failed to reject friend request"
        };
        let session = self.require_session("Please login to manage friend requests").await?;
        let me = session.user_id;

        let row = self
            .backend()
            .get_friendship(request)
            .await
            .and_then(|row| {
                row.ok_or_else(|| AppError::NotFound("Friend request not found".to_string()))
            });
        let row = self.surface(context, row).await?;
        if row.target_id != me {
            let err = AppError::Forbidden(
                "Only the recipient can answer a friend request".to_string(),
            );
            self.report(context, &err).await;
            return Err(err);
        }
        self.surface(context, row.status.transition(decision)).await?;

        let updated = self
            .surface(
                context,
                self.backend().update_friendship_status(request, decision).await,
            )
            .await?;
        info!("Friend request {} is now {}", request, decision);

        if let Err(err) = self
            .backend()
            .mark_friend_request_notifications_read(me, row.requester_id)
            .await
        {
            warn!("Failed to clear friend request notifications: {}", err);
        }

        if accept {
            let message = format!(
                "{} accepted your friend request",
                self.display_name(&session).await
            );
            let notification = NewNotification::from_sender(
                row.requester_id,
                NotificationType::FriendAccept,
                message,
                me,
            );
            if let Err(err) = self.backend().create_notification(notification).await {
                warn!("Friend accept notification failed: {}", err);
            }
            self.succeed("Friend request accepted!").await;
        } else {
            self.inform("Friend request rejected").await;
        }

        let _ = futures::join!(
            self.load_friend_requests(),
            self.load_friend_count(),
            self.load_notifications()
        );
        if accept && self.friends_tab_showing().await {
            let _ = self.load_friends().await;
        }
        Ok(updated)
    }

    pub async fn remove_friend(&self, friend: ProfileId) -> AppResult<()> {
        let session = self.require_session("Please login to manage friends").await?;
        self.surface(
            "Failed to remove friend",
            self.backend()
                .delete_friendship(session.user_id, friend)
                .await,
        )
        .await?;

        self.store().forget_outgoing_request(friend).await;
        self.succeed("Friend removed").await;
        if self.friends_tab_showing().await {
            let _ = self.load_friends().await;
        }
        self.load_friend_count().await;
        Ok(())
    }

    /// Incoming pending requests with the requester's profile.
    pub async fn load_friend_requests(&self) -> AppResult<()> {
        let session = self.require_session("Please login to see friend requests").await?;
        let requests = self
            .surface(
                "Failed to load friend requests",
                self.backend()
                    .incoming_friend_requests(session.user_id)
                    .await,
            )
            .await?;
        self.store().replace_friend_requests(requests).await;
        Ok(())
    }

    /// Accepted friendships, each mapped to the other side.
    pub async fn load_friends(&self) -> AppResult<()> {
        let session = self.require_session("Please login to see your friends").await?;
        let me = session.user_id;
        let rows = self
            .surface(
                "Failed to load friends",
                self.backend().accepted_friendships(me).await,
            )
            .await?;
        let friends: Vec<Profile> = rows.iter().map(|row| row.friend_of(me).clone()).collect();
        self.store().replace_friends(friends).await;
        Ok(())
    }

    pub async fn load_friend_count(&self) {
        let Some(session) = self.session().current_session().await else {
            return;
        };
        match self.backend().count_friends(session.user_id).await {
            Ok(count) => self.store().set_friend_count(count).await,
            Err(err) => warn!("Failed to load friend count: {}", err),
        }
    }

    /// Switches the search page tab and loads what it shows.
    pub async fn switch_search_tab(&self, tab: SearchTab) -> AppResult<()> {
        self.ui().set_search_tab(tab).await;
        match tab {
            SearchTab::Users => {
                let query = self.ui().search_query().await;
                if query.is_empty() {
                    self.store().clear_search_results().await;
                    Ok(())
                } else {
                    self.search_users(&query).await
                }
            }
            SearchTab::Friends => self.load_friends().await,
            SearchTab::Requests => self.load_friend_requests().await,
        }
    }

    async fn friends_tab_showing(&self) -> bool {
        self.ui().page().await == Page::Search && self.ui().search_tab().await == SearchTab::Friends
    }

    async fn display_name(&self, session: &Session) -> String {
        match self.session().current_profile().await {
            Some(profile) => profile.display_name(),
            None => session.email.clone(),
        }
    }
}
