use tracing::debug;

use super::NexusClient;
use crate::core::PostId;
use crate::error::AppResult;
use crate::state::{apply_optimistically, LikeToggle};

impl NexusClient {
    /// Likes or unlikes `post` optimistically and returns the confirmed state.
    /// A second toggle on the same post waits for the first to resolve.
    pub async fn toggle_like(&self, post: PostId) -> AppResult<bool> {
        let session = self.require_session("Please login to like posts").await?;
        let _turn = self.like_gate().acquire(post).await;

        let like = !self.store().is_liked(post).await;
        let toggle = LikeToggle::new(self.store(), post, like);
        let backend = self.backend();
        let remote = async {
            if like {
                backend.add_like(post, session.user_id).await
            } else {
                backend.remove_like(post, session.user_id).await
            }
        };

        self.surface(
            "Failed to update like",
            apply_optimistically(&toggle, remote).await,
        )
        .await?;
        debug!("Post {} is now {}", post, if like { "liked" } else { "unliked" });
        Ok(like)
    }
}
