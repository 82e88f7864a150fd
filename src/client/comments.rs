use tracing::info;

use super::NexusClient;
use crate::core::validation::validate_comment;
use crate::core::{CommentId, PostId};
use crate::entities::{Comment, NewComment};
use crate::error::{AppError, AppResult};

impl NexusClient {
    /// Opens or closes a post's comment section; opening loads it.
    pub async fn toggle_comments(&self, post: PostId) -> AppResult<bool> {
        let expanded = self.ui().toggle_comments(post).await;
        if expanded {
            self.load_comments(post).await?;
        }
        Ok(expanded)
    }

    /// Comments on `post`, oldest first.
    pub async fn load_comments(&self, post: PostId) -> AppResult<()> {
        let comments = self
            .surface(
                "Failed to load comments",
                self.backend().list_comments(post).await,
            )
            .await?;
        self.store().replace_comments(post, comments).await;
        Ok(())
    }

    pub async fn add_comment(&self, post: PostId, content: &str) -> AppResult<Comment> {
        let session = self.require_session("Please login to comment").await?;
        let content = self.surface("Failed to add comment", validate_comment(content)).await?;

        let comment = self
            .surface(
                "Failed to add comment",
                self.backend()
                    .create_comment(NewComment {
                        post_id: post,
                        author_id: session.user_id,
                        content,
                    })
                    .await,
            )
            .await?;

        let _ = self.load_comments(post).await;
        self.store().shift_comment_count(post, 1).await;
        self.succeed("Comment added!").await;
        Ok(comment)
    }

    /// Removes one of the user's own comments. Only that comment leaves the
    /// cached list and only that post's counter moves.
    pub async fn delete_comment(&self, post: PostId, comment: CommentId) -> AppResult<()> {
        let session = self.require_session("Please login to comment").await?;
        let foreign = self
            .store()
            .comments(post)
            .await
            .items()
            .iter()
            .any(|c| c.id == comment && c.author_id != session.user_id);
        if foreign {
            let err = AppError::Forbidden("You can only delete your own comments".to_string());
            self.report("Failed to delete comment", &err).await;
            return Err(err);
        }

        self.surface(
            "Failed to delete comment",
            self.backend().delete_comment(comment, session.user_id).await,
        )
        .await?;

        info!("Deleted comment {} on post {}", comment, post);
        if self.store().remove_comment(post, comment).await {
            self.store().shift_comment_count(post, -1).await;
        }
        self.succeed("Comment deleted").await;
        Ok(())
    }
}
