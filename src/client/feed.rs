use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::NexusClient;
use crate::core::validation::{validate_image_url, validate_post_body};
use crate::core::PostId;
use crate::entities::{NewPost, Post, PostQuery};
use crate::error::AppResult;
use crate::state::Page;

impl NexusClient {
    /// Feed posts, newest first, followed by the liked set when signed in.
    pub async fn load_posts(&self) -> AppResult<()> {
        let posts = self
            .surface(
                "Failed to load posts",
                self.backend().list_posts(PostQuery::feed()).await,
            )
            .await?;
        debug!("Loaded {} feed posts", posts.len());
        self.store().replace_posts(posts).await;

        if self.session().is_authenticated().await {
            self.load_liked_posts().await;
        }
        Ok(())
    }

    /// Rebuilds the liked set from scratch.
    pub async fn load_liked_posts(&self) {
        let Some(session) = self.session().current_session().await else {
            return;
        };
        match self.backend().liked_post_ids(session.user_id).await {
            Ok(ids) => {
                let liked: HashSet<PostId> = ids.into_iter().collect();
                self.store().replace_liked_posts(liked).await;
            }
            Err(err) => warn!("Failed to load liked posts: {}", err),
        }
    }

    /// The signed-in user's own posts for the profile page.
    pub async fn load_user_posts(&self) -> AppResult<()> {
        let session = self.require_session("Please login to view your profile").await?;
        let posts = self
            .surface(
                "Failed to load your posts",
                self.backend()
                    .list_posts(PostQuery::by_author(session.user_id))
                    .await,
            )
            .await?;
        self.store().replace_profile_posts(posts).await;
        Ok(())
    }

    pub async fn attach_post_media(&self, url: &str) -> AppResult<()> {
        let url = self.surface("Invalid image URL", validate_image_url(url)).await?;
        self.ui().stage_post_media(Some(url)).await;
        self.succeed("Image added to post!").await;
        Ok(())
    }

    pub async fn remove_post_media(&self) {
        self.ui().stage_post_media(None).await;
    }

    /// Publishes a post with the staged media, if any, then reloads the feed.
    pub async fn create_post(&self, content: &str) -> AppResult<Post> {
        let session = self.require_session("Please login to create posts").await?;
        let media_url = self.ui().drafts().await.post_media_url;
        self.surface(
            "Failed to create post",
            validate_post_body(content, media_url.as_deref()),
        )
        .await?;

        let new_post = NewPost {
            author_id: session.user_id,
            content: content.trim().to_string(),
            media_url,
        };
        let post = self
            .surface(
                "Failed to create post",
                self.backend().create_post(new_post).await,
            )
            .await?;

        info!("Created post {}", post.id);
        self.ui().stage_post_media(None).await;
        let _ = self.load_posts().await;
        if self.ui().page().await == Page::Profile {
            let _ = self.load_user_posts().await;
        }
        self.succeed("Post created successfully!").await;
        Ok(post)
    }

    pub async fn delete_post(&self, post: PostId) -> AppResult<()> {
        let session = self.require_session("Please login to delete posts").await?;
        self.surface(
            "Failed to delete post",
            self.backend().delete_post(post, session.user_id).await,
        )
        .await?;

        info!("Deleted post {}", post);
        let _ = self.load_user_posts().await;
        if self.ui().page().await == Page::Feed {
            let _ = self.load_posts().await;
        }
        self.succeed("Post deleted").await;
        Ok(())
    }
}
