// View-model store: local, disposable copies of remote collections
//
// Every load replaces a slot wholesale. The only in-place patches are the
// optimistic like and comment counters, read-flag flips, and dropping a
// comment the user just deleted.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::core::{CommentId, NotificationId, PostId, ProfileId};
use crate::entities::{Comment, FriendRequest, Notification, Post, Profile};

/// One cached collection plus how many times it has been reloaded.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    items: Vec<T>,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
            loaded_at: None,
        }
    }
}

impl<T: Clone> Slot<T> {
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.generation += 1;
        self.loaded_at = Some(Utc::now());
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.generation += 1;
        self.loaded_at = None;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    fn patch(&mut self, mut f: impl FnMut(&mut T)) {
        self.items.iter_mut().for_each(|item| f(item));
    }
}

#[derive(Debug, Default)]
pub struct ViewModelStore {
    posts: RwLock<Slot<Post>>,
    profile_posts: RwLock<Slot<Post>>,
    comments: RwLock<HashMap<PostId, Slot<Comment>>>,
    notifications: RwLock<Slot<Notification>>,
    friends: RwLock<Slot<Profile>>,
    friend_requests: RwLock<Slot<FriendRequest>>,
    search_results: RwLock<Slot<Profile>>,
    liked_posts: RwLock<HashSet<PostId>>,
    outgoing_requests: RwLock<HashSet<ProfileId>>,
    friend_count: RwLock<Option<u64>>,
}

fn shift(count: u64, delta: i64) -> u64 {
    if delta >= 0 {
        count.saturating_add(delta as u64)
    } else {
        count.saturating_sub(delta.unsigned_abs())
    }
}

impl ViewModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    // posts

    pub async fn replace_posts(&self, posts: Vec<Post>) {
        self.posts.write().await.replace(posts);
    }

    pub async fn posts(&self) -> Slot<Post> {
        self.posts.read().await.clone()
    }

    pub async fn replace_profile_posts(&self, posts: Vec<Post>) {
        self.profile_posts.write().await.replace(posts);
    }

    pub async fn profile_posts(&self) -> Slot<Post> {
        self.profile_posts.read().await.clone()
    }

    /// Like count of `post` as shown in the feed and profile slots.
    pub async fn like_counts(&self, post: PostId) -> (Option<u64>, Option<u64>) {
        let find = |slot: &Slot<Post>| {
            slot.items()
                .iter()
                .find(|p| p.id == post)
                .map(|p| p.like_count)
        };
        let feed = find(&*self.posts.read().await);
        let profile = find(&*self.profile_posts.read().await);
        (feed, profile)
    }

    pub async fn shift_like_count(&self, post: PostId, delta: i64) {
        let bump = |p: &mut Post| {
            if p.id == post {
                p.like_count = shift(p.like_count, delta);
            }
        };
        self.posts.write().await.patch(bump);
        self.profile_posts.write().await.patch(bump);
    }

    /// Puts back counts captured by [`like_counts`](Self::like_counts).
    pub async fn restore_like_counts(&self, post: PostId, feed: Option<u64>, profile: Option<u64>) {
        if let Some(count) = feed {
            self.posts.write().await.patch(|p| {
                if p.id == post {
                    p.like_count = count;
                }
            });
        }
        if let Some(count) = profile {
            self.profile_posts.write().await.patch(|p| {
                if p.id == post {
                    p.like_count = count;
                }
            });
        }
    }

    pub async fn shift_comment_count(&self, post: PostId, delta: i64) {
        let bump = |p: &mut Post| {
            if p.id == post {
                p.comment_count = shift(p.comment_count, delta);
            }
        };
        self.posts.write().await.patch(bump);
        self.profile_posts.write().await.patch(bump);
    }

    // likes

    pub async fn replace_liked_posts(&self, liked: HashSet<PostId>) {
        *self.liked_posts.write().await = liked;
    }

    pub async fn is_liked(&self, post: PostId) -> bool {
        self.liked_posts.read().await.contains(&post)
    }

    pub async fn set_liked(&self, post: PostId, liked: bool) {
        let mut set = self.liked_posts.write().await;
        if liked {
            set.insert(post);
        } else {
            set.remove(&post);
        }
    }

    pub async fn liked_posts(&self) -> HashSet<PostId> {
        self.liked_posts.read().await.clone()
    }

    // comments

    pub async fn replace_comments(&self, post: PostId, comments: Vec<Comment>) {
        self.comments
            .write()
            .await
            .entry(post)
            .or_default()
            .replace(comments);
    }

    pub async fn comments(&self, post: PostId) -> Slot<Comment> {
        self.comments
            .read()
            .await
            .get(&post)
            .cloned()
            .unwrap_or_default()
    }

    /// Drops a comment from the cached list; true if it was there.
    pub async fn remove_comment(&self, post: PostId, comment: CommentId) -> bool {
        let mut comments = self.comments.write().await;
        match comments.get_mut(&post) {
            Some(slot) => {
                let before = slot.items.len();
                slot.items.retain(|c| c.id != comment);
                slot.items.len() != before
            }
            None => false,
        }
    }

    // notifications

    pub async fn replace_notifications(&self, notifications: Vec<Notification>) {
        self.notifications.write().await.replace(notifications);
    }

    pub async fn notifications(&self) -> Slot<Notification> {
        self.notifications.read().await.clone()
    }

    pub async fn unread_count(&self) -> usize {
        self.notifications
            .read()
            .await
            .items()
            .iter()
            .filter(|n| !n.is_read)
            .count()
    }

    /// Flips one read flag; true if the notification was unread.
    pub async fn mark_notification_read(&self, id: NotificationId) -> bool {
        let mut flipped = false;
        self.notifications.write().await.patch(|n| {
            if n.id == id && !n.is_read {
                n.is_read = true;
                flipped = true;
            }
        });
        flipped
    }

    pub async fn mark_all_notifications_read(&self) {
        self.notifications.write().await.patch(|n| n.is_read = true);
    }

    // friends

    pub async fn replace_friends(&self, friends: Vec<Profile>) {
        self.friends.write().await.replace(friends);
    }

    pub async fn friends(&self) -> Slot<Profile> {
        self.friends.read().await.clone()
    }

    pub async fn replace_friend_requests(&self, requests: Vec<FriendRequest>) {
        self.friend_requests.write().await.replace(requests);
    }

    pub async fn friend_requests(&self) -> Slot<FriendRequest> {
        self.friend_requests.read().await.clone()
    }

    pub async fn set_friend_count(&self, count: u64) {
        *self.friend_count.write().await = Some(count);
    }

    pub async fn friend_count(&self) -> Option<u64> {
        *self.friend_count.read().await
    }

    pub async fn record_outgoing_request(&self, target: ProfileId) {
        self.outgoing_requests.write().await.insert(target);
    }

    pub async fn has_outgoing_request(&self, target: ProfileId) -> bool {
        self.outgoing_requests.read().await.contains(&target)
    }

    pub async fn forget_outgoing_request(&self, target: ProfileId) {
        self.outgoing_requests.write().await.remove(&target);
    }

    // search

    pub async fn replace_search_results(&self, results: Vec<Profile>) {
        self.search_results.write().await.replace(results);
    }

    pub async fn clear_search_results(&self) {
        self.search_results.write().await.clear();
    }

    pub async fn search_results(&self) -> Slot<Profile> {
        self.search_results.read().await.clone()
    }

    /// Forgets everything tied to the signed-in user.
    pub async fn reset(&self) {
        self.profile_posts.write().await.clear();
        self.comments.write().await.clear();
        self.notifications.write().await.clear();
        self.friends.write().await.clear();
        self.friend_requests.write().await.clear();
        self.search_results.write().await.clear();
        self.liked_posts.write().await.clear();
        self.outgoing_requests.write().await.clear();
        *self.friend_count.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(like_count: u64) -> Post {
        Post {
            id: PostId::new(),
            author_id: ProfileId::new(),
            author: None,
            content: "hello".to_string(),
            media_url: None,
            like_count,
            comment_count: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_replace_is_wholesale() {
        let store = ViewModelStore::new();
        store.replace_posts(vec![post(1), post(2)]).await;
        let second = post(5);
        store.replace_posts(vec![second.clone()]).await;

        let posts = store.posts().await;
        assert_eq!(posts.items(), &[second]);
        assert_eq!(posts.generation(), 2);
        assert!(posts.is_loaded());
    }

    #[tokio::test]
    async fn test_like_count_never_negative() {
        let store = ViewModelStore::new();
        let p = post(0);
        let id = p.id;
        store.replace_posts(vec![p]).await;

        store.shift_like_count(id, -1).await;
        assert_eq!(store.like_counts(id).await, (Some(0), None));

        store.shift_like_count(id, 1).await;
        store.restore_like_counts(id, Some(0), None).await;
        assert_eq!(store.like_counts(id).await.0, Some(0));
    }

    #[tokio::test]
    async fn test_remove_comment() {
        let store = ViewModelStore::new();
        let post_id = PostId::new();
        let comment = Comment {
            id: CommentId::new(),
            post_id,
            author_id: ProfileId::new(),
            author: None,
            content: "nice".to_string(),
            created_at: Utc::now(),
        };
        store.replace_comments(post_id, vec![comment.clone()]).await;

        assert!(store.remove_comment(post_id, comment.id).await);
        assert!(!store.remove_comment(post_id, comment.id).await);
        assert!(store.comments(post_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_keeps_public_feed() {
        let store = ViewModelStore::new();
        store.replace_posts(vec![post(0)]).await;
        store.set_friend_count(3).await;
        store.record_outgoing_request(ProfileId::new()).await;

        store.reset().await;

        assert_eq!(store.posts().await.len(), 1);
        assert_eq!(store.friend_count().await, None);
        assert!(store.friends().await.is_empty());
    }
}
