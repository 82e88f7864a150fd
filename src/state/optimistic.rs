// Two-phase optimistic mutations: apply locally, confirm remotely, revert on
// failure. Likes on the same post are serialized so a second toggle always
// starts from a confirmed state.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::core::PostId;
use crate::error::AppResult;
use crate::state::store::ViewModelStore;

/// A local change that can be undone from the snapshot it hands back.
#[async_trait]
pub trait Reversible: Send + Sync {
    type Snapshot: Send;

    async fn apply(&self) -> Self::Snapshot;
    async fn revert(&self, snapshot: Self::Snapshot);
}

/// Applies `change`, then awaits `remote`. A failed remote call restores the
/// exact pre-change state before the error is returned.
pub async fn apply_optimistically<R, T, F>(change: &R, remote: F) -> AppResult<T>
where
    R: Reversible,
    F: Future<Output = AppResult<T>> + Send,
{
    let snapshot = change.apply().await;
    match remote.await {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!("Optimistic change rejected remotely, reverting: {}", err);
            change.revert(snapshot).await;
            Err(err)
        }
    }
}

/// Flips the liked flag of one post and moves its counters by one.
pub struct LikeToggle<'a> {
    store: &'a ViewModelStore,
    post: PostId,
    like: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikeSnapshot {
    was_liked: bool,
    feed_count: Option<u64>,
    profile_count: Option<u64>,
}

impl<'a> LikeToggle<'a> {
    pub fn new(store: &'a ViewModelStore, post: PostId, like: bool) -> Self {
        Self { store, post, like }
    }

    pub fn is_like(&self) -> bool {
        self.like
    }
}

#[async_trait]
impl<'a> Reversible for LikeToggle<'a> {
    type Snapshot = LikeSnapshot;

    async fn apply(&self) -> LikeSnapshot {
        let was_liked = self.store.is_liked(self.post).await;
        let (feed_count, profile_count) = self.store.like_counts(self.post).await;

        self.store.set_liked(self.post, self.like).await;
        self.store
            .shift_like_count(self.post, if self.like { 1 } else { -1 })
            .await;

        LikeSnapshot {
            was_liked,
            feed_count,
            profile_count,
        }
    }

    async fn revert(&self, snapshot: LikeSnapshot) {
        self.store.set_liked(self.post, snapshot.was_liked).await;
        self.store
            .restore_like_counts(self.post, snapshot.feed_count, snapshot.profile_count)
            .await;
    }
}

/// Per-post serialization of like mutations.
#[derive(Debug, Default)]
pub struct LikeGate {
    locks: Mutex<HashMap<PostId, Arc<Mutex<()>>>>,
}

impl LikeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Held for the whole apply/confirm/revert cycle of one toggle.
    pub async fn acquire(&self, post: PostId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(post)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        if let Ok(guard) = Arc::clone(&lock).try_lock_owned() {
            return guard;
        }
        debug!(post = %post, "waiting for in-flight like toggle");
        lock.lock_owned().await
    }

    /// Drops locks nobody is holding.
    pub async fn prune(&self) {
        self.locks
            .lock()
            .await
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
