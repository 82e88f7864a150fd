// NexusClient - the explicit state container every operation runs against
//
// Loaders fetch from the backend and replace a store slot. Actions validate
// locally, mutate remotely, then refresh. Failures are logged, surfaced as a
// notice and leave every slot as it was.

pub mod auth;
pub mod comments;
pub mod feed;
pub mod friends;
pub mod likes;
pub mod navigation;
pub mod notifications;
pub mod profile;
pub mod search;

pub use auth::ProfileSeed;
pub use friends::RequestOutcome;

use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::entities::Session;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Backend, Debouncer};
use crate::state::{LikeGate, NoticeKind, SessionCache, UiState, ViewModelStore};

#[derive(Debug, Clone)]
pub struct NexusClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    backend: Arc<dyn Backend>,
    config: Config,
    session: SessionCache,
    store: ViewModelStore,
    ui: UiState,
    likes: LikeGate,
    search: Debouncer,
    /// Serializes session changes, whether the client or a pushed event
    /// makes them.
    auth_gate: Mutex<()>,
    auth_listener: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(handle) = self.auth_listener.get_mut().take() {
            handle.abort();
        }
    }
}

impl NexusClient {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        let search = Debouncer::new(config.debounce_window());
        Self {
            inner: Arc::new(ClientInner {
                backend,
                config,
                session: SessionCache::new(),
                store: ViewModelStore::new(),
                ui: UiState::new(),
                likes: LikeGate::new(),
                search,
                auth_gate: Mutex::new(()),
                auth_listener: Mutex::new(None),
            }),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionCache {
        &self.inner.session
    }

    pub fn store(&self) -> &ViewModelStore {
        &self.inner.store
    }

    pub fn ui(&self) -> &UiState {
        &self.inner.ui
    }

    pub(crate) fn like_gate(&self) -> &LikeGate {
        &self.inner.likes
    }

    pub(crate) fn search_debouncer(&self) -> &Debouncer {
        &self.inner.search
    }

    pub(crate) fn auth_gate(&self) -> &Mutex<()> {
        &self.inner.auth_gate
    }

    /// Starts forwarding backend auth events into the session cache. Idempotent.
    pub async fn listen_for_auth_events(&self) {
        let mut listener = self.inner.auth_listener.lock().await;
        if listener.is_some() {
            return;
        }

        let mut events = self.backend().subscribe_auth_events();
        let client: Weak<ClientInner> = Arc::downgrade(&self.inner);
        *listener = Some(tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Auth listener lagged, skipped {} events", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(inner) = client.upgrade() else {
                    break;
                };
                NexusClient { inner }.handle_auth_event(event).await;
            }
            debug!("Auth listener stopped");
        }));
    }

    /// Session for an action that needs one; surfaces `message` when absent.
    pub(crate) async fn require_session(&self, message: &str) -> AppResult<Session> {
        let session = self.session().require_session(message).await;
        self.surface(message, session).await
    }

    /// Logs a failed step and puts it in front of the user. Local rejections
    /// show their own message, remote failures show `context`.
    pub(crate) async fn report(&self, context: &str, err: &AppError) {
        match err {
            AppError::Validation(msg) | AppError::Unauthorized(msg) | AppError::Forbidden(msg) => {
                warn!("{}: {}", context, msg);
                self.ui().raise(NoticeKind::Error, msg.clone()).await;
            }
            _ => {
                error!("{}: {}", context, err);
                self.ui().raise(NoticeKind::Error, context).await;
            }
        }
    }

    /// Passes `result` through, reporting it first if it failed.
    pub(crate) async fn surface<T>(&self, context: &str, result: AppResult<T>) -> AppResult<T> {
        if let Err(err) = &result {
            self.report(context, err).await;
        }
        result
    }

    pub(crate) async fn succeed(&self, message: &str) {
        self.ui().raise(NoticeKind::Success, message).await;
    }

    pub(crate) async fn inform(&self, message: &str) {
        self.ui().raise(NoticeKind::Info, message).await;
    }
}
