use tokio::sync::RwLock;

use crate::entities::{Profile, Session, SignUpForm};
use crate::error::{AppError, AppResult};

/// Authenticated identity and its profile, for as long as the client lives.
#[derive(Debug, Default)]
pub struct SessionCache {
    session: RwLock<Option<Session>>,
    profile: RwLock<Option<Profile>>,
    pending_sign_up: RwLock<Option<SignUpForm>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn current_profile(&self) -> Option<Profile> {
        self.profile.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Session for an action that needs one.
    pub async fn require_session(&self, message: &str) -> AppResult<Session> {
        self.current_session()
            .await
            .ok_or_else(|| AppError::Unauthorized(message.to_string()))
    }

    pub async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    pub async fn set_profile(&self, profile: Profile) {
        *self.profile.write().await = Some(profile);
    }

    pub async fn establish(&self, session: Session, profile: Profile) {
        self.set_profile(profile).await;
        self.set_session(session).await;
    }

    pub async fn clear(&self) {
        *self.session.write().await = None;
        *self.profile.write().await = None;
    }

    pub async fn remember_sign_up(&self, form: SignUpForm) {
        *self.pending_sign_up.write().await = Some(form);
    }

    pub async fn pending_sign_up(&self) -> Option<SignUpForm> {
        self.pending_sign_up.read().await.clone()
    }

    pub async fn forget_sign_up(&self) {
        *self.pending_sign_up.write().await = None;
    }
}
