use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn};

use super::NexusClient;
use crate::config::ProfileDefaults;
use crate::core::validation::{
    non_blank, validate_profile_names, validate_sign_up_passwords, validate_verification_code,
};
use crate::core::ProfileId;
use crate::entities::{AuthEvent, NewProfile, Profile, Session, SignUpForm, UserMetadata};
use crate::error::{AppError, AppResult};
use crate::state::Page;

/// What a freshly created profile row is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSeed {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
}

impl ProfileSeed {
    pub fn from_metadata(metadata: &UserMetadata, defaults: &ProfileDefaults) -> Self {
        Self {
            first_name: non_blank(metadata.first_name.as_deref())
                .unwrap_or_else(|| defaults.first_name.clone()),
            last_name: non_blank(metadata.last_name.as_deref())
                .unwrap_or_else(|| defaults.last_name.clone()),
            date_of_birth: None,
            phone: None,
        }
    }

    pub fn from_form(form: &SignUpForm, defaults: &ProfileDefaults) -> Self {
        Self {
            first_name: non_blank(Some(&form.first_name))
                .unwrap_or_else(|| defaults.first_name.clone()),
            last_name: non_blank(Some(&form.last_name))
                .unwrap_or_else(|| defaults.last_name.clone()),
            date_of_birth: form.date_of_birth,
            phone: non_blank(form.phone.as_deref()),
        }
    }

    fn new_profile(&self, id: ProfileId) -> NewProfile {
        NewProfile {
            id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            phone: self.phone.clone(),
        }
    }

    /// Local-only profile used when the backend could not provide one.
    pub fn local_stub(&self, id: ProfileId, defaults: &ProfileDefaults) -> Profile {
        let now = Utc::now();
        Profile {
            id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: None,
            bio: Some(defaults.bio.clone()),
            avatar_url: Some(defaults.avatar_url.clone()),
            website: None,
            phone: self.phone.clone(),
            date_of_birth: self.date_of_birth,
            created_at: now,
            updated_at: now,
        }
    }
}

impl NexusClient {
    /// Restores an existing session, if any, and lands on the matching page.
    pub async fn init(&self) -> Page {
        self.listen_for_auth_events().await;
        self.ui().set_page(Page::Loading).await;

        let restored = {
            let _gate = self.auth_gate().lock().await;
            match self.backend().current_user().await {
                Ok(Some(session)) => {
                    info!("Restoring session for {}", session.email);
                    let seed =
                        ProfileSeed::from_metadata(&session.metadata, &self.config().profile);
                    self.adopt_session(session, seed).await;
                    true
                }
                Ok(None) => false,
                Err(err) => {
                    error!("Failed to restore session: {}", err);
                    false
                }
            }
        };

        if restored {
            self.navigate(Page::Feed).await
        } else {
            self.navigate(Page::Auth).await
        }
    }

    /// Applies a pushed auth event. A sign-in for another user goes through
    /// the same profile resolution as an explicit sign-in.
    pub async fn handle_auth_event(&self, event: AuthEvent) {
        let _gate = self.auth_gate().lock().await;
        if self.is_stale(&event).await {
            debug!("Ignoring stale auth event {:?}", event);
            return;
        }

        match event {
            AuthEvent::SignedIn(session) => {
                let current = self.session().current_session().await;
                if current.map(|s| s.user_id) == Some(session.user_id) {
                    return;
                }
                info!("Auth event: signed in as {}", session.email);
                let seed = ProfileSeed::from_metadata(&session.metadata, &self.config().profile);
                self.adopt_session(session, seed).await;
            }
            AuthEvent::SignedOut => {
                if self.session().is_authenticated().await {
                    info!("Auth event: signed out");
                }
                self.forget_user().await;
                self.ui().set_page(Page::Auth).await;
            }
        }
    }

    /// Events arrive after the fact. One the backend has already moved past
    /// is dropped; when the backend cannot be asked, the event is trusted.
    async fn is_stale(&self, event: &AuthEvent) -> bool {
        let live = match self.backend().current_user().await {
            Ok(live) => live.map(|s| s.user_id),
            Err(err) => {
                warn!("Could not confirm auth event: {}", err);
                return false;
            }
        };
        match event {
            AuthEvent::SignedIn(session) => live != Some(session.user_id),
            AuthEvent::SignedOut => live.is_some(),
        }
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_up(&self, form: SignUpForm) -> AppResult<()> {
        let checked = validate_sign_up_passwords(&form.password, &form.confirm_password)
            .and_then(|_| validate_profile_names(&form.first_name, &form.last_name));
        self.surface("Sign up failed", checked).await?;

        let request = form.to_request();
        self.surface("Sign up failed", self.backend().sign_up(request).await)
            .await?;

        self.session().remember_sign_up(form).await;
        self.succeed("Verification code sent to your email!").await;
        self.ui().set_page(Page::Verification).await;
        Ok(())
    }

    pub async fn verify_email_code(&self, code: &str) -> AppResult<Session> {
        let code = code.trim();
        self.surface("Verification failed", validate_verification_code(code))
            .await?;

        let pending = self.session().pending_sign_up().await.ok_or_else(|| {
            AppError::Validation("No sign-up is waiting for verification".to_string())
        });
        let form = self.surface("Verification failed", pending).await?;

        let session = {
            let _gate = self.auth_gate().lock().await;
            let verified = self
                .backend()
                .verify_email_code(form.email.trim(), code)
                .await;
            let session = self.surface("Invalid verification code", verified).await?;

            let seed = ProfileSeed::from_form(&form, &self.config().profile);
            self.adopt_session(session.clone(), seed).await;
            session
        };
        self.session().forget_sign_up().await;

        info!("Email verified for {}", session.email);
        self.succeed("Email verified successfully! Welcome to Nexus!")
            .await;
        self.navigate(Page::Feed).await;
        Ok(session)
    }

    pub async fn resend_verification_code(&self) -> AppResult<()> {
        let pending = self.session().pending_sign_up().await.ok_or_else(|| {
            AppError::Validation("No sign-up is waiting for verification".to_string())
        });
        let form = self.surface("Failed to resend code", pending).await?;

        self.surface(
            "Failed to resend code",
            self.backend().resend_verification(form.email.trim()).await,
        )
        .await?;
        self.succeed("Verification code resent!").await;
        Ok(())
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            let err = AppError::Validation("Please enter your email and password".to_string());
            self.report("Sign in failed", &err).await;
            return Err(err);
        }

        let session = {
            let _gate = self.auth_gate().lock().await;
            let session = self
                .surface(
                    "Invalid email or password",
                    self.backend().sign_in(email, password).await,
                )
                .await?;

            let seed = ProfileSeed::from_metadata(&session.metadata, &self.config().profile);
            self.adopt_session(session.clone(), seed).await;
            session
        };

        info!("Signed in as {}", session.email);
        self.succeed("Welcome back!").await;
        self.navigate(Page::Feed).await;
        Ok(session)
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        {
            let _gate = self.auth_gate().lock().await;
            self.surface("Failed to sign out", self.backend().sign_out().await)
                .await?;
            self.forget_user().await;
        }
        self.ui().set_page(Page::Auth).await;
        self.succeed("Signed out successfully").await;
        Ok(())
    }

    /// Fetch, else create, else stub. Never fails.
    pub async fn resolve_profile(&self, session: &Session, seed: ProfileSeed) -> Profile {
        let id = session.user_id;
        match self.backend().get_profile(id).await {
            Ok(Some(profile)) => return profile,
            Ok(None) => info!("No profile for {} yet, creating one", id),
            Err(err) => warn!("Failed to fetch profile for {}: {}", id, err),
        }

        match self.backend().create_profile(seed.new_profile(id)).await {
            Ok(profile) => profile,
            Err(err) => {
                error!("Failed to create profile for {}, using local defaults: {}", id, err);
                seed.local_stub(id, &self.config().profile)
            }
        }
    }

    /// Installs `session` with its resolved profile. Anything cached for a
    /// different user is dropped first, so the profile id always matches the
    /// session's user id. Callers hold the auth gate.
    async fn adopt_session(&self, session: Session, seed: ProfileSeed) {
        let previous = self.session().current_session().await.map(|s| s.user_id);
        if previous.is_some_and(|id| id != session.user_id) {
            info!("Switching user, dropping state cached for the previous one");
            self.forget_user().await;
        }

        let profile = self.resolve_profile(&session, seed).await;
        self.session().establish(session, profile).await;
    }

    async fn forget_user(&self) {
        self.search_debouncer().cancel();
        self.session().clear().await;
        self.store().reset().await;
        self.ui().reset().await;
        self.like_gate().prune().await;
    }
}
