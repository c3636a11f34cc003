use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use super::{
    AuthBackend, AuthError, AuthSession, AuthUser, Profile, ProfileError, ProfileForm,
    SignUpOutcome,
};

/// What the frontend may see of the signed-in account. Tokens stay here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
    pub awaiting_confirmation: bool,
}

#[derive(Default)]
struct AuthState {
    session: Option<AuthSession>,
    profile: Option<Profile>,
    awaiting_confirmation: bool,
}

impl AuthState {
    fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            user: self.session.as_ref().map(|s| s.user.clone()),
            profile: self.profile.clone(),
            awaiting_confirmation: self.awaiting_confirmation,
        }
    }
}

#[derive(Clone)]
pub struct AuthController {
    backend: Option<Arc<dyn AuthBackend>>,
    state: Arc<Mutex<AuthState>>,
}

impl AuthController {
    /// `None` leaves every account operation failing with
    /// [`AuthError::NotConfigured`].
    pub fn new(backend: Option<Arc<dyn AuthBackend>>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(AuthState::default())),
        }
    }

    fn backend(&self) -> Result<&Arc<dyn AuthBackend>, AuthError> {
        self.backend.as_ref().ok_or(AuthError::NotConfigured)
    }

    pub async fn current(&self) -> AuthSnapshot {
        self.state.lock().await.snapshot()
    }

    async fn load_profile(&self, session: &AuthSession) -> Option<Profile> {
        let backend = self.backend.as_ref()?;
        match backend
            .fetch_profile(&session.access_token, &session.user.id)
            .await
        {
            Ok(profile) => profile,
            Err(err) => {
                log::warn!("Failed to load profile for {}: {err}", session.user.id);
                None
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSnapshot, AuthError> {
        let session = self.backend()?.sign_in(email.trim(), password).await?;
        let profile = self.load_profile(&session).await;
        log::info!("Signed in as {}", session.user.id);

        let mut state = self.state.lock().await;
        state.session = Some(session);
        state.profile = profile;
        state.awaiting_confirmation = false;
        Ok(state.snapshot())
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSnapshot, AuthError> {
        let outcome = self.backend()?.sign_up(email.trim(), password).await?;

        let mut state = self.state.lock().await;
        match outcome {
            SignUpOutcome::SignedIn(session) => {
                log::info!("Signed up and signed in as {}", session.user.id);
                state.session = Some(session);
                state.awaiting_confirmation = false;
            }
            SignUpOutcome::ConfirmationRequired(user) => {
                log::info!("Signed up {}; waiting for email confirmation", user.id);
                state.session = None;
                state.awaiting_confirmation = true;
            }
        }
        state.profile = None;
        Ok(state.snapshot())
    }

    /// Local state is cleared even when the remote call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = {
            let mut state = self.state.lock().await;
            state.profile = None;
            state.awaiting_confirmation = false;
            state.session.take()
        };

        if let (Some(session), Some(backend)) = (session, self.backend.as_ref()) {
            if let Err(err) = backend.sign_out(&session.access_token).await {
                log::warn!("Remote sign-out failed: {err}");
            }
        }
        Ok(())
    }

    /// Validates the account details form and stores it as the user's
    /// profile.
    pub async fn save_profile(&self, form: &ProfileForm) -> Result<Profile, ProfileError> {
        let session = self.state.lock().await.session.clone();
        let profile = form.validate(session.as_ref().map(|s| &s.user))?;
        let session = session.ok_or(ProfileError::NotAuthenticated)?;
        let backend = self.backend()?;

        let username = profile.username.as_deref().unwrap_or_default();
        if backend
            .username_taken(&session.access_token, username, &session.user.id)
            .await?
        {
            return Err(ProfileError::UsernameTaken);
        }

        backend
            .upsert_profile(&session.access_token, &profile)
            .await?;

        let mut state = self.state.lock().await;
        if state.session.as_ref().map(|s| &s.user.id) == Some(&session.user.id) {
            state.profile = Some(profile.clone());
        }
        Ok(profile)
    }
}
