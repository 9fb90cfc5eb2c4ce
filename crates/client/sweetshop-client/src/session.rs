//! Session management: bearer token lifecycle, profile loading and the admin
//! capability flag.
//!
//! The token and the profile live behind a single lock. Requests never read a
//! shared header; they take a [`RequestConfig`] snapshot from
//! [`SessionManager::request_config`], so a login or logout is visible to the
//! very next request built after it returns.

use crate::api::{ApiClient, ApiError, RequestConfig};
use crate::error::ClientResult;
use crate::events::{Listeners, SubscriptionId};
use crate::store::{ADMIN_FLAG_KEY, SessionStore, TOKEN_KEY};
use crate::token;
use crate::types::{RegisterRequest, UserProfile};
use crate::ClientError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A persisted token was picked up at start-up
    Restored,
    LoggedIn { username: String },
    /// Profile fetched from the backend
    ProfileLoaded(UserProfile),
    /// Profile synthesized from the token payload because the backend could not provide one
    ProfileDegraded(UserProfile),
    LoggedOut,
}

/// Snapshot of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
    trust_token_admin_claim: bool,
    listeners: Listeners<SessionEvent>,
}

fn auth_error(error: ApiError, fallback: &str) -> ClientError {
    warn!(error = %error, "Authentication request failed");
    ClientError::auth(error.detail().unwrap_or(fallback))
}

impl SessionManager {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(SessionState::default()),
            trust_token_admin_claim: true,
            listeners: Listeners::new(),
        }
    }

    /// Whether the admin claim of a locally decoded token may grant the admin flag
    pub fn with_token_admin_claim(mut self, trusted: bool) -> Self {
        self.trust_token_admin_claim = trusted;
        self
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// Credentials for the next outgoing request
    pub async fn request_config(&self) -> RequestConfig {
        match self.state.read().await.token.as_deref() {
            Some(token) => RequestConfig::bearer(token),
            None => RequestConfig::anonymous(),
        }
    }

    /// Pick up a token persisted by an earlier run and load its profile.
    ///
    /// Returns whether a session was restored.
    pub async fn restore(&self) -> ClientResult<bool> {
        let Some(token) = self.store.get(TOKEN_KEY).await? else {
            debug!("No persisted session");
            return Ok(false);
        };

        {
            let mut state = self.state.write().await;
            state.token = Some(token);
            state.user = None;
        }
        info!("Restored persisted session");
        self.listeners.emit(&SessionEvent::Restored);

        self.load_user().await;
        Ok(true)
    }

    /// Exchange credentials for a token, persist it and load the profile
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        self.login_with_profile(username, password, None).await
    }

    async fn login_with_profile(
        &self,
        username: &str,
        password: &str,
        profile: Option<UserProfile>,
    ) -> ClientResult<()> {
        info!(username, "Logging in");

        let response = self
            .api
            .login(username, password)
            .await
            .map_err(|e| auth_error(e, LOGIN_FAILED))?;

        self.store.set(TOKEN_KEY, &response.access_token).await?;
        // The cached flag belongs to whoever was logged in before.
        if let Err(e) = self.store.remove(ADMIN_FLAG_KEY).await {
            warn!(error = %e, "Failed to clear cached admin flag");
        }

        {
            let mut state = self.state.write().await;
            state.token = Some(response.access_token);
            state.user = profile;
        }

        info!(username, "Logged in");
        self.listeners.emit(&SessionEvent::LoggedIn {
            username: username.to_string(),
        });

        self.load_user().await;
        Ok(())
    }

    /// Create an account, then log in with the same credentials
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ClientResult<()> {
        info!(username, "Registering account");

        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let profile = self
            .api
            .register(&request)
            .await
            .map_err(|e| auth_error(e, REGISTER_FAILED))?;

        self.login_with_profile(username, password, profile).await
    }

    /// Forget the session. Never fails; storage errors are only logged.
    pub async fn logout(&self) {
        {
            let mut state = self.state.write().await;
            *state = SessionState::default();
        }

        for key in [TOKEN_KEY, ADMIN_FLAG_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "Failed to clear persisted session value");
            }
        }

        info!("Logged out");
        self.listeners.emit(&SessionEvent::LoggedOut);
    }

    /// Fetch the profile of the current token.
    ///
    /// Falls back to the token's own claims when the backend cannot answer,
    /// and leaves the profile unset when those cannot be read either.
    pub async fn load_user(&self) {
        let Some(token) = self.token().await else {
            return;
        };

        match self.api.me(&RequestConfig::bearer(token.as_str())).await {
            Ok(profile) => {
                if !self.install_profile(&token, profile.clone()).await {
                    return;
                }
                self.persist_admin_flag(profile.is_admin).await;
                debug!(username = %profile.username, "Profile loaded");
                self.listeners.emit(&SessionEvent::ProfileLoaded(profile));
            }
            Err(e) => {
                warn!(error = %e, "Failed to load user profile, decoding token instead");
                self.load_user_from_token(&token).await;
            }
        }
    }

    async fn load_user_from_token(&self, token: &str) {
        let claims = match token::decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Token payload unreadable, session stays token-only");
                return;
            }
        };

        let Some(subject) = claims.sub.filter(|sub| !sub.is_empty()) else {
            debug!("Token payload has no subject claim");
            return;
        };

        let profile = UserProfile {
            id: 0,
            username: subject,
            email: String::new(),
            is_admin: self.trust_token_admin_claim && claims.is_admin,
        };

        if !self.install_profile(token, profile.clone()).await {
            return;
        }
        if profile.is_admin {
            self.persist_admin_flag(true).await;
        }

        info!(username = %profile.username, "Using profile decoded from token");
        self.listeners.emit(&SessionEvent::ProfileDegraded(profile));
    }

    /// Store the profile unless the session moved on while it was loading
    async fn install_profile(&self, token: &str, profile: UserProfile) -> bool {
        let mut state = self.state.write().await;
        if state.token.as_deref() != Some(token) {
            debug!("Session changed while loading profile, discarding it");
            return false;
        }
        state.user = Some(profile);
        true
    }

    async fn persist_admin_flag(&self, is_admin: bool) {
        let result = if is_admin {
            self.store.set(ADMIN_FLAG_KEY, "true").await
        } else {
            self.store.remove(ADMIN_FLAG_KEY).await
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist admin flag");
        }
    }

    /// Advisory capability check used to gate admin-only actions.
    ///
    /// The backend still authorizes every mutating request.
    pub async fn is_admin(&self) -> bool {
        {
            let state = self.state.read().await;
            if state.token.is_none() {
                return false;
            }
            if state.user.as_ref().is_some_and(|user| user.is_admin) {
                return true;
            }
        }

        matches!(
            self.store.get(ADMIN_FLAG_KEY).await,
            Ok(Some(flag)) if flag == "true"
        )
    }
}
