//! Session handling against the hosted auth service
//!
//! The entity store only consumes the current user identity; everything else
//! here exists so callers can establish and tear down that identity.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::Error;
use crate::fetch::Fetch;
use crate::CLIENT_INFO;

/// Client for the hosted auth service.
///
/// Cheap to clone; all clones share the same session slot, so the entity
/// store observes sign-in and sign-out through its own handle.
#[derive(Clone)]
pub struct SessionClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session, shared across clones
    session: Arc<Mutex<Option<Session>>>,
}

impl SessionClient {
    /// Create a new SessionClient
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Sign up a new user with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/signup");
        self.authenticate(&url, email, password).await
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/token?grant_type=password");
        self.authenticate(&url, email, password).await
    }

    async fn authenticate(
        &self,
        url: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, Error> {
        let mut body = HashMap::new();
        body.insert("email".to_string(), email.to_string());
        body.insert("password".to_string(), password.to_string());

        let result = Fetch::post(&self.client, url)
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;

        // Store session if one was returned
        if let Some(session) = result.session() {
            let mut current_session = self.lock_session();
            *current_session = Some(session);
        }

        Ok(result)
    }

    /// Sign out the current user and clear the stored session
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");

        let token = {
            let current_session = self.lock_session();
            match *current_session {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::NotAuthenticated),
            }
        };

        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .bearer_auth(&token)
            .execute_no_content()
            .await?;

        let mut current_session = self.lock_session();
        *current_session = None;

        Ok(())
    }

    /// Get the current session
    pub fn session(&self) -> Option<Session> {
        self.lock_session().clone()
    }

    /// Get the current user id, when a session is active
    pub fn user_id(&self) -> Option<String> {
        self.lock_session().as_ref().map(|s| s.user_id.clone())
    }

    /// Get the current access token, when a session is active
    pub fn access_token(&self) -> Option<String> {
        self.lock_session().as_ref().map(|s| s.access_token.clone())
    }

    /// Replace the stored session, e.g. when restoring a persisted one
    pub fn set_session(&self, session: Session) {
        let mut current_session = self.lock_session();
        *current_session = Some(session);
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        // A poisoned lock only happens if a holder panicked; the slot itself
        // is still valid.
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The user ID
    pub user_id: String,

    /// The token type
    pub token_type: String,

    /// The expiry time in seconds
    pub expires_in: i64,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a new session
    pub fn new(
        access_token: String,
        refresh_token: String,
        user_id: String,
        expires_in: i64,
    ) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs() as i64;

        Self {
            access_token,
            refresh_token,
            user_id,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at: Some(now + expires_in),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs() as i64;

            now >= expires_at
        } else {
            false
        }
    }
}

/// Authentication response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// The user data
    pub user: Option<User>,

    /// An explicit session, when the service returns one
    #[serde(default)]
    pub session: Option<Session>,

    /// The access token
    pub access_token: Option<String>,

    /// The refresh token
    pub refresh_token: Option<String>,

    /// The token type
    pub token_type: Option<String>,

    /// The expiry time in seconds
    pub expires_in: Option<i64>,
}

impl AuthResponse {
    /// Resolve the session carried by this response.
    ///
    /// The auth service usually returns the token fields at the top level
    /// with the user nested; assemble a session from those when no explicit
    /// one is present.
    pub fn session(&self) -> Option<Session> {
        if let Some(session) = &self.session {
            return Some(session.clone());
        }

        let access_token = self.access_token.clone()?;
        let user_id = self.user.as_ref().map(|u| u.id.clone())?;
        Some(Session::new(
            access_token,
            self.refresh_token.clone().unwrap_or_default(),
            user_id,
            self.expires_in.unwrap_or(0),
        ))
    }
}

/// User data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: Option<String>,

    /// The user's phone number
    pub phone: Option<String>,

    /// The creation time
    pub created_at: Option<String>,

    /// The user metadata
    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,
}
