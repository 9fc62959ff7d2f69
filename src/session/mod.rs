//! Authentication state shared by every API consumer.
//!
//! A [`Session`] replaces process-wide token globals: it is created once at start-up
//! (reading whatever the [`SessionStore`] persisted), handed to the repository client,
//! and cleared on logout.

use crate::api::ApiClient;
use crate::error::SessionError;
use derive_more::derive::Display;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

pub mod store;

pub use store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UserRole {
    #[display("ADMIN")]
    Admin,
    #[display("CONSULTANT")]
    Consultant,
    #[display("STUDENT")]
    Student,
}

impl UserRole {
    // anything the server sends that we do not know gets the least privileged role
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("ADMIN") => UserRole::Admin,
            Some("CONSULTANT") => UserRole::Consultant,
            _ => UserRole::Student,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl AuthenticatedUser {
    pub fn role(&self) -> UserRole {
        UserRole::parse(self.role.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user: AuthenticatedUser,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

pub struct Session {
    api: ApiClient,
    store: Option<SessionStore>,
    state: RwLock<Option<StoredSession>>,
}

impl Session {
    /// Restores any persisted token. A missing file is an anonymous session.
    pub fn init(api: ApiClient, store: SessionStore) -> Result<Self, SessionError> {
        let restored = store.load()?;
        if restored.is_some() {
            info!(path = %store.path().display(), "Restored stored session");
        }

        Ok(Self {
            api,
            store: Some(store),
            state: RwLock::new(restored),
        })
    }

    /// A session that never touches disk.
    pub fn in_memory(api: ApiClient) -> Self {
        Self {
            api,
            store: None,
            state: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn user(&self) -> Option<AuthenticatedUser> {
        self.state.read().await.as_ref().and_then(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, SessionError> {
        let url = self.api.endpoint("api/auth/login")?;
        let builder = self
            .api
            .request(Method::POST, url, None)
            .json(&LoginRequest { email, password });
        let response: LoginResponse = self.api.send_json(builder).await?;

        let session = StoredSession {
            access_token: response.access_token,
            user: Some(response.user.clone()),
        };
        self.replace(Some(session)).await?;
        info!(email = %response.user.email, "Logged in");
        Ok(response.user)
    }

    /// Tells the server, then always forgets the local session even if the call failed.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Some(token) = self.token().await {
            let url = self.api.endpoint("api/auth/logout")?;
            let builder = self.api.request(Method::POST, url, Some(&token));
            if let Err(e) = self.api.send_json::<serde_json::Value>(builder).await {
                warn!(error = %e, "Logout request failed, clearing local session anyway");
            }
        }

        self.replace(None).await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn me(&self) -> Result<AuthenticatedUser, SessionError> {
        let token = self.token().await.ok_or(SessionError::NotAuthenticated)?;
        let url = self.api.endpoint("api/auth/me")?;
        let builder = self.api.request(Method::GET, url, Some(&token));
        Ok(self.api.send_json(builder).await?)
    }

    pub async fn refresh(&self) -> Result<(), SessionError> {
        let token = self.token().await;
        let url = self.api.endpoint("api/auth/refresh")?;
        let builder = self.api.request(Method::POST, url, token.as_deref());
        let response: RefreshResponse = self.api.send_json(builder).await?;

        let user = self.user().await;
        self.replace(Some(StoredSession {
            access_token: response.access_token,
            user,
        }))
        .await?;
        info!("Refreshed access token");
        Ok(())
    }

    /// Route guard: validates the token with the server, refreshing it once if rejected.
    pub async fn guard(&self) -> Result<AuthenticatedUser, SessionError> {
        if !self.is_authenticated().await {
            return Err(SessionError::NotAuthenticated);
        }

        match self.me().await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(error = %e, "Token rejected, trying refresh");
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "Refresh failed");
                    return Err(SessionError::NotAuthenticated);
                }
                match self.me().await {
                    Ok(user) => Ok(user),
                    Err(_) => self.user().await.ok_or(SessionError::NotAuthenticated),
                }
            }
        }
    }

    fn persist(&self, session: Option<&StoredSession>) -> Result<(), SessionError> {
        match (&self.store, session) {
            (Some(store), Some(session)) => store.save(session),
            (Some(store), None) => store.clear(),
            (None, _) => Ok(()),
        }
    }

    // disk first, so memory is never ahead of what a restart would restore
    async fn replace(&self, session: Option<StoredSession>) -> Result<(), SessionError> {
        self.persist(session.as_ref())?;
        *self.state.write().await = session;
        Ok(())
    }
}
