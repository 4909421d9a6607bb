//! Single-flight token refresh. Multiple guards and components may demand a
//! valid access token at once during a navigation burst; exactly one refresh
//! call reaches the token endpoint and every concurrent caller observes the
//! same outcome. A failed refresh tears the session down, so callers treat
//! it as "not authenticated" and route to login.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time;
use tracing::{debug, warn};

use crate::api::PlatformApi;
use crate::session::{Session, SessionStore};
use crate::token;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// Neither an access nor a refresh token is present; no network call
    /// was made.
    #[error("no credentials present")]
    NotAuthenticated,
    /// The refresh token was rejected, the endpoint failed, or the call
    /// timed out. The session has been cleared.
    #[error("token refresh failed")]
    RefreshFailed,
}

enum TokenState {
    Valid(String),
    NeedsRefresh,
    Missing,
}

pub struct SessionRefresher {
    store: SessionStore,
    api: Arc<dyn PlatformApi>,
    /// Serializes refresh attempts; waiters re-check the store after
    /// acquiring it, so one network call serves every caller.
    refresh_lock: Mutex<()>,
    timeout: Duration,
}

impl SessionRefresher {
    pub fn new(store: SessionStore, api: Arc<dyn PlatformApi>, timeout: Duration) -> Self {
        Self {
            store,
            api,
            refresh_lock: Mutex::new(()),
            timeout,
        }
    }

    /// Return a currently-valid access token, refreshing if necessary.
    ///
    /// # Errors
    /// `NotAuthenticated` when no credentials exist; `RefreshFailed` when the
    /// refresh attempt (ours or the one we coalesced onto) did not produce a
    /// valid token.
    pub async fn ensure_valid_access_token(&self) -> Result<String, RefreshError> {
        match self.token_state().await {
            TokenState::Valid(access_token) => return Ok(access_token),
            TokenState::Missing => return Err(RefreshError::NotAuthenticated),
            TokenState::NeedsRefresh => {}
        }

        let _guard = self.refresh_lock.lock().await;

        // Re-check: the refresh we waited on may have already resolved.
        match self.token_state().await {
            TokenState::Valid(access_token) => return Ok(access_token),
            // We entered with credentials; an empty store here means the
            // attempt we coalesced onto failed and cleared the session.
            TokenState::Missing => return Err(RefreshError::RefreshFailed),
            TokenState::NeedsRefresh => {}
        }

        self.refresh_once().await
    }

    /// Best-effort server-side invalidation followed by local teardown.
    /// The local session is cleared even when the server call fails.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            debug!(error = %err, "server-side logout failed");
        }
        self.store.clear().await;
    }

    async fn token_state(&self) -> TokenState {
        let Some(session) = self.store.snapshot().await else {
            return TokenState::Missing;
        };

        let now = Utc::now().timestamp();
        if let Some(access_token) = session.access_token.as_deref() {
            if !token::is_expired(access_token, now) {
                return TokenState::Valid(access_token.to_string());
            }
        }

        if session.refresh_token.is_some() {
            TokenState::NeedsRefresh
        } else {
            TokenState::Missing
        }
    }

    async fn refresh_once(&self) -> Result<String, RefreshError> {
        let refresh_token = match self.store.snapshot().await {
            Some(session) => match session.refresh_token {
                Some(refresh_token) => refresh_token,
                None => return Err(RefreshError::NotAuthenticated),
            },
            None => return Err(RefreshError::NotAuthenticated),
        };

        let started = Instant::now();
        let outcome = time::timeout(
            self.timeout,
            self.api.refresh_session(refresh_token.expose_secret()),
        )
        .await;

        match outcome {
            Ok(Ok(refreshed)) => {
                let latency_ms = started.elapsed().as_millis();
                debug!(latency_ms, "session refresh completed");
                let rotated = refreshed
                    .refresh_token
                    .map(SecretString::from)
                    .or(Some(refresh_token));
                self.store
                    .install(Session {
                        user: refreshed.user,
                        access_token: Some(refreshed.access_token.clone()),
                        refresh_token: rotated,
                    })
                    .await;
                Ok(refreshed.access_token)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "session refresh rejected");
                self.logout().await;
                Err(RefreshError::RefreshFailed)
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "session refresh timed out");
                self.logout().await;
                Err(RefreshError::RefreshFailed)
            }
        }
    }
}
