//! Session state for the web client. A single process-wide [`SessionStore`]
//! owns the authenticated identity; guards and gates read it, and only the
//! session refresher and login/logout flows mutate it. Every identity change
//! bumps an epoch so cached verdicts tagged with an older epoch invalidate
//! deterministically instead of relying on observers to notice.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Personas recognized by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JobSeeker,
    Employer,
}

/// Profile record for the authenticated user.
/// Mirrors the API payload and contains no secrets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserProfile {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// True when the user holds both recognized personas; the UI offers a
    /// dashboard switch instead of a hard denial in that case.
    #[must_use]
    pub fn holds_both_roles(&self) -> bool {
        self.has_role(Role::JobSeeker) && self.has_role(Role::Employer)
    }

    /// Name, phone, and a complete postal address are the profile criteria
    /// for job-seeker onboarding.
    #[must_use]
    pub fn contact_details_complete(&self) -> bool {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        present(&self.first_name)
            && present(&self.last_name)
            && present(&self.phone)
            && present(&self.address_line)
            && present(&self.city)
            && present(&self.postal_code)
    }
}

/// The authenticated session: identity plus bearer credentials.
/// The refresh token never leaves this struct unredacted.
#[derive(Clone, Debug)]
pub struct Session {
    pub user: UserProfile,
    pub access_token: Option<String>,
    pub refresh_token: Option<SecretString>,
}

/// Identity tag for cached verdicts: which user, and which epoch of the
/// store they were computed against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub epoch: u64,
}

#[derive(Default)]
struct StoreState {
    session: Option<Session>,
    epoch: u64,
}

/// Process-wide owner of the current session. Cheap to clone; all clones
/// share the same state.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreState>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Option<Session> {
        self.inner.read().await.session.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.session.is_some()
    }

    /// The current identity tag, if a session is present.
    pub async fn identity(&self) -> Option<Identity> {
        let state = self.inner.read().await;
        state.session.as_ref().map(|session| Identity {
            user_id: session.user.id.clone(),
            epoch: state.epoch,
        })
    }

    pub async fn epoch(&self) -> u64 {
        self.inner.read().await.epoch
    }

    /// Install a session after login, signup, or token refresh. The epoch is
    /// bumped only when the user identity actually changes, so a routine
    /// token rotation keeps identity-tagged caches valid.
    pub async fn install(&self, session: Session) {
        let mut state = self.inner.write().await;
        let same_identity = state
            .session
            .as_ref()
            .is_some_and(|current| current.user.id == session.user.id);
        if !same_identity {
            state.epoch += 1;
            debug!(epoch = state.epoch, "session identity changed");
        }
        state.session = Some(session);
    }

    /// Update profile fields in place without touching credentials or epoch.
    pub async fn update_user(&self, user: UserProfile) {
        let mut state = self.inner.write().await;
        if let Some(session) = state.session.as_mut() {
            session.user = user;
        }
    }

    /// Tear the session down (logout or unrecoverable refresh failure).
    pub async fn clear(&self) {
        let mut state = self.inner.write().await;
        if state.session.take().is_some() {
            state.epoch += 1;
            debug!(epoch = state.epoch, "session cleared");
        }
    }
}
