//! Onboarding gate: decides whether the current identity has completed the
//! multi-step onboarding process by querying independent pieces of external
//! state, and caches the verdict until the session identity changes. Every
//! sub-query failure counts as that criterion being unmet.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time;
use tracing::{debug, warn};

use crate::api::{ApiError, PlatformApi};
use crate::session::{Identity, Role, SessionStore};

/// Verdict lifecycle: `Unknown → Checking → {Complete, Incomplete}`.
/// The gate never starts a second check while one is in flight for the same
/// identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnboardingStatus {
    #[default]
    Unknown,
    Checking,
    Complete,
    Incomplete,
}

#[derive(Default)]
struct CachedVerdict {
    identity: Option<Identity>,
    status: OnboardingStatus,
}

pub struct OnboardingGate {
    api: Arc<dyn PlatformApi>,
    store: SessionStore,
    cache: RwLock<CachedVerdict>,
    check_lock: Mutex<()>,
    timeout: Duration,
}

impl OnboardingGate {
    pub fn new(store: SessionStore, api: Arc<dyn PlatformApi>, timeout: Duration) -> Self {
        Self {
            api,
            store,
            cache: RwLock::new(CachedVerdict::default()),
            check_lock: Mutex::new(()),
            timeout,
        }
    }

    /// The cached status for the current identity, without triggering a
    /// check. `Unknown` when unauthenticated or the cache is stale.
    pub async fn status(&self) -> OnboardingStatus {
        let Some(identity) = self.store.identity().await else {
            return OnboardingStatus::Unknown;
        };
        let cache = self.cache.read().await;
        if cache.identity.as_ref() == Some(&identity) {
            cache.status
        } else {
            OnboardingStatus::Unknown
        }
    }

    /// Resolve the onboarding verdict for the current identity under the
    /// given persona, running the external checks if no cached verdict
    /// applies. Always terminates in `Complete` or `Incomplete` for an
    /// authenticated session; `Unknown` only when there is none.
    pub async fn verdict(&self, persona: Role) -> OnboardingStatus {
        let Some(identity) = self.store.identity().await else {
            return OnboardingStatus::Unknown;
        };

        if let Some(status) = self.cached(&identity).await {
            return status;
        }

        let _guard = self.check_lock.lock().await;

        // A concurrent check for this identity may have resolved while we
        // waited for the lock.
        if let Some(status) = self.cached(&identity).await {
            return status;
        }

        self.commit(&identity, OnboardingStatus::Checking).await;

        let complete = match time::timeout(self.timeout, self.run_check(persona)).await {
            Ok(complete) => complete,
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "onboarding check timed out"
                );
                false
            }
        };

        let status = if complete {
            OnboardingStatus::Complete
        } else {
            OnboardingStatus::Incomplete
        };

        // Discard the result if the identity moved on while we were
        // checking; committing it would poison the new identity's cache.
        if self.store.identity().await.as_ref() == Some(&identity) {
            self.commit(&identity, status).await;
        } else {
            debug!("discarding onboarding verdict for superseded identity");
        }

        status
    }

    async fn cached(&self, identity: &Identity) -> Option<OnboardingStatus> {
        let cache = self.cache.read().await;
        if cache.identity.as_ref() != Some(identity) {
            return None;
        }
        match cache.status {
            OnboardingStatus::Complete | OnboardingStatus::Incomplete => Some(cache.status),
            OnboardingStatus::Unknown | OnboardingStatus::Checking => None,
        }
    }

    async fn commit(&self, identity: &Identity, status: OnboardingStatus) {
        let mut cache = self.cache.write().await;
        cache.identity = Some(identity.clone());
        cache.status = status;
    }

    async fn run_check(&self, persona: Role) -> bool {
        match persona {
            Role::JobSeeker => self.job_seeker_complete().await,
            Role::Employer => self.employer_complete().await,
        }
    }

    /// Job-seeker completeness: full contact details AND at least one resume
    /// AND at least one introduction video. The three lookups have no
    /// ordering dependency and run concurrently.
    async fn job_seeker_complete(&self) -> bool {
        let (profile, resumes, videos) = tokio::join!(
            self.api.get_current_user(),
            self.api.get_user_resumes(),
            self.api.get_user_videos(),
        );

        let profile_complete = match profile {
            Ok(user) => user.contact_details_complete(),
            Err(err) => {
                debug!(error = %err, "profile lookup failed");
                false
            }
        };
        let has_resume = match resumes {
            Ok(list) => !list.is_empty(),
            Err(err) => {
                debug!(error = %err, "resume lookup failed");
                false
            }
        };
        let has_video = match videos {
            Ok(list) => !list.is_empty(),
            Err(err) => {
                debug!(error = %err, "video lookup failed");
                false
            }
        };

        profile_complete && has_resume && has_video
    }

    /// Employer completeness: a company profile exists. Not-found is the
    /// expected "incomplete" signal, not an error.
    async fn employer_complete(&self) -> bool {
        match self.api.get_employer_profile().await {
            Ok(_) => true,
            Err(ApiError::NotFound) => false,
            Err(err) => {
                debug!(error = %err, "employer profile lookup failed");
                false
            }
        }
    }
}
