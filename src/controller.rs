//! Route admission controller: one race-free, idempotent decision per
//! navigation. For every target it drives token validation, the single-flight
//! refresher, the role gate, and the onboarding gate in strict order, and
//! resolves to exactly one terminal decision. Every collaborator failure
//! folds into the conservative branch; no error escapes [`AdmissionController::admit`].
//!
//! This is a UX-level guard; real access control lives on the API.

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::api::PlatformApi;
use crate::config::AppConfig;
use crate::onboarding::{OnboardingGate, OnboardingStatus};
use crate::refresh::SessionRefresher;
use crate::role::{self, RoleVerdict};
use crate::routes::{self, RoleRequirement, RouteClassification, Visibility};
use crate::session::{Role, Session, SessionStore, UserProfile};
use crate::token;

/// Terminal output for one navigation attempt. `Loading` is only ever
/// observed through [`AdmissionController::admit_watch`] before the terminal
/// decision arrives; `admit` itself always resolves past it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionDecision {
    Allow,
    RedirectTo(String),
    DenyRole { required: Role },
    Loading,
}

/// Named states of the per-navigation machine, driven by a single transition
/// routine so no two observers can see inconsistent intermediate flags.
/// Internal bookkeeping; callers only ever see `Loading` and the terminal
/// decision.
#[derive(Clone, Copy, Debug)]
enum GuardState {
    Init,
    ValidatingToken,
    Refreshing,
    CheckingRole,
    CheckingOnboarding,
    Resolved,
}

struct NavigationAttempt {
    seq: u64,
    state: GuardState,
}

impl NavigationAttempt {
    fn new(seq: u64) -> Self {
        Self {
            seq,
            state: GuardState::Init,
        }
    }

    fn transition(&mut self, next: GuardState) {
        trace!(seq = self.seq, from = ?self.state, to = ?next, "guard transition");
        self.state = next;
    }
}

pub struct AdmissionController {
    store: SessionStore,
    refresher: SessionRefresher,
    onboarding: OnboardingGate,
    /// Monotonic navigation counter, used to correlate the log lines of
    /// concurrent attempts.
    nav_seq: AtomicU64,
}

impl AdmissionController {
    pub fn new(store: SessionStore, api: Arc<dyn PlatformApi>, config: &AppConfig) -> Self {
        let refresher =
            SessionRefresher::new(store.clone(), Arc::clone(&api), config.check_timeout);
        let onboarding = OnboardingGate::new(store.clone(), api, config.check_timeout);
        Self {
            store,
            refresher,
            onboarding,
            nav_seq: AtomicU64::new(0),
        }
    }

    /// Decide admission for one navigation target (path plus optional query
    /// string). Always resolves to a terminal decision.
    pub async fn admit(&self, target: &str) -> AdmissionDecision {
        let seq = self.next_seq();
        self.admit_with_seq(seq, target).await
    }

    /// Reactive form of [`admit`](Self::admit) for guard components: the
    /// receiver observes `Loading` until the terminal decision arrives.
    /// Dropping the receiver (the guard unmounted mid-check) cancels the
    /// pending work, so a stale result is never committed anywhere. Guards
    /// mounted simultaneously each run to their own terminal decision.
    pub fn admit_watch(self: &Arc<Self>, target: &str) -> watch::Receiver<AdmissionDecision> {
        let (sender, receiver) = watch::channel(AdmissionDecision::Loading);
        let controller = Arc::clone(self);
        let target = target.to_string();
        let seq = self.next_seq();

        tokio::spawn(async move {
            tokio::select! {
                decision = controller.admit_with_seq(seq, &target) => {
                    // Only fails when the guard unmounted in the same
                    // instant; either way the decision dies here.
                    let _ = sender.send(decision);
                }
                () = sender.closed() => {
                    debug!(seq, "guard unmounted before admission resolved");
                }
            }
        });

        receiver
    }

    /// Best-effort server logout followed by unconditional local teardown.
    pub async fn logout(&self) {
        self.refresher.logout().await;
    }

    /// The onboarding gate's cached status, for UI that renders progress.
    pub async fn onboarding_status(&self) -> OnboardingStatus {
        self.onboarding.status().await
    }

    fn next_seq(&self) -> u64 {
        self.nav_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn admit_with_seq(&self, seq: u64, target: &str) -> AdmissionDecision {
        let (path, query) = split_target(target);
        let classification = routes::classify(path);
        let mut attempt = NavigationAttempt::new(seq);

        let decision = match classification.visibility {
            Visibility::Public => {
                self.admit_public(&mut attempt, query, &classification).await
            }
            Visibility::Protected => {
                self.admit_protected(&mut attempt, query, &classification)
                    .await
            }
        };

        attempt.transition(GuardState::Resolved);
        debug!(seq, path, decision = ?decision, "admission resolved");
        decision
    }

    async fn admit_protected(
        &self,
        attempt: &mut NavigationAttempt,
        query: Option<&str>,
        classification: &RouteClassification,
    ) -> AdmissionDecision {
        attempt.transition(GuardState::ValidatingToken);

        let Some(session) = self.store.snapshot().await else {
            return redirect_to_signin(classification, query);
        };
        if session.access_token.is_none() && session.refresh_token.is_none() {
            return redirect_to_signin(classification, query);
        }

        if !has_valid_access_token(&session) {
            attempt.transition(GuardState::Refreshing);
        }
        if self.refresher.ensure_valid_access_token().await.is_err() {
            return redirect_to_signin(classification, query);
        }

        // Refresh may have rotated the user record; decide against the
        // verified identity.
        let Some(session) = self.store.snapshot().await else {
            return redirect_to_signin(classification, query);
        };

        attempt.transition(GuardState::CheckingRole);
        match role::evaluate(classification, &session.user) {
            RoleVerdict::Deny { required } => {
                return AdmissionDecision::DenyRole { required };
            }
            RoleVerdict::Allow | RoleVerdict::AllowMultiRole => {}
        }

        if classification.onboarding_exempt {
            return AdmissionDecision::Allow;
        }

        attempt.transition(GuardState::CheckingOnboarding);
        let persona = route_persona(classification, &session.user);
        match self.onboarding.verdict(persona).await {
            OnboardingStatus::Complete => AdmissionDecision::Allow,
            // Incomplete, or a check that could not resolve: fail closed
            // into the onboarding flow rather than hanging in loading.
            _ => AdmissionDecision::RedirectTo(onboarding_path(persona).to_string()),
        }
    }

    /// Public routes steer an authenticated visitor away: to onboarding when
    /// incomplete, otherwise to the `redirect` target or the persona's
    /// dashboard. Sign-up is never intercepted so its own success handler
    /// can navigate first.
    async fn admit_public(
        &self,
        attempt: &mut NavigationAttempt,
        query: Option<&str>,
        classification: &RouteClassification,
    ) -> AdmissionDecision {
        if classification.intercept_exempt {
            return AdmissionDecision::Allow;
        }

        attempt.transition(GuardState::ValidatingToken);
        let Some(session) = self.store.snapshot().await else {
            return AdmissionDecision::Allow;
        };
        // Only a currently-valid token earns a redirect away; an expired
        // session may stay on the public page it asked for.
        if !has_valid_access_token(&session) {
            return AdmissionDecision::Allow;
        }

        attempt.transition(GuardState::CheckingOnboarding);
        let persona = session_persona(&session.user);
        match self.onboarding.verdict(persona).await {
            OnboardingStatus::Complete => {
                let target = query
                    .and_then(|q| query_param(q, "redirect"))
                    .filter(|t| t.starts_with('/'))
                    .unwrap_or_else(|| dashboard_path(persona).to_string());
                AdmissionDecision::RedirectTo(target)
            }
            _ => AdmissionDecision::RedirectTo(onboarding_path(persona).to_string()),
        }
    }
}

fn has_valid_access_token(session: &Session) -> bool {
    let now = Utc::now().timestamp();
    session
        .access_token
        .as_deref()
        .is_some_and(|access_token| !token::is_expired(access_token, now))
}

fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Unauthenticated visitors go to the sign-in flavor matching the route's
/// role requirement, carrying an `intent` parameter (preserved when the
/// original target already had one).
fn redirect_to_signin(
    classification: &RouteClassification,
    query: Option<&str>,
) -> AdmissionDecision {
    let (signin, default_intent) = match classification.role_requirement {
        RoleRequirement::Employer => ("/employer-signin", "employer"),
        RoleRequirement::JobSeeker | RoleRequirement::None => ("/signin", "user"),
    };
    let intent = query
        .and_then(|q| query_param(q, "intent"))
        .unwrap_or_else(|| default_intent.to_string());
    AdmissionDecision::RedirectTo(format!("{signin}?intent={intent}"))
}

/// Persona the onboarding gate should check for a protected route: the
/// route's requirement wins; otherwise the user's own roles decide.
fn route_persona(classification: &RouteClassification, user: &UserProfile) -> Role {
    match classification.role_requirement {
        RoleRequirement::Employer => Role::Employer,
        RoleRequirement::JobSeeker => Role::JobSeeker,
        RoleRequirement::None => session_persona(user),
    }
}

fn session_persona(user: &UserProfile) -> Role {
    if user.has_role(Role::Employer) && !user.has_role(Role::JobSeeker) {
        Role::Employer
    } else {
        Role::JobSeeker
    }
}

fn onboarding_path(persona: Role) -> &'static str {
    match persona {
        Role::JobSeeker => "/onboarding",
        Role::Employer => "/employer-onboarding",
    }
}

fn dashboard_path(persona: Role) -> &'static str {
    match persona {
        Role::JobSeeker => "/user-dashboard",
        Role::Employer => "/employer-dashboard",
    }
}
