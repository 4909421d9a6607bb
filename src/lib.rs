//! # Worklens Admission (route admission control)
//!
//! `worklens-admission` is the admission core of the Worklens recruitment
//! web client: for every navigation it decides whether the visitor may see
//! the requested screen, given possibly-expired session credentials, an
//! in-flight token refresh, role-based access rules, and a multi-step
//! onboarding-completion check.
//!
//! ## Decision engine
//!
//! [`controller::AdmissionController`] drives, in strict order, token
//! validation ([`token`]), the single-flight refresher ([`refresh`]), the
//! role gate ([`role`]), and the onboarding gate ([`onboarding`]), and
//! resolves every navigation to exactly one terminal
//! [`controller::AdmissionDecision`].
//!
//! - **Single-flight refresh:** concurrent guards demanding a valid access
//!   token coalesce onto one refresh call and observe the same outcome.
//! - **Fail-closed:** malformed tokens are expired, failed onboarding
//!   lookups are unmet criteria, and every collaborator error folds into
//!   the conservative decision (back to login or into onboarding).
//! - **Versioned identity:** the [`session::SessionStore`] bumps an epoch on
//!   every identity change, so cached onboarding verdicts invalidate
//!   deterministically and stale async results are discarded on arrival.
//!
//! This crate is a UX-level gate; real access control lives on the API.
//! Rendering, forms, and transport details stay outside, reached only
//! through the [`api::PlatformApi`] trait.

pub mod api;
pub mod config;
pub mod controller;
pub mod onboarding;
pub mod refresh;
pub mod role;
pub mod routes;
pub mod session;
pub mod token;

pub use api::{ApiError, HttpPlatformApi, PlatformApi};
pub use config::AppConfig;
pub use controller::{AdmissionController, AdmissionDecision};
pub use onboarding::{OnboardingGate, OnboardingStatus};
pub use refresh::{RefreshError, SessionRefresher};
pub use role::RoleVerdict;
pub use routes::{RouteClassification, classify};
pub use session::{Role, Session, SessionStore, UserProfile};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
