//! Collaborator interfaces consumed by the admission core. Everything behind
//! [`PlatformApi`] is a black box: the gates only need the narrow calls below
//! and fold every failure into a conservative verdict.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::UserProfile;

mod client;

pub use client::HttpPlatformApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("not authorized")]
    Unauthorized,
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("config error: {0}")]
    Config(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resume {
    pub id: String,
    pub file_name: String,
    pub uploaded_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoIntro {
    pub id: String,
    pub title: Option<String>,
    pub uploaded_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: String,
    pub company_name: String,
    pub industry: Option<String>,
}

/// Payload returned by the token endpoint on a successful refresh.
/// A rotated refresh token is optional; absent means the old one stays valid.
#[derive(Clone, Debug, Deserialize)]
pub struct RefreshedSession {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// The platform REST surface the admission core depends on.
///
/// Held as `Arc<dyn PlatformApi>` so tests can substitute counting doubles.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Fetch the authenticated user's profile.
    async fn get_current_user(&self) -> Result<UserProfile, ApiError>;

    /// List the user's uploaded resumes.
    async fn get_user_resumes(&self) -> Result<Vec<Resume>, ApiError>;

    /// List the user's introduction videos.
    async fn get_user_videos(&self) -> Result<Vec<VideoIntro>, ApiError>;

    /// Fetch the employer's company profile. `ApiError::NotFound` signals
    /// that employer onboarding is incomplete, not a failure.
    async fn get_employer_profile(&self) -> Result<CompanyProfile, ApiError>;

    /// Exchange a refresh token for a new session at the token endpoint.
    async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedSession, ApiError>;

    /// Best-effort server-side session invalidation. Local teardown proceeds
    /// even when this call fails.
    async fn logout(&self) -> Result<(), ApiError>;
}
