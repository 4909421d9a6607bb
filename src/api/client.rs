//! `reqwest`-backed implementation of [`PlatformApi`] with a shared client,
//! a uniform timeout policy, and bounded error bodies. No tokens are stored
//! here; callers pass credentials per request.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{ApiError, CompanyProfile, PlatformApi, RefreshedSession, Resume, VideoIntro};
use crate::config::AppConfig;
use crate::session::UserProfile;

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

pub struct HttpPlatformApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPlatformApi {
    /// Build a client against the configured API base URL.
    ///
    /// # Errors
    /// Returns an error when the base URL is missing or unparsable, or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let base = config.api_base_url.trim();
        if base.is_empty() {
            return Err(ApiError::Config(
                "API base URL is not configured".to_string(),
            ));
        }
        let base_url =
            Url::parse(base).map_err(|err| ApiError::Config(format!("invalid base URL: {err}")))?;

        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.check_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Config(format!("invalid endpoint {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        handle_json_response(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        handle_json_response(response).await
    }

    async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        handle_empty_response(response).await
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[async_trait]
impl PlatformApi for HttpPlatformApi {
    async fn get_current_user(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/v1/me").await
    }

    async fn get_user_resumes(&self) -> Result<Vec<Resume>, ApiError> {
        self.get_json("/v1/me/resumes").await
    }

    async fn get_user_videos(&self) -> Result<Vec<VideoIntro>, ApiError> {
        self.get_json("/v1/me/videos").await
    }

    async fn get_employer_profile(&self) -> Result<CompanyProfile, ApiError> {
        self.get_json("/v1/employer/profile").await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedSession, ApiError> {
        self.post_json("/v1/auth/refresh", &RefreshRequest { refresh_token })
            .await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty("/v1/auth/logout").await
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

fn map_status(status: StatusCode) -> Option<ApiError> {
    match status {
        StatusCode::NOT_FOUND => Some(ApiError::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(ApiError::Unauthorized),
        _ => None,
    }
}

fn truncate_error_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_CHARS).collect()
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(status, response).await);
    }
    response
        .json()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(status, response).await);
    }
    Ok(())
}

async fn error_from_response(status: StatusCode, response: Response) -> ApiError {
    if let Some(err) = map_status(status) {
        return err;
    }
    let body = response.text().await.unwrap_or_default();
    ApiError::Http {
        status: status.as_u16(),
        message: truncate_error_body(&body),
    }
}
