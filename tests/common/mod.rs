#![allow(dead_code)]

//! Test doubles and fixtures shared by the integration suites.

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use secrecy::SecretString;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;
use std::time::Duration;

use worklens_admission::api::{
    ApiError, CompanyProfile, PlatformApi, RefreshedSession, Resume, VideoIntro,
};
use worklens_admission::session::{Role, Session, UserProfile};

#[derive(Default)]
pub struct CallCounts {
    pub current_user: AtomicUsize,
    pub resumes: AtomicUsize,
    pub videos: AtomicUsize,
    pub employer_profile: AtomicUsize,
    pub refresh: AtomicUsize,
    pub logout: AtomicUsize,
}

/// Counting in-memory stand-in for the platform REST surface.
#[derive(Default)]
pub struct MockPlatformApi {
    pub user: Mutex<Option<UserProfile>>,
    pub resumes: Mutex<Vec<Resume>>,
    pub videos: Mutex<Vec<VideoIntro>>,
    pub company: Mutex<Option<CompanyProfile>>,
    /// `None` makes the refresh endpoint reject the request.
    pub refresh_response: Mutex<Option<RefreshedSession>>,
    pub refresh_delay: Mutex<Option<Duration>>,
    pub lookup_delay: Mutex<Option<Duration>>,
    pub calls: CallCounts,
}

impl MockPlatformApi {
    fn refresh_latency(&self) -> Option<Duration> {
        *self.refresh_delay.lock().unwrap()
    }

    fn lookup_latency(&self) -> Option<Duration> {
        *self.lookup_delay.lock().unwrap()
    }

    async fn simulate(&self, latency: Option<Duration>) {
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PlatformApi for MockPlatformApi {
    async fn get_current_user(&self) -> Result<UserProfile, ApiError> {
        self.calls.current_user.fetch_add(1, SeqCst);
        self.simulate(self.lookup_latency()).await;
        match self.user.lock().unwrap().clone() {
            Some(user) => Ok(user),
            None => Err(ApiError::Http {
                status: 500,
                message: "profile unavailable".to_string(),
            }),
        }
    }

    async fn get_user_resumes(&self) -> Result<Vec<Resume>, ApiError> {
        self.calls.resumes.fetch_add(1, SeqCst);
        self.simulate(self.lookup_latency()).await;
        Ok(self.resumes.lock().unwrap().clone())
    }

    async fn get_user_videos(&self) -> Result<Vec<VideoIntro>, ApiError> {
        self.calls.videos.fetch_add(1, SeqCst);
        self.simulate(self.lookup_latency()).await;
        Ok(self.videos.lock().unwrap().clone())
    }

    async fn get_employer_profile(&self) -> Result<CompanyProfile, ApiError> {
        self.calls.employer_profile.fetch_add(1, SeqCst);
        self.simulate(self.lookup_latency()).await;
        match self.company.lock().unwrap().clone() {
            Some(company) => Ok(company),
            None => Err(ApiError::NotFound),
        }
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<RefreshedSession, ApiError> {
        self.calls.refresh.fetch_add(1, SeqCst);
        self.simulate(self.refresh_latency()).await;
        match self.refresh_response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(ApiError::Unauthorized),
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.calls.logout.fetch_add(1, SeqCst);
        Ok(())
    }
}

/// A profile satisfying the job-seeker contact criteria.
pub fn complete_profile(id: &str, roles: &[Role]) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        email: format!("{id}@example.test"),
        first_name: Some("Dana".to_string()),
        last_name: Some("Okafor".to_string()),
        phone: Some("+44 20 0000 0000".to_string()),
        address_line: Some("1 Harbour Way".to_string()),
        city: Some("Leeds".to_string()),
        postal_code: Some("LS1 1AA".to_string()),
        roles: roles.to_vec(),
    }
}

pub fn resume(id: &str) -> Resume {
    Resume {
        id: id.to_string(),
        file_name: format!("{id}.pdf"),
        uploaded_at: None,
    }
}

pub fn video(id: &str) -> VideoIntro {
    VideoIntro {
        id: id.to_string(),
        title: Some("Introduction".to_string()),
        uploaded_at: None,
    }
}

pub fn company(id: &str) -> CompanyProfile {
    CompanyProfile {
        id: id.to_string(),
        company_name: "Brightside Logistics".to_string(),
        industry: None,
    }
}

/// Unsigned bearer token whose `exp` is `now + offset_seconds`.
pub fn access_token(subject: &str, offset_seconds: i64) -> String {
    let exp = Utc::now().timestamp() + offset_seconds;
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(
        format!(r#"{{"sub":"{subject}","exp":{exp}}}"#).as_bytes(),
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn session_with_tokens(
    user: UserProfile,
    access_token: Option<String>,
    refresh_token: Option<&str>,
) -> Session {
    Session {
        user,
        access_token,
        refresh_token: refresh_token.map(|token| SecretString::from(token.to_string())),
    }
}
