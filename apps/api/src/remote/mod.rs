//! Remote marketplace client: the network boundary a hosted backend plugs
//! into.
//!
//! Mirrors the in-process API one call per operation, so swapping the local
//! authenticator for this client changes nothing for callers of the session
//! store. Retries on 429 and 5xx with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Applicant, Application, Credentials, Job, NewJob, Registration, SearchFilters, User,
};
use crate::session::Authenticator;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Gave up after {retries} retries")]
    Exhausted { retries: u32 },
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error: RemoteErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorDetail {
    message: String,
}

/// Which applications to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationScope {
    Job(Uuid),
    Applicant(Uuid),
}

impl ApplicationScope {
    fn query(&self) -> [(&'static str, String); 1] {
        match self {
            ApplicationScope::Job(id) => [("jobId", id.to_string())],
            ApplicationScope::Applicant(id) => [("applicantId", id.to_string())],
        }
    }
}

#[derive(Clone)]
pub struct MarketplaceClient {
    client: Client,
    base_url: String,
    backoff_base: Duration,
}

impl MarketplaceClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RemoteError::InvalidUrl(base_url));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            backoff_base: BACKOFF_BASE,
        })
    }

    /// Delay before the first retry; later retries double it.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<User, RemoteError> {
        self.send(Method::POST, "auth/login", |r| r.json(credentials))
            .await
    }

    pub async fn register(&self, registration: &Registration) -> Result<User, RemoteError> {
        self.send(Method::POST, "auth/register", |r| r.json(registration))
            .await
    }

    pub async fn list_jobs(&self, filters: &SearchFilters) -> Result<Vec<Job>, RemoteError> {
        let params = search_params(filters);
        self.send(Method::GET, "jobs", |r| r.query(&params)).await
    }

    pub async fn create_job(&self, data: &NewJob) -> Result<Job, RemoteError> {
        self.send(Method::POST, "jobs", |r| r.json(data)).await
    }

    pub async fn list_applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<Application>, RemoteError> {
        let params = scope.query();
        self.send(Method::GET, "applications", |r| r.query(&params))
            .await
    }

    pub async fn create_application(
        &self,
        job_id: Uuid,
        applicant: &Applicant,
    ) -> Result<Application, RemoteError> {
        let path = format!("jobs/{job_id}/applications");
        self.send(Method::POST, &path, |r| r.json(applicant)).await
    }

    /// Sends one request, retrying on rate limits and server errors, and
    /// decodes the JSON body.
    async fn send<T, F>(&self, method: Method, path: &str, build: F) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path);
        let mut last_error: Option<RemoteError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff(self.backoff_base, attempt);
                warn!(
                    "{method} {url} attempt {attempt} failed, retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build(self.client.request(method.clone(), &url)).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RemoteError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("{method} {url} returned {status}: {body}");
                last_error = Some(RemoteError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RemoteError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            debug!("{method} {url} succeeded with {status}");
            return Ok(response.json().await?);
        }

        Err(last_error.unwrap_or(RemoteError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

/// base, 2×base, 4×base...
fn backoff(base: Duration, attempt: u32) -> Duration {
    base * (1 << (attempt - 1))
}

/// Prefers the `error.message` of a structured error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<RemoteErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn search_params(filters: &SearchFilters) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    let present = |v: &&str| !v.trim().is_empty();
    if let Some(query) = filters.query.as_deref().filter(present) {
        params.push(("query", query.to_string()));
    }
    if let Some(location) = filters.location.as_deref().filter(present) {
        params.push(("location", location.to_string()));
    }
    if let Some(job_type) = filters.job_type {
        params.push(("type", job_type.to_string()));
    }
    params
}

/// Maps a remote 4xx onto the matching domain error so callers see the same
/// failures they would from the local authenticator.
fn into_app_error(e: RemoteError) -> AppError {
    match e {
        RemoteError::Api { status: 400 | 422, message } => AppError::Validation(message),
        RemoteError::Api { status: 401, .. } => AppError::Unauthorized,
        RemoteError::Api { status: 403, .. } => AppError::Forbidden,
        other => other.into(),
    }
}

#[async_trait]
impl Authenticator for MarketplaceClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AppError> {
        MarketplaceClient::authenticate(self, credentials)
            .await
            .map_err(into_app_error)
    }

    async fn register(&self, registration: &Registration) -> Result<User, AppError> {
        MarketplaceClient::register(self, registration)
            .await
            .map_err(into_app_error)
    }
}
