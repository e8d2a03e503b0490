//! Contact form submissions stored in the hosted `contact_submissions` table.
//!
//! Talks to Supabase's PostgREST endpoint. Every public operation returns a
//! `SubmissionResult` instead of an error, so form handlers can show the
//! message directly.

use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, error, warn};

pub const TABLE: &str = "contact_submissions";
pub const DEFAULT_RECENT_LIMIT: u32 = 50;

/// Shown to visitors when the failure is not something they can fix.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again.";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    New,
    Read,
    Responded,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Read => "read",
            SubmissionStatus::Responded => "responded",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(SubmissionStatus::New),
            "read" => Ok(SubmissionStatus::Read),
            "responded" => Ok(SubmissionStatus::Responded),
            other => Err(ContactError::Validation(format!(
                "Unknown status '{}' (expected new, read or responded)",
                other
            ))),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("request to the contact store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from the contact store: {0}")]
    Decode(String),
}

impl ContactError {
    /// Transport failures, 429 and 5xx are transient; everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            ContactError::Transport(_) => true,
            ContactError::Backend { status, .. } => *status == 429 || *status >= 500,
            ContactError::Validation(_) | ContactError::Decode(_) => false,
        }
    }
}

/// Form input as entered by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
    pub message: String,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            organization: None,
            message: message.into(),
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::Validation("Name is required".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(ContactError::Validation("Email is required".to_string()));
        }
        let email_regex =
            EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
        if !email_regex.is_match(self.email.trim()) {
            return Err(ContactError::Validation(format!(
                "Invalid email address: {}",
                self.email.trim()
            )));
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::Validation("Message is required".to_string()));
        }
        Ok(())
    }

    /// Organization with blank input treated as absent.
    fn organization(&self) -> Option<&str> {
        self.organization
            .as_deref()
            .map(str::trim)
            .filter(|org| !org.is_empty())
    }
}

/// Row inserted for a new submission.
#[derive(Debug, Serialize)]
struct NewSubmission<'a> {
    name: &'a str,
    email: &'a str,
    organization: Option<&'a str>,
    message: &'a str,
    status: SubmissionStatus,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: SubmissionStatus,
}

/// Primary key of a stored row: a serial number, or text such as a uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionId::Number(n) => write!(f, "{}", n),
            SubmissionId::Text(t) => f.write_str(t),
        }
    }
}

impl From<i64> for SubmissionId {
    fn from(id: i64) -> Self {
        SubmissionId::Number(id)
    }
}

impl FromStr for SubmissionId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse()
            .map(SubmissionId::Number)
            .unwrap_or_else(|_| SubmissionId::Text(s.to_string())))
    }
}

/// Stored row as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: SubmissionId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
    pub message: String,
    pub status: SubmissionStatus,
    /// `None` when absent or in an unrecognised format
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// RFC 3339, or a `timestamp` column without offset (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Outcome reported to callers: data on success, a readable message on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> SubmissionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// PostgREST error body; only the message is shown.
#[derive(Debug, Deserialize)]
struct BackendError {
    message: String,
}

#[derive(Debug, Clone)]
pub struct ContactClient {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
    retry: RetryConfig,
}

impl ContactClient {
    pub fn new(client: reqwest::Client, project_url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
            retry: RetryConfig::backend_call(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let (url, key) = config.contact_credentials()?;
        Ok(Self::new(reqwest::Client::new(), url, key))
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Store a new submission with status `new`.
    pub async fn submit(&self, form: &ContactForm) -> SubmissionResult<Vec<ContactSubmission>> {
        match self.try_submit(form).await {
            Ok(rows) => {
                debug!("Stored contact submission from {}", form.email.trim());
                SubmissionResult::ok(rows)
            }
            Err(ContactError::Validation(message)) => SubmissionResult::failure(message),
            Err(ContactError::Backend { status, message }) => {
                error!("Contact store rejected submission ({}): {}", status, message);
                SubmissionResult::failure(message)
            }
            Err(e) => {
                error!("Unexpected error storing contact submission: {}", e);
                SubmissionResult::failure(GENERIC_FAILURE)
            }
        }
    }

    /// Most recent submissions, newest first.
    pub async fn recent(&self, limit: u32) -> SubmissionResult<Vec<ContactSubmission>> {
        let result = with_retry_if(
            &self.retry,
            "Fetch contact submissions",
            || self.try_recent(limit),
            ContactError::is_retryable,
        )
        .await;

        match result {
            Ok(rows) => SubmissionResult::ok(rows),
            Err(e) => {
                error!("Failed to fetch contact submissions: {}", e);
                SubmissionResult::failure(e.to_string())
            }
        }
    }

    pub async fn update_status(
        &self,
        id: impl Into<SubmissionId>,
        status: SubmissionStatus,
    ) -> SubmissionResult<()> {
        let id = id.into();
        let result = with_retry_if(
            &self.retry,
            "Update submission status",
            || self.try_update_status(&id, status),
            ContactError::is_retryable,
        )
        .await;

        match result {
            Ok(()) => SubmissionResult::ok(()),
            Err(e) => {
                error!("Failed to update submission {}: {}", id, e);
                SubmissionResult::failure(e.to_string())
            }
        }
    }

    async fn try_submit(&self, form: &ContactForm) -> Result<Vec<ContactSubmission>, ContactError> {
        form.validate()?;

        let row = NewSubmission {
            name: form.name.trim(),
            email: form.email.trim(),
            organization: form.organization(),
            message: &form.message,
            status: SubmissionStatus::New,
        };

        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;

        // The row is stored once the insert succeeds; an unexpected
        // representation must not turn that into a failure.
        let body = check_status(response).await?.text().await?;
        match decode_rows(&body) {
            Ok(rows) => Ok(rows),
            Err(e) => {
                warn!("Submission stored but response was not understood: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn try_recent(&self, limit: u32) -> Result<Vec<ContactSubmission>, ContactError> {
        let response = self
            .request(Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        read_rows(response).await
    }

    async fn try_update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<(), ContactError> {
        let response = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(&StatusUpdate { status })
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, TABLE))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ContactError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ContactError::Backend {
        status,
        message: backend_message(&body, status),
    })
}

async fn read_rows(response: reqwest::Response) -> Result<Vec<ContactSubmission>, ContactError> {
    let body = check_status(response).await?.text().await?;
    decode_rows(&body)
}

fn decode_rows(body: &str) -> Result<Vec<ContactSubmission>, ContactError> {
    serde_json::from_str(body).map_err(|e| ContactError::Decode(e.to_string()))
}

fn backend_message(body: &str, status: u16) -> String {
    match serde_json::from_str::<BackendError>(body) {
        Ok(err) => err.message,
        Err(_) if body.trim().is_empty() => format!("Contact store returned status {}", status),
        Err(_) => body.trim().to_string(),
    }
}
