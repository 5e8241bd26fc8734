//! Backend client: HTTP access to the pump-calculation API
//!
//! Covers the persistence contract (submit, datasheet download) and serves
//! as the production [`RecommendationSource`].

mod disposition;

pub use disposition::filename_from_disposition;

use crate::config::ApiConfig;
use crate::recommendations::{
    RecommendationSet, RecommendationSource, RequestContext, SourceError,
};
use crate::record::{to_persistence, EngineeringRecord, SubmissionStatus};
use async_trait::async_trait;
use reqwest::{header, RequestBuilder, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Backend client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(StatusCode),
    #[error("Submission rejected: {0}")]
    Rejected(String),
    #[error("A calculation with this document number already exists")]
    DuplicateDocumentNo,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Response missing calculation id")]
    MissingId,
}

impl ClientError {
    /// Steps the user can take to resolve the failure, when there are any.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            ClientError::DuplicateDocumentNo => Some(
                "Change the Document No. to a value not used by another calculation, \
                 or open the existing calculation and edit it instead.",
            ),
            ClientError::Rejected(_) => {
                Some("Correct the fields listed by the server and submit again.")
            }
            ClientError::Http(e) if e.is_timeout() || e.is_connect() => {
                Some("Check that the backend is running and the configured base_url is reachable.")
            }
            ClientError::ServerError(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Some("Set a valid API token in [api].auth_token or PUMPCALC_API_TOKEN.")
            }
            _ => None,
        }
    }

    /// Classify a 400 body. A body naming `document_no` that says "already
    /// exists" is the unique-document-number violation, whichever spelling
    /// the message text uses.
    fn from_rejection(body: String) -> Self {
        let lower = body.to_ascii_lowercase();
        if lower.contains("document_no") && lower.contains("already exists") {
            ClientError::DuplicateDocumentNo
        } else {
            ClientError::Rejected(body)
        }
    }
}

/// Datasheet output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DatasheetFormat {
    Xlsx,
    Pdf,
}

impl DatasheetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DatasheetFormat::Xlsx => "xlsx",
            DatasheetFormat::Pdf => "pdf",
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            DatasheetFormat::Xlsx => "generate_datasheet",
            DatasheetFormat::Pdf => "generate_pdf_datasheet",
        }
    }
}

impl fmt::Display for DatasheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A downloaded datasheet
#[derive(Debug, Clone)]
pub struct Datasheet {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Default filename when the server does not name the file.
pub fn fallback_filename(id: &str, format: DatasheetFormat) -> String {
    format!("pump_datasheet_{}.{}", id, format.extension())
}

/// HTTP client for the pump-calculation backend
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl BackendClient {
    /// Create a client from API settings
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config
                .auth_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
        })
    }

    /// Base URL for logging
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/pump-calculations/{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => req.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => req,
        }
    }

    /// Aggregated statistics for records matching `ctx`
    pub async fn field_recommendations(
        &self,
        ctx: &RequestContext,
    ) -> Result<RecommendationSet, ClientError> {
        let resp = self
            .authorize(self.http.get(self.url("field_recommendations/")))
            .query(&ctx.query_pairs())
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let body = resp.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
            status => Err(ClientError::ServerError(status)),
        }
    }

    /// Persist a calculation; returns the id assigned by the backend.
    pub async fn submit(
        &self,
        record: &EngineeringRecord,
        status: SubmissionStatus,
    ) -> Result<String, ClientError> {
        let payload = to_persistence(record, status);
        debug!(fields = payload.len(), status = status.as_str(), "Submitting calculation");

        let resp = self
            .authorize(self.http.post(self.url("")))
            .json(&payload)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => {
                let body: Value = resp.json().await?;
                let id = match body.get("id") {
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::String(s)) if !s.is_empty() => s.clone(),
                    _ => return Err(ClientError::MissingId),
                };
                info!(id = %id, status = status.as_str(), "Calculation submitted");
                Ok(id)
            }
            StatusCode::BAD_REQUEST => {
                let body = resp.text().await?;
                warn!(body = %body, "Submission rejected");
                Err(ClientError::from_rejection(body))
            }
            status => Err(ClientError::ServerError(status)),
        }
    }

    /// Download the generated datasheet for a saved calculation.
    pub async fn download_datasheet(
        &self,
        id: &str,
        format: DatasheetFormat,
    ) -> Result<Datasheet, ClientError> {
        let path = format!("{}/{}/", id, format.endpoint());
        let resp = self
            .authorize(self.http.get(self.url(&path)))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ClientError::ServerError(resp.status()));
        }

        let filename = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| fallback_filename(id, format));
        let bytes = resp.bytes().await?.to_vec();

        info!(id, filename = %filename, size = bytes.len(), "Datasheet downloaded");
        Ok(Datasheet { filename, bytes })
    }
}

#[async_trait]
impl RecommendationSource for BackendClient {
    async fn fetch_recommendations(
        &self,
        ctx: &RequestContext,
    ) -> Result<RecommendationSet, SourceError> {
        Ok(self.field_recommendations(ctx).await?)
    }

    fn source_name(&self) -> &str {
        &self.base_url
    }
}
