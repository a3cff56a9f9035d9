//! HTTP client for the find/replace backend
//!
//! Two calls matter: `POST /upload/` (multipart) and `POST /execute/` (JSON).
//! Failures are returned as [`ApiError`] and never retried.

use crate::core::models::{ErrorBody, ExecuteRequest, ExecuteResponse, UploadResponse};
use reqwest::{Client, StatusCode, multipart};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Errors surfaced by [`ApiClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Connection settings for the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `http://localhost:8000/api`
    pub api_base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000/api".to_string(),
        }
    }
}

/// Thin async wrapper over `reqwest::Client`; cheap to clone
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("sheetrx/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base: parse_base(&config.api_base)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, name: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(&format!("{}/", name))?)
    }

    /// Upload a local CSV/Excel file
    pub async fn upload(&self, path: &Path) -> Result<UploadResponse, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        info!("Uploading {} ({} bytes)", filename, bytes.len());

        let part = multipart::Part::bytes(bytes).file_name(filename);
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .http
            .post(self.endpoint("upload")?)
            .multipart(form)
            .send()
            .await?;
        decode(resp).await
    }

    /// Run a natural-language instruction against an uploaded file
    pub async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, ApiError> {
        info!(
            "Executing on file {} (chain={}): {}",
            request.file_id, request.chain, request.instruction
        );
        let resp = self
            .http
            .post(self.endpoint("execute")?)
            .json(request)
            .send()
            .await?;
        decode(resp).await
    }

    /// Fetch an exported CSV to `dest`; returns the number of bytes written
    pub async fn download(&self, link: &str, dest: &Path) -> Result<usize, ApiError> {
        let url = self.resolve_download_url(link)?;
        debug!("Downloading {} to {}", url, dest.display());
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        let bytes = resp.bytes().await?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len())
    }

    /// Absolute links pass through; relative ones resolve against the API origin
    pub fn resolve_download_url(&self, link: &str) -> Result<Url, ApiError> {
        resolve_download_url(&self.base, link)
    }
}

/// The API base as a directory URL so `join` appends instead of replacing
fn parse_base(api_base: &str) -> Result<Url, ApiError> {
    let trimmed = api_base.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Ok(Url::parse(&with_slash)?)
}

/// Resolve a download link against the origin (scheme, host, port) of `base`
pub fn resolve_download_url(base: &Url, link: &str) -> Result<Url, ApiError> {
    match Url::parse(link) {
        Ok(abs) => Ok(abs),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let origin = Url::parse(&base.origin().ascii_serialization())?;
            let path = if link.starts_with('/') {
                link.to_string()
            } else {
                format!("/{}", link)
            };
            Ok(origin.join(&path)?)
        }
        Err(e) => Err(e.into()),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| body.chars().take(200).collect());
        return Err(ApiError::Status {
            status,
            body: message,
        });
    }
    Ok(serde_json::from_str(&body)?)
}
