//! Text-recognition service client for saved crops.
//!
//! Enabled with the `ocr-service` feature. The service is an external HTTP
//! endpoint; its base URL and timeout are injected through
//! [`ServiceConfig`]. Requests are sent only after a save has completed,
//! using the [`SavedArtifact`] the sink returned.

use std::thread::JoinHandle;
use std::time::Duration;

use base64::Engine;
use pdfsnip_core::{CroppedImage, Stage, StageError};
use thiserror::Error;
use tracing::{debug, info};

use crate::sink::SavedArtifact;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:3000`.
    pub base_url: String,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors from the text-recognition service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The HTTP client could not be built or the request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The dispatch thread panicked.
    #[error("dispatch thread panicked")]
    Dispatch,
}

impl ServiceError {
    /// Tag as a [`Stage::FetchText`] failure.
    pub fn into_stage_error(self) -> StageError<ServiceError> {
        StageError::new(Stage::FetchText, self)
    }
}

/// Blocking client for the text-recognition service.
#[derive(Debug, Clone)]
pub struct OcrClient {
    config: ServiceConfig,
    http: reqwest::blocking::Client,
}

impl OcrClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Request`] if the HTTP client cannot be built.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Ask the service to read a saved PDF by path:
    /// `GET {base}/extract/text?pdfPath=<path>`. Returns the body verbatim.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Request`] on transport failure,
    /// [`ServiceError::Status`] on a non-2xx answer.
    pub fn text_for_saved_pdf(&self, saved: &SavedArtifact) -> Result<String, ServiceError> {
        let url = format!("{}/extract/text", self.config.base_url);
        let path = saved.path.to_string_lossy();
        debug!(%url, pdf_path = %path, "requesting text for saved PDF");
        let response = self
            .http
            .get(&url)
            .query(&[("pdfPath", path.as_ref())])
            .send()?;
        read_body(response)
    }

    /// Send a crop as base64 PNG:
    /// `POST {base}/api/extracttext` with `{"image": "<base64>"}`.
    /// Returns the body verbatim.
    ///
    /// # Errors
    ///
    /// As [`text_for_saved_pdf`](OcrClient::text_for_saved_pdf).
    pub fn text_for_image(&self, image: &CroppedImage) -> Result<String, ServiceError> {
        let url = format!("{}/api/extracttext", self.config.base_url);
        let encoded = base64::engine::general_purpose::STANDARD.encode(image.png_bytes());
        debug!(%url, png_bytes = image.png_bytes().len(), "requesting text for image");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "image": encoded }))
            .send()?;
        read_body(response)
    }

    /// Run [`text_for_saved_pdf`](OcrClient::text_for_saved_pdf) on a
    /// worker thread. Call with the value a sink returned, so the request
    /// starts only once the file is fully written.
    pub fn dispatch_after_save(&self, saved: SavedArtifact) -> JoinHandle<Result<String, ServiceError>> {
        let client = self.clone();
        std::thread::spawn(move || client.text_for_saved_pdf(&saved))
    }
}

/// Wait for a dispatched request.
///
/// # Errors
///
/// The request's own error, or [`ServiceError::Dispatch`] if the worker
/// panicked.
pub fn join_dispatch(handle: JoinHandle<Result<String, ServiceError>>) -> Result<String, ServiceError> {
    handle.join().map_err(|_| ServiceError::Dispatch)?
}

fn read_body(response: reqwest::blocking::Response) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }
    info!(bytes = body.len(), "received extracted text");
    Ok(body)
}
