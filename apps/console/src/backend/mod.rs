//! Applications backend — the REST service that owns the records.
//!
//! The console never persists anything itself. All reads and mutations go
//! through an `ApplicationsBackend`, carried in the service as
//! `Arc<dyn ApplicationsBackend>` so tests can swap in an in-memory backend.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::{ApplicationId, ApplicationStatus, JobApplication};

pub mod http;

#[cfg(test)]
pub mod mock;

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Session missing or expired. Never retried.
    #[error("not authenticated")]
    Unauthenticated,

    /// The backend answered `success: false`.
    #[error("{}", .0.as_deref().unwrap_or("request rejected"))]
    Rejected(Option<String>),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, BackendError::Unauthenticated)
    }

    /// Message the backend itself supplied, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            BackendError::Rejected(message) => message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ApplicationsBackend: Send + Sync {
    async fn get_all(&self) -> Result<Vec<JobApplication>, BackendError>;

    async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), BackendError>;

    async fn delete(&self, id: ApplicationId) -> Result<(), BackendError>;

    /// Location a browser can download the resume from directly.
    fn resume_download_url(&self, id: ApplicationId) -> String;

    async fn fetch_resume(&self, id: ApplicationId) -> Result<Bytes, BackendError>;
}
