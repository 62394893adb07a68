use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::backend::{ApplicationsBackend, BackendError};
use crate::models::{ApplicationId, ApplicationStatus, Envelope, JobApplication};

const RESOURCE: &str = "job-applications";

#[derive(Debug, Serialize)]
struct StatusUpdateRequest {
    status: ApplicationStatus,
}

/// reqwest-backed client for the applications REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, RESOURCE, path)
            .trim_end_matches('/')
            .to_string()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), BackendError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        Ok((status, response.text().await?))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, BackendError> {
        let (status, body) = self.execute(request).await?;
        decode_envelope(status, &body)
    }
}

/// Unwraps the backend's `{success, data, message, authenticated}` envelope.
///
/// A 401 or `authenticated: false` is `Unauthenticated`, `success: false` is
/// `Rejected`. A body that is not an envelope is `Status` on error responses
/// and `Decode` on success responses.
fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<Option<T>, BackendError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(BackendError::Unauthenticated);
    }

    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(BackendError::Decode(e)),
        Err(_) => {
            warn!("Applications backend returned {}: {}", status, body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: body.to_string(),
            });
        }
    };

    if envelope.is_unauthenticated() {
        return Err(BackendError::Unauthenticated);
    }
    if !envelope.success {
        return Err(BackendError::Rejected(envelope.message));
    }
    Ok(envelope.data)
}

fn decode_applications(status: StatusCode, body: &str) -> Result<Vec<JobApplication>, BackendError> {
    // success without a payload is reported as a failure, same as a rejected load
    decode_envelope(status, body)?.ok_or(BackendError::Rejected(None))
}

#[async_trait]
impl ApplicationsBackend for HttpBackend {
    async fn get_all(&self) -> Result<Vec<JobApplication>, BackendError> {
        let (status, body) = self.execute(self.client.get(self.url(""))).await?;
        let applications = decode_applications(status, &body)?;
        debug!("Fetched {} job applications", applications.len());
        Ok(applications)
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), BackendError> {
        let request = self
            .client
            .patch(self.url(&format!("{id}/status")))
            .json(&StatusUpdateRequest { status });
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn delete(&self, id: ApplicationId) -> Result<(), BackendError> {
        self.send::<serde_json::Value>(self.client.delete(self.url(&id.to_string())))
            .await?;
        Ok(())
    }

    fn resume_download_url(&self, id: ApplicationId) -> String {
        self.url(&format!("{id}/resume"))
    }

    async fn fetch_resume(&self, id: ApplicationId) -> Result<Bytes, BackendError> {
        let response: Response = self
            .authorize(self.client.get(self.resume_download_url(id)))
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Err(BackendError::Unauthenticated),
            status if !status.is_success() => Err(BackendError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(response.bytes().await?),
        }
    }
}
