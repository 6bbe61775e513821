//! Reset service client with per-call timeouts.
//!
//! # Responsibilities
//! - Send the "request password reset" and "is email confirmed" calls
//! - Bound every call with a timeout
//! - Hand back status + message; classification belongs to the callers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use url::Url;

use crate::config::ServiceConfig;
use crate::service::types::{ResetRequest, ServiceBody, ServiceResponse, TransportError};

/// The two remote calls the reset flow depends on.
#[async_trait]
pub trait ResetService: Send + Sync {
    /// Ask the service to dispatch a password reset email.
    async fn request_password_reset(
        &self,
        request: &ResetRequest,
    ) -> Result<ServiceResponse, TransportError>;

    /// Ask the service whether the email has been confirmed.
    async fn check_email_confirmed(&self, email: &str)
        -> Result<ServiceResponse, TransportError>;
}

/// [`ResetService`] over HTTP with JSON bodies.
#[derive(Clone)]
pub struct HttpResetService {
    client: Client,
    request_url: Url,
    confirm_url: Url,
    timeout_duration: Duration,
}

impl HttpResetService {
    /// Create a client for the configured endpoints.
    pub fn new(config: &ServiceConfig) -> Result<Self, url::ParseError> {
        let base = base_url(&config.base_url)?;
        let request_url = base.join(config.request_path.trim_start_matches('/'))?;
        let confirm_url = base.join(config.confirm_path.trim_start_matches('/'))?;

        tracing::debug!(
            request_url = %request_url,
            confirm_url = %confirm_url,
            timeout_secs = config.request_timeout_secs,
            "Reset service client initialized"
        );

        Ok(Self {
            client: Client::new(),
            request_url,
            confirm_url,
            timeout_duration: config.request_timeout(),
        })
    }

    pub fn request_url(&self) -> &Url {
        &self.request_url
    }

    pub fn confirm_url(&self) -> &Url {
        &self.confirm_url
    }

    async fn post_email(&self, url: &Url, email: &str) -> Result<ServiceResponse, TransportError> {
        let request = ResetRequest::new(email);
        let fut = async {
            let resp = self
                .client
                .post(url.clone())
                .json(&request)
                .send()
                .await
                .map_err(|e| TransportError::Connect(e.to_string()))?;

            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            // Non-JSON bodies are legal; they just carry no message.
            let message = serde_json::from_str::<ServiceBody>(&text)
                .ok()
                .and_then(|body| body.message);

            Ok::<_, TransportError>(ServiceResponse::new(status, message))
        };

        match timeout(self.timeout_duration, fut).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout_duration.as_secs())),
        }
    }
}

/// Base URLs act as directories so relative paths append instead of
/// replacing the last segment.
fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{}/", raw))
    }
}

#[async_trait]
impl ResetService for HttpResetService {
    async fn request_password_reset(
        &self,
        request: &ResetRequest,
    ) -> Result<ServiceResponse, TransportError> {
        self.post_email(&self.request_url, &request.email).await
    }

    async fn check_email_confirmed(
        &self,
        email: &str,
    ) -> Result<ServiceResponse, TransportError> {
        self.post_email(&self.confirm_url, email).await
    }
}
