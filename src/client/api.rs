//! JSON client for the upstream compliance API and the payment provider.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, HOST};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::UpstreamConfig;
use crate::resilience::{retry, RetryPolicy};
use crate::session::{SessionStore, AUTH_TOKEN_KEY};

/// Headers that must not travel between hops.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors surfaced by the outbound client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned {status}")]
    Status { status: StatusCode, body: String },
    #[error("malformed upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A failed attempt, classified for the retry loop.
enum UpstreamFailure {
    /// 5xx response; retryable, and relayable once the budget runs out.
    Status(reqwest::Response),
    /// Connect/read failure; retryable.
    Network(reqwest::Error),
}

/// Retrying JSON client bound to one base URL.
///
/// Auth tokens come from the injected session store; nothing is read from
/// process-global state.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    sessions: Arc<dyn SessionStore>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(
        base_url: Url,
        connect_timeout: Duration,
        request_timeout: Duration,
        sessions: Arc<dyn SessionStore>,
        retry: RetryPolicy,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            sessions,
            retry,
        })
    }

    pub fn from_config(
        config: &UpstreamConfig,
        sessions: Arc<dyn SessionStore>,
        retry: RetryPolicy,
    ) -> Result<Self, ApiError> {
        Self::new(
            Url::parse(&config.base_url)?,
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
            sessions,
            retry,
        )
    }

    /// Fetch a JSON document. Network errors and 5xx responses are retried
    /// per the policy; 4xx responses and decode failures are not.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.base_url.join(path)?;
        let mut headers = HeaderMap::new();
        self.attach_auth_token(&mut headers);

        let response = self
            .send_with_retry(self.retry, Method::GET, url, headers, Bytes::new())
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Relay a request to the upstream backend.
    ///
    /// Only idempotent methods are retried. An exhausted retry budget
    /// relays the last 5xx response as-is; network failures surface as
    /// errors for the caller to map.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.base_url.join(path_and_query)?;

        let mut out_headers = HeaderMap::new();
        for (name, value) in headers.iter() {
            if is_forwardable(name.as_str()) {
                out_headers.insert(name.clone(), value.clone());
            }
        }
        self.attach_auth_token(&mut out_headers);

        let policy = if is_idempotent(&method) {
            self.retry
        } else {
            RetryPolicy {
                max_attempts: 1,
                ..self.retry
            }
        };

        self.send_with_retry(policy, method, url, out_headers, body)
            .await
    }

    async fn send_with_retry(
        &self,
        policy: RetryPolicy,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, ApiError> {
        let outcome = retry(policy, || {
            let request = self
                .http
                .request(method.clone(), url.clone())
                .headers(headers.clone())
                .body(body.clone());
            async move {
                match request.send().await {
                    Ok(response) if response.status().is_server_error() => {
                        Err(UpstreamFailure::Status(response))
                    }
                    Ok(response) => Ok(response),
                    Err(error) => Err(UpstreamFailure::Network(error)),
                }
            }
        })
        .await;

        match outcome {
            Ok(response) | Err(UpstreamFailure::Status(response)) => Ok(response),
            Err(UpstreamFailure::Network(error)) => Err(ApiError::Network(error)),
        }
    }

    /// Attach the stored service token unless the request already carries
    /// its own Authorization header.
    fn attach_auth_token(&self, headers: &mut HeaderMap) {
        if headers.contains_key(AUTHORIZATION) {
            return;
        }
        if let Some(token) = self.sessions.get(AUTH_TOKEN_KEY) {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

fn is_forwardable(name: &str) -> bool {
    if name.eq_ignore_ascii_case(HOST.as_str()) || name.eq_ignore_ascii_case("content-length") {
        return false;
    }
    !HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop| name.eq_ignore_ascii_case(hop))
}
