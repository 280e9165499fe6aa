//! CSRF double-submit protection.
//!
//! A random 256-bit token is issued to the client; its salted hash is set
//! in an http-only cookie. State-changing requests must echo the raw token
//! in a header, and the recomputed hash must match the cookie exactly.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::config::SecurityConfig;
use crate::observability::metrics;

const TOKEN_BYTES: usize = 32;

/// Shared CSRF state: the hashing secret plus cookie parameters.
pub struct CsrfProtection {
    secret: Vec<u8>,
    cookie_name: String,
    header_name: String,
    token_ttl_secs: u64,
    secure_cookies: bool,
}

/// A freshly issued token and the cookie that must accompany it.
pub struct IssuedToken {
    /// Raw token, returned to the caller and echoed back in the header.
    pub token: String,
    /// Complete `Set-Cookie` value holding the token hash.
    pub cookie: String,
}

impl CsrfProtection {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            cookie_name: config.csrf_cookie_name.clone(),
            header_name: config.csrf_header_name.clone(),
            token_ttl_secs: config.csrf_token_ttl_secs,
            secure_cookies: config.secure_cookies,
        }
    }

    /// Generate a fresh token and its verification cookie.
    pub fn issue(&self) -> IssuedToken {
        let mut raw = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);
        let hash = self.hash_token(&token);

        let cookie = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict{}",
            self.cookie_name,
            hash,
            self.token_ttl_secs,
            if self.secure_cookies { "; Secure" } else { "" },
        );

        IssuedToken { token, cookie }
    }

    /// Check the header token of a state-changing request against the
    /// hash stored in the verification cookie. Fails closed.
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), CsrfRejection> {
        let token = match headers.get(self.header_name.as_str()) {
            None => return Err(CsrfRejection::Missing),
            Some(value) => match value.to_str() {
                Ok(s) if !s.is_empty() => s,
                _ => return Err(CsrfRejection::Invalid),
            },
        };

        let stored = cookie_value(headers, &self.cookie_name).ok_or(CsrfRejection::Invalid)?;
        let expected = self.hash_token(token);

        if constant_time_eq(expected.as_bytes(), stored.as_bytes()) {
            Ok(())
        } else {
            Err(CsrfRejection::Invalid)
        }
    }

    /// `SHA256(token || secret)`, base64-url encoded.
    fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.update(&self.secret);
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    /// No token header on a state-changing request.
    Missing,
    /// Token present but the hash comparison failed, or no cookie.
    Invalid,
    /// Verification state unavailable; never lets the request through.
    Internal,
}

impl CsrfRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            CsrfRejection::Missing => "missing",
            CsrfRejection::Invalid => "invalid",
            CsrfRejection::Internal => "internal",
        }
    }
}

impl IntoResponse for CsrfRejection {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            CsrfRejection::Missing => (
                StatusCode::FORBIDDEN,
                "csrf_token_missing",
                "state-changing requests require a CSRF token header",
            ),
            CsrfRejection::Invalid => (
                StatusCode::FORBIDDEN,
                "csrf_token_invalid",
                "CSRF token does not match the stored session hash",
            ),
            CsrfRejection::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "csrf_internal",
                "CSRF verification state unavailable",
            ),
        };
        (status, Json(serde_json::json!({ "error": error, "detail": detail }))).into_response()
    }
}

/// Middleware enforcing double-submit verification on state-changing methods.
pub async fn csrf_middleware(request: Request<Body>, next: Next) -> Response {
    if !is_state_changing(request.method()) {
        return next.run(request).await;
    }

    let Some(csrf) = request.extensions().get::<Arc<CsrfProtection>>().cloned() else {
        tracing::error!("CSRF protection state missing from request extensions");
        return CsrfRejection::Internal.into_response();
    };

    match csrf.verify(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = rejection.reason(),
                "Rejected state-changing request"
            );
            metrics::record_csrf_rejected(rejection.reason());
            rejection.into_response()
        }
    }
}

/// Handler issuing a fresh token: JSON body plus verification cookie.
pub async fn issue_csrf_token(Extension(csrf): Extension<Arc<CsrfProtection>>) -> Response {
    let issued = csrf.issue();

    let mut response =
        Json(serde_json::json!({ "csrfToken": issued.token })).into_response();
    match header::HeaderValue::from_str(&issued.cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
            response
        }
        Err(_) => CsrfRejection::Internal.into_response(),
    }
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((k, v)) = pair.trim().split_once('=') {
                if k == name {
                    return Some(v);
                }
            }
        }
    }
    None
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
