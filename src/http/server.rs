//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, CSRF)
//! - Forward `/api` traffic to the upstream backend
//! - Serve until shutdown is signaled

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Extension, Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::client::{ApiClient, ApiError};
use crate::config::GatewayConfig;
use crate::observability::metrics;
use crate::payments::PaymentClient;
use crate::security::csrf::{csrf_middleware, issue_csrf_token, CsrfProtection};
use crate::session::{MemorySessionStore, SessionStore, AUTH_TOKEN_KEY};

/// Largest request body the gateway will buffer for forwarding.
const MAX_FORWARD_BODY: usize = 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub csrf: Arc<CsrfProtection>,
    pub payments: Option<Arc<PaymentClient>>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ApiError> {
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        if let Some(token) = &config.session.auth_token {
            sessions.insert(AUTH_TOKEN_KEY, token.clone());
        }

        let api = ApiClient::from_config(&config.upstream, sessions, config.retries)?;
        let csrf = Arc::new(CsrfProtection::from_config(&config.security));
        let payments = PaymentClient::from_config(&config.payments, config.retries)?.map(Arc::new);

        let state = AppState {
            api,
            csrf,
            payments,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let protected = Router::new()
            .route("/api/billing/status", get(billing_status))
            .route("/api/{*path}", any(forward_handler))
            .layer(middleware::from_fn(csrf_middleware));

        Router::new()
            .route("/healthz", get(healthz))
            .route("/api/auth/csrf", get(issue_csrf_token))
            .merge(protected)
            .with_state(state.clone())
            .layer(Extension(state.csrf))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Ctrl-C received");
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown signal received");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Relay a request to the upstream compliance API.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let method_str = method.to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| "/".to_owned());

    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, MAX_FORWARD_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => {
            metrics::record_request(&method_str, 413, start);
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "request body exceeds the forwarding limit",
            );
        }
    };

    match state
        .api
        .forward(method, &path_and_query, parts.headers, body_bytes)
        .await
    {
        Ok(upstream) => {
            let status = upstream.status();
            let response = relay_response(upstream).await;
            metrics::record_request(&method_str, status.as_u16(), start);
            response
        }
        Err(error) => {
            tracing::error!(
                method = %method_str,
                path = %path_and_query,
                error = %error,
                "Upstream request failed"
            );
            metrics::record_request(&method_str, 502, start);
            error_response(StatusCode::BAD_GATEWAY, "bad_gateway", &error.to_string())
        }
    }
}

/// Turn an upstream response into a client response, dropping headers that
/// do not survive the hop.
async fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = upstream.headers().clone();

    let body = match upstream.bytes().await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!(error = %error, "Failed to read upstream response body");
            return error_response(
                StatusCode::BAD_GATEWAY,
                "bad_gateway",
                "upstream response body unreadable",
            );
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    for (name, value) in headers.iter() {
        let lowered = name.as_str();
        if lowered == "connection" || lowered == "transfer-encoding" || lowered == "content-length"
        {
            continue;
        }
        response.headers_mut().append(name.clone(), value.clone());
    }
    response
}

/// Billing status for the deployment, via the injected provider handle.
async fn billing_status(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let Some(payments) = &state.payments else {
        metrics::record_request("GET", 503, start);
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "billing_disabled",
            "no payment provider is configured",
        );
    };

    match payments.billing_status().await {
        Ok(status) => {
            metrics::record_request("GET", 200, start);
            Json(status).into_response()
        }
        Err(error) => {
            tracing::error!(error = %error, "Billing status lookup failed");
            metrics::record_request("GET", 502, start);
            error_response(StatusCode::BAD_GATEWAY, "bad_gateway", &error.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: &str, detail: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": error, "detail": detail })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    #[tokio::test]
    async fn builds_from_valid_config() {
        let mut config = GatewayConfig::default();
        config.security.secret = "0123456789abcdef0123456789abcdef".to_string();
        let server = HttpServer::new(config).unwrap();
        assert_eq!(server.config().listener.bind_address, "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn construction_fails_on_unparseable_upstream_url() {
        let mut config = GatewayConfig::default();
        config.security.secret = "0123456789abcdef0123456789abcdef".to_string();
        config.upstream.base_url = "not a url".to_string();
        assert!(HttpServer::new(config).is_err());
    }
}
