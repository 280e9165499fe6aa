//! Dependency-injected payment provider client.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};
use crate::config::{PaymentConfig, UpstreamConfig};
use crate::resilience::RetryPolicy;
use crate::session::{MemorySessionStore, SessionStore, AUTH_TOKEN_KEY};

/// Billing state of the deployment's provider account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingStatus {
    pub account: String,
    pub plan: String,
    pub active: bool,
    /// Unix timestamp of the next renewal.
    pub renews_at: u64,
}

/// Handle to the payment provider API.
pub struct PaymentClient {
    api: ApiClient,
    account: String,
}

impl PaymentClient {
    /// Build the handle, or `None` when billing is disabled.
    ///
    /// The provider API key lives in a session store private to this
    /// client, so provider credentials never mix with upstream ones.
    pub fn from_config(
        config: &PaymentConfig,
        retry: RetryPolicy,
    ) -> Result<Option<Self>, ApiError> {
        if !config.enabled {
            return Ok(None);
        }

        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        sessions.insert(AUTH_TOKEN_KEY, config.api_key.clone());

        let upstream = UpstreamConfig {
            base_url: config.provider_url.clone(),
            ..UpstreamConfig::default()
        };
        let api = ApiClient::from_config(&upstream, sessions, retry)?;

        Ok(Some(Self {
            api,
            account: config.account.clone(),
        }))
    }

    /// Fetch the billing status for the configured account.
    pub async fn billing_status(&self) -> Result<BillingStatus, ApiError> {
        self.api
            .get_json(&format!("/v1/accounts/{}/billing", self.account))
            .await
    }
}
