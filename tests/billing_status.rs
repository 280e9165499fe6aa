//! Billing status lookups through the injected payment provider handle.

use std::sync::{Arc, Mutex};

use serde_json::Value;

mod common;
use common::{http_client, spawn_gateway, start_upstream, test_config};

#[tokio::test]
async fn billing_status_is_relayed_from_the_provider() {
    let upstream = start_upstream(|_req| async { (200, "{}".to_string()) }).await;

    let seen_auth = Arc::new(Mutex::new(None::<String>));
    let sink = seen_auth.clone();
    let provider = start_upstream(move |req| {
        *sink.lock().unwrap() = req.header("authorization").map(str::to_string);
        async move {
            assert_eq!(req.path, "/v1/accounts/acct_42/billing");
            (
                200,
                serde_json::json!({
                    "account": "acct_42",
                    "plan": "growth",
                    "active": true,
                    "renews_at": 1767225600u64,
                })
                .to_string(),
            )
        }
    })
    .await;

    let mut config = test_config(upstream);
    config.payments.enabled = true;
    config.payments.provider_url = format!("http://{provider}");
    config.payments.api_key = "sk_test_edge".to_string();
    config.payments.account = "acct_42".to_string();
    let (addr, shutdown) = spawn_gateway(config).await;

    let res = http_client()
        .get(format!("http://{addr}/api/billing/status"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["account"], "acct_42");
    assert_eq!(body["plan"], "growth");
    assert_eq!(body["active"], true);

    assert_eq!(
        seen_auth.lock().unwrap().as_deref(),
        Some("Bearer sk_test_edge"),
        "provider must see the configured API key"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn billing_route_answers_503_when_disabled() {
    let upstream = start_upstream(|_req| async { (200, "{}".to_string()) }).await;
    let (addr, shutdown) = spawn_gateway(test_config(upstream)).await;

    let res = http_client()
        .get(format!("http://{addr}/api/billing/status"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "billing_disabled");

    shutdown.trigger();
}
