mod common;

use common::{seed_scenario, spawn_server, ADMIN_PASS, ADMIN_USER};
use leasegate::LicenseStore;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

fn authed(builder: RequestBuilder) -> RequestBuilder {
    builder.basic_auth(ADMIN_USER, Some(ADMIN_PASS))
}

#[tokio::test]
async fn admin_disabled_without_credentials() {
    let server = spawn_server("2026-02-13T15:00:00Z", false).await;

    let resp = authed(Client::new().get(server.url("/admin/licenses")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "admin_disabled");
}

#[tokio::test]
async fn bad_credentials_get_challenge() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;

    let resp = Client::new().get(server.url("/admin/licenses")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get("www-authenticate").unwrap(),
        "Basic realm=\"leasegate-admin\""
    );

    let resp = Client::new()
        .post(server.url("/admin/licenses"))
        .basic_auth(ADMIN_USER, Some("wrong"))
        .json(&json!({"days": 30}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(server.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn create_show_and_list() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;
    let client = Client::new();

    let resp = authed(client.post(server.url("/admin/licenses")))
        .json(&json!({"days": 30, "key": "ABCD-EFGH-JKLM", "note": "demo"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["license_key"], "ABCD-EFGH-JKLM");
    assert_eq!(created["issued_at"], "2026-02-13T15:00:00Z");
    assert_eq!(created["license_expires_at"], "2026-03-15T15:00:00Z");
    assert_eq!(created["status"], "active");
    assert_eq!(created["note"], "demo");

    let resp = authed(client.get(server.url("/admin/licenses/ABCD-EFGH-JKLM")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let shown: Value = resp.json().await.unwrap();
    assert_eq!(shown, created);

    let listing: Value = authed(client.get(server.url("/admin/licenses")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["token_ttl_seconds"], 86_400);
    let rows = listing["licenses"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["license_key"], "ABCD-EFGH-JKLM");
    assert_eq!(rows[0]["is_expired"], false);
    assert_eq!(rows[0]["days_left"], 30);
}

#[tokio::test]
async fn create_generates_key_when_omitted() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;

    let created: Value = authed(Client::new().post(server.url("/admin/licenses")))
        .json(&json!({"days": 7}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = created["license_key"].as_str().unwrap();
    assert_eq!(key.len(), 14);
    assert_eq!(key.matches('-').count(), 2);
    assert_eq!(created["note"], Value::Null);
}

#[tokio::test]
async fn create_validation_errors() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;
    let client = Client::new();

    for body in [
        json!({"days": 0}),
        json!({"days": -3}),
        json!({"days": 10, "key": "   "}),
        json!({"days": 10, "key": "has spaces in it"}),
    ] {
        let resp = authed(client.post(server.url("/admin/licenses")))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", body);
    }
}

#[tokio::test]
async fn duplicate_key_conflicts() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;
    seed_scenario(server.store.as_ref());

    let resp = authed(Client::new().post(server.url("/admin/licenses")))
        .json(&json!({"days": 5, "key": "ABCD-EFGH-JKLM"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "duplicate_key");
}

#[tokio::test]
async fn disable_then_token_is_denied() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;
    seed_scenario(server.store.as_ref());
    let client = Client::new();

    for _ in 0..2 {
        let resp = authed(client.post(server.url("/admin/licenses/ABCD-EFGH-JKLM/disable")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"license_key": "ABCD-EFGH-JKLM", "status": "disabled"}));
    }

    let token: Value = client
        .post(server.url("/v1/token"))
        .json(&json!({"license_key": "ABCD-EFGH-JKLM"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(token["reason"], "disabled");

    let body: Value = authed(client.post(server.url("/admin/licenses/ABCD-EFGH-JKLM/enable")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn missing_key_is_404() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;
    let client = Client::new();

    for (method, path) in [
        ("GET", "/admin/licenses/MISS-ING1-KEY2"),
        ("POST", "/admin/licenses/MISS-ING1-KEY2/disable"),
        ("POST", "/admin/licenses/MISS-ING1-KEY2/enable"),
    ] {
        let builder = match method {
            "GET" => client.get(server.url(path)),
            _ => client.post(server.url(path)),
        };
        let resp = authed(builder).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{} {}", method, path);
    }
}

#[tokio::test]
async fn generate_key_is_unused() {
    let server = spawn_server("2026-02-13T15:00:00Z", true).await;
    let client = Client::new();

    let body: Value = authed(client.post(server.url("/admin/licenses/generate-key")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = body["license_key"].as_str().unwrap();

    let resp = authed(client.get(server.url(&format!("/admin/licenses/{}", key))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
