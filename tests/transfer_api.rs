//! HTTP API tests against the in-memory store

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use simple_bank::gateway::router;
use simple_bank::transfer::{LedgerStore, MemoryBackend, Store};

fn app() -> Router {
    let store: Arc<dyn Store> = Arc::new(LedgerStore::new(MemoryBackend::new(), None));
    router(store)
}

/// Send one request, return (status, envelope)
async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_account(app: &Router, owner: &str, currency: &str) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/accounts",
        Some(json!({ "owner": owner, "currency": currency })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["data"].clone()
}

/// Accounts start at zero; give them money through an update
async fn fund(app: &Router, account: &Value, balance: i64) {
    let id = account["id"].as_i64().unwrap();
    let (status, _) = call(
        app,
        Method::PUT,
        &format!("/api/v1/accounts/{}", id),
        Some(json!({
            "owner": account["owner"],
            "balance": balance,
            "currency": account["currency"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert!(body["data"]["timestamp_ms"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_create_and_get_account() {
    let app = app();
    let account = create_account(&app, "alice", "USD").await;
    assert_eq!(account["balance"], 0);
    assert_eq!(account["currency"], "USD");

    let id = account["id"].as_i64().unwrap();
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], account);
}

#[tokio::test]
async fn test_create_account_validation() {
    let app = app();
    let cases = [
        json!({ "owner": "alice", "currency": "XYZ" }),
        json!({ "owner": "   ", "currency": "USD" }),
        json!({ "owner": "alice" }),
    ];
    for body in cases {
        let (status, resp) = call(&app, Method::POST, "/api/v1/accounts", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["code"], 1001);
    }
}

#[tokio::test]
async fn test_get_account_errors() {
    let app = app();
    let (status, _) = call(&app, Method::GET, "/api/v1/accounts/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::GET, "/api/v1/accounts/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::GET, "/api/v1/accounts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_accounts_paging() {
    let app = app();
    for i in 0..7 {
        create_account(&app, &format!("owner{}", i), "EUR").await;
    }

    let (status, body) = call(
        &app,
        Method::GET,
        "/api/v1/accounts?page_id=2&page_size=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page = body["data"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["owner"], "owner5");

    for uri in [
        "/api/v1/accounts?page_id=0&page_size=5",
        "/api/v1/accounts?page_id=1&page_size=20",
        "/api/v1/accounts",
    ] {
        let (status, _) = call(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_update_and_delete_account() {
    let app = app();
    let account = create_account(&app, "carol", "CAD").await;
    let id = account["id"].as_i64().unwrap();
    let uri = format!("/api/v1/accounts/{}", id);

    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "owner": "carol", "balance": 42, "currency": "AUD" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance"], 42);
    assert_eq!(body["data"]["currency"], "AUD");

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, _) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transfer_happy_path() {
    let app = app();
    let a = create_account(&app, "alice", "USD").await;
    let b = create_account(&app, "bob", "USD").await;
    fund(&app, &a, 100).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({
            "from_account_id": a["id"],
            "to_account_id": b["id"],
            "amount": 30,
            "currency": "USD",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let result = &body["data"];
    assert_eq!(result["from_account"]["balance"], 70);
    assert_eq!(result["to_account"]["balance"], 30);
    assert_eq!(result["from_entry"]["amount"], -30);
    assert_eq!(result["to_entry"]["amount"], 30);

    let transfer_id = result["transfer"]["id"].as_i64().unwrap();
    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/transfers/{}", transfer_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], 30);

    let entry_id = result["to_entry"]["id"].as_i64().unwrap();
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/entries/{}", entry_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["account_id"], b["id"]);

    // referenced by ledger rows now
    let (status, body) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/accounts/{}", a["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 5000);

    // the account survives the failed delete
    let (status, _) = call(&app, Method::GET, &format!("/api/v1/accounts/{}", a["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_transfer_validation_errors() {
    let app = app();
    let usd = create_account(&app, "alice", "USD").await;
    let eur = create_account(&app, "bob", "EUR").await;

    let cases = [
        (
            json!({ "from_account_id": usd["id"], "to_account_id": eur["id"], "amount": 10, "currency": "USD" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "from_account_id": eur["id"], "to_account_id": usd["id"], "amount": 10, "currency": "USD" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "from_account_id": usd["id"], "to_account_id": 999, "amount": 10, "currency": "USD" }),
            StatusCode::NOT_FOUND,
        ),
        (
            json!({ "from_account_id": 999, "to_account_id": usd["id"], "amount": 10, "currency": "USD" }),
            StatusCode::NOT_FOUND,
        ),
        (
            json!({ "from_account_id": usd["id"], "to_account_id": eur["id"], "amount": 0, "currency": "USD" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "from_account_id": usd["id"], "to_account_id": eur["id"], "amount": -5, "currency": "USD" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "from_account_id": usd["id"], "to_account_id": eur["id"], "amount": 10, "currency": "GBP" }),
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (body, expected) in cases {
        let (status, resp) = call(&app, Method::POST, "/api/v1/transfers", Some(body.clone())).await;
        assert_eq!(status, expected, "{} -> {}", body, resp);
    }

    // nothing moved
    let (_, body) = call(&app, Method::GET, &format!("/api/v1/accounts/{}", usd["id"]), None).await;
    assert_eq!(body["data"]["balance"], 0);
}

#[tokio::test]
async fn test_currency_mismatch_code() {
    let app = app();
    let usd = create_account(&app, "alice", "USD").await;
    let eur = create_account(&app, "bob", "EUR").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({
            "from_account_id": usd["id"],
            "to_account_id": eur["id"],
            "amount": 1,
            "currency": "USD",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1002);
    assert!(body["msg"].as_str().unwrap().contains("mismatch"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/transfers")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let app = app();
    for uri in ["/api/v1/transfers/5", "/api/v1/entries/5"] {
        let (status, body) = call(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["code"], 4001);
    }
}

#[tokio::test]
async fn test_openapi_json_served() {
    let (status, body) = call(&app(), Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Simple Bank API");
}
