//! API tests for the account routes, run in-process against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use simple_bank::error::{ErrorCode, ErrorResponse};
use simple_bank::models::Account;
use simple_bank::router::build_router;
use simple_bank::store::InMemoryStore;
use simple_bank::{AppState, Config};

fn alice() -> Account {
    Account {
        id: 7,
        owner: "alice".to_string(),
        balance: 500,
        currency: "USD".to_string(),
    }
}

fn account(id: i64) -> Account {
    Account {
        id,
        owner: format!("owner-{}", id),
        balance: id * 10,
        currency: "EUR".to_string(),
    }
}

fn app_with_config(store: Arc<InMemoryStore>, config: Config) -> Router {
    build_router(AppState::new(store, config))
}

fn app(store: Arc<InMemoryStore>) -> Router {
    app_with_config(store, Config::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn require_body_match_account(body: &[u8], expected: &Account) {
    let actual: Account = serde_json::from_slice(body).unwrap();
    assert_eq!(&actual, expected);
}

fn error_code(body: &[u8]) -> ErrorCode {
    let response: ErrorResponse = serde_json::from_slice(body).unwrap();
    response.error.code
}

struct GetAccountCase {
    name: &'static str,
    account_id: &'static str,
    build_store: fn(&InMemoryStore),
    expected_store_calls: usize,
    check_response: fn(StatusCode, &[u8]),
}

#[tokio::test]
async fn test_get_account_api() {
    let cases = [
        GetAccountCase {
            name: "OK",
            account_id: "7",
            build_store: |store| store.insert(alice()),
            expected_store_calls: 1,
            check_response: |status, body| {
                assert_eq!(status, StatusCode::OK);
                require_body_match_account(body, &alice());
            },
        },
        GetAccountCase {
            name: "NotFound",
            account_id: "7",
            build_store: |_| {},
            expected_store_calls: 1,
            check_response: |status, body| {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(error_code(body), ErrorCode::NotFound);
            },
        },
        GetAccountCase {
            name: "InternalError",
            account_id: "7",
            build_store: |store| {
                store.insert(alice());
                store.close_connection();
            },
            expected_store_calls: 1,
            check_response: |status, body| {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(error_code(body), ErrorCode::DatabaseConnectionFailed);
            },
        },
        GetAccountCase {
            name: "InvalidAccountId",
            account_id: "0",
            build_store: |store| store.insert(alice()),
            expected_store_calls: 0,
            check_response: |status, body| {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(error_code(body), ErrorCode::InvalidInput);
            },
        },
        GetAccountCase {
            name: "NegativeAccountId",
            account_id: "-7",
            build_store: |store| store.insert(alice()),
            expected_store_calls: 0,
            check_response: |status, _| assert_eq!(status, StatusCode::BAD_REQUEST),
        },
        GetAccountCase {
            name: "NonIntegerAccountId",
            account_id: "seven",
            build_store: |store| store.insert(alice()),
            expected_store_calls: 0,
            check_response: |status, _| assert_eq!(status, StatusCode::BAD_REQUEST),
        },
        GetAccountCase {
            name: "OverflowingAccountId",
            account_id: "9223372036854775808",
            build_store: |store| store.insert(alice()),
            expected_store_calls: 0,
            check_response: |status, _| assert_eq!(status, StatusCode::BAD_REQUEST),
        },
    ];

    for case in cases {
        let store = Arc::new(InMemoryStore::new());
        (case.build_store)(&store);

        let uri = format!("/accounts/{}", case.account_id);
        let (status, _, body) = send(app(store.clone()), get(&uri)).await;

        (case.check_response)(status, &body);
        assert_eq!(
            store.get_account_calls(),
            case.expected_store_calls,
            "case {}",
            case.name
        );
        if case.expected_store_calls == 1 {
            assert_eq!(store.requested_ids().await, vec![7], "case {}", case.name);
        }
    }
}

#[tokio::test]
async fn test_get_account_exact_wire_body() {
    let store = Arc::new(InMemoryStore::with_accounts([alice()]));

    let (status, headers, body) = send(app(store), get("/accounts/7")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(
        &body[..],
        br#"{"id":7,"owner":"alice","balance":500,"currency":"USD"}"#
    );
}

#[tokio::test]
async fn test_get_account_unknown_id_is_not_found() {
    let store = Arc::new(InMemoryStore::with_accounts([alice()]));

    let (status, _, _) = send(app(store.clone()), get("/accounts/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.requested_ids().await, vec![999]);
}

#[tokio::test]
async fn test_get_account_is_idempotent() {
    let store = Arc::new(InMemoryStore::with_accounts([alice()]));
    let app = app(store.clone());

    let (first_status, _, first_body) = send(app.clone(), get("/accounts/7")).await;
    let (second_status, _, second_body) = send(app, get("/accounts/7")).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(first_status, second_status);
    assert_eq!(first_body, second_body);
    assert_eq!(store.get_account_calls(), 2);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_internal_error_does_not_leak_store_error_text() {
    let store = Arc::new(InMemoryStore::with_accounts([alice()]));
    store.close_connection();

    let (status, _, body) = send(app(store), get("/accounts/7")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(!text.contains("connection is already closed"));
}

#[tokio::test]
async fn test_slow_store_exceeds_deadline() {
    let store = Arc::new(InMemoryStore::with_accounts([alice()]));
    store.set_latency(Duration::from_millis(500));
    let config = Config {
        store_timeout_ms: 20,
        ..Config::default()
    };

    let (status, _, body) = send(app_with_config(store.clone(), config), get("/accounts/7")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&body), ErrorCode::QueryTimeout);
    assert_eq!(store.get_account_calls(), 1);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let store = Arc::new(InMemoryStore::new());

    let (_, ok_headers, _) = send(app(store.clone()), get("/health")).await;
    let (_, err_headers, _) = send(app(store), get("/accounts/0")).await;

    assert!(ok_headers.contains_key("x-request-id"));
    assert!(err_headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_error_body_request_id_matches_header() {
    let store = Arc::new(InMemoryStore::with_accounts([alice()]));
    store.close_connection();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/accounts/7")
        .header("X-Request-ID", "req-abc")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(app(store.clone()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers.get("x-request-id").unwrap(), "req-abc");
    let response: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.request_id, "req-abc");

    // Generated ids are shared between header and body too.
    let (status, headers, body) = send(app(store), get("/accounts/0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        headers.get("x-request-id").unwrap().to_str().unwrap(),
        response.request_id
    );
}

#[tokio::test]
async fn test_request_timeout_before_store_deadline_is_internal() {
    let store = Arc::new(InMemoryStore::with_accounts([alice()]));
    store.set_latency(Duration::from_millis(1_500));
    let config = Config {
        store_timeout_ms: 5_000,
        request_timeout: 1,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let (status, _, _) = send(app_with_config(store, config), get("/accounts/7")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_create_account() {
    let store = Arc::new(InMemoryStore::new());
    let app = app(store.clone());

    let (status, _, body) = send(
        app.clone(),
        post_json("/accounts", r#"{"owner":"bob","currency":"EUR"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let created: Account = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.owner, "bob");
    assert_eq!(created.currency, "EUR");
    assert_eq!(created.balance, 0);
    assert!(created.id > 0);

    let (status, _, body) = send(app, get(&format!("/accounts/{}", created.id))).await;
    assert_eq!(status, StatusCode::OK);
    require_body_match_account(&body, &created);
}

#[tokio::test]
async fn test_create_account_rejects_invalid_payloads_without_store_call() {
    let store = Arc::new(InMemoryStore::new());

    for payload in [
        r#"{"owner":"","currency":"USD"}"#,
        r#"{"owner":"bob","currency":""}"#,
        r#"{"owner":"bob"}"#,
        r#"{"owner":"bob","currency":"USD""#,
    ] {
        let (status, _, _) = send(app(store.clone()), post_json("/accounts", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
    }

    assert_eq!(store.create_account_calls(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_create_account_store_failure() {
    let store = Arc::new(InMemoryStore::new());
    store.close_connection();

    let (status, _, _) = send(
        app(store.clone()),
        post_json("/accounts", r#"{"owner":"bob","currency":"USD"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.create_account_calls(), 1);
}

#[tokio::test]
async fn test_list_accounts_returns_requested_page() {
    let store = Arc::new(InMemoryStore::with_accounts((1..=12).map(account)));

    let (status, _, body) = send(app(store.clone()), get("/accounts?page_id=2&page_size=5")).await;

    assert_eq!(status, StatusCode::OK);
    let accounts: Vec<Account> = serde_json::from_slice(&body).unwrap();
    let ids: Vec<i64> = accounts.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);
    assert_eq!(accounts[0], account(6));
    assert_eq!(store.list_accounts_calls(), 1);
}

#[tokio::test]
async fn test_list_accounts_past_the_end_is_empty() {
    let store = Arc::new(InMemoryStore::with_accounts((1..=3).map(account)));

    let (status, _, body) = send(app(store), get("/accounts?page_id=5&page_size=5")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn test_list_accounts_rejects_bad_paging_without_store_call() {
    let store = Arc::new(InMemoryStore::with_accounts((1..=12).map(account)));

    for uri in [
        "/accounts",
        "/accounts?page_id=1",
        "/accounts?page_id=0&page_size=5",
        "/accounts?page_id=1&page_size=4",
        "/accounts?page_id=1&page_size=11",
        "/accounts?page_id=one&page_size=5",
    ] {
        let (status, _, _) = send(app(store.clone()), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
    }

    assert_eq!(store.list_accounts_calls(), 0);
}

#[tokio::test]
async fn test_health_reports_store_status() {
    let store = Arc::new(InMemoryStore::new());

    let (status, _, body) = send(app(store.clone()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["dependencies"][0]["name"], "store");

    store.close_connection();

    let (status, _, body) = send(app(store), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["dependencies"][0]["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let store = Arc::new(InMemoryStore::new());

    let (status, _, _) = send(app(store), get("/metrics")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn stored_accounts_are_served_unchanged(
            id in 1i64..=i64::MAX,
            owner in "[a-zA-Z ]{1,24}",
            balance in any::<i64>(),
            currency in "[A-Z]{3}",
        ) {
            let expected = Account { id, owner, balance, currency };
            let runtime = tokio::runtime::Runtime::new().unwrap();

            let (status, body, calls) = runtime.block_on(async {
                let store = Arc::new(InMemoryStore::with_accounts([expected.clone()]));
                let (status, _, body) =
                    send(app(store.clone()), get(&format!("/accounts/{}", id))).await;
                (status, body, store.get_account_calls())
            });

            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(calls, 1);
            let actual: Account = serde_json::from_slice(&body).unwrap();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn non_positive_ids_never_reach_the_store(id in i64::MIN..=0i64) {
            let runtime = tokio::runtime::Runtime::new().unwrap();

            let (status, calls) = runtime.block_on(async {
                let store = Arc::new(InMemoryStore::with_accounts([alice()]));
                let (status, _, _) =
                    send(app(store.clone()), get(&format!("/accounts/{}", id))).await;
                (status, store.get_account_calls())
            });

            prop_assert_eq!(status, StatusCode::BAD_REQUEST);
            prop_assert_eq!(calls, 0);
        }
    }
}
