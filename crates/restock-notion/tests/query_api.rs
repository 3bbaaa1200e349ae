//! Integration tests against an in-process mock of the Notion query endpoint.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use restock_notion::{FetchError, NotionClient, NotionConfig, RecordSchema, MAX_PAGES};

struct CapturedRequest {
    authorization: Option<String>,
    notion_version: Option<String>,
    body: Value,
}

enum MockResponse {
    Page(Value),
    Status(StatusCode),
}

#[derive(Default)]
struct MockState {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<CapturedRequest>>,
}

/// In-process mock of the Notion query endpoint: serves a scripted list of
/// responses in order and records every request it saw.
struct MockNotion {
    base_url: String,
    state: Arc<MockState>,
    task: tokio::task::JoinHandle<()>,
}

impl MockNotion {
    async fn start(responses: Vec<MockResponse>) -> Self {
        let state = Arc::new(MockState {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        });

        let app = Router::new()
            .route("/v1/databases/{db}/query", post(query_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock notion listener");
        let addr = listener
            .local_addr()
            .expect("mock notion listener should have a local address");

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock notion axum server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.body.clone())
            .collect()
    }
}

impl Drop for MockNotion {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn query_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(CapturedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        notion_version: headers
            .get("notion-version")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    match state.responses.lock().unwrap().pop_front() {
        Some(MockResponse::Page(value)) => Json(value).into_response(),
        Some(MockResponse::Status(code)) => code.into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn client_for(mock: &MockNotion) -> NotionClient {
    NotionClient::new(NotionConfig {
        api_url: mock.base_url.clone(),
        token: "test-token".to_string(),
        database_id: "db-1".to_string(),
        schema: RecordSchema::default(),
    })
}

fn page_json(id: &str, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "url": format!("https://notion.example/{id}"),
        "last_edited_time": "2024-05-30T12:00:00.000Z",
        "properties": {
            "Name": { "title": [ { "plain_text": title } ] },
            "Group": { "select": { "name": "Health" } },
            "Status": { "select": { "name": status } },
        },
    })
}

#[tokio::test]
async fn walks_all_pages_in_remote_order() {
    let mock = MockNotion::start(vec![
        MockResponse::Page(json!({
            "results": [page_json("a", "First", "OK"), page_json("b", "Second", "OK")],
            "has_more": true,
            "next_cursor": "cursor-2",
        })),
        MockResponse::Page(json!({
            "results": [page_json("c", "Third", "Expiring")],
            "has_more": false,
            "next_cursor": null,
        })),
    ])
    .await;

    let records = client_for(&mock).query_all().await.expect("query should succeed");

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(records[2].status.as_deref(), Some("Expiring"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].get("start_cursor").is_none());
    assert_eq!(requests[0]["page_size"], 100);
    assert_eq!(requests[1]["start_cursor"], "cursor-2");
}

#[tokio::test]
async fn sends_auth_and_version_headers() {
    let mock = MockNotion::start(vec![MockResponse::Page(json!({
        "results": [],
        "has_more": false,
        "next_cursor": null,
    }))])
    .await;

    client_for(&mock).query_all().await.expect("query should succeed");

    let requests = mock.state.requests.lock().unwrap();
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer test-token")
    );
    assert_eq!(requests[0].notion_version.as_deref(), Some("2022-06-28"));
}

#[tokio::test]
async fn changed_since_filter_carries_the_watermark() {
    let mock = MockNotion::start(vec![MockResponse::Page(json!({
        "results": [],
        "has_more": false,
        "next_cursor": null,
    }))])
    .await;

    let since = Utc.with_ymd_and_hms(2024, 5, 30, 10, 0, 0).unwrap();
    client_for(&mock)
        .query_changed_since(since)
        .await
        .expect("query should succeed");

    let requests = mock.requests();
    assert_eq!(
        requests[0]["filter"],
        json!({
            "timestamp": "last_edited_time",
            "last_edited_time": { "on_or_after": "2024-05-30T10:00:00.000Z" },
        })
    );
}

#[tokio::test]
async fn group_filter_targets_the_schema_property() {
    let mock = MockNotion::start(vec![MockResponse::Page(json!({
        "results": [page_json("a", "Vitamin D", "OK")],
        "has_more": false,
        "next_cursor": null,
    }))])
    .await;

    let records = client_for(&mock)
        .query_group("Health")
        .await
        .expect("query should succeed");
    assert_eq!(records.len(), 1);

    let requests = mock.requests();
    assert_eq!(
        requests[0]["filter"],
        json!({ "property": "Group", "select": { "equals": "Health" } })
    );
}

#[tokio::test]
async fn more_pages_without_cursor_is_a_protocol_error() {
    let mock = MockNotion::start(vec![MockResponse::Page(json!({
        "results": [page_json("a", "First", "OK")],
        "has_more": true,
        "next_cursor": null,
    }))])
    .await;

    let err = client_for(&mock)
        .query_all()
        .await
        .expect_err("missing cursor should fail");
    assert!(matches!(err, FetchError::MissingCursor));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mock = MockNotion::start(vec![MockResponse::Status(StatusCode::TOO_MANY_REQUESTS)]).await;

    let err = client_for(&mock)
        .query_all()
        .await
        .expect_err("429 should fail");
    assert!(matches!(err, FetchError::UnexpectedStatus { status: 429 }));
}

#[tokio::test]
async fn endless_cursor_chain_hits_the_page_cap() {
    let responses = (0..MAX_PAGES)
        .map(|i| {
            MockResponse::Page(json!({
                "results": [],
                "has_more": true,
                "next_cursor": format!("cursor-{i}"),
            }))
        })
        .collect();
    let mock = MockNotion::start(responses).await;

    let err = client_for(&mock)
        .query_all()
        .await
        .expect_err("endless pagination should fail");
    assert!(matches!(
        err,
        FetchError::PageLimitExceeded { limit } if limit == MAX_PAGES
    ));

    // The walk stopped at the cap instead of asking for another page.
    assert_eq!(mock.requests().len(), MAX_PAGES);
}
