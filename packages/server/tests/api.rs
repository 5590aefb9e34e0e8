//! Route-level tests with mock extraction services.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use extraction::testing::{MockAI, MockTranscriptSource};
use extraction::{Acquirer, JobStore, MemoryStore, Pipeline, TranscriptStrategy, WorkerPool};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server_core::{build_app, AppState};
use tower::ServiceExt;

fn cooking_transcript() -> String {
    "First we cut the onions and add them to the pot. Then pour in the stock \
     and heat it until it simmers. Mix in the spices and cook for twenty \
     minutes. Finally we make the garnish and serve. This recipe feeds four \
     people comfortably."
        .to_string()
}

fn test_app() -> (Router, Arc<MemoryStore>) {
    test_app_with_upload_limit(server_core::DEFAULT_MAX_UPLOAD_BYTES)
}

fn test_app_with_upload_limit(max_upload_bytes: usize) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let acquirer = Acquirer::new(vec![Box::new(TranscriptStrategy::new(Arc::new(
        MockTranscriptSource::returning(cooking_transcript(), 12),
    )))]);
    let pipeline = Pipeline::new(
        acquirer,
        Arc::new(MockAI::new()),
        store.clone(),
        store.clone(),
        std::env::temp_dir().join("server-api-tests"),
    );
    let (queue, _pool) = WorkerPool::spawn(Arc::new(pipeline), 2);

    let state = AppState::new(
        store.clone(),
        store.clone(),
        queue,
        std::env::temp_dir().join("server-api-tests-uploads"),
        max_upload_bytes,
    );
    (build_app(state), store)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_url_request(url: &str, owner_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/guides/process-url")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "url": url, "owner_id": owner_id }).to_string(),
        ))
        .unwrap()
}

fn post_upload_request(owner_id: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"owner_id\"\r\n\r\n{owner_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; \
             filename=\"{file_name}\"\r\nContent-Type: video/mp4\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/guides/process-upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn poll_until_terminal(app: &Router, job_id: &str, owner_id: &str) -> Value {
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/jobs/{job_id}?owner_id={owner_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let status = body["status"].as_str().unwrap();
        if status == "completed" || status == "failed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job never reached a terminal state");
}

#[tokio::test]
async fn health_reports_ok_and_queue_depth() {
    let (app, _store) = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["queue_depth"].is_u64());
}

#[tokio::test]
async fn url_submission_returns_job_then_guide_on_poll() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(post_url_request(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = json_body(response).await;
    assert_eq!(body["cached"], false);
    assert_eq!(body["status"], "pending");
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let done = poll_until_terminal(&app, &job_id, "alice").await;
    assert_eq!(done["status"], "completed");
    assert_eq!(done["progress"], 100);
    assert!(done["guide"]["title"].is_string());
    assert!(!done["guide"]["steps"].as_array().unwrap().is_empty());
    assert!(done.get("error").is_none());
}

#[tokio::test]
async fn resubmission_answers_from_cache() {
    let (app, _store) = test_app();

    let first = app
        .clone()
        .oneshot(post_url_request(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "alice",
        ))
        .await
        .unwrap();
    let job_id = json_body(first).await["job_id"].as_str().unwrap().to_string();
    poll_until_terminal(&app, &job_id, "alice").await;

    // Same video through a share link with tracking params, different owner.
    let second = app
        .clone()
        .oneshot(post_url_request(
            "https://youtu.be/dQw4w9WgXcQ?si=abc&utm_source=share",
            "bob",
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let body = json_body(second).await;
    assert_eq!(body["cached"], true);
    assert!(body["guide"]["title"].is_string());
    assert!(body.get("job_id").is_none());
}

#[tokio::test]
async fn multi_megabyte_upload_is_accepted() {
    let (app, _store) = test_app();

    // Well past the 2 MB framework default; a real phone clip is bigger still.
    let video = vec![0x5au8; 3 * 1024 * 1024];
    let response = app
        .oneshot(post_upload_request("alice", "clip.mp4", &video))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = json_body(response).await;
    assert_eq!(body["cached"], false);
    assert!(body["job_id"].is_string());
}

#[tokio::test]
async fn upload_past_the_configured_limit_is_rejected() {
    let (app, store) = test_app_with_upload_limit(1024);

    let video = vec![0x5au8; 8 * 1024];
    let response = app
        .oneshot(post_upload_request("alice", "clip.mp4", &video))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Nothing was created for the rejected upload.
    let jobs = store.list_for_owner("alice", 10, 0).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn invalid_submissions_are_rejected() {
    let (app, _store) = test_app();

    let bad_url = app
        .clone()
        .oneshot(post_url_request("notaurl", "alice"))
        .await
        .unwrap();
    assert_eq!(bad_url.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(bad_url).await["error"].is_string());

    let no_owner = app
        .clone()
        .oneshot(post_url_request("https://example.com/a", "  "))
        .await
        .unwrap();
    assert_eq!(no_owner.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_and_unowned_jobs_both_404() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(post_url_request(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "alice",
        ))
        .await
        .unwrap();
    let job_id = json_body(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();

    let wrong_owner = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/jobs/{job_id}?owner_id=mallory"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong_owner.status(), StatusCode::NOT_FOUND);

    let unknown = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/api/jobs/{}?owner_id=alice",
                    uuid::Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    // Identical status and shape either way.
    let body = json_body(unknown).await;
    assert_eq!(body["error"], "job not found");
}

#[tokio::test]
async fn job_listing_is_owner_scoped() {
    let (app, _store) = test_app();

    for id in ["aaaaaaaaaaa", "bbbbbbbbbbb"] {
        app.clone()
            .oneshot(post_url_request(
                &format!("https://www.youtube.com/watch?v={id}"),
                "alice",
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/jobs?owner_id=alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["jobs"].as_array().unwrap().len(), 2);

    let other = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/jobs?owner_id=bob")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(other).await;
    assert!(body["jobs"].as_array().unwrap().is_empty());
}
