//! Integration tests for lectern-dp API endpoints
//!
//! Drives the full router over an in-memory database and a temporary
//! upload directory: upload → background extraction → status → generation.
//! No external provider is configured, so generation exercises the
//! deterministic local fallback.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

use lectern_common::events::EventBus;
use lectern_dp::extractors::{ExtractorSet, Transcriber};
use lectern_dp::generation::GenerationService;
use lectern_dp::models::{FileCategory, FileRecord};
use lectern_dp::pipeline::ProcessingPipeline;
use lectern_dp::storage::FileStorage;
use lectern_dp::{build_router, AppState};

/// Test helper: app with in-memory database, temp uploads, no provider
async fn setup_app() -> (axum::Router, AppState, tempfile::TempDir) {
    let pool = lectern_dp::db::init_memory_pool()
        .await
        .expect("Should create in-memory database");

    let tmp = tempfile::tempdir().expect("Should create temp dir");
    let storage = FileStorage::new(tmp.path().join("uploads"));
    storage.init().expect("Should create upload dir");

    let event_bus = EventBus::new(100);
    let extractors = Arc::new(ExtractorSet::new(Arc::new(Transcriber::disabled())));
    let pipeline = ProcessingPipeline::new(pool.clone(), event_bus.clone(), extractors);
    let generation = Arc::new(GenerationService::new(None));

    let state = AppState::new(pool, event_bus, storage, pipeline, generation);
    (build_router(state.clone()), state, tmp)
}

/// Test helper: request with empty body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: hand-built multipart upload body
fn multipart_request(files: &[(&str, &[u8])]) -> Request<Body> {
    let boundary = "lectern-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Test helper: minimal single-slide deck bytes
fn minimal_pptx(slide_text: &str) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        let options = zip::write::FileOptions::default();
        writer.start_file("ppt/slides/slide1.xml", options).unwrap();
        let xml = format!(
            r#"<?xml version="1.0"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><p:txBody><a:p><a:r><a:t>{slide_text}</a:t></a:r></a:p></p:txBody></p:sld>"#
        );
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buf.into_inner()
}

/// Test helper: poll /status until overall status is "completed"
async fn wait_until_completed(app: &axum::Router, session_id: &str) -> Value {
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(test_request("GET", &format!("/status/{session_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = extract_json(response.into_body()).await;
        if body["status"] == "completed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("Session {session_id} never finished processing");
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state, _tmp) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lectern-dp");
    assert!(body["version"].is_string());
}

// =============================================================================
// Upload Tests
// =============================================================================

#[tokio::test]
async fn test_upload_rejects_unsupported_file_type() {
    let (app, _state, _tmp) = setup_app().await;

    let request = multipart_request(&[("notes.txt", b"plain text")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("notes.txt"));
}

#[tokio::test]
async fn test_upload_without_files_is_rejected() {
    let (app, _state, _tmp) = setup_app().await;

    let request = multipart_request(&[]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_returns_session_and_categories() {
    let (app, _state, _tmp) = setup_app().await;

    let deck = minimal_pptx("Cell division");
    let request = multipart_request(&[("deck.pptx", deck.as_slice()), ("extra.pdf", b"x")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(Uuid::parse_str(body["session_id"].as_str().unwrap()).is_ok());
    assert_eq!(body["files"][0]["filename"], "deck.pptx");
    assert_eq!(body["files"][0]["file_type"], "pptx");
    assert_eq!(body["files"][1]["file_type"], "pdf");
}

// =============================================================================
// Status Tests
// =============================================================================

#[tokio::test]
async fn test_status_unknown_session_is_404() {
    let (app, _state, _tmp) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", &format!("/status/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_partial_failure_still_completes_session() {
    let (app, _state, _tmp) = setup_app().await;

    // One valid slide deck, one corrupt PDF: exactly one completed and one
    // failed unit, and the session as a whole still reaches "completed"
    let deck = minimal_pptx("Photosynthesis converts light energy into chemical energy");
    let request = multipart_request(&[
        ("deck.pptx", deck.as_slice()),
        ("broken.pdf", b"this is not a pdf"),
    ]);
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let upload = extract_json(response.into_body()).await;
    let session_id = upload["session_id"].as_str().unwrap().to_string();

    let status = wait_until_completed(&app, &session_id).await;
    let files = status["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);

    let deck_status = files.iter().find(|f| f["filename"] == "deck.pptx").unwrap();
    let pdf_status = files.iter().find(|f| f["filename"] == "broken.pdf").unwrap();
    assert_eq!(deck_status["status"], "completed");
    assert_eq!(pdf_status["status"], "failed");
}

// =============================================================================
// Generation Tests
// =============================================================================

#[tokio::test]
async fn test_summary_aggregates_only_completed_files() {
    let (app, _state, _tmp) = setup_app().await;

    let deck = minimal_pptx("Photosynthesis converts light energy");
    let request = multipart_request(&[
        ("deck.pptx", deck.as_slice()),
        ("broken.pdf", b"garbage"),
    ]);
    let response = app.clone().oneshot(request).await.unwrap();
    let upload = extract_json(response.into_body()).await;
    let session_id = upload["session_id"].as_str().unwrap().to_string();

    wait_until_completed(&app, &session_id).await;

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            &format!("/summary/{session_id}?summary_type=short"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["summary_type"], "short");
    // Fallback summary derives from the slide text; the corrupt PDF
    // contributes nothing
    let content = body["content"].as_str().unwrap();
    assert!(content.contains("Photosynthesis"), "{content}");
}

#[tokio::test]
async fn test_summary_invalid_tier_is_400() {
    let (app, _state, _tmp) = setup_app().await;

    let deck = minimal_pptx("Slide");
    let request = multipart_request(&[("deck.pptx", deck.as_slice())]);
    let response = app.clone().oneshot(request).await.unwrap();
    let upload = extract_json(response.into_body()).await;
    let session_id = upload["session_id"].as_str().unwrap().to_string();
    wait_until_completed(&app, &session_id).await;

    let response = app
        .oneshot(test_request(
            "GET",
            &format!("/summary/{session_id}?summary_type=gigantic"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_unknown_session_is_404() {
    let (app, _state, _tmp) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", &format!("/summary/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generation_rejected_while_processing() {
    let (app, state, _tmp) = setup_app().await;

    // Insert a pending record directly; the pipeline never sees it, so the
    // session stays non-terminal
    let session_id = Uuid::new_v4();
    let file = FileRecord::new(
        session_id,
        "slow.pdf".into(),
        "/tmp/slow.pdf".into(),
        FileCategory::Pdf,
        0,
        0,
    );
    lectern_dp::db::files::insert_file(&state.db, &file)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(test_request("GET", &format!("/summary/{session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "STILL_PROCESSING");

    let response = app
        .oneshot(test_request("GET", &format!("/quiz/{session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quiz_count_validation_and_shape() {
    let (app, _state, _tmp) = setup_app().await;

    let deck = minimal_pptx("Mitochondria produce ATP through cellular respiration");
    let request = multipart_request(&[("deck.pptx", deck.as_slice())]);
    let response = app.clone().oneshot(request).await.unwrap();
    let upload = extract_json(response.into_body()).await;
    let session_id = upload["session_id"].as_str().unwrap().to_string();
    wait_until_completed(&app, &session_id).await;

    // Out-of-range count rejected before any generation
    for bad in [4, 51] {
        let response = app
            .clone()
            .oneshot(test_request(
                "GET",
                &format!("/quiz/{session_id}?question_count={bad}"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "count {bad}");
    }

    // count=5 returns exactly 5 questions with options A-D
    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            &format!("/quiz/{session_id}?question_count=5"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    for q in questions {
        let options = q["options"].as_object().unwrap();
        let labels: Vec<&str> = options.keys().map(String::as_str).collect();
        assert_eq!(labels, ["A", "B", "C", "D"]);
        assert!(["A", "B", "C", "D"]
            .contains(&q["correct_answer"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_artifacts_are_memoized() {
    let (app, _state, _tmp) = setup_app().await;

    let deck = minimal_pptx("The Krebs cycle oxidizes acetyl-CoA");
    let request = multipart_request(&[("deck.pptx", deck.as_slice())]);
    let response = app.clone().oneshot(request).await.unwrap();
    let upload = extract_json(response.into_body()).await;
    let session_id = upload["session_id"].as_str().unwrap().to_string();
    wait_until_completed(&app, &session_id).await;

    let uri = format!("/quiz/{session_id}?question_count=10");
    let first = extract_json(
        app.clone()
            .oneshot(test_request("GET", &uri))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let second = extract_json(
        app.clone()
            .oneshot(test_request("GET", &uri))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    // Identical artifact, including creation time: generated once
    assert_eq!(first, second);
    assert_eq!(first["questions"].as_array().unwrap().len(), 10);
}

// =============================================================================
// Saved Session Tests
// =============================================================================

#[tokio::test]
async fn test_save_session_and_listing() {
    let (app, _state, _tmp) = setup_app().await;

    // Unknown session cannot be saved
    let request = Request::builder()
        .method("POST")
        .uri(format!("/save-session/{}", Uuid::new_v4()))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("session_name=Ghost"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Upload, then save under a name
    let deck = minimal_pptx("Slide");
    let response = app
        .clone()
        .oneshot(multipart_request(&[("deck.pptx", deck.as_slice())]))
        .await
        .unwrap();
    let upload = extract_json(response.into_body()).await;
    let session_id = upload["session_id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/save-session/{session_id}"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("session_name=Biology+week+1"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(
        app.clone()
            .oneshot(test_request("GET", "/saved-sessions"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let sessions = body.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["session_name"], "Biology week 1");
    assert_eq!(sessions[0]["session_id"], session_id);

    // Per-file listing includes size and status
    let body = extract_json(
        app.oneshot(test_request("GET", &format!("/session/{session_id}/files")))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let files = body.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "deck.pptx");
    assert!(files[0]["file_size"].as_i64().unwrap() > 0);
}
