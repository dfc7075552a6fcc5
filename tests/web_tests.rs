mod mocks;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chat_scheduler::web::{router, AppState};
use mocks::{dispatcher, MockCalendar, MockClassifier, MockMessaging, MockScheduler};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(classifier: Arc<MockClassifier>, calendar: Arc<MockCalendar>, messaging: Arc<MockMessaging>) -> Router {
    let state = AppState {
        dispatcher: dispatcher(
            Arc::clone(&calendar),
            Arc::clone(&messaging),
            Arc::new(MockScheduler::new()),
        ),
        classifier,
        calendar,
        messaging,
        timezone: chrono_tz::America::Los_Angeles,
    };
    router(state)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_chat_dispatches_classifier_answer() {
    let classifier = Arc::new(MockClassifier::answering(
        r#"{"intent": "query_schedule", "details": {"date": "2024-06-05"}}"#,
    ));
    let app = app(
        Arc::clone(&classifier),
        Arc::new(MockCalendar::new()),
        Arc::new(MockMessaging::new()),
    );

    let (status, body) = post_json(
        app,
        "/chatgpt",
        json!({ "message": "What is on my schedule for June 5th?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "No events scheduled for 2024-06-05" }));
    assert_eq!(classifier.prompts(), vec!["What is on my schedule for June 5th?".to_string()]);
}

#[tokio::test]
async fn test_chat_malformed_answer_is_still_200() {
    let app = app(
        Arc::new(MockClassifier::answering("Sure! Here is your event.")),
        Arc::new(MockCalendar::new()),
        Arc::new(MockMessaging::new()),
    );

    let (status, body) = post_json(app, "/chatgpt", json!({ "message": "hello" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "response": "There was an error processing your request." })
    );
}

#[tokio::test]
async fn test_chat_classifier_failure() {
    let app = app(
        Arc::new(MockClassifier::failing()),
        Arc::new(MockCalendar::new()),
        Arc::new(MockMessaging::new()),
    );

    let (status, body) = post_json(app, "/chatgpt", json!({ "message": "hello" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Please provide a valid command." }));
}

#[tokio::test]
async fn test_calendar_route_creates_event() {
    let calendar = Arc::new(MockCalendar::new());
    let app = app(
        Arc::new(MockClassifier::failing()),
        Arc::clone(&calendar),
        Arc::new(MockMessaging::new()),
    );

    let (status, body) = post_json(
        app,
        "/calendar",
        json!({
            "summary": "Meeting",
            "description": "Discuss project",
            "start": "2024-06-05T10:00:00-07:00",
            "end": "2024-06-05T11:00:00-07:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["summary"], "Meeting");
    let inserted = calendar.inserted();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].start.time_zone, "America/Los_Angeles");
}

#[tokio::test]
async fn test_calendar_route_reports_failure() {
    let app = app(
        Arc::new(MockClassifier::failing()),
        Arc::new(MockCalendar::failing()),
        Arc::new(MockMessaging::new()),
    );

    let (status, body) = post_json(
        app,
        "/calendar",
        json!({
            "summary": "Meeting",
            "start": "2024-06-05T10:00:00-07:00",
            "end": "2024-06-05T11:00:00-07:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn test_send_message_route() {
    let messaging = Arc::new(MockMessaging::new());
    let app = app(
        Arc::new(MockClassifier::failing()),
        Arc::new(MockCalendar::new()),
        Arc::clone(&messaging),
    );

    let (status, body) = post_json(
        app,
        "/send-message",
        json!({ "to": "+15551234567", "message": "Hello" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["status"], "queued");
    assert_eq!(
        messaging.sent(),
        vec![("+15551234567".to_string(), "Hello".to_string())]
    );
}

#[tokio::test]
async fn test_health() {
    let app = app(
        Arc::new(MockClassifier::failing()),
        Arc::new(MockCalendar::new()),
        Arc::new(MockMessaging::new()),
    );

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}
