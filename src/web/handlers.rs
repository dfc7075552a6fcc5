use super::AppState;
use crate::components::classifier::SYSTEM_PROMPT;
use crate::components::google_calendar::{EventTime, NewEvent};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

type JsonResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Debug, Deserialize)]
pub struct CalendarRequest {
    pub summary: String,
    pub description: Option<String>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub to: String,
    pub message: String,
}

fn internal_error(message: String) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message })))
}

/// Create one calendar event directly
pub async fn calendar_handler(State(state): State<AppState>, Json(request): Json<CalendarRequest>) -> JsonResult {
    let time_zone = state.timezone.name().to_string();
    let event = NewEvent {
        summary: request.summary,
        description: request.description,
        start: EventTime {
            date_time: request.start,
            time_zone: time_zone.clone(),
        },
        end: EventTime {
            date_time: request.end,
            time_zone,
        },
    };

    match state.calendar.insert_event(&event).await {
        Ok(created) => Ok(Json(json!({ "response": created }))),
        Err(e) => {
            error!("Failed to create calendar event: {}", e);
            Err(internal_error(e.to_string()))
        }
    }
}

/// Classify a free-text command and carry it out.
///
/// Always answers 200; failures are described in the body.
pub async fn chat_handler(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<Value> {
    let raw = match state.classifier.classify(&request.message, SYSTEM_PROMPT).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Invalid classifier response: {}", e);
            return Json(json!({ "error": "Please provide a valid command." }));
        }
    };

    info!("Classifier response: {}", raw);
    let response = state.dispatcher.dispatch(&raw).await;
    Json(json!({ "response": response }))
}

/// Send one SMS immediately
pub async fn send_message_handler(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> JsonResult {
    match state.messaging.send_message(&request.to, &request.message).await {
        Ok(sent) => Ok(Json(json!({ "response": sent }))),
        Err(e) => {
            error!("Failed to send message to {}: {}", request.to, e);
            Err(internal_error(e.to_string()))
        }
    }
}

/// Liveness probe
pub async fn health_handler() -> impl IntoResponse {
    "OK"
}
