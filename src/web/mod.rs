mod handlers;

use crate::components::{CalendarService, IntentClassifier, MessagingService};
use crate::dispatch::Dispatcher;
use axum::{
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use handlers::{CalendarRequest, ChatRequest, SendMessageRequest};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub classifier: Arc<dyn IntentClassifier>,
    pub calendar: Arc<dyn CalendarService>,
    pub messaging: Arc<dyn MessagingService>,
    /// Timezone stamped on events created through `/calendar`
    pub timezone: Tz,
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/calendar", post(handlers::calendar_handler))
        .route("/chatgpt", post(handlers::chat_handler))
        .route("/send-message", post(handlers::send_message_handler))
        .route("/health", get(handlers::health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
