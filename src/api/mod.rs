use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::board::MessageBoard;
use crate::dispatcher::Dispatcher;
use crate::schedule::{JsonFileStore, Schedule};

pub mod handlers;
pub mod models;

/// Shared handles behind every route.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub board: Arc<MessageBoard>,
    pub schedule: Arc<Schedule<JsonFileStore>>,
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", post(handlers::search_handler))
        .route("/api/navigate", post(handlers::navigate_handler))
        .route(
            "/api/messages/:id",
            get(handlers::get_message_handler).delete(handlers::delete_message_handler),
        )
        .route("/api/notices/:user", get(handlers::notices_handler))
        .route("/api/help", get(handlers::help_handler))
        .route(
            "/api/schedule",
            get(handlers::list_events_handler).post(handlers::add_event_handler),
        )
        .route("/api/schedule/send", post(handlers::send_schedule_handler))
        .route("/api/schedule/:id", delete(handlers::delete_event_handler))
        .with_state(state)
        .layer(cors)
}
