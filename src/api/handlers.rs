use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::data_models::ScheduleEvent;
use crate::dispatcher::SearchOutcome;
use crate::error::BotError;
use crate::presenter::{self, DisplayPayload};

use super::AppState;
use super::models::{
    AddEventRequest, EventsResponse, MessageResponse, NavigateRequest, NavigateResponse,
    PostedResponse, SearchRequest, SearchResponse, SendScheduleRequest,
};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn status_for(error: &BotError) -> StatusCode {
    match error {
        BotError::EmptyQuery | BotError::PageUnavailable(_) | BotError::InvalidEvent { .. } => {
            StatusCode::BAD_REQUEST
        }
        BotError::UnauthorizedActor => StatusCode::FORBIDDEN,
        BotError::SessionBusy => StatusCode::CONFLICT,
        BotError::SessionExpired | BotError::RenderTargetGone(_) => StatusCode::GONE,
        BotError::EventNotFound(_) => StatusCode::NOT_FOUND,
        BotError::Network(_) => StatusCode::BAD_GATEWAY,
        BotError::InvalidUrl(_)
        | BotError::Selector { .. }
        | BotError::Io(_)
        | BotError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: BotError) -> (StatusCode, String) {
    (status_for(&error), error.user_notice())
}

fn message_payload(state: &AppState, id: &str) -> Result<DisplayPayload, (StatusCode, String)> {
    state
        .board
        .get(id)
        .map(|m| m.payload)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Message {id} not found")))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    let outcome = state
        .dispatcher
        .on_fresh_query(&request.actor, &request.channel, &request.query)
        .await
        .map_err(reject)?;

    let (message_id, interactive) = match outcome {
        SearchOutcome::Listing {
            message_id,
            interactive,
        } => (message_id, interactive),
        SearchOutcome::Empty { message_id } => (message_id, false),
    };
    let payload = message_payload(&state, &message_id)?;

    Ok(Json(SearchResponse {
        message_id,
        interactive,
        payload,
    }))
}

pub async fn navigate_handler(
    State(state): State<AppState>,
    Json(request): Json<NavigateRequest>,
) -> ApiResult<NavigateResponse> {
    let page = state
        .dispatcher
        .on_navigation(&request.actor, &request.message_id, request.direction)
        .await
        .map_err(reject)?;
    let payload = message_payload(&state, &request.message_id)?;

    Ok(Json(NavigateResponse { page, payload }))
}

pub async fn get_message_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let message = state
        .board
        .get(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Message {id} not found")))?;

    Ok(Json(MessageResponse {
        message_id: id,
        channel: message.channel,
        payload: message.payload,
    }))
}

pub async fn delete_message_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.board.delete(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn notices_handler(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Json<Vec<String>> {
    Json(state.board.take_notices(&user))
}

pub async fn help_handler() -> Json<DisplayPayload> {
    Json(presenter::render_help())
}

pub async fn add_event_handler(
    State(state): State<AppState>,
    Json(request): Json<AddEventRequest>,
) -> ApiResult<ScheduleEvent> {
    let event = state
        .schedule
        .add(&request.date, &request.time, &request.title, &request.created_by)
        .await
        .map_err(reject)?;
    Ok(Json(event))
}

pub async fn list_events_handler(State(state): State<AppState>) -> ApiResult<EventsResponse> {
    let events = state.schedule.list().await.map_err(reject)?;
    Ok(Json(EventsResponse { events }))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ScheduleEvent> {
    let removed = state.schedule.delete(&id).await.map_err(reject)?;
    Ok(Json(removed))
}

pub async fn send_schedule_handler(
    State(state): State<AppState>,
    Json(request): Json<SendScheduleRequest>,
) -> ApiResult<PostedResponse> {
    let message_id = state
        .schedule
        .send(state.board.as_ref(), &request.channel)
        .await
        .map_err(reject)?;
    Ok(Json(PostedResponse { message_id }))
}
