use serde::{Deserialize, Serialize};

use crate::data_models::{Direction, ScheduleEvent};
use crate::presenter::DisplayPayload;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub actor: String,
    pub channel: String,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub message_id: String,
    pub interactive: bool,
    pub payload: DisplayPayload,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub actor: String,
    pub message_id: String,
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub page: u32,
    pub payload: DisplayPayload,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message_id: String,
    pub channel: String,
    pub payload: DisplayPayload,
}

#[derive(Debug, Deserialize)]
pub struct AddEventRequest {
    pub date: String,
    pub time: String,
    pub title: String,
    pub created_by: String,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<ScheduleEvent>,
}

#[derive(Debug, Deserialize)]
pub struct SendScheduleRequest {
    pub channel: String,
}

#[derive(Debug, Serialize)]
pub struct PostedResponse {
    pub message_id: String,
}
