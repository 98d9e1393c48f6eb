use thiserror::Error;

use crate::data_models::{Direction, MessageId};

#[derive(Error, Debug)]
pub enum BotError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid search url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("search query is empty")]
    EmptyQuery,

    #[error("session belongs to another user")]
    UnauthorizedActor,

    #[error("previous navigation is still loading")]
    SessionBusy,

    #[error("session has expired")]
    SessionExpired,

    #[error("no {0} page available")]
    PageUnavailable(Direction),

    #[error("message {0} is no longer available")]
    RenderTargetGone(MessageId),

    #[error("invalid schedule event: {message}")]
    InvalidEvent { message: String },

    #[error("schedule event {0} not found")]
    EventNotFound(String),

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store format error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;

impl BotError {
    pub fn invalid_event(message: impl Into<String>) -> Self {
        BotError::InvalidEvent {
            message: message.into(),
        }
    }

    /// Text shown to the user who triggered the failing action.
    pub fn user_notice(&self) -> String {
        match self {
            BotError::Network(_) | BotError::InvalidUrl(_) | BotError::Selector { .. } => {
                "Search failed. Please try again later.".to_string()
            }
            BotError::EmptyQuery => "Please tell me what to search for.".to_string(),
            BotError::UnauthorizedActor => {
                "This is not your search. Start your own with /search.".to_string()
            }
            BotError::SessionBusy => "Still loading the previous page, hold on.".to_string(),
            BotError::SessionExpired | BotError::RenderTargetGone(_) => {
                "This search has expired. Run /search again.".to_string()
            }
            BotError::PageUnavailable(direction) => format!("There is no {direction} page."),
            BotError::InvalidEvent { message } => format!("Cannot add event: {message}."),
            BotError::EventNotFound(id) => format!("No event with id {id}."),
            BotError::Io(_) | BotError::Serialization(_) => {
                "The schedule is unavailable right now.".to_string()
            }
        }
    }

    /// False for rejections caused by the user rather than by the system.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            BotError::Network(_)
                | BotError::InvalidUrl(_)
                | BotError::Selector { .. }
                | BotError::Io(_)
                | BotError::Serialization(_)
        )
    }
}
