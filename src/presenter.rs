use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data_models::{Direction, ScheduleEvent, SearchResult};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Control {
    pub direction: Direction,
    pub label: String,
    pub disabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ControlRow {
    pub prev: Control,
    pub next: Control,
}

impl ControlRow {
    pub fn new(page: u32, has_more: bool) -> ControlRow {
        ControlRow {
            prev: Control {
                direction: Direction::Prev,
                label: "◀ Back".to_string(),
                disabled: page <= 1,
            },
            next: Control {
                direction: Direction::Next,
                label: "Next ▶".to_string(),
                disabled: !has_more,
            },
        }
    }

    pub fn is_enabled(&self, direction: Direction) -> bool {
        match direction {
            Direction::Prev => !self.prev.disabled,
            Direction::Next => !self.next.disabled,
        }
    }
}

/// What the host renders as one reply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DisplayPayload {
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
    pub thumbnail: Option<String>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub controls: Option<ControlRow>,
}

impl DisplayPayload {
    /// Same content, navigation detached.
    pub fn without_controls(&self) -> DisplayPayload {
        DisplayPayload {
            controls: None,
            ..self.clone()
        }
    }
}

pub struct PageView<'a> {
    pub query: &'a str,
    pub results: &'a [SearchResult],
    pub page: u32,
    pub has_more: bool,
    pub search_url: &'a str,
}

pub fn render_page(view: &PageView<'_>, now: DateTime<Utc>) -> DisplayPayload {
    let fields = view
        .results
        .iter()
        .enumerate()
        .map(|(i, item)| EmbedField {
            name: format!("{}. {}", i + 1, item.title),
            value: format!("{}\n[Open listing]({})", item.price, item.link),
        })
        .collect();

    let row = ControlRow::new(view.page, view.has_more);
    let controls =
        (row.is_enabled(Direction::Prev) || row.is_enabled(Direction::Next)).then_some(row);

    DisplayPayload {
        title: format!("Search results: {}", view.query),
        url: Some(view.search_url.to_string()),
        description: None,
        fields,
        thumbnail: view.results.first().and_then(|r| r.image_url.clone()),
        footer: Some(format!("Page {}", view.page)),
        timestamp: Some(now),
        controls,
    }
}

pub fn render_empty(query: &str) -> DisplayPayload {
    DisplayPayload {
        title: format!("Search results: {query}"),
        description: Some(format!("Nothing found for \"{query}\".")),
        ..Default::default()
    }
}

pub fn render_notice(title: &str, text: &str) -> DisplayPayload {
    DisplayPayload {
        title: title.to_string(),
        description: Some(text.to_string()),
        ..Default::default()
    }
}

pub fn render_help() -> DisplayPayload {
    DisplayPayload {
        title: "Bot commands".to_string(),
        description: Some(
            [
                "/search <query> - search the classifieds",
                "/schedule add <DD.MM.YYYY> <HH:MM[-HH:MM]> <title> - add an event",
                "/schedule list - show upcoming events",
                "/schedule delete <id> - remove an event",
                "/schedule send - post the schedule to this channel",
                "/help - show this message",
            ]
            .join("\n"),
        ),
        ..Default::default()
    }
}

pub fn render_schedule(events: &[ScheduleEvent], now: DateTime<Utc>) -> DisplayPayload {
    let description = events.is_empty().then(|| "No events scheduled.".to_string());
    let fields = events
        .iter()
        .map(|e| EmbedField {
            name: format!("{} {}", e.date, e.time),
            value: format!("{} (added by {}, id {})", e.title, e.created_by, e.id),
        })
        .collect();

    DisplayPayload {
        title: "Schedule".to_string(),
        description,
        fields,
        timestamp: Some(now),
        ..Default::default()
    }
}
