use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type ChannelId = String;
pub type MessageId = String;

/// One scraped listing card. Built by the extractor, never mutated afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub price: String,
    pub link: String,
    pub image_url: Option<String>,
}

/// Everything the extractor pulls out of one search-results document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub results: Vec<SearchResult>,
    pub has_more: bool,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    /// Page reached by moving from `page` in this direction, if any.
    pub fn apply(self, page: u32) -> Option<u32> {
        match self {
            Direction::Prev if page > 1 => Some(page - 1),
            Direction::Prev => None,
            Direction::Next => page.checked_add(1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Prev => f.write_str("previous"),
            Direction::Next => f.write_str("next"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduleEvent {
    pub id: String,
    /// DD.MM.YYYY
    pub date: String,
    /// HH:MM or HH:MM-HH:MM
    pub time: String,
    pub title: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl ScheduleEvent {
    pub fn new(date: String, time: String, title: String, created_by: UserId) -> ScheduleEvent {
        ScheduleEvent {
            id: nanoid::nanoid!(8),
            date,
            time,
            title,
            created_by,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_apply() {
        assert_eq!(Direction::Prev.apply(1), None);
        assert_eq!(Direction::Prev.apply(3), Some(2));
        assert_eq!(Direction::Next.apply(1), Some(2));
        assert_eq!(Direction::Next.apply(u32::MAX), None);
    }

    #[test]
    fn test_direction_serde() {
        let d: Direction = serde_json::from_str("\"next\"").unwrap();
        assert_eq!(d, Direction::Next);
        assert_eq!(serde_json::to_string(&Direction::Prev).unwrap(), "\"prev\"");
    }
}
