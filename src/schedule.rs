use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use tokio::sync::Mutex;

use crate::data_models::{ChannelId, MessageId, ScheduleEvent, UserId};
use crate::error::{BotError, Result};
use crate::presenter;
use crate::target::RenderTarget;

/// Flat record store for schedule events.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn load(&self) -> Result<Vec<ScheduleEvent>>;
    async fn save(&self, events: &[ScheduleEvent]) -> Result<()>;
}

/// JSON array on disk. A missing file reads as an empty schedule.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScheduleStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<ScheduleEvent>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, events: &[ScheduleEvent]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(events)?;
        // atomic replace
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

const DATE_FORMAT: &str = "%d.%m.%Y";
const TIME_FORMAT: &str = "%H:%M";

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| BotError::invalid_event(format!("date {date:?} is not DD.MM.YYYY")))
}

/// Start time of `HH:MM` or `HH:MM-HH:MM`.
fn parse_time(time: &str) -> Result<NaiveTime> {
    let invalid =
        || BotError::invalid_event(format!("time {time:?} is not HH:MM or HH:MM-HH:MM"));
    let parse =
        |t: &str| NaiveTime::parse_from_str(t.trim(), TIME_FORMAT).map_err(|_| invalid());

    match time.split_once('-') {
        None => parse(time),
        Some((start, end)) => {
            let (start, end) = (parse(start)?, parse(end)?);
            if end <= start {
                return Err(BotError::invalid_event(format!(
                    "time range {time:?} ends before it starts"
                )));
            }
            Ok(start)
        }
    }
}

type SortKey = (Option<NaiveDate>, Option<NaiveTime>, chrono::DateTime<Utc>);

fn sort_key(event: &ScheduleEvent) -> SortKey {
    (
        parse_date(&event.date).ok(),
        parse_time(&event.time).ok(),
        event.created_at,
    )
}

pub struct Schedule<S: ScheduleStore> {
    store: S,
    // serializes load-modify-save cycles
    write_lock: Mutex<()>,
}

impl<S: ScheduleStore> Schedule<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn add(
        &self,
        date: &str,
        time: &str,
        title: &str,
        created_by: &UserId,
    ) -> Result<ScheduleEvent> {
        let (date, time, title) = (date.trim(), time.trim(), title.trim());
        parse_date(date)?;
        parse_time(time)?;
        if title.is_empty() {
            return Err(BotError::invalid_event("title is empty"));
        }

        let event = ScheduleEvent::new(
            date.to_string(),
            time.to_string(),
            title.to_string(),
            created_by.clone(),
        );

        let _guard = self.write_lock.lock().await;
        let mut events = self.store.load().await?;
        events.push(event.clone());
        events.sort_by_key(sort_key);
        self.store.save(&events).await?;

        log::info!("{created_by} added event {} on {date} {time}", event.id);
        Ok(event)
    }

    pub async fn list(&self) -> Result<Vec<ScheduleEvent>> {
        let mut events = self.store.load().await?;
        events.sort_by_key(sort_key);
        Ok(events)
    }

    pub async fn delete(&self, id: &str) -> Result<ScheduleEvent> {
        let _guard = self.write_lock.lock().await;
        let mut events = self.store.load().await?;
        let idx = events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BotError::EventNotFound(id.to_string()))?;
        let removed = events.remove(idx);
        self.store.save(&events).await?;

        log::info!("deleted event {id}");
        Ok(removed)
    }

    /// Posts the current schedule to `channel` as a new message.
    pub async fn send(
        &self,
        target: &dyn RenderTarget,
        channel: &ChannelId,
    ) -> Result<MessageId> {
        let events = self.list().await?;
        target
            .post(channel, presenter::render_schedule(&events, Utc::now()))
            .await
    }
}
