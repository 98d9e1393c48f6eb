//! Interactive pagination sessions.
//!
//! A session is bound 1:1 to the reply it controls and lives in the
//! [`SessionRegistry`] under that reply's message id. It is `Active` until its
//! inactivity window runs out (or its reply disappears) and `Expired` forever
//! after; a new search always starts a new session.
//!
//! Mutable pagination state sits behind a per-session async mutex. A
//! navigation first raises the session's in-flight flag, then waits for the
//! mutex and holds both across the fetch. A second click while the flag is up
//! is rejected as busy; the watchdog only takes the mutex, so its brief
//! deadline checks delay a click instead of rejecting it.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::data_models::{Direction, MessageId, UserId};
use crate::error::{BotError, Result};
use crate::presenter::DisplayPayload;
use crate::target::RenderTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Expired,
}

#[derive(Debug, Clone)]
pub struct Cursor {
    pub current_page: u32,
    pub has_more: bool,
    pub expires_at: Instant,
    pub phase: Phase,
    /// Last payload shown on the reply; kept so expiry can detach controls only.
    pub payload: DisplayPayload,
}

impl Cursor {
    pub fn new(has_more: bool, payload: DisplayPayload, expires_at: Instant) -> Cursor {
        Cursor {
            current_page: 1,
            has_more,
            expires_at,
            phase: Phase::Active,
            payload,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.phase == Phase::Expired || now >= self.expires_at
    }

    /// Validates a navigation and returns the page it leads to. Does not mutate.
    pub fn plan(&self, direction: Direction, now: Instant) -> Result<u32> {
        if self.is_expired(now) {
            return Err(BotError::SessionExpired);
        }
        let allowed = match direction {
            Direction::Prev => self.current_page > 1,
            Direction::Next => self.has_more,
        };
        if !allowed {
            return Err(BotError::PageUnavailable(direction));
        }
        direction
            .apply(self.current_page)
            .ok_or(BotError::PageUnavailable(direction))
    }

    /// Records an accepted navigation and re-arms the inactivity window.
    pub fn commit(
        &mut self,
        page: u32,
        has_more: bool,
        payload: DisplayPayload,
        expires_at: Instant,
    ) {
        self.current_page = page;
        self.has_more = has_more;
        self.payload = payload;
        self.expires_at = expires_at;
    }

    /// Moves to `Expired` and returns the payload with its controls detached.
    pub fn expire(&mut self) -> DisplayPayload {
        self.phase = Phase::Expired;
        self.payload.without_controls()
    }
}

pub struct SearchSession {
    owner_id: UserId,
    query: String,
    window: Duration,
    in_flight: AtomicBool,
    cursor: Mutex<Cursor>,
}

/// Lowers the in-flight flag when the navigation ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Exclusive access to a session's cursor for one navigation.
pub struct Navigation<'a> {
    cursor: MutexGuard<'a, Cursor>,
    _flight: FlightGuard<'a>,
}

impl Deref for Navigation<'_> {
    type Target = Cursor;

    fn deref(&self) -> &Cursor {
        &self.cursor
    }
}

impl DerefMut for Navigation<'_> {
    fn deref_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }
}

impl SearchSession {
    pub fn new(
        owner_id: UserId,
        query: String,
        has_more: bool,
        payload: DisplayPayload,
        window: Duration,
    ) -> SearchSession {
        let cursor = Cursor::new(has_more, payload, Instant::now() + window);
        SearchSession {
            owner_id,
            query,
            window,
            in_flight: AtomicBool::new(false),
            cursor: Mutex::new(cursor),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn authorize(&self, actor: &str) -> Result<()> {
        if actor == self.owner_id {
            Ok(())
        } else {
            Err(BotError::UnauthorizedActor)
        }
    }

    /// Deadline for an activity happening now.
    pub fn next_deadline(&self) -> Instant {
        Instant::now() + self.window
    }

    /// Claims the session for one navigation, or fails if another is in flight.
    pub async fn begin(&self) -> Result<Navigation<'_>> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(BotError::SessionBusy);
        }
        let flight = FlightGuard(&self.in_flight);
        let cursor = self.cursor.lock().await;
        Ok(Navigation {
            cursor,
            _flight: flight,
        })
    }

    pub async fn cursor(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().await
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<MessageId, Arc<SearchSession>>,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry::default()
    }

    pub fn install(&self, message_id: MessageId, session: SearchSession) -> Arc<SearchSession> {
        let session = Arc::new(session);
        if self
            .sessions
            .insert(message_id.clone(), session.clone())
            .is_some()
        {
            log::warn!("replaced existing session for message {message_id}");
        }
        session
    }

    pub fn get(&self, message_id: &str) -> Option<Arc<SearchSession>> {
        self.sessions.get(message_id).map(|s| s.value().clone())
    }

    /// Removes the entry only if it still holds `session`.
    pub fn remove(&self, message_id: &str, session: &Arc<SearchSession>) {
        self.sessions
            .remove_if(message_id, |_, current| Arc::ptr_eq(current, session));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawns the inactivity watchdog for a session. When the window elapses
    /// with no accepted navigation the session expires, leaves the registry and
    /// its reply loses its controls.
    pub fn watch(
        self: &Arc<Self>,
        message_id: MessageId,
        session: Arc<SearchSession>,
        target: Arc<dyn RenderTarget>,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            loop {
                let deadline = session.cursor().await.expires_at;
                tokio::time::sleep_until(deadline).await;

                let mut cursor = session.cursor().await;
                if cursor.phase == Phase::Expired {
                    break;
                }
                if Instant::now() < cursor.expires_at {
                    continue;
                }
                let stripped = cursor.expire();
                drop(cursor);

                registry.remove(&message_id, &session);
                log::info!("session for message {message_id} expired");
                if let Err(e) = target.edit(&message_id, stripped).await {
                    log::warn!("failed to detach controls from {message_id}: {e}");
                }
                break;
            }
        })
    }
}
