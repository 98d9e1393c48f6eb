use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::data_models::{ChannelId, Direction, Listing, MessageId, UserId};
use crate::error::{BotError, Result};
use crate::extractor::Extractor;
use crate::fetcher::Fetcher;
use crate::presenter::{self, PageView};
use crate::session::{SearchSession, SessionRegistry};
use crate::target::RenderTarget;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// A page of results was posted; `interactive` when a session was installed.
    Listing {
        message_id: MessageId,
        interactive: bool,
    },
    /// Nothing matched; the empty-state reply was posted.
    Empty { message_id: MessageId },
}

/// Entry point for the host: fresh searches and navigation clicks.
pub struct Dispatcher {
    fetcher: Arc<dyn Fetcher>,
    extractor: Extractor,
    target: Arc<dyn RenderTarget>,
    sessions: Arc<SessionRegistry>,
    inactivity: Duration,
}

impl Dispatcher {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Extractor,
        target: Arc<dyn RenderTarget>,
        inactivity: Duration,
    ) -> Dispatcher {
        Dispatcher {
            fetcher,
            extractor,
            target,
            sessions: Arc::new(SessionRegistry::new()),
            inactivity,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    async fn load(&self, query: &str, page: u32) -> Result<(Listing, String)> {
        let url = self.fetcher.search_url(query, page)?;
        let html = self.fetcher.fetch(query, page).await?;
        Ok((self.extractor.extract(&html), url.to_string()))
    }

    /// Runs a new search and replies on `channel` with page 1.
    #[tracing::instrument(skip(self))]
    pub async fn on_fresh_query(
        &self,
        actor: &UserId,
        channel: &ChannelId,
        query: &str,
    ) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            self.target.notify(actor, &BotError::EmptyQuery.user_notice()).await?;
            return Err(BotError::EmptyQuery);
        }

        let (listing, search_url) = match self.load(query, 1).await {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("search for {query:?} failed: {e}");
                self.target
                    .post(
                        channel,
                        presenter::render_notice(
                            &format!("Search results: {query}"),
                            &e.user_notice(),
                        ),
                    )
                    .await?;
                return Err(e);
            }
        };

        if listing.is_empty() {
            log::info!("no results for {query:?}");
            let message_id = self.target.post(channel, presenter::render_empty(query)).await?;
            return Ok(SearchOutcome::Empty { message_id });
        }

        let view = PageView {
            query,
            results: &listing.results,
            page: 1,
            has_more: listing.has_more,
            search_url: &search_url,
        };
        let payload = presenter::render_page(&view, Utc::now());
        let interactive = payload.controls.is_some();
        let message_id = self.target.post(channel, payload.clone()).await?;

        if interactive {
            let session = SearchSession::new(
                actor.clone(),
                query.to_string(),
                listing.has_more,
                payload,
                self.inactivity,
            );
            let session = self.sessions.install(message_id.clone(), session);
            self.sessions
                .watch(message_id.clone(), session, self.target.clone());
        }

        log::info!(
            "posted {} results for {query:?} as {message_id}",
            listing.results.len()
        );
        Ok(SearchOutcome::Listing {
            message_id,
            interactive,
        })
    }

    /// Handles a prev/next click on `message_id`. Returns the page now shown.
    /// Any rejection is also sent to `actor` as a notice.
    #[tracing::instrument(skip(self))]
    pub async fn on_navigation(
        &self,
        actor: &UserId,
        message_id: &MessageId,
        direction: Direction,
    ) -> Result<u32> {
        let result = self.navigate(actor, message_id, direction).await;
        if let Err(e) = &result {
            if e.is_fault() {
                log::error!("navigation on {message_id} failed: {e}");
            } else {
                log::debug!("navigation on {message_id} rejected: {e}");
            }
            if let Err(notify_err) = self.target.notify(actor, &e.user_notice()).await {
                log::warn!("could not notify {actor}: {notify_err}");
            }
        }
        result
    }

    async fn navigate(
        &self,
        actor: &str,
        message_id: &MessageId,
        direction: Direction,
    ) -> Result<u32> {
        let session = self
            .sessions
            .get(message_id)
            .ok_or(BotError::SessionExpired)?;
        session.authorize(actor)?;

        let mut cursor = session.begin().await?;
        let page = cursor.plan(direction, tokio::time::Instant::now())?;

        // nothing is committed until the new page is on screen
        let (listing, search_url) = self.load(session.query(), page).await?;
        if listing.is_empty() {
            return Err(BotError::PageUnavailable(direction));
        }

        let view = PageView {
            query: session.query(),
            results: &listing.results,
            page,
            has_more: listing.has_more,
            search_url: &search_url,
        };
        let payload = presenter::render_page(&view, Utc::now());

        match self.target.edit(message_id, payload.clone()).await {
            Ok(()) => {}
            Err(e @ BotError::RenderTargetGone(_)) => {
                cursor.expire();
                drop(cursor);
                self.sessions.remove(message_id, &session);
                return Err(e);
            }
            Err(e) => return Err(e),
        }

        cursor.commit(page, listing.has_more, payload, session.next_deadline());
        Ok(page)
    }
}
