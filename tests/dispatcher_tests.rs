mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{BASE, FakeFetcher, numbered_page, results_page};
use scout::board::MessageBoard;
use scout::data_models::{Direction, MessageId};
use scout::dispatcher::{Dispatcher, SearchOutcome};
use scout::error::BotError;
use scout::extractor::Extractor;
use scout::presenter::DisplayPayload;

const WINDOW: Duration = Duration::from_secs(120);

struct Harness {
    fetcher: Arc<FakeFetcher>,
    board: Arc<MessageBoard>,
    dispatcher: Arc<Dispatcher>,
}

impl Harness {
    fn new() -> Self {
        let fetcher = Arc::new(FakeFetcher::new());
        let board = Arc::new(MessageBoard::new());
        let dispatcher = Arc::new(Dispatcher::new(
            fetcher.clone(),
            Extractor::new(BASE, "грн").unwrap(),
            board.clone(),
            WINDOW,
        ));
        Self {
            fetcher,
            board,
            dispatcher,
        }
    }

    fn payload(&self, id: &str) -> DisplayPayload {
        self.board.get(id).expect("message exists").payload
    }

    async fn search(&self, actor: &str, query: &str) -> MessageId {
        match self
            .dispatcher
            .on_fresh_query(&actor.to_string(), &"general".to_string(), query)
            .await
            .unwrap()
        {
            SearchOutcome::Listing { message_id, .. } => message_id,
            other => panic!("expected a listing, got {other:?}"),
        }
    }

    async fn navigate(
        &self,
        actor: &str,
        message_id: &MessageId,
        direction: Direction,
    ) -> Result<u32, BotError> {
        self.dispatcher
            .on_navigation(&actor.to_string(), message_id, direction)
            .await
    }
}

fn titles(payload: &DisplayPayload) -> Vec<String> {
    payload.fields.iter().map(|f| f.name.clone()).collect()
}

#[tokio::test]
async fn test_first_page_with_more_results() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));

    let outcome = h
        .dispatcher
        .on_fresh_query(&"owner".to_string(), &"general".to_string(), "iphone")
        .await
        .unwrap();
    let SearchOutcome::Listing {
        message_id,
        interactive,
    } = outcome
    else {
        panic!("expected listing");
    };
    assert!(interactive);
    assert_eq!(h.dispatcher.sessions().len(), 1);

    let payload = h.payload(&message_id);
    assert_eq!(payload.fields.len(), 5);
    assert_eq!(payload.footer.as_deref(), Some("Page 1"));
    assert_eq!(
        payload.thumbnail.as_deref(),
        Some("https://ireland.apollo.olxcdn.com/p1-1.jpg")
    );
    let controls = payload.controls.unwrap();
    assert!(controls.prev.disabled);
    assert!(!controls.next.disabled);
}

#[tokio::test]
async fn test_no_results_renders_empty_state() {
    let h = Harness::new();
    h.fetcher.serve(1, results_page(&[], false));

    let outcome = h
        .dispatcher
        .on_fresh_query(&"owner".to_string(), &"general".to_string(), "iphone")
        .await
        .unwrap();
    let SearchOutcome::Empty { message_id } = outcome else {
        panic!("expected empty state");
    };

    let payload = h.payload(&message_id);
    assert!(payload.fields.is_empty());
    assert!(payload.controls.is_none());
    assert_eq!(payload.description.as_deref(), Some("Nothing found for \"iphone\"."));
    assert!(h.dispatcher.sessions().is_empty());
}

#[tokio::test]
async fn test_single_page_installs_no_session() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 3, false));

    let outcome = h
        .dispatcher
        .on_fresh_query(&"owner".to_string(), &"general".to_string(), "iphone")
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        SearchOutcome::Listing {
            interactive: false,
            ..
        }
    ));
    assert!(h.dispatcher.sessions().is_empty());
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let h = Harness::new();
    let err = h
        .dispatcher
        .on_fresh_query(&"owner".to_string(), &"general".to_string(), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::EmptyQuery));
    assert_eq!(h.fetcher.calls(), 0);
    assert_eq!(h.board.take_notices("owner").len(), 1);
}

#[tokio::test]
async fn test_fresh_query_network_failure_posts_notice() {
    let h = Harness::new();
    h.fetcher.fail(1);

    let err = h
        .dispatcher
        .on_fresh_query(&"owner".to_string(), &"general".to_string(), "iphone")
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Network(_)));
    assert!(err.is_fault());
    assert!(h.dispatcher.sessions().is_empty());

    let posted = h.board.in_channel("general");
    assert_eq!(posted.len(), 1);
    let payload = &posted[0].1.payload;
    assert_eq!(payload.title, "Search results: iphone");
    assert_eq!(
        payload.description.as_deref(),
        Some("Search failed. Please try again later.")
    );
    assert!(payload.fields.is_empty());
    assert!(payload.controls.is_none());
}

#[tokio::test]
async fn test_owner_pages_forward_and_back_in_place() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 5, true));

    let id = h.search("owner", "iphone").await;

    assert_eq!(h.navigate("owner", &id, Direction::Next).await.unwrap(), 2);
    let payload = h.payload(&id);
    assert_eq!(payload.footer.as_deref(), Some("Page 2"));
    assert_eq!(titles(&payload)[0], "1. p2-1");
    let controls = payload.controls.unwrap();
    assert!(!controls.prev.disabled);
    assert!(!controls.next.disabled);

    assert_eq!(h.navigate("owner", &id, Direction::Prev).await.unwrap(), 1);
    let payload = h.payload(&id);
    assert_eq!(titles(&payload)[0], "1. p1-1");
    assert!(payload.controls.unwrap().prev.disabled);
}

#[tokio::test]
async fn test_other_actor_is_rejected() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 5, true));

    let id = h.search("owner", "iphone").await;
    let before = h.payload(&id);
    let fetches = h.fetcher.calls();

    let err = h.navigate("intruder", &id, Direction::Next).await.unwrap_err();
    assert!(matches!(err, BotError::UnauthorizedActor));
    assert!(!err.is_fault());
    assert_eq!(h.payload(&id), before);
    assert_eq!(h.fetcher.calls(), fetches);
    assert_eq!(h.board.take_notices("intruder").len(), 1);
    assert!(h.board.take_notices("owner").is_empty());

    // still on page 1 for the owner
    assert_eq!(h.navigate("owner", &id, Direction::Next).await.unwrap(), 2);
}

#[tokio::test]
async fn test_out_of_range_navigation_is_rejected() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 2, false));

    let id = h.search("owner", "iphone").await;
    assert!(matches!(
        h.navigate("owner", &id, Direction::Prev).await,
        Err(BotError::PageUnavailable(Direction::Prev))
    ));

    assert_eq!(h.navigate("owner", &id, Direction::Next).await.unwrap(), 2);
    assert!(h.payload(&id).controls.unwrap().next.disabled);
    assert!(matches!(
        h.navigate("owner", &id, Direction::Next).await,
        Err(BotError::PageUnavailable(Direction::Next))
    ));
    assert_eq!(h.payload(&id).footer.as_deref(), Some("Page 2"));
}

#[tokio::test]
async fn test_failed_navigation_keeps_previous_page() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.fail(2);

    let id = h.search("owner", "iphone").await;
    let before = h.payload(&id);

    let err = h.navigate("owner", &id, Direction::Next).await.unwrap_err();
    assert!(matches!(err, BotError::Network(_)));
    assert_eq!(h.payload(&id), before);
    assert_eq!(h.board.take_notices("owner").len(), 1);

    // the attempted page was never committed
    h.fetcher.serve(2, numbered_page(2, 5, false));
    assert_eq!(h.navigate("owner", &id, Direction::Next).await.unwrap(), 2);
}

#[tokio::test]
async fn test_vanished_next_page_keeps_previous_page() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, results_page(&[], false));

    let id = h.search("owner", "iphone").await;
    let before = h.payload(&id);
    assert!(matches!(
        h.navigate("owner", &id, Direction::Next).await,
        Err(BotError::PageUnavailable(Direction::Next))
    ));
    assert_eq!(h.payload(&id), before);
}

#[tokio::test]
async fn test_concurrent_click_is_rejected_while_loading() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 5, true));
    let gate = h.fetcher.gate(2);

    let id = h.search("owner", "iphone").await;

    let dispatcher = h.dispatcher.clone();
    let first_id = id.clone();
    let first = tokio::spawn(async move {
        dispatcher
            .on_navigation(&"owner".to_string(), &first_id, Direction::Next)
            .await
    });
    gate.entered.notified().await;

    let err = h.navigate("owner", &id, Direction::Next).await.unwrap_err();
    assert!(matches!(err, BotError::SessionBusy));

    gate.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), 2);
    assert_eq!(h.payload(&id).footer.as_deref(), Some("Page 2"));
    // only the accepted click fetched
    assert_eq!(h.fetcher.calls(), 2);
}

#[tokio::test]
async fn test_deleted_reply_ends_session() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 5, true));

    let id = h.search("owner", "iphone").await;
    assert!(h.board.delete(&id));

    let err = h.navigate("owner", &id, Direction::Next).await.unwrap_err();
    assert!(matches!(err, BotError::RenderTargetGone(_)));
    assert!(h.dispatcher.sessions().is_empty());

    assert!(matches!(
        h.navigate("owner", &id, Direction::Next).await,
        Err(BotError::SessionExpired)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_expires_and_detaches_controls() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 5, true));

    let id = h.search("owner", "iphone").await;
    let before = h.payload(&id);
    assert!(before.controls.is_some());

    tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;

    let after = h.payload(&id);
    assert!(after.controls.is_none());
    assert_eq!(after.fields, before.fields);
    assert_eq!(after.footer, before.footer);
    assert!(h.dispatcher.sessions().is_empty());

    let fetches = h.fetcher.calls();
    assert!(matches!(
        h.navigate("owner", &id, Direction::Next).await,
        Err(BotError::SessionExpired)
    ));
    assert_eq!(h.fetcher.calls(), fetches);
    assert_eq!(h.payload(&id), after);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_resets_inactivity_window() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 5, true));

    let id = h.search("owner", "iphone").await;

    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(h.navigate("owner", &id, Direction::Next).await.unwrap(), 2);

    // past the original deadline, but within the re-armed one
    tokio::time::sleep(Duration::from_secs(100)).await;
    assert!(h.payload(&id).controls.is_some());
    assert_eq!(h.navigate("owner", &id, Direction::Prev).await.unwrap(), 1);

    tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;
    assert!(h.payload(&id).controls.is_none());
    assert!(matches!(
        h.navigate("owner", &id, Direction::Next).await,
        Err(BotError::SessionExpired)
    ));
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let h = Harness::new();
    h.fetcher.serve(1, numbered_page(1, 5, true));
    h.fetcher.serve(2, numbered_page(2, 5, true));

    let alice = h.search("alice", "iphone").await;
    let bob = h.search("bob", "iphone").await;
    assert_ne!(alice, bob);
    assert_eq!(h.dispatcher.sessions().len(), 2);

    assert_eq!(h.navigate("alice", &alice, Direction::Next).await.unwrap(), 2);
    assert_eq!(h.payload(&bob).footer.as_deref(), Some("Page 1"));
    assert!(matches!(
        h.navigate("alice", &bob, Direction::Next).await,
        Err(BotError::UnauthorizedActor)
    ));
}
