#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use url::Url;

use scout::error::{BotError, Result};
use scout::fetcher::Fetcher;

pub const BASE: &str = "https://www.olx.ua";

pub fn card(title: &str, price: &str, href: &str, img: Option<&str>) -> String {
    let img = img
        .map(|src| format!(r#"<img src="{src}" alt="">"#))
        .unwrap_or_default();
    format!(
        r#"<div data-cy="l-card" data-testid="l-card">
             <a class="css-z3gu2d" href="{href}">{img}</a>
             <div class="css-u2ayx9">
               <h6 data-testid="ad-title">{title}</h6>
               <p data-testid="ad-price">{price}</p>
             </div>
           </div>"#
    )
}

pub fn results_page(cards: &[String], has_next: bool) -> String {
    let pagination = if has_next {
        r#"<a data-testid="pagination-forward" href="/d/uk/list/q-iphone/?page=2">next</a>"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html><html><head><title>OLX</title></head><body>
           <div data-testid="listing-grid">{}</div>
           <div data-testid="pagination-wrapper">{pagination}</div>
           </body></html>"#,
        cards.join("\n")
    )
}

/// `count` cards titled `p<page>-<n>` with relative links.
pub fn numbered_page(page: u32, count: usize, has_next: bool) -> String {
    let cards: Vec<String> = (1..=count)
        .map(|n| {
            card(
                &format!("p{page}-{n}"),
                &format!("{n} 000 грн."),
                &format!("/d/uk/obyavlenie/p{page}-{n}.html"),
                Some(&format!("https://ireland.apollo.olxcdn.com/p{page}-{n}.jpg")),
            )
        })
        .collect();
    results_page(&cards, has_next)
}

/// A reqwest transport error produced without touching the network.
pub async fn network_error() -> BotError {
    let err = reqwest::Client::new()
        .get("not a url")
        .send()
        .await
        .unwrap_err();
    BotError::Network(err)
}

pub enum FakePage {
    Html(String),
    Fail,
}

/// Parks one fetch until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory fetcher serving canned pages per page number.
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<u32, FakePage>>,
    gate: Mutex<Option<(u32, std::sync::Arc<Gate>)>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, page: u32, html: String) {
        self.pages.lock().unwrap().insert(page, FakePage::Html(html));
    }

    pub fn fail(&self, page: u32) {
        self.pages.lock().unwrap().insert(page, FakePage::Fail);
    }

    pub fn gate(&self, page: u32) -> std::sync::Arc<Gate> {
        let gate = std::sync::Arc::new(Gate::default());
        *self.gate.lock().unwrap() = Some((page, gate.clone()));
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    fn search_url(&self, query: &str, page: u32) -> Result<Url> {
        Ok(Url::parse(&format!("{BASE}/d/uk/list/q-{query}/?page={page}"))?)
    }

    async fn fetch(&self, _query: &str, page: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = self
            .gate
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(gated, _)| *gated == page)
            .map(|(_, gate)| gate.clone());
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let html = match self.pages.lock().unwrap().get(&page) {
            Some(FakePage::Html(html)) => Some(html.clone()),
            Some(FakePage::Fail) => None,
            None => Some(results_page(&[], false)),
        };
        match html {
            Some(html) => Ok(html),
            None => Err(network_error().await),
        }
    }
}
