use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::config::Config;
use crate::error::{BotError, Result};

/// Source of raw search-results markup.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// URL of the results page for `query` at `page`.
    fn search_url(&self, query: &str, page: u32) -> Result<Url>;

    /// Single attempt, no retries.
    async fn fetch(&self, query: &str, page: u32) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    listing_url: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str, search_path: &str, timeout: Duration) -> Result<HttpFetcher> {
        let listing_url = Url::parse(base_url)?.join(search_path)?;
        if listing_url.cannot_be_a_base() {
            return Err(BotError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpFetcher {
            client,
            listing_url,
        })
    }

    pub fn from_config(config: &Config) -> Result<HttpFetcher> {
        Self::new(&config.base_url, &config.search_path, config.http_timeout)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn search_url(&self, query: &str, page: u32) -> Result<Url> {
        let mut url = self.listing_url.clone();
        url.path_segments_mut()
            .map_err(|_| BotError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(&format!("q-{query}"))
            .push("");
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn fetch(&self, query: &str, page: u32) -> Result<String> {
        let url = self.search_url(query, page)?;
        log::debug!("fetching {url}");
        let res = self.client.get(url).send().await?.error_for_status()?;
        let body = res.text().await?;
        Ok(body)
    }
}
