use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::Config;
use crate::data_models::{Listing, SearchResult};
use crate::error::{BotError, Result};

/// Cards beyond this many are ignored, however many the page holds.
pub const MAX_RESULTS: usize = 5;

pub const TITLE_PLACEHOLDER: &str = "Untitled listing";
pub const PRICE_PLACEHOLDER: &str = "Price not specified";

const CARD: &str = r#"div[data-cy="l-card"]"#;
const TITLE: &str = r#"[data-testid="ad-title"]"#;
const PRICE: &str = r#"[data-testid="ad-price"]"#;
const LINK: &str = "a[href]";
const IMAGE: &str = "img[src]";
const NEXT_PAGE: &str = r#"a[data-testid="pagination-forward"]"#;

const CURRENCY_MARKERS: [&str; 6] = ["грн", "uah", "$", "€", "usd", "eur"];

/// Turns a search-results document into at most [`MAX_RESULTS`] listings.
pub struct Extractor {
    base: Url,
    currency: String,
    card: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
    image: Selector,
    next_page: Selector,
}

fn selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| BotError::Selector {
        selector: raw.to_string(),
        message: e.to_string(),
    })
}

impl Extractor {
    pub fn new(base_url: &str, currency: &str) -> Result<Extractor> {
        Ok(Extractor {
            base: Url::parse(base_url)?,
            currency: currency.to_string(),
            card: selector(CARD)?,
            title: selector(TITLE)?,
            price: selector(PRICE)?,
            link: selector(LINK)?,
            image: selector(IMAGE)?,
            next_page: selector(NEXT_PAGE)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Extractor> {
        Self::new(&config.base_url, &config.currency)
    }

    pub fn extract(&self, html: &str) -> Listing {
        let document = Html::parse_document(html);

        let results: Vec<SearchResult> = document
            .select(&self.card)
            .take(MAX_RESULTS)
            .map(|card| self.parse_card(card))
            .collect();

        // the pagination control is authoritative, a full page may still be the last one;
        // an empty page never has more
        let has_more =
            !results.is_empty() && document.select(&self.next_page).next().is_some();

        Listing { results, has_more }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> SearchResult {
        let title = self
            .first_text(card, &self.title)
            .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());
        let price = self
            .first_text(card, &self.price)
            .map(|p| normalize_price(&p, &self.currency))
            .unwrap_or_else(|| PRICE_PLACEHOLDER.to_string());

        let link = card
            .select(&self.link)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| self.resolve(href))
            .unwrap_or_else(|| self.base.to_string());

        let image_url = card
            .select(&self.image)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty() && !src.starts_with("data:"))
            .find_map(|src| self.resolve(src));

        SearchResult {
            title,
            price,
            link,
            image_url,
        }
    }

    fn first_text(&self, card: ElementRef<'_>, selector: &Selector) -> Option<String> {
        card.select(selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|text| !text.is_empty())
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let resolved = self.base.join(href.trim()).ok()?;
        matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Appends `currency` to prices that carry an amount but no currency marker.
pub fn normalize_price(price: &str, currency: &str) -> String {
    let price = collapse_whitespace(price);
    if !price.chars().any(|c| c.is_ascii_digit()) {
        return price;
    }
    let lower = price.to_lowercase();
    let marked = CURRENCY_MARKERS.iter().any(|m| lower.contains(m))
        || lower.contains(&currency.to_lowercase());
    if marked {
        price
    } else {
        format!("{price} {currency}")
    }
}
