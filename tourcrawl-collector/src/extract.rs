//! HTML page extraction — the alternate record source.
//!
//! The API is the primary source; generic web pages are the secondary one.
//! Site-specific scraping lives behind the [`SiteExtractor`] trait so the
//! normalization layer depends only on the record shape, never on how a
//! particular site is parsed. No JavaScript execution, no rendering: the raw
//! response body is parsed as static HTML.

use crate::error::{CollectError, Result};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A travel record extracted from a web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub name: String,
    pub description: String,
    pub address: String,
    pub contact: String,
    pub website: String,
    pub price: Option<u64>,
    pub operating_hours: String,
    pub source_url: String,
}

/// Site-specific extraction capability. One implementation per source site.
pub trait SiteExtractor {
    /// Pull a travel record out of a parsed page.
    ///
    /// A page that carries no usable name fails with `Validation`; the
    /// caller logs it and moves on to the next URL.
    fn extract(&self, document: &Html, source_url: &str) -> Result<PageRecord>;
}

/// Fetches page bodies for an extractor, with the same politeness rules as
/// the API client: bounded timeout and a fixed post-fetch delay.
pub struct PageFetcher {
    http: reqwest::Client,
    delay_ms: u64,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self::with_delay_ms(1000)
    }

    pub fn with_delay_ms(delay_ms: u64) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { http, delay_ms }
    }

    /// GET a page and return its body. Non-2xx → `Transport`. The post-call
    /// delay is slept before returning so callers can parse synchronously
    /// without holding a parsed document across an await point.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CollectError::Transport {
                status: status.as_u16(),
                body: body.chars().take(400).collect(),
            });
        }
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        Ok(body)
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch and extract one URL. Any failure — transport, parse, validation —
/// is logged and degrades to `None` for this URL; the crawl continues.
pub async fn fetch_page_record(
    fetcher: &PageFetcher,
    extractor: &dyn SiteExtractor,
    url: &str,
) -> Option<PageRecord> {
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("page fetch failed for {url}: {e}");
            return None;
        }
    };
    let document = Html::parse_document(&body);
    match extractor.extract(&document, url) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("extraction failed for {url}: {e}");
            None
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First contiguous digit run, commas stripped: `"입장료 12,000원"` → 12000.
pub fn parse_price(text: &str) -> Option<u64> {
    let digits: String = text
        .replace(',', "")
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Extractor for pages that follow common meta-tag conventions. Good enough
/// for most travel-info sites; anything quirkier gets its own impl.
pub struct GenericExtractor;

impl GenericExtractor {
    fn select_text(document: &Html, selectors: &[&str]) -> String {
        for raw in selectors {
            let Ok(selector) = Selector::parse(raw) else {
                continue;
            };
            if let Some(element) = document.select(&selector).next() {
                let text = clean_text(&element.text().collect::<String>());
                if !text.is_empty() {
                    return text;
                }
            }
        }
        String::new()
    }

    fn select_meta(document: &Html, names: &[&str]) -> String {
        for name in names {
            let raw = format!(r#"meta[property="{name}"], meta[name="{name}"]"#);
            let Ok(selector) = Selector::parse(&raw) else {
                continue;
            };
            if let Some(element) = document.select(&selector).next()
                && let Some(content) = element.value().attr("content")
            {
                let text = clean_text(content);
                if !text.is_empty() {
                    return text;
                }
            }
        }
        String::new()
    }
}

impl SiteExtractor for GenericExtractor {
    fn extract(&self, document: &Html, source_url: &str) -> Result<PageRecord> {
        let name = {
            let from_meta = Self::select_meta(document, &["og:title"]);
            if from_meta.is_empty() {
                Self::select_text(document, &["h1", "title"])
            } else {
                from_meta
            }
        };
        if name.is_empty() {
            return Err(CollectError::Validation(format!(
                "page {source_url} has no usable name"
            )));
        }

        let description = {
            let from_meta = Self::select_meta(document, &["og:description", "description"]);
            if from_meta.is_empty() {
                Self::select_text(document, &["p"])
            } else {
                from_meta
            }
        };

        let address = Self::select_text(
            document,
            &[r#"[itemprop="address"]"#, ".address", ".addr"],
        );
        let contact = Self::select_text(document, &[r#"a[href^="tel:"]"#, ".tel", ".phone"]);
        let website = Self::select_meta(document, &["og:url"]);
        let price = {
            let text = Self::select_text(document, &[".price", ".fee"]);
            parse_price(&text)
        };
        let operating_hours = Self::select_text(document, &[".hours", ".time"]);

        Ok(PageRecord {
            name,
            description,
            address,
            contact,
            website,
            price,
            operating_hours,
            source_url: source_url.to_string(),
        })
    }
}
