//! HTTP client for the KorService2 open API.

use crate::config::ApiConfig;
use crate::error::{CollectError, Result};
use crate::xml::{self, Item};
use std::time::Duration;
use tracing::debug;

/// How much of a failing response body is kept for diagnostics.
const BODY_SNIPPET_CHARS: usize = 400;

/// A blocking-in-spirit, sequential API client.
///
/// Every call merges the configured credentials and format flags into the
/// query string, enforces the configured timeout, and sleeps the configured
/// post-call delay after a successful fetch. There are no retries: transient
/// failures surface to the caller, which logs and continues.
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(format!(
                "tourcrawl/{} (https://github.com/tourcrawl/tourcrawl)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// GET `endpoint` with `params` plus the fixed credential/format fields,
    /// and parse the response body as an XML item list.
    ///
    /// Fails with `Transport` on a non-2xx status (carrying the status and a
    /// truncated body) and with `Parse` on a malformed body.
    pub async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Vec<Item>> {
        let url = format!("{}{}", self.config.base_url, endpoint);

        let mut query: Vec<(&str, String)> = vec![
            ("serviceKey", self.config.service_key.clone()),
            ("MobileOS", self.config.mobile_os.clone()),
            ("MobileApp", self.config.mobile_app.clone()),
            ("_type", "xml".to_string()),
        ];
        query.extend(params.iter().cloned());

        debug!("GET {} {:?}", endpoint, params);
        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CollectError::Transport {
                status: status.as_u16(),
                body: truncate_chars(&body, BODY_SNIPPET_CHARS),
            });
        }

        let items = xml::parse_items(&body)?;

        // Fixed post-call throttle for the upstream rate limit.
        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        Ok(items)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
