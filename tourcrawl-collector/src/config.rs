//! Configuration for the KorService2 API client.
//!
//! All credentials and tuning knobs are carried in an explicit `ApiConfig`
//! that is handed to `ApiClient::new`; nothing is read from process-wide
//! globals.

/// Default base URL of the Korea Tourism Organization open API.
pub const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr/B551011/KorService2/";

/// Environment variable consulted by the CLI when no key flag is given.
pub const SERVICE_KEY_ENV: &str = "TOURCRAWL_SERVICE_KEY";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in a trailing slash.
    pub base_url: String,
    /// The `serviceKey` credential issued by data.go.kr.
    pub service_key: String,
    /// `MobileOS` identifier the API requires on every call.
    pub mobile_os: String,
    /// `MobileApp` identifier the API requires on every call.
    pub mobile_app: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Fixed delay slept after every successful call, in milliseconds.
    /// A post-call throttle for the upstream rate limit, not a retry back-off.
    pub delay_ms: u64,
    /// `numOfRows` used by the pagination loop.
    pub page_size: u32,
}

impl ApiConfig {
    pub fn new(service_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            service_key: service_key.into(),
            mobile_os: "ETC".to_string(),
            mobile_app: "tourcrawl".to_string(),
            timeout_secs: 20,
            delay_ms: 150,
            page_size: 100,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}
