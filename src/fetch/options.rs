//! Fetch configuration with browser-like defaults.

use std::time::Duration;

use reqwest::Method;

/// Default per-request timeout (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default retry budget for transient network failures.
pub const DEFAULT_RETRY_TIMES: u32 = 5;

/// Default redirect hop budget.
pub const DEFAULT_REDIRECT_TIMES: u32 = 10;

/// Default User-Agent. Browser-like so probed servers respond the way they
/// would to a real visitor, with the tool identified at the tail.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 \
    linkprobe/0.1";

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8";
const DEFAULT_CACHE_CONTROL: &str = "no-cache";
const DEFAULT_CONNECTION: &str = "keep-alive";

/// Configuration for one logical fetch.
///
/// The same options apply to every redirect hop and every retry attempt of
/// that fetch. All fields are public; callers typically start from
/// [`FetchOptions::default`] and override with struct-update syntax.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-attempt timeout. The request is aborted when exceeded.
    pub timeout: Duration,
    /// Retry budget for transient network failures (timeout, connection
    /// reset). Any other transport error is fatal immediately.
    pub retry_times: u32,
    /// Redirect hop budget, checked before every hop including the first.
    /// A budget of 0 rejects before any request is issued.
    pub redirect_times: u32,
    /// Whether 301/302/307 responses are followed.
    pub follow_redirect: bool,
    /// Outbound HTTP method.
    pub method: Method,
    /// When the method is HEAD, issue the probe as a GET and drop the
    /// connection once headers arrive. Some servers mishandle true HEAD
    /// requests; this keeps the probe cheap without relying on them.
    pub use_fake_head: bool,
    /// Outbound `Accept` header.
    pub accept: String,
    /// Outbound `Accept-Encoding` header. `None` (the default) lets the
    /// client negotiate compression and transparently decompress; an
    /// explicit value is sent as-is and the body is delivered as received.
    pub accept_encoding: Option<String>,
    /// Outbound `Accept-Language` header.
    pub accept_language: String,
    /// Outbound `Cache-Control` header.
    pub cache_control: String,
    /// Outbound `Connection` header.
    pub connection: String,
    /// Outbound `User-Agent` header.
    pub user_agent: String,
    /// Optional outbound `Referer` header.
    pub referer: Option<String>,
    /// Explicit proxy URL. When unset, `http_proxy` / `HTTP_PROXY` from the
    /// environment apply.
    pub proxy: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_times: DEFAULT_RETRY_TIMES,
            redirect_times: DEFAULT_REDIRECT_TIMES,
            follow_redirect: true,
            method: Method::HEAD,
            use_fake_head: true,
            accept: DEFAULT_ACCEPT.to_string(),
            accept_encoding: None,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            connection: DEFAULT_CONNECTION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: None,
            proxy: None,
        }
    }
}

impl FetchOptions {
    /// Options suitable for fetching a full page body: GET with redirects.
    #[must_use]
    pub fn page(&self) -> Self {
        Self {
            method: Method::GET,
            ..self.clone()
        }
    }
}
