//! Single-resource HTTP fetch with retry, manual redirect following and a
//! HEAD-with-GET-fallback strategy.
//!
//! The fetcher never lets the transport follow redirects on its own: hops
//! are resolved manually so the full redirect trail can be recorded and
//! attributed to the originating URL.

mod client;
mod error;
mod options;

pub use client::{encode_url, fetch};
pub use error::FetchError;
pub use options::{
    FetchOptions, DEFAULT_REDIRECT_TIMES, DEFAULT_RETRY_TIMES, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};

use reqwest::header::HeaderMap;

/// One consumed redirect hop: the status code that redirected and the
/// resolved target it pointed to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RedirectHop {
    /// Redirecting status code (301, 302 or 307).
    pub status: u16,
    /// The `Location` header resolved against the URL that redirected.
    pub target: String,
}

/// Structured result of one logical fetch, including every redirect hop
/// that was consumed on the way to the terminal response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Host of the terminal target.
    pub host: String,
    /// The originally requested URL (after defensive encoding). Callers
    /// needing the terminal location must inspect the last trail entry.
    pub href: String,
    /// Response body, decoded as text. Empty when the fake-HEAD probe was
    /// used, since the connection is dropped once headers arrive.
    pub body: String,
    /// Response headers of the terminal response.
    pub headers: HeaderMap,
    /// Terminal status code.
    pub status: u16,
    /// Redirect trail in the order hops were followed, oldest first.
    /// Empty unless redirects occurred.
    pub redirects: Vec<RedirectHop>,
}

impl FetchResponse {
    /// Returns true when at least one redirect hop was consumed.
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}
