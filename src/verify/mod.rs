//! Bounded-concurrency batch link verification.
//!
//! A fixed pool of workers shares an atomic cursor over the input list:
//! each worker claims the next unclaimed link, fetches and validates it to
//! completion, then claims again. Concurrent outbound connections are
//! therefore bounded by the worker count regardless of list size.

mod error;

pub use error::LinkError;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::fetch::{fetch, FetchOptions, FetchResponse};

/// Default worker pool size.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// A validator's decision about one response.
///
/// Validators are evaluated in a fixed order; the first decisive verdict
/// short-circuits the chain. When every validator abstains the default
/// policy applies: status 200 is a success, anything else a failure
/// carrying the status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// This validator has no opinion; evaluation continues.
    Undecided,
    /// Accept the link, short-circuiting the chain.
    Success,
    /// Reject the link with a message, short-circuiting the chain.
    Failure(String),
}

/// A pluggable per-response decision rule.
pub type Validator = Arc<dyn Fn(&FetchResponse) -> Verdict + Send + Sync>;

/// Options for one batch verification.
#[derive(Clone)]
pub struct VerifyOptions {
    /// Worker pool size (defaults to [`DEFAULT_CONCURRENCY`]).
    pub concurrency: usize,
    /// Ordered validator chain applied to every response.
    pub validators: Vec<Validator>,
    /// Fetch configuration applied to every link.
    pub fetch: FetchOptions,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            validators: Vec::new(),
            fetch: FetchOptions::default(),
        }
    }
}

impl fmt::Debug for VerifyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOptions")
            .field("concurrency", &self.concurrency)
            .field("validators", &self.validators.len())
            .field("fetch", &self.fetch)
            .finish()
    }
}

/// Outcome of a batch verification, partitioned by link.
///
/// Every input link appears in exactly one of the two maps: `success` maps
/// a link to its outcome descriptor (pipe-joined redirect hops followed by
/// the final status code), `error` maps a link to why it failed.
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Links that verified, keyed to their outcome descriptor.
    pub success: HashMap<String, String>,
    /// Links that failed, keyed to the per-link error.
    pub error: HashMap<String, LinkError>,
}

impl serde::Serialize for VerifyReport {
    /// Serializes as `{ "success": {...}, "error": {...} }` with each error
    /// rendered as its display message.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let errors: HashMap<&str, String> = self
            .error
            .iter()
            .map(|(link, error)| (link.as_str(), error.to_string()))
            .collect();
        let mut state = serializer.serialize_struct("VerifyReport", 2)?;
        state.serialize_field("success", &self.success)?;
        state.serialize_field("error", &errors)?;
        state.end()
    }
}

impl VerifyReport {
    /// Total number of links accounted for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.success.len() + self.error.len()
    }

    /// True when no links were verified at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }

    /// True when every link verified successfully.
    #[must_use]
    pub fn is_all_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// Verifies `links` with bounded concurrency.
///
/// Each link is fetched with full [`fetch`] semantics (retries, redirects,
/// fake-HEAD) and run through the validator chain. Individual failures are
/// captured per link and never abort the batch: once inputs are in hand
/// this always returns a complete report.
#[instrument(skip_all, fields(links = links.len(), concurrency = options.concurrency))]
pub async fn verify_links(links: Vec<String>, options: &VerifyOptions) -> VerifyReport {
    let links: Arc<Vec<String>> = Arc::new(links);
    let cursor = Arc::new(AtomicUsize::new(0));
    let workers = options.concurrency.max(1).min(links.len().max(1));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let links = Arc::clone(&links);
        let cursor = Arc::clone(&cursor);
        let options = options.clone();
        handles.push(tokio::spawn(async move {
            let mut outcomes = Vec::new();
            loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(link) = links.get(index) else {
                    break;
                };
                let outcome = verify_one(link, &options).await;
                outcomes.push((link.clone(), outcome));
            }
            outcomes
        }));
    }

    let mut report = VerifyReport::default();
    for handle in handles {
        match handle.await {
            Ok(outcomes) => {
                for (link, outcome) in outcomes {
                    match outcome {
                        Ok(descriptor) => {
                            report.success.insert(link, descriptor);
                        }
                        Err(error) => {
                            debug!(link = %link, error = %error, "link failed verification");
                            report.error.insert(link, error);
                        }
                    }
                }
            }
            Err(join_error) => warn!(error = %join_error, "verification worker panicked"),
        }
    }
    report
}

/// Fetches one link and runs it through the validator chain.
async fn verify_one(link: &str, options: &VerifyOptions) -> Result<String, LinkError> {
    let response = fetch(link, &options.fetch).await?;

    for validator in &options.validators {
        match validator(&response) {
            Verdict::Undecided => {}
            Verdict::Success => return Ok(descriptor(&response)),
            Verdict::Failure(message) => return Err(LinkError::Validation { message }),
        }
    }

    if response.status == 200 {
        Ok(descriptor(&response))
    } else {
        Err(LinkError::HttpStatus {
            status: response.status,
        })
    }
}

/// Builds the success descriptor: each redirect hop as `status=>target`,
/// then the final status code, pipe-joined.
fn descriptor(response: &FetchResponse) -> String {
    response
        .redirects
        .iter()
        .map(|hop| format!("{}=>{}", hop.status, hop.target))
        .chain(std::iter::once(response.status.to_string()))
        .collect::<Vec<_>>()
        .join("|")
}
