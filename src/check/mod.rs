//! Module dispatcher: fetch a page once, then run each named verification
//! module (extraction rule + validator chain) against it concurrently.

mod config;
mod error;
pub mod kinds;

pub use config::{Extraction, ModuleConfig, ModuleSpec, ModuleSpecs, ParserFn};
pub use error::{CheckError, ConfigError};

use std::collections::HashMap;
use std::fmt;

use futures_util::future::join_all;
use tracing::{debug, instrument};

use crate::extract::{find_base_url, strip_scripts};
use crate::fetch::{fetch, FetchOptions};
use crate::verify::{verify_links, Validator, VerifyOptions, VerifyReport, DEFAULT_CONCURRENCY};

use config::resolve_modules;

/// Call-wide options for [`check_page`].
///
/// Per-module settings in a [`ModuleConfig`] override these defaults.
#[derive(Clone)]
pub struct CheckOptions {
    /// Fetch configuration for the page itself (method forced to GET) and
    /// the base configuration for every link probe.
    pub fetch: FetchOptions,
    /// Default worker pool size per module.
    pub concurrency: usize,
    /// Default validator chain per module.
    pub validators: Vec<Validator>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            concurrency: DEFAULT_CONCURRENCY,
            validators: Vec::new(),
        }
    }
}

impl fmt::Debug for CheckOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckOptions")
            .field("fetch", &self.fetch)
            .field("concurrency", &self.concurrency)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Verifies the links of one page, per module.
///
/// Normalizes and validates the module specs (any defect aborts before I/O),
/// fetches the page once with GET, derives the effective base URL (a
/// declared `<base>` wins over the request URL), then runs extraction and
/// batch verification once per module, concurrently across modules.
///
/// Returns the aggregated `module name -> report` map. Duplicate module
/// names keep the last result, matching map semantics.
///
/// # Errors
///
/// Returns [`CheckError::Config`] for a defective module list,
/// [`CheckError::Fetch`] when the page itself cannot be fetched, and
/// [`CheckError::EmptyPage`] (naming the status code) when the page body is
/// empty. Individual link failures are never surfaced here; they are
/// recorded in the per-module reports.
#[instrument(skip(specs, options))]
pub async fn check_page(
    url: &str,
    specs: impl Into<ModuleSpecs>,
    options: &CheckOptions,
) -> Result<HashMap<String, VerifyReport>, CheckError> {
    let modules = resolve_modules(specs.into())?;

    let response = fetch(url, &options.fetch.page()).await?;
    if response.body.is_empty() {
        return Err(CheckError::EmptyPage {
            url: url.to_string(),
            status: response.status,
        });
    }

    let content = strip_scripts(&response.body);
    let base_url = find_base_url(&content).unwrap_or_else(|| url.to_string());
    debug!(page = %url, base = %base_url, modules = modules.len(), "page fetched, dispatching modules");

    let tasks = modules.into_iter().map(|module| {
        let content = &content;
        let base_url = &base_url;
        let verify_options = VerifyOptions {
            concurrency: module.concurrency.unwrap_or(options.concurrency),
            validators: module
                .validators
                .unwrap_or_else(|| options.validators.clone()),
            fetch: options.fetch.clone(),
        };
        async move {
            let links = (module.parser)(content, base_url);
            debug!(module = %module.name, links = links.len(), "extracted links");
            let report = verify_links(links, &verify_options).await;
            (module.name, report)
        }
    });

    Ok(join_all(tasks).await.into_iter().collect())
}
