//! Linkprobe Core Library
//!
//! This library verifies the reachability of hyperlinks discovered on a web
//! page: it fetches the page, extracts links of one or more configurable
//! kinds (anchors, images, iframes), and concurrently probes each extracted
//! link, following redirects and classifying outcomes via pluggable
//! validators.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Single-resource fetch with retry, manual redirect following
//!   and a HEAD-with-GET-fallback strategy
//! - [`extract`] - Link normalization, base-URL discovery and extraction
//! - [`verify`] - Bounded-concurrency batch verification with validator chains
//! - [`check`] - Named verification modules dispatched against one page

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod check;
pub mod extract;
pub mod fetch;
pub mod verify;

// Re-export commonly used types
pub use check::{
    check_page, kinds, CheckError, CheckOptions, ConfigError, Extraction, ModuleConfig,
    ModuleSpec, ModuleSpecs,
};
pub use extract::{extract_links, find_base_url, normalize_link, strip_scripts};
pub use fetch::{
    fetch, FetchError, FetchOptions, FetchResponse, RedirectHop, DEFAULT_REDIRECT_TIMES,
    DEFAULT_RETRY_TIMES,
};
pub use verify::{verify_links, LinkError, Validator, Verdict, VerifyOptions, VerifyReport};
