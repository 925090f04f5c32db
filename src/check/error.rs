//! Call-level errors for page checking.
//!
//! Configuration defects are raised synchronously before any network I/O;
//! page-fetch problems abort the whole call. Individual link failures never
//! appear here: they live in the per-module report's error map.

use thiserror::Error;

use crate::fetch::FetchError;

/// A defect in the module configuration, detected before any request.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No modules were supplied.
    #[error("module list is empty")]
    EmptyModules,

    /// A module has no name, or an empty one.
    #[error("module name is missing or empty")]
    MissingName,

    /// A module supplies neither a parser nor a regex rule.
    #[error("module '{module}' has neither a parser nor a regex rule")]
    MissingExtraction {
        /// The offending module.
        module: String,
    },

    /// A module's regex pattern does not compile.
    #[error("module '{module}' has an invalid regex pattern: {source}")]
    InvalidRegex {
        /// The offending module.
        module: String,
        /// The compile error.
        #[source]
        source: regex::Error,
    },

    /// A module's capture-group index does not exist in its pattern.
    #[error("module '{module}' capture group {group} is out of range for its pattern")]
    InvalidGroup {
        /// The offending module.
        module: String,
        /// The out-of-range group index.
        group: usize,
    },
}

/// Errors that abort a whole `check_page` call.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The module configuration is defective.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source page could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The source page body is empty; there is nothing to extract from.
    #[error("page body is empty (HTTP {status}) for {url}")]
    EmptyPage {
        /// The page URL.
        url: String,
        /// The status code the empty response carried.
        status: u16,
    },
}
