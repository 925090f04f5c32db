//! Module configuration shapes and their normalization.
//!
//! Callers hand `check_page` one module, a `(name, config)` pair, or a list
//! of either; normalization turns every accepted shape into named, resolved
//! modules and rejects anything defective with one [`ConfigError`] kind per
//! defect, before any network I/O happens.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::error::ConfigError;
use crate::extract::extract_links;
use crate::verify::Validator;

/// A custom extraction function: `(content, base_url) -> links`.
pub type ParserFn = Arc<dyn Fn(&str, &str) -> Vec<String> + Send + Sync>;

/// How a module finds links in page content.
#[derive(Clone)]
pub enum Extraction {
    /// A regex pattern matched repeatedly against the content; the capture
    /// group at `group` is the link text. Compiled during normalization so
    /// a malformed pattern is a configuration error, not a runtime one.
    Regex {
        /// The pattern source.
        pattern: String,
        /// Capture-group index of the link within each match.
        group: usize,
    },
    /// An arbitrary extractor invoked with the page content and base URL.
    Parser(ParserFn),
}

impl Extraction {
    /// A regex rule capturing the whole match (group 0).
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            group: 0,
        }
    }

    /// A regex rule capturing a specific group.
    pub fn regex_group(pattern: impl Into<String>, group: usize) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            group,
        }
    }

    /// A custom extractor function.
    pub fn parser(f: impl Fn(&str, &str) -> Vec<String> + Send + Sync + 'static) -> Self {
        Self::Parser(Arc::new(f))
    }
}

impl fmt::Debug for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex { pattern, group } => f
                .debug_struct("Regex")
                .field("pattern", pattern)
                .field("group", group)
                .finish(),
            Self::Parser(_) => f.write_str("Parser(..)"),
        }
    }
}

/// Configuration of one verification module, before normalization.
///
/// `validators` and `concurrency` override the call-wide defaults when set.
#[derive(Clone, Default)]
pub struct ModuleConfig {
    /// How this module extracts links. Required; its absence is a
    /// configuration error.
    pub extraction: Option<Extraction>,
    /// Validator chain for this module's links, overriding the defaults.
    pub validators: Option<Vec<Validator>>,
    /// Worker pool size for this module's links, overriding the default.
    pub concurrency: Option<usize>,
}

impl ModuleConfig {
    /// A config carrying just an extraction rule.
    #[must_use]
    pub fn new(extraction: Extraction) -> Self {
        Self {
            extraction: Some(extraction),
            ..Self::default()
        }
    }
}

impl fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("extraction", &self.extraction)
            .field(
                "validators",
                &self.validators.as_ref().map(Vec::len),
            )
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl From<Extraction> for ModuleConfig {
    fn from(extraction: Extraction) -> Self {
        Self::new(extraction)
    }
}

/// One named module: a name plus its configuration.
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    /// Unique module name, keying the aggregated results.
    pub name: String,
    /// The module's configuration.
    pub config: ModuleConfig,
}

impl ModuleSpec {
    /// Names a configuration.
    pub fn new(name: impl Into<String>, config: impl Into<ModuleConfig>) -> Self {
        Self {
            name: name.into(),
            config: config.into(),
        }
    }
}

impl<S: Into<String>, C: Into<ModuleConfig>> From<(S, C)> for ModuleSpec {
    fn from((name, config): (S, C)) -> Self {
        Self::new(name, config)
    }
}

/// The accepted module-list shapes, normalized to a list.
///
/// A bare [`ModuleSpec`] or a bare `(name, config)` pair converts to a
/// single-module list, so `check_page(url, ("anchors", config), ...)` and
/// `check_page(url, vec![spec_a, spec_b], ...)` both read naturally.
#[derive(Debug, Clone, Default)]
pub struct ModuleSpecs(pub Vec<ModuleSpec>);

impl From<ModuleSpec> for ModuleSpecs {
    fn from(spec: ModuleSpec) -> Self {
        Self(vec![spec])
    }
}

impl<S: Into<String>, C: Into<ModuleConfig>> From<(S, C)> for ModuleSpecs {
    fn from(pair: (S, C)) -> Self {
        Self(vec![pair.into()])
    }
}

impl From<Vec<ModuleSpec>> for ModuleSpecs {
    fn from(specs: Vec<ModuleSpec>) -> Self {
        Self(specs)
    }
}

impl<S: Into<String>, C: Into<ModuleConfig>> From<Vec<(S, C)>> for ModuleSpecs {
    fn from(pairs: Vec<(S, C)>) -> Self {
        Self(pairs.into_iter().map(Into::into).collect())
    }
}

/// A module after normalization: named, with a resolved parser.
pub(crate) struct ResolvedModule {
    pub(crate) name: String,
    pub(crate) parser: ParserFn,
    pub(crate) validators: Option<Vec<Validator>>,
    pub(crate) concurrency: Option<usize>,
}

/// Validates every spec and resolves each extraction rule to a parser.
///
/// Regex rules are compiled here; their group index is checked against the
/// compiled pattern's capture count.
pub(crate) fn resolve_modules(specs: ModuleSpecs) -> Result<Vec<ResolvedModule>, ConfigError> {
    if specs.0.is_empty() {
        return Err(ConfigError::EmptyModules);
    }

    specs
        .0
        .into_iter()
        .map(|spec| {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::MissingName);
            }
            let Some(extraction) = spec.config.extraction else {
                return Err(ConfigError::MissingExtraction { module: spec.name });
            };
            let parser = resolve_parser(&spec.name, extraction)?;
            Ok(ResolvedModule {
                name: spec.name,
                parser,
                validators: spec.config.validators,
                concurrency: spec.config.concurrency,
            })
        })
        .collect()
}

fn resolve_parser(name: &str, extraction: Extraction) -> Result<ParserFn, ConfigError> {
    match extraction {
        Extraction::Parser(parser) => Ok(parser),
        Extraction::Regex { pattern, group } => {
            let regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidRegex {
                module: name.to_string(),
                source,
            })?;
            if group >= regex.captures_len() {
                return Err(ConfigError::InvalidGroup {
                    module: name.to_string(),
                    group,
                });
            }
            Ok(Arc::new(move |content: &str, base_url: &str| {
                extract_links(content, base_url, &regex, group)
            }))
        }
    }
}
