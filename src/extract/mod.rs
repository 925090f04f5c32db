//! Link-resolution helpers that feed the verifier: URL normalization,
//! base-URL discovery, script stripping and link extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use url::Url;

/// Matches a `<base ...>` tag, capturing its attribute text.
#[allow(clippy::expect_used)]
static BASE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<base\s([^>]*?)>").expect("base tag regex is valid") // Static pattern, safe to panic
});

/// Matches an `href` attribute value: double-quoted, single-quoted or bare.
#[allow(clippy::expect_used)]
static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*(?:"([^"]+)"|'([^']+)'|([^\s"'>]+))"#)
        .expect("href attribute regex is valid") // Static pattern, safe to panic
});

/// Matches whole `<script>...</script>` blocks, including their content.
#[allow(clippy::expect_used)]
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[\s\S]+?</script>").expect("script regex is valid") // Static pattern, safe to panic
});

/// Resolves a possibly-relative link against a base URL.
///
/// Pure and infallible: malformed input degrades to returning the base.
/// With no base supplied the link is its own base. Links with an explicit
/// scheme other than `http`/`https` (`javascript:`, `data:`, `mailto:`, ...)
/// are not checkable resources and return the base unchanged. When
/// `remove_fragment` is set, everything from the first `#` onward is
/// stripped.
#[must_use]
pub fn normalize_link(link: &str, base_url: Option<&str>, remove_fragment: bool) -> String {
    let base = base_url.unwrap_or(link);

    if let Ok(parsed) = Url::parse(link) {
        if !matches!(parsed.scheme(), "http" | "https") {
            return base.to_string();
        }
    }

    let resolved = match Url::parse(base).and_then(|b| b.join(link)) {
        Ok(url) => url.to_string(),
        Err(_) => base.to_string(),
    };

    if remove_fragment {
        match resolved.find('#') {
            Some(pos) => resolved[..pos].to_string(),
            None => resolved,
        }
    } else {
        resolved
    }
}

/// Extracts a page's declared base URL from raw content.
///
/// Scans for the first `<base ...>` tag and returns its `href` attribute
/// (quoted either way or bare). Absence of a tag, or a tag without an
/// `href`, is a normal outcome, not an error.
#[must_use]
pub fn find_base_url(content: &str) -> Option<String> {
    let tag = BASE_TAG.captures(content)?.get(1)?;
    let caps = HREF_ATTR.captures(tag.as_str())?;
    first_group(&caps).map(ToString::to_string)
}

/// Removes `<script>...</script>` blocks so inline code is never mistaken
/// for markup during extraction.
#[must_use]
pub fn strip_scripts(content: &str) -> String {
    SCRIPT_BLOCK.replace_all(content, "").into_owned()
}

/// Extracts the deduplicated set of normalized links matched by `regex`.
///
/// The capture group at `group` is taken from each match and normalized
/// against `base_url`. The page's own normalized base URL is always
/// excluded, even if it appears as a link. Order carries no meaning beyond
/// deduplication.
#[must_use]
pub fn extract_links(content: &str, base_url: &str, regex: &Regex, group: usize) -> Vec<String> {
    let raw = regex
        .captures_iter(content)
        .filter_map(|caps| caps.get(group).map(|m| m.as_str().to_string()));
    collect_links(raw, base_url)
}

/// Normalizes, deduplicates and filters a stream of raw link strings.
///
/// Shared by the regex extractor and the built-in page kinds.
pub(crate) fn collect_links(raw: impl Iterator<Item = String>, base_url: &str) -> Vec<String> {
    let own = normalize_link(base_url, None, true);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for candidate in raw {
        let link = normalize_link(&candidate, Some(base_url), true);
        if link == own {
            continue;
        }
        if seen.insert(link.clone()) {
            trace!(link = %link, "extracted link");
            links.push(link);
        }
    }
    links
}

/// Picks the first participating capture group of a quoted-or-bare
/// attribute match.
pub(crate) fn first_group<'t>(caps: &regex::Captures<'t>) -> Option<&'t str> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}
