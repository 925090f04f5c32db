//! Built-in extraction kinds: anchors, images and iframes.
//!
//! Each kind matches its tag's link attribute whether the value is
//! double-quoted, single-quoted or bare, and accepts the lazy-loading
//! `data-href` / `data-src` variants.

use std::sync::LazyLock;

use regex::Regex;

use super::config::Extraction;
use crate::extract::{collect_links, first_group};

#[allow(clippy::expect_used)]
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?(?:data-)?href\s*=\s*(?:"\s*([^"]+?)\s*"|'\s*([^']+?)\s*'|([^\s"'>]+))"#)
        .expect("anchor regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s[^>]*?(?:data-)?src\s*=\s*(?:"\s*([^"]+?)\s*"|'\s*([^']+?)\s*'|([^\s"'>]+))"#)
        .expect("img regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static IFRAME_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<iframe\s[^>]*?(?:data-)?src\s*=\s*(?:"\s*([^"]+?)\s*"|'\s*([^']+?)\s*'|([^\s"'>]+))"#)
        .expect("iframe regex is valid") // Static pattern, safe to panic
});

/// Extraction rule for `<a href>` / `<a data-href>` links.
#[must_use]
pub fn anchors() -> Extraction {
    Extraction::parser(|content, base_url| attribute_links(&ANCHOR_HREF, content, base_url))
}

/// Extraction rule for `<img src>` / `<img data-src>` links.
#[must_use]
pub fn images() -> Extraction {
    Extraction::parser(|content, base_url| attribute_links(&IMG_SRC, content, base_url))
}

/// Extraction rule for `<iframe src>` / `<iframe data-src>` links.
#[must_use]
pub fn iframes() -> Extraction {
    Extraction::parser(|content, base_url| attribute_links(&IFRAME_SRC, content, base_url))
}

fn attribute_links(regex: &Regex, content: &str, base_url: &str) -> Vec<String> {
    let raw = regex
        .captures_iter(content)
        .filter_map(|caps| first_group(&caps).map(ToString::to_string));
    collect_links(raw, base_url)
}
