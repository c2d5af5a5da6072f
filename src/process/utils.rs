use tracing::warn;
use url::Url;

/// Collapse non-breaking spaces and whitespace runs into single spaces, then trim.
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    raw.replace('\u{a0}', " ")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve an `href` to an absolute URL against `base`.
/// Empty input stays empty; absolute `http(s)` links are kept as-is.
pub fn resolve_url(base: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http") {
        return href.to_string();
    }
    match base.join(href) {
        Ok(u) => u.to_string(),
        Err(e) => {
            warn!(%base, href, error = %e, "could not resolve link, keeping it as-is");
            href.to_string()
        }
    }
}
