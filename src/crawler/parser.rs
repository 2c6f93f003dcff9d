//! HTML parser for extracting links
//!
//! This module is the link extraction collaborator of the crawler: given raw
//! HTML it returns anchor `href` values. Resolution, scheme and origin
//! policy are applied by the crawler, not here.

use scraper::{Html, Selector};

/// Extracts anchor `href` attribute values from an HTML document
///
/// # Extraction Rules
///
/// **Include:**
/// - Every `<a href="...">`, in document order, as written (unresolved)
///
/// **Exclude:**
/// - Empty hrefs
/// - `javascript:` hrefs
/// - Fragment-only hrefs (`#section`)
///
/// Other schemes (`mailto:`, `tel:`, ...) are returned so the crawler can
/// count them as skipped.
///
/// A document that cannot be queried yields no links; this is logged as a
/// warning rather than reported as an error.
///
/// # Example
///
/// ```
/// use reach::crawler::extract_hrefs;
///
/// let html = r##"<html><body><a href="/about">About</a><a href="#top">Top</a></body></html>"##;
/// assert_eq!(extract_hrefs(html), vec!["/about".to_string()]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to build anchor selector: {:?}", e);
            return Vec::new();
        }
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_followable_href(href))
        .map(String::from)
        .collect()
}

/// Returns false for hrefs that never point at another document
fn is_followable_href(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let is_javascript = href
        .get(..11)
        .map(|prefix| prefix.eq_ignore_ascii_case("javascript:"))
        .unwrap_or(false);

    !is_javascript
}
