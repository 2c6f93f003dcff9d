use url::Url;

/// Normalizes a URL so that equivalent addresses compare equal
///
/// # Normalization Steps
///
/// 1. Resolve `url` against `base` when one is given, otherwise parse it as
///    an absolute URL; reject if malformed
/// 2. Remove fragment (everything after #)
/// 3. Remove trailing slashes from the path, except for the root `/`
///
/// Normalization is idempotent: feeding a normalized URL back in returns it
/// unchanged.
///
/// # Arguments
///
/// * `url` - The URL or href to normalize
/// * `base` - Optional base URL used to resolve relative hrefs
///
/// # Returns
///
/// * `Some(String)` - Normalized URL
/// * `None` - The input (or the base) could not be parsed
///
/// # Examples
///
/// ```
/// use reach::url::normalize_url;
///
/// let url = normalize_url("https://example.com/page/#top", None).unwrap();
/// assert_eq!(url, "https://example.com/page");
///
/// let url = normalize_url("../about/", Some("https://example.com/docs/intro")).unwrap();
/// assert_eq!(url, "https://example.com/about");
/// ```
pub fn normalize_url(url: &str, base: Option<&str>) -> Option<String> {
    let base = match base {
        Some(b) => Some(Url::parse(b).ok()?),
        None => None,
    };
    normalize_parsed(url, base.as_ref()).map(String::from)
}

/// Same as [`normalize_url`] but works with an already-parsed base and
/// returns the parsed result
pub fn normalize_parsed(url: &str, base: Option<&Url>) -> Option<Url> {
    let mut resolved = match base {
        Some(base) => base.join(url).ok()?,
        None => Url::parse(url).ok()?,
    };

    resolved.set_fragment(None);

    let path = resolved.path();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        resolved.set_path(&trimmed);
    }

    Some(resolved)
}
