use url::Url;

/// Returns true if the URL uses a scheme the crawler can fetch
pub fn is_http_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Returns true if both URLs share scheme, host and port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use reach::url::same_origin;
///
/// let a = Url::parse("https://example.com/a").unwrap();
/// let b = Url::parse("https://example.com:443/b").unwrap();
/// let c = Url::parse("http://example.com/a").unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
