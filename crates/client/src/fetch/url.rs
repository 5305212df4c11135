//! URL resolution for requests issued from the agent's origin.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a possibly relative URL against the agent's origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join relative references (`/index.html`, `app.js`) onto `base`;
///    absolute URLs replace it
/// 3. Reject anything but http and https
/// 4. Lowercase the host
/// 5. Remove fragment (#...)
/// 6. Keep query string intact (do not reorder)
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Same scheme, host and port.
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&origin(), "/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve(&origin(), "/zele-church-escalas.html").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/zele-church-escalas.html");
    }

    #[test]
    fn test_resolve_absolute_keeps_host() {
        let url = resolve(&origin(), "https://cdn.tailwindcss.com").unwrap();
        assert_eq!(url.as_str(), "https://cdn.tailwindcss.com/");
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&origin(), "https://CDN.JSDELIVR.NET/npm/x.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.jsdelivr.net"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&origin(), "/index.html#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/api?b=2&a=1").unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&origin(), "  /index.html  ").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/index.html");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&origin(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_same_origin() {
        let base = origin();
        assert!(is_same_origin(&base, &Url::parse("http://localhost:8080/a/b").unwrap()));
        assert!(!is_same_origin(&base, &Url::parse("https://localhost:8080/").unwrap()));
        assert!(!is_same_origin(&base, &Url::parse("http://localhost:9090/").unwrap()));
        assert!(!is_same_origin(&base, &Url::parse("http://example.com:8080/").unwrap()));
    }

    #[test]
    fn test_same_origin_default_port() {
        let a = Url::parse("https://app.example.com").unwrap();
        let b = Url::parse("https://app.example.com:443/index.html").unwrap();
        assert!(is_same_origin(&a, &b));
    }
}
