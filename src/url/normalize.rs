use crate::UrlError;
use url::Url;

/// Parses and checks a seed URL
///
/// # Rules
///
/// 1. Parse the URL; reject if malformed
/// 2. Only `http` and `https` schemes are accepted
/// 3. The URL must have a host
///
/// Query strings and fragments are left untouched; they are part of URL identity.
///
/// # Examples
///
/// ```
/// use opencrawl::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// assert!(normalize_url("ftp://example.com/").is_err());
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

/// Resolves an href (relative, protocol-relative, or absolute) against a base URL
///
/// # Arguments
///
/// * `href` - The raw href value as found in the page
/// * `base` - The URL of the page the href was found on
///
/// # Returns
///
/// * `Ok(Url)` - The absolute URL, fragment and query preserved
/// * `Err(UrlError)` - The href could not be resolved
///
/// # Examples
///
/// ```
/// use opencrawl::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// assert_eq!(resolve("../about?x=1#team", &base).unwrap().as_str(),
///            "https://example.com/about?x=1#team");
/// ```
pub fn resolve(href: &str, base: &Url) -> Result<Url, UrlError> {
    base.join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))
}
