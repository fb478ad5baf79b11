use url::Url;

/// Extracts the network location (`host[:port]`) from a URL
///
/// The host is lowercased by the URL parser. The port only appears when it is
/// not the default port for the scheme. URLs without a host return None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use opencrawl::url::network_location;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(network_location(&url), Some("localhost:8080".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    if host.is_empty() {
        return None;
    }
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}
