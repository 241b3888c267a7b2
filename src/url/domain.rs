use url::Url;

/// Extracts the lowercase host name from a URL, without the port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_seek::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Key under which per-host politeness state is cached: `host[:port]`
///
/// Two servers on the same machine but different ports keep separate
/// robots.txt rules and crawl-delay clocks.
pub fn host_key(url: &Url) -> Option<String> {
    let host = extract_host(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Builds `<scheme>://<host[:port]>/robots.txt` for the URL's host
pub fn robots_url(url: &Url) -> Option<String> {
    let key = host_key(url)?;
    Some(format!("{}://{}/robots.txt", url.scheme(), key))
}
