use crate::url::domain::extract_host;
use crate::{UrlError, UrlResult};
use url::{ParseError, Url};

/// Resolves a raw href against the page it was found on
///
/// # Rejection Rules (checked in order)
///
/// 1. href starts with `mailto:`
/// 2. base or href cannot be parsed
/// 3. href names a host that differs from the base host
///
/// Otherwise the href is resolved against the base (standard relative
/// resolution), its fragment is stripped, and the absolute URL is returned.
/// The function holds no state, so any number of workers may call it at once.
///
/// # Examples
///
/// ```
/// use sumi_seek::url::clean_url;
///
/// let cleaned = clean_url("https://x.org/a/", "../b#top").unwrap();
/// assert_eq!(cleaned, "https://x.org/b");
///
/// assert!(clean_url("https://x.org/", "mailto:me@x.org").is_err());
/// assert!(clean_url("https://x.org/", "https://y.org/").is_err());
/// ```
pub fn clean_url(base: &str, href: &str) -> UrlResult<String> {
    if href.starts_with("mailto:") {
        return Err(UrlError::Mailto(href.to_string()));
    }

    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
    let href = href.trim();

    // Only an href that carries its own authority can name another host;
    // plain relative paths always inherit the base host.
    let names_host = match Url::parse(href) {
        Ok(_) => true,
        Err(ParseError::RelativeUrlWithoutBase) => href.starts_with("//"),
        Err(e) => return Err(UrlError::Parse(format!("{}: {}", href, e))),
    };

    let mut resolved = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if names_host {
        if let Some(href_host) = resolved.host_str().filter(|h| !h.is_empty()) {
            if base_url.host_str() != Some(href_host) {
                return Err(UrlError::CrossHost {
                    base_host: base_url.host_str().unwrap_or_default().to_string(),
                    href_host: href_host.to_string(),
                });
            }
        }
    }

    resolved.set_fragment(None);
    Ok(resolved.into())
}

/// Parses a seed string into a fragment-free absolute URL
///
/// The seed marks the crawl's starting point and its host boundary, so it must
/// carry a host.
pub fn normalize_seed(seed: &str) -> UrlResult<Url> {
    let mut url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;
    if extract_host(&url).is_none() {
        return Err(UrlError::MissingHost(seed.to_string()));
    }
    url.set_fragment(None);
    Ok(url)
}
