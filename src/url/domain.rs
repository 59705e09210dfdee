use crate::url::DomainKey;
use crate::{DomainError, DomainResult};
use ::url::{Host, Url};

/// Reduces a URL to its registrable domain
///
/// The host is lower-cased, stripped of a trailing dot, and cut down to the
/// public-suffix-aware registrable domain, so every subdomain of an
/// organization maps to the same key.
///
/// # Arguments
///
/// * `url_str` - An absolute URL, as returned in a search result
///
/// # Returns
///
/// * `Ok(DomainKey)` - The registrable domain
/// * `Err(DomainError)` - The URL cannot be resolved to a registrable domain
///
/// # Examples
///
/// ```
/// use serp_harvester::url::registrable_domain;
///
/// let key = registrable_domain("https://shop.Acme.com/deals").unwrap();
/// assert_eq!(key.as_str(), "acme.com");
///
/// let key = registrable_domain("https://news.bbc.co.uk/").unwrap();
/// assert_eq!(key.as_str(), "bbc.co.uk");
///
/// assert!(registrable_domain("acme.com/page").is_err());
/// ```
pub fn registrable_domain(url_str: &str) -> DomainResult<DomainKey> {
    let url = Url::parse(url_str.trim()).map_err(|e| DomainError::Parse(e.to_string()))?;

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_lowercase(),
        Some(Host::Ipv4(addr)) => return Err(DomainError::IpHost(addr.to_string())),
        Some(Host::Ipv6(addr)) => return Err(DomainError::IpHost(addr.to_string())),
        None => return Err(DomainError::MissingHost),
    };

    let host = host.trim_end_matches('.');
    if host.is_empty() {
        return Err(DomainError::MissingHost);
    }

    psl::domain_str(host)
        .map(|domain| DomainKey(domain.to_string()))
        .ok_or_else(|| DomainError::NotRegistrable(host.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> String {
        registrable_domain(url).unwrap().into_string()
    }

    #[test]
    fn test_plain_domain() {
        assert_eq!(key("https://acme.com/"), "acme.com");
    }

    #[test]
    fn test_subdomains_collapse() {
        assert_eq!(key("https://shop.acme.com/cart"), "acme.com");
        assert_eq!(key("https://www.acme.com/"), "acme.com");
        assert_eq!(key("http://api.v2.acme.com:8080/x?y=1#z"), "acme.com");
    }

    #[test]
    fn test_uppercase_converted_to_lowercase() {
        assert_eq!(key("https://WWW.Acme.COM/About"), "acme.com");
    }

    #[test]
    fn test_multi_label_public_suffix() {
        assert_eq!(key("https://news.bbc.co.uk/world"), "bbc.co.uk");
        assert_eq!(key("https://shop.example.com.au/"), "example.com.au");
    }

    #[test]
    fn test_trailing_dot() {
        assert_eq!(key("https://www.acme.com./"), "acme.com");
    }

    #[test]
    fn test_schemeless_fails() {
        assert!(matches!(
            registrable_domain("acme.com/page"),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_fails() {
        assert!(registrable_domain("").is_err());
    }

    #[test]
    fn test_no_host_fails() {
        assert_eq!(
            registrable_domain("mailto:someone@acme.com"),
            Err(DomainError::MissingHost)
        );
    }

    #[test]
    fn test_ip_host_fails() {
        assert!(matches!(
            registrable_domain("http://127.0.0.1:8080/"),
            Err(DomainError::IpHost(_))
        ));
    }

    #[test]
    fn test_bare_suffix_fails() {
        assert!(matches!(
            registrable_domain("https://co.uk/"),
            Err(DomainError::NotRegistrable(_))
        ));
    }
}
