//! Target address checks and the redirect policy built on them.

use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;
use url::{Host, Url};

use crate::config::MAX_REDIRECTS;

/// Why a target URL may not be fetched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnsafeTarget {
    #[error("scheme '{0}' is not fetchable (only http and https)")]
    Scheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("'{0}' is a localhost name")]
    Localhost(String),

    #[error("{0} is a private or reserved address")]
    PrivateAddress(String),
}

/// Checks that `url` points at a public http(s) host.
///
/// Only literal addresses and localhost names are screened; names that
/// resolve to private addresses are not.
pub fn validate_target(url: &Url) -> Result<(), UnsafeTarget> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UnsafeTarget::Scheme(url.scheme().to_string()));
    }

    match url.host().ok_or(UnsafeTarget::MissingHost)? {
        Host::Domain(domain) if is_localhost_domain(domain) => {
            Err(UnsafeTarget::Localhost(domain.to_string()))
        }
        Host::Domain(_) => Ok(()),
        Host::Ipv4(ip) if is_private_ipv4(ip) => Err(UnsafeTarget::PrivateAddress(ip.to_string())),
        Host::Ipv6(ip) if is_private_ipv6(ip) => Err(UnsafeTarget::PrivateAddress(ip.to_string())),
        Host::Ipv4(_) | Host::Ipv6(_) => Ok(()),
    }
}

/// Redirect policy for the shared client.
///
/// Follows at most `MAX_REDIRECTS` hops and, unless `allow_private` is set,
/// stops at the first hop whose target fails [`validate_target`].
pub fn redirect_policy(allow_private: bool) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("more than {MAX_REDIRECTS} redirects"));
        }
        if allow_private {
            return attempt.follow();
        }
        match validate_target(attempt.url()) {
            Ok(()) => attempt.follow(),
            Err(reason) => {
                let msg = format!("redirect to {} blocked: {reason}", attempt.url());
                attempt.error(msg)
            }
        }
    })
}

/// Loopback, RFC 1918, link-local, "this network", multicast and reserved.
fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    matches!(
        (a, b),
        (0, _) | (10, _) | (127, _) | (169, 254) | (172, 16..=31) | (192, 168) | (224..=255, _)
    )
}

/// Unspecified, loopback, unique local, link-local, multicast, and any
/// IPv4-mapped address whose IPv4 part is private.
fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(v4);
    }
    let first = ip.segments()[0];
    ip.is_unspecified()
        || ip.is_loopback()
        || first & 0xfe00 == 0xfc00
        || first & 0xffc0 == 0xfe80
        || first & 0xff00 == 0xff00
}

fn is_localhost_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || domain == "localhost.localdomain" || domain.ends_with(".localhost")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn check(url: &str) -> Result<(), UnsafeTarget> {
        validate_target(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_public_targets_pass() {
        assert!(check("https://example.com/path?q=1").is_ok());
        assert!(check("http://example.com:8080").is_ok());
        assert!(check("http://203.0.113.7").is_ok());
        assert!(check("http://8.8.8.8").is_ok());
        assert!(check("http://[2001:db8::1]").is_ok());
        // Only the exact localhost label is blocked
        assert!(check("https://localhost.example.com").is_ok());
    }

    #[test]
    fn test_private_ipv4_blocked() {
        for url in [
            "http://127.0.0.1:3000",
            "http://10.1.2.3",
            "http://172.16.0.1",
            "http://172.31.255.255",
            "http://192.168.0.10",
            "http://169.254.169.254/latest/meta-data",
            "http://0.0.0.0",
            "http://224.0.0.1",
            "http://255.255.255.255",
        ] {
            assert!(
                matches!(check(url), Err(UnsafeTarget::PrivateAddress(_))),
                "{url} should be blocked"
            );
        }
        assert!(check("http://172.32.0.1").is_ok());
    }

    #[test]
    fn test_private_ipv6_blocked() {
        for url in [
            "http://[::1]",
            "http://[::]",
            "http://[fd12:3456::1]",
            "http://[fe80::1]",
            "http://[ff02::1]",
            "http://[::ffff:127.0.0.1]",
            "http://[::ffff:10.0.0.1]",
        ] {
            assert!(check(url).is_err(), "{url} should be blocked");
        }
        assert!(check("http://[::ffff:8.8.8.8]").is_ok());
    }

    #[test]
    fn test_localhost_names_blocked() {
        assert_eq!(
            check("http://LOCALHOST:8080"),
            Err(UnsafeTarget::Localhost("localhost".into()))
        );
        assert!(check("http://localhost.").is_err());
        assert!(check("http://localhost.localdomain").is_err());
        assert!(check("http://api.localhost").is_err());
    }

    #[test]
    fn test_non_http_schemes_blocked() {
        assert_eq!(
            check("ftp://example.com"),
            Err(UnsafeTarget::Scheme("ftp".into()))
        );
        assert!(check("file:///etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_redirect_to_private_address_is_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/internal", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/internal"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .redirect(redirect_policy(false))
            .build()
            .unwrap();
        let err = client
            .get(format!("{}/hop", server.uri()))
            .send()
            .await
            .unwrap_err();
        assert!(err.is_redirect());
    }

    #[tokio::test]
    async fn test_redirects_followed_when_private_targets_allowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/internal", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/internal"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .redirect(redirect_policy(true))
            .build()
            .unwrap();
        let response = client.get(format!("{}/hop", server.uri())).send().await.unwrap();
        assert_eq!(response.status(), 200);
    }
}
