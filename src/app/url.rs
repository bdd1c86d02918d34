//! URL validation and normalization utilities.

use url::Url;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::AnalysisError;

/// Validates and normalizes a submitted URL.
///
/// Trims surrounding whitespace, adds an `https://` prefix when no scheme is
/// present, then requires the result to parse as an absolute `http`/`https` URL
/// with a host. Rejects input longer than `MAX_URL_LENGTH`.
///
/// This is the only fatal check of an analysis and runs before any outbound call.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` describing why the URL was rejected.
pub fn normalize_url(input: &str) -> Result<Url, AnalysisError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::invalid_input(input, "URL is required"));
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AnalysisError::invalid_input(
            &trimmed.chars().take(50).collect::<String>(),
            format!("URL exceeds maximum length of {MAX_URL_LENGTH} characters"),
        ));
    }

    // Anything with an explicit scheme is parsed as-is and checked below.
    let has_scheme = trimmed.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    });
    let normalized = if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed =
        Url::parse(&normalized).map_err(|e| AnalysisError::invalid_input(trimmed, e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AnalysisError::invalid_input(
                trimmed,
                format!("unsupported scheme '{other}'"),
            ))
        }
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(AnalysisError::invalid_input(trimmed, "URL has no host")),
    }
}

/// Lowercased hostname of a normalized URL, without IPv6 brackets.
pub fn host_of(url: &Url) -> String {
    url.host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_adds_https() {
        let url = normalize_url("example.com").expect("valid");
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_normalize_url_preserves_http() {
        let url = normalize_url("http://example.com/page").expect("valid");
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.path(), "/page");
    }

    #[test]
    fn test_normalize_url_uppercase_scheme() {
        let url = normalize_url("HTTPS://Example.COM").expect("valid");
        assert_eq!(url.scheme(), "https");
        assert_eq!(host_of(&url), "example.com");
    }

    #[test]
    fn test_normalize_url_trims_whitespace() {
        let url = normalize_url("  example.com/path?query=value  ").expect("valid");
        assert_eq!(url.as_str(), "https://example.com/path?query=value");
    }

    #[test]
    fn test_normalize_url_rejects_spaces() {
        let err = normalize_url("not a url").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[test]
    fn test_normalize_url_rejects_empty() {
        assert!(matches!(
            normalize_url("   "),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_normalize_url_rejects_overlong_input() {
        let long = format!("example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(
            normalize_url(&long),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_normalize_url_rejects_other_schemes() {
        for input in ["ftp://example.com", "file:///etc/passwd"] {
            assert!(matches!(
                normalize_url(input),
                Err(AnalysisError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_normalize_url_scheme_in_query() {
        let url = normalize_url("example.com/go?next=https://other.example").expect("valid");
        assert_eq!(host_of(&url), "example.com");
    }

    #[test]
    fn test_normalize_url_with_port() {
        let url = normalize_url("example.com:8080").expect("valid");
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_host_of_ipv6() {
        let url = normalize_url("[2001:db8::1]").expect("valid");
        assert_eq!(host_of(&url), "2001:db8::1");
    }
}
