//! URL normalization against a site's base URL

use url::Url;

/// Resolve `href` against `base`
///
/// - hrefs that already carry a scheme come back unchanged
/// - protocol-relative hrefs (`//host/path`) take the base's scheme
/// - hrefs starting with `/` are joined with the base's origin
/// - anything else is treated as a path segment under `base`
///
/// The result is deterministic and idempotent as long as `base` itself is
/// absolute: `normalize(b, &normalize(b, x)) == normalize(b, x)`.
pub fn normalize(base: &str, href: &str) -> String {
    let href = href.trim();

    if has_scheme(href) {
        return href.to_string();
    }

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = Url::parse(base)
            .map(|url| url.scheme().to_string())
            .unwrap_or_else(|_| "https".to_string());
        return format!("{scheme}://{rest}");
    }

    if href.starts_with('/') {
        return format!("{}{}", origin(base), href);
    }

    format!("{}/{}", base.trim_end_matches('/'), href)
}

/// Scheme, host and port of `base`, without a trailing slash
///
/// Falls back to the trimmed input when `base` does not parse.
pub fn origin(base: &str) -> String {
    match Url::parse(base) {
        Ok(url) if url.has_host() => url.origin().ascii_serialization(),
        _ => base.trim_end_matches('/').to_string(),
    }
}

/// Host of an absolute URL, lowercased
pub fn host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
}

/// Path component of an absolute URL, lowercased
pub(crate) fn path_lowercase(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url.to_lowercase(),
    }
}

fn has_scheme(href: &str) -> bool {
    let Some((scheme, rest)) = href.split_once(':') else {
        return false;
    };

    let valid = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid
        && (rest.starts_with("//")
            || matches!(
                scheme.to_ascii_lowercase().as_str(),
                "mailto" | "tel" | "javascript" | "data"
            ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.jobsfromspace.com";

    #[test]
    fn test_root_relative_joins_origin() {
        assert_eq!(
            normalize(BASE, "/jobs/42"),
            "https://www.jobsfromspace.com/jobs/42"
        );
        assert_eq!(
            normalize("https://example.com/remote-jobs/software?page=2", "/jobs/42"),
            "https://example.com/jobs/42"
        );
        assert_eq!(
            normalize("http://127.0.0.1:8080/board/", "/a"),
            "http://127.0.0.1:8080/a"
        );
    }

    #[test]
    fn test_absolute_href_unchanged() {
        assert_eq!(
            normalize(BASE, "https://other.example/jobs/1"),
            "https://other.example/jobs/1"
        );
        assert_eq!(normalize(BASE, "mailto:hr@example.com"), "mailto:hr@example.com");
    }

    #[test]
    fn test_relative_segment_single_separator() {
        assert_eq!(normalize(BASE, "jobs/7"), "https://www.jobsfromspace.com/jobs/7");
        assert_eq!(
            normalize("https://example.com/", "jobs/7"),
            "https://example.com/jobs/7"
        );
    }

    #[test]
    fn test_protocol_relative() {
        assert_eq!(normalize(BASE, "//cdn.example/logo.png"), "https://cdn.example/logo.png");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for href in [
            "/jobs/42",
            "jobs/42",
            "https://x.example/a",
            "//cdn.example/l.png",
            "/",
            "?page=2",
        ] {
            let once = normalize(BASE, href);
            assert_eq!(normalize(BASE, &once), once, "href {href}");
        }
    }

    #[test]
    fn test_root_relative_equals_origin_plus_path() {
        let bases = [
            "https://example.com",
            "https://example.com/",
            "https://example.com/a/b/c",
            "http://localhost:3000/x?y=1",
        ];
        for base in bases {
            for path in ["/", "/jobs", "/jobs/42?ref=home"] {
                assert_eq!(normalize(base, path), format!("{}{}", origin(base), path));
            }
        }
    }

    #[test]
    fn test_host_and_path() {
        assert_eq!(host("https://WWW.Example.com/a").as_deref(), Some("www.example.com"));
        assert_eq!(host("not a url"), None);
        assert_eq!(path_lowercase("https://example.com/Jobs/42?x=1"), "/jobs/42");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://example.com"));
        assert!(has_scheme("tel:+123"));
        assert!(!has_scheme("/jobs"));
        assert!(!has_scheme("jobs:42"));
        assert!(!has_scheme("?page=2"));
    }
}
