//! Text patterns scanned over inline script blocks

use regex::Regex;
use std::sync::OnceLock;

fn api_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"https?://[^"'\s]+api[^"'\s]*"#).expect("api url pattern is valid")
    })
}

fn global_assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)window\.[A-Za-z0-9_]+ = (\{.+?\});")
            .expect("global assignment pattern is valid")
    })
}

/// URL-shaped strings containing "api"
pub fn find_api_urls(script: &str) -> Vec<String> {
    api_url_regex()
        .find_iter(script)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Object literals assigned to a `window.<name>` global
///
/// The capture is non-greedy and stops at the first `};`, so nested
/// objects that close earlier are cut short. The blobs are diagnostic
/// samples, not parsed data.
pub fn find_global_assignments(script: &str) -> Vec<String> {
    global_assignment_regex()
        .captures_iter(script)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
