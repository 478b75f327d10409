//! "Next page" control detection

use scraper::{ElementRef, Html};
use url::Url;

use crate::dom;
use crate::normalize::normalize;

const NEXT_LABELS: &[&str] = &["next", "›", "»", ">", "next ›", "next »", "next >"];
const PAGINATION_KEYWORDS: &[&str] = &["pagination", "pager"];

/// A located "next page" control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextControl {
    /// Resolved target, `None` when the control has no `href`
    pub href: Option<String>,

    /// Whether the control is marked as disabled
    pub disabled: bool,
}

impl NextControl {
    /// Target URL when the control can be followed
    pub fn target(&self) -> Option<&str> {
        if self.disabled {
            None
        } else {
            self.href.as_deref()
        }
    }
}

/// First "next page" control in document order
///
/// `page_url` is the URL the document was fetched from; the control's
/// `href` is resolved against it the way a browser would.
pub fn find_next_control(document: &Html, page_url: &str) -> Option<NextControl> {
    let control = dom::elements_named(document, &["a"])
        .into_iter()
        .find(is_next_anchor)?;

    Some(NextControl {
        href: control.value().attr("href").map(|href| resolve(page_url, href)),
        disabled: is_disabled(&control),
    })
}

/// URL of the next page, `None` when the control is missing or disabled
pub fn find_next_page(document: &Html, page_url: &str) -> Option<String> {
    find_next_control(document, page_url)?.target().map(str::to_string)
}

/// Absolute target of `href` without its fragment, which never names another page
fn resolve(page_url: &str, href: &str) -> String {
    match Url::parse(page_url).and_then(|url| url.join(href.trim())) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.into()
        }
        Err(_) => {
            let mut resolved = normalize(page_url, href);
            if let Some(position) = resolved.find('#') {
                resolved.truncate(position);
            }
            resolved
        }
    }
}

fn is_next_anchor(anchor: &ElementRef) -> bool {
    let rel_next = anchor
        .value()
        .attr("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("next")));
    if rel_next || dom::class_contains_any(anchor, &["next"]) {
        return true;
    }

    let label = dom::trimmed_text(anchor).to_lowercase();
    NEXT_LABELS.contains(&label.as_str())
        && anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| dom::class_contains_any(&ancestor, PAGINATION_KEYWORDS))
}

fn is_disabled(control: &ElementRef) -> bool {
    let element = control.value();
    dom::class_contains_any(control, &["disabled"])
        || element.attr("disabled").is_some()
        || element
            .attr("aria-disabled")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
        || control
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| dom::class_contains_any(&parent, &["disabled"]))
}
