//! Small traversal helpers over `scraper` trees shared by the analyzer,
//! the candidate detector and the field extractor.

use scraper::{ElementRef, Html, Node, Selector};
use std::ops::Deref;
use tracing::warn;

/// Heading-like elements treated as titles or names
pub(crate) const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "strong", "b"];

/// Concatenated visible text of an element and its descendants
pub(crate) fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of an element
pub(crate) fn trimmed_text(element: &ElementRef) -> String {
    text_of(element).trim().to_string()
}

/// First line of the trimmed text, itself trimmed
pub(crate) fn first_line(text: &str) -> String {
    text.trim()
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Truncate to at most `max` characters without splitting a code point
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Space-joined class attribute as written in the markup
pub(crate) fn class_string(element: &ElementRef) -> String {
    element.value().classes().collect::<Vec<_>>().join(" ")
}

/// Whether any single class token contains one of `keywords`, ignoring case
pub(crate) fn class_contains_any(element: &ElementRef, keywords: &[&str]) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_lowercase();
        keywords.iter().any(|keyword| class.contains(keyword))
    })
}

/// Whether the id or the class list contains one of `keywords`, ignoring case
pub(crate) fn id_or_class_contains_any(element: &ElementRef, keywords: &[&str]) -> bool {
    let id = element.value().id().unwrap_or_default().to_lowercase();
    let classes = class_string(element).to_lowercase();
    keywords
        .iter()
        .any(|keyword| id.contains(keyword) || classes.contains(keyword))
}

/// Whether the lowercased text contains one of `keywords`
pub(crate) fn text_contains_any(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Whether the element's tag is one of `names`
pub(crate) fn is_named(element: &ElementRef, names: &[&str]) -> bool {
    names.contains(&element.value().name())
}

/// Every element of the document with one of the given tag names, in document order
pub(crate) fn elements_named<'a>(document: &'a Html, names: &[&str]) -> Vec<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| is_named(element, names))
        .collect()
}

/// Descendant elements, excluding `element` itself, in document order
pub(crate) fn descendant_elements<'a>(
    element: &ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Descendants with one of the given tag names
pub(crate) fn descendants_named<'a>(
    element: &ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
    descendant_elements(element).filter(move |child| is_named(child, names))
}

/// First element of `document` matching `css`; an invalid selector matches nothing
pub(crate) fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).next(),
        Err(e) => {
            warn!("Failed to parse selector '{}': {}", css, e);
            None
        }
    }
}

/// Whether any descendant is an anchor
pub(crate) fn has_link(element: &ElementRef) -> bool {
    descendant_elements(element).any(|child| child.value().name() == "a")
}

/// `href` of the first descendant anchor that has one
pub(crate) fn first_link_href<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    descendant_elements(element)
        .filter(|child| child.value().name() == "a")
        .find_map(|anchor| anchor.value().attr("href"))
}

/// Whether an ancestor of `element` has one of the given tag names
pub(crate) fn has_ancestor_named(element: &ElementRef, names: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_named(&ancestor, names))
}

/// Closest ancestor anchor
pub(crate) fn enclosing_anchor<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a")
}

/// First descendant text node matching `predicate`, paired with its parent element
pub(crate) fn find_text_node<'a>(
    element: &ElementRef<'a>,
    predicate: impl Fn(&str) -> bool,
) -> Option<(ElementRef<'a>, &'a str)> {
    element.descendants().find_map(|node| match node.value() {
        Node::Text(text) if predicate(&**text) => {
            let parent = node.parent().and_then(ElementRef::wrap)?;
            Some((parent, &**text))
        }
        _ => None,
    })
}

/// Elements that follow `start` in document order, limited to `scope`
///
/// Includes `start`'s own descendants, then everything after it inside
/// `scope`, mirroring a "find next" walk that cannot leave the candidate.
pub(crate) fn following_within<'a>(
    scope: &ElementRef<'a>,
    start: &ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
    let start_id = start.deref().id();
    scope
        .descendants()
        .skip_while(move |node| node.id() != start_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n  Senior Engineer \n Acme\n"), "Senior Engineer");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn test_class_matching_ignores_case() {
        let document = Html::parse_fragment(r#"<div id="Main" class="Job-Card featured">x</div>"#);
        let div = first(&document, "div");
        assert!(class_contains_any(&div, &["job"]));
        assert!(!class_contains_any(&div, &["main"]));
        assert!(id_or_class_contains_any(&div, &["main"]));
    }

    #[test]
    fn test_links() {
        let document = Html::parse_fragment(
            r#"<div><a name="top">no href</a><p><a href="/jobs/1">Apply</a></p></div>"#,
        );
        let div = first(&document, "div");
        assert!(has_link(&div));
        assert_eq!(first_link_href(&div), Some("/jobs/1"));
    }

    #[test]
    fn test_find_text_node_and_following() {
        let document = Html::parse_fragment(
            r#"<div class="card"><span>Company:</span><span>Acme</span></div><p>outside</p>"#,
        );
        let card = first(&document, "div.card");
        let (label, text) = find_text_node(&card, |t| t.contains("Company")).unwrap();
        assert_eq!(text, "Company:");

        let next: Vec<String> = following_within(&card, &label).map(|e| trimmed_text(&e)).collect();
        assert_eq!(next, vec!["Acme"]);
    }

    #[test]
    fn test_select_first() {
        let document = Html::parse_document(r#"<div class="a">1</div><div class="a">2</div>"#);
        assert_eq!(select_first(&document, ".a").map(|e| trimmed_text(&e)), Some("1".to_string()));
        assert!(select_first(&document, "div[").is_none());
    }

    #[test]
    fn test_ancestors() {
        let document = Html::parse_fragment(r#"<nav><a href="/x"><img src="l.png"></a></nav>"#);
        let img = first(&document, "img");
        assert!(has_ancestor_named(&img, &["nav"]));
        assert_eq!(
            enclosing_anchor(&img).and_then(|a| a.value().attr("href")),
            Some("/x")
        );
    }
}
