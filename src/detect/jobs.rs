//! Job posting strategies, most specific first

use scraper::{ElementRef, Html};

use super::CandidateStrategy;
use crate::dom;

const CONTAINER_TAGS: &[&str] = &["div", "section", "ul"];
const CONTAINER_KEYWORDS: &[&str] = &["job", "position", "opening", "listing"];

const ITEM_TAGS: &[&str] = &["div", "li", "article"];
const ITEM_KEYWORDS: &[&str] = &["job", "position", "opening", "card", "listing"];

const TEXT_KEYWORDS: &[&str] = &["job", "position", "opening", "apply", "hire"];

/// Items inside the first container that looks like a job list
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerScoped;

impl CandidateStrategy for ContainerScoped {
    fn name(&self) -> &'static str {
        "job container"
    }

    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let container = dom::elements_named(document, CONTAINER_TAGS)
            .into_iter()
            .find(|element| dom::id_or_class_contains_any(element, CONTAINER_KEYWORDS));

        match container {
            Some(container) => dom::descendants_named(&container, ITEM_TAGS)
                .filter(|item| dom::class_contains_any(item, ITEM_KEYWORDS))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Job-looking items anywhere on the page
#[derive(Debug, Clone, Copy, Default)]
pub struct WholePageClassMatch;

impl CandidateStrategy for WholePageClassMatch {
    fn name(&self) -> &'static str {
        "job class"
    }

    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        dom::elements_named(document, ITEM_TAGS)
            .into_iter()
            .filter(|item| dom::class_contains_any(item, ITEM_KEYWORDS))
            .collect()
    }
}

/// Items mentioning jobs in their text and holding a link
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordText;

impl CandidateStrategy for KeywordText {
    fn name(&self) -> &'static str {
        "job text"
    }

    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        dom::elements_named(document, ITEM_TAGS)
            .into_iter()
            .filter(|item| dom::has_link(item))
            .filter(|item| dom::text_contains_any(&dom::text_of(item), TEXT_KEYWORDS))
            .collect()
    }
}

/// Built-in job cascade
pub fn job_strategies() -> [&'static dyn CandidateStrategy; 3] {
    [&ContainerScoped, &WholePageClassMatch, &KeywordText]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{cascade, detect_jobs};

    #[test]
    fn test_container_scoped_limits_to_first_container() {
        let document = Html::parse_document(
            r#"
            <section id="open-positions">
              <div class="job-card"><h3>A</h3><a href="/a">A</a></div>
              <li class="position">B <a href="/b">B</a></li>
            </section>
            <div class="sidebar"><div class="job-card"><a href="/c">C</a></div></div>
            "#,
        );
        let found = ContainerScoped.find(&document);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|el| dom::has_ancestor_named(el, &["section"])));
    }

    #[test]
    fn test_container_without_items_falls_to_whole_page() {
        // The container matches by id but holds no job-classed items.
        let document = Html::parse_document(
            r#"
            <div id="jobs"><p>Loading...</p></div>
            <article class="opening"><a href="/x">X</a></article>
            "#,
        );
        assert!(ContainerScoped.find(&document).is_empty());

        let detection = detect_jobs(&document);
        assert_eq!(detection.strategy, Some("job class"));
        assert_eq!(detection.len(), 1);
    }

    #[test]
    fn test_keyword_text_requires_link() {
        let document = Html::parse_document(
            r#"
            <div><p>We are hiring! Apply now</p><a href="/apply">Apply</a></div>
            <li>Open position, no link</li>
            "#,
        );
        let found = KeywordText.find(&document);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value().name(), "div");
    }

    #[test]
    fn test_cascade_order() {
        let strategies = job_strategies();
        let names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["job container", "job class", "job text"]);

        let document = Html::parse_document("<p>Nothing to see</p>");
        assert!(cascade(&document, &strategies).is_empty());
    }
}
