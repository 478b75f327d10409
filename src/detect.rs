//! # Candidate Detection Module
//!
//! Finds the DOM nodes that most likely hold one job posting or one
//! company entry each. Detection runs an ordered cascade of strategies,
//! from the most specific to the most permissive, and stops at the first
//! strategy that yields anything.
//!
//! ## Key Components
//!
//! - `CandidateStrategy`: One heuristic, `&Html -> Vec<ElementRef>`
//! - `cascade`: Short-circuiting runner over a strategy list
//! - `detect_jobs` / `detect_companies`: The built-in cascades
//! - `find_next_page`: The "next page" control used for pagination
//!
//! Candidates keep document order; there is no ranking beyond the tier
//! that produced them.

mod companies;
mod jobs;
mod pagination;

pub use companies::{CompanyClassMatch, CompanySectionScoped, LogoImages, company_strategies};
pub use jobs::{ContainerScoped, KeywordText, WholePageClassMatch, job_strategies};
pub use pagination::{NextControl, find_next_control, find_next_page};

use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::ops::Deref;
use tracing::{debug, warn};

/// One candidate-finding heuristic
pub trait CandidateStrategy {
    /// Short label, also used to tag records found through this strategy
    fn name(&self) -> &'static str;

    /// Candidate nodes in document order
    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;
}

/// Outcome of a cascade run
#[derive(Debug, Clone)]
pub struct Detection<'a> {
    /// Strategy that produced the candidates, `None` when every tier came up empty
    pub strategy: Option<&'static str>,

    /// Candidate nodes in document order
    pub candidates: Vec<ElementRef<'a>>,
}

impl Detection<'_> {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Run `strategies` in order, returning the first non-empty result
pub fn cascade<'a>(document: &'a Html, strategies: &[&dyn CandidateStrategy]) -> Detection<'a> {
    for strategy in strategies {
        let candidates = strategy.find(document);
        if !candidates.is_empty() {
            debug!(
                "Strategy '{}' found {} candidates",
                strategy.name(),
                candidates.len()
            );
            return Detection {
                strategy: Some(strategy.name()),
                candidates,
            };
        }
        debug!("Strategy '{}' found nothing", strategy.name());
    }

    Detection {
        strategy: None,
        candidates: Vec::new(),
    }
}

/// Job candidates through the built-in job cascade
pub fn detect_jobs(document: &Html) -> Detection<'_> {
    let detection = cascade(document, &job_strategies());
    if detection.is_empty() {
        warn!("No job candidates found under any strategy");
    }
    detection
}

/// Company candidates through the built-in company cascade
pub fn detect_companies(document: &Html) -> Detection<'_> {
    let detection = cascade(document, &company_strategies());
    if detection.is_empty() {
        warn!("No company candidates found under any strategy");
    }
    detection
}

/// Drop repeated nodes while keeping the first position of each
pub(crate) fn unique_nodes<'a>(nodes: impl IntoIterator<Item = ElementRef<'a>>) -> Vec<ElementRef<'a>> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.deref().id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;
    use std::cell::Cell;

    struct Counting<'s> {
        name: &'static str,
        css: &'static str,
        calls: &'s Cell<usize>,
    }

    impl CandidateStrategy for Counting<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
            self.calls.set(self.calls.get() + 1);
            let selector = Selector::parse(self.css).unwrap();
            document.select(&selector).collect()
        }
    }

    #[test]
    fn test_cascade_short_circuits() {
        let document = Html::parse_document(r#"<div class="hit">a</div><div class="hit">b</div>"#);
        let (first, second, third) = (Cell::new(0), Cell::new(0), Cell::new(0));
        let strategies = [
            Counting { name: "first", css: ".hit", calls: &first },
            Counting { name: "second", css: "div", calls: &second },
            Counting { name: "third", css: "*", calls: &third },
        ];
        let dyns: Vec<&dyn CandidateStrategy> =
            strategies.iter().map(|s| s as &dyn CandidateStrategy).collect();

        let detection = cascade(&document, &dyns);

        assert_eq!(detection.strategy, Some("first"));
        assert_eq!(detection.len(), 2);
        assert_eq!((first.get(), second.get(), third.get()), (1, 0, 0));
    }

    #[test]
    fn test_cascade_falls_through_empty_tiers() {
        let document = Html::parse_document(r#"<li>a</li>"#);
        let (first, second, third) = (Cell::new(0), Cell::new(0), Cell::new(0));
        let strategies = [
            Counting { name: "first", css: ".missing", calls: &first },
            Counting { name: "second", css: "li", calls: &second },
            Counting { name: "third", css: "*", calls: &third },
        ];
        let dyns: Vec<&dyn CandidateStrategy> =
            strategies.iter().map(|s| s as &dyn CandidateStrategy).collect();

        let detection = cascade(&document, &dyns);

        assert_eq!(detection.strategy, Some("second"));
        assert_eq!((first.get(), second.get(), third.get()), (1, 1, 0));
    }

    #[test]
    fn test_cascade_all_empty() {
        let document = Html::parse_document("<p>nothing</p>");
        let calls = Cell::new(0);
        let strategy = Counting { name: "only", css: ".missing", calls: &calls };
        let detection = cascade(&document, &[&strategy]);
        assert!(detection.is_empty());
        assert_eq!(detection.strategy, None);
    }
}
