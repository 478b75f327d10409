//! Company entry strategies, most specific first

use scraper::{ElementRef, Html};

use super::{CandidateStrategy, unique_nodes};
use crate::dom;

const CLASS_KEYWORDS: &[&str] = &["company", "employer", "client"];

const SECTION_TAGS: &[&str] = &["section", "div"];
const SECTION_KEYWORDS: &[&str] = &["company", "companies", "client", "employer"];
const ENTRY_TAGS: &[&str] = &["div", "li", "article"];

const LOGO_KEYWORDS: &[&str] = &["logo", "company", "client"];

/// Elements whose class names a company
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyClassMatch;

impl CandidateStrategy for CompanyClassMatch {
    fn name(&self) -> &'static str {
        "class match"
    }

    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| dom::class_contains_any(element, CLASS_KEYWORDS))
            .collect()
    }
}

/// Entries inside sections that look like company directories
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanySectionScoped;

impl CandidateStrategy for CompanySectionScoped {
    fn name(&self) -> &'static str {
        "directory section"
    }

    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        // Nested matching sections would otherwise yield the same entry twice.
        unique_nodes(
            dom::elements_named(document, SECTION_TAGS)
                .into_iter()
                .filter(|section| dom::id_or_class_contains_any(section, SECTION_KEYWORDS))
                .flat_map(|section| dom::descendants_named(&section, ENTRY_TAGS).collect::<Vec<_>>()),
        )
    }
}

/// Images whose class suggests a company logo
#[derive(Debug, Clone, Copy, Default)]
pub struct LogoImages;

impl CandidateStrategy for LogoImages {
    fn name(&self) -> &'static str {
        "logo image"
    }

    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        dom::elements_named(document, &["img"])
            .into_iter()
            .filter(|img| dom::class_contains_any(img, LOGO_KEYWORDS))
            .collect()
    }
}

/// Built-in company cascade
pub fn company_strategies() -> [&'static dyn CandidateStrategy; 3] {
    [&CompanyClassMatch, &CompanySectionScoped, &LogoImages]
}
