//! Direct home page sweeps
//!
//! Broad, low-precision passes over a home page that ignore the candidate
//! cascade. Operators run them when analyzing a new board to see what the
//! markup offers before choosing selectors.

use chrono::Utc;
use scraper::{ElementRef, Html};
use std::ops::Deref;

use crate::dedupe::dedupe;
use crate::dom;
use crate::extract::{FieldExtractor, SkipReason, keep_extracted};
use crate::records::{CompanyRecord, ListingRecord};

const JOB_TAGS: &[&str] = &["div", "li", "article", "a"];
const JOB_KEYWORDS: &[&str] = &["job", "position", "opening", "apply", "hire", "remote"];

const MAX_NAME_CHARS: usize = 30;
const ALT_EXCLUDED: &[&str] = &["icon", "logo", "button", "banner"];

const SECTION_TAGS: &[&str] = &["section", "div"];
const SECTION_KEYWORDS: &[&str] = &["partner", "client", "company", "employer"];
const SECTION_ENTRY_TAGS: &[&str] = &["a", "h2", "h3", "h4", "h5", "strong"];
const SECTION_SKIP_WORDS: &[&str] = &["next", "prev", "back", "home", "contact"];

/// Every element mentioning jobs that is or holds a link, as a listing
///
/// The company is guessed from the first sibling whose text is short
/// enough to be a name; `is_remote` only looks at the title.
pub fn sweep_jobs(document: &Html, extractor: &FieldExtractor) -> Vec<ListingRecord> {
    let candidates: Vec<ElementRef> = dom::elements_named(document, JOB_TAGS)
        .into_iter()
        .filter(|element| dom::text_contains_any(&dom::text_of(element), JOB_KEYWORDS))
        .filter(|element| element.value().name() == "a" || dom::has_link(element))
        .collect();

    let jobs = keep_extracted(
        candidates
            .iter()
            .map(|candidate| swept_listing(candidate, extractor)),
    );
    dedupe(jobs)
}

fn swept_listing(node: &ElementRef, extractor: &FieldExtractor) -> Result<ListingRecord, SkipReason> {
    let (title, href) = if node.value().name() == "a" {
        (dom::trimmed_text(node), node.value().attr("href"))
    } else {
        let title = dom::descendants_named(node, dom::HEADING_TAGS)
            .next()
            .or_else(|| dom::descendants_named(node, &["a"]).next())
            .map(|element| dom::trimmed_text(&element))
            .unwrap_or_else(|| dom::first_line(&dom::text_of(node)));
        (title, dom::first_link_href(node))
    };

    let href = href.ok_or(SkipReason::NoLink)?;
    if title.is_empty() {
        return Err(SkipReason::EmptyTitle);
    }

    let company = sibling_company(node, &title).unwrap_or_else(|| extractor.defaults().company.clone());
    let is_remote = title.to_lowercase().contains("remote");

    Ok(ListingRecord {
        url: extractor.resolve(href),
        company,
        location: None,
        tags: Vec::new(),
        is_remote,
        source: extractor.source(),
        posted_date: Utc::now(),
        title,
    })
}

/// First sibling text between 2 and 29 characters that is not the title
fn sibling_company(node: &ElementRef, title: &str) -> Option<String> {
    let parent = node.parent().and_then(ElementRef::wrap)?;
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|sibling| sibling.deref().id() != node.deref().id())
        .map(|sibling| dom::trimmed_text(&sibling))
        .find(|text| {
            let len = text.chars().count();
            text != title && len > 1 && len < MAX_NAME_CHARS
        })
}

/// Company names from image alt texts and company-looking sections
///
/// Entries from images come first; the first occurrence of a name wins.
pub fn sweep_companies(document: &Html, extractor: &FieldExtractor) -> Vec<CompanyRecord> {
    let mut companies = Vec::new();

    for img in dom::elements_named(document, &["img"]) {
        let alt = img.value().attr("alt").unwrap_or_default().trim();
        let lowered = alt.to_lowercase();
        if alt.is_empty()
            || alt.chars().count() >= MAX_NAME_CHARS
            || ALT_EXCLUDED.iter().any(|word| lowered.contains(word))
        {
            continue;
        }

        companies.push(CompanyRecord {
            name: alt.to_string(),
            url: dom::enclosing_anchor(&img)
                .and_then(|anchor| anchor.value().attr("href"))
                .map(|href| extractor.resolve(href)),
            found_by: "image alt".to_string(),
            logo: img.value().attr("src").map(str::to_string),
            job_count: None,
        });
    }

    let sections = dom::elements_named(document, SECTION_TAGS)
        .into_iter()
        .filter(|section| dom::id_or_class_contains_any(section, SECTION_KEYWORDS));
    for section in sections {
        for entry in dom::descendants_named(&section, SECTION_ENTRY_TAGS) {
            let name = dom::trimmed_text(&entry);
            if name.is_empty() || is_skippable_section_entry(&name) {
                continue;
            }

            let url = match entry.value().name() {
                "a" => entry.value().attr("href").map(|href| extractor.resolve(href)),
                _ => None,
            };
            companies.push(CompanyRecord {
                name,
                url,
                found_by: "directory section".to_string(),
                logo: None,
                job_count: None,
            });
        }
    }

    dedupe(companies)
}

/// Navigation labels and single short words
fn is_skippable_section_entry(name: &str) -> bool {
    let lowered = name.to_lowercase();
    SECTION_SKIP_WORDS.iter().any(|word| lowered.contains(word))
        || (name.split_whitespace().count() < 2 && name.chars().count() < 5)
}
