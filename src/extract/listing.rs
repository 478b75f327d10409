//! Heuristic listing extraction

use chrono::Utc;
use scraper::ElementRef;

use super::{FieldExtractor, SkipReason};
use crate::dom;
use crate::records::ListingRecord;

const VALUE_TAGS: &[&str] = &["span", "div", "p"];

const COMPANY_LABELS: &[&str] = &["company", "employer"];
const LOCATION_LABELS: &[&str] = &["location", "remote", "onsite"];
const LOCATION_CLASSES: &[&str] = &["location", "remote"];

const TAG_CONTAINERS: &[&str] = &["div", "ul"];
const TAG_CONTAINER_KEYWORDS: &[&str] = &["tag", "skill"];
const TAG_ITEMS: &[&str] = &["span", "li", "a"];

impl FieldExtractor {
    /// Infer one listing from a candidate node
    ///
    /// Rejects nodes without a link or without any title text. Company and
    /// location fall back to the extractor's defaults.
    pub fn listing(&self, node: &ElementRef) -> Result<ListingRecord, SkipReason> {
        let title = title_of(node);
        if title.is_empty() {
            return Err(SkipReason::EmptyTitle);
        }

        let href = dom::first_link_href(node).ok_or(SkipReason::NoLink)?;
        let url = self.resolve(href);

        let company = labelled_value(node, COMPANY_LABELS, COMPANY_LABELS)
            .unwrap_or_else(|| self.defaults.company.clone());
        let location = labelled_value(node, LOCATION_LABELS, LOCATION_CLASSES)
            .or_else(|| self.defaults.location.clone());
        let tags = tags_of(node);

        let is_remote = self.defaults.remote_only
            || ListingRecord::mentions_remote(&title, location.as_deref(), &tags);

        Ok(ListingRecord {
            title,
            company,
            url,
            location,
            tags,
            is_remote,
            source: self.source,
            posted_date: Utc::now(),
        })
    }
}

/// First heading, else a title-classed anchor, else the first text line
pub(crate) fn title_of(node: &ElementRef) -> String {
    let heading = dom::descendants_named(node, dom::HEADING_TAGS).next().or_else(|| {
        dom::descendants_named(node, &["a"]).find(|a| dom::class_contains_any(a, &["title"]))
    });

    match heading {
        Some(element) => dom::trimmed_text(&element),
        None => dom::first_line(&dom::text_of(node)),
    }
}

/// Two-stage lookup of a labelled value inside `node`
///
/// First finds a text node mentioning one of `labels` and takes the text
/// of the next span/div/p after its parent, staying inside `node`. When
/// that yields nothing, takes the first span/div/p whose class contains
/// one of `classes`.
fn labelled_value(node: &ElementRef, labels: &[&str], classes: &[&str]) -> Option<String> {
    let after_label = dom::find_text_node(node, |text| dom::text_contains_any(text, labels))
        .and_then(|(parent, _)| {
            dom::following_within(node, &parent).find(|element| dom::is_named(element, VALUE_TAGS))
        })
        .map(|element| dom::trimmed_text(&element))
        .filter(|text| !text.is_empty());

    after_label.or_else(|| {
        dom::descendant_elements(node)
            .filter(|element| dom::is_named(element, VALUE_TAGS))
            .find(|element| dom::class_contains_any(element, classes))
            .map(|element| dom::trimmed_text(&element))
            .filter(|text| !text.is_empty())
    })
}

fn tags_of(node: &ElementRef) -> Vec<String> {
    let Some(container) = dom::descendants_named(node, TAG_CONTAINERS)
        .find(|element| dom::class_contains_any(element, TAG_CONTAINER_KEYWORDS))
    else {
        return Vec::new();
    };

    dom::descendants_named(&container, TAG_ITEMS)
        .map(|tag| dom::trimmed_text(&tag))
        .filter(|tag| !tag.is_empty())
        .collect()
}
