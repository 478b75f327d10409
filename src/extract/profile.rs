//! Explicit selector profiles for boards with known markup

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use super::{FieldExtractor, SkipReason};
use crate::detect::CandidateStrategy;
use crate::dom;
use crate::records::ListingRecord;

/// CSS selectors describing one board's listing markup
///
/// `items` locates candidate nodes in the page; every other selector is
/// applied inside one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorProfile {
    /// One match per listing
    pub items: String,

    /// Title text
    pub title: String,

    /// Anchor carrying the listing URL
    pub link: String,

    /// Company name text
    #[serde(default)]
    pub company: Option<String>,

    /// Location text
    #[serde(default)]
    pub location: Option<String>,

    /// Every match is one tag
    #[serde(default)]
    pub tags: Option<String>,
}

impl SelectorProfile {
    /// Markup of remotive.com listing pages
    pub fn remotive() -> Self {
        Self {
            items: ".job-list .job-display".to_string(),
            title: ".position".to_string(),
            link: "a.job-display-header".to_string(),
            company: Some(".company".to_string()),
            location: Some(".location".to_string()),
            tags: Some(".job-tag".to_string()),
        }
    }

    /// Parse every selector, failing on the first invalid one
    pub fn compile(&self) -> Result<CompiledProfile, SkipReason> {
        Ok(CompiledProfile {
            items: parse(&self.items)?,
            title: parse(&self.title)?,
            link: parse(&self.link)?,
            company: self.company.as_deref().map(parse).transpose()?,
            location: self.location.as_deref().map(parse).transpose()?,
            tags: self.tags.as_deref().map(parse).transpose()?,
        })
    }
}

fn parse(css: &str) -> Result<Selector, SkipReason> {
    Selector::parse(css).map_err(|e| SkipReason::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// A `SelectorProfile` with parsed selectors
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    items: Selector,
    title: Selector,
    link: Selector,
    company: Option<Selector>,
    location: Option<Selector>,
    tags: Option<Selector>,
}

impl CompiledProfile {
    fn text_in(node: &ElementRef, selector: &Selector) -> Option<String> {
        node.select(selector)
            .next()
            .map(|element| dom::trimmed_text(&element))
            .filter(|text| !text.is_empty())
    }
}

impl CandidateStrategy for CompiledProfile {
    fn name(&self) -> &'static str {
        "selector profile"
    }

    fn find<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.items).collect()
    }
}

impl FieldExtractor {
    /// Infer one listing using explicit selectors instead of heuristics
    pub fn profiled_listing(
        &self,
        profile: &CompiledProfile,
        node: &ElementRef,
    ) -> Result<ListingRecord, SkipReason> {
        let title = CompiledProfile::text_in(node, &profile.title).ok_or(SkipReason::EmptyTitle)?;
        let href = node
            .select(&profile.link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or(SkipReason::NoLink)?;

        let company = profile
            .company
            .as_ref()
            .and_then(|selector| CompiledProfile::text_in(node, selector))
            .unwrap_or_else(|| self.defaults.company.clone());
        let location = profile
            .location
            .as_ref()
            .and_then(|selector| CompiledProfile::text_in(node, selector))
            .or_else(|| self.defaults.location.clone());
        let tags: Vec<String> = profile
            .tags
            .as_ref()
            .map(|selector| {
                node.select(selector)
                    .map(|tag| dom::trimmed_text(&tag))
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let is_remote = self.defaults.remote_only
            || ListingRecord::mentions_remote(&title, location.as_deref(), &tags);

        Ok(ListingRecord {
            title,
            company,
            url: self.resolve(href),
            location,
            tags,
            is_remote,
            source: self.source,
            posted_date: Utc::now(),
        })
    }

    /// Listings for every item the profile matches in `document`
    pub fn profiled_listings(&self, profile: &CompiledProfile, document: &Html) -> Vec<ListingRecord> {
        super::keep_extracted(
            profile
                .find(document)
                .iter()
                .map(|node| self.profiled_listing(profile, node)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{FieldDefaults, Source, UNKNOWN_COMPANY};

    const PAGE: &str = r#"
        <ul class="job-list">
          <li class="job-display">
            <a class="job-display-header" href="/remote-jobs/software-dev/rust-engineer-1">
              <span class="position">Rust Engineer</span>
            </a>
            <span class="company">Ferrous</span>
            <span class="job-tag">rust</span><span class="job-tag">tokio</span>
          </li>
          <li class="job-display">
            <span class="position">Missing Link</span>
          </li>
          <li class="job-display">
            <a class="job-display-header" href="https://remotive.com/remote-jobs/design/ux-2">
              <span class="position">UX Designer</span>
            </a>
            <span class="location">Europe only</span>
          </li>
        </ul>
    "#;

    #[test]
    fn test_remotive_profile() {
        let profile = SelectorProfile::remotive().compile().unwrap();
        let extractor = FieldExtractor::new("https://remotive.com", Source::Remotive)
            .with_defaults(FieldDefaults::remote_board());
        let document = Html::parse_document(PAGE);

        let jobs = extractor.profiled_listings(&profile, &document);

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Rust Engineer");
        assert_eq!(
            jobs[0].url,
            "https://remotive.com/remote-jobs/software-dev/rust-engineer-1"
        );
        assert_eq!(jobs[0].company, "Ferrous");
        assert_eq!(jobs[0].location.as_deref(), Some("Remote"));
        assert_eq!(jobs[0].tags, vec!["rust", "tokio"]);
        assert!(jobs[0].is_remote);

        assert_eq!(jobs[1].company, UNKNOWN_COMPANY);
        assert_eq!(jobs[1].location.as_deref(), Some("Europe only"));
        assert!(jobs[1].is_remote);
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let mut profile = SelectorProfile::remotive();
        profile.company = Some("span[".to_string());
        match profile.compile() {
            Err(SkipReason::InvalidSelector { selector, .. }) => assert_eq!(selector, "span["),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_profile_deserializes_with_optional_fields() {
        let profile: SelectorProfile = serde_json::from_str(
            r#"{"items": ".row", "title": "h2", "link": "a"}"#,
        )
        .unwrap();
        assert_eq!(profile.company, None);
        assert!(profile.compile().is_ok());
    }
}
