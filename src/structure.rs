//! # Site Structure Analysis Module
//!
//! A best-effort diagnostic scan of one fetched page: script-embedded API
//! URLs and data blobs, every link, navigation links, job-looking links
//! and containers that look like job sections. Source parsers use the
//! navigation links to find a jobs or companies sub-page; everything else
//! is kept for operators inspecting a new board.
//!
//! ## Failure policy
//!
//! Analysis never fails from the caller's point of view. Any internal
//! error is logged and an empty `SiteStructure` is returned instead.

mod links;
mod patterns;

pub use links::LinkMap;
pub use patterns::{find_api_urls, find_global_assignments};

use scraper::{Html, Selector};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::dom;
use crate::fetch::RawPage;
use crate::normalize::{normalize, path_lowercase};

/// Substrings of a link path that suggest a job posting
pub const JOB_LINK_KEYWORDS: &[&str] = &["job", "position", "career", "opening"];

/// Substrings of an id, class or text that suggest a job section
pub const JOB_SECTION_KEYWORDS: &[&str] = &["job", "career", "position", "opening", "listing"];

/// Length of the text sample kept per job section
pub const TEXT_SAMPLE_LEN: usize = 100;

const LINK_CONTAINERS: &[&str] = &["div", "section", "article", "main"];
const NAV_CONTAINERS: &[&str] = &["nav", "header"];
const SECTION_TAGS: &[&str] = &["section", "div", "article"];

/// A container that looks like it holds job listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSection {
    /// `id` attribute, empty when absent
    pub identifier: String,

    /// Space-joined class list
    pub class_names: String,

    /// Whether the container holds any anchor
    pub has_links: bool,

    /// Leading text, for diagnostics only
    pub text_sample: String,
}

/// Structural summary of one page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteStructure {
    /// URL-like strings containing "api" found in inline scripts
    pub api_endpoint_candidates: Vec<String>,

    /// Raw object literals assigned to `window.*` globals
    pub embedded_data_blobs: Vec<String>,

    /// Every link, by visible text
    pub all_links: LinkMap,

    /// Links inside `<nav>` and `<header>`, by visible text
    pub navigation_links: LinkMap,

    /// Absolute URLs whose path suggests a job posting
    pub job_link_candidates: Vec<String>,

    /// Containers whose id, class or text suggests job content
    pub job_section_candidates: Vec<JobSection>,

    /// `<title>` text
    pub page_title: Option<String>,

    /// `<meta name="description">` content
    pub meta_description: Option<String>,
}

impl SiteStructure {
    /// First navigation link whose text contains one of `keywords`
    pub fn navigation_target(&self, keywords: &[&str]) -> Option<&str> {
        self.navigation_links.find_by_text(keywords)
    }
}

/// Internal analysis failure, always converted into an empty structure
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// A built-in selector failed to parse
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector {
        /// Selector text
        selector: &'static str,
        /// Parser message
        reason: String,
    },
}

fn selector(css: &'static str) -> Result<Selector, AnalyzeError> {
    Selector::parse(css).map_err(|e| AnalyzeError::Selector {
        selector: css,
        reason: e.to_string(),
    })
}

/// Analyze a fetched page, resolving links against the page URL
#[instrument(skip(page), fields(url = %page.url))]
pub fn analyze(page: &RawPage) -> SiteStructure {
    match try_analyze(&page.url, &page.body) {
        Ok(structure) => {
            info!(
                "Analyzed {}: {} links, {} nav links, {} job links, {} job sections",
                page.url,
                structure.all_links.len(),
                structure.navigation_links.len(),
                structure.job_link_candidates.len(),
                structure.job_section_candidates.len()
            );
            structure
        }
        Err(e) => {
            error!("Error analyzing site {}: {}", page.url, e);
            SiteStructure::default()
        }
    }
}

/// Analyze `markup`, resolving links against `base`
pub fn try_analyze(base: &str, markup: &str) -> Result<SiteStructure, AnalyzeError> {
    let document = Html::parse_document(markup);
    let mut structure = SiteStructure::default();

    for script in document.select(&selector("script")?) {
        let source = dom::text_of(&script);
        if source.trim().is_empty() {
            continue;
        }
        structure.api_endpoint_candidates.extend(find_api_urls(&source));
        structure.embedded_data_blobs.extend(find_global_assignments(&source));
    }

    for anchor in document.select(&selector("a[href]")?) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = normalize(base, href);

        let text = dom::trimmed_text(&anchor);
        if !text.is_empty() {
            if dom::has_ancestor_named(&anchor, NAV_CONTAINERS) {
                structure.navigation_links.insert(text.clone(), url.clone());
            }
            structure.all_links.insert(text, url.clone());
        }

        if dom::has_ancestor_named(&anchor, LINK_CONTAINERS)
            && dom::text_contains_any(&path_lowercase(&url), JOB_LINK_KEYWORDS)
        {
            structure.job_link_candidates.push(url);
        }
    }

    for section in dom::elements_named(&document, SECTION_TAGS) {
        let text = dom::text_of(&section);
        if !dom::id_or_class_contains_any(&section, JOB_SECTION_KEYWORDS)
            && !dom::text_contains_any(&text, JOB_SECTION_KEYWORDS)
        {
            continue;
        }

        structure.job_section_candidates.push(JobSection {
            identifier: section.value().id().unwrap_or_default().to_string(),
            class_names: dom::class_string(&section),
            has_links: dom::has_link(&section),
            text_sample: dom::truncate_chars(&text, TEXT_SAMPLE_LEN).trim().to_string(),
        });
    }

    structure.page_title = document
        .select(&selector("title")?)
        .next()
        .map(|title| dom::trimmed_text(&title))
        .filter(|title| !title.is_empty());

    structure.meta_description = document
        .select(&selector("meta[name='description']")?)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string);

    debug!(
        "Scripts yielded {} API candidates and {} data blobs",
        structure.api_endpoint_candidates.len(),
        structure.embedded_data_blobs.len()
    );

    Ok(structure)
}
