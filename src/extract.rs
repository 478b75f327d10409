//! # Field Extraction Module
//!
//! Turns candidate nodes into records. Each field is inferred
//! independently with text and attribute heuristics; only the title and
//! the link are mandatory.
//!
//! Every candidate yields a `Result<_, SkipReason>`. Batch helpers log and
//! drop the skips, so one malformed node never stops the rest of a page.
//!
//! ## Key Components
//!
//! - `FieldExtractor`: Base URL, source tag and default-substitution rules
//! - `SkipReason`: Why a candidate produced no record
//! - `SelectorProfile` / `CompiledProfile`: Explicit selectors for boards with known markup

mod company;
mod listing;
mod profile;

pub use company::is_navigation_text;
pub use profile::{CompiledProfile, SelectorProfile};

use scraper::ElementRef;
use thiserror::Error;
use tracing::debug;

use crate::detect::Detection;
use crate::normalize::normalize;
use crate::records::{CompanyRecord, FieldDefaults, ListingRecord, Source};

/// Why a candidate node yielded no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The node holds no link to resolve
    #[error("no link found")]
    NoLink,

    /// No title text could be inferred
    #[error("empty title")]
    EmptyTitle,

    /// No company name could be inferred
    #[error("empty company name")]
    EmptyName,

    /// The inferred name is too short to be a company
    #[error("name {0:?} is too short")]
    NameTooShort(String),

    /// The inferred name is a navigation label
    #[error("{0:?} looks like navigation text")]
    NavigationText(String),

    /// A profile selector failed to parse
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector {
        /// Selector text
        selector: String,
        /// Parser message
        reason: String,
    },
}

/// Infers records from candidate nodes of one page
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    base_url: String,
    source: Source,
    defaults: FieldDefaults,
}

impl FieldExtractor {
    /// Extractor resolving links against `base_url` and tagging records with `source`
    pub fn new(base_url: impl Into<String>, source: Source) -> Self {
        Self {
            base_url: base_url.into(),
            source,
            defaults: FieldDefaults::default(),
        }
    }

    /// Replace the default-substitution rules
    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn defaults(&self) -> &FieldDefaults {
        &self.defaults
    }

    /// Absolute form of `href` against the extractor's base
    pub(crate) fn resolve(&self, href: &str) -> String {
        normalize(&self.base_url, href)
    }

    /// Listings for every candidate that yields one, in candidate order
    pub fn listings<'a>(
        &self,
        candidates: impl IntoIterator<Item = ElementRef<'a>>,
    ) -> Vec<ListingRecord> {
        keep_extracted(candidates.into_iter().map(|node| self.listing(&node)))
    }

    /// Companies for every candidate of a company detection, tagged with its strategy
    pub fn companies(&self, detection: &Detection<'_>) -> Vec<CompanyRecord> {
        let found_by = detection.strategy.unwrap_or("unknown");
        keep_extracted(
            detection
                .candidates
                .iter()
                .map(|node| self.company(node, found_by)),
        )
    }
}

/// Keep the extracted records, logging each skip
pub fn keep_extracted<T>(results: impl IntoIterator<Item = Result<T, SkipReason>>) -> Vec<T> {
    let mut skipped = 0usize;
    let records: Vec<T> = results
        .into_iter()
        .filter_map(|result| match result {
            Ok(record) => Some(record),
            Err(reason) => {
                skipped += 1;
                debug!("Skipping candidate: {}", reason);
                None
            }
        })
        .collect();

    if skipped > 0 {
        debug!("Extracted {} records, skipped {}", records.len(), skipped);
    }
    records
}
