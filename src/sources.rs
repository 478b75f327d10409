//! # Source Parsers
//!
//! One parser per target board, composing fetch, analysis, detection,
//! extraction, pagination and deduplication. Every board offers the same
//! two operations, `get_jobs` and `get_companies`; `SourceParser` is the
//! enum dispatching them to the concrete board.
//!
//! ## Boards
//!
//! - `GenericBoard`: Heuristic extraction for boards without known markup
//! - `RemotiveBoard`: Structured feed first, selector profile as fallback
//!
//! Within one parser everything runs sequentially: a page is fetched,
//! parsed and fully extracted before the next one is requested. Failed
//! fetches end the run early with whatever was collected so far.

mod generic;
mod homepage;
mod remotive;

pub use generic::{COMPANY_NAV_KEYWORDS, GenericBoard, JOB_NAV_KEYWORDS};
pub use homepage::{sweep_companies, sweep_jobs};
pub use remotive::{
    Category, DEFAULT_FEED_LIMIT, JobDetails, RemotiveBoard, RemotiveFeed, RemotiveJob,
};

use tracing::warn;

use crate::error::{Error, Result};
use crate::fetch::{CrawlerConfig, Fetcher, RawPage};
use crate::records::{CompanyRecord, ListingRecord, Source};

/// A board parser, dispatched by source
#[derive(Debug, Clone)]
pub enum SourceParser {
    Generic(GenericBoard),
    Remotive(RemotiveBoard),
}

impl SourceParser {
    /// Parser for `source`, at `base_url` or the board's default home page
    pub fn new(
        source: Source,
        base_url: Option<&str>,
        fetcher: Fetcher,
        config: &CrawlerConfig,
    ) -> Result<Self> {
        let base_url = base_url
            .or(source.default_base_url())
            .ok_or_else(|| Error::Config(format!("source '{}' needs a base URL", source)))?
            .trim_end_matches('/')
            .to_string();

        Ok(match source {
            Source::Remotive => Self::Remotive(RemotiveBoard::new(base_url, fetcher, config.max_pages)),
            _ => Self::Generic(GenericBoard::new(base_url, source, fetcher, config.max_pages)),
        })
    }

    pub fn source(&self) -> Source {
        match self {
            Self::Generic(board) => board.source(),
            Self::Remotive(_) => Source::Remotive,
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            Self::Generic(board) => board.base_url(),
            Self::Remotive(board) => board.base_url(),
        }
    }

    /// Every listing the board currently shows, deduplicated
    pub async fn get_jobs(&self) -> Vec<ListingRecord> {
        match self {
            Self::Generic(board) => board.get_jobs().await,
            Self::Remotive(board) => board.get_jobs().await,
        }
    }

    /// Listings matching every keyword, at most `limit`
    ///
    /// Remotive answers through its feed search; other boards are scraped
    /// in full and filtered on title, company and tags.
    pub async fn search_jobs(&self, keywords: &[String], limit: usize) -> Vec<ListingRecord> {
        match self {
            Self::Remotive(board) => board.search_jobs(keywords, limit).await,
            Self::Generic(board) => board
                .get_jobs()
                .await
                .into_iter()
                .filter(|job| job.matches_keywords(keywords))
                .take(limit)
                .collect(),
        }
    }

    /// Every company the board currently shows, deduplicated
    pub async fn get_companies(&self) -> Vec<CompanyRecord> {
        match self {
            Self::Generic(board) => board.get_companies().await,
            Self::Remotive(board) => board.get_companies().await,
        }
    }
}

/// Fetch `url`, logging and swallowing any failure
pub(crate) async fn fetch_page(fetcher: &Fetcher, url: &str) -> Option<RawPage> {
    match fetcher.fetch(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            warn!("Failed to fetch {}: {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CrawlerConfig {
        CrawlerConfig::builder().delay_ms(0).build()
    }

    #[test]
    fn test_dispatch_by_source() {
        let config = config();
        let fetcher = Fetcher::new(&config).unwrap();

        let parser = SourceParser::new(Source::Remotive, None, fetcher.clone(), &config).unwrap();
        assert!(matches!(parser, SourceParser::Remotive(_)));
        assert_eq!(parser.base_url(), "https://remotive.com");

        let parser = SourceParser::new(
            Source::JobsFromSpace,
            Some("https://www.jobsfromspace.com/"),
            fetcher,
            &config,
        )
        .unwrap();
        assert_eq!(parser.source(), Source::JobsFromSpace);
        assert_eq!(parser.base_url(), "https://www.jobsfromspace.com");
    }

    #[test]
    fn test_custom_source_needs_base_url() {
        let config = config();
        let fetcher = Fetcher::new(&config).unwrap();
        let err = SourceParser::new(Source::Custom, None, fetcher, &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
