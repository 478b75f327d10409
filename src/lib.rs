//! # jobsift - Job Board Extraction
//!
//! This crate turns the uncontrolled HTML of job boards into structured
//! listing and company records. Markup is never trusted: candidates are
//! found through ordered heuristic cascades, fields are inferred with
//! fallbacks, and every failure is contained at the smallest unit (one
//! request, one candidate, one page) and logged instead of propagated.
//!
//! ## Features
//!
//! - URL normalization against a board's origin
//! - Configured HTTP sessions with a per-host politeness limiter
//! - Site structure analysis (navigation, embedded data, API hints)
//! - Short-circuiting candidate cascades for jobs and companies
//! - Field extraction with explicit skip reasons per candidate
//! - Order-preserving deduplication
//! - Probing of conventional JSON endpoints
//! - Source parsers with heuristic pagination, run concurrently across sources
//! - Diagnostic artifacts for offline inspection
//!
//! ## Example
//!
//! ```rust,no_run
//! use jobsift::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = CrawlerConfig::from_env();
//!     let fetcher = Fetcher::new(&config)?;
//!     let parser = SourceParser::new(Source::Remotive, None, fetcher, &config)?;
//!
//!     for job in parser.get_jobs().await {
//!         println!("{} at {} ({})", job.title, job.company, job.url);
//!     }
//!     Ok(())
//! }
//! ```

mod dom;
mod error;

pub mod artifacts;
pub mod dedupe;
pub mod detect;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod probe;
pub mod records;
pub mod runner;
pub mod sources;
pub mod structure;

pub use error::{Error, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::fetch::{CrawlerConfig, FetchError, Fetcher, RawPage};
    pub use crate::records::{CompanyRecord, ListingRecord, Source};
    pub use crate::runner::{Harvest, SourceOutcome, Target, run_sources};
    pub use crate::sources::SourceParser;
}
