//! # Multi-source runs
//!
//! Drives several source parsers at once. Each source stays sequential on
//! its own; up to `max_concurrent_sources` of them are in flight together,
//! and all of them share one `HostRateLimiter` so two sources pointing at
//! the same host still respect the politeness delay.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::fetch::{CrawlerConfig, Fetcher, HostRateLimiter};
use crate::records::{CompanyRecord, ListingRecord, Source};
use crate::sources::{DEFAULT_FEED_LIMIT, SourceParser};

/// A board to run, with an optional base URL override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub source: Source,
    pub base_url: Option<String>,
}

impl Target {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            base_url: None,
        }
    }

    pub fn at(source: Source, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: Some(base_url.into()),
        }
    }
}

/// Which records a run collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Harvest {
    #[default]
    Jobs,
    Companies,
    Both,
}

impl Harvest {
    fn jobs(self) -> bool {
        matches!(self, Harvest::Jobs | Harvest::Both)
    }

    fn companies(self) -> bool {
        matches!(self, Harvest::Companies | Harvest::Both)
    }
}

/// What one source produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceOutcome {
    pub source: Source,

    /// Base URL the parser ran against, `None` when it could not be built
    pub base_url: Option<String>,

    pub jobs: Vec<ListingRecord>,

    pub companies: Vec<CompanyRecord>,

    /// Why the source never ran
    pub error: Option<String>,
}

impl SourceOutcome {
    fn failed(source: Source, error: String) -> Self {
        Self {
            source,
            base_url: None,
            jobs: Vec::new(),
            companies: Vec::new(),
            error: Some(error),
        }
    }
}

/// Build one parser per target, all sharing `limiter`
pub fn build_parsers(
    targets: &[Target],
    config: &CrawlerConfig,
    limiter: &HostRateLimiter,
) -> Vec<(Source, Result<SourceParser>)> {
    targets
        .iter()
        .map(|target| {
            let parser = Fetcher::with_limiter(config, limiter.clone()).and_then(|fetcher| {
                SourceParser::new(target.source, target.base_url.as_deref(), fetcher, config)
            });
            (target.source, parser)
        })
        .collect()
}

/// Run every target, `config.max_concurrent_sources` at a time
///
/// `on_done` is called once per source as soon as it finishes; the
/// returned outcomes are in completion order. Keywords in the config turn
/// the job harvest into a keyword search.
#[instrument(skip_all, fields(sources = targets.len()))]
pub async fn run_sources(
    targets: &[Target],
    config: &CrawlerConfig,
    harvest: Harvest,
    mut on_done: impl FnMut(&SourceOutcome),
) -> Vec<SourceOutcome> {
    let limiter = HostRateLimiter::new(config.delay());
    let max_concurrent = config.max_concurrent_sources.max(1);

    let mut futures = FuturesUnordered::new();
    let mut outcomes = Vec::new();

    for (source, parser) in build_parsers(targets, config, &limiter) {
        let parser = match parser {
            Ok(parser) => parser,
            Err(e) => {
                error!("Cannot run source {}: {}", source, e);
                let outcome = SourceOutcome::failed(source, e.to_string());
                on_done(&outcome);
                outcomes.push(outcome);
                continue;
            }
        };

        futures.push(run_source(parser, &config.keywords, harvest));

        while futures.len() >= max_concurrent {
            if let Some(outcome) = futures.next().await {
                on_done(&outcome);
                outcomes.push(outcome);
            }
        }
    }

    while let Some(outcome) = futures.next().await {
        on_done(&outcome);
        outcomes.push(outcome);
    }

    info!(
        "Run finished: {} jobs and {} companies from {} sources",
        outcomes.iter().map(|o| o.jobs.len()).sum::<usize>(),
        outcomes.iter().map(|o| o.companies.len()).sum::<usize>(),
        outcomes.len()
    );
    outcomes
}

#[instrument(skip_all, fields(source = %parser.source(), base_url = parser.base_url()))]
async fn run_source(parser: SourceParser, keywords: &[String], harvest: Harvest) -> SourceOutcome {
    let jobs = match (harvest.jobs(), keywords.is_empty()) {
        (false, _) => Vec::new(),
        (true, true) => parser.get_jobs().await,
        (true, false) => parser.search_jobs(keywords, DEFAULT_FEED_LIMIT).await,
    };
    let companies = if harvest.companies() {
        parser.get_companies().await
    } else {
        Vec::new()
    };

    info!(
        "Source {} yielded {} jobs and {} companies",
        parser.source(),
        jobs.len(),
        companies.len()
    );
    SourceOutcome {
        source: parser.source(),
        base_url: Some(parser.base_url().to_string()),
        jobs,
        companies,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn board_page(title: &str) -> String {
        format!(
            r#"<div id="jobs"><div class="job-card"><h3>{title}</h3><a href="/jobs/{title}">Apply</a></div></div>"#
        )
    }

    fn config(max_concurrent: usize) -> CrawlerConfig {
        CrawlerConfig::builder()
            .delay_ms(0)
            .timeout_secs(5)
            .max_concurrent_sources(max_concurrent)
            .build()
    }

    #[tokio::test]
    async fn test_runs_every_source() {
        let mut first = Server::new_async().await;
        let mut second = Server::new_async().await;
        let _a = first
            .mock("GET", "/")
            .with_status(200)
            .with_body(board_page("Pilot"))
            .create_async()
            .await;
        let _b = second
            .mock("GET", "/")
            .with_status(200)
            .with_body(board_page("Navigator"))
            .create_async()
            .await;

        let targets = vec![
            Target::at(Source::Custom, first.url()),
            Target::at(Source::JobsFromSpace, second.url()),
        ];
        let mut seen = Vec::new();
        let outcomes = run_sources(&targets, &config(1), Harvest::Jobs, |outcome| {
            seen.push(outcome.source)
        })
        .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(seen.len(), 2);
        let mut titles: Vec<&str> = outcomes
            .iter()
            .flat_map(|outcome| outcome.jobs.iter().map(|job| job.title.as_str()))
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["Navigator", "Pilot"]);
        assert!(outcomes.iter().all(|outcome| outcome.error.is_none()));
        assert!(outcomes.iter().all(|outcome| outcome.companies.is_empty()));
    }

    #[tokio::test]
    async fn test_unbuildable_source_is_reported() {
        let mut server = Server::new_async().await;
        let _home = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(board_page("Pilot"))
            .create_async()
            .await;

        let targets = vec![
            Target::new(Source::Custom),
            Target::at(Source::Custom, server.url()),
        ];
        let outcomes = run_sources(&targets, &config(4), Harvest::Jobs, |_| {}).await;

        assert_eq!(outcomes.len(), 2);
        let failed = outcomes.iter().find(|o| o.error.is_some()).unwrap();
        assert_eq!(failed.base_url, None);
        assert!(failed.jobs.is_empty());
        let ran = outcomes.iter().find(|o| o.error.is_none()).unwrap();
        assert_eq!(ran.jobs.len(), 1);
    }

    #[tokio::test]
    async fn test_keywords_filter_jobs() {
        let mut server = Server::new_async().await;
        let _home = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(
                r#"<div id="jobs">
                     <div class="job-card"><h3>Rust Engineer</h3><a href="/jobs/1">Apply</a></div>
                     <div class="job-card"><h3>Go Engineer</h3><a href="/jobs/2">Apply</a></div>
                   </div>"#,
            )
            .create_async()
            .await;

        let config = CrawlerConfig::builder()
            .delay_ms(0)
            .keywords(vec!["rust".to_string()])
            .build();
        let targets = vec![Target::at(Source::Custom, server.url())];
        let outcomes = run_sources(&targets, &config, Harvest::Jobs, |_| {}).await;

        let titles: Vec<&str> = outcomes[0].jobs.iter().map(|job| job.title.as_str()).collect();
        assert_eq!(titles, vec!["Rust Engineer"]);
    }

    #[test]
    fn test_harvest_flags() {
        assert!(Harvest::Jobs.jobs() && !Harvest::Jobs.companies());
        assert!(!Harvest::Companies.jobs() && Harvest::Companies.companies());
        assert!(Harvest::Both.jobs() && Harvest::Both.companies());
    }
}
