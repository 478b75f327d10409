//! Heuristic board parser for sites without known markup

use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use super::{fetch_page, homepage};
use crate::artifacts::{AnalysisReport, ArtifactStore};
use crate::dedupe::dedupe;
use crate::detect::{detect_companies, detect_jobs, find_next_page};
use crate::error::Result;
use crate::extract::FieldExtractor;
use crate::fetch::{Fetcher, RawPage};
use crate::probe::{ProbeResult, probe_endpoints};
use crate::records::{CompanyRecord, ListingRecord, Source};
use crate::structure::{self, SiteStructure};

/// Navigation link texts that lead to a jobs page
pub const JOB_NAV_KEYWORDS: &[&str] = &["job", "career", "position"];

/// Navigation link texts that lead to a company directory
pub const COMPANY_NAV_KEYWORDS: &[&str] = &["company", "companies", "employer"];

/// A board parsed purely through structure heuristics
#[derive(Debug, Clone)]
pub struct GenericBoard {
    base_url: String,
    source: Source,
    fetcher: Fetcher,
    max_pages: u32,
}

impl GenericBoard {
    pub fn new(base_url: impl Into<String>, source: Source, fetcher: Fetcher, max_pages: u32) -> Self {
        Self {
            base_url: base_url.into(),
            source,
            fetcher,
            max_pages,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn source(&self) -> Source {
        self.source
    }

    fn extractor(&self) -> FieldExtractor {
        FieldExtractor::new(self.base_url.clone(), self.source)
            .with_defaults(self.source.field_defaults())
    }

    /// Structural summary of the home page, empty when it cannot be fetched
    pub async fn analyze(&self) -> SiteStructure {
        match fetch_page(&self.fetcher, &self.base_url).await {
            Some(page) => structure::analyze(&page),
            None => SiteStructure::default(),
        }
    }

    /// Jobs from the board's jobs page, following "next" controls
    ///
    /// Starts from the navigation link that looks like a jobs page, or
    /// from the home page when there is none. Stops after `max_pages`
    /// pages, on a missing or disabled "next" control, on a page already
    /// visited, or on a failed fetch.
    #[instrument(skip(self), fields(source = %self.source, base = %self.base_url))]
    pub async fn get_jobs(&self) -> Vec<ListingRecord> {
        let Some(home) = fetch_page(&self.fetcher, &self.base_url).await else {
            return Vec::new();
        };
        let (mut url, mut prefetched) = self.start_page(home, JOB_NAV_KEYWORDS);

        let extractor = self.extractor();
        let mut visited = HashSet::new();
        let mut jobs = Vec::new();

        for page_number in 1..=self.max_pages.max(1) {
            if !visited.insert(url.clone()) {
                debug!("Pagination returned to {}, stopping", url);
                break;
            }

            let page = match prefetched.take() {
                Some(page) => page,
                None => match fetch_page(&self.fetcher, &url).await {
                    Some(page) => page,
                    None => break,
                },
            };

            let (found, next) = jobs_on_page(&page, &extractor);
            info!("Page {} ({}) yielded {} jobs", page_number, url, found.len());
            jobs.extend(found);

            match next {
                Some(next) => url = next,
                None => {
                    debug!("No enabled next-page control on {}", url);
                    break;
                }
            }
        }

        let jobs = dedupe(jobs);
        info!("Successfully parsed {} jobs from {}", jobs.len(), self.base_url);
        jobs
    }

    /// Companies from the board's company directory, or the home page
    #[instrument(skip(self), fields(source = %self.source, base = %self.base_url))]
    pub async fn get_companies(&self) -> Vec<CompanyRecord> {
        let Some(home) = fetch_page(&self.fetcher, &self.base_url).await else {
            return Vec::new();
        };
        let (url, prefetched) = self.start_page(home, COMPANY_NAV_KEYWORDS);

        let page = match prefetched {
            Some(page) => page,
            None => match fetch_page(&self.fetcher, &url).await {
                Some(page) => page,
                None => return Vec::new(),
            },
        };

        let companies = {
            let document = Html::parse_document(&page.body);
            self.extractor().companies(&detect_companies(&document))
        };
        let companies = dedupe(companies);
        info!("Found {} companies on {}", companies.len(), url);
        companies
    }

    /// Jobs swept directly from the home page markup
    #[instrument(skip(self), fields(base = %self.base_url))]
    pub async fn sweep_homepage_jobs(&self) -> Vec<ListingRecord> {
        let Some(page) = fetch_page(&self.fetcher, &self.base_url).await else {
            return Vec::new();
        };
        let document = Html::parse_document(&page.body);
        homepage::sweep_jobs(&document, &self.extractor())
    }

    /// Companies swept directly from the home page markup
    #[instrument(skip(self), fields(base = %self.base_url))]
    pub async fn sweep_homepage_companies(&self) -> Vec<CompanyRecord> {
        let Some(page) = fetch_page(&self.fetcher, &self.base_url).await else {
            return Vec::new();
        };
        let document = Html::parse_document(&page.body);
        homepage::sweep_companies(&document, &self.extractor())
    }

    /// Home page markup, for diagnostics
    pub async fn raw_html(&self) -> Option<String> {
        fetch_page(&self.fetcher, &self.base_url)
            .await
            .map(|page| page.body)
    }

    /// Conventional API endpoints that answer on this board
    pub async fn probe(&self) -> Vec<ProbeResult> {
        probe_endpoints(&self.fetcher, &self.base_url).await
    }

    /// Analyze the home page and persist every diagnostic artifact
    ///
    /// The home page is fetched once; structure and both sweeps come from
    /// that single response. Empty sweeps are reported but not written.
    #[instrument(skip(self, store), fields(base = %self.base_url))]
    pub async fn write_analysis(&self, store: &ArtifactStore) -> Result<AnalysisReport> {
        let home = self.fetcher.fetch(&self.base_url).await?;

        let (structure, jobs, companies) = {
            let extractor = self.extractor();
            let document = Html::parse_document(&home.body);
            (
                structure::analyze(&home),
                homepage::sweep_jobs(&document, &extractor),
                homepage::sweep_companies(&document, &extractor),
            )
        };
        info!(
            "Title: {:?}, {} links, {} navigation links, {} job links",
            structure.page_title,
            structure.all_links.len(),
            structure.navigation_links.len(),
            structure.job_link_candidates.len()
        );

        store.store_structure(&structure).await?;
        store.store_raw_html(&home.body).await?;

        if jobs.is_empty() {
            warn!("No jobs found on the home page");
        } else {
            store.store_jobs(&jobs).await?;
        }
        if companies.is_empty() {
            warn!("No companies found on the home page");
        } else {
            store.store_companies(&companies).await?;
        }

        let probes = self.probe().await;
        store.store_probes(&probes).await?;

        let report = AnalysisReport::new(self.base_url.as_str(), &structure, &jobs, &companies);
        store.store_report(&report).await?;
        info!(
            "Analysis of {} found {} jobs, {} companies and {} answering endpoints",
            self.base_url,
            jobs.len(),
            companies.len(),
            probes.len()
        );
        Ok(report)
    }

    /// First page to extract from, reusing `home` when no navigation link applies
    fn start_page(&self, home: RawPage, keywords: &[&str]) -> (String, Option<RawPage>) {
        let structure = structure::analyze(&home);
        match structure.navigation_target(keywords) {
            Some(target) if target != home.url && target != self.base_url => {
                info!("Following navigation link to {}", target);
                (target.to_string(), None)
            }
            _ => (home.url.clone(), Some(home)),
        }
    }
}

/// Listings on one page plus the next page to visit
fn jobs_on_page(page: &RawPage, extractor: &FieldExtractor) -> (Vec<ListingRecord>, Option<String>) {
    let document = Html::parse_document(&page.body);
    let detection = detect_jobs(&document);
    debug!(
        "Detected {} job candidates on {} via {:?}",
        detection.len(),
        page.url,
        detection.strategy
    );
    let jobs = extractor.listings(detection.candidates);
    let next = find_next_page(&document, &page.url);
    (jobs, next)
}
