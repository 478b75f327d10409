//! remotive.com: a public JSON feed with listing pages as fallback

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};
use url::Url;

use super::fetch_page;
use crate::dedupe::{dedupe, dedupe_by};
use crate::dom;
use crate::extract::{CompiledProfile, FieldExtractor, SelectorProfile};
use crate::fetch::{FetchError, Fetcher};
use crate::normalize::normalize;
use crate::records::{CompanyRecord, ListingRecord, REMOTE_LOCATION, Source, UNKNOWN_COMPANY};

/// Jobs taken from the feed when no explicit limit is set
pub const DEFAULT_FEED_LIMIT: usize = 50;

const COMPANY_FEED_LIMIT: usize = 300;
const SEARCH_FALLBACK_LIMIT: usize = 1000;
const CATEGORY_PREFIX: &str = "/remote-jobs/";

/// Feed response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemotiveFeed {
    #[serde(default)]
    pub jobs: Vec<RemotiveJob>,
}

/// One job in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotiveJob {
    pub id: Option<u64>,
    pub url: String,
    pub title: String,
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    pub company_logo: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub job_type: Option<String>,
    pub publication_date: Option<String>,
    pub candidate_required_location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
}

impl RemotiveJob {
    /// Publication date, when the feed carries a parseable one
    pub fn posted_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.publication_date.as_deref()?.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Whether every keyword appears in the title, description or company
    pub fn matches_all(&self, keywords: &[String]) -> bool {
        let haystack = format!(
            "{} {} {}",
            self.title,
            self.description.as_deref().unwrap_or_default(),
            self.company_name.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        keywords
            .iter()
            .all(|keyword| haystack.contains(&keyword.to_lowercase()))
    }

    pub fn into_listing(self) -> ListingRecord {
        let posted_date = self.posted_date().unwrap_or_else(Utc::now);
        ListingRecord {
            company: non_empty(self.company_name).unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
            location: Some(
                non_empty(self.candidate_required_location)
                    .unwrap_or_else(|| REMOTE_LOCATION.to_string()),
            ),
            title: self.title,
            url: self.url,
            tags: self.tags,
            is_remote: true,
            source: Source::Remotive,
            posted_date,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A job category listed on the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub url: String,
    pub slug: String,
}

/// Full description of one posting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetails {
    pub title: String,
    pub company: String,
    pub description: String,
    pub description_html: String,
    pub apply_url: String,
    pub location: String,
    pub salary: String,
    pub source_url: String,
    pub source: Source,
    pub scraped_at: DateTime<Utc>,
}

/// Parser for remotive.com
#[derive(Debug, Clone)]
pub struct RemotiveBoard {
    base_url: String,
    fetcher: Fetcher,
    max_pages: u32,
    category: Option<String>,
    limit: usize,
}

impl RemotiveBoard {
    pub fn new(base_url: impl Into<String>, fetcher: Fetcher, max_pages: u32) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
            max_pages,
            category: None,
            limit: DEFAULT_FEED_LIMIT,
        }
    }

    /// Restrict listings to one category slug
    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    /// Maximum number of jobs taken from the feed
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn feed_url(&self, category: Option<&str>) -> String {
        match category {
            Some(slug) => format!("{}/api/remote-jobs/category/{}", self.base_url, slug),
            None => format!("{}/api/remote-jobs", self.base_url),
        }
    }

    fn listing_url(&self) -> String {
        match &self.category {
            Some(slug) => format!("{}/remote-jobs/{}", self.base_url, slug),
            None => format!("{}/remote-jobs", self.base_url),
        }
    }

    fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.listing_url()
        } else {
            format!("{}?page={}", self.listing_url(), page)
        }
    }

    fn search_url(&self, terms: &str) -> String {
        let feed = self.feed_url(None);
        match Url::parse_with_params(&feed, &[("search", terms)]) {
            Ok(url) => url.into(),
            Err(_) => format!("{}?search={}", feed, terms),
        }
    }

    /// Up to `limit` feed jobs, optionally from one category
    #[instrument(skip(self))]
    pub async fn fetch_feed(
        &self,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RemotiveJob>, FetchError> {
        let url = self.feed_url(category);
        info!("Fetching jobs from Remotive API: {}", url);
        let mut feed: RemotiveFeed = self.fetcher.fetch_json(&url).await?;
        feed.jobs.truncate(limit);
        info!("Found {} jobs from Remotive API", feed.jobs.len());
        Ok(feed.jobs)
    }

    /// Feed jobs, or the listing pages when the feed is unavailable
    #[instrument(skip(self), fields(category = ?self.category))]
    pub async fn get_jobs(&self) -> Vec<ListingRecord> {
        match self.fetch_feed(self.category.as_deref(), self.limit).await {
            Ok(jobs) => dedupe(jobs.into_iter().map(RemotiveJob::into_listing).collect()),
            Err(e) => {
                warn!("Remotive feed unavailable ({}), scraping listing pages", e);
                self.scrape_pages().await
            }
        }
    }

    async fn scrape_pages(&self) -> Vec<ListingRecord> {
        let profile = match SelectorProfile::remotive().compile() {
            Ok(profile) => profile,
            Err(e) => {
                error!("Remotive selector profile is unusable: {}", e);
                return Vec::new();
            }
        };
        let extractor = FieldExtractor::new(self.base_url.clone(), Source::Remotive)
            .with_defaults(Source::Remotive.field_defaults());

        let mut jobs = Vec::new();
        for page in 1..=self.max_pages.max(1) {
            let url = self.page_url(page);
            let Some(raw) = fetch_page(&self.fetcher, &url).await else {
                break;
            };

            let (found, has_next) = listings_on_page(&raw.body, &extractor, &profile);
            info!("Found {} jobs on page {}", found.len(), page);
            jobs.extend(found);
            if !has_next {
                break;
            }
        }
        dedupe(jobs)
    }

    /// Feed search, or a keyword filter over the full feed when search is unavailable
    #[instrument(skip(self))]
    pub async fn search_jobs(&self, keywords: &[String], limit: usize) -> Vec<ListingRecord> {
        if keywords.is_empty() {
            return Vec::new();
        }

        let terms = keywords.join(" ");
        let url = self.search_url(&terms);
        info!("Searching jobs with keywords: {}", terms);

        let page = match self.fetcher.get(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Search request failed: {}", e);
                return Vec::new();
            }
        };

        if (200..300).contains(&page.status) {
            return match serde_json::from_str::<RemotiveFeed>(&page.body) {
                Ok(feed) => feed
                    .jobs
                    .into_iter()
                    .take(limit)
                    .map(RemotiveJob::into_listing)
                    .collect(),
                Err(e) => {
                    warn!("Search response from {} is not a feed: {}", url, e);
                    Vec::new()
                }
            };
        }

        info!("Search answered HTTP {}, filtering the full feed", page.status);
        match self.fetch_feed(None, SEARCH_FALLBACK_LIMIT).await {
            Ok(jobs) => {
                let found: Vec<ListingRecord> = jobs
                    .into_iter()
                    .filter(|job| job.matches_all(keywords))
                    .take(limit)
                    .map(RemotiveJob::into_listing)
                    .collect();
                info!("Found {} jobs matching search terms (fallback)", found.len());
                found
            }
            Err(e) => {
                warn!("Fallback feed unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Categories linked from the listing page
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Vec<Category> {
        let url = format!("{}/remote-jobs", self.base_url);
        match fetch_page(&self.fetcher, &url).await {
            Some(page) => categories_on_page(&page.body, &self.base_url),
            None => Vec::new(),
        }
    }

    /// Companies posting in the feed, busiest first
    #[instrument(skip(self))]
    pub async fn get_companies(&self) -> Vec<CompanyRecord> {
        match self.fetch_feed(None, COMPANY_FEED_LIMIT).await {
            Ok(jobs) => {
                let companies = companies_from_feed(&jobs);
                info!("Found {} unique companies", companies.len());
                companies
            }
            Err(e) => {
                warn!("Remotive feed unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Detail page of one posting
    #[instrument(skip(self))]
    pub async fn get_job_details(&self, job_url: &str) -> Result<JobDetails, FetchError> {
        info!("Fetching job details from: {}", job_url);
        let page = self.fetcher.fetch(job_url).await?;
        Ok(details_from_page(&page.body, job_url, &self.base_url))
    }
}

/// Profile listings on one page and whether an enabled next page follows
fn listings_on_page(
    body: &str,
    extractor: &FieldExtractor,
    profile: &CompiledProfile,
) -> (Vec<ListingRecord>, bool) {
    let document = Html::parse_document(body);
    let jobs = extractor.profiled_listings(profile, &document);
    let has_next = dom::select_first(&document, "a.next_page")
        .is_some_and(|next| !next.value().classes().any(|class| class == "disabled"));
    (jobs, has_next)
}

fn categories_on_page(body: &str, base_url: &str) -> Vec<Category> {
    let document = Html::parse_document(body);
    let Ok(selector) = Selector::parse(r#"a[href^="/remote-jobs/"]"#) else {
        return Vec::new();
    };

    let categories = document.select(&selector).filter_map(|link| {
        let href = link.value().attr("href")?;
        if href == CATEGORY_PREFIX {
            return None;
        }
        let name = dom::trimmed_text(&link);
        if name.is_empty() {
            return None;
        }
        Some(Category {
            name,
            url: format!("{}{}", base_url, href),
            slug: href.trim_start_matches(CATEGORY_PREFIX).trim_end_matches('/').to_string(),
        })
    });
    dedupe_by(categories, |category| category.name.clone())
}

/// Aggregate feed jobs per company, sorted by job count, ties in feed order
fn companies_from_feed(jobs: &[RemotiveJob]) -> Vec<CompanyRecord> {
    let mut companies: Vec<CompanyRecord> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for job in jobs {
        let Some(name) = job.company_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };
        match index.get(name) {
            Some(&position) => {
                let company = &mut companies[position];
                company.job_count = Some(company.job_count.unwrap_or(0) + 1);
            }
            None => {
                index.insert(name, companies.len());
                companies.push(CompanyRecord {
                    name: name.to_string(),
                    url: non_empty(job.company_url.clone()),
                    found_by: "feed".to_string(),
                    logo: non_empty(job.company_logo.clone()),
                    job_count: Some(1),
                });
            }
        }
    }

    companies.sort_by(|a, b| b.job_count.cmp(&a.job_count));
    companies
}

fn details_from_page(body: &str, job_url: &str, base_url: &str) -> JobDetails {
    let document = Html::parse_document(body);
    let text = |css: &str| {
        dom::select_first(&document, css)
            .map(|element| dom::trimmed_text(&element))
            .filter(|text| !text.is_empty())
    };
    let description = dom::select_first(&document, ".job-description");

    JobDetails {
        title: text(".content h1").unwrap_or_else(|| "Unknown Title".to_string()),
        company: text(".content .company").unwrap_or_else(|| "Unknown Company".to_string()),
        description: description
            .map(|element| dom::trimmed_text(&element))
            .unwrap_or_default(),
        description_html: description.map(|element| element.html()).unwrap_or_default(),
        apply_url: dom::select_first(&document, "a.apply-btn")
            .and_then(|link| link.value().attr("href"))
            .map(|href| normalize(base_url, href))
            .unwrap_or_else(|| job_url.to_string()),
        location: text(".job-metadata .location").unwrap_or_else(|| REMOTE_LOCATION.to_string()),
        salary: text(".job-metadata .salary").unwrap_or_else(|| "Not specified".to_string()),
        source_url: job_url.to_string(),
        source: Source::Remotive,
        scraped_at: Utc::now(),
    }
}
