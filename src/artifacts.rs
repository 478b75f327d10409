//! # Diagnostic artifacts
//!
//! Persists what an analysis run saw so an operator can inspect a board
//! offline: the structural summary, probe results, swept records, the raw
//! home page and a short report. Every file of one site shares a prefix
//! derived from its host, e.g. `jobsfromspace_com_report.json`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::normalize;
use crate::probe::ProbeResult;
use crate::records::{CompanyRecord, ListingRecord};
use crate::structure::SiteStructure;

/// Records copied into a report as a sample
pub const SAMPLE_SIZE: usize = 3;

/// Title used when the page had none
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Error type for artifact persistence
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ArtifactError> for crate::Error {
    fn from(err: ArtifactError) -> Self {
        crate::Error::Artifact(err.to_string())
    }
}

type Result<T> = std::result::Result<T, ArtifactError>;

/// Summary of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub analysis_date: DateTime<Utc>,
    pub site_url: String,
    pub site_title: String,
    pub jobs_count: usize,
    pub companies_count: usize,
    pub job_sample: Vec<ListingRecord>,
    pub company_sample: Vec<CompanyRecord>,
}

impl AnalysisReport {
    pub fn new(
        site_url: impl Into<String>,
        structure: &SiteStructure,
        jobs: &[ListingRecord],
        companies: &[CompanyRecord],
    ) -> Self {
        Self {
            analysis_date: Utc::now(),
            site_url: site_url.into(),
            site_title: structure
                .page_title
                .clone()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            jobs_count: jobs.len(),
            companies_count: companies.len(),
            job_sample: jobs.iter().take(SAMPLE_SIZE).cloned().collect(),
            company_sample: companies.iter().take(SAMPLE_SIZE).cloned().collect(),
        }
    }
}

/// Writes the artifacts of one site into a directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    base_path: PathBuf,
    prefix: String,
}

impl ArtifactStore {
    /// Store for `site_url` under `base_path`
    pub fn new(base_path: impl Into<PathBuf>, site_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            prefix: file_prefix(site_url),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the artifact named `name` with extension `ext`
    pub fn path_for(&self, name: &str, ext: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.{}", self.prefix, name, ext))
    }

    pub async fn store_structure(&self, structure: &SiteStructure) -> Result<PathBuf> {
        self.write_json("analysis", structure).await
    }

    pub async fn store_probes(&self, probes: &[ProbeResult]) -> Result<PathBuf> {
        self.write_json("probes", probes).await
    }

    pub async fn store_jobs(&self, jobs: &[ListingRecord]) -> Result<PathBuf> {
        self.write_json("jobs", jobs).await
    }

    pub async fn store_companies(&self, companies: &[CompanyRecord]) -> Result<PathBuf> {
        self.write_json("companies", companies).await
    }

    pub async fn store_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        self.write_json("report", report).await
    }

    pub async fn store_raw_html(&self, html: &str) -> Result<PathBuf> {
        let path = self.path_for("raw", "html");
        self.write(&path, html.as_bytes()).await?;
        info!("Raw HTML saved ({} bytes)", html.len());
        Ok(path)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.path_for(name, "json");
        let json = serde_json::to_string_pretty(value)?;
        self.write(&path, json.as_bytes()).await?;
        Ok(path)
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        fs::write(path, contents).await?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Host without `www.`, with every non-alphanumeric character replaced
fn file_prefix(site_url: &str) -> String {
    let host = normalize::host(site_url).unwrap_or_else(|| site_url.to_string());
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let prefix: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if prefix.is_empty() {
        "site".to_string()
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Source;
    use tempfile::TempDir;

    fn company(name: &str) -> CompanyRecord {
        CompanyRecord {
            name: name.to_string(),
            url: None,
            found_by: "image alt".to_string(),
            logo: None,
            job_count: None,
        }
    }

    fn job(title: &str) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            company: "Axiom".to_string(),
            url: format!("https://www.jobsfromspace.com/jobs/{title}"),
            location: None,
            tags: Vec::new(),
            is_remote: false,
            source: Source::JobsFromSpace,
            posted_date: Utc::now(),
        }
    }

    #[test]
    fn test_file_prefix() {
        assert_eq!(file_prefix("https://www.jobsfromspace.com"), "jobsfromspace_com");
        assert_eq!(file_prefix("http://127.0.0.1:8080/"), "127_0_0_1");
        assert_eq!(file_prefix(""), "site");
    }

    #[test]
    fn test_report_samples_are_capped() {
        let jobs: Vec<ListingRecord> = (0..5).map(|i| job(&i.to_string())).collect();
        let companies = vec![company("Axiom")];
        let structure = SiteStructure {
            page_title: Some("Jobs From Space".to_string()),
            ..SiteStructure::default()
        };

        let report = AnalysisReport::new("https://www.jobsfromspace.com", &structure, &jobs, &companies);
        assert_eq!(report.jobs_count, 5);
        assert_eq!(report.job_sample.len(), SAMPLE_SIZE);
        assert_eq!(report.companies_count, 1);
        assert_eq!(report.company_sample.len(), 1);
        assert_eq!(report.site_title, "Jobs From Space");

        let untitled = AnalysisReport::new("x", &SiteStructure::default(), &[], &[]);
        assert_eq!(untitled.site_title, UNKNOWN_TITLE);
        assert!(untitled.job_sample.is_empty());
    }

    #[tokio::test]
    async fn test_store_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("data");
        let store = ArtifactStore::new(&base, "https://www.jobsfromspace.com");

        let path = store.store_companies(&[company("Axiom")]).await.unwrap();
        assert_eq!(path, base.join("jobsfromspace_com_companies.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["name"], "Axiom");
        assert_eq!(written[0]["found_by"], "image alt");
    }

    #[tokio::test]
    async fn test_store_report_and_html() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path(), "https://www.jobsfromspace.com");

        let report = AnalysisReport::new(
            "https://www.jobsfromspace.com",
            &SiteStructure::default(),
            &[job("pilot")],
            &[],
        );
        let path = store.store_report(&report).await.unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["jobs_count"], 1);
        assert_eq!(written["job_sample"][0]["title"], "pilot");
        assert_eq!(written["job_sample"][0]["source"], "jobs_from_space");

        let html = store.store_raw_html("<html></html>").await.unwrap();
        assert_eq!(std::fs::read_to_string(html).unwrap(), "<html></html>");
    }
}
