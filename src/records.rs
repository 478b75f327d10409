//! # Extraction Records
//!
//! Value objects produced by the extraction core and handed, by value, to
//! whatever stores, diffs or announces them. Every record is a flat field
//! mapping that serializes cleanly to JSON.
//!
//! ## Key Components
//!
//! - `Source`: Tag identifying the job board a record came from
//! - `ListingRecord`: One job posting
//! - `CompanyRecord`: One employer entry
//! - `FieldDefaults`: The substitution rules applied when a field cannot be inferred

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Company name used when no employer could be inferred for a listing
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Location used by boards that only ever list remote positions
pub const REMOTE_LOCATION: &str = "Remote";

/// Job board a record was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    RemoteOk,
    WeWorkRemotely,
    RemoteCo,
    JobsFromSpace,
    Remotive,
    Custom,
}

impl Source {
    /// Stable identifier, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::RemoteOk => "remote_ok",
            Source::WeWorkRemotely => "we_work_remotely",
            Source::RemoteCo => "remote_co",
            Source::JobsFromSpace => "jobs_from_space",
            Source::Remotive => "remotive",
            Source::Custom => "custom",
        }
    }

    /// Home page used when no explicit base URL is configured
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Source::RemoteOk => Some("https://remoteok.com"),
            Source::WeWorkRemotely => Some("https://weworkremotely.com"),
            Source::RemoteCo => Some("https://remote.co"),
            Source::JobsFromSpace => Some("https://www.jobsfromspace.com"),
            Source::Remotive => Some("https://remotive.com"),
            Source::Custom => None,
        }
    }

    /// Default-substitution rules for listings from this board
    pub fn field_defaults(&self) -> FieldDefaults {
        match self {
            Source::RemoteOk | Source::WeWorkRemotely | Source::RemoteCo | Source::Remotive => {
                FieldDefaults::remote_board()
            }
            Source::JobsFromSpace | Source::Custom => FieldDefaults::default(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "remote_ok" | "remoteok" => Ok(Source::RemoteOk),
            "we_work_remotely" | "weworkremotely" => Ok(Source::WeWorkRemotely),
            "remote_co" | "remoteco" => Ok(Source::RemoteCo),
            "jobs_from_space" | "jobsfromspace" => Ok(Source::JobsFromSpace),
            "remotive" => Ok(Source::Remotive),
            "custom" => Ok(Source::Custom),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

/// One structured job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Job title
    pub title: String,

    /// Employer name, `UNKNOWN_COMPANY` when it could not be inferred
    pub company: String,

    /// Absolute URL of the posting
    pub url: String,

    /// Free-form location text
    pub location: Option<String>,

    /// Skill or category tags, in document order
    pub tags: Vec<String>,

    /// Whether the posting mentions remote work
    pub is_remote: bool,

    /// Board the posting was found on
    pub source: Source,

    /// Extraction time unless the board published an explicit date
    pub posted_date: DateTime<Utc>,
}

impl ListingRecord {
    /// Whether every keyword appears in the title, company or tags, ignoring case
    pub fn matches_keywords(&self, keywords: &[String]) -> bool {
        let haystack = format!("{} {} {}", self.title, self.company, self.tags.join(" ")).to_lowercase();
        keywords
            .iter()
            .all(|keyword| haystack.contains(&keyword.to_lowercase()))
    }

    /// Derive the remote flag from the title, the location and the tags
    pub fn mentions_remote(title: &str, location: Option<&str>, tags: &[String]) -> bool {
        let hit = |text: &str| text.to_lowercase().contains("remote");
        hit(title) || location.is_some_and(hit) || tags.iter().any(|tag| hit(tag))
    }
}

/// One employer entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Company name
    pub name: String,

    /// Absolute URL of the company page, when one was linked
    pub url: Option<String>,

    /// Heuristic that found this entry, e.g. "logo image"
    pub found_by: String,

    /// Logo image reference
    pub logo: Option<String>,

    /// Number of listings seen for this company, for feed-backed sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_count: Option<usize>,
}

/// Default-substitution rules applied by the field extractor
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefaults {
    /// Substituted when no company could be inferred
    pub company: String,

    /// Substituted when no location could be inferred
    pub location: Option<String>,

    /// Forces `is_remote` for boards that only list remote work
    pub remote_only: bool,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            company: UNKNOWN_COMPANY.to_string(),
            location: None,
            remote_only: false,
        }
    }
}

impl FieldDefaults {
    /// Defaults for boards whose listings are all remote
    pub fn remote_board() -> Self {
        Self {
            company: UNKNOWN_COMPANY.to_string(),
            location: Some(REMOTE_LOCATION.to_string()),
            remote_only: true,
        }
    }
}
