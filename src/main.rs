//! # jobsift CLI
//!
//! Command-line access to the extraction core.
//!
//! ## Subcommands
//!
//! - `jobs`: Listings from one board
//! - `companies`: Companies from one board
//! - `search`: Keyword search on Remotive
//! - `crawl`: Several boards at once, with a progress bar
//! - `analyze`: Structure analysis, home page sweeps and diagnostic artifacts
//! - `probe`: Conventional API endpoints that answer on a site
//!
//! Records are printed as JSON on stdout unless `--output` is given; logs
//! go to stderr.

mod logging;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use jobsift::artifacts::ArtifactStore;
use jobsift::fetch::{CrawlerConfig, CrawlerConfigBuilder, Fetcher};
use jobsift::probe::{DEFAULT_PROBE_PATHS, probe_paths};
use jobsift::records::Source;
use jobsift::runner::{Harvest, Target, run_sources};
use jobsift::sources::{DEFAULT_FEED_LIMIT, GenericBoard, RemotiveBoard, SourceParser};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Extract job listings and companies from job boards", long_about = None)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the jobs of one board
    Jobs(JobsArgs),

    /// List the companies of one board
    Companies(CompaniesArgs),

    /// Search Remotive by keywords
    Search(SearchArgs),

    /// Run several boards concurrently
    Crawl(CrawlArgs),

    /// Analyze a site and save diagnostic artifacts
    Analyze(AnalyzeArgs),

    /// Probe a site for JSON endpoints
    Probe(ProbeArgs),
}

/// Request settings, overriding the environment
#[derive(Args, Debug, Clone)]
struct FetchArgs {
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Delay between requests to one host, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// User agent header
    #[arg(long)]
    user_agent: Option<String>,

    /// Maximum number of listing pages per board
    #[arg(short = 'p', long)]
    max_pages: Option<u32>,
}

impl FetchArgs {
    fn builder(&self) -> CrawlerConfigBuilder {
        let mut builder = CrawlerConfigBuilder::from_config(CrawlerConfig::from_env());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout_secs(timeout);
        }
        if let Some(delay) = self.delay_ms {
            builder = builder.delay_ms(delay);
        }
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(max_pages) = self.max_pages {
            builder = builder.max_pages(max_pages);
        }
        builder
    }

    fn config(&self) -> CrawlerConfig {
        self.builder().build()
    }
}

#[derive(Args, Debug)]
struct JobsArgs {
    /// Board to read (remote_ok, we_work_remotely, remote_co, jobs_from_space, remotive, custom)
    #[arg(required = true)]
    source: Source,

    /// Base URL, required for custom boards
    #[arg(short, long)]
    url: Option<String>,

    /// Only keep jobs mentioning every keyword
    #[arg(short, long)]
    keyword: Vec<String>,

    /// Remotive category slug
    #[arg(long)]
    category: Option<String>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args, Debug)]
struct CompaniesArgs {
    /// Board to read
    #[arg(required = true)]
    source: Source,

    /// Base URL, required for custom boards
    #[arg(short, long)]
    url: Option<String>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Keywords that must all match
    #[arg(required = true)]
    keywords: Vec<String>,

    /// Maximum number of results
    #[arg(short, long, default_value_t = DEFAULT_FEED_LIMIT)]
    limit: usize,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Boards to run
    #[arg(required = true)]
    sources: Vec<Source>,

    /// Base URL for a custom board
    #[arg(short, long)]
    url: Option<String>,

    /// Collect companies as well as jobs
    #[arg(short, long)]
    companies: bool,

    /// Only keep jobs mentioning every keyword
    #[arg(short, long)]
    keyword: Vec<String>,

    /// Boards crawled at the same time
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Site to analyze
    #[arg(required = true)]
    url: String,

    /// Directory receiving the artifacts
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Site to probe
    #[arg(required = true)]
    url: String,

    /// Paths to try (comma-separated), defaults to the conventional set
    #[arg(long, value_delimiter = ',')]
    paths: Vec<String>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.log_file.as_deref())?;

    match cli.command {
        Some(Commands::Jobs(args)) => jobs_command(args).await?,
        Some(Commands::Companies(args)) => companies_command(args).await?,
        Some(Commands::Search(args)) => search_command(args).await?,
        Some(Commands::Crawl(args)) => crawl_command(args).await?,
        Some(Commands::Analyze(args)) => analyze_command(args).await?,
        Some(Commands::Probe(args)) => probe_command(args).await?,
        None => {
            let _ = Cli::parse_from(["jobsift", "--help"]);
        }
    }

    Ok(())
}

/// Pretty JSON to `output`, or stdout
async fn emit<T: Serialize + ?Sized>(value: &T, output: Option<PathBuf>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, json).await?;
            eprintln!("Saved results to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[instrument]
async fn jobs_command(args: JobsArgs) -> anyhow::Result<()> {
    let config = args.fetch.config();
    let fetcher = Fetcher::new(&config)?;

    let parser = match (args.source, args.category) {
        (Source::Remotive, Some(category)) => {
            let base = args.url.as_deref().or(Source::Remotive.default_base_url());
            let base = base.unwrap_or_default().trim_end_matches('/').to_string();
            SourceParser::Remotive(
                RemotiveBoard::new(base, fetcher, config.max_pages).with_category(category),
            )
        }
        (source, category) => {
            if category.is_some() {
                warn!("--category only applies to remotive, ignoring it");
            }
            SourceParser::new(source, args.url.as_deref(), fetcher, &config)?
        }
    };

    let jobs = if args.keyword.is_empty() {
        parser.get_jobs().await
    } else {
        parser.search_jobs(&args.keyword, usize::MAX).await
    };
    eprintln!("Found {} jobs on {}", jobs.len(), parser.base_url());
    emit(&jobs, args.output).await
}

#[instrument]
async fn companies_command(args: CompaniesArgs) -> anyhow::Result<()> {
    let config = args.fetch.config();
    let parser = SourceParser::new(args.source, args.url.as_deref(), Fetcher::new(&config)?, &config)?;

    let companies = parser.get_companies().await;
    eprintln!("Found {} companies on {}", companies.len(), parser.base_url());
    emit(&companies, args.output).await
}

#[instrument]
async fn search_command(args: SearchArgs) -> anyhow::Result<()> {
    let config = args.fetch.config();
    let parser = SourceParser::new(Source::Remotive, None, Fetcher::new(&config)?, &config)?;

    let jobs = parser.search_jobs(&args.keywords, args.limit).await;
    eprintln!("Found {} jobs matching {:?}", jobs.len(), args.keywords);
    emit(&jobs, args.output).await
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let config = args
        .fetch
        .builder()
        .keywords(args.keyword)
        .max_concurrent_sources(args.concurrency)
        .build();

    let targets: Vec<Target> = args
        .sources
        .iter()
        .map(|&source| match (&args.url, source) {
            (Some(url), Source::Custom) => Target::at(source, url.clone()),
            _ => Target::new(source),
        })
        .collect();
    let harvest = if args.companies {
        Harvest::Both
    } else {
        Harvest::Jobs
    };

    let progress_bar = ProgressBar::new(targets.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Crawling sources...");

    let start_time = std::time::Instant::now();
    let outcomes = run_sources(&targets, &config, harvest, |outcome| {
        progress_bar.inc(1);
        match &outcome.error {
            Some(error) => progress_bar.set_message(format!("{} failed: {}", outcome.source, error)),
            None => progress_bar.set_message(format!(
                "{}: {} jobs, {} companies",
                outcome.source,
                outcome.jobs.len(),
                outcome.companies.len()
            )),
        }
    })
    .await;
    progress_bar.finish_with_message("Crawl completed");

    let total: usize = outcomes.iter().map(|outcome| outcome.jobs.len()).sum();
    eprintln!(
        "Collected {} jobs from {} sources in {:.2?}",
        total,
        outcomes.len(),
        start_time.elapsed()
    );
    emit(&outcomes, args.output).await
}

#[instrument]
async fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = args.fetch.config();
    let url = args.url.trim_end_matches('/').to_string();
    let board = GenericBoard::new(url.clone(), Source::Custom, Fetcher::new(&config)?, config.max_pages);
    let store = ArtifactStore::new(&args.output_dir, &url);

    info!("Analyzing site structure of {}", url);
    let report = board.write_analysis(&store).await?;

    eprintln!("Site title: {}", report.site_title);
    eprintln!("Jobs found: {}", report.jobs_count);
    eprintln!("Companies found: {}", report.companies_count);
    eprintln!("Report saved to {}", store.path_for("report", "json").display());
    Ok(())
}

#[instrument]
async fn probe_command(args: ProbeArgs) -> anyhow::Result<()> {
    let config = args.fetch.config();
    let fetcher = Fetcher::new(&config)?;
    let base = args.url.trim_end_matches('/');

    let paths: Vec<&str> = if args.paths.is_empty() {
        DEFAULT_PROBE_PATHS.to_vec()
    } else {
        args.paths.iter().map(String::as_str).collect()
    };
    let results = probe_paths(&fetcher, base, &paths).await;
    eprintln!("{} of {} endpoints answered", results.len(), paths.len());
    emit(&results, args.output).await
}
