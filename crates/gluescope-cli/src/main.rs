mod display;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use regex::Regex;

use gluescope_core::config::AwsAuth;
use gluescope_core::inventory::{self, ScanOptions, DEFAULT_CONCURRENCY};
use gluescope_core::report::{self, ReportWriter, ScanReport};
use gluescope_core::{deep, GlueProvider};

#[derive(Parser)]
#[command(
    name = "gluescope",
    version,
    about = "GlueScope — AWS Glue job inventory and cost analyzer",
    long_about = "Scan every Glue job in a region, bucket them by idle time, estimate monthly cost, and deep-scan the ones that look wasteful."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AwsArgs {
    /// AWS region to scan
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Named AWS profile to authenticate with
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Static access key id (overrides profile)
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    /// Static secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,
}

impl AwsArgs {
    fn auth(&self) -> AwsAuth {
        AwsAuth::resolve(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            self.session_token.clone(),
            self.profile.clone(),
            self.region.clone(),
        )
    }
}

#[derive(Args)]
struct ScanArgs {
    #[command(flatten)]
    aws: AwsArgs,

    /// Max jobs analyzed in parallel
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Only analyze jobs whose name matches this regex
    #[arg(long)]
    filter: Option<String>,

    /// Directory for report files
    #[arg(short, long, default_value = "gluescope-reports")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Preliminary scan: idle buckets, quick cost, tags and name heuristics
    Scan {
        #[command(flatten)]
        args: ScanArgs,

        /// Output format (text, json, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Deep scan: script download, CloudWatch metrics, triggers, recommendations
    Deep {
        #[command(flatten)]
        args: ScanArgs,

        /// Deep-scan every job instead of only flagged candidates
        #[arg(long)]
        all: bool,

        /// Deep-scan exactly these jobs, ignoring candidate gating
        #[arg(long, value_delimiter = ',')]
        jobs: Vec<String>,
    },

    /// Re-render a saved preliminary report
    Report {
        /// Path to a preliminary_analysis_*.json file
        path: PathBuf,

        /// Output format (text, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan { args, format } => cmd_scan(&args, &format).await,
        Commands::Deep { args, all, jobs } => cmd_deep(&args, all, &jobs).await,
        Commands::Report { path, format } => cmd_report(&path, &format),
    }
}

fn scan_options(args: &ScanArgs) -> Result<ScanOptions> {
    let job_filter = args
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --filter regex")?;
    Ok(ScanOptions {
        concurrency: args.concurrency,
        job_filter,
        ..ScanOptions::default()
    })
}

async fn run_preliminary(args: &ScanArgs) -> Result<(Arc<GlueProvider>, ScanReport)> {
    let auth = args.aws.auth();
    let region = auth.region();

    display::print_banner(&region);
    let provider = Arc::new(GlueProvider::connect(&auth).await?);
    let job_names = provider.list_job_names().await?;
    println!("Found {} jobs in {}", job_names.len(), region);

    let options = scan_options(args)?;
    let results = inventory::scan_jobs(Arc::clone(&provider), job_names, &options).await;

    Ok((provider, ScanReport::preliminary(&region, results)))
}

async fn cmd_scan(args: &ScanArgs, format: &str) -> Result<()> {
    let (_provider, report) = run_preliminary(args).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" => println!("{}", report::format_markdown_report(&report)),
        _ => display::print_scan_report(&report),
    }

    let writer = ReportWriter::new(&args.output_dir);
    let json_path = writer.write_preliminary_json(&report)?;
    let csv_path = writer.write_inventory_csv(&report.results)?;
    let txt_path = writer.write_candidates_txt(&report)?;
    display::print_written_files(&[json_path, csv_path, txt_path]);

    Ok(())
}

async fn cmd_deep(args: &ScanArgs, all: bool, jobs: &[String]) -> Result<()> {
    let (provider, report) = run_preliminary(args).await?;
    display::print_scan_report(&report);

    let deep_results = if jobs.is_empty() {
        deep::deep_scan(&provider, &report.results, all).await
    } else {
        // An explicit job list overrides candidate gating.
        let selected: Vec<_> = report
            .results
            .iter()
            .filter(|r| jobs.contains(&r.job_name))
            .cloned()
            .collect();
        deep::deep_scan(&provider, &selected, true).await
    };
    for result in &deep_results {
        display::print_deep_result(result);
    }

    let writer = ReportWriter::new(&args.output_dir);
    let json_path = writer.write_preliminary_json(&report)?;
    let deep_path = writer.write_deep_json(&deep_results)?;
    display::print_written_files(&[json_path, deep_path]);

    Ok(())
}

fn cmd_report(path: &PathBuf, format: &str) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading report {}", path.display()))?;
    let report: ScanReport =
        serde_json::from_str(&json).context("parsing preliminary report JSON")?;

    match format {
        "markdown" => println!("{}", report::format_markdown_report(&report)),
        _ => display::print_scan_report(&report),
    }
    Ok(())
}
