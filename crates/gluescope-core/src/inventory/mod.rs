pub mod categorizer;
pub mod quick_code;

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cost::{self, WorkerRates};
use crate::error::Result;
use crate::model::{JobAnalysisResult, JobConfigSummary};
use crate::provider::glue::GlueProvider;
use crate::tags;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const RUNS_PER_JOB: i32 = 5;

/// Knobs for the preliminary scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub concurrency: usize,
    pub job_filter: Option<Regex>,
    pub rates: WorkerRates,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            job_filter: None,
            rates: WorkerRates::default(),
        }
    }
}

/// Apply the optional name filter to the job list.
pub fn filter_jobs(names: Vec<String>, filter: Option<&Regex>) -> Vec<String> {
    match filter {
        Some(re) => names.into_iter().filter(|n| re.is_match(n)).collect(),
        None => names,
    }
}

/// Preliminary analysis of a single job: metadata, idle bucket, quick cost,
/// tags, and name heuristics. No script downloads, no metric lookups.
pub async fn analyze_job(
    provider: &GlueProvider,
    rates: &WorkerRates,
    job_name: &str,
) -> Result<JobAnalysisResult> {
    let detail = provider.get_job(job_name).await?;
    let runs = provider.recent_runs(job_name, RUNS_PER_JOB).await?;

    let idle = categorizer::categorize_by_idle_time(&detail, &runs);
    let cost = cost::quick_estimate(rates, &detail, &runs);
    let tags = tags::extract_tags_info(&detail);
    let code = quick_code::quick_code_analysis(&detail);
    let reasons = categorizer::deep_scan_reasons(&detail, &cost, &idle, &code, &tags);

    Ok(JobAnalysisResult {
        job_name: detail.name.clone(),
        timestamp: Utc::now(),
        config: JobConfigSummary::from_detail(&detail),
        idle,
        cost,
        tags,
        code,
        recent_runs: runs.len(),
        deep_scan_reasons: reasons,
    })
}

/// Fan the preliminary analysis out over all jobs with a bounded worker pool.
///
/// Individual job failures are reported and skipped; they never abort the
/// scan. Completion order is whatever the pool produces, so results are
/// sorted by name before returning.
pub async fn scan_jobs(
    provider: Arc<GlueProvider>,
    job_names: Vec<String>,
    options: &ScanOptions,
) -> Vec<JobAnalysisResult> {
    let job_names = filter_jobs(job_names, options.job_filter.as_ref());
    println!("Analyzing {} jobs (preliminary scan)...", job_names.len());

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut pool: JoinSet<(String, Result<JobAnalysisResult>)> = JoinSet::new();

    for name in job_names {
        let provider = Arc::clone(&provider);
        let semaphore = Arc::clone(&semaphore);
        let rates = options.rates.clone();
        pool.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("scan semaphore closed");
            let result = analyze_job(&provider, &rates, &name).await;
            (name, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok((_, Ok(result))) => {
                println!(
                    "  {}: {} | R$ {:.2}/month",
                    result.job_name,
                    result.idle.category.label(),
                    result.cost.monthly_brl
                );
                results.push(result);
            }
            Ok((name, Err(e))) => {
                eprintln!("  error analyzing {}: {}", name, e);
            }
            Err(e) => {
                log::warn!("scan worker panicked: {}", e);
            }
        }
    }

    results.sort_by(|a, b| a.job_name.cmp(&b.job_name));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_keeps_matching_names() {
        let names = vec![
            "orders-etl".to_string(),
            "billing-etl".to_string(),
            "scratch-test".to_string(),
        ];
        let re = Regex::new(r"etl$").unwrap();
        let filtered = filter_jobs(names.clone(), Some(&re));
        assert_eq!(filtered, vec!["orders-etl", "billing-etl"]);
        assert_eq!(filter_jobs(names, None).len(), 3);
    }

    #[test]
    fn default_options() {
        let options = ScanOptions::default();
        assert_eq!(options.concurrency, DEFAULT_CONCURRENCY);
        assert!(options.job_filter.is_none());
    }
}
