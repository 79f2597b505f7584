pub mod code;
pub mod dependencies;
pub mod performance;
pub mod recommender;

use std::time::Instant;

use chrono::Utc;
use log::warn;

use crate::model::{CodeAnalysis, DeepAnalysisResult, DependencyAnalysis, JobAnalysisResult};
use crate::provider::glue::GlueProvider;

/// Run all deep sub-analyses for one job and merge them into
/// recommendations. Failed sub-analyses degrade to empty results so one
/// bad script or a missing metric never sinks the whole job.
pub async fn analyze_deep(
    provider: &GlueProvider,
    preliminary: &JobAnalysisResult,
) -> DeepAnalysisResult {
    let started = Instant::now();
    let job_name = &preliminary.job_name;

    let (code, performance, dependencies) = tokio::join!(
        code::analyze(provider, preliminary),
        performance::analyze(provider, preliminary),
        dependencies::analyze(provider, preliminary),
    );

    let code = code.unwrap_or_else(|e| {
        warn!("code analysis failed for {}: {}", job_name, e);
        CodeAnalysis::default()
    });
    let performance = performance.unwrap_or_else(|e| {
        warn!("performance analysis failed for {}: {}", job_name, e);
        Default::default()
    });
    let dependencies = dependencies.unwrap_or_else(|e| {
        warn!("dependency analysis failed for {}: {}", job_name, e);
        DependencyAnalysis::default()
    });

    let recommendations = recommender::generate(preliminary, &code, &performance, &dependencies);

    DeepAnalysisResult {
        job_name: preliminary.job_name.clone(),
        timestamp: Utc::now(),
        preliminary: preliminary.clone(),
        code,
        performance,
        dependencies,
        recommendations,
        duration_secs: started.elapsed().as_secs_f64(),
    }
}

/// Deep-scan the jobs the preliminary pass flagged, or every job when
/// `all` is set. Jobs run sequentially; each job fans out internally.
pub async fn deep_scan(
    provider: &GlueProvider,
    preliminary: &[JobAnalysisResult],
    all: bool,
) -> Vec<DeepAnalysisResult> {
    let candidates: Vec<&JobAnalysisResult> = preliminary
        .iter()
        .filter(|r| all || r.deep_scan_reasons.any())
        .collect();

    let mut results = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "  [{}/{}] deep-scanning {}",
            i + 1,
            candidates.len(),
            candidate.job_name
        );
        results.push(analyze_deep(provider, candidate).await);
    }
    results
}
