use std::collections::BTreeSet;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::{DataLineage, DependencyAnalysis, JobAnalysisResult, TriggerInfo};
use crate::provider::glue::GlueProvider;

static INPUT_S3_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"\.read\b.*?["'](s3a?://[^"']+)["']"#).unwrap(),
        Regex::new(r#""paths"\s*:\s*\[\s*["'](s3a?://[^"']+)["']"#).unwrap(),
    ]
});

static INPUT_TABLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"\.table\(\s*["']([^"']+)["']\s*\)"#).unwrap(),
        Regex::new(r"(?i)\bfrom\s+([a-z_][\w]*\.[a-z_][\w]*)").unwrap(),
    ]
});

static JDBC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["'](jdbc:[^"']+)["']"#).unwrap());

static OUTPUT_S3_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"\.write\b.*?["'](s3a?://[^"']+)["']"#).unwrap(),
        Regex::new(r#"\.save\(\s*["'](s3a?://[^"']+)["']"#).unwrap(),
        Regex::new(r#"\.option\(\s*["']path["']\s*,\s*["'](s3a?://[^"']+)["']"#).unwrap(),
    ]
});

static OUTPUT_TABLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"\.saveAsTable\(\s*["']([^"']+)["']"#).unwrap(),
        Regex::new(r#"\.insertInto\(\s*["']([^"']+)["']"#).unwrap(),
        Regex::new(r"(?i)\bcreate\s+table\s+(?:if\s+not\s+exists\s+)?([a-z_][\w.]*)").unwrap(),
    ]
});

/// Data-flow and trigger relationships for one job. Script and trigger
/// failures degrade to an empty analysis rather than aborting.
pub async fn analyze(
    provider: &GlueProvider,
    preliminary: &JobAnalysisResult,
) -> Result<DependencyAnalysis> {
    let job_name = &preliminary.job_name;

    let script = match preliminary.config.script_location.as_deref() {
        Some(location) if !location.is_empty() && location != "unknown" => {
            match provider.download_script(location).await {
                Ok(script) => script,
                Err(e) => {
                    warn!("could not download script for {}: {}", job_name, e);
                    String::new()
                }
            }
        }
        _ => String::new(),
    };

    let triggers = match provider.list_triggers().await {
        Ok(triggers) => triggers,
        Err(e) => {
            warn!("could not list triggers for {}: {}", job_name, e);
            Vec::new()
        }
    };

    Ok(build_analysis(job_name, &script, &triggers))
}

pub fn build_analysis(job_name: &str, script: &str, triggers: &[TriggerInfo]) -> DependencyAnalysis {
    let input_sources = extract_input_sources(script);
    let output_destinations = extract_output_destinations(script);
    let (upstream_jobs, downstream_jobs) = trigger_relationships(job_name, triggers);
    let schedule_conflicts = schedule_conflicts(job_name, triggers);
    let lineage = build_lineage(&input_sources, &output_destinations);

    DependencyAnalysis {
        input_sources,
        output_destinations,
        upstream_jobs,
        downstream_jobs,
        schedule_conflicts,
        lineage,
    }
}

pub fn extract_input_sources(script: &str) -> Vec<String> {
    let mut sources = BTreeSet::new();

    for pattern in INPUT_S3_PATTERNS.iter() {
        for cap in pattern.captures_iter(script) {
            sources.insert(cap[1].to_string());
        }
    }
    for pattern in INPUT_TABLE_PATTERNS.iter() {
        for cap in pattern.captures_iter(script) {
            sources.insert(format!("glue_catalog:{}", &cap[1]));
        }
    }
    for cap in JDBC_PATTERN.captures_iter(script) {
        sources.insert(cap[1].to_string());
    }

    sources.into_iter().collect()
}

pub fn extract_output_destinations(script: &str) -> Vec<String> {
    let mut destinations = BTreeSet::new();

    for pattern in OUTPUT_S3_PATTERNS.iter() {
        for cap in pattern.captures_iter(script) {
            destinations.insert(cap[1].to_string());
        }
    }
    for pattern in OUTPUT_TABLE_PATTERNS.iter() {
        for cap in pattern.captures_iter(script) {
            destinations.insert(format!("glue_catalog:{}", &cap[1]));
        }
    }

    destinations.into_iter().collect()
}

/// Upstream jobs come from triggers that start this job on job-completion
/// conditions; downstream jobs from triggers this job's completion fires.
pub fn trigger_relationships(
    job_name: &str,
    triggers: &[TriggerInfo],
) -> (Vec<String>, Vec<String>) {
    let mut upstream = BTreeSet::new();
    let mut downstream = BTreeSet::new();

    for trigger in triggers {
        if trigger.action_jobs.iter().any(|j| j == job_name) {
            upstream.extend(trigger.upstream_jobs.iter().cloned());
        }
        if trigger.upstream_jobs.iter().any(|j| j == job_name) {
            downstream.extend(trigger.action_jobs.iter().cloned());
        }
    }

    upstream.remove(job_name);
    downstream.remove(job_name);
    (upstream.into_iter().collect(), downstream.into_iter().collect())
}

pub fn schedule_conflicts(job_name: &str, triggers: &[TriggerInfo]) -> Vec<String> {
    let scheduled: Vec<&TriggerInfo> = triggers
        .iter()
        .filter(|t| t.schedule.is_some() && t.action_jobs.iter().any(|j| j == job_name))
        .collect();

    if scheduled.len() > 1 {
        vec![format!(
            "Multiple schedules found for the same job: {}",
            scheduled
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )]
    } else {
        Vec::new()
    }
}

fn classify_source(source: &str) -> &'static str {
    if source.starts_with("s3://") || source.starts_with("s3a://") {
        "s3"
    } else if source.starts_with("glue_catalog:") {
        "glue_catalog"
    } else if source.starts_with("jdbc:") {
        "jdbc"
    } else {
        "other"
    }
}

pub fn build_lineage(inputs: &[String], outputs: &[String]) -> DataLineage {
    let mut lineage = DataLineage::default();

    for input in inputs {
        *lineage
            .input_types
            .entry(classify_source(input).to_string())
            .or_insert(0) += 1;
    }
    for output in outputs {
        *lineage
            .output_types
            .entry(classify_source(output).to_string())
            .or_insert(0) += 1;
    }

    lineage.transformation_complexity = match (inputs.len(), outputs.len()) {
        (0, 0) => "unknown".to_string(),
        (i, o) if i <= 1 && o <= 1 => "simple".to_string(),
        (i, o) if i <= 3 && o <= 3 => "moderate".to_string(),
        _ => "complex".to_string(),
    };

    lineage
}
