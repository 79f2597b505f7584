use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{DeepAnalysisResult, JobAnalysisResult};

const TOP_CANDIDATES: usize = 20;

/// Aggregate numbers for a preliminary scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_jobs: usize,
    pub category_counts: BTreeMap<String, usize>,
    pub total_monthly_cost_brl: f64,
    pub reclaimable_monthly_brl: f64,
    pub potential_savings_pct: f64,
    pub deep_scan_candidates: usize,
    pub top_candidates: Vec<CandidateSummary>,
}

/// One flagged job in the candidate shortlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub job_name: String,
    pub category: String,
    pub monthly_cost_brl: f64,
    pub reasons: Vec<String>,
}

/// The complete preliminary scan report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub analysis_type: String,
    pub provider: String,
    pub region: String,
    pub timestamp: DateTime<Utc>,
    pub summary: ScanSummary,
    pub results: Vec<JobAnalysisResult>,
}

impl ScanReport {
    pub fn preliminary(region: &str, results: Vec<JobAnalysisResult>) -> Self {
        Self {
            analysis_type: "preliminary".to_string(),
            provider: "aws_glue".to_string(),
            region: region.to_string(),
            timestamp: Utc::now(),
            summary: summarize(&results),
            results,
        }
    }
}

/// Build the scan summary from per-job results.
pub fn summarize(results: &[JobAnalysisResult]) -> ScanSummary {
    let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_monthly = 0.0;
    let mut reclaimable = 0.0;

    for result in results {
        *category_counts
            .entry(result.idle.category.label().to_string())
            .or_insert(0) += 1;
        total_monthly += result.cost.monthly_brl;
        if result.idle.category.is_reclaimable() {
            reclaimable += result.cost.monthly_brl;
        }
    }

    let potential_savings_pct = if total_monthly > 0.0 {
        reclaimable / total_monthly * 100.0
    } else {
        0.0
    };

    let mut candidates: Vec<&JobAnalysisResult> = results
        .iter()
        .filter(|r| r.deep_scan_reasons.any())
        .collect();
    candidates.sort_by(|a, b| {
        b.cost
            .monthly_brl
            .partial_cmp(&a.cost.monthly_brl)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top_candidates = candidates
        .iter()
        .take(TOP_CANDIDATES)
        .map(|r| CandidateSummary {
            job_name: r.job_name.clone(),
            category: r.idle.category.label().to_string(),
            monthly_cost_brl: r.cost.monthly_brl,
            reasons: r
                .deep_scan_reasons
                .active()
                .into_iter()
                .map(String::from)
                .collect(),
        })
        .collect();

    ScanSummary {
        total_jobs: results.len(),
        category_counts,
        total_monthly_cost_brl: total_monthly,
        reclaimable_monthly_brl: reclaimable,
        potential_savings_pct,
        deep_scan_candidates: candidates.len(),
        top_candidates,
    }
}

/// Writes timestamped report files into an output directory.
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    fn prepare(&self, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating output directory {}", self.out_dir.display()))?;
        Ok(self.out_dir.join(file_name))
    }

    fn stamp() -> String {
        Utc::now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Full preliminary report as pretty-printed JSON.
    pub fn write_preliminary_json(&self, report: &ScanReport) -> Result<PathBuf> {
        let path = self.prepare(&format!("preliminary_analysis_{}.json", Self::stamp()))?;
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Flat one-row-per-job inventory for spreadsheet triage.
    pub fn write_inventory_csv(&self, results: &[JobAnalysisResult]) -> Result<PathBuf> {
        let path = self.prepare(&format!("jobs_inventory_{}.csv", Self::stamp()))?;
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;

        writer.write_record([
            "job_name",
            "category",
            "days_idle",
            "priority",
            "monthly_cost_brl",
            "worker_type",
            "environment",
            "team",
            "inferred_purpose",
            "deep_analysis_recommended",
            "reasons",
        ])?;

        for result in results {
            writer.write_record([
                result.job_name.as_str(),
                result.idle.category.label(),
                &result.idle.days_idle.to_string(),
                result.idle.priority.label(),
                &format!("{:.2}", result.cost.monthly_brl),
                result.config.worker_type.as_deref().unwrap_or("unknown"),
                result.tags.environment.as_str(),
                result.tags.team.as_str(),
                result.code.inferred_purpose.as_str(),
                if result.deep_scan_reasons.any() { "yes" } else { "no" },
                &result.deep_scan_reasons.active().join("; "),
            ])?;
        }

        writer.flush()?;
        Ok(path)
    }

    /// Plain-text shortlist of jobs worth a deep scan.
    pub fn write_candidates_txt(&self, report: &ScanReport) -> Result<PathBuf> {
        let path = self.prepare(&format!("deep_analysis_candidates_{}.txt", Self::stamp()))?;
        let mut text = String::new();
        text.push_str(&format!(
            "Deep analysis candidates — {} region, {} jobs flagged\n\n",
            report.region, report.summary.deep_scan_candidates
        ));
        for candidate in &report.summary.top_candidates {
            text.push_str(&format!(
                "{} [{}] R$ {:.2}/month — {}\n",
                candidate.job_name,
                candidate.category,
                candidate.monthly_cost_brl,
                candidate.reasons.join(", ")
            ));
        }
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Deep scan results as pretty-printed JSON.
    pub fn write_deep_json(&self, results: &[DeepAnalysisResult]) -> Result<PathBuf> {
        let path = self.prepare(&format!("deep_analysis_{}.json", Self::stamp()))?;
        let json = serde_json::to_string_pretty(results)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// Markdown rendering of the preliminary report.
pub fn format_markdown_report(report: &ScanReport) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# GlueScope Analysis — {} ({})\n\n",
        report.region,
        report.timestamp.format("%Y-%m-%d %H:%M UTC")
    ));

    md.push_str("## Inventory\n\n");
    md.push_str("| Metric | Value |\n|--------|-------|\n");
    md.push_str(&format!("| Jobs | {} |\n", report.summary.total_jobs));
    md.push_str(&format!(
        "| Monthly Cost | R$ {:.2} |\n",
        report.summary.total_monthly_cost_brl
    ));
    md.push_str(&format!(
        "| Reclaimable | R$ {:.2} ({:.1}%) |\n",
        report.summary.reclaimable_monthly_brl, report.summary.potential_savings_pct
    ));
    md.push_str(&format!(
        "| Deep Scan Candidates | {} |\n\n",
        report.summary.deep_scan_candidates
    ));

    md.push_str("## Categories\n\n");
    md.push_str("| Category | Jobs |\n|----------|------|\n");
    for (category, count) in &report.summary.category_counts {
        md.push_str(&format!("| {} | {} |\n", category, count));
    }
    md.push('\n');

    if report.summary.top_candidates.is_empty() {
        md.push_str("## Candidates\n\nNo jobs were flagged for deep analysis.\n");
    } else {
        md.push_str("## Candidates\n\n");
        md.push_str("| Job | Category | Monthly Cost | Reasons |\n");
        md.push_str("|-----|----------|--------------|--------|\n");
        for candidate in &report.summary.top_candidates {
            md.push_str(&format!(
                "| {} | {} | R$ {:.2} | {} |\n",
                candidate.job_name,
                candidate.category,
                candidate.monthly_cost_brl,
                candidate.reasons.join(", ")
            ));
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CostEstimate, DeepScanReasons, IdleAnalysis, JobCategory, JobConfigSummary, Priority,
        QuickCodeAnalysis, TagsInfo,
    };

    fn result(name: &str, category: JobCategory, monthly_brl: f64, flagged: bool) -> JobAnalysisResult {
        JobAnalysisResult {
            job_name: name.into(),
            timestamp: Utc::now(),
            config: JobConfigSummary::default(),
            idle: IdleAnalysis {
                category,
                days_idle: 10,
                priority: Priority::Low,
                last_run_state: None,
            },
            cost: CostEstimate {
                hourly_usd: 1.0,
                monthly_usd: monthly_brl / 5.2,
                monthly_brl,
            },
            tags: TagsInfo::default(),
            code: QuickCodeAnalysis::default(),
            recent_runs: 1,
            deep_scan_reasons: DeepScanReasons {
                high_cost: flagged,
                ..Default::default()
            },
        }
    }

    #[test]
    fn summary_counts_and_savings() {
        let results = vec![
            result("a", JobCategory::Active, 100.0, false),
            result("b", JobCategory::Abandoned, 300.0, true),
            result("c", JobCategory::NeverRun, 100.0, false),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.category_counts.get("ACTIVE"), Some(&1));
        assert_eq!(summary.total_monthly_cost_brl, 500.0);
        assert_eq!(summary.reclaimable_monthly_brl, 400.0);
        assert!((summary.potential_savings_pct - 80.0).abs() < 1e-6);
        assert_eq!(summary.deep_scan_candidates, 1);
        assert_eq!(summary.top_candidates[0].job_name, "b");
    }

    #[test]
    fn candidates_sorted_by_cost() {
        let results = vec![
            result("cheap", JobCategory::Active, 50.0, true),
            result("pricey", JobCategory::Active, 900.0, true),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.top_candidates[0].job_name, "pricey");
        assert_eq!(summary.top_candidates[1].job_name, "cheap");
    }

    #[test]
    fn json_report_round_trips() {
        let report = ScanReport::preliminary(
            "us-east-1",
            vec![result("a", JobCategory::Active, 100.0, true)],
        );
        let json = serde_json::to_string(&report).unwrap();
        let parsed: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.analysis_type, "preliminary");
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.summary.deep_scan_candidates, 1);
    }

    #[test]
    fn writer_creates_timestamped_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let report = ScanReport::preliminary(
            "us-east-1",
            vec![result("a", JobCategory::Abandoned, 600.0, true)],
        );

        let json_path = writer.write_preliminary_json(&report).unwrap();
        assert!(json_path.exists());
        assert!(json_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("preliminary_analysis_"));

        let csv_path = writer.write_inventory_csv(&report.results).unwrap();
        let csv_text = fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.starts_with("job_name,category"));
        assert!(csv_text.contains("high_cost"));

        let txt_path = writer.write_candidates_txt(&report).unwrap();
        let txt = fs::read_to_string(&txt_path).unwrap();
        assert!(txt.contains("a [ABANDONED] R$ 600.00/month"));
    }

    #[test]
    fn markdown_lists_candidates() {
        let report = ScanReport::preliminary(
            "sa-east-1",
            vec![result("orders-etl", JobCategory::Inactive, 700.0, true)],
        );
        let md = format_markdown_report(&report);
        assert!(md.contains("# GlueScope Analysis — sa-east-1"));
        assert!(md.contains("| orders-etl | INACTIVE | R$ 700.00 |"));
    }
}
