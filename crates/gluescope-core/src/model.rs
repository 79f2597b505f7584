use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle bucket derived from days since the last run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobCategory {
    Active,
    Recent,
    Inactive,
    Abandoned,
    NeverRun,
}

impl JobCategory {
    pub fn label(&self) -> &'static str {
        match self {
            JobCategory::Active => "ACTIVE",
            JobCategory::Recent => "RECENT",
            JobCategory::Inactive => "INACTIVE",
            JobCategory::Abandoned => "ABANDONED",
            JobCategory::NeverRun => "NEVER_RUN",
        }
    }

    /// Categories that represent wasted spend if the job keeps existing.
    pub fn is_reclaimable(&self) -> bool {
        matches!(self, JobCategory::Abandoned | JobCategory::NeverRun)
    }
}

/// How urgently a job deserves attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Critical => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

/// A Glue job definition, mapped out of the SDK response.
#[derive(Debug, Clone, Default)]
pub struct JobDetail {
    pub name: String,
    pub description: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub glue_version: Option<String>,
    pub worker_type: Option<String>,
    pub number_of_workers: Option<i32>,
    pub max_capacity: Option<f64>,
    pub timeout_minutes: Option<i32>,
    pub max_retries: i32,
    pub execution_class: Option<String>,
    pub command_name: Option<String>,
    pub script_location: Option<String>,
    pub default_arguments: HashMap<String, String>,
}

/// A single historical execution of a job.
#[derive(Debug, Clone)]
pub struct JobRun {
    pub state: String,
    pub started_on: Option<DateTime<Utc>>,
    pub completed_on: Option<DateTime<Utc>>,
    pub execution_seconds: i32,
}

impl JobRun {
    pub fn succeeded(&self) -> bool {
        self.state == "SUCCEEDED"
    }
}

/// Job configuration fields carried into reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfigSummary {
    pub glue_version: Option<String>,
    pub worker_type: Option<String>,
    pub number_of_workers: Option<i32>,
    pub max_capacity: Option<f64>,
    pub timeout_minutes: Option<i32>,
    pub max_retries: i32,
    pub execution_class: Option<String>,
    pub script_location: Option<String>,
}

impl JobConfigSummary {
    pub fn from_detail(detail: &JobDetail) -> Self {
        Self {
            glue_version: detail.glue_version.clone(),
            worker_type: detail.worker_type.clone(),
            number_of_workers: detail.number_of_workers,
            max_capacity: detail.max_capacity,
            timeout_minutes: detail.timeout_minutes,
            max_retries: detail.max_retries,
            execution_class: detail.execution_class.clone(),
            script_location: detail.script_location.clone(),
        }
    }
}

/// Idleness classification for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleAnalysis {
    pub category: JobCategory,
    pub days_idle: i64,
    pub priority: Priority,
    pub last_run_state: Option<String>,
}

/// Quick cost projection from the static rate table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostEstimate {
    pub hourly_usd: f64,
    pub monthly_usd: f64,
    pub monthly_brl: f64,
}

/// Ownership metadata pulled from tags and tag-style default arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsInfo {
    pub environment: String,
    pub team: String,
    pub business_domain: String,
    pub criticality: String,
    pub owner: String,
}

impl Default for TagsInfo {
    fn default() -> Self {
        let unknown = || "unknown".to_string();
        Self {
            environment: unknown(),
            team: unknown(),
            business_domain: unknown(),
            criticality: unknown(),
            owner: unknown(),
        }
    }
}

/// Metadata-only code classification (no script download).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickCodeAnalysis {
    pub has_script: bool,
    pub script_location: String,
    pub inferred_purpose: String,
    pub naming_issues: Vec<String>,
}

/// Why a job was flagged for the deep scan pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeepScanReasons {
    pub high_cost: bool,
    pub inactive_expensive: bool,
    pub never_run: bool,
    pub naming_issues: bool,
    pub dev_in_prod: bool,
}

impl DeepScanReasons {
    pub fn any(&self) -> bool {
        self.high_cost
            || self.inactive_expensive
            || self.never_run
            || self.naming_issues
            || self.dev_in_prod
    }

    pub fn active(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.high_cost {
            reasons.push("high_cost");
        }
        if self.inactive_expensive {
            reasons.push("inactive_expensive");
        }
        if self.never_run {
            reasons.push("never_run");
        }
        if self.naming_issues {
            reasons.push("naming_issues");
        }
        if self.dev_in_prod {
            reasons.push("dev_in_prod");
        }
        reasons
    }
}

/// Everything the preliminary scan learns about one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAnalysisResult {
    pub job_name: String,
    pub timestamp: DateTime<Utc>,
    pub config: JobConfigSummary,
    pub idle: IdleAnalysis,
    pub cost: CostEstimate,
    pub tags: TagsInfo,
    pub code: QuickCodeAnalysis,
    pub recent_runs: usize,
    pub deep_scan_reasons: DeepScanReasons,
}

/// Static signals extracted from a downloaded job script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub script_excerpt: Option<String>,
    pub script_size_kb: f64,
    pub complexity_score: u32,
    pub dependencies: Vec<String>,
    pub sql_query_count: usize,
    pub spark_operations: Vec<String>,
    pub performance_issues: Vec<String>,
    pub security_issues: Vec<String>,
    pub best_practice_violations: Vec<String>,
}

/// Aggregate timing statistics over recent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub avg_seconds: f64,
    pub min_seconds: i32,
    pub max_seconds: i32,
    pub variability_pct: f64,
    pub runs_analyzed: usize,
}

/// CloudWatch-backed utilization and throughput analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceAnalysis {
    pub avg_cpu_utilization: Option<f64>,
    pub avg_memory_utilization: Option<f64>,
    pub data_processed_gb: f64,
    pub cost_per_gb_brl: Option<f64>,
    pub efficiency_score: Option<f64>,
    pub execution_stats: Option<ExecutionStats>,
    pub bottlenecks: Vec<String>,
    pub optimization_opportunities: Vec<String>,
}

/// Source/destination counts by connector kind.
pub type SourceKindCounts = BTreeMap<String, usize>;

/// Coarse input/output shape of the transformation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataLineage {
    pub input_types: SourceKindCounts,
    pub output_types: SourceKindCounts,
    pub transformation_complexity: String,
}

/// Data-flow and orchestration relationships for a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyAnalysis {
    pub input_sources: Vec<String>,
    pub output_destinations: Vec<String>,
    pub upstream_jobs: Vec<String>,
    pub downstream_jobs: Vec<String>,
    pub schedule_conflicts: Vec<String>,
    pub lineage: DataLineage,
}

/// A Glue trigger reduced to what dependency analysis needs.
#[derive(Debug, Clone)]
pub struct TriggerInfo {
    pub name: String,
    pub schedule: Option<String>,
    pub action_jobs: Vec<String>,
    pub upstream_jobs: Vec<String>,
}

/// Broad grouping for a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationKind {
    CostOptimization,
    Performance,
    Architecture,
    Modernization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    pub fn label(&self) -> &'static str {
        match self {
            Effort::Low => "LOW",
            Effort::Medium => "MEDIUM",
            Effort::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Discount applied to projected savings when totalling.
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::High => 0.9,
            Confidence::Medium => 0.7,
            Confidence::Low => 0.5,
        }
    }
}

/// A single actionable recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub category: String,
    pub title: String,
    pub description: String,
    pub action: String,
    pub estimated_savings_brl: f64,
    pub effort: Effort,
    pub confidence: Confidence,
}

/// Merged and prioritized recommendation output for one job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    pub items: Vec<Recommendation>,
    pub suggestions: Vec<String>,
    pub cost_reduction_opportunities: Vec<String>,
    pub modernization: Vec<String>,
    pub risk_assessment: String,
    pub priority_score: f64,
    pub estimated_savings_brl: f64,
}

/// Result of the deep scan for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepAnalysisResult {
    pub job_name: String,
    pub timestamp: DateTime<Utc>,
    pub preliminary: JobAnalysisResult,
    pub code: CodeAnalysis,
    pub performance: PerformanceAnalysis,
    pub dependencies: DependencyAnalysis,
    pub recommendations: Recommendations,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_screaming_snake() {
        let json = serde_json::to_string(&JobCategory::NeverRun).unwrap();
        assert_eq!(json, "\"NEVER_RUN\"");
    }

    #[test]
    fn reclaimable_categories() {
        assert!(JobCategory::Abandoned.is_reclaimable());
        assert!(JobCategory::NeverRun.is_reclaimable());
        assert!(!JobCategory::Inactive.is_reclaimable());
    }

    #[test]
    fn deep_scan_reasons_roundtrip() {
        let reasons = DeepScanReasons {
            high_cost: true,
            dev_in_prod: true,
            ..Default::default()
        };
        assert!(reasons.any());
        assert_eq!(reasons.active(), vec!["high_cost", "dev_in_prod"]);
        assert!(!DeepScanReasons::default().any());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Critical.rank() > Priority::High.rank());
        assert!(Priority::High.rank() > Priority::Medium.rank());
    }
}
