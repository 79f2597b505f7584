use std::collections::HashMap;

use chrono::{Duration, Utc};
use gluescope_core::cost::{self, WorkerRates};
use gluescope_core::deep::{code, dependencies, recommender};
use gluescope_core::inventory::{categorizer, quick_code};
use gluescope_core::model::{
    DeepScanReasons, JobAnalysisResult, JobCategory, JobConfigSummary, JobDetail, JobRun,
    PerformanceAnalysis, TriggerInfo,
};
use gluescope_core::report::{self, ReportWriter, ScanReport};
use gluescope_core::tags;

const SCRIPT: &str = r#"
import sys
from awsglue.context import GlueContext
from pyspark.sql import functions as F

df = spark.read.parquet("s3://lake/raw/orders/")
rates = spark.read.table("reference.fx_rates")

if df.count() > 0:
    joined = df.join(rates, "currency")
    totals = spark.sql("SELECT region, sum(total) FROM sales.orders GROUP BY region")
    for row in joined.collect():
        print(row)

joined.write.mode("overwrite").parquet("s3://lake/curated/orders/")
"#;

fn job_detail(name: &str, last_run_days_ago: Option<i64>) -> (JobDetail, Vec<JobRun>) {
    let now = Utc::now();
    let detail = JobDetail {
        name: name.to_string(),
        created_on: Some(now - Duration::days(365)),
        glue_version: Some("2.0".to_string()),
        worker_type: Some("G.2X".to_string()),
        number_of_workers: Some(10),
        script_location: Some("s3://scripts/orders.py".to_string()),
        default_arguments: HashMap::from([(
            "--tag-Environment".to_string(),
            "Production".to_string(),
        )]),
        ..Default::default()
    };
    let runs = match last_run_days_ago {
        Some(days) => vec![JobRun {
            state: "SUCCEEDED".to_string(),
            started_on: Some(now - Duration::days(days)),
            completed_on: Some(now - Duration::days(days)),
            execution_seconds: 3600,
        }],
        None => Vec::new(),
    };
    (detail, runs)
}

fn analyze(name: &str, last_run_days_ago: Option<i64>) -> JobAnalysisResult {
    let (detail, runs) = job_detail(name, last_run_days_ago);
    let rates = WorkerRates::default();

    let idle = categorizer::categorize_by_idle_time(&detail, &runs);
    let cost = cost::quick_estimate(&rates, &detail, &runs);
    let tag_info = tags::extract_tags_info(&detail);
    let code = quick_code::quick_code_analysis(&detail);
    let reasons = categorizer::deep_scan_reasons(&detail, &cost, &idle, &code, &tag_info);

    JobAnalysisResult {
        job_name: detail.name.clone(),
        timestamp: Utc::now(),
        config: JobConfigSummary::from_detail(&detail),
        idle,
        cost,
        tags: tag_info,
        code,
        recent_runs: runs.len(),
        deep_scan_reasons: reasons,
    }
}

#[test]
fn preliminary_pipeline_flags_abandoned_expensive_job() {
    let result = analyze("orders-etl", Some(120));

    assert_eq!(result.idle.category, JobCategory::Abandoned);
    // 10 G.2X workers at $0.88/DPU-hour, 1h daily-average run: well past
    // the inactive-expensive threshold.
    assert!(result.cost.monthly_brl > 100.0);
    assert!(result.deep_scan_reasons.inactive_expensive);
    assert_eq!(result.tags.environment, "production");
    assert_eq!(result.code.inferred_purpose, "ETL Pipeline");
}

#[test]
fn never_run_job_is_critical() {
    let result = analyze("etl-tmp-loader", None);

    assert_eq!(result.idle.category, JobCategory::NeverRun);
    assert!(result.deep_scan_reasons.never_run);
    assert!(result.deep_scan_reasons.naming_issues);
    assert_eq!(result.cost.monthly_brl, 0.0);
}

#[test]
fn scan_report_summary_and_files() {
    let results = vec![
        analyze("orders-etl", Some(2)),
        analyze("orders-etl-old", Some(120)),
        analyze("etl-scratch", None),
    ];

    let report = ScanReport::preliminary("us-east-1", results);
    assert_eq!(report.summary.total_jobs, 3);
    assert!(report.summary.deep_scan_candidates >= 2);
    assert!(report.summary.reclaimable_monthly_brl >= 0.0);

    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path());
    let json_path = writer.write_preliminary_json(&report).unwrap();
    let csv_path = writer.write_inventory_csv(&report.results).unwrap();

    let reparsed: ScanReport =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(reparsed.summary.total_jobs, 3);

    let csv_text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv_text.lines().count(), 4);
    assert!(csv_text.contains("orders-etl"));

    let md = report::format_markdown_report(&report);
    assert!(md.contains("| Jobs | 3 |"));
}

#[test]
fn deep_pipeline_produces_recommendations() {
    let preliminary = analyze("orders-etl", Some(120));

    let code_analysis = code::analyze_script(SCRIPT);
    assert!(code_analysis
        .performance_issues
        .iter()
        .any(|i| i.contains("collect()")));
    assert!(code_analysis.sql_query_count >= 1);

    let triggers = vec![
        TriggerInfo {
            name: "nightly".into(),
            schedule: Some("cron(0 2 * * ? *)".into()),
            action_jobs: vec!["orders-etl".into()],
            upstream_jobs: vec![],
        },
        TriggerInfo {
            name: "hourly".into(),
            schedule: Some("cron(0 * * * ? *)".into()),
            action_jobs: vec!["orders-etl".into()],
            upstream_jobs: vec![],
        },
    ];
    let deps = dependencies::build_analysis("orders-etl", SCRIPT, &triggers);
    assert!(deps
        .input_sources
        .contains(&"s3://lake/raw/orders/".to_string()));
    assert!(deps
        .output_destinations
        .contains(&"s3://lake/curated/orders/".to_string()));
    assert_eq!(deps.schedule_conflicts.len(), 1);

    let performance = PerformanceAnalysis {
        avg_cpu_utilization: Some(12.0),
        avg_memory_utilization: Some(15.0),
        efficiency_score: Some(9.0),
        ..Default::default()
    };

    let recs = recommender::generate(&preliminary, &code_analysis, &performance, &deps);
    assert!(!recs.items.is_empty());
    assert!(recs.priority_score > 0.0);
    assert!(recs
        .items
        .iter()
        .any(|r| r.category == "worker_downgrade" && r.title.contains("G.1X")));
    assert!(recs.items.iter().any(|r| r.category == "scheduling"));
    assert!(recs.items.iter().any(|r| r.category == "glue_version"));
    assert!(recs.estimated_savings_brl > 0.0);
}

#[test]
fn deep_scan_reasons_serialize_for_report_consumers() {
    let reasons = DeepScanReasons {
        high_cost: true,
        never_run: true,
        ..Default::default()
    };
    let json = serde_json::to_string(&reasons).unwrap();
    assert!(json.contains("\"high_cost\":true"));
    assert_eq!(reasons.active(), vec!["high_cost", "never_run"]);
}
