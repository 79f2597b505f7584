use crate::model::{JobDetail, QuickCodeAnalysis};
use crate::validate;

/// Classify a job from metadata alone, without downloading its script.
pub fn quick_code_analysis(detail: &JobDetail) -> QuickCodeAnalysis {
    let script_location = detail.script_location.clone().unwrap_or_default();

    QuickCodeAnalysis {
        has_script: !script_location.is_empty(),
        script_location,
        inferred_purpose: infer_purpose(&detail.name).to_string(),
        naming_issues: validate::job_name_issues(&detail.name),
    }
}

/// Guess what a job does from keywords in its name.
pub fn infer_purpose(job_name: &str) -> &'static str {
    let name = job_name.to_lowercase();
    let contains_any = |terms: &[&str]| terms.iter().any(|t| name.contains(t));

    if contains_any(&["etl", "extract", "transform", "load", "pipeline"]) {
        "ETL Pipeline"
    } else if contains_any(&["report", "analytics", "agg", "dashboard", "metric"]) {
        "Analytics/Reporting"
    } else if contains_any(&["clean", "quality", "validate", "check", "audit"]) {
        "Data Quality"
    } else if contains_any(&["test", "dev", "temp", "tmp", "debug", "sample"]) {
        "Development/Testing"
    } else if contains_any(&["model", "train", "predict", "ml", "ai", "feature"]) {
        "Machine Learning"
    } else if contains_any(&["migrate", "migration", "import", "export", "sync"]) {
        "Data Migration"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_inference() {
        assert_eq!(infer_purpose("daily-orders-etl"), "ETL Pipeline");
        assert_eq!(infer_purpose("revenue_dashboard_agg"), "Analytics/Reporting");
        assert_eq!(infer_purpose("customer-data-quality"), "Data Quality");
        assert_eq!(infer_purpose("scratch-debug-job"), "Development/Testing");
        assert_eq!(infer_purpose("churn-model-train"), "Machine Learning");
        assert_eq!(infer_purpose("legacy-db-migration"), "Data Migration");
        assert_eq!(infer_purpose("mystery-job"), "Unknown");
    }

    #[test]
    fn etl_takes_precedence_over_later_buckets() {
        // "load" matches ETL before "test" would match dev patterns.
        assert_eq!(infer_purpose("load-test-data"), "ETL Pipeline");
    }

    #[test]
    fn analysis_carries_script_presence() {
        let detail = JobDetail {
            name: "orders-load".into(),
            script_location: Some("s3://scripts/orders.py".into()),
            ..Default::default()
        };
        let analysis = quick_code_analysis(&detail);
        assert!(analysis.has_script);
        assert_eq!(analysis.script_location, "s3://scripts/orders.py");
        assert!(analysis.naming_issues.is_empty());

        let no_script = quick_code_analysis(&JobDetail {
            name: "orders-load".into(),
            ..Default::default()
        });
        assert!(!no_script.has_script);
    }
}
