use once_cell::sync::Lazy;
use regex::Regex;

static NAME_CONVENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("valid regex"));
static REGION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}-[a-z]+-\d+$").expect("valid regex"));
static S3_PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^s3://[a-z0-9.-]+/.+$").expect("valid regex"));

const DEV_PATTERNS: &[&str] = &["test", "tmp", "temp", "dev", "debug", "sample"];

/// Check a job name against naming conventions, returning every issue found.
pub fn job_name_issues(job_name: &str) -> Vec<String> {
    let mut issues = Vec::new();

    if job_name.len() < 3 {
        issues.push("Job name too short (less than 3 characters)".to_string());
    }
    if job_name.len() > 255 {
        issues.push("Job name too long (more than 255 characters)".to_string());
    }

    let name_lower = job_name.to_lowercase();
    for pattern in DEV_PATTERNS {
        if name_lower.contains(pattern) {
            issues.push(format!(
                "Development/test pattern '{}' found in job name",
                pattern
            ));
        }
    }

    if !NAME_CONVENTION.is_match(job_name) {
        issues.push(
            "Job name doesn't follow standard naming convention (should start with \
             letter, contain only letters, numbers, underscores, hyphens)"
                .to_string(),
        );
    }

    if job_name.contains(' ') {
        issues.push("Job name contains spaces".to_string());
    }

    issues
}

pub fn is_valid_region(region: &str) -> bool {
    REGION_PATTERN.is_match(region)
}

pub fn is_valid_s3_path(path: &str) -> bool {
    S3_PATH_PATTERN.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_has_no_issues() {
        assert!(job_name_issues("sales-daily-aggregation").is_empty());
    }

    #[test]
    fn dev_pattern_flagged() {
        let issues = job_name_issues("etl_test_orders");
        assert!(issues.iter().any(|i| i.contains("'test'")));
    }

    #[test]
    fn short_name_and_spaces_flagged() {
        let issues = job_name_issues("a b");
        assert!(issues.iter().any(|i| i.contains("too short")));
        assert!(issues.iter().any(|i| i.contains("spaces")));
    }

    #[test]
    fn leading_digit_breaks_convention() {
        let issues = job_name_issues("1-load-orders");
        assert!(issues.iter().any(|i| i.contains("naming convention")));
    }

    #[test]
    fn region_validation() {
        assert!(is_valid_region("us-east-1"));
        assert!(is_valid_region("eu-west-3"));
        assert!(!is_valid_region("useast1"));
        assert!(!is_valid_region("US-EAST-1"));
    }

    #[test]
    fn s3_path_validation() {
        assert!(is_valid_s3_path("s3://my-bucket/scripts/job.py"));
        assert!(!is_valid_s3_path("s3://bucket-only"));
        assert!(!is_valid_s3_path("https://bucket/key"));
    }
}
