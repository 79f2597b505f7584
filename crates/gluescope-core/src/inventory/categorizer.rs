use chrono::{DateTime, Utc};

use crate::model::{
    CostEstimate, DeepScanReasons, IdleAnalysis, JobCategory, JobDetail, JobRun, Priority,
    QuickCodeAnalysis, TagsInfo,
};

const ACTIVE_MAX_DAYS: i64 = 7;
const RECENT_MAX_DAYS: i64 = 30;
const INACTIVE_MAX_DAYS: i64 = 90;

const HIGH_COST_BRL: f64 = 500.0;
const INACTIVE_COST_BRL: f64 = 100.0;

/// Bucket a job by how long it has been idle.
pub fn categorize_by_idle_time(detail: &JobDetail, runs: &[JobRun]) -> IdleAnalysis {
    categorize_at(Utc::now(), detail, runs)
}

/// Testable variant of [`categorize_by_idle_time`] with an explicit clock.
pub fn categorize_at(now: DateTime<Utc>, detail: &JobDetail, runs: &[JobRun]) -> IdleAnalysis {
    let last_run = runs
        .iter()
        .filter(|r| r.started_on.is_some())
        .max_by_key(|r| r.started_on);

    let Some(last_run) = last_run else {
        // Never executed: idle since creation.
        let days = detail
            .created_on
            .map(|created| (now - created).num_days())
            .unwrap_or(0);
        return IdleAnalysis {
            category: JobCategory::NeverRun,
            days_idle: days.max(0),
            priority: Priority::Critical,
            last_run_state: None,
        };
    };

    let started = last_run.started_on.unwrap_or(now);
    let days_idle = (now - started).num_days().max(0);

    let (category, priority) = if days_idle <= ACTIVE_MAX_DAYS {
        (JobCategory::Active, Priority::Low)
    } else if days_idle <= RECENT_MAX_DAYS {
        (JobCategory::Recent, Priority::Low)
    } else if days_idle <= INACTIVE_MAX_DAYS {
        (JobCategory::Inactive, Priority::Medium)
    } else {
        (JobCategory::Abandoned, Priority::High)
    };

    IdleAnalysis {
        category,
        days_idle,
        priority,
        last_run_state: Some(last_run.state.clone()),
    }
}

/// Decide whether a job deserves the slower deep scan, and why.
pub fn deep_scan_reasons(
    detail: &JobDetail,
    cost: &CostEstimate,
    idle: &IdleAnalysis,
    code: &QuickCodeAnalysis,
    tags: &TagsInfo,
) -> DeepScanReasons {
    DeepScanReasons {
        high_cost: cost.monthly_brl > HIGH_COST_BRL,
        inactive_expensive: matches!(
            idle.category,
            JobCategory::Abandoned | JobCategory::Inactive
        ) && cost.monthly_brl > INACTIVE_COST_BRL,
        never_run: idle.category == JobCategory::NeverRun,
        naming_issues: !code.naming_issues.is_empty(),
        dev_in_prod: matches!(tags.environment.as_str(), "dev" | "test")
            || detail.name.to_lowercase().contains("test"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn run_started(days_ago: i64, now: DateTime<Utc>, state: &str) -> JobRun {
        JobRun {
            state: state.into(),
            started_on: Some(now - Duration::days(days_ago)),
            completed_on: None,
            execution_seconds: 60,
        }
    }

    fn detail_created(days_ago: i64, now: DateTime<Utc>) -> JobDetail {
        JobDetail {
            name: "orders-load".into(),
            created_on: Some(now - Duration::days(days_ago)),
            ..Default::default()
        }
    }

    #[test]
    fn category_boundaries() {
        let now = Utc::now();
        let detail = detail_created(400, now);

        let cases = [
            (7, JobCategory::Active, Priority::Low),
            (8, JobCategory::Recent, Priority::Low),
            (30, JobCategory::Recent, Priority::Low),
            (31, JobCategory::Inactive, Priority::Medium),
            (90, JobCategory::Inactive, Priority::Medium),
            (91, JobCategory::Abandoned, Priority::High),
        ];
        for (days, category, priority) in cases {
            let idle = categorize_at(now, &detail, &[run_started(days, now, "SUCCEEDED")]);
            assert_eq!(idle.category, category, "at {} days", days);
            assert_eq!(idle.priority, priority, "at {} days", days);
            assert_eq!(idle.days_idle, days);
        }
    }

    #[test]
    fn never_run_is_critical_and_counts_from_creation() {
        let now = Utc::now();
        let idle = categorize_at(now, &detail_created(45, now), &[]);
        assert_eq!(idle.category, JobCategory::NeverRun);
        assert_eq!(idle.priority, Priority::Critical);
        assert_eq!(idle.days_idle, 45);
        assert!(idle.last_run_state.is_none());
    }

    #[test]
    fn most_recent_run_wins() {
        let now = Utc::now();
        let detail = detail_created(400, now);
        let runs = vec![
            run_started(60, now, "FAILED"),
            run_started(3, now, "SUCCEEDED"),
        ];
        let idle = categorize_at(now, &detail, &runs);
        assert_eq!(idle.category, JobCategory::Active);
        assert_eq!(idle.last_run_state.as_deref(), Some("SUCCEEDED"));
    }

    #[test]
    fn deep_scan_flags() {
        let now = Utc::now();
        let detail = JobDetail {
            name: "billing-test-load".into(),
            ..detail_created(400, now)
        };
        let idle = categorize_at(now, &detail, &[run_started(120, now, "SUCCEEDED")]);
        let cost = CostEstimate {
            hourly_usd: 1.0,
            monthly_usd: 40.0,
            monthly_brl: 208.0,
        };
        let code = QuickCodeAnalysis {
            naming_issues: vec!["Development/test pattern 'test' found in job name".into()],
            ..Default::default()
        };
        let reasons = deep_scan_reasons(&detail, &cost, &idle, &code, &TagsInfo::default());

        assert!(!reasons.high_cost);
        assert!(reasons.inactive_expensive);
        assert!(reasons.naming_issues);
        assert!(reasons.dev_in_prod);
        assert!(!reasons.never_run);
        assert!(reasons.any());
    }
}
