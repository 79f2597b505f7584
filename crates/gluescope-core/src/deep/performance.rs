use log::warn;

use crate::error::Result;
use crate::model::{ExecutionStats, JobAnalysisResult, JobRun, PerformanceAnalysis};
use crate::provider::glue::GlueProvider;

const METRIC_WINDOW_DAYS: i64 = 30;
const DETAILED_RUNS: i32 = 20;

const TASK_METRIC: &str = "glue.driver.aggregate.numCompletedTasks";
const HEAP_METRIC: &str = "glue.driver.jvm.heap.usage";

/// CloudWatch-backed performance analysis for one job.
pub async fn analyze(
    provider: &GlueProvider,
    preliminary: &JobAnalysisResult,
) -> Result<PerformanceAnalysis> {
    let job_name = &preliminary.job_name;

    let (cpu, heap, runs) = tokio::join!(
        provider.metric_average(job_name, TASK_METRIC, METRIC_WINDOW_DAYS),
        provider.metric_average(job_name, HEAP_METRIC, METRIC_WINDOW_DAYS),
        provider.recent_runs(job_name, DETAILED_RUNS),
    );

    let cpu_util = cpu.unwrap_or_else(|e| {
        warn!("could not get task metrics for {}: {}", job_name, e);
        None
    });
    // Heap usage arrives as a 0..1 ratio; report it as a percentage.
    let memory_util = heap
        .unwrap_or_else(|e| {
            warn!("could not get heap metrics for {}: {}", job_name, e);
            None
        })
        .map(|v| v * 100.0);
    let runs = runs.unwrap_or_else(|e| {
        warn!("could not get detailed runs for {}: {}", job_name, e);
        Vec::new()
    });

    let worker_type = preliminary.config.worker_type.as_deref().unwrap_or("Standard");
    let data_gb = data_processed_gb(&runs, worker_type);
    let stats = execution_stats(&runs);
    let efficiency = efficiency_score(cpu_util, memory_util);
    let cost_per_gb = cost_per_gb(preliminary.cost.monthly_brl, data_gb);
    let bottlenecks = identify_bottlenecks(cpu_util, memory_util, stats.as_ref());
    let optimizations = suggest_optimizations(preliminary, cpu_util, memory_util, cost_per_gb);

    Ok(PerformanceAnalysis {
        avg_cpu_utilization: cpu_util,
        avg_memory_utilization: memory_util,
        data_processed_gb: data_gb,
        cost_per_gb_brl: cost_per_gb,
        efficiency_score: efficiency,
        execution_stats: stats,
        bottlenecks,
        optimization_opportunities: optimizations,
    })
}

/// Rough throughput assumption in bytes/second for each worker type.
fn throughput_bytes_per_second(worker_type: &str) -> f64 {
    let mb = 1024.0 * 1024.0;
    match worker_type {
        "G.1X" => 10.0 * mb,
        "G.2X" => 20.0 * mb,
        "G.4X" => 40.0 * mb,
        _ => 5.0 * mb,
    }
}

/// Estimate total data processed across successful runs from run duration
/// and the worker type's assumed throughput.
pub fn data_processed_gb(runs: &[JobRun], worker_type: &str) -> f64 {
    let throughput = throughput_bytes_per_second(worker_type);
    let total_bytes: f64 = runs
        .iter()
        .filter(|r| r.succeeded())
        .map(|r| r.execution_seconds as f64 * throughput)
        .sum();
    total_bytes / (1024.0_f64.powi(3))
}

/// Timing statistics over runs that report an execution time.
pub fn execution_stats(runs: &[JobRun]) -> Option<ExecutionStats> {
    let times: Vec<i32> = runs
        .iter()
        .map(|r| r.execution_seconds)
        .filter(|t| *t > 0)
        .collect();
    if times.is_empty() {
        return None;
    }

    let avg = times.iter().map(|t| *t as f64).sum::<f64>() / times.len() as f64;
    let min = *times.iter().min().unwrap_or(&0);
    let max = *times.iter().max().unwrap_or(&0);

    let variance = times
        .iter()
        .map(|t| (*t as f64 - avg).powi(2))
        .sum::<f64>()
        / times.len() as f64;
    let std_dev = variance.sqrt();
    let variability_pct = if avg > 0.0 { std_dev / avg * 100.0 } else { 0.0 };

    Some(ExecutionStats {
        avg_seconds: avg,
        min_seconds: min,
        max_seconds: max,
        variability_pct,
        runs_analyzed: times.len(),
    })
}

/// Resource efficiency score 0-100; severe under-utilization is penalized.
pub fn efficiency_score(cpu_util: Option<f64>, memory_util: Option<f64>) -> Option<f64> {
    if cpu_util.is_none() && memory_util.is_none() {
        return None;
    }

    let component = |util: Option<f64>| -> f64 {
        match util {
            Some(u) => {
                let mut score = (u / 80.0 * 100.0).min(100.0);
                if u < 20.0 {
                    score *= 0.5;
                }
                score
            }
            None => 50.0,
        }
    };

    Some((component(cpu_util) + component(memory_util)) / 2.0)
}

pub fn cost_per_gb(monthly_brl: f64, data_gb: f64) -> Option<f64> {
    if data_gb > 0.0 {
        Some(monthly_brl / data_gb)
    } else {
        None
    }
}

pub fn identify_bottlenecks(
    cpu_util: Option<f64>,
    memory_util: Option<f64>,
    stats: Option<&ExecutionStats>,
) -> Vec<String> {
    let mut bottlenecks = Vec::new();

    if let Some(cpu) = cpu_util {
        if cpu < 20.0 {
            bottlenecks
                .push("CPU under-utilized (< 20%) - consider smaller instance type".to_string());
        } else if cpu > 90.0 {
            bottlenecks.push("CPU over-utilized (> 90%) - may need more resources".to_string());
        }
    }

    if let Some(mem) = memory_util {
        if mem < 20.0 {
            bottlenecks.push("Memory under-utilized (< 20%) - over-provisioned".to_string());
        } else if mem > 90.0 {
            bottlenecks.push("Memory over-utilized (> 90%) - risk of OOM errors".to_string());
        }
    }

    if let Some(stats) = stats {
        if stats.variability_pct > 50.0 {
            bottlenecks.push(format!(
                "High execution time variability ({:.1}%) - inconsistent performance",
                stats.variability_pct
            ));
        }
    }

    bottlenecks
}

pub fn suggest_optimizations(
    preliminary: &JobAnalysisResult,
    cpu_util: Option<f64>,
    memory_util: Option<f64>,
    cost_per_gb: Option<f64>,
) -> Vec<String> {
    let mut optimizations = Vec::new();
    let worker_type = preliminary.config.worker_type.as_deref();

    if let (Some(cpu), Some(mem)) = (cpu_util, memory_util) {
        if cpu < 30.0 && mem < 30.0 {
            match worker_type {
                Some("G.4X") | Some("G.8X") => optimizations.push(
                    "Consider downgrading to G.2X workers for better cost efficiency".to_string(),
                ),
                Some("G.2X") => {
                    optimizations.push("Consider downgrading to G.1X workers".to_string())
                }
                _ => {}
            }
        }
    }

    if let Some(cost) = cost_per_gb {
        if cost > 10.0 {
            optimizations
                .push("High cost per GB - review data processing efficiency".to_string());
        }
    }

    if let (Some(workers), Some(cpu)) = (preliminary.config.number_of_workers, cpu_util) {
        if workers > 10 && cpu < 40.0 {
            optimizations.push("Consider reducing number of workers".to_string());
        }
    }

    optimizations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CostEstimate, DeepScanReasons, IdleAnalysis, JobCategory, JobConfigSummary, Priority,
        QuickCodeAnalysis, TagsInfo,
    };
    use chrono::Utc;

    fn run(state: &str, seconds: i32) -> JobRun {
        JobRun {
            state: state.into(),
            started_on: None,
            completed_on: None,
            execution_seconds: seconds,
        }
    }

    fn preliminary(worker_type: &str, workers: i32) -> JobAnalysisResult {
        JobAnalysisResult {
            job_name: "orders-etl".into(),
            timestamp: Utc::now(),
            config: JobConfigSummary {
                worker_type: Some(worker_type.into()),
                number_of_workers: Some(workers),
                ..Default::default()
            },
            idle: IdleAnalysis {
                category: JobCategory::Active,
                days_idle: 1,
                priority: Priority::Low,
                last_run_state: Some("SUCCEEDED".into()),
            },
            cost: CostEstimate {
                hourly_usd: 1.0,
                monthly_usd: 100.0,
                monthly_brl: 520.0,
            },
            tags: TagsInfo::default(),
            code: QuickCodeAnalysis::default(),
            recent_runs: 5,
            deep_scan_reasons: DeepScanReasons::default(),
        }
    }

    #[test]
    fn data_processed_counts_only_successful_runs() {
        let runs = vec![run("SUCCEEDED", 1000), run("FAILED", 1000)];
        // G.1X: 10 MB/s * 1000s ~= 9.77 GB
        let gb = data_processed_gb(&runs, "G.1X");
        assert!((gb - 10_000.0 / 1024.0).abs() < 0.01);
    }

    #[test]
    fn execution_stats_variability() {
        let stats = execution_stats(&[run("SUCCEEDED", 100), run("SUCCEEDED", 300)]).unwrap();
        assert_eq!(stats.avg_seconds, 200.0);
        assert_eq!(stats.min_seconds, 100);
        assert_eq!(stats.max_seconds, 300);
        assert_eq!(stats.runs_analyzed, 2);
        assert!((stats.variability_pct - 50.0).abs() < 1e-6);
    }

    #[test]
    fn execution_stats_none_without_timed_runs() {
        assert!(execution_stats(&[run("SUCCEEDED", 0)]).is_none());
        assert!(execution_stats(&[]).is_none());
    }

    #[test]
    fn efficiency_penalizes_underutilization() {
        // 10% CPU: (10/80*100)*0.5 = 6.25; 10% mem same; mean 6.25.
        let score = efficiency_score(Some(10.0), Some(10.0)).unwrap();
        assert!((score - 6.25).abs() < 1e-6);

        // Healthy utilization scores near 100.
        let healthy = efficiency_score(Some(80.0), Some(80.0)).unwrap();
        assert!((healthy - 100.0).abs() < 1e-6);

        assert!(efficiency_score(None, None).is_none());
        // One-sided data falls back to a neutral 50 for the missing side.
        let half = efficiency_score(Some(80.0), None).unwrap();
        assert!((half - 75.0).abs() < 1e-6);
    }

    #[test]
    fn bottleneck_detection() {
        let bottlenecks = identify_bottlenecks(Some(10.0), Some(95.0), None);
        assert!(bottlenecks.iter().any(|b| b.contains("CPU under-utilized")));
        assert!(bottlenecks.iter().any(|b| b.contains("Memory over-utilized")));

        let stats = ExecutionStats {
            avg_seconds: 100.0,
            min_seconds: 10,
            max_seconds: 500,
            variability_pct: 80.0,
            runs_analyzed: 5,
        };
        let with_variance = identify_bottlenecks(Some(50.0), Some(50.0), Some(&stats));
        assert!(with_variance.iter().any(|b| b.contains("variability")));
    }

    #[test]
    fn downgrade_suggested_for_idle_big_workers() {
        let prelim = preliminary("G.4X", 4);
        let suggestions = suggest_optimizations(&prelim, Some(15.0), Some(20.0), None);
        assert!(suggestions.iter().any(|s| s.contains("G.2X")));
    }

    #[test]
    fn worker_count_reduction_suggested() {
        let prelim = preliminary("G.1X", 20);
        let suggestions = suggest_optimizations(&prelim, Some(25.0), None, None);
        assert!(suggestions.iter().any(|s| s.contains("reducing number of workers")));
    }

    #[test]
    fn cost_per_gb_requires_data() {
        assert!(cost_per_gb(100.0, 0.0).is_none());
        assert_eq!(cost_per_gb(100.0, 10.0), Some(10.0));
    }
}
