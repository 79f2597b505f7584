use crate::model::{
    CodeAnalysis, Confidence, DependencyAnalysis, Effort, JobAnalysisResult, JobCategory,
    PerformanceAnalysis, Recommendation, RecommendationKind, Recommendations,
};

const MAX_SUGGESTIONS: usize = 10;

/// Merge the preliminary signals and the deep sub-analyses into a
/// prioritized set of recommendations for one job.
pub fn generate(
    preliminary: &JobAnalysisResult,
    code: &CodeAnalysis,
    performance: &PerformanceAnalysis,
    dependencies: &DependencyAnalysis,
) -> Recommendations {
    let mut items = Vec::new();

    items.extend(cost_recommendations(preliminary, performance));
    items.extend(performance_recommendations(preliminary, code, performance));
    items.extend(architecture_recommendations(dependencies));
    items.extend(modernization_recommendations(preliminary));

    items.sort_by(|a, b| {
        b.estimated_savings_brl
            .partial_cmp(&a.estimated_savings_brl)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let estimated_savings_brl = items
        .iter()
        .map(|r| r.estimated_savings_brl * r.confidence.weight())
        .sum();

    let suggestions = items
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|r| {
            format!(
                "{} - Save R$ {:.2}/month ({} effort)",
                r.title,
                r.estimated_savings_brl,
                r.effort.label()
            )
        })
        .collect();

    let cost_reduction_opportunities = items
        .iter()
        .filter(|r| r.kind == RecommendationKind::CostOptimization)
        .map(|r| r.title.clone())
        .collect();

    let modernization = items
        .iter()
        .filter(|r| {
            matches!(
                r.kind,
                RecommendationKind::Modernization | RecommendationKind::Architecture
            )
        })
        .map(|r| r.title.clone())
        .collect();

    let risk_assessment = assess_risk(preliminary, code, dependencies);
    let priority_score = priority_score(preliminary, performance);

    Recommendations {
        items,
        suggestions,
        cost_reduction_opportunities,
        modernization,
        risk_assessment,
        priority_score,
        estimated_savings_brl,
    }
}

fn cost_recommendations(
    preliminary: &JobAnalysisResult,
    performance: &PerformanceAnalysis,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let monthly = preliminary.cost.monthly_brl;
    let worker_type = preliminary.config.worker_type.as_deref();

    match preliminary.idle.category {
        JobCategory::NeverRun => recs.push(Recommendation {
            kind: RecommendationKind::CostOptimization,
            category: "unused_job".into(),
            title: "Remove never-executed job".into(),
            description: format!(
                "Job '{}' has never run since creation and still carries a provisioned cost",
                preliminary.job_name
            ),
            action: "Delete the job definition, or schedule it if it is still needed".into(),
            estimated_savings_brl: monthly,
            effort: Effort::Low,
            confidence: Confidence::High,
        }),
        JobCategory::Abandoned => recs.push(Recommendation {
            kind: RecommendationKind::CostOptimization,
            category: "abandoned_job".into(),
            title: "Review abandoned job for decommissioning".into(),
            description: format!(
                "Job '{}' has been idle for {} days",
                preliminary.job_name, preliminary.idle.days_idle
            ),
            action: "Confirm with the owning team and decommission if no longer needed".into(),
            estimated_savings_brl: monthly,
            effort: Effort::Medium,
            confidence: Confidence::Medium,
        }),
        _ => {}
    }

    if let (Some(cpu), Some(mem)) = (
        performance.avg_cpu_utilization,
        performance.avg_memory_utilization,
    ) {
        if cpu < 30.0 && mem < 30.0 {
            let downgrade = match worker_type {
                Some("G.4X") | Some("G.8X") => Some(("G.2X", 0.5)),
                Some("G.2X") => Some(("G.1X", 0.3)),
                _ => None,
            };
            if let Some((target, saving_pct)) = downgrade {
                recs.push(Recommendation {
                    kind: RecommendationKind::CostOptimization,
                    category: "worker_downgrade".into(),
                    title: format!("Downgrade workers to {}", target),
                    description: format!(
                        "CPU ({:.1}%) and memory ({:.1}%) utilization are both low for the current worker type",
                        cpu, mem
                    ),
                    action: format!("Change worker type to {}", target),
                    estimated_savings_brl: monthly * saving_pct,
                    effort: Effort::Low,
                    confidence: Confidence::Medium,
                });
            }
        }
    }

    if let (Some(workers), Some(cpu)) = (
        preliminary.config.number_of_workers,
        performance.avg_cpu_utilization,
    ) {
        if workers > 10 && cpu < 40.0 {
            let target = std::cmp::max(2, workers / 2);
            recs.push(Recommendation {
                kind: RecommendationKind::CostOptimization,
                category: "worker_count".into(),
                title: format!("Reduce worker count from {} to {}", workers, target),
                description: format!(
                    "{} workers are provisioned but CPU utilization averages {:.1}%",
                    workers, cpu
                ),
                action: format!("Set NumberOfWorkers to {}", target),
                estimated_savings_brl: monthly * 0.2,
                effort: Effort::Low,
                confidence: Confidence::Medium,
            });
        }
    }

    recs
}

fn performance_recommendations(
    preliminary: &JobAnalysisResult,
    code: &CodeAnalysis,
    performance: &PerformanceAnalysis,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let job = &preliminary.job_name;

    if code
        .performance_issues
        .iter()
        .any(|i| i.contains("collect()"))
    {
        recs.push(Recommendation {
            kind: RecommendationKind::Performance,
            category: "driver_pressure".into(),
            title: "Remove collect() calls from the script".into(),
            description: format!("Script for '{}' pulls full datasets to the driver", job),
            action: "Replace collect() with distributed writes or aggregations".into(),
            estimated_savings_brl: 200.0,
            effort: Effort::Medium,
            confidence: Confidence::Medium,
        });
    }

    if code
        .performance_issues
        .iter()
        .any(|i| i.contains("count() in loop"))
    {
        recs.push(Recommendation {
            kind: RecommendationKind::Performance,
            category: "redundant_actions".into(),
            title: "Cache DataFrames counted inside loops".into(),
            description: format!("Script for '{}' recomputes counts on every iteration", job),
            action: "Cache the DataFrame before the loop or hoist the count out".into(),
            estimated_savings_brl: 150.0,
            effort: Effort::Low,
            confidence: Confidence::Medium,
        });
    }

    if let Some(efficiency) = performance.efficiency_score {
        if efficiency < 50.0 {
            recs.push(Recommendation {
                kind: RecommendationKind::Performance,
                category: "low_efficiency".into(),
                title: "Right-size resources for low efficiency score".into(),
                description: format!(
                    "Resource efficiency score is {:.0}/100 over the last 30 days",
                    efficiency
                ),
                action: "Tune worker type and count to match observed utilization".into(),
                estimated_savings_brl: 300.0,
                effort: Effort::Medium,
                confidence: Confidence::Medium,
            });
        }
    }

    for bottleneck in &performance.bottlenecks {
        let action = if bottleneck.contains("CPU under-utilized") {
            "Move to a smaller worker type"
        } else if bottleneck.contains("CPU over-utilized") {
            "Add workers or move to a larger worker type"
        } else if bottleneck.contains("Memory under-utilized") {
            "Move to a worker type with less memory"
        } else if bottleneck.contains("Memory over-utilized") {
            "Move to a memory-optimized worker type before jobs start failing"
        } else {
            "Investigate run-to-run differences in input volume and partitioning"
        };
        recs.push(Recommendation {
            kind: RecommendationKind::Performance,
            category: "bottleneck".into(),
            title: bottleneck.clone(),
            description: format!("Detected on '{}' from CloudWatch metrics", job),
            action: action.into(),
            estimated_savings_brl: 100.0,
            effort: Effort::Medium,
            confidence: Confidence::Low,
        });
    }

    recs
}

fn architecture_recommendations(dependencies: &DependencyAnalysis) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if dependencies.input_sources.len() > 5 {
        recs.push(Recommendation {
            kind: RecommendationKind::Architecture,
            category: "fan_in".into(),
            title: "Split job with many input sources".into(),
            description: format!(
                "Job reads from {} distinct sources, which complicates retries and lineage",
                dependencies.input_sources.len()
            ),
            action: "Break the job into staged jobs with a single concern each".into(),
            estimated_savings_brl: 0.0,
            effort: Effort::High,
            confidence: Confidence::Medium,
        });
    }

    if !dependencies.schedule_conflicts.is_empty() {
        recs.push(Recommendation {
            kind: RecommendationKind::Architecture,
            category: "scheduling".into(),
            title: "Consolidate conflicting trigger schedules".into(),
            description: dependencies.schedule_conflicts.join("; "),
            action: "Keep a single scheduled trigger per job".into(),
            estimated_savings_brl: 50.0,
            effort: Effort::Low,
            confidence: Confidence::High,
        });
    }

    recs
}

fn modernization_recommendations(preliminary: &JobAnalysisResult) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if let Some(version) = preliminary.config.glue_version.as_deref() {
        if let Ok(parsed) = version.parse::<f64>() {
            if parsed < 3.0 {
                recs.push(Recommendation {
                    kind: RecommendationKind::Modernization,
                    category: "glue_version".into(),
                    title: format!("Upgrade from Glue {} to a current version", version),
                    description:
                        "Older Glue versions run slower Spark runtimes and miss auto-scaling"
                            .into(),
                    action: "Test the script on Glue 4.0 and upgrade".into(),
                    estimated_savings_brl: 100.0,
                    effort: Effort::Medium,
                    confidence: Confidence::Medium,
                });
            }
        }
    }

    recs
}

fn assess_risk(
    preliminary: &JobAnalysisResult,
    code: &CodeAnalysis,
    dependencies: &DependencyAnalysis,
) -> String {
    let mut factors = Vec::new();

    if !code.security_issues.is_empty() {
        factors.push(format!("{} security issue(s) in script", code.security_issues.len()));
    }
    if !code.performance_issues.is_empty() {
        factors.push(format!(
            "{} performance issue(s) in script",
            code.performance_issues.len()
        ));
    }
    if dependencies.input_sources.len() > 10 {
        factors.push("more than 10 input sources".to_string());
    }
    if preliminary.cost.monthly_brl > 1000.0 {
        factors.push(format!(
            "high monthly cost (R$ {:.2})",
            preliminary.cost.monthly_brl
        ));
    }
    if matches!(
        preliminary.idle.category,
        JobCategory::Abandoned | JobCategory::NeverRun
    ) {
        factors.push(format!("job is {}", preliminary.idle.category.label()));
    }

    match factors.len() {
        0 => "LOW".to_string(),
        1 | 2 => format!("MEDIUM - {}", factors.join("; ")),
        _ => format!("HIGH - {}", factors[..3].join("; ")),
    }
}

/// 0-100 score used to order jobs in the deep report.
fn priority_score(preliminary: &JobAnalysisResult, performance: &PerformanceAnalysis) -> f64 {
    let mut score: f64 = 0.0;
    let monthly = preliminary.cost.monthly_brl;

    if monthly > 2000.0 {
        score += 40.0;
    } else if monthly > 1000.0 {
        score += 30.0;
    } else if monthly > 500.0 {
        score += 20.0;
    } else if monthly > 100.0 {
        score += 10.0;
    }

    if let Some(efficiency) = performance.efficiency_score {
        if efficiency < 30.0 {
            score += 30.0;
        } else if efficiency < 50.0 {
            score += 20.0;
        } else if efficiency < 70.0 {
            score += 10.0;
        }
    }

    score += match preliminary.idle.category {
        JobCategory::NeverRun => 20.0,
        JobCategory::Abandoned => 15.0,
        JobCategory::Inactive => 10.0,
        _ => 0.0,
    };

    if preliminary.deep_scan_reasons.naming_issues {
        score += 5.0;
    }

    score.min(100.0)
}
