use std::path::PathBuf;

use colored::*;
use gluescope_core::model::DeepAnalysisResult;
use gluescope_core::report::ScanReport;
use gluescope_core::{JobCategory, Priority};

pub fn print_banner(region: &str) {
    println!();
    println!(
        "{}",
        format!(
            " GlueScope v{} — Scanning Glue jobs in {}",
            env!("CARGO_PKG_VERSION"),
            region
        )
        .bold()
    );
    println!();
}

fn category_colored(category: JobCategory) -> ColoredString {
    let label = category.label();
    match category {
        JobCategory::Active => label.green(),
        JobCategory::Recent => label.cyan(),
        JobCategory::Inactive => label.yellow(),
        JobCategory::Abandoned => label.red(),
        JobCategory::NeverRun => label.red().bold(),
    }
}

fn priority_colored(priority: Priority) -> ColoredString {
    let label = priority.label();
    match priority {
        Priority::Low => label.normal(),
        Priority::Medium => label.yellow(),
        Priority::High => label.red(),
        Priority::Critical => label.red().bold(),
    }
}

/// Print the preliminary scan summary to the terminal.
pub fn print_scan_report(report: &ScanReport) {
    println!();
    println!(" {}", "Inventory Summary".bold().underline());
    println!(" {} Jobs analyzed: {}", "|-".dimmed(), report.summary.total_jobs);
    println!(
        " {} Monthly cost:  R$ {:.2}",
        "|-".dimmed(),
        report.summary.total_monthly_cost_brl
    );
    println!(
        " {} Reclaimable:   R$ {:.2} ({:.1}%)",
        "|-".dimmed(),
        report.summary.reclaimable_monthly_brl,
        report.summary.potential_savings_pct
    );
    println!(" {} Region:        {}", "|-".dimmed(), report.region.cyan());
    println!();

    println!(" {}", "Categories".bold().underline());
    for (category, count) in &report.summary.category_counts {
        println!(" {} {:<10} {}", "|-".dimmed(), category, count);
    }
    println!();

    println!(" {}", "=".repeat(60).dimmed());
    println!();

    if report.summary.top_candidates.is_empty() {
        println!(
            " {} No jobs flagged for deep analysis. Your inventory looks clean!",
            "OK".green().bold()
        );
        println!();
        return;
    }

    println!(
        " {} ({} flagged)",
        "Deep Scan Candidates".bold().underline(),
        report.summary.deep_scan_candidates
    );
    for candidate in &report.summary.top_candidates {
        let result = report
            .results
            .iter()
            .find(|r| r.job_name == candidate.job_name);
        let priority = result.map(|r| r.idle.priority);
        println!(
            " {} {} [{}] R$ {:.2}/month {} — {}",
            "|-".dimmed(),
            candidate.job_name.bold(),
            result
                .map(|r| category_colored(r.idle.category))
                .unwrap_or_else(|| candidate.category.as_str().normal()),
            candidate.monthly_cost_brl,
            priority
                .map(priority_colored)
                .unwrap_or_else(|| "".normal()),
            candidate.reasons.join(", ").dimmed()
        );
    }
    println!();
}

/// Print one deep scan result to the terminal.
pub fn print_deep_result(result: &DeepAnalysisResult) {
    println!();
    println!(
        " {} {}",
        result.job_name.bold(),
        format!("(priority {:.0}/100)", result.recommendations.priority_score).dimmed()
    );
    println!(
        " {} Risk: {}",
        "|-".dimmed(),
        colorize_risk(&result.recommendations.risk_assessment)
    );
    println!(
        " {} Estimated savings: R$ {:.2}/month",
        "|-".dimmed(),
        result.recommendations.estimated_savings_brl
    );
    if let Some(efficiency) = result.performance.efficiency_score {
        println!(" {} Efficiency: {:.0}/100", "|-".dimmed(), efficiency);
    }
    if !result.dependencies.upstream_jobs.is_empty()
        || !result.dependencies.downstream_jobs.is_empty()
    {
        println!(
            " {} Triggers: {} upstream, {} downstream",
            "|-".dimmed(),
            result.dependencies.upstream_jobs.len(),
            result.dependencies.downstream_jobs.len()
        );
    }

    for suggestion in &result.recommendations.suggestions {
        println!("    {} {}", "*".yellow(), suggestion);
    }

    for issue in &result.code.security_issues {
        println!("    {} {}", "!".red().bold(), issue);
    }
}

fn colorize_risk(risk: &str) -> ColoredString {
    if risk.starts_with("HIGH") {
        risk.red().bold()
    } else if risk.starts_with("MEDIUM") {
        risk.yellow()
    } else {
        risk.green()
    }
}

pub fn print_written_files(paths: &[PathBuf]) {
    println!(" {}", "Reports".bold().underline());
    for path in paths {
        println!(" {} {}", "|-".dimmed(), path.display());
    }
    println!();
}
