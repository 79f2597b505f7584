use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::{CodeAnalysis, JobAnalysisResult};
use crate::provider::glue::GlueProvider;

const EXCERPT_BYTES: usize = 10 * 1024;
const LONG_LINE_CHARS: usize = 120;
const JOIN_WARNING_THRESHOLD: usize = 5;

static BRANCH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)\bif\b", r"(?i)\bwhile\b", r"(?i)\bfor\b", r"(?i)\btry\b", r"(?i)\band\b", r"(?i)\bor\b"]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

static IMPORT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"import\s+([a-zA-Z_][a-zA-Z0-9_.]*)",
        r"from\s+([a-zA-Z_][a-zA-Z0-9_.]*)\s+import",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static SQL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?is)""".*?SELECT.*?""""#,
        r"(?is)'''.*?SELECT.*?'''",
        r#"(?is)".*?SELECT.*?""#,
        r"(?is)'.*?SELECT.*?'",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static COUNT_IN_LOOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)for.*?\.count\(\)").expect("valid regex"));
static HARDCODED_CREDENTIALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(password|token|key)\s*=\s*["'][^"']+["']"#).expect("valid regex")
});
static FSTRING_SQL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)f["'].*?SELECT.*?\{.*?\}.*?["']"#).expect("valid regex")
});

/// Spark dataframe method calls worth inventorying, with display labels.
const SPARK_OPERATIONS: &[(&str, &str)] = &[
    (r"\.read\b", ".read"),
    (r"\.write\b", ".write"),
    (r"\.sql\(", ".sql"),
    (r"\.join\(", ".join"),
    (r"\.groupBy\(", ".groupBy"),
    (r"\.agg\(", ".agg"),
    (r"\.collect\(\)", ".collect"),
    (r"\.show\(\)", ".show"),
    (r"\.cache\(\)", ".cache"),
    (r"\.persist\(\)", ".persist"),
];

static SPARK_REGEXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    SPARK_OPERATIONS
        .iter()
        .map(|(p, label)| (Regex::new(p).expect("valid regex"), *label))
        .collect()
});

/// Download the job script and extract static heuristic signals from it.
///
/// Jobs without a script location produce an empty analysis.
pub async fn analyze(
    provider: &GlueProvider,
    preliminary: &JobAnalysisResult,
) -> Result<CodeAnalysis> {
    let Some(location) = preliminary
        .config
        .script_location
        .as_deref()
        .filter(|l| !l.is_empty() && *l != "unknown")
    else {
        log::warn!("no script location for {}", preliminary.job_name);
        return Ok(CodeAnalysis::default());
    };

    let script = provider.download_script(location).await?;
    Ok(analyze_script(&script))
}

/// Pure signal extraction over script content.
pub fn analyze_script(script: &str) -> CodeAnalysis {
    CodeAnalysis {
        script_excerpt: Some(truncate_utf8(script, EXCERPT_BYTES).to_string()),
        script_size_kb: script.len() as f64 / 1024.0,
        complexity_score: complexity_score(script),
        dependencies: extract_dependencies(script),
        sql_query_count: count_sql_queries(script),
        spark_operations: spark_operations(script),
        performance_issues: performance_issues(script),
        security_issues: security_issues(script),
        best_practice_violations: best_practice_violations(script),
    }
}

/// Branch-keyword count as a rough cyclomatic complexity stand-in.
pub fn complexity_score(script: &str) -> u32 {
    BRANCH_PATTERNS
        .iter()
        .map(|re| re.find_iter(script).count() as u32)
        .sum()
}

/// Imported module roots, deduplicated and sorted.
pub fn extract_dependencies(script: &str) -> Vec<String> {
    let mut deps = BTreeSet::new();
    for re in IMPORT_PATTERNS.iter() {
        for capture in re.captures_iter(script) {
            if let Some(module) = capture.get(1) {
                deps.insert(module.as_str().to_string());
            }
        }
    }
    deps.into_iter().collect()
}

/// Count string literals that embed a SELECT query.
pub fn count_sql_queries(script: &str) -> usize {
    SQL_PATTERNS
        .iter()
        .map(|re| re.find_iter(script).count())
        .sum()
}

/// Which Spark dataframe operations the script uses.
pub fn spark_operations(script: &str) -> Vec<String> {
    SPARK_REGEXES
        .iter()
        .filter(|(re, _)| re.is_match(script))
        .map(|(_, label)| label.to_string())
        .collect()
}

pub fn performance_issues(script: &str) -> Vec<String> {
    let mut issues = Vec::new();

    if script.contains(".collect()") {
        issues.push("collect() operation found - may cause memory issues".to_string());
    }
    if COUNT_IN_LOOP.is_match(script) {
        issues.push("count() in loop detected - inefficient".to_string());
    }
    if script.matches(".join(").count() > JOIN_WARNING_THRESHOLD {
        issues.push("Multiple joins detected - consider optimization".to_string());
    }

    issues
}

pub fn security_issues(script: &str) -> Vec<String> {
    let mut issues = Vec::new();

    if HARDCODED_CREDENTIALS.is_match(script) {
        issues.push("Potential hardcoded credentials found".to_string());
    }
    if FSTRING_SQL.is_match(script) {
        issues.push("Potential SQL injection risk with f-strings".to_string());
    }

    issues
}

pub fn best_practice_violations(script: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if script.contains("import *") {
        violations.push("Wildcard imports found (import *)".to_string());
    }

    let long_lines = script.lines().filter(|l| l.len() > LONG_LINE_CHARS).count();
    if long_lines > 0 {
        violations.push(format!("{} lines exceed 120 characters", long_lines));
    }

    violations
}

/// Cut at a char boundary at or below `max` bytes.
fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
