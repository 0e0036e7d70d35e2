use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rubric_rs::pipeline::defaults::FixedIssueChecker;
use rubric_rs::{EngineConfig, EvaluationRequest, EvaluatorBuilder, ProfileSet, ScoreReport, TextIssue};
use serde::{Deserialize, Serialize};

#[path = "score_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "score_report")]
#[command(about = "Score exercise responses from JSON case files")]
struct Args {
    /// A case file, or a directory searched recursively for `*.json` cases.
    #[arg(long, env = "RUBRIC_INPUT", default_value = "test-data/cases")]
    input: PathBuf,
    #[arg(long, env = "RUBRIC_OUT")]
    out: Option<PathBuf>,
    /// JSON array of exercise profiles replacing the built-ins.
    #[arg(long, env = "RUBRIC_PROFILES")]
    profiles: Option<PathBuf>,
    /// Budget for each collaborator call; 0 disables the bound.
    #[arg(long, env = "RUBRIC_TIMEOUT_MS", default_value_t = EngineConfig::DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,
    #[arg(long, env = "RUBRIC_LIMIT")]
    limit: Option<usize>,
}

/// One request plus, optionally, checker output captured for it.
#[derive(Debug, Deserialize)]
struct CaseFile {
    id: String,
    request: EvaluationRequest,
    #[serde(default)]
    issues: Option<Vec<TextIssue>>,
}

#[derive(Debug, Serialize)]
struct Meta {
    generated_at: String,
    case_count: usize,
    failed_count: usize,
    profile_source: String,
    collaborator_timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CaseReport {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ScoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    schema_version: u32,
    meta: Meta,
    cases: Vec<CaseReport>,
}

fn main() {
    rubric_rs::logging::init();
    if let Err(err) = run() {
        tracing::error!(error = %err, "score_report failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let input = resolve_path(&repo_root, &args.input);
    let out_path = resolve_out_path(&repo_root, args.out.as_ref());
    let config = EngineConfig {
        collaborator_timeout_ms: (args.timeout_ms > 0).then_some(args.timeout_ms),
        profile_path: args.profiles.as_ref().map(|path| resolve_path(&repo_root, path)),
    };
    let profile_source = config
        .profile_path
        .as_ref()
        .map_or_else(|| "builtin".to_string(), |path| path.display().to_string());
    let profiles = config
        .profiles()
        .map_err(|err| format!("Failed to load exercise profiles: {err}"))?;

    let mut cases = load_cases(&input)?;
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err(format!("No case files found under '{}'.", input.display()));
    }

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(cases.len());
    for case in cases {
        progress.set_message(case.id.clone());
        reports.push(score_case(&config, &profiles, case)?);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let failed_count = reports.iter().filter(|case| case.error.is_some()).count();
    let report = BatchReport {
        schema_version: 1,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            case_count: reports.len(),
            failed_count,
            profile_source,
            collaborator_timeout_ms: config.collaborator_timeout_ms,
        },
        cases: reports,
    };
    json_report_formatter::write_report(&out_path, &report)?;
    println!("{}", out_path.display());
    Ok(())
}

fn score_case(config: &EngineConfig, profiles: &ProfileSet, case: CaseFile) -> Result<CaseReport, String> {
    let mut builder = EvaluatorBuilder::new(config.clone()).with_profiles(profiles.clone());
    if let Some(issues) = case.issues {
        builder = builder.with_text_checker(Arc::new(FixedIssueChecker::new(issues)));
    }
    let evaluator = builder
        .build()
        .map_err(|err| format!("Failed to build evaluator: {err}"))?;

    Ok(match evaluator.evaluate(&case.request) {
        Ok(report) => CaseReport {
            id: case.id,
            report: Some(report),
            error: None,
        },
        Err(err) => {
            tracing::warn!(case = %case.id, error = %err, "case rejected");
            CaseReport {
                id: case.id,
                report: None,
                error: Some(err.to_string()),
            }
        }
    })
}

fn load_cases(input: &Path) -> Result<Vec<CaseFile>, String> {
    let mut paths = Vec::new();
    if input.is_dir() {
        collect_case_files(input, &mut paths)?;
        paths.sort();
    } else {
        paths.push(input.to_path_buf());
    }
    paths.iter().map(|path| read_case(path)).collect()
}

fn read_case(path: &Path) -> Result<CaseFile, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read case file '{}': {err}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse case file '{}': {err}", path.display()))
}

fn collect_case_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), String> {
    let entries = fs::read_dir(dir)
        .map_err(|err| format!("Failed to read directory '{}': {err}", dir.display()))?;
    for entry in entries {
        let entry = entry.map_err(|err| {
            format!(
                "Failed to read directory entry in '{}': {err}",
                dir.display()
            )
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_case_files(&path, out)?;
            continue;
        }
        if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("score_reports")
        .join(format!("score-report-{run_id}.json"))
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}
