use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use adpulse_compute::{
    bottom_creatives, calculate_fatigue_index, creatives_summary, detect_trend_anomalies,
    format_anomaly_report, run_account_batch, score_creatives, top_creatives, AnomalyDetectionResult,
    AnomalyDetector, AnomalyInput, BatchReport, CreativeInput, FatigueOutput,
};
use adpulse_core::{BenchmarkProvider, Config, SeriesPoint};
use adpulse_llm::LlmNarrativeGenerator;
use adpulse_rules::{LoadStatus, RuleLoader};

use crate::cli::{CliArgs, Command};
use crate::input::{parse_input, FatigueRequest, OneOrMany};

pub async fn run(args: CliArgs, config: &Config) -> Result<()> {
    let rules = load_rules(&config.analytics.rules_dir)?;

    match args.command {
        Command::Fatigue { input } => {
            let requests: OneOrMany<FatigueRequest> = parse_input(&input)?;
            emit(&fatigue_reports(requests)?, args.pretty)
        }
        Command::Score {
            input,
            top,
            bottom,
            summary,
        } => {
            let creatives: Vec<CreativeInput> = parse_input(&input)?;
            for creative in &creatives {
                creative
                    .metrics
                    .validate()
                    .with_context(|| format!("creative {}", creative.id))?;
            }
            emit(&score_report(&creatives, &rules, top, bottom, summary), args.pretty)
        }
        Command::Anomalies {
            input,
            report,
            no_ai,
        } => {
            let inputs: OneOrMany<AnomalyInput> = parse_input(&input)?;
            validate_anomaly_inputs(&inputs)?;
            let detector = build_detector(config, &rules, no_ai);
            match inputs {
                OneOrMany::One(single) => {
                    let result = detector.detect(&single).await;
                    if report {
                        println!("{}", format_anomaly_report(&result));
                        Ok(())
                    } else {
                        emit(&result, args.pretty)
                    }
                }
                OneOrMany::Many(batch) => {
                    let concurrency = config.analytics.batch_concurrency as usize;
                    let batch_report = detect_batch(detector, batch, concurrency).await;
                    if report {
                        print!("{}", format_batch_report(&batch_report));
                        Ok(())
                    } else {
                        emit(&batch_report, args.pretty)
                    }
                }
            }
        }
        Command::Trend { input, metric } => {
            let series: Vec<SeriesPoint> = parse_input(&input)?;
            emit(&detect_trend_anomalies(&metric, &series), args.pretty)
        }
        Command::Config => emit(&config_report(config, &rules), args.pretty),
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to encode output")?;
    println!("{out}");
    Ok(())
}

// ── Rules ─────────────────────────────────────────────────────

/// Load every rule document under `dir`. Broken files are logged and
/// skipped; the affected settings fall back to built-in defaults.
fn load_rules(dir: &Path) -> Result<RuleLoader> {
    let loader = RuleLoader::new(dir.to_path_buf());
    let results = loader
        .load_all()
        .with_context(|| format!("failed to scan rules directory {}", dir.display()))?;

    for result in &results {
        match &result.status {
            LoadStatus::Loaded { rule_id } => debug!(rule_id = %rule_id, path = %result.path.display(), "rule loaded"),
            LoadStatus::Skipped { reason } => debug!(reason = %reason, path = %result.path.display(), "rule skipped"),
            LoadStatus::Failed { error } => warn!(error = %error, path = %result.path.display(), "rule failed to load"),
        }
    }
    Ok(loader)
}

// ── Fatigue ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct FatigueReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(flatten)]
    output: FatigueOutput,
}

fn fatigue_report(request: FatigueRequest) -> Result<FatigueReport> {
    let label = request.id.as_deref().unwrap_or("creative");
    for metric in &request.daily_metrics {
        metric
            .validate()
            .with_context(|| format!("{label}: daily metric for {}", metric.date))?;
    }
    Ok(FatigueReport {
        output: calculate_fatigue_index(&request.daily_metrics, request.creative_age_days),
        id: request.id,
    })
}

fn fatigue_reports(requests: OneOrMany<FatigueRequest>) -> Result<Value> {
    Ok(match requests {
        OneOrMany::One(r) => json!(fatigue_report(r)?),
        OneOrMany::Many(rs) => json!(rs
            .into_iter()
            .map(fatigue_report)
            .collect::<Result<Vec<_>>>()?),
    })
}

// ── Scoring ───────────────────────────────────────────────────

fn score_report(
    creatives: &[CreativeInput],
    rules: &RuleLoader,
    top: Option<usize>,
    bottom: Option<usize>,
    summary: bool,
) -> Value {
    let scores = score_creatives(creatives, &rules.benchmarks());

    let selected = match (top, bottom) {
        (Some(n), _) => Some(top_creatives(&scores, n)),
        (None, Some(n)) => Some(bottom_creatives(&scores, n)),
        (None, None) => None,
    };
    let creatives: Vec<Value> = match selected {
        Some(entries) => entries
            .into_iter()
            .map(|(id, score)| json!({ "id": id, "score": score }))
            .collect(),
        None => scores
            .iter()
            .map(|(id, score)| json!({ "id": id, "score": score }))
            .collect(),
    };

    let mut out = json!({ "creatives": creatives });
    if summary {
        out["summary"] = json!(creatives_summary(scores.values()));
    }
    out
}

// ── Anomalies ─────────────────────────────────────────────────

fn build_detector(config: &Config, rules: &RuleLoader, no_ai: bool) -> AnomalyDetector {
    let detector = if no_ai {
        AnomalyDetector::rules_only()
    } else {
        match LlmNarrativeGenerator::from_config(&config.llm, &config.ollama) {
            Ok(generator) => AnomalyDetector::new(Arc::new(generator)),
            Err(e) => {
                warn!(error = %e, "narrative provider unavailable, running rules only");
                AnomalyDetector::rules_only()
            }
        }
    };

    detector
        .with_thresholds(rules.thresholds())
        .with_timeout(Duration::from_secs(config.analytics.narrative_timeout_secs))
}

fn validate_anomaly_inputs(inputs: &OneOrMany<AnomalyInput>) -> Result<()> {
    let inputs = match inputs {
        OneOrMany::One(input) => std::slice::from_ref(input),
        OneOrMany::Many(inputs) => inputs.as_slice(),
    };
    for (i, input) in inputs.iter().enumerate() {
        input.validate().with_context(|| match &input.account_id {
            Some(id) => format!("account {id}"),
            None => format!("account input #{}", i + 1),
        })?;
    }
    Ok(())
}

/// Give every input an account id (`account-N` by position when absent)
/// and drop later inputs that repeat an id.
fn assign_account_ids(inputs: Vec<AnomalyInput>) -> (Vec<String>, HashMap<String, AnomalyInput>) {
    let mut ids = Vec::with_capacity(inputs.len());
    let mut by_id = HashMap::with_capacity(inputs.len());

    for (i, mut input) in inputs.into_iter().enumerate() {
        let id = input
            .account_id
            .clone()
            .unwrap_or_else(|| format!("account-{}", i + 1));
        if by_id.contains_key(&id) {
            warn!(account_id = %id, "duplicate account id in batch, dropping later entry");
            continue;
        }
        input.account_id = Some(id.clone());
        ids.push(id.clone());
        by_id.insert(id, input);
    }
    (ids, by_id)
}

async fn detect_batch(
    detector: AnomalyDetector,
    inputs: Vec<AnomalyInput>,
    concurrency: usize,
) -> BatchReport<AnomalyDetectionResult> {
    let (ids, by_id) = assign_account_ids(inputs);
    let detector = Arc::new(detector);
    let by_id = Arc::new(by_id);

    let report = run_account_batch(ids, concurrency, move |account_id| {
        let detector = Arc::clone(&detector);
        let by_id = Arc::clone(&by_id);
        async move {
            let input = by_id
                .get(&account_id)
                .ok_or_else(|| format!("no input for account {account_id}"))?;
            Ok::<_, String>(detector.detect(input).await)
        }
    })
    .await;

    info!(
        run_id = %report.run_id,
        succeeded = report.succeeded,
        failed = report.failed,
        "anomaly batch complete"
    );
    report
}

fn format_batch_report(report: &BatchReport<AnomalyDetectionResult>) -> String {
    let mut out = format!(
        "Batch {}: {} succeeded, {} failed\n",
        report.run_id, report.succeeded, report.failed
    );
    for outcome in &report.outcomes {
        out.push_str(&format!("\n== {} ==\n", outcome.account_id));
        match (&outcome.output, &outcome.error) {
            (Some(result), _) => out.push_str(&format_anomaly_report(result)),
            (None, Some(error)) => out.push_str(&format!("failed: {error}")),
            (None, None) => out.push_str("failed"),
        }
        out.push('\n');
    }
    out
}

// ── Config ────────────────────────────────────────────────────

fn config_report(config: &Config, rules: &RuleLoader) -> Value {
    let documents: Vec<Value> = rules
        .documents()
        .iter()
        .map(|doc| {
            let meta = doc.metadata();
            json!({
                "id": meta.id,
                "name": meta.name,
                "kind": doc.kind(),
                "enabled": meta.enabled,
            })
        })
        .collect();

    json!({
        "config": config.redacted_summary(),
        "rules": {
            "dir": rules.rules_dir(),
            "documents": documents,
            "thresholds": rules.thresholds(),
            "benchmarks": rules.benchmarks(),
        },
    })
}
