//! Credit Inference CLI Module
//!
//! Command-line interface for scoring applications and inspecting the
//! served model.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cache::ModelDescription;
use crate::inference::{BatchOutcome, InferenceConfig, InferenceEngine, PredictionResult};
use crate::risk::RiskLevel;
use crate::schema::CreditRecord;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(235, 100, 100) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_failed(detail: &str) {
    println!("{} {}", bad("failed"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<20} {}", muted(key), val.white());
}

fn risk_badge(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::Low => ok(level.as_str()),
        RiskLevel::Medium => level.as_str().yellow(),
        RiskLevel::High => bad(level.as_str()),
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "credit-inference")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Real-time creditworthiness scoring")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON config file (defaults and CREDIT_* environment otherwise)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model registry root, overrides configured roots
    #[arg(short, long, global = true)]
    pub registry: Option<PathBuf>,

    /// Deployment stage, overrides the configured stage
    #[arg(long, global = true)]
    pub stage: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one application
    Predict {
        /// Record as inline JSON or a path to a JSON file
        #[arg(long)]
        record: String,

        /// Print the raw JSON result only
        #[arg(long)]
        json: bool,
    },

    /// Score a JSON array of applications
    Batch {
        /// Records as inline JSON array or a path to a JSON file
        #[arg(long)]
        records: String,

        /// Print the raw JSON outcome only
        #[arg(long)]
        json: bool,
    },

    /// Load the configured model and print cache metadata
    Describe,

    /// Load the configured model and run its startup checks
    Check,
}

/// Resolve configuration from the global options
pub fn resolve_config(cli: &Cli) -> anyhow::Result<InferenceConfig> {
    let mut config = match &cli.config {
        Some(path) => InferenceConfig::from_file(path)?,
        None => InferenceConfig::from_env(),
    };
    if let Some(root) = &cli.registry {
        config = config.with_registry_root(root.clone());
    }
    if let Some(stage) = &cli.stage {
        config.model_stage = stage.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Inline JSON, or the contents of the file it names
fn read_json_arg<T: serde::de::DeserializeOwned>(arg: &str) -> anyhow::Result<T> {
    let path = Path::new(arg);
    let text = if path.is_file() {
        std::fs::read_to_string(path)?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("invalid JSON input: {}", e))
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_predict(config: InferenceConfig, record: &str, json: bool) -> anyhow::Result<()> {
    let record: CreditRecord = read_json_arg(record)?;
    let engine = InferenceEngine::from_config(config)?;
    let result = engine.predict_one(&record)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    section("Prediction");
    print_result(&result);
    println!();
    Ok(())
}

pub fn cmd_batch(config: InferenceConfig, records: &str, json: bool) -> anyhow::Result<()> {
    let records: Vec<CreditRecord> = read_json_arg(records)?;
    let engine = InferenceEngine::from_config(config)?;
    let outcome = engine.predict_batch(&records)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    section("Batch");
    print_batch(&outcome);
    println!();
    Ok(())
}

pub fn cmd_describe(config: InferenceConfig) -> anyhow::Result<()> {
    section("Model");
    let engine = InferenceEngine::from_config(config)?;

    step_run(&format!(
        "Loading {}@{}",
        engine.config().model_name.cyan(),
        engine.config().model_stage
    ));
    let start = Instant::now();
    if engine.warm_up() {
        step_done(&format!("{:?}", start.elapsed()));
    } else {
        step_failed("see log for details");
    }

    let descriptions = engine.describe();
    if descriptions.is_empty() {
        println!("  {}", "No model loaded".yellow());
    }
    for description in &descriptions {
        println!();
        print_description(description);
    }
    println!();
    Ok(())
}

/// Exits non-zero when the configured model cannot be served
pub fn cmd_check(config: InferenceConfig) -> anyhow::Result<()> {
    section("Check");
    for root in &config.registry_roots {
        kv("Registry root", &root.display().to_string());
    }
    let engine = InferenceEngine::from_config(config)?;

    step_run("Loading artifact and running smoke prediction");
    let start = Instant::now();
    match engine.reload() {
        Ok(model) => {
            step_done(&format!("{:?}", start.elapsed()));
            kv("Model", &model.id().to_string());
            kv("Columns", &model.preprocessor().n_features().to_string());
            println!();
            Ok(())
        }
        Err(e) => {
            step_failed(&format!("{:?}", start.elapsed()));
            println!();
            Err(e.into())
        }
    }
}

// ─── Output ────────────────────────────────────────────────────────────────────

fn print_result(result: &PredictionResult) {
    let verdict = if result.is_good_credit() { ok("good credit") } else { bad("bad credit") };
    println!("  {:<20} {}", muted("Prediction"), verdict);
    println!("  {:<20} {}", muted("Risk level"), risk_badge(result.risk_level));
    kv("P(good)", &format!("{:.4}", result.probability_good_credit));
    kv("P(bad)", &format!("{:.4}", result.probability_bad_credit));
    kv("Model", &result.model.to_string());
}

fn print_batch(outcome: &BatchOutcome) {
    kv("Model", &outcome.model.to_string());
    kv("Processed", &outcome.total_processed.to_string());
    kv("Succeeded", &outcome.succeeded.to_string());
    kv("Failed", &outcome.failed.to_string());
    kv("Time", &format!("{} ms", outcome.elapsed_ms));
    println!();

    for (index, item) in outcome.results.iter().enumerate() {
        match item {
            Ok(result) => println!(
                "  {} {:>4}  {}  {}",
                ok("✓"),
                index,
                risk_badge(result.risk_level),
                dim(&format!("p(good)={:.4}", result.probability_good_credit))
            ),
            Err(e) => println!("  {} {:>4}  {}", bad("✗"), e.index, e.error.to_string().yellow()),
        }
    }
}

fn print_description(description: &ModelDescription) {
    kv("Name", &description.name);
    kv("Stage", &description.stage);
    kv("Version", &description.version);
    kv("Classifier", &description.classifier);
    kv("Columns", &description.n_features.to_string());
    kv("Loaded at", &description.loaded_at.to_rfc3339());
    kv("Loads", &description.load_count.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "credit-inference",
            "--registry",
            "/srv/models",
            "predict",
            "--record",
            "{}",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.registry, Some(PathBuf::from("/srv/models")));
        assert!(matches!(cli.command, Commands::Predict { json: true, .. }));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["credit-inference", "check", "--stage", "staging"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.model_stage, "staging");
    }

    #[test]
    fn test_read_json_arg_inline() {
        let record: CreditRecord = read_json_arg(r#"{"Job": "A173", "Age in years": 35}"#).unwrap();
        assert_eq!(record.len(), 2);
        assert!(read_json_arg::<CreditRecord>("not json").is_err());
    }
}
