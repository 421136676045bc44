//! Batch command - verify many documents in one report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use tracing::{debug, warn};

use docmatch_core::{BatchReport, DocumentOutcome, Pipeline};

use super::process::{OutputFormat, spinner};
use super::{format_entries_csv, format_result_text, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print a per-document summary to stderr
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let pipeline = Pipeline::from_config(&config)?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        warn!("No matching files found for: {}", args.inputs.join(" "));
    }

    let pb = spinner(format!("Processing {} files...", files.len()));
    let report = pipeline.run_files(files).await;
    pb.finish_and_clear();

    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.summary {
        print_summary(&report);
    }

    debug!("Batch finished in {:?}", start.elapsed());

    Ok(())
}

/// Expand each input as a glob, keeping input order and dropping
/// directories. Inputs matching nothing are skipped.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let before = files.len();
        files.extend(glob(input)?.filter_map(|r| r.ok()).filter(|p| p.is_file()));
        if files.len() == before {
            warn!("No files match {}", input);
        }
    }
    Ok(files)
}

fn format_report(report: &BatchReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_entries_csv(report.entries()),
        OutputFormat::Text => Ok(format_report_text(report)),
    }
}

fn format_report_text(report: &BatchReport) -> String {
    let mut output = String::new();

    if let Some(error) = report.error() {
        output.push_str(&format!("Error: {}\n", error));
    }

    for entry in report.entries() {
        match &entry.outcome {
            DocumentOutcome::Processed(result) => {
                output.push_str(&format_result_text(&entry.name, result));
            }
            DocumentOutcome::Failed { error } => {
                output.push_str(&format!("Document: {}\n\nError: {}\n", entry.name, error));
            }
        }
        output.push('\n');
    }

    output
}

fn print_summary(report: &BatchReport) {
    eprintln!();

    if let Some(error) = report.error() {
        eprintln!("{} {}", style("✗").red(), error);
        return;
    }

    eprintln!(
        "{} Processed {} documents at {}",
        style("✓").green(),
        report.len(),
        report.processed_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    eprintln!(
        "   {} processed, {} failed",
        style(report.processed_count()).green(),
        style(report.failed_count()).red()
    );

    for entry in report.entries() {
        match &entry.outcome {
            DocumentOutcome::Processed(result) => match result.accuracy() {
                Some(accuracy) if accuracy >= 100.0 => {
                    eprintln!("  {} {}: {:.2}%", style("✓").green(), entry.name, accuracy)
                }
                Some(accuracy) => {
                    eprintln!("  {} {}: {:.2}%", style("!").yellow(), entry.name, accuracy)
                }
                None => eprintln!(
                    "  {} {}: {}",
                    style("-").dim(),
                    entry.name,
                    result
                        .comparison_error()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| result.extraction.to_string())
                ),
            },
            DocumentOutcome::Failed { error } => {
                eprintln!("  {} {}: {}", style("✗").red(), entry.name, error)
            }
        }
    }
}
