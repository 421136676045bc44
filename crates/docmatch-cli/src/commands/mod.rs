//! Subcommands and the output helpers they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod records;

use std::fmt::Write;
use std::path::Path;

use tracing::debug;

use docmatch_core::models::config::DocmatchConfig;
use docmatch_core::{DocumentOutcome, DocumentResult, ReportEntry};

/// Load the config from `--config`, else the default path if present,
/// else defaults. Environment overrides are applied last.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocmatchConfig> {
    let config = match config_path {
        Some(path) => DocmatchConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config from {}", default_path.display());
                DocmatchConfig::from_file(&default_path)?
            } else {
                DocmatchConfig::default()
            }
        }
    };
    Ok(config.with_env_overrides())
}

/// Human-readable rendering of one result.
pub fn format_result_text(name: &str, result: &DocumentResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Document: {}", name);
    output.push('\n');

    output.push_str("Extracted text:\n");
    for line in result.extraction.to_string().lines() {
        let _ = writeln!(output, "  {}", line);
    }

    if let Some(fields) = &result.fields {
        output.push('\n');
        output.push_str("Fields:\n");
        for (field, value) in fields.iter() {
            let _ = writeln!(output, "  {}: {}", field, value.unwrap_or("-"));
        }
    }

    if let Some(accuracy) = result.accuracy() {
        output.push('\n');
        let _ = writeln!(output, "Accuracy: {:.2}%", accuracy);
    }

    if let Some(mismatches) = result.mismatches().filter(|m| !m.is_empty()) {
        output.push_str("Mismatches:\n");
        for (field, mismatch) in mismatches {
            let _ = writeln!(
                output,
                "  {}: expected {:?}, found {}",
                field,
                mismatch.reference,
                mismatch
                    .parsed
                    .as_deref()
                    .map(|p| format!("{:?}", p))
                    .unwrap_or_else(|| "nothing".to_string())
            );
        }
    }

    if let Some(error) = result.comparison_error() {
        output.push('\n');
        let _ = writeln!(output, "Comparison error: {}", error);
    }

    output
}

/// One CSV row per entry.
pub fn format_entries_csv(entries: &[ReportEntry]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "filename",
        "status",
        "record_id",
        "accuracy",
        "mismatched_fields",
        "comparison_error",
        "error",
    ])?;

    for entry in entries {
        match &entry.outcome {
            DocumentOutcome::Processed(result) => {
                let record_id = result
                    .fields
                    .as_ref()
                    .and_then(|f| f.record_id())
                    .unwrap_or_default();
                let mismatched: Vec<&str> = result
                    .mismatches()
                    .into_iter()
                    .flat_map(|m| m.keys().map(|f| f.label()))
                    .collect();
                let error = result
                    .extraction
                    .failure()
                    .map(|f| f.to_string())
                    .unwrap_or_default();

                let accuracy = result
                    .accuracy()
                    .map(|a| format!("{:.2}", a))
                    .unwrap_or_default();

                wtr.write_record([
                    entry.name.as_str(),
                    "processed",
                    record_id,
                    accuracy.as_str(),
                    mismatched.join(";").as_str(),
                    result.comparison_error().map(|e| e.message()).unwrap_or_default(),
                    error.as_str(),
                ])?;
            }
            DocumentOutcome::Failed { error } => {
                wtr.write_record([entry.name.as_str(), "error", "", "", "", "", error.as_str()])?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
