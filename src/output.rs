//! @ai:module:intent Format results for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_build_report, format_batch_report, format_check_result, to_json
//! @ai:module:depends_on dataset, aligner, directive
//! @ai:module:stateless true

use crate::aligner::{AlignmentOutcome, Termination};
use crate::dataset::{BatchReport, BuildReport, CheckResult};
use crate::directive::ValidationError;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat, text: impl FnOnce(&T) -> String) -> String {
    match format {
        OutputFormat::Json => to_json(value, false),
        OutputFormat::JsonPretty => to_json(value, true),
        OutputFormat::Text => text(value),
    }
}

/// @ai:intent Format a directive check result
/// @ai:effects pure
pub fn format_check_result(result: &CheckResult, format: OutputFormat) -> String {
    render(result, format, format_check_result_text)
}

fn format_check_result_text(result: &CheckResult) -> String {
    let mut output = String::new();

    for rejection in &result.rejected {
        output.push_str(&format_rejection(rejection));
    }

    output.push('\n');
    output.push_str(&format!(
        "Checked {} lines, {} valid\n",
        result.lines_checked, result.valid
    ));

    if result.passed() {
        output.push_str(&format!("{} No rejected lines\n", "OK".green().bold()));
    } else {
        output.push_str(&format!(
            "{} rejected lines\n",
            result.rejected.len().to_string().red().bold()
        ));
    }

    output
}

fn format_rejection(rejection: &ValidationError) -> String {
    format!(
        "{} {} - {} ({})\n",
        "REJECT".yellow().bold(),
        format!("line {}", rejection.line_number()).dimmed(),
        rejection,
        rejection.code().dimmed()
    )
}

/// @ai:intent Format the report of a single build
/// @ai:effects pure
pub fn format_build_report(report: &BuildReport, format: OutputFormat) -> String {
    render(report, format, |report| {
        let mut output = String::new();
        output.push_str(&format!(
            "{} -> {}\n",
            report.text_path.display().to_string().bold(),
            report.output_path.display()
        ));
        for rejection in &report.outcome.rejected {
            output.push_str(&format_rejection(rejection));
        }
        output.push_str(&format!("  chunks: {}\n", report.chunks));
        output.push_str(&format!("  records written: {}\n", report.records_written));
        output.push_str(&format_outcome_text(&report.outcome));
        output
    })
}

fn format_outcome_text(outcome: &AlignmentOutcome) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "  documents: {}, directives applied: {}, rejected: {}\n",
        outcome.documents_emitted,
        outcome.directives_applied,
        outcome.rejected.len()
    ));

    match outcome.termination {
        Termination::DirectivesExhausted => {
            output.push_str(&format!("  {} all directives consumed\n", "OK".green().bold()));
        }
        Termination::ChunksExhausted if outcome.dropped_directives() => {
            output.push_str(&format!(
                "  {} chunks ran out with {} directive line(s) unconsumed\n",
                "WARN".yellow().bold(),
                outcome.unconsumed_directives.to_string().yellow()
            ));
        }
        Termination::ChunksExhausted => {
            output.push_str(&format!("  {} all chunks consumed\n", "OK".green().bold()));
        }
    }
    output
}

/// @ai:intent Format the report of a directory batch run
/// @ai:effects pure
pub fn format_batch_report(report: &BatchReport, format: OutputFormat) -> String {
    render(report, format, |report| {
        let mut output = String::new();

        for built in &report.built {
            output.push_str(&format_build_report(built, OutputFormat::Text));
        }
        for skipped in &report.skipped {
            output.push_str(&format!(
                "{} {} (no annotation file)\n",
                "SKIP".blue(),
                skipped.display()
            ));
        }
        for failure in &report.failures {
            output.push_str(&format!(
                "{} {} - {}\n",
                "ERROR".red().bold(),
                failure.path.display(),
                failure.message
            ));
        }

        output.push('\n');
        output.push_str(&format!(
            "Built {} files, {} documents, {} rejected lines, {} skipped\n",
            report.built.len(),
            report.documents_emitted(),
            report.rejected_lines(),
            report.skipped.len()
        ));
        output
    })
}
