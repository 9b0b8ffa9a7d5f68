//! Suggestion formatting: JSON, Table, and Markdown output for review.

use std::fmt;
use std::str::FromStr;

use vlb_core::{Confidence, StrategyKind, Suggestion, SuggestionMap, VlbError};

/// Output format for reviewing suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = VlbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(VlbError::Config(format!("unknown output format '{other}'"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Table => f.write_str("table"),
            OutputFormat::Markdown => f.write_str("markdown"),
        }
    }
}

const COLUMNS: [&str; 6] = ["source", "target", "score", "confidence", "strategies", "reasons"];

/// Format a suggestion map in the specified output format.
#[must_use]
pub fn format_suggestions(map: &SuggestionMap, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(map),
        OutputFormat::Table => format_table(&rows(map)),
        OutputFormat::Markdown => format_markdown(&rows(map)),
    }
}

/// Keep only suggestions at or above `floor`, dropping sources left empty.
#[must_use]
pub fn filter_confidence(map: &SuggestionMap, floor: Confidence) -> SuggestionMap {
    map.iter()
        .filter_map(|(source, suggestions)| {
            let kept: Vec<Suggestion> = suggestions
                .iter()
                .filter(|s| s.confidence >= floor)
                .cloned()
                .collect();
            (!kept.is_empty()).then(|| (source.clone(), kept))
        })
        .collect()
}

fn format_json(map: &SuggestionMap) -> String {
    serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
}

fn rows(map: &SuggestionMap) -> Vec<[String; 6]> {
    map.iter()
        .flat_map(|(source, suggestions)| {
            suggestions.iter().map(move |s| {
                [
                    source.clone(),
                    s.target.clone(),
                    format!("{:.2}", s.score),
                    s.confidence.to_string(),
                    strategies_display(&s.strategies),
                    s.reasons
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                ]
            })
        })
        .collect()
}

fn strategies_display(strategies: &[StrategyKind]) -> String {
    strategies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn format_table(rows: &[[String; 6]]) -> String {
    if rows.is_empty() {
        return "(no suggestions)".to_string();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, val) in row.iter().enumerate() {
            widths[i] = widths[i].max(val.chars().count());
        }
    }

    let mut output = String::new();

    let header: Vec<String> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| pad(c, widths[i]))
        .collect();
    output.push_str(header.join(" | ").trim_end());
    output.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&sep.join("-+-"));
    output.push('\n');

    for row in rows {
        let vals: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, val)| pad(val, widths[i]))
            .collect();
        output.push_str(vals.join(" | ").trim_end());
        output.push('\n');
    }

    output
}

fn format_markdown(rows: &[[String; 6]]) -> String {
    if rows.is_empty() {
        return "*No suggestions*\n".to_string();
    }

    let mut output = String::new();

    output.push_str("| ");
    output.push_str(&COLUMNS.join(" | "));
    output.push_str(" |\n");

    output.push_str("| ");
    let seps: Vec<&str> = COLUMNS.iter().map(|_| "---").collect();
    output.push_str(&seps.join(" | "));
    output.push_str(" |\n");

    for row in rows {
        output.push_str("| ");
        let vals: Vec<String> = row.iter().map(|v| v.replace('|', "\\|")).collect();
        output.push_str(&vals.join(" | "));
        output.push_str(" |\n");
    }

    output
}

/// Left-align `value` to `width` characters (not bytes, so CJK titles line up).
fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{value}{}", " ".repeat(width.saturating_sub(len)))
}
