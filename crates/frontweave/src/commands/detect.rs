//! Detect command - list items markers in a template

use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;
use frontweave_core::io::FsReader;
use frontweave_core::items::{ExpansionFormat, FormatClassifier, ItemsDetector, ItemsPattern};
use frontweave_core::template::{TemplateLoader, TemplateSource};
use serde::Serialize;

use crate::output::print_json;

#[derive(Debug, Serialize)]
struct MarkerEntry {
    path: String,
    offset: usize,
    context: String,
    format: ExpansionFormat,
}

#[derive(Debug, Serialize)]
struct DetectReport {
    template: String,
    has_markers: bool,
    markers: Vec<MarkerEntry>,
    malformed: Vec<ItemsPattern>,
    /// Validation failure (duplicate or nested markers)
    error: Option<String>,
}

/// Print every marker with its classified expansion shape
///
/// Exits non-zero when the markers fail validation.
pub fn run(template: &Path, json: bool) -> Result<()> {
    let definition = TemplateLoader::new(FsReader).load(template)?;
    let content = definition.content();

    let detector = ItemsDetector::new();
    let classifier = FormatClassifier::new();
    let detection = detector.detect(content)?;
    let error = detector
        .validate(&detection.patterns)
        .err()
        .map(|e| e.to_string());

    let report = DetectReport {
        template: template.display().to_string(),
        has_markers: detection.has_markers,
        markers: detection
            .patterns
            .iter()
            .map(|pattern| MarkerEntry {
                path: pattern.path.to_string(),
                offset: pattern.offset,
                context: pattern.context.clone(),
                format: classifier.classify_pattern(content, pattern),
            })
            .collect(),
        malformed: detection.malformed,
        error,
    };

    if json {
        print_json(&report)?;
    } else {
        render_human(&report);
    }

    if let Some(error) = report.error {
        bail!(error);
    }
    Ok(())
}

fn render_human(report: &DetectReport) {
    if !report.has_markers {
        println!("{} No items markers in {}", "→".cyan(), report.template);
    }

    for marker in &report.markers {
        println!(
            "{} {} [{}] {}",
            "✓".green().bold(),
            marker.path,
            format_label(&marker.format),
            marker.context.dimmed()
        );
    }

    for pattern in &report.malformed {
        println!(
            "{} {} malformed marker: {}",
            "⚠".yellow(),
            pattern.path,
            pattern.context
        );
    }
}

fn format_label(format: &ExpansionFormat) -> String {
    match format {
        ExpansionFormat::List { key: Some(key) } => format!("list under '{}'", key),
        ExpansionFormat::List { key: None } => "list".to_string(),
        ExpansionFormat::Array => "array".to_string(),
        ExpansionFormat::Text => "text".to_string(),
    }
}
