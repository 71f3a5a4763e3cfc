//! Check command - verify template bindings against a schema and documents

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use colored::Colorize;
use frontweave_core::compose::{DEFAULT_ITEMS_KEY, DataComposer, ExpansionKey};
use frontweave_core::io::FsReader;
use frontweave_core::template::{TemplateLoader, TemplateSource};
use frontweave_core::{BindingReport, SchemaBindingResolver};
use serde_json::Value;

use super::inputs::{load_documents, load_main, load_schema};
use crate::output::print_json;

/// Print the binding report for `template`
///
/// Main data is composed with the documents the same way `render` does, so the
/// hierarchy root sees the collection. Exits non-zero when the report is invalid.
pub fn run(
    template: &Path,
    schema: &Path,
    main: Option<&Path>,
    documents: &[PathBuf],
    json: bool,
) -> Result<()> {
    let definition = TemplateLoader::new(FsReader).load(template)?;
    let schema = load_schema(schema)?;
    let resolver = SchemaBindingResolver::new();

    let target = resolver
        .resolve_hierarchy_root(&schema)?
        .unwrap_or_else(|| DEFAULT_ITEMS_KEY.to_string());
    let composed = DataComposer::new().compose(
        &load_main(main)?,
        &Value::Array(load_documents(documents)?),
        &[ExpansionKey::items(target)],
    )?;

    let report = resolver.validate_binding(&schema, definition.content(), &composed.main_data)?;

    if json {
        print_json(&report)?;
    } else {
        render_human(template, &report);
    }

    if !report.is_valid() {
        bail!("template '{}' has unresolved bindings", template.display());
    }
    Ok(())
}

fn render_human(template: &Path, report: &BindingReport) {
    println!("{} Checking {}", "→".cyan(), template.display());

    match &report.hierarchy_root {
        Some(root) => println!("  hierarchy root: {}", root),
        None => println!("  hierarchy root: (none)"),
    }
    println!(
        "  tokens: {} total, {} valid, {} invalid",
        report.total_tokens, report.valid_tokens, report.invalid_tokens
    );
    for name in &report.invalid_token_names {
        println!("  {} unresolved: {{{}}}", "✗".red(), name);
    }

    if report.uses_items {
        match &report.items_binding_reason {
            None => println!("  {} items binding ok", "✓".green()),
            Some(reason) => println!("  {} items binding: {}", "✗".red(), reason),
        }
    }

    if report.is_valid() {
        println!("{} Bindings valid", "✓".green().bold());
    } else {
        println!("{} Bindings invalid", "✗".red().bold());
    }
}
