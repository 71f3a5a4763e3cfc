//! Render command - compose documents into one output file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use frontweave_core::compose::DEFAULT_ITEMS_KEY;
use frontweave_core::config::{CONFIG_FILE, Config};
use frontweave_core::io::{FsReader, FsWriter};
use frontweave_core::{Format, MissingMode, RenderOptions, Renderer};
use tracing::debug;

use super::inputs::{load_documents, load_main, load_schema};
use crate::cli::RenderArgs;

/// Settings after merging flags over frontweave.toml
#[derive(Debug)]
struct Settings {
    main_template: PathBuf,
    item_template: Option<PathBuf>,
    output: PathBuf,
    format: Option<Format>,
    missing: MissingMode,
    schema: Option<PathBuf>,
    items_key: String,
    main: Option<PathBuf>,
    documents: Vec<PathBuf>,
}

/// Render documents through the configured templates
///
/// Flags override config values. Paths from the config file are relative to
/// the directory holding it.
pub fn run(args: RenderArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let settings = merge(args, config)?;
    debug!(?settings, "render settings");

    let items = load_documents(&settings.documents)?;
    let main_data = load_main(settings.main.as_deref())?;
    let schema = settings.schema.as_deref().map(load_schema).transpose()?;

    let renderer = Renderer::new(FsReader, FsWriter).with_options(RenderOptions {
        missing: settings.missing,
        items_key: settings.items_key,
        schema,
        ..RenderOptions::default()
    });

    renderer.render_output(
        &settings.main_template,
        settings.item_template.as_deref(),
        &main_data,
        &items,
        &settings.output,
        settings.format,
    )?;

    println!(
        "{} Rendered {} item(s) into {}",
        "✓".green().bold(),
        items.len(),
        settings.output.display()
    );
    Ok(())
}

/// Explicit `--config`, else ./frontweave.toml when present
fn load_config(explicit: Option<&Path>) -> Result<Option<(Config, PathBuf)>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if !default.is_file() {
                return Ok(None);
            }
            default
        }
    };

    let config = Config::from_file(&path)
        .with_context(|| format!("failed to load config '{}'", path.display()))?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(Some((config, base)))
}

fn merge(args: RenderArgs, config: Option<(Config, PathBuf)>) -> Result<Settings> {
    let Some((config, base)) = config else {
        let Some(main_template) = args.main_template else {
            bail!("no main template: pass --main-template or set render.main_template in {CONFIG_FILE}");
        };
        let Some(output) = args.output else {
            bail!("no output: pass --output or set render.output in {CONFIG_FILE}");
        };
        return Ok(Settings {
            main_template,
            item_template: args.item_template,
            output,
            format: args.format.map(Format::from),
            missing: args.missing.map(MissingMode::from).unwrap_or_default(),
            schema: args.schema,
            items_key: DEFAULT_ITEMS_KEY.to_string(),
            main: args.main,
            documents: args.documents,
        });
    };

    let rebase = |path: PathBuf| base.join(path);
    let documents = if args.documents.is_empty() {
        config.input.documents.into_iter().map(rebase).collect()
    } else {
        args.documents
    };

    Ok(Settings {
        main_template: args
            .main_template
            .unwrap_or_else(|| rebase(config.render.main_template)),
        item_template: args
            .item_template
            .or_else(|| config.render.item_template.map(rebase)),
        output: args.output.unwrap_or_else(|| rebase(config.render.output)),
        format: args.format.map(Format::from).or(config.render.format),
        missing: args
            .missing
            .map(MissingMode::from)
            .unwrap_or(config.render.missing),
        schema: args.schema.or_else(|| config.schema.path.map(rebase)),
        items_key: config.schema.items_key,
        main: args.main.or_else(|| config.input.main.map(rebase)),
        documents,
    })
}
