//! CLI command structure using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use frontweave_core::{Format, MissingMode};

#[derive(Parser)]
#[command(name = "frontweave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logs (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render document frontmatter through the templates into one output
    Render(RenderArgs),

    /// List items markers found in a template
    Detect {
        /// Template file (JSON or YAML)
        template: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a template's placeholders bind against a schema and documents
    Check {
        /// Template file (JSON or YAML)
        template: PathBuf,

        /// JSON Schema declaring the hierarchy root
        #[arg(long)]
        schema: PathBuf,

        /// Document providing main data
        #[arg(long)]
        main: Option<PathBuf>,

        /// Documents contributing collection elements
        documents: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct RenderArgs {
    /// Config file (defaults to ./frontweave.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Container template, rendered once
    #[arg(long)]
    pub main_template: Option<PathBuf>,

    /// Item template, rendered per collection element
    #[arg(long)]
    pub item_template: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output syntax (default: from the output extension)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Handling of placeholders without a value
    #[arg(long, value_enum)]
    pub missing: Option<MissingArg>,

    /// JSON Schema declaring the hierarchy root
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Document providing main data
    #[arg(long)]
    pub main: Option<PathBuf>,

    /// Documents contributing collection elements, in order
    pub documents: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Yaml => Format::Yaml,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MissingArg {
    /// Substitute empty text
    Empty,
    /// Keep the placeholder verbatim
    Verbose,
    /// Fail on the first missing value
    Strict,
}

impl From<MissingArg> for MissingMode {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Empty => MissingMode::Empty,
            MissingArg::Verbose => MissingMode::Verbose,
            MissingArg::Strict => MissingMode::Strict,
        }
    }
}
