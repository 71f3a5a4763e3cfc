mod cli;
mod commands;
mod frontmatter;
mod logging;
mod output;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Detect { template, json } => commands::detect::run(&template, json),
        Commands::Check {
            template,
            schema,
            main,
            documents,
            json,
        } => commands::check::run(&template, &schema, main.as_deref(), &documents, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
