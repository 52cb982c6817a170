mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mathboard_core::{EngineConfig, FallbackPolicy};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mathboard")]
#[command(about = "Normalize, transliterate and validate generated math", long_about = None)]
struct Cli {
    /// Engine configuration (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the fallback policy: repaired, original or sentinel
    #[arg(long, global = true)]
    fallback: Option<FallbackPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the LaTeX pipeline and print the resulting blob
    Normalize {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Transliterate LaTeX to MathML
    ToMathml {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Validate a MathML fragment
    Validate {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
        /// Also submit the fragment to an online validator
        #[arg(long)]
        remote: bool,
    },
    /// Repair a MathML fragment and validate the result
    Repair {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Classify input and run the matching pipeline
    Route {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Report delimiter, argument and vocabulary problems in LaTeX
    CheckLatex {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Convert a plain-English phrase to LaTeX and MathML
    Phrase {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Render a JSON array of steps into display records
    Render {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
        #[arg(long, default_value = "cli")]
        request_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(fallback) = cli.fallback {
        config.fallback = fallback;
    }

    let output = match &cli.command {
        Commands::Normalize { path } => commands::normalize(&read_input(path)?, &config)?,
        Commands::ToMathml { path } => commands::to_mathml(&read_input(path)?)?,
        Commands::Validate { path, remote } => {
            let input = read_input(path)?;
            let mut output = commands::validate(&input, &config)?;
            if *remote {
                output["remote"] = commands::remote_check(&input)?;
            }
            output
        }
        Commands::Repair { path } => commands::repair(&read_input(path)?, &config)?,
        Commands::Route { path } => commands::route(&read_input(path)?, &config)?,
        Commands::CheckLatex { path } => commands::check_latex(&read_input(path)?, &config)?,
        Commands::Phrase { path } => commands::phrase(&read_input(path)?)?,
        Commands::Render { path, request_id } => {
            commands::render(&read_input(path)?, request_id, &config)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Reads the named file, or stdin when no file is given.
fn read_input(path: &Option<PathBuf>) -> anyhow::Result<String> {
    match path.as_deref() {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}
