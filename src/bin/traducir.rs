//! Traducir CLI - structural Python-to-Aiken transpilation
//!
//! Reads a JSON-serialized source module (produced by an external parser
//! front end) and writes the corresponding Aiken module.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use traducir::{transpile, Module, Result};

/// Traducir - structural Python-to-Aiken transpiler
#[derive(Parser)]
#[command(name = "traducir")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transpile a serialized module to Aiken source
    Transpile {
        /// Input module as JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (defaults to the input path with an .ak extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Transpile and report warnings without writing output
    Check {
        /// Input module as JSON
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn load_module(path: &Path) -> Result<Module> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Transpile {
            input,
            output,
            format,
        } => {
            let module = load_module(&input)?;
            let emitted = transpile(&module);

            let output = output.unwrap_or_else(|| input.with_extension("ak"));
            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&emitted)?);
                }
                _ => {
                    std::fs::write(&output, &emitted.text)?;
                    println!("Wrote: {}", output.display());
                    for warning in &emitted.warnings {
                        eprintln!("Warning: {warning}");
                    }
                }
            }
        }

        Commands::Check { input } => {
            let module = load_module(&input)?;
            let emitted = transpile(&module);

            if emitted.warnings.is_empty() {
                println!("OK: no warnings");
            } else {
                for warning in &emitted.warnings {
                    eprintln!("Warning: {warning}");
                }
                eprintln!("{} warning(s)", emitted.warnings.len());
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
