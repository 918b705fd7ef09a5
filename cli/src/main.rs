mod formatter;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formatter::Formatter;
use mathmend::{cleaner, gate, Pipeline, PipelineConfig, PipelineResult};
use std::fs;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mathmend")]
#[command(about = "Repair corrupted mathematical notation.")]
#[command(
    long_about = "mathmend detects and repairs corruption in recognized mathematical notation: \
shredded command fragments, spelled-out operators, flattened structure and unbalanced \
delimiters.\nIt emits clean formula markup, a semantic tree, a plain-text rendering, a \
confidence score and a diagnostic trail."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Repair formula markup and print the result
    ///
    /// Runs the full pipeline: gate, reconstruction, structural repair,
    /// compilation and validation. Reads from stdin when no input is given.
    Repair {
        /// Formula text to repair (stdin when omitted)
        input: Option<String>,
        /// Read input from a file instead
        #[arg(short = 'f', long = "file", conflicts_with = "input")]
        file: Option<PathBuf>,
        /// Emit the full result as JSON
        #[arg(long)]
        json: bool,
        /// Pretty-print the JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
        /// Include the repair log in the output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Validate or recover semantic tree markup
    ///
    /// Clean trees are normalized and re-emitted; corrupted trees have
    /// their text payload recovered through the formula pipeline.
    Tree {
        /// Tree markup to process (stdin when omitted)
        input: Option<String>,
        /// Read input from a file instead
        #[arg(short = 'f', long = "file", conflicts_with = "input")]
        file: Option<PathBuf>,
        /// Emit the full result as JSON
        #[arg(long)]
        json: bool,
        /// Pretty-print the JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
        /// Include the repair log in the output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run only the corruption gate and list what it finds
    ///
    /// No repair is attempted; useful for triaging a corpus before
    /// deciding what to reprocess.
    Gate {
        /// Formula text to classify (stdin when omitted)
        input: Option<String>,
        /// Read input from a file instead
        #[arg(short = 'f', long = "file", conflicts_with = "input")]
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Repair {
            input,
            file,
            json,
            pretty,
            verbose,
        } => repair_command(input.as_deref(), file.as_deref(), *json, *pretty, *verbose, false),
        Commands::Tree {
            input,
            file,
            json,
            pretty,
            verbose,
        } => repair_command(input.as_deref(), file.as_deref(), *json, *pretty, *verbose, true),
        Commands::Gate { input, file } => gate_command(input.as_deref(), file.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn repair_command(
    input: Option<&str>,
    file: Option<&std::path::Path>,
    json: bool,
    pretty: bool,
    verbose: bool,
    as_tree: bool,
) -> Result<()> {
    let text = read_input(input, file)?;
    let pipeline = Pipeline::with_config(PipelineConfig::default());
    let result = if as_tree {
        pipeline.process_semantic_tree(&text)
    } else {
        pipeline.process_formula_text(&text)
    };
    print_result(&result, json, pretty, verbose)?;
    if !result.is_valid {
        std::process::exit(2);
    }
    Ok(())
}

fn gate_command(input: Option<&str>, file: Option<&std::path::Path>) -> Result<()> {
    let text = read_input(input, file)?;
    let config = PipelineConfig::default();
    let cleaned = cleaner::clean(&text);
    let report = gate::classify_text(&cleaned, &config);
    print!("{}", Formatter::default().format_violations(&report));
    if !report.is_clean() {
        std::process::exit(2);
    }
    Ok(())
}

fn print_result(result: &PipelineResult, json: bool, pretty: bool, verbose: bool) -> Result<()> {
    if json {
        let serialized = if pretty {
            result.to_json_pretty()?
        } else {
            result.to_json()?
        };
        println!("{}", serialized);
    } else {
        print!("{}", Formatter::default().format_result(result, verbose));
    }
    Ok(())
}

fn read_input(input: Option<&str>, file: Option<&std::path::Path>) -> Result<String> {
    if let Some(text) = input {
        return Ok(text.to_string());
    }
    if let Some(path) = file {
        return fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("could not read stdin")?;
    Ok(buffer)
}
