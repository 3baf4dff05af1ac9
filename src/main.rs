//! `laravel-uml`: print a nomnoml class diagram of a Laravel project.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use laravel_uml::emitter::{emit_json, emit_nomnoml};
use laravel_uml::logging::init_logging;
use laravel_uml::{Config, UmlError, generate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// nomnoml diagram text
    Nomnoml,
    /// The class graph as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "laravel-uml")]
#[command(about = "Generate a class diagram of a Laravel application")]
#[command(version)]
struct Cli {
    /// Project root (the directory holding composer.json)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Configuration file (default: <ROOT>/laravel-uml.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Nomnoml)]
    format: Format,

    /// Log level (trace|debug|info|warn|error), overrides LARAVEL_UML_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (compact|pretty|json)
    #[arg(long)]
    log_format: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config, UmlError> {
    match &cli.config {
        Some(path) => Config::load(path),
        None => Config::discover(&cli.root),
    }
}

fn write_output(path: Option<&Path>, text: &str) -> std::io::Result<()> {
    match path {
        Some(path) => fs::write(path, format!("{}\n", text)),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref(), cli.log_format.as_deref()) {
        eprintln!("laravel-uml: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("laravel-uml: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let graph = match generate(&cli.root, &config) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("laravel-uml: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let text = match cli.format {
        Format::Nomnoml => emit_nomnoml(&graph, &config.style),
        Format::Json => match emit_json(&graph) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("laravel-uml: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    if let Err(e) = write_output(cli.output.as_deref(), &text) {
        eprintln!("laravel-uml: cannot write output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
