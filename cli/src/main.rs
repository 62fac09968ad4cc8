use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use docschema_core::{BatchReport, ReportMode, Schema, UnknownFieldPolicy, Validator};
use docschema_loader::{ValidatorConfig, load_schema, read_documents, to_json_schema};
use tracing::info;

/// Exit status when at least one document is rejected.
const EXIT_REJECTED: i32 = 1;
/// Exit status for load, usage and I/O errors.
const EXIT_ERROR: i32 = 2;

/// Report format for the `validate` command.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "docschema", version)]
#[command(about = "Check document-store collection schemas and validate documents against them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a schema description and report its shape.
    Check(CheckArgs),
    /// Validate a JSON array or JSON-lines file of documents.
    Validate(ValidateArgs),
    /// Write a schema as a `$jsonSchema` collection validator.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (.json, .yaml or .yml).
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema file (.json, .yaml or .yml).
    #[arg(long)]
    schema: PathBuf,
    /// Documents file (JSON array or JSON lines).
    documents: PathBuf,
    /// Validator configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report fields the schema does not declare.
    #[arg(long)]
    strict: bool,
    /// Report only the first violation per document.
    #[arg(long)]
    first: bool,
    /// Number of parallel validation jobs (default: sequential).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output format for the report.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Schema file (.json, .yaml or .yml).
    schema: PathBuf,
    /// Output path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Result of a successful run.
enum Outcome {
    Clean,
    Rejected,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Validate(args) => run_validate(args),
        Command::Export(args) => run_export(args),
    };

    match result {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::Rejected) => std::process::exit(EXIT_REJECTED),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn load(path: &Path) -> Result<Schema, String> {
    load_schema(path).map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))
}

fn run_check(args: CheckArgs) -> Result<Outcome, String> {
    let schema = load(&args.schema)?;
    println!(
        "Schema '{}' OK: {} field(s), {} required, {} nullable.",
        schema.title().unwrap_or("<untitled>"),
        schema.len(),
        schema.required_fields().count(),
        schema.nullable_fields().count()
    );
    Ok(Outcome::Clean)
}

fn run_validate(args: ValidateArgs) -> Result<Outcome, String> {
    let schema = load(&args.schema)?;
    let documents = read_documents(&args.documents).map_err(|err| {
        format!(
            "Failed to read documents '{}': {err}",
            args.documents.display()
        )
    })?;

    let config = match &args.config {
        Some(path) => ValidatorConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    let mut validator: Validator = config.validator();
    if args.strict {
        validator = validator.with_unknown_fields(UnknownFieldPolicy::Strict);
    }
    if args.first {
        validator = validator.with_report_mode(ReportMode::First);
    }

    let report = match args.jobs {
        Some(0) => return Err("--jobs must be at least 1".to_string()),
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| format!("Failed to create thread pool: {e}"))?;
            pool.install(|| validator.validate_batch_parallel(&schema, &documents))
        }
        None => validator.validate_batch(&schema, &documents),
    };

    info!(
        total = report.total,
        rejected = report.rejected.len(),
        "validation finished"
    );

    match args.format {
        CliOutputFormat::Text => print_text_report(&report),
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to serialize report: {e}"))?;
            println!("{json}");
        }
    }

    Ok(if report.is_clean() {
        Outcome::Clean
    } else {
        Outcome::Rejected
    })
}

fn print_text_report(report: &BatchReport) {
    for rejected in &report.rejected {
        for violation in &rejected.violations {
            println!("document {}: {violation}", rejected.index);
        }
    }
    println!(
        "Validated {} document(s): {} accepted, {} rejected.",
        report.total,
        report.accepted(),
        report.rejected.len()
    );
}

fn run_export(args: ExportArgs) -> Result<Outcome, String> {
    let schema = load(&args.schema)?;
    let raw = serde_json::to_string_pretty(&to_json_schema(&schema))
        .map_err(|err| format!("Failed to serialize schema: {err}"))?;

    let Some(output) = args.output else {
        println!("{raw}");
        return Ok(Outcome::Clean);
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(&output, raw)
        .map_err(|err| format!("Failed to write '{}': {err}", output.display()))?;
    println!(
        "Exported {} field(s) to '{}'.",
        schema.len(),
        output.display()
    );
    Ok(Outcome::Clean)
}
