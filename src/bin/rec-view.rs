//! CLI tool to inspect and filter fixed-width record files.
//!
//! Usage:
//!   rec-view schema
//!   rec-view domains <input> [--schema layout.json] [--field NAME]
//!   rec-view filter <input> [--select NAME=VALUE]... [--prune NAME]... [--any] [-o out]
//!   rec-view run <session.rview> <input> [-o out]
//!
//! Without `--schema` the built-in default layout is used. Output goes to
//! stdout unless `-o` is given.

use clap::{Parser, Subcommand};
use recview::{
    ActiveFields, DEFAULT_SCHEMA_JSON, FilterSelection, LINE_SEPARATOR, PruneMode,
    RecordFilterEngine, parse_script, run_script,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

/// Inspect and filter fixed-width record files using a JSON column schema.
#[derive(Parser)]
#[command(name = "rec-view", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default schema JSON
    Schema,

    /// Print the distinct values of each field
    Domains {
        /// Record file, one record per line
        input: PathBuf,

        /// Schema JSON file (default layout if omitted)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Only print this field's values
        #[arg(short, long)]
        field: Option<String>,
    },

    /// Show records matching chosen values, optionally pruning the dataset
    Filter {
        /// Record file, one record per line
        input: PathBuf,

        /// Schema JSON file (default layout if omitted)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Chosen value, as NAME=VALUE (repeatable)
        #[arg(long = "select", value_name = "NAME=VALUE")]
        selections: Vec<String>,

        /// Prune the dataset on this field after filtering (repeatable)
        #[arg(long = "prune", value_name = "NAME")]
        prune: Vec<String>,

        /// Keep records matching any pruned field instead of all
        #[arg(long)]
        any: bool,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a session script against a record file
    Run {
        /// Session script
        script: PathBuf,

        /// Record file, one record per line
        input: PathBuf,

        /// Schema JSON file (default layout if omitted)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting up logging: {e}");
    }

    let result = match cli.command {
        Commands::Schema => Ok(DEFAULT_SCHEMA_JSON.to_string() + "\n"),
        Commands::Domains {
            input,
            schema,
            field,
        } => domains(&input, schema.as_deref(), field.as_deref()),
        Commands::Filter {
            input,
            schema,
            selections,
            prune,
            any,
            output,
        } => filter(&input, schema.as_deref(), &selections, &prune, any)
            .and_then(|text| write_output(output.as_deref(), text)),
        Commands::Run {
            script,
            input,
            schema,
            output,
        } => run(&script, &input, schema.as_deref())
            .and_then(|text| write_output(output.as_deref(), text)),
    };

    match result {
        Ok(text) => {
            if let Err(e) = io::stdout().write_all(text.as_bytes()) {
                eprintln!("Error writing output: {e}");
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

/// Build an engine from the record file and optional schema file.
fn open_engine(input: &Path, schema: Option<&Path>) -> Result<RecordFilterEngine, String> {
    let mut engine = RecordFilterEngine::new();
    if let Some(schema_path) = schema {
        let json = fs::read_to_string(schema_path).map_err(|e| {
            format!("Error reading schema file '{}': {e}", schema_path.display())
        })?;
        engine
            .set_schema(&json)
            .map_err(|e| format!("Error in schema file '{}': {e}", schema_path.display()))?;
    }
    engine
        .load_file(input)
        .map_err(|e| format!("Error loading records: {e}"))?;
    Ok(engine)
}

fn field_index(engine: &RecordFilterEngine, name: &str) -> Result<usize, String> {
    engine
        .field_index(name)
        .ok_or_else(|| format!("No field named '{name}' in schema"))
}

fn lines_text<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push_str(LINE_SEPARATOR);
    }
    text
}

fn display_value(value: &str) -> String {
    if value.is_empty() {
        "(blank)".to_string()
    } else {
        value.to_string()
    }
}

fn domains(input: &Path, schema: Option<&Path>, field: Option<&str>) -> Result<String, String> {
    let engine = open_engine(input, schema)?;

    let mut out = Vec::new();
    match field {
        Some(name) => {
            let index = field_index(&engine, name)?;
            if let Some(domain) = engine.domain(index) {
                out.extend(domain.iter().map(|v| display_value(v)));
            }
        }
        None => {
            for (index, domain) in engine.domains().iter().enumerate() {
                let label = engine.schema().label(index).unwrap_or_default();
                out.push(format!("[{label}]"));
                out.extend(domain.iter().map(|v| display_value(v)));
            }
        }
    }
    Ok(lines_text(out.iter().map(String::as_str)))
}

fn filter(
    input: &Path,
    schema: Option<&Path>,
    selections: &[String],
    prune: &[String],
    any: bool,
) -> Result<String, String> {
    let mut engine = open_engine(input, schema)?;

    let mut selection = FilterSelection::new();
    for pair in selections {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Invalid --select '{pair}' (expected NAME=VALUE)"))?;
        selection.set(field_index(&engine, name)?, value);
    }
    let shown = engine
        .filter_by_table(selection)
        .map_err(|e| format!("Filter error: {e}"))?
        .len();
    debug!(shown, "rows shown after table filter");

    if prune.is_empty() {
        return Ok(lines_text(engine.view().iter().map(|r| r.as_str())));
    }

    let active = prune
        .iter()
        .map(|name| field_index(&engine, name))
        .collect::<Result<ActiveFields, _>>()?;
    let mode = if any {
        PruneMode::AnyField
    } else {
        PruneMode::AllFields
    };
    engine
        .filter_by_input(&active, mode)
        .map_err(|e| format!("Prune error: {e}"))?;
    Ok(engine.export_all())
}

fn run(script: &Path, input: &Path, schema: Option<&Path>) -> Result<String, String> {
    let script_text = fs::read_to_string(script)
        .map_err(|e| format!("Error reading script file '{}': {e}", script.display()))?;
    let commands = parse_script(&script_text).map_err(|e| format!("Script error: {e}"))?;

    let mut engine = open_engine(input, schema)?;
    let output = run_script(&mut engine, &commands).map_err(|e| format!("Session error: {e}"))?;
    info!(
        records = output.record_count,
        shown = output.view_count,
        "session finished"
    );
    Ok(lines_text(output.lines.iter().map(String::as_str)))
}

/// Write `text` to `path` when given and return nothing for stdout;
/// otherwise hand `text` back for stdout.
fn write_output(path: Option<&Path>, text: String) -> Result<String, String> {
    let Some(out_path) = path else {
        return Ok(text);
    };
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
        && fs::create_dir_all(parent).is_err()
    {
        return Err(format!(
            "Error creating output directory for '{}'",
            out_path.display()
        ));
    }
    fs::write(out_path, &text)
        .map_err(|e| format!("Error writing output file '{}': {e}", out_path.display()))?;
    Ok(String::new())
}
