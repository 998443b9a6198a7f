use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use form_schema_core::{Form, FormDefinition, Map};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "form-schema")]
#[command(about = "Render and check declarative form definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a definition into renderer rule and config JSON.
    Render(RenderArgs),
    /// Check one or more definitions for malformed rules and duplicate fields.
    Check(CheckArgs),
    /// List every field of a definition, depth first.
    Fields(FieldsArgs),
    /// Run validation rules against a definition's data.
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Definition file (.json, .yaml or .yml).
    definition: PathBuf,
    /// JSON file with field values replacing the definition's data.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,
    /// Write the output to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Definition files.
    #[arg(required = true)]
    definitions: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct FieldsArgs {
    /// Definition file.
    definition: PathBuf,
}

#[derive(Debug, Args)]
struct VerifyArgs {
    /// Definition file.
    definition: PathBuf,
    /// JSON file with field values replacing the definition's data.
    #[arg(long)]
    data: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Render(args) => run_render(args),
        Command::Check(args) => run_check(args),
        Command::Fields(args) => run_fields(args),
        Command::Verify(args) => run_verify(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_render(args: RenderArgs) -> Result<(), String> {
    let form = load_form(&args.definition, args.data.as_deref())?;

    let rule = form
        .parse_form_rule()
        .map_err(|err| format!("Failed to encode rules: {err}"))?;
    let config = form
        .parse_form_config()
        .map_err(|err| format!("Failed to encode config: {err}"))?;

    let rule = parse_bytes(&rule)?;
    let roots = rule.as_array().map_or(0, Vec::len);

    let mut document = Map::new();
    document.insert("rule".into(), rule);
    document.insert("config".into(), parse_bytes(&config)?);
    let document = Value::Object(document);

    let raw = if args.pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|err| format!("Failed to serialize output: {err}"))?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!(
                            "Failed to create output directory '{}': {err}",
                            parent.display()
                        )
                    })?;
                }
            }
            fs::write(&path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            println!("Rendered {roots} rule(s) into '{}'.", path.display());
        }
        None => println!("{raw}"),
    }

    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let mut failures = 0;
    for path in &args.definitions {
        match load_form(path, None) {
            Ok(form) => println!("{}: ok ({} field(s))", path.display(), form.fields().len()),
            Err(err) => {
                eprintln!("{err}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} definition(s) failed",
            args.definitions.len()
        ));
    }
    Ok(())
}

fn run_fields(args: FieldsArgs) -> Result<(), String> {
    let form = load_form(&args.definition, None)?;
    for field in form.fields() {
        println!("{field}");
    }
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), String> {
    let form = load_form(&args.definition, args.data.as_deref())?;
    let violations = form.verify();
    if violations.is_empty() {
        println!("All {} field(s) passed.", form.fields().len());
        return Ok(());
    }

    for violation in &violations {
        eprintln!("  {}: {}", violation.field, violation.message);
    }
    Err(format!("{} rule violation(s)", violations.len()))
}

fn load_form(path: &Path, data: Option<&Path>) -> Result<Form, String> {
    let definition = FormDefinition::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    let form = definition
        .into_form()
        .map_err(|err| format!("Invalid definition '{}': {err}", path.display()))?;

    if let Some(data_path) = data {
        let raw = fs::read_to_string(data_path)
            .map_err(|err| format!("Failed to read '{}': {err}", data_path.display()))?;
        let values: Map = serde_json::from_str(&raw)
            .map_err(|err| format!("Invalid data file '{}': {err}", data_path.display()))?;
        form.form_data(values);
    }

    Ok(form)
}

fn parse_bytes(bytes: &[u8]) -> Result<Value, String> {
    serde_json::from_slice(bytes).map_err(|err| format!("Failed to decode output: {err}"))
}
