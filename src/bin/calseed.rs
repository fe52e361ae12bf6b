//! Calseed CLI - Command-line interface for Core 90 Seed
//!
//! Commands:
//! - import: Parse a calendar CSV into day templates
//! - validate: Check a calendar CSV and report what an import would drop
//! - plan: Build the store upsert plan for a calendar CSV
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use core90_seed::plan::{PlanBuilder, PlanOptions};
use core90_seed::types::{DayTemplate, ImportOutcome};
use core90_seed::warnings::ImportWarning;
use core90_seed::{import_calendar_csv, CalendarImporter, ImportError, PRODUCER_NAME, SEED_VERSION};

/// Calseed - CSV calendar-template importer for the Core 90 guided program
#[derive(Parser)]
#[command(name = "calseed")]
#[command(author = "Core 90")]
#[command(version = SEED_VERSION)]
#[command(about = "Transform calendar CSV exports into day templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a calendar CSV into day templates
    Import {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Program start date (YYYY-MM-DD); resolves each day's date
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Suppress warnings on stderr
        #[arg(long)]
        quiet: bool,
    },

    /// Check a calendar CSV and report what an import would drop
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,

        /// Fail when the import would drop any data
        #[arg(long)]
        strict: bool,
    },

    /// Build the store upsert plan for a calendar CSV
    Plan {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Calendar slug (natural key for the upsert)
        #[arg(long, default_value = "default")]
        slug: String,

        /// Calendar title
        #[arg(long, default_value = "Core 90")]
        title: String,

        /// Calendar description
        #[arg(long, default_value = "Seeded via CSV")]
        description: String,

        /// Program length in days
        #[arg(long, default_value = "90")]
        duration_days: u32,

        /// Program start date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one day template per line)
    Ndjson,
    /// JSON array of day templates
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (calendar template CSV)
    Input,
    /// Output schema (day template JSON)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SeedCliError> {
    match cli.command {
        Commands::Import {
            input,
            output,
            output_format,
            start_date,
            quiet,
        } => cmd_import(&input, &output, output_format, start_date, quiet),

        Commands::Validate {
            input,
            json,
            strict,
        } => cmd_validate(&input, json, strict),

        Commands::Plan {
            input,
            output,
            slug,
            title,
            description,
            duration_days,
            start_date,
            output_format,
        } => {
            let options = PlanOptions {
                slug,
                title,
                description,
                duration_days,
                start_date: Some(start_date.unwrap_or_else(|| Utc::now().date_naive())),
            };
            cmd_plan(&input, &output, &options, output_format)
        }

        Commands::Schema { schema_type, json } => cmd_schema(schema_type, json),
    }
}

fn cmd_import(
    input: &PathBuf,
    output: &PathBuf,
    output_format: OutputFormat,
    start_date: Option<NaiveDate>,
    quiet: bool,
) -> Result<(), SeedCliError> {
    let input_data = read_input(input)?;
    let importer = match start_date {
        Some(start) => CalendarImporter::with_start_date(start),
        None => CalendarImporter::new(),
    };
    let outcome = importer.import(&input_data)?;

    if !quiet {
        report_warnings(&outcome.warnings);
    }

    if outcome.is_empty() {
        return Err(ImportError::EmptyImport.into());
    }

    let output_data = format_output(&outcome.days, &output_format)?;
    write_output(output, &output_data)?;

    Ok(())
}

fn cmd_validate(input: &PathBuf, json: bool, strict: bool) -> Result<(), SeedCliError> {
    let input_data = read_input(input)?;
    let outcome = import_calendar_csv(&input_data)?;

    let report = ImportReport::from_outcome(&outcome);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Rows scanned:     {}", report.rows_scanned);
        println!("Days recovered:   {}", report.days_recovered);
        println!("Field templates:  {}", report.field_templates);
        println!("Behavior metrics: {}", report.behavior_metrics);

        if !report.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &report.warnings {
                println!("  - [{}] {}", warning.kind, warning.detail);
            }
        }
    }

    if report.days_recovered == 0 {
        return Err(ImportError::EmptyImport.into());
    }
    if strict && !report.warnings.is_empty() {
        return Err(SeedCliError::ValidationFailed(report.warnings.len()));
    }

    Ok(())
}

fn cmd_plan(
    input: &PathBuf,
    output: &PathBuf,
    options: &PlanOptions,
    output_format: OutputFormat,
) -> Result<(), SeedCliError> {
    let input_data = read_input(input)?;
    let outcome = import_calendar_csv(&input_data)?;

    report_warnings(&outcome.warnings);

    let plan = PlanBuilder::build(&outcome, options)?;

    // A plan is one document; ndjson degenerates to compact JSON.
    let output_data = match output_format {
        OutputFormat::Ndjson => serde_json::to_string(&plan)? + "\n",
        OutputFormat::Json => serde_json::to_string(&plan)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&plan)?,
    };
    write_output(output, &output_data)?;

    Ok(())
}

fn cmd_schema(schema_type: SchemaType, json: bool) -> Result<(), SeedCliError> {
    match schema_type {
        SchemaType::Input => {
            if json {
                println!("{}", get_input_schema_json());
            } else {
                println!("Input Schema: calendar template CSV");
                println!();
                println!("Fixed columns:");
                println!("  day_number          positive integer; rows without one are dropped");
                println!("  assignment_title    later non-empty cells overwrite earlier ones");
                println!("  assignment_summary  optional; merges like the title");
                println!("  tracker_prompt      optional; merges like the title");
                println!();
                println!("Definition blocks repeat under {{family}}_{{role}}[_{{index}}] columns:");
                println!();
                println!("  families: field, tracker");
                println!("  roles, consumed in order: key, label, type, required, options");
                println!("  index: optional positive integer; a column without one is index 1");
                println!();
                println!("  The options column is claimed positionally: after key/label/type/");
                println!("  required, the next column counts as options only when its cell");
                println!("  contains a '|' or ',' separator.");
                println!();
                println!("Cell values:");
                println!("  field types: short_text, long_text, number, boolean, select,");
                println!("               multi_select, scale, date, file");
                println!("  tracker types: boolean, number, scale (others degrade to fields)");
                println!("  required: true, t, or 1 (case-insensitive); anything else is false");
                println!("  options: 'A|B|C' or 'A,B,C'; tracker ranges use '|' only, e.g. '1|5'");
            }
        }
        SchemaType::Output => {
            if json {
                println!("{}", get_output_schema_json());
            } else {
                println!("Output Schema: calendar.day_template.v1");
                println!();
                println!("Each day template contains:");
                println!();
                println!("- id: run-scoped identifier, regenerated on every parse");
                println!("- day_number: positive integer, unique and ascending in the output");
                println!("- day_date: present only once resolved against a program start");
                println!("- assignment_title, assignment_summary, tracker_prompt");
                println!("- fields: ordered field templates, keys unique within the day");
                println!("  - field_key, field_label, field_type, is_required, options");
                println!("- behavior_metrics: first definition site of each metric;");
                println!("  keys unique across the whole import");
                println!("  - metric_key, metric_label, metric_type, min_value, max_value");
                println!();
                println!("Stores must upsert on natural keys (day number, field key, metric");
                println!("key), never on the generated identifiers.");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, SeedCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(SeedCliError::StdinIsTty);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &PathBuf, data: &str) -> Result<(), SeedCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output(days: &[DayTemplate], format: &OutputFormat) -> Result<String, SeedCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for day in days {
                lines.push(serde_json::to_string(day)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(days)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(days)?),
    }
}

fn report_warnings(warnings: &[ImportWarning]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

fn get_input_schema_json() -> String {
    serde_json::json!({
        "title": "calendar.template.csv",
        "description": "Column convention for Core 90 calendar template exports",
        "fixed_columns": ["day_number", "assignment_title", "assignment_summary", "tracker_prompt"],
        "block_pattern": "{family}_{role}[_{index}]",
        "families": ["field", "tracker"],
        "roles": ["key", "label", "type", "required", "options"],
        "field_types": [
            "short_text", "long_text", "number", "boolean", "select",
            "multi_select", "scale", "date", "file"
        ],
        "tracker_types": ["boolean", "number", "scale"],
        "required_literals": ["true", "t", "1"],
        "option_separators": ["|", ","],
        "range_separator": "|"
    })
    .to_string()
}

fn get_output_schema_json() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "calendar.day_template.v1",
        "description": "Core 90 day template produced by the calendar importer",
        "type": "object",
        "required": ["id", "day_number", "assignment_title", "fields", "behavior_metrics"],
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "day_number": { "type": "integer", "minimum": 1 },
            "day_date": { "type": "string", "format": "date" },
            "assignment_title": { "type": "string" },
            "assignment_summary": { "type": "string" },
            "tracker_prompt": { "type": "string" },
            "fields": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "field_key", "field_label", "field_type", "is_required"],
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "field_key": { "type": "string" },
                        "field_label": { "type": "string" },
                        "field_type": {
                            "enum": [
                                "short_text", "long_text", "number", "boolean", "select",
                                "multi_select", "scale", "date", "file"
                            ]
                        },
                        "help_text": { "type": "string" },
                        "is_required": { "type": "boolean" },
                        "options": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["label", "value"],
                                "properties": {
                                    "label": { "type": "string" },
                                    "value": { "type": "string" }
                                }
                            }
                        },
                        "data_unit": { "type": "string" }
                    }
                }
            },
            "behavior_metrics": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "metric_key", "metric_label", "metric_type"],
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "metric_key": { "type": "string" },
                        "metric_label": { "type": "string" },
                        "metric_type": { "enum": ["boolean", "number", "scale"] },
                        "min_value": { "type": "number" },
                        "max_value": { "type": "number" },
                        "unit_label": { "type": "string" }
                    }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum SeedCliError {
    Io(io::Error),
    Import(ImportError),
    Json(serde_json::Error),
    StdinIsTty,
    ValidationFailed(usize),
}

impl From<io::Error> for SeedCliError {
    fn from(e: io::Error) -> Self {
        SeedCliError::Io(e)
    }
}

impl From<ImportError> for SeedCliError {
    fn from(e: ImportError) -> Self {
        SeedCliError::Import(e)
    }
}

impl From<serde_json::Error> for SeedCliError {
    fn from(e: serde_json::Error) -> Self {
        SeedCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SeedCliError> for CliError {
    fn from(e: SeedCliError) -> Self {
        match e {
            SeedCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SeedCliError::Import(ImportError::EmptyImport) => CliError {
                code: "EMPTY_IMPORT".to_string(),
                message: ImportError::EmptyImport.to_string(),
                hint: Some("Ensure at least one row has a positive day_number".to_string()),
            },
            SeedCliError::Import(e @ ImportError::Malformed { .. }) => CliError {
                code: "MALFORMED_INPUT".to_string(),
                message: e.to_string(),
                hint: Some("Fix the CSV structure at the reported line".to_string()),
            },
            SeedCliError::Import(ImportError::Json(e)) | SeedCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SeedCliError::StdinIsTty => CliError {
                code: "STDIN_TTY".to_string(),
                message: "Refusing to read CSV from an interactive terminal".to_string(),
                hint: Some("Pipe a CSV into stdin or pass a file path".to_string()),
            },
            SeedCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} warnings in strict mode", count),
                hint: Some("Fix the reported warnings or drop --strict".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ImportReport {
    producer: String,
    version: String,
    rows_scanned: usize,
    days_recovered: usize,
    field_templates: usize,
    behavior_metrics: usize,
    warnings: Vec<WarningDetail>,
}

#[derive(serde::Serialize)]
struct WarningDetail {
    kind: String,
    line: u64,
    detail: String,
}

impl ImportReport {
    fn from_outcome(outcome: &ImportOutcome) -> Self {
        ImportReport {
            producer: PRODUCER_NAME.to_string(),
            version: SEED_VERSION.to_string(),
            rows_scanned: outcome.rows_scanned,
            days_recovered: outcome.days.len(),
            field_templates: outcome.field_count(),
            behavior_metrics: outcome.metric_count(),
            warnings: outcome
                .warnings
                .iter()
                .map(|warning| WarningDetail {
                    kind: warning.kind().to_string(),
                    line: warning.line(),
                    detail: warning.to_string(),
                })
                .collect(),
        }
    }
}
