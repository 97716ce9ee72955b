//! Mood CLI - Command-line interface for mood analytics
//!
//! Commands:
//! - analyze: Compute analytics for a check-in history
//! - validate: Validate check-in records against the input rules
//! - config: Print the effective configuration
//! - schema: Describe the input and output formats

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use mood_analytics::encoder::{AnalyticsEncoder, REPORT_VERSION};
use mood_analytics::schema::{CheckinParser, SCHEMA_VERSION};
use mood_analytics::types::{AnalyticsRequest, CheckinRecord, PeriodLabel};
use mood_analytics::{AnalyticsConfig, AnalyticsEngine, AnalyticsError, ENGINE_VERSION};

/// Mood - Deterministic analytics for daily mood check-ins
#[derive(Parser)]
#[command(name = "mood")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Turn mood check-in histories into analytics and insights", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute analytics for a check-in history
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Period label
        #[arg(long, default_value = "weekly")]
        period: Period,

        /// Range start (YYYY-MM-DD), requires --end
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// Range end (YYYY-MM-DD), requires --start
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,

        /// Reference date for streaks and default ranges (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Validate check-in records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file (TOML) to load and validate
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Period {
    Weekly,
    Monthly,
    Custom,
}

impl From<Period> for PeriodLabel {
    fn from(period: Period) -> Self {
        match period {
            Period::Weekly => PeriodLabel::Weekly,
            Period::Monthly => PeriodLabel::Monthly,
            Period::Custom => PeriodLabel::Custom,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one check-in per line)
    Ndjson,
    /// JSON array of check-ins
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (mood.checkin.v1)
    Input,
    /// Output schema (analytics report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("mood_analytics=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mood_analytics=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), MoodCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            period,
            start,
            end,
            today,
            config,
            input_format,
            output_format,
        } => {
            let mut request = AnalyticsRequest::new(period.into());
            if let (Some(start), Some(end)) = (start, end) {
                request = request.with_range(start, end);
            }
            if let Some(today) = today {
                request = request.with_today(today);
            }
            cmd_analyze(
                &input,
                &output,
                &request,
                config.as_deref(),
                input_format,
                output_format,
            )
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Config { config } => cmd_config(config.as_deref()),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    request: &AnalyticsRequest,
    config: Option<&Path>,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), MoodCliError> {
    let config = load_config(config)?;
    let records = read_records(input, input_format)?;

    let engine = AnalyticsEngine::with_config(config)?;
    let result = engine.compute(&records, request)?;

    let encoder = match output_format {
        OutputFormat::Json => AnalyticsEncoder::new(),
        OutputFormat::JsonPretty => AnalyticsEncoder::pretty(),
    };
    let output_data = encoder.encode_to_json(&result)?;

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), MoodCliError> {
    let records = read_records(input, input_format)?;
    let results = CheckinParser::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                record_id: r.record_id.map(|id| id.to_string()),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (index {}): {}",
                    err.record_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(MoodCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_config(config: Option<&Path>) -> Result<(), MoodCliError> {
    let config = load_config(config)?;
    config.validate()?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), MoodCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("A history is a JSON array (or NDJSON stream) of check-ins:");
                println!();
                println!("- timestamp: RFC 3339 timestamp (required; the UTC date is the check-in day)");
                println!("- mood: rating 1-10 (required)");
                println!("- energy, stress, sleep_quality, social_interaction: optional ratings 1-10");
                println!("- mood_category: optional label (e.g. \"calm\")");
                println!("- tags: up to 20 tags, each at most 50 characters (alias: keywords)");
                println!("- notes: optional free text, at most 2000 characters (never analyzed)");
                println!("- id: optional UUID, echoed in clamp reports");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: analytics report {}", REPORT_VERSION);
                println!();
                println!("- report_version, producer: {{ name, version }}");
                println!("- result:");
                println!("  - period, range: {{ start, end }}, synthetic");
                println!("  - trends: per metric {{ direction, percent_change, recent_average, prior_average }}");
                println!("  - variance: per metric {{ variance, computable, sample_size }}");
                println!("  - correlations: factor -> Pearson coefficient");
                println!("  - weekly_pattern: {{ status, best_day, worst_day, averages }}");
                println!("  - streak: {{ current, longest, current_start, total_checkins }}");
                println!("  - summary: {{ total_checkins, average_mood, mood_range, most_common_category, ... }}");
                println!("  - insights: [{{ type, title, description, impact }}]");
                println!("  - series: daily points for charting");
                println!("  - clamped: values adjusted during normalization");
            }
        }
    }

    Ok(())
}

// Helper functions

fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig, MoodCliError> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(AnalyticsConfig::from_toml_str(&contents)?)
        }
        None => Ok(AnalyticsConfig::default()),
    }
}

fn read_records(input: &Path, input_format: InputFormat) -> Result<Vec<CheckinRecord>, MoodCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(MoodCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match input_format {
        InputFormat::Ndjson => CheckinParser::parse_ndjson(&input_data)?,
        InputFormat::Json => CheckinParser::parse_array(&input_data)?,
    };
    Ok(records)
}

fn get_input_json_schema() -> String {
    r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "mood.checkin.v1",
  "type": "object",
  "required": ["timestamp", "mood"],
  "properties": {
    "id": { "type": "string", "format": "uuid" },
    "timestamp": { "type": "string", "format": "date-time" },
    "mood": { "type": "number", "minimum": 1, "maximum": 10 },
    "energy": { "type": "number", "minimum": 1, "maximum": 10 },
    "stress": { "type": "number", "minimum": 1, "maximum": 10 },
    "sleep_quality": { "type": "number", "minimum": 1, "maximum": 10 },
    "social_interaction": { "type": "number", "minimum": 1, "maximum": 10 },
    "mood_category": { "type": "string" },
    "tags": {
      "type": "array",
      "maxItems": 20,
      "items": { "type": "string", "minLength": 1, "maxLength": 50 }
    },
    "notes": { "type": "string", "maxLength": 2000 }
  }
}"#
    .to_string()
}

fn get_output_json_schema() -> String {
    r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "mood analytics report",
  "type": "object",
  "required": ["report_version", "producer", "result"],
  "properties": {
    "report_version": { "type": "string" },
    "producer": {
      "type": "object",
      "properties": {
        "name": { "type": "string" },
        "version": { "type": "string" }
      }
    },
    "result": {
      "type": "object",
      "required": ["period", "range", "synthetic", "trends", "variance", "correlations",
                   "weekly_pattern", "streak", "summary", "insights", "series", "clamped"],
      "properties": {
        "period": { "enum": ["weekly", "monthly", "custom"] },
        "synthetic": { "type": "boolean" },
        "correlations": { "type": "object", "additionalProperties": { "type": "number" } },
        "insights": {
          "type": "array",
          "items": {
            "type": "object",
            "properties": {
              "type": { "enum": ["trend", "stability", "correlation", "weekly_pattern", "streak"] },
              "title": { "type": "string" },
              "description": { "type": "string" },
              "impact": { "enum": ["positive", "negative", "neutral"] }
            }
          }
        }
      }
    }
  }
}"#
    .to_string()
}

// Error handling

#[derive(Debug)]
enum MoodCliError {
    Io(io::Error),
    Analytics(AnalyticsError),
    Json(serde_json::Error),
    NoInput,
    ValidationFailed(usize),
}

impl From<io::Error> for MoodCliError {
    fn from(e: io::Error) -> Self {
        MoodCliError::Io(e)
    }
}

impl From<AnalyticsError> for MoodCliError {
    fn from(e: AnalyticsError) -> Self {
        MoodCliError::Analytics(e)
    }
}

impl From<serde_json::Error> for MoodCliError {
    fn from(e: serde_json::Error) -> Self {
        MoodCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MoodCliError> for CliError {
    fn from(e: MoodCliError) -> Self {
        match e {
            MoodCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MoodCliError::Analytics(e) => {
                let (code, hint) = match &e {
                    AnalyticsError::InsufficientData(_) => (
                        "INSUFFICIENT_DATA",
                        "Add check-ins or enable placeholder_fallback_enabled",
                    ),
                    AnalyticsError::InvalidDateRange { .. } | AnalyticsError::RangeTooLarge { .. } => {
                        ("INVALID_RANGE", "Check --start, --end and max_range_days")
                    }
                    AnalyticsError::InvalidConfig(_) | AnalyticsError::ConfigParseError(_) => {
                        ("CONFIG_ERROR", "Run 'mood config' to see the expected settings")
                    }
                    AnalyticsError::ParseError(_) | AnalyticsError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Ensure input matches the mood.checkin.v1 schema ('mood schema input')",
                    ),
                    AnalyticsError::EncodingError(_) => ("ENCODING_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MoodCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MoodCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No input piped on stdin".to_string(),
                hint: Some("Pipe a history into the command or pass --input <file>".to_string()),
            },
            MoodCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    record_id: Option<String>,
    error: String,
}
