//! Risk CLI - Command-line interface for Synheart Risk
//!
//! Commands:
//! - analyze: Score sample records for one or all windows
//! - validate: Report usable and dropped rows per signal
//! - schema: Print the input record schema

use chrono::{DateTime, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use synheart_risk::schema::{RecordReader, SampleRecord};
use synheart_risk::{
    ApneaEvent, AssessmentEncoder, AssessmentView, EngineConfig, MemoryEventStore, RiskEngine,
    RiskError, TimeWindow, WindowReport, PRODUCER_NAME, RISK_VERSION,
};

/// Risk - rule-based health risk scoring for wearable time series
#[derive(Parser)]
#[command(name = "risk")]
#[command(author = "Synheart AI Inc")]
#[command(version = RISK_VERSION)]
#[command(about = "Score sleep apnea, tachycardia and illness onset risk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score sample records
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Window to evaluate
        #[arg(long, default_value = "all")]
        window: WindowArg,

        /// Evaluation instant (e.g. 2026-02-26T02:00:00); defaults to now (UTC)
        #[arg(long)]
        now: Option<String>,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the detected_by tag of extracted events
        #[arg(long)]
        detected_by: Option<String>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format (pretty JSON on a terminal, NDJSON otherwise)
        #[arg(long)]
        output_format: Option<OutputFormat>,

        /// Write stored apnea events to this file
        #[arg(long)]
        events_output: Option<PathBuf>,
    },

    /// Report usable and dropped rows per signal
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the input record schema
    Schema {
        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one window report per line)
    Ndjson,
    /// JSON array of window reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum WindowArg {
    Night,
    Week,
    Month,
    All,
}

impl WindowArg {
    /// The single window selected, or `None` for all of them
    fn window(self) -> Option<TimeWindow> {
        match self {
            WindowArg::Night => Some(TimeWindow::Night),
            WindowArg::Week => Some(TimeWindow::Week),
            WindowArg::Month => Some(TimeWindow::Month),
            WindowArg::All => None,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

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

fn run(cli: Cli) -> Result<(), RiskCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            input_format,
            window,
            now,
            config,
            detected_by,
            output,
            output_format,
            events_output,
        } => cmd_analyze(AnalyzeArgs {
            input,
            input_format,
            window,
            now,
            config,
            detected_by,
            output,
            output_format,
            events_output,
        }),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema { json_schema } => cmd_schema(json_schema),
    }
}

struct AnalyzeArgs {
    input: PathBuf,
    input_format: InputFormat,
    window: WindowArg,
    now: Option<String>,
    config: Option<PathBuf>,
    detected_by: Option<String>,
    output: PathBuf,
    output_format: Option<OutputFormat>,
    events_output: Option<PathBuf>,
}

fn cmd_analyze(args: AnalyzeArgs) -> Result<(), RiskCliError> {
    let records = read_records(&args.input, &args.input_format)?;
    if records.is_empty() {
        return Err(RiskCliError::NoRecords);
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(tag) = args.detected_by {
        config.detected_by = tag;
        config.validate()?;
    }

    let now = args.now.as_deref().map(parse_now).transpose()?;

    let source = RecordReader::into_store(records);
    let engine = RiskEngine::with_config(config);
    let mut event_store = MemoryEventStore::new();

    let mut reports: Vec<WindowReport> = match args.window.window() {
        Some(window) => vec![engine.analyze_window(&source, window, now)?],
        None => engine.analyze_all_windows(&source, now)?,
    };
    for report in &mut reports {
        engine.store_events(&mut event_store, report)?;
    }

    let encoder = AssessmentEncoder::new();
    let outputs: Vec<WindowOutput> = reports
        .iter()
        .map(|report| WindowOutput::from_report(&encoder, report))
        .collect();

    let format = args.output_format.unwrap_or_else(|| {
        if atty::is(atty::Stream::Stdout) {
            OutputFormat::JsonPretty
        } else {
            OutputFormat::Ndjson
        }
    });
    write_output(&args.output, &format_output(&outputs, &format)?)?;

    if let Some(path) = args.events_output {
        let events: Vec<&ApneaEvent> = event_store.events().collect();
        fs::write(path, serde_json::to_string_pretty(&events)?)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), RiskCliError> {
    let records = read_records(input, &input_format)?;
    let stats = RecordReader::stats(&records);

    let report = ValidationReport {
        total_records: records.len(),
        usable_records: stats.values().map(|s| s.usable).sum(),
        dropped_records: stats.values().map(|s| s.dropped).sum(),
        signals: stats
            .iter()
            .map(|(kind, s)| SignalValidation {
                kind: kind.as_str().to_string(),
                total: s.total,
                usable: s.usable,
                dropped: s.dropped,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Usable records:  {}", report.usable_records);
        println!("Dropped records: {}", report.dropped_records);
        println!();
        for signal in &report.signals {
            println!(
                "  {:<24} total {:>6}  usable {:>6}  dropped {:>6}",
                signal.kind, signal.total, signal.usable, signal.dropped
            );
        }
    }

    if report.usable_records == 0 {
        Err(RiskCliError::NoUsableRecords)
    } else {
        Ok(())
    }
}

fn cmd_schema(json_schema: bool) -> Result<(), RiskCliError> {
    if json_schema {
        println!("{}", input_json_schema());
        return Ok(());
    }

    println!("Input record (one JSON object per row):");
    println!();
    println!("- kind: respiratory_rate | heart_rate | heart_rate_variability");
    println!("- timestamp: naive ISO-8601 instant, e.g. 2026-02-26T01:00:00 (null drops the row)");
    println!("- value: number or numeric string; a decimal comma is accepted (\"72,5\")");
    println!();
    println!("Rows with a missing timestamp or a value that is not a finite number are dropped.");
    Ok(())
}

// Helper functions

fn read_records(input: &Path, format: &InputFormat) -> Result<Vec<SampleRecord>, RiskCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match format {
        InputFormat::Ndjson => RecordReader::parse_ndjson(&data)?,
        InputFormat::Json => RecordReader::parse_array(&data)?,
    };
    Ok(records)
}

fn parse_now(raw: &str) -> Result<NaiveDateTime, RiskCliError> {
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Ok(naive);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .map_err(|e| RiskCliError::Risk(RiskError::DateParseError(format!("{raw}: {e}"))))
}

fn write_output(output: &Path, data: &str) -> Result<(), RiskCliError> {
    if output.to_string_lossy() == "-" {
        print!("{data}");
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output(outputs: &[WindowOutput], format: &OutputFormat) -> Result<String, RiskCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for output in outputs {
                lines.push(serde_json::to_string(output)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(outputs)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(outputs)? + "\n"),
    }
}

fn input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "risk.sample_record.v1",
        "description": "Synheart Risk input sample record",
        "type": "object",
        "required": ["kind"],
        "properties": {
            "kind": {
                "type": "string",
                "enum": ["respiratory_rate", "heart_rate", "heart_rate_variability"]
            },
            "timestamp": { "type": ["string", "null"], "format": "date-time" },
            "value": { "type": ["number", "string", "null"] }
        }
    })
    .to_string()
}

// Output types

#[derive(Serialize)]
struct WindowOutput {
    producer: &'static str,
    version: &'static str,
    report_id: String,
    window: TimeWindow,
    start: NaiveDateTime,
    end: NaiveDateTime,
    inserted_sleep_apnea_events: usize,
    assessments: Vec<AssessmentView>,
}

impl WindowOutput {
    fn from_report(encoder: &AssessmentEncoder, report: &WindowReport) -> Self {
        Self {
            producer: PRODUCER_NAME,
            version: RISK_VERSION,
            report_id: report.report_id.clone(),
            window: report.window,
            start: report.start,
            end: report.end,
            inserted_sleep_apnea_events: report.inserted_events,
            assessments: report.assessments.iter().map(|a| encoder.view(a)).collect(),
        }
    }
}

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    usable_records: usize,
    dropped_records: usize,
    signals: Vec<SignalValidation>,
}

#[derive(Serialize)]
struct SignalValidation {
    kind: String,
    total: usize,
    usable: usize,
    dropped: usize,
}

// Error types

#[derive(Debug)]
enum RiskCliError {
    Io(io::Error),
    Risk(RiskError),
    Json(serde_json::Error),
    NoRecords,
    NoUsableRecords,
}

impl From<io::Error> for RiskCliError {
    fn from(e: io::Error) -> Self {
        RiskCliError::Io(e)
    }
}

impl From<RiskError> for RiskCliError {
    fn from(e: RiskError) -> Self {
        RiskCliError::Risk(e)
    }
}

impl From<serde_json::Error> for RiskCliError {
    fn from(e: serde_json::Error) -> Self {
        RiskCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RiskCliError> for CliError {
    fn from(e: RiskCliError) -> Self {
        match e {
            RiskCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RiskCliError::Risk(e) => {
                let (code, hint) = match &e {
                    RiskError::ParseError(_) | RiskError::JsonError(_) => {
                        ("PARSE_ERROR", "Run 'risk schema' for the expected record format")
                    }
                    RiskError::InvalidWindow(_) => ("INVALID_WINDOW", "Use night, week or month"),
                    RiskError::DateParseError(_) => {
                        ("DATE_ERROR", "Use an ISO-8601 instant such as 2026-02-26T02:00:00")
                    }
                    RiskError::ConfigError(_) => ("CONFIG_ERROR", "Check the configuration file"),
                    RiskError::SourceError(_) | RiskError::StoreError(_) => {
                        ("STORAGE_ERROR", "Check the sample source and event store")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            RiskCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RiskCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            RiskCliError::NoUsableRecords => CliError {
                code: "NO_USABLE_RECORDS".to_string(),
                message: "No record has both a timestamp and a numeric value".to_string(),
                hint: Some("Run 'risk schema' for the expected record format".to_string()),
            },
        }
    }
}
