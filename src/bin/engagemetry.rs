//! Engagemetry CLI - Command-line interface for the engagement engine
//!
//! Commands:
//! - replay: Process a recorded session event log (batch mode)
//! - run: Process streaming events from stdin (streaming mode)
//! - classify: Classify a single audio chunk
//! - validate: Validate a session event log
//! - doctor: Diagnose engine and configuration health

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::DateTime;
use chrono::Utc;
use engagemetry::analyzer::EngagementAlert;
use engagemetry::platform::{Clock, PageSnapshot, SystemClock};
use engagemetry::report::{EngagementReport, ReportEncoder};
use engagemetry::session::EngagementSession;
use engagemetry::sink::EngagementStore;
use engagemetry::transport::{sink_channel, MessageReceiver, PageMessage, SinkMessage, TabId};
use engagemetry::video::VideoReading;
use engagemetry::{AudioEmotionDetector, EngageError, TrackerConfig, ENGINE_VERSION, PRODUCER_NAME};

/// Engagemetry - On-device compute engine for learner engagement signals
#[derive(Parser)]
#[command(name = "engagemetry")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Transform interaction signals into engagement reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a recorded session event log (batch mode)
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Tab identifier attached to reports
        #[arg(long, default_value = "1")]
        tab_id: TabId,

        /// Tracker configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Process streaming events from stdin (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Tab identifier attached to reports
        #[arg(long, default_value = "1")]
        tab_id: TabId,

        /// Tracker configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Classify a single audio chunk
    Classify {
        /// Input file with a JSON array of samples (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Validate a session event log
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine and configuration health
    Doctor {
        /// Check a tracker configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// Pretty-printed JSON records
    JsonPretty,
}

/// One line of a recorded session event log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SessionEvent {
    PointerMove {
        timestamp: DateTime<Utc>,
        x: f64,
        y: f64,
    },
    AudioChunk {
        timestamp: DateTime<Utc>,
        samples: Vec<f32>,
    },
    VideoReading {
        timestamp: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        eye_openness: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attention: Option<f64>,
    },
    PageSnapshot {
        timestamp: DateTime<Utc>,
        snapshot: PageSnapshot,
    },
    FullscreenChange {
        timestamp: DateTime<Utc>,
        fullscreen: bool,
    },
    /// Let timers fire without any other activity
    Tick {
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::PointerMove { timestamp, .. }
            | SessionEvent::AudioChunk { timestamp, .. }
            | SessionEvent::VideoReading { timestamp, .. }
            | SessionEvent::PageSnapshot { timestamp, .. }
            | SessionEvent::FullscreenChange { timestamp, .. }
            | SessionEvent::Tick { timestamp } => *timestamp,
        }
    }
}

/// Record written for every sink message
#[derive(Debug, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum OutputRecord {
    Report(EngagementReport),
    Alert {
        tab_id: TabId,
        #[serde(flatten)]
        alert: EngagementAlert,
    },
}

fn main() -> ExitCode {
    env_logger::init();
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

fn run(cli: Cli) -> Result<(), EngageCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            output_format,
            tab_id,
            config,
        } => cmd_replay(&input, &output, output_format, tab_id, config.as_deref()),

        Commands::Run {
            output_format,
            tab_id,
            config,
            flush,
        } => cmd_run(output_format, tab_id, config.as_deref(), flush),

        Commands::Classify { input } => cmd_classify(&input),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_replay(
    input: &PathBuf,
    output: &PathBuf,
    output_format: OutputFormat,
    tab_id: TabId,
    config: Option<&Path>,
) -> Result<(), EngageCliError> {
    let input_data = read_input(input)?;
    let events = parse_events(&input_data)?;

    if events.is_empty() {
        return Err(EngageCliError::NoEvents);
    }

    let start_timestamp = events[0].timestamp();
    let end_timestamp = events
        .last()
        .map(|e| e.timestamp())
        .unwrap_or(start_timestamp);

    let config = load_config(config)?;
    let (sink_tx, sink_rx) = sink_channel();
    let mut session = EngagementSession::new(tab_id, config, sink_tx, start_timestamp);
    let encoder = ReportEncoder::new();
    let mut store = EngagementStore::new();
    session.start(start_timestamp);

    let mut records: Vec<OutputRecord> = Vec::new();

    for event in events {
        let now = event.timestamp();
        apply_event(&mut session, event);
        session.advance(now);
        collect_records(&sink_rx, &encoder, &mut store, &mut records, now);
    }

    // Final report so short logs still produce output
    session.report_engagement(end_timestamp);
    collect_records(&sink_rx, &encoder, &mut store, &mut records, end_timestamp);
    session.stop();

    let output_data = format_records(&records, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    tab_id: TabId,
    config: Option<&Path>,
    flush: bool,
) -> Result<(), EngageCliError> {
    let config = load_config(config)?;
    let (sink_tx, sink_rx) = sink_channel();
    let encoder = ReportEncoder::new();
    let mut store = EngagementStore::new();
    let mut session: Option<EngagementSession> = None;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: SessionEvent = serde_json::from_str(trimmed)
            .map_err(|e| EngageCliError::ParseError(format!("Failed to parse event: {e}")))?;
        let now = event.timestamp();

        let session = session.get_or_insert_with(|| {
            let mut s = EngagementSession::new(tab_id, config.clone(), sink_tx.clone(), now);
            s.start(now);
            s
        });

        apply_event(session, event);
        session.advance(now);

        let mut records = Vec::new();
        collect_records(&sink_rx, &encoder, &mut store, &mut records, now);
        if !records.is_empty() {
            write!(stdout, "{}", format_records(&records, &output_format)?)?;
            if flush {
                stdout.flush()?;
            }
        }
    }

    if let Some(mut session) = session {
        session.stop();
    }

    Ok(())
}

fn cmd_classify(input: &PathBuf) -> Result<(), EngageCliError> {
    let input_data = read_input(input)?;
    let samples: Vec<f32> = serde_json::from_str(&input_data)
        .map_err(|e| EngageCliError::ParseError(format!("Expected a JSON array of samples: {e}")))?;

    let detector = AudioEmotionDetector::new();
    let reading = detector.detect(&samples, SystemClock.now())?;

    println!("{}", serde_json::to_string_pretty(&reading)?);
    Ok(())
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), EngageCliError> {
    let input_data = read_input(input)?;

    let mut total = 0usize;
    let mut errors: Vec<ValidationErrorDetail> = Vec::new();
    let mut last_timestamp: Option<DateTime<Utc>> = None;

    for (index, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        total += 1;

        match serde_json::from_str::<SessionEvent>(trimmed) {
            Ok(event) => {
                let timestamp = event.timestamp();
                if let Some(prev) = last_timestamp {
                    if timestamp < prev {
                        errors.push(ValidationErrorDetail {
                            line: index + 1,
                            error: format!(
                                "event timestamp {timestamp} precedes previous event {prev}"
                            ),
                        });
                    }
                }
                last_timestamp = Some(timestamp);
            }
            Err(e) => errors.push(ValidationErrorDetail {
                line: index + 1,
                error: e.to_string(),
            }),
        }
    }

    let report = ValidationReport {
        total_events: total,
        valid_events: total - errors.len().min(total),
        invalid_events: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Line {}: {}", err.line, err.error);
            }
        }
    }

    if report.invalid_events > 0 {
        Err(EngageCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), EngageCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engagemetry version {}", ENGINE_VERSION),
    });

    if let Some(config_path) = config {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str::<TrackerConfig>(&content) {
                    Ok(parsed) => {
                        let sanitized = parsed.clone().sanitize();
                        let status = if sanitized.reporting_interval_ms
                            == parsed.reporting_interval_ms
                            && sanitized.buffer_size == parsed.buffer_size
                        {
                            CheckStatus::Ok
                        } else {
                            CheckStatus::Warning
                        };
                        checks.push(DoctorCheck {
                            name: "config".to_string(),
                            status,
                            message: format!(
                                "Config valid (reporting every {} ms, buffer {})",
                                sanitized.reporting_interval_ms, sanitized.buffer_size
                            ),
                        });
                    }
                    Err(e) => checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config JSON: {e}"),
                    }),
                },
                Err(e) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {e}"),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Engagemetry Doctor Report");
        println!("=========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(EngageCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, EngageCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_events(input: &str) -> Result<Vec<SessionEvent>, EngageCliError> {
    let mut events = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: SessionEvent = serde_json::from_str(trimmed).map_err(|e| {
            EngageCliError::ParseError(format!("Line {}: {e}", index + 1))
        })?;
        events.push(event);
    }
    Ok(events)
}

fn load_config(path: Option<&Path>) -> Result<TrackerConfig, EngageCliError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let config: TrackerConfig = serde_json::from_str(&content)
                .map_err(|e| EngageCliError::ParseError(format!("Invalid config: {e}")))?;
            Ok(config.sanitize())
        }
        None => Ok(TrackerConfig::default()),
    }
}

fn apply_event(session: &mut EngagementSession, event: SessionEvent) {
    match event {
        SessionEvent::PointerMove { timestamp, x, y } => {
            session.on_pointer_move(x, y, timestamp);
        }
        SessionEvent::AudioChunk { timestamp, samples } => {
            // A chunk that fails extraction is dropped; other sources are
            // unaffected
            let detector = AudioEmotionDetector::new();
            if let Ok(reading) = detector.detect(&samples, timestamp) {
                session.page_sender().send(PageMessage::Audio(reading));
            }
        }
        SessionEvent::VideoReading {
            timestamp,
            eye_openness,
            attention,
        } => {
            session.page_sender().send(PageMessage::Video(VideoReading {
                timestamp,
                eye_openness,
                attention,
            }));
        }
        SessionEvent::PageSnapshot {
            timestamp,
            snapshot,
        } => {
            session.on_page_snapshot(&snapshot, timestamp);
        }
        SessionEvent::FullscreenChange { fullscreen, .. } => {
            session.on_fullscreen_change(fullscreen);
        }
        SessionEvent::Tick { .. } => {}
    }
}

fn collect_records(
    sink_rx: &MessageReceiver<SinkMessage>,
    encoder: &ReportEncoder,
    store: &mut EngagementStore,
    records: &mut Vec<OutputRecord>,
    now: DateTime<Utc>,
) {
    for message in sink_rx.drain() {
        match &message {
            SinkMessage::Update { tab_id, data } => {
                records.push(OutputRecord::Report(encoder.encode(
                    *tab_id,
                    data.clone(),
                    now,
                )));
            }
            SinkMessage::Alert { tab_id, alert } => {
                records.push(OutputRecord::Alert {
                    tab_id: *tab_id,
                    alert: alert.clone(),
                });
            }
        }
        store.apply(message);
    }
}

fn format_records(
    records: &[OutputRecord],
    format: &OutputFormat,
) -> Result<String, EngageCliError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::JsonPretty => {
            let mut chunks: Vec<String> = Vec::new();
            for record in records {
                chunks.push(serde_json::to_string_pretty(record)?);
            }
            Ok(chunks.join("\n") + "\n")
        }
    }
}

// Error types

#[derive(Debug)]
enum EngageCliError {
    Io(io::Error),
    Compute(EngageError),
    Json(serde_json::Error),
    NoEvents,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for EngageCliError {
    fn from(e: io::Error) -> Self {
        EngageCliError::Io(e)
    }
}

impl From<EngageError> for EngageCliError {
    fn from(e: EngageError) -> Self {
        EngageCliError::Compute(e)
    }
}

impl From<serde_json::Error> for EngageCliError {
    fn from(e: serde_json::Error) -> Self {
        EngageCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<EngageCliError> for CliError {
    fn from(e: EngageCliError) -> Self {
        match e {
            EngageCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            EngageCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check input data against the session event schema".to_string()),
            },
            EngageCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            EngageCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            EngageCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} events failed validation"),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            EngageCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            EngageCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    line: usize,
    error: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
