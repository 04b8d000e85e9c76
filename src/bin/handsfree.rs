//! Handsfree CLI - Command-line interface for the handsfree core
//!
//! Commands:
//! - calc: Evaluate spoken arithmetic phrases
//! - gesture: Classify hand landmark frames (NDJSON in, NDJSON out)
//! - track: Run a tracking session over landmark frames (NDJSON in, NDJSON out)
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use handsfree::config::HandsfreeConfig;
use handsfree::session::{LandmarkFrame, TrackingProcessor};
use handsfree::speech::CalculatorReading;
use handsfree::vision::{GestureClassifier, TrackingMode};
use handsfree::{HandsfreeError, HANDSFREE_VERSION, PRODUCER_NAME};

/// Handsfree - speech and landmark interpretation for hands-free control
#[derive(Parser)]
#[command(name = "handsfree")]
#[command(version = HANDSFREE_VERSION)]
#[command(about = "Interpret spoken arithmetic and hand/eye landmarks", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate spoken arithmetic (arguments, or one phrase per stdin line)
    Calc {
        /// Phrases to evaluate
        text: Vec<String>,

        /// Output one JSON reading per line
        #[arg(long)]
        json: bool,
    },

    /// Classify hand landmark frames into gesture sets
    Gesture {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Run a tracking session and emit one frame report per input frame
    Track {
        /// Tracking mode
        #[arg(long, default_value = "hand")]
        mode: ModeArg,

        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Screen width in pixels (overrides config)
        #[arg(long)]
        screen_width: Option<f64>,

        /// Screen height in pixels (overrides config)
        #[arg(long)]
        screen_height: Option<f64>,

        /// Flush output after each report
        #[arg(long)]
        flush: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Follow the index fingertip
    Hand,
    /// Follow the gaze point
    Eye,
}

impl From<ModeArg> for TrackingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Hand => TrackingMode::Hand,
            ModeArg::Eye => TrackingMode::Eye,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

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

/// Logs go to stderr so stdout stays machine-readable
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), HandsfreeCliError> {
    match cli.command {
        Commands::Calc { text, json } => cmd_calc(&text, json),

        Commands::Gesture { input } => cmd_gesture(&input),

        Commands::Track {
            mode,
            input,
            config,
            screen_width,
            screen_height,
            flush,
        } => cmd_track(
            mode.into(),
            &input,
            config.as_deref(),
            screen_width,
            screen_height,
            flush,
        ),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn open_input(input: &Path) -> Result<Box<dyn BufRead>, HandsfreeCliError> {
    if input.to_string_lossy() == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(input)?)))
    }
}

/// Parse one NDJSON frame, naming the line on failure
fn parse_frame(line: &str, line_no: usize) -> Result<LandmarkFrame, HandsfreeCliError> {
    LandmarkFrame::from_json(line)
        .map_err(|e| HandsfreeCliError::ParseError(format!("Line {}: {}", line_no, e)))
}

fn cmd_calc(text: &[String], json: bool) -> Result<(), HandsfreeCliError> {
    let mut stdout = io::stdout();

    let mut emit = |phrase: &str| -> Result<(), HandsfreeCliError> {
        let reading = CalculatorReading::from_transcript(phrase);
        if json {
            writeln!(stdout, "{}", reading.to_json()?)?;
        } else {
            writeln!(stdout, "{}", reading.display())?;
        }
        Ok(())
    };

    if text.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            emit(&line)?;
        }
    } else {
        for phrase in text {
            emit(phrase)?;
        }
    }

    Ok(())
}

fn cmd_gesture(input: &Path) -> Result<(), HandsfreeCliError> {
    let reader = open_input(input)?;
    let mut stdout = io::stdout();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let frame = parse_frame(trimmed, i + 1)?;
        let gestures = GestureClassifier::classify(&frame.landmarks);
        writeln!(stdout, "{}", serde_json::to_string(&gestures)?)?;
    }

    Ok(())
}

fn cmd_track(
    mode: TrackingMode,
    input: &Path,
    config_path: Option<&Path>,
    screen_width: Option<f64>,
    screen_height: Option<f64>,
    flush: bool,
) -> Result<(), HandsfreeCliError> {
    let mut config = HandsfreeConfig::resolve(config_path)?;
    if let Some(width) = screen_width {
        config.screen.width = width;
    }
    if let Some(height) = screen_height {
        config.screen.height = height;
    }

    let mut processor = TrackingProcessor::new(mode, &config)?;
    info!(
        session_id = %processor.session_id(),
        %mode,
        width = config.screen.width,
        height = config.screen.height,
        "tracking"
    );

    let reader = open_input(input)?;
    let mut stdout = io::stdout();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let frame = parse_frame(trimmed, i + 1)?;
        let report = processor.process_frame(&frame);
        writeln!(stdout, "{}", report.to_json()?)?;
        if flush {
            stdout.flush()?;
        }
    }

    stdout.flush()?;
    debug!(frames = processor.frames_processed(), "tracking finished");
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), HandsfreeCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Handsfree version {}", HANDSFREE_VERSION),
    });

    let config_check = match config_path {
        Some(path) if !path.exists() => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Configuration file does not exist".to_string(),
        },
        path => match HandsfreeConfig::resolve(path) {
            Ok(config) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Configuration valid (smoothing {}, screen {}x{})",
                    config.cursor.smoothing, config.screen.width, config.screen.height
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        },
    };
    checks.push(config_check);

    // Check stdin is available (for streaming commands)
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
        version: HANDSFREE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Handsfree Doctor Report");
        println!("=======================");
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

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(HandsfreeCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error handling

enum HandsfreeCliError {
    Io(io::Error),
    Library(HandsfreeError),
    Json(serde_json::Error),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for HandsfreeCliError {
    fn from(e: io::Error) -> Self {
        HandsfreeCliError::Io(e)
    }
}

impl From<HandsfreeError> for HandsfreeCliError {
    fn from(e: HandsfreeError) -> Self {
        HandsfreeCliError::Library(e)
    }
}

impl From<serde_json::Error> for HandsfreeCliError {
    fn from(e: serde_json::Error) -> Self {
        HandsfreeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HandsfreeCliError> for CliError {
    fn from(e: HandsfreeCliError) -> Self {
        match e {
            HandsfreeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HandsfreeCliError::Library(e) => {
                let (code, hint) = match &e {
                    HandsfreeError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Run 'handsfree doctor --config <file>' for details")
                    }
                    HandsfreeError::InvalidFrame(_) => {
                        ("FRAME_ERROR", "Landmark coordinates must be finite numbers")
                    }
                    HandsfreeError::UnsupportedMode(_) => ("MODE_ERROR", "Use 'hand' or 'eye'"),
                    HandsfreeError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    HandsfreeError::IoError(_) => ("IO_ERROR", "Check file paths and permissions"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            HandsfreeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HandsfreeCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            HandsfreeCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Each line must be a {\"timestamp\", \"landmarks\"} JSON object".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
