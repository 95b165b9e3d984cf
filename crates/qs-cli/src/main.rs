use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use qs_config::CalibrationOutcome;
use qs_core::CalibrationError;
use qs_sim::{Report, Simulator};
use tracing::info;

/// Seeds every exponential device provider built from a config file. Not
/// exposed on the CLI surface (no `-s`/`--seed` flag is specified); fixed so
/// that repeated runs of the same config are reproducible.
const DEVICE_SEED: u64 = 42;

const EXIT_INVALID_ARGUMENTS: u8 = 1;
const EXIT_OUTPUT_FILE_ERROR: u8 = 2;
const EXIT_CONFIG_ERROR: u8 = 3;
const EXIT_AUTO_CALIBRATION_OVERSHOOT: u8 = 4;

#[derive(Parser, Debug)]
#[command(author, version, about = "Queueing system with refusals — discrete-event simulator")]
struct Args {
    /// Configuration file to read (header-keyed text format, see README).
    infile: PathBuf,

    /// Run to completion (default).
    #[arg(short = 'r', long = "run-to-completion", action = clap::ArgAction::SetTrue, overrides_with_all = ["interactive", "automatic"])]
    run_to_completion: bool,

    /// Drive the simulation through a line-oriented interactive REPL.
    #[arg(short = 'i', long = "interactive", action = clap::ArgAction::SetTrue, overrides_with_all = ["run_to_completion", "automatic"])]
    interactive: bool,

    /// Auto-calibrate the target request count until rejection probability
    /// stabilizes.
    #[arg(short = 'a', long = "auto", action = clap::ArgAction::SetTrue, overrides_with_all = ["run_to_completion", "interactive"])]
    automatic: bool,

    /// Emit the textual report. With no value, writes to stdout.
    #[arg(short = 'o', long = "output", num_args = 0..=1, default_missing_value = "-")]
    output: Option<PathBuf>,

    /// Also emit the report as a JSON trace file.
    #[arg(long = "json-out")]
    json_out: Option<PathBuf>,

    /// Upper bound on the target request count used by auto-calibration.
    #[arg(short = 'm', long = "max-requests", default_value_t = 1_000_000)]
    max_requests: u64,

    /// Raise the tracing log level (repeatable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

enum Mode {
    RunToCompletion,
    Interactive,
    Automatic,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.automatic {
            Mode::Automatic
        } else if self.interactive {
            Mode::Interactive
        } else {
            Mode::RunToCompletion
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            err.print().ok();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_INVALID_ARGUMENTS),
            };
        }
    };
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            match err.downcast_ref::<CliError>() {
                Some(cli_err) => ExitCode::from(cli_err.code()),
                None => ExitCode::from(EXIT_INVALID_ARGUMENTS),
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not read configuration file: {0}")]
    UnreadableConfig(#[source] io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] qs_core::ConfigError),
    #[error("could not write report: {0}")]
    Output(#[source] io::Error),
    #[error("auto-calibration failed: {0}")]
    Calibration(#[from] CalibrationError),
}

impl CliError {
    fn code(&self) -> u8 {
        match self {
            CliError::UnreadableConfig(_) | CliError::Config(_) => EXIT_CONFIG_ERROR,
            CliError::Output(_) => EXIT_OUTPUT_FILE_ERROR,
            CliError::Calibration(_) => EXIT_AUTO_CALIBRATION_OVERSHOOT,
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn run(args: &Args) -> Result<()> {
    let config_text = fs::read_to_string(&args.infile).map_err(CliError::UnreadableConfig)?;
    let raw = qs_config::parse(&config_text).map_err(CliError::Config)?;
    let mut simulator = qs_config::build_simulator(&raw, DEVICE_SEED);

    match args.mode() {
        Mode::RunToCompletion => {
            info!("running to completion");
            simulator.run_to_completion();
        }
        Mode::Interactive => run_repl(&mut simulator)?,
        Mode::Automatic => {
            let outcome = qs_config::auto_calibrate(&mut simulator, args.max_requests)
                .map_err(CliError::Calibration)?;
            print_calibration_outcome(&outcome);
        }
    }

    if args.output.is_some() || args.json_out.is_some() {
        let report = simulator.generate_report();
        if let Some(output) = &args.output {
            write_report(output, &report).map_err(CliError::Output)?;
        }
        if let Some(json_out) = &args.json_out {
            write_json_report(json_out, &report).map_err(CliError::Output)?;
        }
    }

    Ok(())
}

fn print_calibration_outcome(outcome: &CalibrationOutcome) {
    println!(
        "Calculated amount of requests: {} (rejection probability {:.4})",
        outcome.final_target, outcome.rejection_probability
    );
}

fn write_report(output: &PathBuf, report: &Report) -> io::Result<()> {
    let rendered = render_report(report);
    if output.to_str() == Some("-") {
        println!("{rendered}");
    } else {
        fs::write(output, rendered)?;
    }
    Ok(())
}

/// Writes the full report as a JSON trace, mirroring every accumulator the
/// textual tables only summarize.
fn write_json_report(path: &PathBuf, report: &Report) -> io::Result<()> {
    let data = serde_json::to_vec_pretty(report)
        .expect("Report serialization is infallible (no maps, no non-finite floats by construction)");
    fs::write(path, data)
}

fn render_report(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Duration: {}  Requests: {}  Rejected: {}\n\n",
        report.duration, report.current_amount_of_requests, report.rejected_amount
    ));

    out.push_str("Sources:\n");
    out.push_str(&source_table(report).to_string());
    out.push('\n');

    out.push_str("\nDevices:\n");
    out.push_str(&device_table(report).to_string());
    out
}

fn source_table(report: &Report) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "i",
            "Requests",
            "Rejection prob.",
            "Time full",
            "Time buffer",
            "Time processing",
            "Variance buffer",
            "Variance processing",
        ]);

    for source in &report.source_reports {
        table.add_row(vec![
            source.source_id.to_string(),
            source.generated_requests.to_string(),
            format!("{:.4}", source.rejection_probability),
            format!("{:.2}", source.average_full_time),
            format!("{:.2}", source.average_buffer_time),
            format!("{:.2}", source.average_processing_time),
            format!("{:.2}", source.buffer_time_variance),
            format!("{:.2}", source.processing_time_variance),
        ]);
    }
    table
}

fn device_table(report: &Report) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["i", "Usage coefficient"]);

    for device in &report.device_reports {
        table.add_row(vec![
            device.device_id.to_string(),
            format!("{:.4}", device.usage_coefficient),
        ]);
    }
    table
}

/// Line-oriented REPL: `step`, `run`, `report`, `reset`, `quit`/`q`.
fn run_repl(simulator: &mut Simulator) -> Result<()> {
    println!("Interactive mode. Commands: step, run, report, reset, quit");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("reading a command from stdin")?;
        let command = line.trim();

        match command {
            "quit" | "q" => break,
            "step" => {
                let outcome = simulator.step();
                println!("{outcome:?}");
            }
            "run" => {
                simulator.run_to_completion();
                println!("simulation complete");
            }
            "report" => {
                let report = simulator.generate_report();
                println!("{}", render_report(&report));
            }
            "reset" => {
                simulator.reset();
                println!("reset");
            }
            "" => {}
            other => println!("unrecognized command: {other:?} (try step, run, report, reset, quit)"),
        }

        stdout.flush().ok();
        if simulator.is_completed() {
            break;
        }
    }

    Ok(())
}
