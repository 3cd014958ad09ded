//! # Vend Terminal
//!
//! Line-oriented host for a single vending session. Stands in for the
//! button panel of a real machine.
//!
//! ## Module Organization
//! ```text
//! vend_terminal/
//! ├── lib.rs          ◄─── You are here (startup & input loop)
//! ├── config.rs       ◄─── machine.toml + VEND_* overrides
//! ├── state.rs        ◄─── MachineState (shared, serialized access)
//! ├── commands.rs     ◄─── Command parsing, dispatch, rendering
//! └── error.rs        ◄─── ConfigError, ApiError
//! ```
//!
//! ## Streams
//! Responses go to stdout, one per command. Logs go to stderr so piping
//! `vend --json` into another tool yields clean JSON lines.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use commands::Response;
use config::MachineConfig;
use state::MachineState;

// =============================================================================
// Command-Line Arguments
// =============================================================================

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub config_path: Option<PathBuf>,
    pub json: bool,
    pub help: bool,
}

impl Options {
    /// Parses arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args
                        .next()
                        .ok_or_else(|| "--config requires a path".to_string())?;
                    options.config_path = Some(PathBuf::from(path));
                }
                "--json" => options.json = true,
                "--help" | "-h" => options.help = true,
                other => return Err(format!("Unknown argument: {}", other)),
            }
        }

        Ok(options)
    }
}

const USAGE: &str = "\
Vend Terminal

Usage: vend [OPTIONS]

Options:
  -c, --config <PATH>  Machine file (default: $VEND_CONFIG, then the platform config dir)
      --json           Print one JSON object per response
  -h, --help           Print this help

Environment:
  VEND_MIN_INSERT, VEND_SELECTION_CARRY, VEND_SHORTFALL override [session]
  RUST_LOG sets the log filter (default: info,vend_core=debug)";

// =============================================================================
// Entry Point
// =============================================================================

/// Runs the terminal until `quit` or end of input.
pub fn run() -> ExitCode {
    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    if options.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    init_tracing();

    let machine = match MachineConfig::load(options.config_path.clone())
        .and_then(|config| config.build_machine().map_err(Into::into))
    {
        Ok(machine) => machine,
        Err(e) => {
            error!("Failed to start: {}", e);
            eprintln!("vend: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(session_id = %machine.session_id(), json = options.json, "Terminal ready");
    let state = MachineState::new(machine);

    let stdin = io::stdin();
    let stdout = io::stdout();
    match serve(&state, stdin.lock(), stdout.lock(), options.json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Terminal I/O failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Reads commands from `input` and writes one response per command to
/// `output`. Returns on `quit` or end of input.
pub fn serve<R, W>(state: &MachineState, input: R, mut output: W, json: bool) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let Some(result) = commands::handle_line(state, &line) else {
            continue;
        };

        let rendered = if json {
            commands::render_json(&result)
        } else {
            commands::render_text(&result)
        };
        writeln!(output, "{}", rendered)?;
        output.flush()?;

        if matches!(result, Ok(Response::Goodbye)) {
            break;
        }
    }

    let events = state.with_machine(|m| m.event_log().len());
    info!(events, "Terminal session closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vend_core=trace` - Trace the core only
/// - Default: `info,vend_core=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vend_core=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use vend_core::VendingMachine;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn state() -> MachineState {
        MachineState::new(
            VendingMachine::builder()
                .denomination(100, 2)
                .denomination(50, 4)
                .denomination(10, 10)
                .item("cola", 150)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_parse_options() {
        let options = Options::parse(args(&["--config", "m.toml", "--json"])).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("m.toml")));
        assert!(options.json);
        assert!(!options.help);

        assert!(Options::parse(args(&["-h"])).unwrap().help);
        assert!(Options::parse(args(&["--config"])).is_err());
        assert!(Options::parse(args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_serve_text() {
        let state = state();
        let input = b"insert 150\n\nselect cola\nreturn\nquit\ninsert 10\n";
        let mut output = Vec::new();

        serve(&state, &input[..], &mut output, false).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "150 inserted\ncola selected\nchange of 0 returned\nbye\n"
        );
        // Lines after quit are not read
        assert_eq!(state.with_machine(|m| m.event_log().len()), 3);
    }

    #[test]
    fn test_serve_json() {
        let state = state();
        let input = b"insert 5\nbalance\n";
        let mut output = Vec::new();

        serve(&state, &input[..], &mut output, true).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(lines[1]["type"], "balance");
        assert_eq!(lines[1]["available"], 500);
    }

    #[test]
    fn test_serve_survives_price_beyond_balance_range() {
        let config = MachineConfig::from_toml(
            r#"
            [[catalog]]
            name = "cola"
            price = 1100

            [[catalog]]
            name = "gold"
            price = 9223372036854775800
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        let state = MachineState::new(config.build_machine().unwrap());
        let input = b"insert 100\nselect cola\nselect gold\nbalance\n";
        let mut output = Vec::new();

        serve(&state, &input[..], &mut output, true).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[2]["error"]["code"], "INSUFFICIENT_FUNDS");
        assert_eq!(lines[3]["selected"], 1100);
    }

    #[test]
    fn test_goodbye_response() {
        assert_eq!(Response::Goodbye.to_text(), "bye");
    }
}
