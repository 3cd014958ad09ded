//! # Terminal Commands
//!
//! Parses operator lines and runs them against the shared machine.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐  insert   ┌──────────┐  select   ┌──────────┐             │
//! │  │   Idle   │──────────►│  Paying  │──────────►│ Selected │             │
//! │  └──────────┘           └──────────┘           └──────────┘             │
//! │       ▲                      │ ▲ insert             │                   │
//! │       │                      └─┘                    │                   │
//! │       │                  return                     │                   │
//! │       └─────────────────────────────────────────────┘                   │
//! │                                                                         │
//! │  balance / items / log / status are read-only in every state           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

use vend_core::{Event, ItemAvailability, MachineSnapshot, Money};

use crate::error::ApiError;
use crate::state::MachineState;

// =============================================================================
// Command Parsing
// =============================================================================

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `insert <amount>`; the amount stays raw so the core validates it
    Insert(String),
    /// `select <name>`
    Select(String),
    Return,
    Balance,
    Items,
    Log,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ApiError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let argument = |usage: &str| {
            if rest.is_empty() {
                Err(ApiError::validation(format!("Usage: {}", usage)))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_lowercase().as_str() {
            "insert" | "i" => argument("insert <amount>").map(Command::Insert),
            "select" | "s" => argument("select <name>").map(Command::Select),
            "return" | "r" => Ok(Command::Return),
            "balance" | "b" => Ok(Command::Balance),
            "items" => Ok(Command::Items),
            "log" => Ok(Command::Log),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(ApiError::unknown_command(other)),
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Successful command output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Event { event: Event },
    Balance { available: Money, inserted: Money, selected: Money },
    Items { items: Vec<ItemAvailability> },
    Log { events: Vec<Event> },
    Status { snapshot: Box<MachineSnapshot> },
    Help { text: String },
    Goodbye,
}

const HELP_TEXT: &str = "\
insert <amount>   insert money
select <name>     select a catalog item
return            return change and end the purchase
balance           show reserve, inserted and selected totals
items             list items and whether they can be bought
log               show the transaction history
status            dump the full machine state as JSON
quit              leave";

impl Response {
    /// Renders the response for a human at the terminal.
    pub fn to_text(&self) -> String {
        match self {
            Response::Event { event } => event.message.clone(),
            Response::Balance {
                available,
                inserted,
                selected,
            } => format!(
                "available {}, inserted {}, selected {}",
                available, inserted, selected
            ),
            Response::Items { items } => items
                .iter()
                .map(|item| {
                    let marker = if item.selectable { "*" } else { " " };
                    format!("{} {:<20} {:>8}", marker, item.name, item.price.units())
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Response::Log { events } if events.is_empty() => "no transactions yet".to_string(),
            Response::Log { events } => events
                .iter()
                .map(|e| format!("{:>4}  {}", e.sequence, e.message))
                .collect::<Vec<_>>()
                .join("\n"),
            Response::Status { snapshot } => serde_json::to_string_pretty(snapshot)
                .unwrap_or_else(|e| format!("status unavailable: {}", e)),
            Response::Help { text } => text.clone(),
            Response::Goodbye => "bye".to_string(),
        }
    }
}

/// Renders a command result as one line of JSON.
pub fn render_json(result: &Result<Response, ApiError>) -> String {
    let rendered = match result {
        Ok(response) => serde_json::to_string(response),
        Err(err) => serde_json::to_string(&serde_json::json!({ "error": err })),
    };
    rendered.unwrap_or_else(|e| format!(r#"{{"error":{{"code":"INTERNAL","message":"{}"}}}}"#, e))
}

/// Renders a command result as text.
pub fn render_text(result: &Result<Response, ApiError>) -> String {
    match result {
        Ok(response) => response.to_text(),
        Err(err) => err.to_string(),
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command against the machine.
pub fn execute(state: &MachineState, command: Command) -> Result<Response, ApiError> {
    debug!(?command, "execute command");

    match command {
        Command::Insert(amount) => {
            let event = state.with_machine_mut(|m| m.insert_input(&amount))?;
            Ok(Response::Event { event })
        }
        Command::Select(name) => {
            let event = state.with_machine_mut(|m| m.select_catalog_item(&name))?;
            Ok(Response::Event { event })
        }
        Command::Return => {
            let event = state.with_machine_mut(|m| m.return_change())?;
            Ok(Response::Event { event })
        }
        Command::Balance => Ok(state.with_machine(|m| Response::Balance {
            available: m.available_balance(),
            inserted: m.inserted_total(),
            selected: m.selected_total(),
        })),
        Command::Items => Ok(Response::Items {
            items: state.with_machine(|m| m.availability()),
        }),
        Command::Log => Ok(Response::Log {
            events: state.with_machine(|m| m.event_log().to_vec()),
        }),
        Command::Status => Ok(Response::Status {
            snapshot: Box::new(state.with_machine(|m| m.snapshot())),
        }),
        Command::Help => Ok(Response::Help {
            text: HELP_TEXT.to_string(),
        }),
        Command::Quit => Ok(Response::Goodbye),
    }
}

/// Parses and runs one input line. Blank lines yield `None`.
pub fn handle_line(state: &MachineState, line: &str) -> Option<Result<Response, ApiError>> {
    if line.trim().is_empty() {
        return None;
    }
    Some(line.parse().and_then(|command| execute(state, command)))
}
