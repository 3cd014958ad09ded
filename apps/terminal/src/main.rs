//! # Vend Terminal Entry Point
//!
//! ## Startup Sequence
//! 1. Parse arguments (`--config`, `--json`, `--help`)
//! 2. Initialize tracing (stderr)
//! 3. Load machine.toml and apply `VEND_*` overrides
//! 4. Build the vending machine
//! 5. Serve commands from stdin until `quit` or EOF

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for testability
    vend_terminal::run()
}
