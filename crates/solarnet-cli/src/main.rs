//! # Solarnet CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/` and this file
//! only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/solarnet-cli/src/cli/)                   │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - logging, config and command wiring (commands.rs)         │
//! │  - terminal tables and JSON output (render.rs)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Library (crates/solarnet/)                                 │
//! │  - query algebra, walker, dispatch, clients                 │
//! │  - no knowledge of stdout/stderr or exit codes              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr (`-v` or `SOLARNET_LOG=debug`); results go to stdout.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
