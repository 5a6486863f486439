//! # CLI Behavior
//!
//! One client of the solarnet library. The only place that knows about
//! terminal I/O, exit codes and output formatting.
//!
//! ## Commands
//!
//! - `solarnet hek search`: query the HEK. `--dry-run` prints the compiled
//!   request mappings without touching the network.
//! - `solarnet fetch search`: list data files for an instrument and time range.
//! - `solarnet timeseries sources`: the time-series factory's call shapes.
//! - `solarnet config show`: the effective configuration as TOML.
//!
//! Repeated `--event-type` or `--instrument` flags are OR-ed; everything else
//! is AND-ed.
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Logging setup and per-command handlers
//! - `render`: Tables and JSON
//! - `styles`: Terminal styling constants

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
