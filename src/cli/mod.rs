//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{parse_filter, parse_mode, parse_style, Args, Command, ConfigAction, RunArgs};
pub use commands::{handle_config_action, histogram, list, load_config, merge_run_settings, render_bars, run};
pub use enums::PatternArg;
