//! Text file to YouTube Music playlist library
//!
//! This library turns a plain-text list of song queries into a playlist on a
//! YouTube Music account. Each query is searched in the catalog, the best
//! match is picked (skipping repeats unless duplicates are allowed), and the
//! selected tracks are published as a new playlist in query order.
//!
//! # Modules
//!
//! - `cli` - Configuration resolution and the sequential run loop
//! - `config` - Environment backed settings
//! - `error` - Error types for every failure class of a run
//! - `management` - Credential, query file, publishing and report handling
//! - `prompt` - Operator prompts over any reader/writer pair
//! - `selection` - Best-candidate selection and duplicate detection
//! - `types` - Data structures shared across the crate
//! - `utils` - Small formatting helpers
//! - `ytmusic` - The catalog capability traits and the YouTube Music client

pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod prompt;
pub mod selection;
pub mod types;
pub mod utils;
pub mod ytmusic;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Found {} song queries", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only use this for fatal errors at the top of the program; library code
/// returns errors instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
