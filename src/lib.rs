//! A small interactive shell that reports resource usage for every command it runs.
//!
//! Each command line is split on whitespace and either handled by a built-in
//! (`exit`, `cd`, `set prompt = ...`, `jobs`) or forked off as a child process.
//! Foreground children are waited for; a trailing `&` sends a child to the
//! background, where it is tracked in a [`jobs::JobTable`] and reaped without
//! blocking before each prompt. Whenever a child is reaped the shell prints a
//! [`usage::UsageReport`] with CPU time, context switches, page faults and peak
//! memory.
//!
//! The main entry point is [`Interpreter`]. The public modules expose the pieces
//! it is built from, for embedding or for implementing further commands.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod external;
pub mod input;
mod interpreter;
pub mod jobs;
pub mod launcher;
pub mod logging;
pub mod parser;
pub mod state;
#[cfg(test)]
mod test_support;
pub mod usage;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
