use crate::parser::CommandLine;
use crate::state::ShellState;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Output streams handed to a command.
///
/// Launched programs inherit the shell's real descriptors; these sinks carry only
/// what the shell itself prints (job notices, usage reports, diagnostics).
pub struct Streams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// Errors returned here end the shell; recoverable failures are reported to
    /// `io.stderr` and turned into a non-zero exit code instead.
    fn execute(self: Box<Self>, io: Streams<'_>, state: &mut ShellState) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a parsed line.
///
/// Returns `None` when the factory doesn't recognize the command name.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided line.
    fn try_create(&self, line: &CommandLine) -> Option<Box<dyn ExecutableCommand>>;
}
