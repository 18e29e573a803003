use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::error::is_fatal;
use crate::interpreter::Factory;
use crate::launcher::launch;
use crate::parser::CommandLine;
use crate::state::ShellState;
use anyhow::Result;

/// Command that is not a builtin: a program forked off the shell.
pub struct ExternalCommand {
    argv: Vec<String>,
    background: bool,
}

impl ExternalCommand {
    pub fn new(argv: Vec<String>, background: bool) -> Self {
        Self { argv, background }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    /// Accepts every name; program lookup happens in the child via `PATH`.
    fn try_create(&self, line: &CommandLine) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(
            line.argv.clone(),
            line.background,
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, io: Streams<'_>, state: &mut ShellState) -> Result<ExitCode> {
        match launch(&self.argv, self.background, &mut state.jobs, io.stdout) {
            Ok(launched) => Ok(launched.exit_code()),
            Err(e) if is_fatal(&e) => Err(e),
            Err(e) => {
                writeln!(io.stderr, "doit: {e:#}")?;
                Ok(1)
            }
        }
    }
}
