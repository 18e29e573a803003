use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::error::is_fatal;
use crate::interpreter::Factory;
use crate::parser::CommandLine;
use crate::state::ShellState;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in the shell process. A trailing `&` is ignored for them.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "jobs" or "cd".
    fn name() -> &'static str;

    /// Executes the command against the shell state.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, io: Streams<'_>, state: &mut ShellState) -> Result<ExitCode> {
        match T::execute(*self, io.stdout, state) {
            Ok(x) => Ok(x),
            Err(e) if is_fatal(&e) => Err(e),
            Err(e) => {
                writeln!(io.stderr, "{e:#}")?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, io: Streams<'_>, _state: &mut ShellState) -> Result<ExitCode> {
        if self.is_error {
            writeln!(io.stderr, "{}", self.output)?;
            Ok(1)
        } else {
            writeln!(io.stdout, "{}", self.output)?;
            Ok(0)
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, line: &CommandLine) -> Option<Box<dyn ExecutableCommand>> {
        let name = line.name();
        if name == T::name() {
            Some(match T::from_args(&[name], &line.args()) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Wait for all background jobs to finish, then leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always exits with status 0.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        state.jobs.drain_blocking(stdout)?;
        state.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory of the shell.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, _state: &mut ShellState) -> Result<ExitCode> {
        env::set_current_dir(&self.target)
            .with_context(|| format!("cd: can't chdir to {}", self.target))?;
        log::debug!("changed directory to {}", self.target);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change a shell setting. The only setting is the prompt: `set prompt = <value>`.
pub struct Set {
    #[argh(positional, greedy)]
    /// the words `prompt`, `=` and the new prompt text.
    pub args: Vec<String>,
}

impl BuiltinCommand for Set {
    fn name() -> &'static str {
        "set"
    }

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        match self.args.as_slice() {
            [key, eq, value] if key == "prompt" && eq == "=" => {
                state.prompt = value.clone();
                Ok(0)
            }
            _ => Err(anyhow::anyhow!("set: usage: set prompt = <value>")),
        }
    }
}

#[derive(FromArgs)]
/// List background jobs that have not been seen to finish.
pub struct Jobs {}

impl BuiltinCommand for Jobs {
    fn name() -> &'static str {
        "jobs"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        if state.jobs.is_empty() {
            writeln!(stdout, "No jobs running")?;
        }
        for (n, job) in state.jobs.list() {
            writeln!(stdout, "[{}] {} {}", n, job.pid, job.command)?;
        }
        Ok(0)
    }
}
