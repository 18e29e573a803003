use crate::command::{CommandFactory, ExitCode, Streams};
use crate::error::is_fatal;
use crate::input::{Editor, LineReader, Piped, ReadOutcome};
use crate::launcher::launch;
use crate::parser::parse_line;
use crate::state::ShellState;
use std::io::{self, IsTerminal, Write};

/// Zero-sized factory for one command type of this crate.
///
/// `Factory<T>` implements [`CommandFactory`] for every built-in and for the
/// external launcher; other factories can be passed to [`Interpreter::new`].
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal job-tracking shell.
///
/// The interpreter owns the [`ShellState`] and a list of [`CommandFactory`] objects
/// that are queried in order to create a command for each line. See [`Default`] for
/// the factories included out of the box.
///
/// Example
/// ```no_run
/// use doit::Interpreter;
/// let mut sh = Interpreter::default();
/// sh.repl().unwrap();
/// ```
pub struct Interpreter {
    state: ShellState,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            state: ShellState::default(),
            commands,
        }
    }

    /// Replace the prompt shown before each line.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.state.prompt = prompt.into();
        self
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Run `argv` once in the foreground, bypassing built-ins and the job table.
    ///
    /// Used for `doit command [args...]`.
    pub fn run(&mut self, argv: &[String]) -> anyhow::Result<ExitCode> {
        let mut stdout = io::stdout();
        match launch(argv, false, &mut self.state.jobs, &mut stdout) {
            Ok(launched) => Ok(launched.exit_code()),
            Err(e) if is_fatal(&e) => Err(e),
            Err(e) => {
                eprintln!("doit: {e:#}");
                Ok(1)
            }
        }
    }

    /// Parse and dispatch one input line.
    ///
    /// Blank lines do nothing. An error return means the shell cannot go on.
    pub fn execute_line(&mut self, line: &str, io: Streams<'_>) -> anyhow::Result<ExitCode> {
        let parsed = match parse_line(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return Ok(0),
            Err(e) => {
                writeln!(io.stderr, "doit: {e}")?;
                return Ok(1);
            }
        };

        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&parsed) {
                let code = cmd.execute(io, &mut self.state)?;
                log::debug!("{} exited with {}", parsed.name(), code);
                return Ok(code);
            }
        }
        writeln!(io.stderr, "doit: command not found: {}", parsed.name())?;
        Ok(127)
    }

    /// Reap finished background jobs and print their reports.
    pub fn poll_jobs(&mut self, out: &mut dyn Write) -> anyhow::Result<usize> {
        self.state.jobs.poll(out)
    }

    /// Interactive read-eval loop on the process's stdin.
    ///
    /// A terminal gets the rustyline editor; anything else is read line by line with
    /// the prompt written to stdout. Returns once `exit` (or end of input) has drained
    /// all jobs.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut stdout = io::stdout();
        let mut stderr = io::stderr();
        let streams = Streams {
            stdout: &mut stdout,
            stderr: &mut stderr,
        };
        if io::stdin().is_terminal() {
            self.read_loop(&mut Editor::new()?, streams)
        } else {
            self.read_loop(&mut Piped::new(io::stdin().lock()), streams)
        }
    }

    /// Poll jobs, prompt, read, dispatch; until `exit` or end of input.
    pub fn read_loop(&mut self, input: &mut dyn LineReader, io: Streams<'_>) -> anyhow::Result<()> {
        let Streams { stdout, stderr } = io;

        while !self.state.should_exit {
            self.poll_jobs(stdout)?;

            let line = match input.read_line(&self.state.prompt_text(), stdout)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => "exit".to_string(),
            };

            let io = Streams {
                stdout: &mut *stdout,
                stderr: &mut *stderr,
            };
            self.execute_line(&line, io)?;
            stdout.flush()?;
        }

        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `cd`, `set`, `jobs`
    /// - external command launcher
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Set>::default()),
            Box::new(Factory::<Jobs>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
