use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::io::{BufRead, Write};

/// What a single read at the prompt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C at the prompt; the partial line is dropped.
    Interrupted,
    /// End of input.
    Eof,
}

/// Source of command lines for the interactive loop.
///
/// Implementations are responsible for showing `prompt` before they block.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> anyhow::Result<ReadOutcome>;
}

/// Line editor for a terminal; rustyline draws the prompt itself.
pub struct Editor {
    rl: DefaultEditor,
}

impl Editor {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        Ok(Self {
            rl: DefaultEditor::with_config(config)?,
        })
    }
}

impl LineReader for Editor {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> anyhow::Result<ReadOutcome> {
        stdout.flush()?;
        match self.rl.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain line-by-line input for pipes and scripts.
///
/// The prompt is written to `stdout` before every read so that the output of a
/// scripted session looks like an interactive one.
pub struct Piped<R> {
    input: R,
}

impl<R: BufRead> Piped<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineReader for Piped<R> {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> anyhow::Result<ReadOutcome> {
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(ReadOutcome::Line(trimmed.to_string()))
    }
}
