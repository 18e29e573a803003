use crate::state::DEFAULT_PROMPT;
use argh::FromArgs;
use log::LevelFilter;

#[derive(FromArgs, Debug)]
/// Run a command and report its resource usage, or start an interactive shell
/// when no command is given.
pub struct Config {
    #[argh(option, default = "LevelFilter::Off")]
    /// diagnostic verbosity on stderr: off, error, warn, info, debug or trace.
    pub log_level: LevelFilter,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt shown before each line in interactive mode.
    pub prompt: String,

    #[argh(positional, greedy)]
    /// command and arguments to run once in the foreground.
    pub command: Vec<String>,
}

/// What the binary should do with a parsed [`Config`].
#[derive(Debug, PartialEq, Eq)]
pub enum Mode<'a> {
    OneShot(&'a [String]),
    Interactive,
}

impl Config {
    pub fn mode(&self) -> Mode<'_> {
        if self.command.is_empty() {
            Mode::Interactive
        } else {
            Mode::OneShot(&self.command)
        }
    }
}
