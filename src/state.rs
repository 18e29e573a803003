use crate::jobs::JobTable;

/// Prompt used when none is configured.
pub const DEFAULT_PROMPT: &str = "==>";

/// Everything the shell remembers between two lines of input.
///
/// The working directory is not mirrored here: `cd` changes the process's own
/// directory and launched programs inherit it.
#[derive(Debug)]
pub struct ShellState {
    /// Text printed (followed by a space) before each line is read.
    pub prompt: String,
    /// Background jobs not yet seen to exit.
    pub jobs: JobTable,
    /// Set by `exit` once all jobs are drained; the read loop stops when it sees it.
    pub should_exit: bool,
}

impl ShellState {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            jobs: JobTable::new(),
            should_exit: false,
        }
    }

    /// The prompt exactly as it is shown to the user.
    pub fn prompt_text(&self) -> String {
        format!("{} ", self.prompt)
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}
