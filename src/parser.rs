use std::fmt;

/// Marker that, as the last word of a line, sends the command to the background.
pub const BACKGROUND_MARKER: &str = "&";

/// One tokenized input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program or built-in name followed by its arguments; never empty.
    pub argv: Vec<String>,
    /// Whether the line ended with a standalone [`BACKGROUND_MARKER`].
    pub background: bool,
}

impl CommandLine {
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> Vec<&str> {
        self.argv[1..].iter().map(String::as_str).collect()
    }
}

/// Errors that can occur while splitting an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    /// The line consisted of the background marker alone.
    MissingCommand,
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingError::MissingCommand => {
                write!(f, "syntax error: missing command before '{BACKGROUND_MARKER}'")
            }
        }
    }
}

impl std::error::Error for ParsingError {}

/// Split `line` on whitespace and strip a trailing background marker.
///
/// Returns `Ok(None)` for a line with no words at all. A `&` anywhere but at the end
/// is an ordinary argument, and `&` glued to a word (`sleep 1&`) is not a marker.
pub fn parse_line(line: &str) -> Result<Option<CommandLine>, ParsingError> {
    let mut argv: Vec<String> = line.split_whitespace().map(str::to_owned).collect();

    let background = argv.last().is_some_and(|w| w == BACKGROUND_MARKER);
    if background {
        argv.pop();
        if argv.is_empty() {
            return Err(ParsingError::MissingCommand);
        }
    }

    if argv.is_empty() {
        return Ok(None);
    }
    Ok(Some(CommandLine { argv, background }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &CommandLine) -> Vec<&str> {
        line.argv.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_plain_command() {
        let line = parse_line("ls -l /tmp").unwrap().unwrap();
        assert_eq!(words(&line), ["ls", "-l", "/tmp"]);
        assert!(!line.background);
        assert_eq!(line.name(), "ls");
        assert_eq!(line.args(), ["-l", "/tmp"]);
    }

    #[test]
    fn test_trailing_marker_sets_background() {
        let line = parse_line("sleep 1 &").unwrap().unwrap();
        assert_eq!(words(&line), ["sleep", "1"]);
        assert!(line.background);
    }

    #[test]
    fn test_marker_elsewhere_is_an_argument() {
        let line = parse_line("echo & done").unwrap().unwrap();
        assert_eq!(words(&line), ["echo", "&", "done"]);
        assert!(!line.background);

        let glued = parse_line("sleep 1&").unwrap().unwrap();
        assert_eq!(words(&glued), ["sleep", "1&"]);
        assert!(!glued.background);
    }

    #[test]
    fn test_extra_whitespace_is_ignored() {
        let line = parse_line("  \techo   hi \t &  ").unwrap().unwrap();
        assert_eq!(words(&line), ["echo", "hi"]);
        assert!(line.background);
    }

    #[test]
    fn test_empty_and_blank_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t "), Ok(None));
    }

    #[test]
    fn test_lone_marker_is_an_error() {
        assert_eq!(parse_line("&"), Err(ParsingError::MissingCommand));
        assert_eq!(parse_line("  & "), Err(ParsingError::MissingCommand));
    }

    #[test]
    fn test_long_lines_are_not_truncated() {
        let long: Vec<String> = (0..500).map(|i| format!("arg{i}")).collect();
        let line = parse_line(&format!("echo {}", long.join(" "))).unwrap().unwrap();
        assert_eq!(line.argv.len(), 501);
        assert_eq!(line.argv[500], "arg499");
    }
}
