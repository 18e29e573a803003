use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fmt;
use std::io::{IsTerminal, Write};

/// Writes level-tagged diagnostics to standard error, keeping standard output for
/// the shell's own reports.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

/// One diagnostic line; colour escapes only when `color` is set.
fn format_line(level: Level, args: &fmt::Arguments<'_>, color: bool) -> String {
    if !color {
        return format!("[{level:>5}] {args}");
    }
    let code = match level {
        Level::Error => 31,
        Level::Warn => 93,
        Level::Info => 34,
        Level::Debug => 32,
        Level::Trace => 90,
    };
    format!("\x1b[{code}m[{level:>5}] {args}\x1b[0m")
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr();
        let line = format_line(record.level(), record.args(), stderr.is_terminal());
        let _ = writeln!(stderr, "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the logger; records above `level` are discarded.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
