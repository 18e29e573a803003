//! End-of-process resource usage statistics.
//!
//! Figures come from `getrusage(RUSAGE_CHILDREN)`, which the kernel keeps as a running
//! total over *every* child this process has reaped so far. A report printed after the
//! third job therefore includes the CPU time, faults and switches of the first two as
//! well, and `max_rss` is the largest resident set of any reaped child. Isolating one
//! child would need per-process accounting the parent cannot get without extra IPC, so
//! the aggregate is reported as-is.

use crate::error::ShellError;
use nix::sys::resource::{UsageWho, getrusage};
use nix::sys::time::TimeVal;
use std::fmt;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds since the Unix epoch.
///
/// Negative when the system clock is set before 1970.
pub fn now_millis() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_millis() as i64,
        Err(before) => -(before.duration().as_millis() as i64),
    }
}

fn millis(tv: TimeVal) -> i64 {
    tv.tv_sec() as i64 * 1000 + tv.tv_usec() as i64 / 1000
}

/// Snapshot of accumulated child accounting plus the wall-clock time of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReport {
    pub system_ms: i64,
    pub user_ms: i64,
    /// May be negative if the clock moved backwards while the command ran.
    pub wall_clock_ms: i64,
    pub involuntary_switches: i64,
    pub voluntary_switches: i64,
    pub major_faults: i64,
    pub minor_faults: i64,
    pub max_rss_kb: i64,
}

impl UsageReport {
    /// Collect statistics for a command started at `start_ms` (see [`now_millis`]).
    pub fn since(start_ms: i64) -> Result<Self, ShellError> {
        let end_ms = now_millis();
        let usage = getrusage(UsageWho::RUSAGE_CHILDREN).map_err(ShellError::Usage)?;

        let wall_clock_ms = end_ms - start_ms;
        if wall_clock_ms < 0 {
            log::warn!("wall clock went backwards by {} ms", -wall_clock_ms);
        }

        Ok(Self {
            system_ms: millis(usage.system_time()),
            user_ms: millis(usage.user_time()),
            wall_clock_ms,
            involuntary_switches: usage.involuntary_context_switches() as i64,
            voluntary_switches: usage.voluntary_context_switches() as i64,
            major_faults: usage.major_page_faults() as i64,
            minor_faults: usage.minor_page_faults() as i64,
            max_rss_kb: usage.max_rss() as i64,
        })
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "USAGE STATISTICS:")?;
        writeln!(f, "*** system time = {} milliseconds", self.system_ms)?;
        writeln!(f, "*** user time = {} milliseconds", self.user_ms)?;
        writeln!(f, "*** wall clock time = {} milliseconds", self.wall_clock_ms)?;
        writeln!(f, "*** involuntary context switches = {}", self.involuntary_switches)?;
        writeln!(f, "*** voluntary context switches = {}", self.voluntary_switches)?;
        writeln!(f, "*** page faults requiring I/O = {}", self.major_faults)?;
        writeln!(f, "*** page faults serviced without I/O = {}", self.minor_faults)?;
        writeln!(f, "*** maximum resident set size = {} kilobytes", self.max_rss_kb)
    }
}

/// Print the usage block for a command started at `start_ms`.
pub fn report(start_ms: i64, out: &mut dyn Write) -> anyhow::Result<UsageReport> {
    let usage = UsageReport::since(start_ms)?;
    write!(out, "{usage}")?;
    out.flush()?;
    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 8] = [
        "*** system time = ",
        "*** user time = ",
        "*** wall clock time = ",
        "*** involuntary context switches = ",
        "*** voluntary context switches = ",
        "*** page faults requiring I/O = ",
        "*** page faults serviced without I/O = ",
        "*** maximum resident set size = ",
    ];

    #[test]
    fn test_report_contains_all_labels_with_non_negative_values() {
        let start = now_millis();
        let mut out = Vec::new();
        let usage = report(start, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("USAGE STATISTICS:"));

        for (label, line) in LABELS.iter().zip(lines) {
            let rest = line.strip_prefix(label).unwrap_or_else(|| {
                panic!("expected line starting with {label:?}, got {line:?}")
            });
            let number: i64 = rest.split_whitespace().next().unwrap().parse().unwrap();
            assert!(number >= 0, "{label} reported {number}");
        }
        assert!(usage.wall_clock_ms >= 0);
    }

    #[test]
    fn test_units_are_spelled_out() {
        let usage = UsageReport {
            system_ms: 1,
            user_ms: 2,
            wall_clock_ms: 3,
            involuntary_switches: 4,
            voluntary_switches: 5,
            major_faults: 6,
            minor_faults: 7,
            max_rss_kb: 8,
        };
        let text = usage.to_string();
        assert!(text.contains("*** system time = 1 milliseconds\n"));
        assert!(text.contains("*** user time = 2 milliseconds\n"));
        assert!(text.contains("*** wall clock time = 3 milliseconds\n"));
        assert!(text.contains("*** page faults requiring I/O = 6\n"));
        assert!(text.ends_with("*** maximum resident set size = 8 kilobytes\n"));
    }

    #[test]
    fn test_future_start_gives_negative_wall_clock_without_failing() {
        let usage = UsageReport::since(now_millis() + 60_000).unwrap();
        assert!(usage.wall_clock_ms < 0);
    }
}
