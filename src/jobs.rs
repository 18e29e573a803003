use crate::launcher::{wait_blocking, wait_nonblocking};
use crate::usage;
use nix::unistd::Pid;
use std::io::Write;

/// A command launched in the background and not yet seen to exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    /// Program name as typed, shown by `jobs`.
    pub command: String,
    /// Wall-clock milliseconds captured right before the fork.
    pub start_ms: i64,
}

/// Background jobs in launch order.
///
/// Position in the table is the job number shown to the user (1-based). Entries are
/// removed as soon as their process is reaped, so numbers are always contiguous and
/// a later job moves down when an earlier one finishes.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly launched process and return its job number.
    pub fn add(&mut self, pid: Pid, command: impl Into<String>, start_ms: i64) -> usize {
        let command = command.into();
        log::info!("job [{}] started: {} {}", self.jobs.len() + 1, pid, command);
        self.jobs.push(Job {
            pid,
            command,
            start_ms,
        });
        self.jobs.len()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Job numbers with their entries, in table order.
    pub fn list(&self) -> impl Iterator<Item = (usize, &Job)> + '_ {
        self.jobs.iter().enumerate().map(|(i, job)| (i + 1, job))
    }

    /// Reap every finished job without blocking.
    ///
    /// Each entry is checked exactly once. Finished jobs leave the table as soon as
    /// they are reaped, then are announced with the number they had when the pass
    /// started, each followed by a usage report. Returns how many jobs completed.
    pub fn poll(&mut self, out: &mut dyn Write) -> anyhow::Result<usize> {
        let mut finished = Vec::new();
        let mut failure = None;
        for (i, job) in self.jobs.iter().enumerate() {
            match wait_nonblocking(job.pid) {
                Ok(true) => finished.push((i + 1, job.clone())),
                Ok(false) => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        // Reaped processes cannot be waited on again, so they go before any output.
        self.jobs.retain(|job| !finished.iter().any(|(_, done)| done.pid == job.pid));

        for (n, job) in &finished {
            writeln!(out, "[{}] {} Completed", n, job.pid)?;
            usage::report(job.start_ms, out)?;
            log::info!("job [{}] completed: {} {}", n, job.pid, job.command);
        }

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(finished.len()),
        }
    }

    /// Block until every remaining job has exited, reporting each in table order.
    ///
    /// Only used on the way out of the shell.
    pub fn drain_blocking(&mut self, out: &mut dyn Write) -> anyhow::Result<usize> {
        if self.jobs.is_empty() {
            return Ok(0);
        }

        writeln!(out, "Waiting for {} process(es) to finish", self.jobs.len())?;
        out.flush()?;

        let mut drained = 0;
        while let Some(pid) = self.jobs.first().map(|job| job.pid) {
            wait_blocking(pid)?;
            let job = self.jobs.remove(0);
            drained += 1;
            writeln!(out, "[{}] {} Completed", drained, job.pid)?;
            usage::report(job.start_ms, out)?;
            log::info!("job [{}] completed: {} {}", drained, job.pid, job.command);
        }
        Ok(drained)
    }
}
