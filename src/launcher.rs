use crate::command::ExitCode;
use crate::error::ShellError;
use crate::jobs::JobTable;
use crate::usage::{self, now_millis};
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork};
use std::ffi::CString;
use std::io::Write;

/// Outcome of [`launch`] as seen by the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// The child ran to completion and its usage report has been printed.
    Foreground { pid: Pid, status: Option<WaitStatus> },
    /// The child keeps running and is tracked as job number `job`.
    Background { job: usize, pid: Pid },
}

impl Launch {
    /// Shell-style exit code of a foreground child; background launches count as success.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Launch::Foreground { status, .. } => match status {
                Some(WaitStatus::Exited(_, code)) => *code,
                Some(WaitStatus::Signaled(_, signal, _)) => 128 + *signal as i32,
                _ => 0,
            },
            Launch::Background { .. } => 0,
        }
    }
}

fn to_exec_args(argv: &[String]) -> Result<Vec<CString>, ShellError> {
    argv.iter()
        .map(|arg| {
            CString::new(arg.as_bytes()).map_err(|_| ShellError::InvalidArgument(arg.clone()))
        })
        .collect()
}

/// Fork and exec `argv`, then either wait for it or hand it to `jobs`.
///
/// `argv[0]` is looked up in `PATH` and also becomes the child's own `argv[0]`.
/// A program that cannot be executed only takes down the child, which exits with
/// status 1; the caller sees an ordinary foreground completion.
///
/// Foreground launches wait for this exact child, so outstanding background jobs
/// are never reaped by mistake.
pub fn launch(
    argv: &[String],
    background: bool,
    jobs: &mut JobTable,
    out: &mut dyn Write,
) -> anyhow::Result<Launch> {
    let Some(program) = argv.first() else {
        anyhow::bail!("nothing to launch");
    };
    let args = to_exec_args(argv)?;

    // Anything still buffered would otherwise be printed twice.
    out.flush()?;
    std::io::stdout().flush()?;

    let start_ms = now_millis();
    // SAFETY: the child only calls execvp, write and _exit before it is replaced or gone.
    match unsafe { fork() }.map_err(ShellError::Fork)? {
        ForkResult::Child => exec_child(&args),
        ForkResult::Parent { child } => {
            log::debug!("forked {} for {:?} (background: {})", child, argv, background);
            if background {
                let job = jobs.add(child, program.as_str(), start_ms);
                writeln!(out, "[{job}] {child}")?;
                out.flush()?;
                Ok(Launch::Background { job, pid: child })
            } else {
                let status = wait_blocking(child)?;
                usage::report(start_ms, out)?;
                Ok(Launch::Foreground { pid: child, status })
            }
        }
    }
}

fn exec_child(args: &[CString]) -> ! {
    let err = match execvp(&args[0], args) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    let msg = format!("doit: {}: {}\n", args[0].to_string_lossy(), err.desc());
    let _ = nix::unistd::write(std::io::stderr(), msg.as_bytes());
    // SAFETY: terminates the forked child without running the parent's exit handlers.
    unsafe { nix::libc::_exit(1) }
}

/// Block until `pid` terminates.
///
/// Returns `None` when the process is not (or no longer) our child.
pub(crate) fn wait_blocking(pid: Pid) -> Result<Option<WaitStatus>, ShellError> {
    loop {
        match waitpid(pid, None) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                log::debug!("reaped {pid}: {status:?}");
                return Ok(Some(status));
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => {
                log::warn!("process {pid} was already reaped");
                return Ok(None);
            }
            Err(errno) => return Err(ShellError::Wait { pid, errno }),
        }
    }
}

/// Reap `pid` if it has terminated, without blocking.
///
/// A process that is no longer our child counts as terminated so that it does not
/// linger in the job table.
pub(crate) fn wait_nonblocking(pid: Pid) -> Result<bool, ShellError> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                log::debug!("reaped {pid}: {status:?}");
                return Ok(true);
            }
            Ok(_) => return Ok(false),
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => {
                log::warn!("process {pid} was already reaped");
                return Ok(true);
            }
            Err(errno) => return Err(ShellError::Wait { pid, errno }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_foreground_waits_and_reports() {
        let mut jobs = JobTable::new();
        let mut out = Vec::new();
        let launch = launch(&argv(&["true"]), false, &mut jobs, &mut out).unwrap();

        assert!(matches!(launch, Launch::Foreground { .. }));
        assert_eq!(launch.exit_code(), 0);
        assert!(jobs.is_empty());

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("USAGE STATISTICS:\n"), "{text}");
        assert!(text.contains("*** wall clock time = "));
    }

    #[test]
    fn test_foreground_exit_status_is_kept() {
        let mut jobs = JobTable::new();
        let mut out = Vec::new();
        let launch = launch(&argv(&["sh", "-c", "exit 3"]), false, &mut jobs, &mut out).unwrap();
        assert_eq!(launch.exit_code(), 3);
    }

    #[test]
    fn test_missing_program_fails_only_the_child() {
        let mut jobs = JobTable::new();
        let mut out = Vec::new();
        let launch = launch(
            &argv(&["definitely-not-a-real-program-4711"]),
            false,
            &mut jobs,
            &mut out,
        )
        .unwrap();
        assert_eq!(launch.exit_code(), 1);
        assert!(String::from_utf8(out).unwrap().contains("USAGE STATISTICS:"));
    }

    #[test]
    fn test_background_returns_immediately_and_registers_job() {
        let mut jobs = JobTable::new();
        let mut out = Vec::new();
        let started = Instant::now();
        let launch = launch(&argv(&["sleep", "1"]), true, &mut jobs, &mut out).unwrap();
        assert!(started.elapsed() < Duration::from_millis(900));

        let Launch::Background { job, pid } = launch else {
            panic!("expected a background launch, got {launch:?}");
        };
        assert_eq!(job, 1);
        assert_eq!(String::from_utf8(out).unwrap(), format!("[1] {pid}\n"));

        let listed: Vec<_> = jobs
            .list()
            .map(|(n, job)| (n, job.pid, job.command.clone()))
            .collect();
        assert_eq!(listed, vec![(1, pid, "sleep".to_string())]);

        let mut out = Vec::new();
        jobs.drain_blocking(&mut out).unwrap();
    }

    #[test]
    fn test_foreground_does_not_reap_background_job() {
        let mut jobs = JobTable::new();
        let mut out = Vec::new();
        let bg = launch(&argv(&["true"]), true, &mut jobs, &mut out).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        launch(&argv(&["sleep", "0.1"]), false, &mut jobs, &mut out).unwrap();

        assert_eq!(jobs.len(), 1);
        let mut out = Vec::new();
        assert_eq!(jobs.poll(&mut out).unwrap(), 1);
        let Launch::Background { pid, .. } = bg else {
            panic!("expected a background launch");
        };
        assert!(String::from_utf8(out).unwrap().starts_with(&format!("[1] {pid} Completed")));
    }

    #[test]
    fn test_nul_byte_is_rejected_before_fork() {
        let mut jobs = JobTable::new();
        let mut out = Vec::new();
        let err = launch(&argv(&["echo", "a\0b"]), false, &mut jobs, &mut out).unwrap_err();
        let shell_err = err.downcast_ref::<ShellError>().unwrap();
        assert!(matches!(shell_err, ShellError::InvalidArgument(_)));
        assert!(!shell_err.is_fatal());
        assert!(out.is_empty());
    }

    #[test]
    fn test_signaled_child_maps_to_128_plus_signal() {
        let launch = Launch::Foreground {
            pid: Pid::from_raw(1),
            status: Some(WaitStatus::Signaled(
                Pid::from_raw(1),
                nix::sys::signal::Signal::SIGKILL,
                false,
            )),
        };
        assert_eq!(launch.exit_code(), 137);
    }
}
