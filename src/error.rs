use nix::errno::Errno;
use nix::unistd::Pid;
use std::fmt;

/// OS-level failures raised while launching, waiting on or accounting for child processes.
///
/// Whether the shell survives one of these is decided by [`ShellError::is_fatal`]:
/// a failed fork, a failed wait and unavailable resource accounting abort the shell,
/// everything else is reported and the prompt loop carries on.
#[derive(Debug)]
pub enum ShellError {
    /// `fork(2)` failed; there is nothing left to recover with.
    Fork(Errno),
    /// Waiting on a specific child failed for a reason other than interruption.
    Wait { pid: Pid, errno: Errno },
    /// `getrusage(2)` refused to report child accounting.
    Usage(Errno),
    /// An argument cannot be handed to exec because it contains a NUL byte.
    InvalidArgument(String),
}

impl ShellError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ShellError::InvalidArgument(_))
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Fork(errno) => write!(f, "fork error: {errno}"),
            ShellError::Wait { pid, errno } => write!(f, "wait error for process {pid}: {errno}"),
            ShellError::Usage(errno) => write!(f, "resource usage unavailable: {errno}"),
            ShellError::InvalidArgument(arg) => {
                write!(f, "argument contains a NUL byte: {arg:?}")
            }
        }
    }
}

impl std::error::Error for ShellError {}

/// True when `err` wraps a [`ShellError`] the shell cannot continue after.
pub(crate) fn is_fatal(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ShellError>()
        .is_some_and(ShellError::is_fatal)
}
