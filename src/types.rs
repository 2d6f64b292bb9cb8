use std::fmt;

/// Lifecycle status of a supervised command.
///
/// The status starts at `NotStarted`, moves to `Running` when the OS process
/// has been spawned, and ends in exactly one of the four terminal states.
/// Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// `run()` has not been called (or spawning failed).
    NotStarted,
    /// The OS process is alive.
    Running,
    /// The process exited on its own with code 0 (or no code at all).
    Finished,
    /// The process exited on its own with a non-zero code.
    Errored,
    /// The process was terminated by SIGTERM, or a post-spawn process error
    /// was absorbed by the supervisor.
    Stopped,
    /// The process was terminated by SIGKILL.
    Killed,
}

impl CommandStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, CommandStatus::NotStarted | CommandStatus::Running)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandStatus::NotStarted => "not started",
            CommandStatus::Running => "running",
            CommandStatus::Finished => "finished",
            CommandStatus::Errored => "errored",
            CommandStatus::Stopped => "stopped",
            CommandStatus::Killed => "killed",
        };
        write!(f, "{s}")
    }
}
