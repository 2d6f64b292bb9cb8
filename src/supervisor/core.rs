// src/supervisor/core.rs

//! Pure supervisor state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`SupervisorEvent`]s and produces the [`ProcessEvent`]s to publish to
//! subscribers. The async shell (`supervisor::command`) is responsible for:
//! - spawning the OS process and the stream bridge
//! - feeding serialized events into the core from a single event-loop task
//! - delivering published events to subscribers
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, or processes.

use chrono::{DateTime, Utc};
use nix::sys::signal::Signal;
use tracing::{error, warn};

use crate::history::{Direction, HistoryEntry, HistoryLog};
use crate::supervisor::{ProcessEvent, SupervisorEvent};
use crate::types::CommandStatus;

/// All mutable supervisor state: status, pid, exit code, start time and the
/// history log.
///
/// After spawn, exactly one event-loop task calls [`step`](Self::step); every
/// other party only reads snapshots. The status advances monotonically and
/// terminal states are never left.
#[derive(Debug)]
pub struct SupervisorCore {
    status: CommandStatus,
    pid: Option<u32>,
    exit_code: Option<i32>,
    started_at: Option<DateTime<Utc>>,
    history: HistoryLog,
}

impl SupervisorCore {
    pub fn new(history_limit: Option<usize>) -> Self {
        Self {
            status: CommandStatus::NotStarted,
            pid: None,
            exit_code: None,
            started_at: None,
            history: HistoryLog::new(history_limit),
        }
    }

    /// Record the moment `run()` was invoked (before spawn confirmation).
    pub fn mark_run_invoked(&mut self, at: DateTime<Utc>) {
        self.started_at = Some(at);
    }

    pub fn status(&self) -> CommandStatus {
        self.status
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.snapshot()
    }

    /// Handle a single event, updating state and returning the lifecycle
    /// event to publish, if any.
    pub fn step(&mut self, event: SupervisorEvent) -> Option<ProcessEvent> {
        match event {
            SupervisorEvent::Spawned { pid } => self.on_spawned(pid),
            SupervisorEvent::Chunk { direction, bytes } => self.on_chunk(direction, &bytes),
            SupervisorEvent::Exited { code, signal } => self.on_exited(code, signal),
            SupervisorEvent::Failed { message } => self.on_failed(message),
        }
    }

    fn on_spawned(&mut self, pid: u32) -> Option<ProcessEvent> {
        if self.status != CommandStatus::NotStarted {
            warn!(pid, status = %self.status, "spawn event in unexpected status; ignoring");
            return None;
        }
        self.pid = Some(pid);
        self.status = CommandStatus::Running;
        Some(ProcessEvent::Started { pid })
    }

    fn on_chunk(&mut self, direction: Direction, bytes: &[u8]) -> Option<ProcessEvent> {
        // Chunks delivered after exit are still part of the exchange; record
        // them without touching the (possibly terminal) status.
        let data = String::from_utf8_lossy(bytes).into_owned();
        self.history.append(direction, data);
        Some(ProcessEvent::DataReceived {
            direction,
            bytes: bytes.len(),
        })
    }

    fn on_exited(&mut self, code: Option<i32>, signal: Option<i32>) -> Option<ProcessEvent> {
        if self.status.is_terminal() {
            warn!(?code, ?signal, status = %self.status, "exit event after terminal status; ignoring");
            return None;
        }
        self.exit_code = code;
        self.status = interpret_exit(code, signal);
        Some(ProcessEvent::Exited { code, signal })
    }

    fn on_failed(&mut self, message: String) -> Option<ProcessEvent> {
        error!(pid = ?self.pid, %message, "process error");
        if self.status.is_terminal() {
            return None;
        }
        // Absorbed locally: the supervisor never propagates post-spawn
        // process errors to the caller. Exit code is left as-is.
        self.status = CommandStatus::Stopped;
        Some(ProcessEvent::Errored { message })
    }
}

/// Map an exit status to the terminal supervisor status.
///
/// The terminating signal, if any, takes precedence over the numeric exit
/// code; signals other than SIGKILL/SIGTERM fall through to the code check.
fn interpret_exit(code: Option<i32>, signal: Option<i32>) -> CommandStatus {
    match signal {
        Some(s) if s == Signal::SIGKILL as i32 => CommandStatus::Killed,
        Some(s) if s == Signal::SIGTERM as i32 => CommandStatus::Stopped,
        _ => {
            if code.is_some_and(|c| c > 0) {
                CommandStatus::Errored
            } else {
                CommandStatus::Finished
            }
        }
    }
}
