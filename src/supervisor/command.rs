// src/supervisor/command.rs

//! The supervisor itself: spawning, signalling and state access.

use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::os::unix::process::ExitStatusExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::descriptor::{CommandDescriptor, CommandParameter};
use crate::errors::{ProcdockError, Result};
use crate::history::HistoryEntry;
use crate::params::resolve_command_parameters;
use crate::supervisor::bridge::{spawn_stream_bridge, BridgeStreams};
use crate::supervisor::core::SupervisorCore;
use crate::supervisor::events::SubscriberHub;
use crate::supervisor::{ProcessEvent, StreamHandles, SupervisorEvent, SupervisorOptions};
use crate::types::CommandStatus;

/// Buffer size of the internal event channel feeding the event loop.
const EVENT_CHANNEL_SIZE: usize = 64;

/// Supervises exactly one OS process, started at most once.
///
/// Constructed from a validated [`CommandDescriptor`] plus the supervisor's
/// ends of the three stream channels. `run()` spawns the process and returns
/// immediately; all subsequent state changes arrive asynchronously through
/// the event loop. Callers observe them by polling the accessors or by
/// subscribing to [`ProcessEvent`]s.
pub struct CommandSupervisor {
    descriptor: CommandDescriptor,
    options: SupervisorOptions,
    core: Arc<Mutex<SupervisorCore>>,
    hub: SubscriberHub,
    handles: Option<StreamHandles>,
}

impl CommandSupervisor {
    pub fn new(descriptor: CommandDescriptor, handles: StreamHandles) -> Self {
        Self::with_options(descriptor, handles, SupervisorOptions::default())
    }

    pub fn with_options(
        descriptor: CommandDescriptor,
        handles: StreamHandles,
        options: SupervisorOptions,
    ) -> Self {
        let core = SupervisorCore::new(options.history_limit);
        Self {
            descriptor,
            options,
            core: Arc::new(Mutex::new(core)),
            hub: SubscriberHub::new(),
            handles: Some(handles),
        }
    }

    /// Resolve parameters, spawn the OS process and wire up the stream
    /// bridge and exit observer.
    ///
    /// Returns as soon as the process is spawned. Errors:
    /// - [`ProcdockError::AlreadyStarted`] unless the supervisor is in
    ///   `NotStarted`;
    /// - [`ProcdockError::Validation`] when a placeholder has no answer;
    /// - [`ProcdockError::Spawn`] when the OS refuses to spawn; the status
    ///   stays `NotStarted` and `run()` may be retried after fixing the
    ///   parameters.
    pub fn run(&mut self) -> Result<()> {
        if self.lock_core().status() != CommandStatus::NotStarted {
            return Err(ProcdockError::AlreadyStarted);
        }
        let handles = self.handles.take().ok_or(ProcdockError::AlreadyStarted)?;

        let args = match resolve_command_parameters(self.descriptor.parameters()) {
            Ok(args) => args,
            Err(e) => {
                self.handles = Some(handles);
                return Err(e);
            }
        };

        self.lock_core().mark_run_invoked(Utc::now());

        let mut cmd = Command::new(self.descriptor.command());
        cmd.args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.options.working_dir {
            cmd.current_dir(dir);
        }
        if let Some(uid) = self.options.uid {
            cmd.uid(uid);
        }
        if let Some(gid) = self.options.gid {
            cmd.gid(gid);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                self.handles = Some(handles);
                return Err(ProcdockError::Spawn {
                    command: self.descriptor.command().to_string(),
                    source,
                });
            }
        };

        let pid = child.id().unwrap_or_default();
        info!(
            alias = %self.descriptor.alias(),
            pid,
            cmd = %self.descriptor.command_line(),
            "spawned supervised process"
        );

        if let Some(event) = self.lock_core().step(SupervisorEvent::Spawned { pid }) {
            self.hub.publish(&event);
        }

        let (event_tx, event_rx) = mpsc::channel::<SupervisorEvent>(EVENT_CHANNEL_SIZE);

        let streams = BridgeStreams {
            stdout: child.stdout.take(),
            stderr: child.stderr.take(),
            stdin: child.stdin.take(),
        };
        spawn_stream_bridge(streams, handles, event_tx.clone());

        spawn_exit_observer(child, event_tx);
        spawn_event_loop(
            Arc::clone(&self.core),
            self.hub.clone(),
            event_rx,
            self.descriptor.alias().to_string(),
        );

        Ok(())
    }

    /// Request graceful termination (SIGTERM). Fire-and-forget: the state
    /// transition arrives asynchronously via the exit observer.
    pub fn stop(&self) -> Result<()> {
        self.signal(Signal::SIGTERM)
    }

    /// Request forceful termination (SIGKILL). Likewise asynchronous.
    pub fn kill(&self) -> Result<()> {
        self.signal(Signal::SIGKILL)
    }

    fn signal(&self, signal: Signal) -> Result<()> {
        let (status, pid) = {
            let core = self.lock_core();
            (core.status(), core.pid())
        };
        if status != CommandStatus::Running {
            return Err(ProcdockError::NotRunning);
        }
        let pid = pid.ok_or(ProcdockError::NotRunning)?;

        debug!(pid, %signal, "signalling supervised process");
        match kill(Pid::from_raw(pid as i32), signal) {
            Ok(()) => Ok(()),
            // Already gone; the exit observer delivers the transition.
            Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(ProcdockError::IoError(std::io::Error::from_raw_os_error(
                errno as i32,
            ))),
        }
    }

    pub fn status(&self) -> CommandStatus {
        self.lock_core().status()
    }

    pub fn is_running(&self) -> bool {
        self.status() == CommandStatus::Running
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock_core().pid()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.lock_core().exit_code()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.lock_core().started_at()
    }

    /// Read-only snapshot of the history log.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock_core().history()
    }

    pub fn parameters(&self) -> &[CommandParameter] {
        self.descriptor.parameters()
    }

    /// Replace the parameter list, typically to inject placeholder answers.
    ///
    /// Only valid while the supervisor is in `NotStarted`.
    pub fn set_parameters(&mut self, parameters: Vec<CommandParameter>) -> Result<()> {
        if self.lock_core().status() != CommandStatus::NotStarted {
            return Err(ProcdockError::AlreadyStarted);
        }
        self.descriptor.set_parameters(parameters);
        Ok(())
    }

    pub fn description(&self) -> Option<&str> {
        self.descriptor.description()
    }

    pub fn alias(&self) -> &str {
        self.descriptor.alias()
    }

    pub fn command_line(&self) -> String {
        self.descriptor.command_line()
    }

    /// Register a subscriber for lifecycle events under `label`.
    pub fn subscribe(&self, label: impl Into<String>) -> mpsc::UnboundedReceiver<ProcessEvent> {
        self.hub.subscribe(label)
    }

    /// Drop the subscribers registered under `label`, or all of them when
    /// `label` is `None`.
    pub fn remove_subscribers(&self, label: Option<&str>) {
        self.hub.remove(label);
    }

    fn lock_core(&self) -> MutexGuard<'_, SupervisorCore> {
        self.core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Watch for process exit and feed the result into the event loop.
fn spawn_exit_observer(mut child: tokio::process::Child, event_tx: mpsc::Sender<SupervisorEvent>) {
    tokio::spawn(async move {
        let event = match child.wait().await {
            Ok(status) => SupervisorEvent::Exited {
                code: status.code(),
                signal: status.signal(),
            },
            Err(e) => SupervisorEvent::Failed {
                message: format!("waiting for process: {e}"),
            },
        };
        let _ = event_tx.send(event).await;
    });
}

/// The single-writer event loop: the only task that mutates supervisor state
/// after spawn.
///
/// Ends when every event producer (bridge tasks and exit observer) has
/// dropped its sender, i.e. once the process has exited and its streams are
/// drained.
fn spawn_event_loop(
    core: Arc<Mutex<SupervisorCore>>,
    hub: SubscriberHub,
    mut event_rx: mpsc::Receiver<SupervisorEvent>,
    alias: String,
) {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let published = {
                let mut core = core.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                core.step(event)
            };
            if let Some(event) = published {
                hub.publish(&event);
            }
        }
        debug!(%alias, "supervisor event loop finished (event channel closed)");
    });
}
