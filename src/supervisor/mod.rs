// src/supervisor/mod.rs

//! Process supervision layer.
//!
//! One [`CommandSupervisor`] owns one OS process for its entire lifetime:
//! it resolves the descriptor's parameters, spawns the process with
//! `tokio::process::Command`, tracks state transitions driven by exit codes
//! and signals, bridges the process's standard streams to caller-owned
//! channels, and records every exchanged chunk in a history log.
//!
//! - [`core`] contains the pure, synchronous state machine. All mutation of
//!   `status` / `exit_code` / `history` goes through [`SupervisorCore::step`],
//!   which is driven by exactly one event-loop task after spawn.
//! - [`command`] is the async shell: spawning, signalling, accessors.
//! - [`bridge`] relays bytes between the child's stdio and the caller's
//!   channels, duplicating every chunk into the history via events.
//! - [`events`] is the typed publish/subscribe hub for lifecycle events.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::history::Direction;

pub mod bridge;
pub mod command;
pub mod core;
pub mod events;

pub use self::core::SupervisorCore;
pub use command::CommandSupervisor;
pub use events::SubscriberHub;

/// Internal events serialized into the supervisor's event loop.
///
/// These are produced by the stream bridge and the exit observer, and
/// consumed exclusively by the single event-loop task that owns all state
/// mutation.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// The OS process was spawned successfully.
    Spawned { pid: u32 },
    /// A chunk of data passed through one of the three standard streams.
    Chunk { direction: Direction, bytes: Vec<u8> },
    /// The process exited; `code` is `None` when terminated by a signal.
    Exited {
        code: Option<i32>,
        signal: Option<i32>,
    },
    /// A post-spawn process-level error (e.g. a broken stdin pipe).
    Failed { message: String },
}

/// Lifecycle events published to subscribers.
///
/// This is the closed set of observable process events; consumers react to
/// these without depending on the OS-process representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started { pid: u32 },
    DataReceived { direction: Direction, bytes: usize },
    Exited {
        code: Option<i32>,
        signal: Option<i32>,
    },
    Errored { message: String },
}

/// Spawn context for the supervised process.
///
/// Every field defaults to "inherit from the calling process"; uid/gid and
/// the working directory can be overridden explicitly, which also makes them
/// injectable in tests.
#[derive(Debug, Clone, Default)]
pub struct SupervisorOptions {
    pub working_dir: Option<PathBuf>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    /// Maximum retained history entries; `None` means unbounded.
    pub history_limit: Option<usize>,
}

/// The three stream channel ends handed to a supervisor at construction.
///
/// The caller keeps the opposite ends (see [`CallerStreams`]): it writes
/// process input into `input`'s sender and reads process output/error from
/// `output`/`error` receivers. All channels are bounded; the bridge awaits
/// sends, so a slow consumer blocks only its own relay task.
#[derive(Debug)]
pub struct StreamHandles {
    pub input: mpsc::Receiver<Vec<u8>>,
    pub output: mpsc::Sender<Vec<u8>>,
    pub error: mpsc::Sender<Vec<u8>>,
}

/// The caller-side ends of a supervisor's stream channels.
#[derive(Debug)]
pub struct CallerStreams {
    pub input: mpsc::Sender<Vec<u8>>,
    pub output: mpsc::Receiver<Vec<u8>>,
    pub error: mpsc::Receiver<Vec<u8>>,
}

/// Build a connected pair of stream-handle bundles with the given per-channel
/// buffer capacity.
pub fn stream_pair(capacity: usize) -> (StreamHandles, CallerStreams) {
    let (input_tx, input_rx) = mpsc::channel(capacity);
    let (output_tx, output_rx) = mpsc::channel(capacity);
    let (error_tx, error_rx) = mpsc::channel(capacity);

    (
        StreamHandles {
            input: input_rx,
            output: output_tx,
            error: error_tx,
        },
        CallerStreams {
            input: input_tx,
            output: output_rx,
            error: error_rx,
        },
    )
}
