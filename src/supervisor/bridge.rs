// src/supervisor/bridge.rs

//! Stream bridge between the child's stdio and the caller's channels.
//!
//! Three relay tasks run for the lifetime of their respective streams:
//!
//! - child stdout → caller `output` sink, duplicated into history as `OUT`
//! - child stderr → caller `error` sink, duplicated into history as `ERR`
//! - caller `input` channel → child stdin, duplicated into history as `IN`
//!
//! Duplication happens by sending a [`SupervisorEvent::Chunk`] into the
//! supervisor's event loop; the loop owns the history log. Sends to the
//! caller's sinks are awaited, so a slow consumer blocks only its own relay
//! task (bounded buffering, no drops). A caller that drops its sink stops
//! receiving data, but the stream keeps being drained and recorded so the
//! child never blocks on a full pipe.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::history::Direction;
use crate::supervisor::{StreamHandles, SupervisorEvent};

const READ_BUF_SIZE: usize = 4096;

/// The child's stream ends, taken from the spawned process.
pub(crate) struct BridgeStreams {
    pub stdout: Option<ChildStdout>,
    pub stderr: Option<ChildStderr>,
    pub stdin: Option<ChildStdin>,
}

/// Spawn the relay tasks for one supervised process.
pub(crate) fn spawn_stream_bridge(
    streams: BridgeStreams,
    handles: StreamHandles,
    event_tx: mpsc::Sender<SupervisorEvent>,
) {
    if let Some(stdout) = streams.stdout {
        tokio::spawn(relay_output(
            stdout,
            handles.output,
            event_tx.clone(),
            Direction::Out,
        ));
    }

    if let Some(stderr) = streams.stderr {
        tokio::spawn(relay_output(
            stderr,
            handles.error,
            event_tx.clone(),
            Direction::Err,
        ));
    }

    if let Some(stdin) = streams.stdin {
        tokio::spawn(relay_input(handles.input, stdin, event_tx));
    }
}

/// Relay one of the child's output streams until EOF.
async fn relay_output<R>(
    mut reader: R,
    sink: mpsc::Sender<Vec<u8>>,
    event_tx: mpsc::Sender<SupervisorEvent>,
    direction: Direction,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_BUF_SIZE];
    let mut sink_open = true;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(%direction, error = %e, "error reading process stream");
                break;
            }
        };

        let chunk = buf[..n].to_vec();

        if event_tx
            .send(SupervisorEvent::Chunk {
                direction,
                bytes: chunk.clone(),
            })
            .await
            .is_err()
        {
            // Event loop is gone; nothing left to record into.
            break;
        }

        if sink_open && sink.send(chunk).await.is_err() {
            debug!(%direction, "caller sink closed; draining stream without forwarding");
            sink_open = false;
        }
    }

    debug!(%direction, "process stream closed");
}

/// Relay caller input into the child's stdin until the input channel closes.
///
/// Dropping the caller's input sender closes the child's stdin (EOF). A
/// failed stdin write raises a `Failed` event for the state machine.
async fn relay_input(
    mut input: mpsc::Receiver<Vec<u8>>,
    mut stdin: ChildStdin,
    event_tx: mpsc::Sender<SupervisorEvent>,
) {
    while let Some(chunk) = input.recv().await {
        if event_tx
            .send(SupervisorEvent::Chunk {
                direction: Direction::In,
                bytes: chunk.clone(),
            })
            .await
            .is_err()
        {
            break;
        }

        if let Err(e) = write_chunk(&mut stdin, &chunk).await {
            let _ = event_tx
                .send(SupervisorEvent::Failed {
                    message: format!("writing to process stdin: {e}"),
                })
                .await;
            break;
        }
    }

    debug!("input channel closed; releasing process stdin");
}

async fn write_chunk(stdin: &mut ChildStdin, chunk: &[u8]) -> std::io::Result<()> {
    stdin.write_all(chunk).await?;
    stdin.flush().await
}
