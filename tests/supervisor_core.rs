// tests/supervisor_core.rs

//! Pure state-machine tests: no Tokio, no channels, no processes.

use chrono::Utc;
use nix::sys::signal::Signal;

use procdock::history::{Direction, HistoryLog};
use procdock::supervisor::{ProcessEvent, SupervisorCore, SupervisorEvent};
use procdock::types::CommandStatus;

fn running_core() -> SupervisorCore {
    let mut core = SupervisorCore::new(None);
    core.mark_run_invoked(Utc::now());
    core.step(SupervisorEvent::Spawned { pid: 42 });
    core
}

fn chunk(direction: Direction, data: &str) -> SupervisorEvent {
    SupervisorEvent::Chunk {
        direction,
        bytes: data.as_bytes().to_vec(),
    }
}

#[test]
fn starts_not_started_with_no_pid_or_exit_code() {
    let core = SupervisorCore::new(None);

    assert_eq!(core.status(), CommandStatus::NotStarted);
    assert_eq!(core.pid(), None);
    assert_eq!(core.exit_code(), None);
    assert_eq!(core.started_at(), None);
    assert!(core.history().is_empty());
}

#[test]
fn spawn_event_moves_to_running_and_records_pid() {
    let mut core = SupervisorCore::new(None);

    let event = core.step(SupervisorEvent::Spawned { pid: 42 });

    assert_eq!(event, Some(ProcessEvent::Started { pid: 42 }));
    assert_eq!(core.status(), CommandStatus::Running);
    assert_eq!(core.pid(), Some(42));
}

#[test]
fn clean_exit_maps_to_finished() {
    let mut core = running_core();

    let event = core.step(SupervisorEvent::Exited {
        code: Some(0),
        signal: None,
    });

    assert_eq!(
        event,
        Some(ProcessEvent::Exited {
            code: Some(0),
            signal: None
        })
    );
    assert_eq!(core.status(), CommandStatus::Finished);
    assert_eq!(core.exit_code(), Some(0));
}

#[test]
fn missing_exit_code_maps_to_finished() {
    let mut core = running_core();

    core.step(SupervisorEvent::Exited {
        code: None,
        signal: None,
    });

    assert_eq!(core.status(), CommandStatus::Finished);
    assert_eq!(core.exit_code(), None);
}

#[test]
fn nonzero_exit_code_maps_to_errored() {
    let mut core = running_core();

    core.step(SupervisorEvent::Exited {
        code: Some(1),
        signal: None,
    });

    assert_eq!(core.status(), CommandStatus::Errored);
    assert_eq!(core.exit_code(), Some(1));
}

#[test]
fn sigkill_maps_to_killed() {
    let mut core = running_core();

    core.step(SupervisorEvent::Exited {
        code: None,
        signal: Some(Signal::SIGKILL as i32),
    });

    assert_eq!(core.status(), CommandStatus::Killed);
    assert_eq!(core.exit_code(), None);
}

#[test]
fn sigterm_maps_to_stopped() {
    let mut core = running_core();

    core.step(SupervisorEvent::Exited {
        code: None,
        signal: Some(Signal::SIGTERM as i32),
    });

    assert_eq!(core.status(), CommandStatus::Stopped);
}

#[test]
fn other_signal_with_no_code_maps_to_finished() {
    let mut core = running_core();

    core.step(SupervisorEvent::Exited {
        code: None,
        signal: Some(Signal::SIGINT as i32),
    });

    assert_eq!(core.status(), CommandStatus::Finished);
}

#[test]
fn process_error_maps_to_stopped_and_keeps_exit_code() {
    let mut core = running_core();

    let event = core.step(SupervisorEvent::Failed {
        message: "broken pipe".to_string(),
    });

    assert!(matches!(event, Some(ProcessEvent::Errored { .. })));
    assert_eq!(core.status(), CommandStatus::Stopped);
    assert_eq!(core.exit_code(), None);
}

#[test]
fn terminal_states_are_never_left() {
    let mut core = running_core();
    core.step(SupervisorEvent::Exited {
        code: Some(0),
        signal: None,
    });
    assert_eq!(core.status(), CommandStatus::Finished);

    assert_eq!(
        core.step(SupervisorEvent::Exited {
            code: Some(1),
            signal: None,
        }),
        None
    );
    assert_eq!(
        core.step(SupervisorEvent::Failed {
            message: "late".to_string(),
        }),
        None
    );
    assert_eq!(core.step(SupervisorEvent::Spawned { pid: 7 }), None);

    assert_eq!(core.status(), CommandStatus::Finished);
    assert_eq!(core.exit_code(), Some(0));
    assert_eq!(core.pid(), Some(42));
}

#[test]
fn history_records_chunks_in_delivery_order() {
    let mut core = running_core();
    let started_at = core.started_at().unwrap();

    core.step(chunk(Direction::Out, "first"));
    core.step(chunk(Direction::In, "typed"));
    core.step(chunk(Direction::Out, "second"));
    core.step(chunk(Direction::Err, "oops"));

    let history = core.history();
    assert_eq!(history.len(), 4);

    let tags: Vec<Direction> = history.iter().map(|e| e.direction).collect();
    assert_eq!(
        tags,
        vec![Direction::Out, Direction::In, Direction::Out, Direction::Err]
    );

    let data: Vec<&str> = history.iter().map(|e| e.data.as_str()).collect();
    assert_eq!(data, vec!["first", "typed", "second", "oops"]);

    for entry in &history {
        assert!(entry.at >= started_at);
    }
}

#[test]
fn chunk_events_report_byte_counts() {
    let mut core = running_core();

    let event = core.step(chunk(Direction::Out, "hello"));

    assert_eq!(
        event,
        Some(ProcessEvent::DataReceived {
            direction: Direction::Out,
            bytes: 5
        })
    );
}

#[test]
fn capped_history_retains_newest_entries() {
    let mut log = HistoryLog::new(Some(3));

    for i in 0..5 {
        log.append(Direction::Out, format!("chunk-{i}"));
    }

    let entries = log.snapshot();
    assert_eq!(entries.len(), 3);
    let data: Vec<&str> = entries.iter().map(|e| e.data.as_str()).collect();
    assert_eq!(data, vec!["chunk-2", "chunk-3", "chunk-4"]);
}

#[test]
fn uncapped_history_keeps_everything() {
    let mut log = HistoryLog::new(None);

    for i in 0..100 {
        log.append(Direction::In, format!("chunk-{i}"));
    }

    assert_eq!(log.len(), 100);
}
