// tests/supervisor_process.rs

//! End-to-end supervisor tests against real OS processes.

use std::error::Error;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use procdock::descriptor::CommandParameter;
use procdock::errors::ProcdockError;
use procdock::history::Direction;
use procdock::supervisor::{
    stream_pair, CommandSupervisor, ProcessEvent, SupervisorOptions,
};
use procdock::types::CommandStatus;
use procdock_test_utils::builders::DescriptorBuilder;
use procdock_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn sh(script: &str) -> CommandSupervisor {
    let descriptor = DescriptorBuilder::new("sh")
        .literal("-c")
        .literal(script)
        .build();
    let (handles, _streams) = stream_pair(16);
    CommandSupervisor::new(descriptor, handles)
}

/// Wait until the subscription delivers a terminal lifecycle event.
async fn wait_for_terminal(events: &mut UnboundedReceiver<ProcessEvent>) {
    let wait = async {
        while let Some(event) = events.recv().await {
            if matches!(
                event,
                ProcessEvent::Exited { .. } | ProcessEvent::Errored { .. }
            ) {
                break;
            }
        }
    };
    timeout(Duration::from_secs(5), wait)
        .await
        .expect("process did not reach a terminal state within 5 seconds");
}

/// Poll until `cond` holds; the stream bridge delivers chunks asynchronously
/// relative to the exit event.
async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 3 seconds"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn successful_command_finishes_with_history() -> TestResult {
    init_tracing();

    let descriptor = DescriptorBuilder::new("sh")
        .literal("-c")
        .literal("echo hello")
        .build();
    let (handles, mut streams) = stream_pair(16);
    let mut supervisor = CommandSupervisor::new(descriptor, handles);

    assert_eq!(supervisor.status(), CommandStatus::NotStarted);
    assert!(!supervisor.is_running());

    let mut events = supervisor.subscribe("test");
    supervisor.run()?;

    assert!(supervisor.pid().is_some());
    let started_at = supervisor.started_at().expect("started_at set by run()");

    wait_for_terminal(&mut events).await;

    assert_eq!(supervisor.status(), CommandStatus::Finished);
    assert_eq!(supervisor.exit_code(), Some(0));
    assert!(!supervisor.is_running());

    // The caller's output channel saw the chunk too.
    let chunk = timeout(Duration::from_secs(3), streams.output.recv())
        .await?
        .expect("stdout chunk forwarded to caller");
    assert_eq!(String::from_utf8_lossy(&chunk), "hello\n");

    wait_until(|| {
        supervisor
            .history()
            .iter()
            .any(|e| e.direction == Direction::Out)
    })
    .await;

    let history = supervisor.history();
    let out: Vec<_> = history
        .iter()
        .filter(|e| e.direction == Direction::Out)
        .collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].data, "hello\n");
    assert!(out[0].at >= started_at);

    Ok(())
}

#[tokio::test]
async fn nonzero_exit_code_maps_to_errored() -> TestResult {
    init_tracing();

    let mut supervisor = sh("exit 3");
    let mut events = supervisor.subscribe("test");
    supervisor.run()?;

    wait_for_terminal(&mut events).await;

    assert_eq!(supervisor.status(), CommandStatus::Errored);
    assert_eq!(supervisor.exit_code(), Some(3));

    Ok(())
}

#[tokio::test]
async fn stderr_is_bridged_and_tagged_err() -> TestResult {
    init_tracing();

    let descriptor = DescriptorBuilder::new("sh")
        .literal("-c")
        .literal("echo oops >&2")
        .build();
    let (handles, mut streams) = stream_pair(16);
    let mut supervisor = CommandSupervisor::new(descriptor, handles);

    let mut events = supervisor.subscribe("test");
    supervisor.run()?;
    wait_for_terminal(&mut events).await;

    let chunk = timeout(Duration::from_secs(3), streams.error.recv())
        .await?
        .expect("stderr chunk forwarded to caller");
    assert_eq!(String::from_utf8_lossy(&chunk), "oops\n");

    wait_until(|| {
        supervisor
            .history()
            .iter()
            .any(|e| e.direction == Direction::Err && e.data == "oops\n")
    })
    .await;

    Ok(())
}

#[tokio::test]
async fn kill_request_maps_to_killed() -> TestResult {
    init_tracing();

    let mut supervisor = sh("sleep 5");
    let mut events = supervisor.subscribe("test");
    supervisor.run()?;

    assert!(supervisor.is_running());
    supervisor.kill()?;

    wait_for_terminal(&mut events).await;

    assert_eq!(supervisor.status(), CommandStatus::Killed);
    assert_eq!(supervisor.exit_code(), None);
    assert!(!supervisor.is_running());

    Ok(())
}

#[tokio::test]
async fn stop_request_maps_to_stopped() -> TestResult {
    init_tracing();

    let mut supervisor = sh("sleep 5");
    let mut events = supervisor.subscribe("test");
    supervisor.run()?;

    supervisor.stop()?;

    wait_for_terminal(&mut events).await;

    assert_eq!(supervisor.status(), CommandStatus::Stopped);
    assert_eq!(supervisor.exit_code(), None);

    Ok(())
}

#[tokio::test]
async fn input_is_written_to_stdin_and_recorded() -> TestResult {
    init_tracing();

    let descriptor = DescriptorBuilder::new("cat").build();
    let (handles, mut streams) = stream_pair(16);
    let mut supervisor = CommandSupervisor::new(descriptor, handles);

    let mut events = supervisor.subscribe("test");
    supervisor.run()?;

    streams.input.send(b"hello\n".to_vec()).await?;

    let chunk = timeout(Duration::from_secs(3), streams.output.recv())
        .await?
        .expect("cat echoed the input back");
    assert_eq!(String::from_utf8_lossy(&chunk), "hello\n");

    // Closing the input channel closes the child's stdin; cat exits cleanly.
    drop(streams.input);
    wait_for_terminal(&mut events).await;

    assert_eq!(supervisor.status(), CommandStatus::Finished);

    wait_until(|| {
        let history = supervisor.history();
        history
            .iter()
            .any(|e| e.direction == Direction::In && e.data == "hello\n")
            && history
                .iter()
                .any(|e| e.direction == Direction::Out && e.data == "hello\n")
    })
    .await;

    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_synchronous_and_leaves_not_started() -> TestResult {
    init_tracing();

    let descriptor = DescriptorBuilder::new("procdock-no-such-binary").build();
    let (handles, _streams) = stream_pair(16);
    let mut supervisor = CommandSupervisor::new(descriptor, handles);

    let err = supervisor.run().unwrap_err();

    assert!(matches!(err, ProcdockError::Spawn { .. }));
    assert_eq!(supervisor.status(), CommandStatus::NotStarted);
    assert_eq!(supervisor.pid(), None);
    assert!(!supervisor.is_running());

    Ok(())
}

#[tokio::test]
async fn run_is_guarded_against_double_spawn() -> TestResult {
    init_tracing();

    let mut supervisor = sh("sleep 5");
    let mut events = supervisor.subscribe("test");
    supervisor.run()?;

    let err = supervisor.run().unwrap_err();
    assert!(matches!(err, ProcdockError::AlreadyStarted));

    supervisor.kill()?;
    wait_for_terminal(&mut events).await;

    // Still guarded once terminal.
    let err = supervisor.run().unwrap_err();
    assert!(matches!(err, ProcdockError::AlreadyStarted));

    Ok(())
}

#[tokio::test]
async fn signalling_requires_a_running_process() -> TestResult {
    init_tracing();

    let mut supervisor = sh("true");

    assert!(matches!(
        supervisor.stop().unwrap_err(),
        ProcdockError::NotRunning
    ));
    assert!(matches!(
        supervisor.kill().unwrap_err(),
        ProcdockError::NotRunning
    ));

    let mut events = supervisor.subscribe("test");
    supervisor.run()?;
    wait_for_terminal(&mut events).await;

    assert!(matches!(
        supervisor.stop().unwrap_err(),
        ProcdockError::NotRunning
    ));
    assert_eq!(supervisor.status(), CommandStatus::Finished);

    Ok(())
}

#[tokio::test]
async fn parameters_can_be_injected_before_run_only() -> TestResult {
    init_tracing();

    let descriptor = DescriptorBuilder::new("echo")
        .placeholder("prefix-$", None)
        .build();
    let (handles, mut streams) = stream_pair(16);
    let mut supervisor = CommandSupervisor::new(descriptor, handles);

    // Unanswered placeholder: run() refuses to resolve.
    let err = supervisor.run().unwrap_err();
    assert!(matches!(err, ProcdockError::Validation(_)));
    assert_eq!(supervisor.status(), CommandStatus::NotStarted);

    supervisor.set_parameters(vec![CommandParameter::Placeholder {
        parameter: "prefix-$".to_string(),
        answer: Some("answered".to_string()),
    }])?;

    let mut events = supervisor.subscribe("test");
    supervisor.run()?;
    wait_for_terminal(&mut events).await;

    let chunk = timeout(Duration::from_secs(3), streams.output.recv())
        .await?
        .expect("echo printed the resolved argument");
    assert_eq!(String::from_utf8_lossy(&chunk), "prefix-answered\n");

    let err = supervisor
        .set_parameters(vec![CommandParameter::Literal("late".to_string())])
        .unwrap_err();
    assert!(matches!(err, ProcdockError::AlreadyStarted));

    Ok(())
}

#[tokio::test]
async fn working_dir_option_is_applied() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let expected = std::fs::canonicalize(dir.path())?;

    let descriptor = DescriptorBuilder::new("sh")
        .literal("-c")
        .literal("pwd")
        .build();
    let (handles, mut streams) = stream_pair(16);
    let options = SupervisorOptions {
        working_dir: Some(dir.path().to_path_buf()),
        ..SupervisorOptions::default()
    };
    let mut supervisor = CommandSupervisor::with_options(descriptor, handles, options);

    let mut events = supervisor.subscribe("test");
    supervisor.run()?;
    wait_for_terminal(&mut events).await;

    let chunk = timeout(Duration::from_secs(3), streams.output.recv())
        .await?
        .expect("pwd printed the working directory");
    assert_eq!(
        String::from_utf8_lossy(&chunk).trim(),
        expected.display().to_string()
    );

    Ok(())
}

#[tokio::test]
async fn removed_subscribers_stop_receiving_events() -> TestResult {
    init_tracing();

    let mut supervisor = sh("true");
    let mut removed = supervisor.subscribe("ui");
    let mut kept = supervisor.subscribe("test");

    supervisor.remove_subscribers(Some("ui"));
    supervisor.run()?;

    wait_for_terminal(&mut kept).await;

    // The removed receiver sees only a closed channel.
    assert!(timeout(Duration::from_secs(1), removed.recv())
        .await?
        .is_none());

    Ok(())
}
