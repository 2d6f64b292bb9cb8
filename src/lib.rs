// src/lib.rs

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod dock;
pub mod errors;
pub mod history;
pub mod logging;
pub mod params;
pub mod supervisor;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::{CliArgs, CliCommand};
use crate::config::loader::load_and_validate;
use crate::config::Manifest;
use crate::descriptor::CommandParameter;
use crate::dock::Dock;
use crate::supervisor::{CallerStreams, ProcessEvent};
use crate::types::CommandStatus;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading
/// - the dock of supervisors
/// - terminal stdio bridging for `run`
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest_path = PathBuf::from(&args.manifest);
    let manifest = load_and_validate(&manifest_path)?;

    match args.command {
        CliCommand::List => {
            print_listing(&manifest);
            Ok(())
        }
        CliCommand::Run { alias, answers } => run_command(&manifest, &alias, answers).await,
    }
}

async fn run_command(manifest: &Manifest, alias: &str, answers: Vec<String>) -> Result<()> {
    let mut dock = Dock::from_manifest(manifest);
    let mut entry = dock.take(alias)?;

    let parameters = apply_answers(entry.supervisor.parameters(), answers);
    entry.supervisor.set_parameters(parameters)?;

    let mut events = entry.supervisor.subscribe("cli");
    entry.supervisor.run()?;

    let supervisor = Arc::new(entry.supervisor);
    info!(alias = %supervisor.alias(), pid = ?supervisor.pid(), "command started");

    // Ctrl-C → graceful stop; the resulting transition is observed below.
    {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = supervisor.stop();
        });
    }

    let CallerStreams {
        input,
        output,
        error,
    } = entry.streams;

    tokio::spawn(pump_terminal_input(input));
    let output_pump = tokio::spawn(pump_to_stdout(output));
    let error_pump = tokio::spawn(pump_to_stderr(error));

    // Wait for a terminal transition.
    while let Some(event) = events.recv().await {
        match event {
            ProcessEvent::Exited { .. } | ProcessEvent::Errored { .. } => break,
            ProcessEvent::Started { .. } | ProcessEvent::DataReceived { .. } => {}
        }
    }

    // Drain any output still buffered in the channels.
    let _ = output_pump.await;
    let _ = error_pump.await;

    let status = supervisor.status();
    info!(alias = %supervisor.alias(), %status, code = ?supervisor.exit_code(), "command ended");

    match status {
        CommandStatus::Finished | CommandStatus::Stopped => Ok(()),
        other => Err(anyhow!(
            "command '{alias}' ended with status '{other}' (exit code {:?})",
            supervisor.exit_code()
        )),
    }
}

/// Fill placeholder answers from the CLI, in descriptor order.
///
/// Provided answers override any defaults from the manifest; placeholders
/// beyond the provided answers keep their manifest answer (if any).
fn apply_answers(parameters: &[CommandParameter], answers: Vec<String>) -> Vec<CommandParameter> {
    let mut answers = answers.into_iter();
    parameters
        .iter()
        .map(|p| match p {
            CommandParameter::Literal(s) => CommandParameter::Literal(s.clone()),
            CommandParameter::Placeholder { parameter, answer } => {
                CommandParameter::Placeholder {
                    parameter: parameter.clone(),
                    answer: answers.next().or_else(|| answer.clone()),
                }
            }
        })
        .collect()
}

/// Relay terminal stdin into the supervisor's input channel.
async fn pump_terminal_input(input: mpsc::Sender<Vec<u8>>) {
    let mut stdin = tokio::io::stdin();
    let mut buf = [0u8; 4096];
    loop {
        match stdin.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if input.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn pump_to_stdout(mut output: mpsc::Receiver<Vec<u8>>) {
    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = output.recv().await {
        if stdout.write_all(&chunk).await.is_err() {
            break;
        }
        let _ = stdout.flush().await;
    }
}

async fn pump_to_stderr(mut error: mpsc::Receiver<Vec<u8>>) {
    let mut stderr = tokio::io::stderr();
    while let Some(chunk) = error.recv().await {
        if stderr.write_all(&chunk).await.is_err() {
            break;
        }
        let _ = stderr.flush().await;
    }
}

/// Simple listing output: aliases, descriptions and command lines.
fn print_listing(manifest: &Manifest) {
    println!("commands ({}):", manifest.len());
    for descriptor in manifest.commands() {
        println!("  - {}", descriptor.alias());
        if let Some(description) = descriptor.description() {
            println!("      {description}");
        }
        println!("      cmd: {}", descriptor.command_line());
    }
}
