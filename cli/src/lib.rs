//! Simulation host for the global actions coordinator.
//!
//! Reads [`HostEvent`]s as JSON lines on stdin, feeds them to a coordinator
//! wired to simulated collaborators, and writes the resulting
//! [`HostAction`]s as JSON lines on stdout.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use global_actions_core::Config;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod host_event;
mod simulated;

pub use host_event::HostAction;
pub use host_event::HostEvent;

use crate::simulated::OutgoingActionSender;
use crate::simulated::SimulatedHost;

#[derive(Debug, Parser)]
#[command(name = "global-actions", version)]
pub struct Cli {
    /// Path to a config.toml. Defaults to `$GLOBAL_ACTIONS_HOME/config.toml`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Simulate a device without a primary surface.
    #[arg(long, default_value_t = false)]
    pub no_primary: bool,
}

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let Cli { config, no_primary } = cli;
    let config = match config {
        Some(path) => Config::load_from_path(&path)?,
        None => Config::load()?,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    let (incoming_tx, mut incoming_rx) = mpsc::channel::<HostEvent>(config.channel_capacity);
    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<HostAction>(config.channel_capacity);

    // Task: read from stdin, push to `incoming_tx`.
    let stdin_reader_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read stdin: {e}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HostEvent>(&line) {
                Ok(event) => {
                    if incoming_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to deserialize HostEvent: {e}"),
            }
        }
        debug!("stdin reader finished (EOF)");
    });

    // Task: apply host events to the coordinator.
    let processor_handle = tokio::spawn({
        let host = SimulatedHost::new(&config, !no_primary, OutgoingActionSender::new(outgoing_tx));
        async move {
            while let Some(event) = incoming_rx.recv().await {
                host.handle_event(event).await;
            }
            host.shutdown();
            info!("processor task exited (channel closed)");
        }
    });

    // Task: write outgoing actions to stdout.
    let stdout_writer_handle = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(action) = outgoing_rx.recv().await {
            let json = match serde_json::to_string(&action) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize HostAction: {e}");
                    continue;
                }
            };
            if let Err(e) = stdout.write_all(format!("{json}\n").as_bytes()).await {
                error!("Failed to write to stdout: {e}");
                break;
            }
            if let Err(e) = stdout.flush().await {
                error!("Failed to flush stdout: {e}");
                break;
            }
        }
        info!("stdout writer exited (channel closed)");
    });

    // The usual exit path is EOF on stdin: the reader drops `incoming_tx`,
    // the processor shuts the coordinator down, and once every sender is gone
    // the writer drains and stops.
    let _ = tokio::join!(stdin_reader_handle, processor_handle, stdout_writer_handle);

    Ok(())
}
