use std::time::Duration;

use anyhow::Context;
use home_shared::InputSignal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::cli::ShellLine;
use crate::commands::Client;
use crate::session::SessionWatchdog;
use crate::transport::Transport;

/// Interactive session over stdin.
///
/// Every line counts as a key press for the idle watchdog. The shell ends
/// on `exit`/`quit`, on Ctrl-C, or when the session goes idle and is logged
/// out. After stdin closes the watchdog keeps running until it fires.
pub async fn run_shell<T>(client: &mut Client<T>, idle_timeout: Duration) -> anyhow::Result<()>
where
    T: Transport + Clone + 'static,
{
    let mut watchdog = SessionWatchdog::spawn(client.transport().clone(), idle_timeout);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = wait_for_shutdown_signal();
    tokio::pin!(shutdown);

    info!("interactive shell ready");
    loop {
        tokio::select! {
            outcome = watchdog.expired() => {
                let outcome = outcome?;
                println!("session idle; logged out (HTTP {})", outcome.status);
                return Ok(());
            }
            () = &mut shutdown => {
                warn!("received shutdown signal; leaving shell");
                return Ok(());
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("failed reading stdin")? else {
                    info!("stdin closed; waiting for the session to go idle");
                    stdin_open = false;
                    continue;
                };
                watchdog.notify(InputSignal::KeyPress);

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "exit" | "quit") {
                    return Ok(());
                }

                match ShellLine::parse_line(line) {
                    Ok(command) => match client.execute(command).await {
                        Ok(report) => println!("{report}"),
                        Err(err) => {
                            error!(error = %err, "command failed");
                            eprintln!("error: {err:#}");
                        }
                    },
                    Err(err) => eprintln!("{err}"),
                }
            }
        }
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(error) => {
            error!(%error, "failed to register SIGINT handler; falling back to ctrl_c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(error) => {
            error!(%error, "failed to register SIGTERM handler; falling back to ctrl_c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
