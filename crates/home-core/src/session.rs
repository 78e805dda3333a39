use std::time::Duration;

use anyhow::Context;
use home_shared::mutation::LOGOUT_PATH;
use home_shared::{InputSignal, Watchdog};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

use crate::transport::{DispatchOutcome, Transport};

/// Owned inactivity watchdog for one session.
///
/// Armed on spawn. Every [`InputSignal`] pushes the single idle deadline out
/// by the full timeout; once it passes, the session navigates to `/logout`
/// and [`SessionWatchdog::expired`] resolves with that outcome. Dropping the
/// handle stops the watchdog.
#[derive(Debug)]
pub struct SessionWatchdog {
    signals: mpsc::UnboundedSender<InputSignal>,
    task: JoinHandle<anyhow::Result<DispatchOutcome>>,
}

impl SessionWatchdog {
    pub fn spawn<T>(transport: T, timeout: Duration) -> Self
    where
        T: Transport + 'static,
    {
        let (signals, inputs) = mpsc::unbounded_channel();
        info!(timeout_ms = timeout.as_millis() as u64, "arming session watchdog");

        let task = tokio::spawn(async move {
            let idle_at = wait_for_idle(inputs, timeout).await;
            warn!(?idle_at, "session idle; logging out");
            transport
                .navigate(LOGOUT_PATH)
                .await
                .context("failed navigating to logout")
        });

        Self { signals, task }
    }

    /// Returns false once the watchdog has already fired.
    pub fn notify(&self, signal: InputSignal) -> bool {
        self.signals.send(signal).is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Resolves when the idle deadline passed and logout was attempted.
    pub async fn expired(&mut self) -> anyhow::Result<DispatchOutcome> {
        (&mut self.task)
            .await
            .context("session watchdog task failed")?
    }
}

impl Drop for SessionWatchdog {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Waits until `timeout` elapses with no input. Returns the instant the
/// deadline passed.
pub async fn wait_for_idle(
    mut inputs: mpsc::UnboundedReceiver<InputSignal>,
    timeout: Duration,
) -> Instant {
    let mut watchdog = Watchdog::new(timeout);
    let mut deadline = watchdog.arm(Instant::now());
    let mut inputs_open = true;

    loop {
        tokio::select! {
            () = time::sleep_until(deadline) => {
                let now = Instant::now();
                if watchdog.poll(now) {
                    return now;
                }
            }
            signal = inputs.recv(), if inputs_open => match signal {
                Some(signal) => {
                    deadline = watchdog.reset(Instant::now(), signal);
                    trace!(?signal, "input observed; idle deadline moved");
                }
                None => {
                    debug!("input sources closed; keeping idle deadline");
                    inputs_open = false;
                }
            },
        }
    }
}
