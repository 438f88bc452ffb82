use crate::app::command::{Command, Envelope, Outbound, Reply};
use crate::app::notification::Notification;
use crate::app::router::CommandRouter;
use crate::error::{LaunchbarError, Result};

use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub enum Request {
    Dispatch {
        command: Command,
        reply: oneshot::Sender<Result<Reply>>,
    },
    Attach {
        capacity: usize,
        reply: oneshot::Sender<mpsc::Receiver<Notification>>,
    },
}

/// Cheap to clone; every clone feeds the same coordinator task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Request>,
}

impl CoordinatorHandle {
    pub async fn dispatch(&self, command: Command) -> Result<Reply> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Dispatch { command, reply })
            .await
            .map_err(|_| LaunchbarError::CoordinatorClosed)?;
        rx.await.map_err(|_| LaunchbarError::CoordinatorClosed)?
    }

    /// Registers a surface. The first message on the returned channel is a
    /// `Snapshot` of the list at attach time.
    pub async fn attach(&self, capacity: usize) -> Result<mpsc::Receiver<Notification>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Attach { capacity, reply })
            .await
            .map_err(|_| LaunchbarError::CoordinatorClosed)?;
        rx.await.map_err(|_| LaunchbarError::CoordinatorClosed)
    }
}

/// Moves the router into its own task. Requests are processed one at a time
/// in arrival order; the task ends, handing the router back, once every
/// handle is dropped.
pub fn spawn_coordinator(
    mut router: CommandRouter,
    capacity: usize,
) -> (CoordinatorHandle, JoinHandle<CommandRouter>) {
    let (tx, mut rx) = mpsc::channel(capacity.max(1));
    let task = tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            match request {
                Request::Dispatch { command, reply } => {
                    let result = router.dispatch(command).await;
                    if let Err(err) = &result {
                        log::debug!("command failed: {err}");
                    }
                    let _ = reply.send(result);
                }
                Request::Attach { capacity, reply } => {
                    let _ = reply.send(router.attach(capacity));
                }
            }
        }
        log::info!("coordinator stopped");
        router
    });
    (CoordinatorHandle { tx }, task)
}

/// Serves one surface over stdin/stdout, one JSON object per line.
pub async fn run_loop(router: CommandRouter, capacity: usize) -> anyhow::Result<()> {
    let (line_tx, line_rx) = mpsc::channel(capacity.max(1));
    tokio::task::spawn_blocking(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if line_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("stdin: {e}");
                    break;
                }
            }
        }
    });

    let (out_tx, mut out_rx) = mpsc::channel::<Outbound>(capacity.max(1));
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = out_rx.recv().await {
            let mut line = serde_json::to_string(&message)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    run_loop_with_lines(router, line_rx, out_tx, capacity).await?;
    writer.await??;
    Ok(())
}

/// Drives the coordinator from raw request lines. Every push a command
/// causes is written before that command's reply. Returns the router once
/// the input ends.
pub async fn run_loop_with_lines(
    router: CommandRouter,
    mut line_rx: mpsc::Receiver<String>,
    out_tx: mpsc::Sender<Outbound>,
    capacity: usize,
) -> anyhow::Result<CommandRouter> {
    let (handle, task) = spawn_coordinator(router, capacity);
    let mut push_rx = handle.attach(capacity).await?;

    loop {
        tokio::select! {
            Some(notification) = push_rx.recv() => {
                if out_tx.send(Outbound::Push { notification }).await.is_err() {
                    break;
                }
            }
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let (id, result) = match serde_json::from_str::<Envelope>(&line) {
                    Ok(envelope) => (envelope.id, handle.dispatch(envelope.command).await),
                    Err(err) => (
                        request_id(&line),
                        Err(LaunchbarError::InvalidCommand(err.to_string())),
                    ),
                };

                let mut closed = false;
                while let Ok(notification) = push_rx.try_recv() {
                    if out_tx.send(Outbound::Push { notification }).await.is_err() {
                        closed = true;
                        break;
                    }
                }
                if closed || out_tx.send(Outbound::reply(id, &result)).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(handle);
    Ok(task.await?)
}

/// Best-effort id of a line that failed to parse as a command.
fn request_id(line: &str) -> u64 {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|value| value.get("id").and_then(serde_json::Value::as_u64))
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "loop_tests.rs"]
mod tests;
