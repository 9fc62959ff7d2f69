use crate::services::autosave::coordinator::AutosaveCore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

#[derive(Debug)]
pub(crate) enum AutosaveCommand {
    Changed,
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Debounce loop: one coalesced quiet period for all fields, then one settle.
///
/// Settling runs inline, so edits arriving while a save is in flight queue up in the
/// channel and get their own quiet period once it finishes.
pub(crate) async fn run_autosave_worker(
    core: Arc<AutosaveCore>,
    mut receiver: mpsc::Receiver<AutosaveCommand>,
    debounce: Duration,
) {
    loop {
        let first_cmd = match receiver.recv().await {
            Some(cmd) => cmd,
            None => break,
        };

        let mut acks = Vec::new();
        let mut stopping = false;
        match first_cmd {
            AutosaveCommand::Changed => {}
            AutosaveCommand::Flush(ack) => acks.push(ack),
            AutosaveCommand::Shutdown(ack) => {
                acks.push(ack);
                stopping = true;
            }
        }

        // keep extending the quiet period while edits keep arriving
        if acks.is_empty() {
            loop {
                let timeout = tokio::time::timeout(debounce, receiver.recv()).await;
                match timeout {
                    Ok(Some(AutosaveCommand::Changed)) => {}
                    Ok(Some(AutosaveCommand::Flush(ack))) => {
                        acks.push(ack);
                        break;
                    }
                    Ok(Some(AutosaveCommand::Shutdown(ack))) => {
                        acks.push(ack);
                        stopping = true;
                        break;
                    }
                    Ok(None) => {
                        stopping = true;
                        break;
                    }
                    Err(_) => break,
                }
            }
        }

        if core.take_pending() {
            core.settle().await;
        }

        for ack in acks {
            let _ = ack.send(());
        }

        if stopping {
            break;
        }
    }

    // coordinator dropped without shutdown: don't lose the last edits
    if core.take_pending() {
        core.settle().await;
    }
    debug!("Autosave worker stopped");
}
