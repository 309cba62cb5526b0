//! Tokio task that pumps crossterm's `EventStream` into the runtime
//! channel, with cooperative shutdown.

use crate::translate_key;
use core_events::{CHANNEL_SEND_FAILURES, Event, InputEvent};
use crossterm::event::{Event as CEvent, EventStream};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{debug, info, trace, warn};

/// Handle the runtime uses to ask the input task to exit.
#[derive(Clone, Debug)]
pub struct InputShutdown {
    notify: Arc<Notify>,
}

impl InputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

/// Spawn the input pump. Bracketed paste is enabled for the task's
/// lifetime so large prompt texts arrive as a single `Paste` payload
/// instead of a burst of key events.
pub fn spawn_input_task(sender: Sender<Event>) -> (task::JoinHandle<()>, InputShutdown) {
    let notify = Arc::new(Notify::new());
    let shutdown = InputShutdown {
        notify: notify.clone(),
    };
    let handle = task::spawn(async move {
        if let Err(join_err) = task::spawn_blocking(enable_bracketed_paste).await {
            debug!(target: "input.paste", ?join_err, "enable_failed_join");
        }
        let reason = pump(sender, notify).await;
        if let Err(join_err) = task::spawn_blocking(disable_bracketed_paste).await {
            debug!(target: "input.paste", ?join_err, "disable_failed_join");
        }
        info!(target: "input.thread", reason = reason.as_str(), "input_task_stopped");
    });
    (handle, shutdown)
}

fn enable_bracketed_paste() {
    if let Err(err) = write!(io::stdout(), "\x1b[?2004h") {
        debug!(target: "input.paste", ?err, "enable_failed");
    }
    let _ = io::stdout().flush();
}

fn disable_bracketed_paste() {
    if let Err(err) = write!(io::stdout(), "\x1b[?2004l") {
        debug!(target: "input.paste", ?err, "disable_failed");
    }
    let _ = io::stdout().flush();
}

async fn pump(sender: Sender<Event>, shutdown: Arc<Notify>) -> ExitReason {
    info!(target: "input.thread", "input_task_started");
    let mut stream = EventStream::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.notified() => return ExitReason::ShutdownSignal,
            next = stream.next() => next,
        };
        let Some(result) = next else {
            return ExitReason::StreamEnded;
        };
        let event = match result {
            Ok(CEvent::Key(key)) => match translate_key(key) {
                Some(input) => Event::Input(input),
                None => continue,
            },
            Ok(CEvent::Resize(w, h)) => {
                trace!(target: "input.event", w, h, "resize");
                Event::Input(InputEvent::Resize(w, h))
            }
            Ok(CEvent::Paste(data)) => {
                trace!(target: "input.event", size_bytes = data.len(), "paste");
                Event::Input(InputEvent::Paste(data))
            }
            Ok(_) => continue,
            Err(err) => {
                warn!(target: "input.thread", ?err, "event_stream_error");
                return ExitReason::StreamError;
            }
        };
        if sender.send(event).await.is_err() {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            return ExitReason::ChannelClosed;
        }
    }
}
