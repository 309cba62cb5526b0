//! Tick scheduler: drives scroll-engine advances at a fixed cadence.
//!
//! A started scheduler spawns one Tokio task that emits `Event::Tick` at
//! the nominal interval. Each tick carries the measured elapsed time since
//! the previous tick (not the nominal interval) so the engine stays correct
//! under scheduling jitter, plus the stream's epoch.
//!
//! Lifecycle contract:
//! * `start` is idempotent: a second start while running is recognized,
//!   logged, and ignored; it never leaks a second tick stream.
//! * `stop` signals the task and awaits its completion. Ticks already
//!   queued in the channel when `stop` returns are stale: `accepts`
//!   rejects any tick whose epoch does not match the running stream, so no
//!   advance happens after `stop`.
//! * The scheduler is restartable; each start opens a new epoch.

use crate::{CHANNEL_SEND_FAILURES, Event, TICKS_EMITTED};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Nominal tick cadence (125 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(8);

/// One scheduler tick: measured elapsed time plus stream epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub dt: Duration,
    pub epoch: u64,
}

struct RunningStream {
    handle: JoinHandle<()>,
    stop: Arc<Notify>,
}

/// Owns the lifecycle of the periodic tick task.
pub struct TickScheduler {
    interval: Duration,
    epoch: u64,
    running: Option<RunningStream>,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            epoch: 0,
            running: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// True when `tick` belongs to the currently running stream. Ticks from
    /// a stopped or superseded stream are stale and must be discarded.
    pub fn accepts(&self, tick: &TickEvent) -> bool {
        self.running.is_some() && tick.epoch == self.epoch
    }

    /// Start the tick stream. Returns false (and does nothing) when already
    /// running.
    pub fn start(&mut self, tx: Sender<Event>) -> bool {
        if self.running.is_some() {
            debug!(target: "sched.tick", epoch = self.epoch, "already_running_start_ignored");
            return false;
        }
        self.epoch += 1;
        let epoch = self.epoch;
        let interval = self.interval;
        let stop = Arc::new(Notify::new());
        let listener = stop.clone();
        let handle = tokio::spawn(async move {
            run_stream(tx, interval, epoch, listener).await;
        });
        self.running = Some(RunningStream { handle, stop });
        true
    }

    /// Stop the tick stream and wait for the task to finish. No tick from
    /// this stream is accepted once `stop` returns. No-op when idle.
    pub async fn stop(&mut self) {
        let Some(stream) = self.running.take() else {
            return;
        };
        stream.stop.notify_one();
        if let Err(err) = stream.handle.await
            && !err.is_cancelled()
        {
            error!(target: "sched.tick", ?err, "tick_task_join_failed");
        }
        debug!(target: "sched.tick", epoch = self.epoch, "stopped");
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

async fn run_stream(tx: Sender<Event>, interval: Duration, epoch: u64, stop: Arc<Notify>) {
    let mut clock = tokio::time::interval(interval);
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; consume it so the
    // first emitted dt measures a real elapsed span.
    clock.tick().await;
    let mut last = Instant::now();
    info!(
        target: "sched.tick",
        epoch,
        interval_ms = interval.as_millis() as u64,
        "tick_stream_started"
    );
    loop {
        tokio::select! {
            biased;
            _ = stop.notified() => break,
            _ = clock.tick() => {
                let now = Instant::now();
                let dt = now - last;
                last = now;
                TICKS_EMITTED.fetch_add(1, Ordering::Relaxed);
                // The send itself stays cancellable so `stop` joins promptly
                // even against a saturated channel.
                let sent = tokio::select! {
                    biased;
                    _ = stop.notified() => break,
                    res = tx.send(Event::Tick(TickEvent { dt, epoch })) => res,
                };
                if sent.is_err() {
                    CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }
        }
    }
    info!(target: "sched.tick", epoch, "tick_stream_stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn tick_interval() -> Duration {
        Duration::from_millis(5)
    }

    async fn collect_ticks(rx: &mut mpsc::Receiver<Event>, window: Duration) -> Vec<TickEvent> {
        let mut out = Vec::new();
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let now = tokio::time::Instant::now();
            if now >= deadline {
                break;
            }
            match tokio::time::timeout(deadline - now, rx.recv()).await {
                Ok(Some(Event::Tick(t))) => out.push(t),
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }
        out
    }

    #[tokio::test]
    async fn ticks_flow_with_measured_dt() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = TickScheduler::new(tick_interval());
        assert!(sched.start(tx));
        let ticks = collect_ticks(&mut rx, Duration::from_millis(60)).await;
        sched.stop().await;
        assert!(!ticks.is_empty(), "expected ticks within the window");
        for t in &ticks {
            assert!(sched_epoch_positive(t));
            assert!(t.dt > Duration::ZERO, "dt must be measured, not zero");
        }
    }

    fn sched_epoch_positive(t: &TickEvent) -> bool {
        t.epoch >= 1
    }

    #[tokio::test]
    async fn double_start_keeps_a_single_stream() {
        let (tx, mut rx) = mpsc::channel(256);
        let mut sched = TickScheduler::new(Duration::from_millis(10));
        assert!(sched.start(tx.clone()));
        assert!(!sched.start(tx), "second start must be ignored");
        let ticks = collect_ticks(&mut rx, Duration::from_millis(100)).await;
        sched.stop().await;
        // A doubled stream would deliver roughly twice the nominal count.
        assert!(
            ticks.len() <= 15,
            "tick count {} suggests more than one stream",
            ticks.len()
        );
        // Every tick belongs to the single opened epoch.
        assert!(ticks.iter().all(|t| t.epoch == ticks[0].epoch));
    }

    #[tokio::test]
    async fn no_tick_is_accepted_after_stop() {
        let (tx, mut rx) = mpsc::channel(256);
        let mut sched = TickScheduler::new(tick_interval());
        sched.start(tx);
        tokio::time::sleep(Duration::from_millis(25)).await;
        sched.stop().await;
        // Whatever is still queued (sent before the stop joined) is stale.
        while let Ok(event) = rx.try_recv() {
            if let Event::Tick(t) = event {
                assert!(!sched.accepts(&t), "stale tick must be rejected");
            }
        }
        // And the task is gone: no new ticks arrive.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err(), "no ticks may arrive after stop");
    }

    #[tokio::test]
    async fn restart_opens_a_new_epoch() {
        let (tx, mut rx) = mpsc::channel(256);
        let mut sched = TickScheduler::new(tick_interval());
        sched.start(tx.clone());
        let first = collect_ticks(&mut rx, Duration::from_millis(30)).await;
        sched.stop().await;
        while rx.try_recv().is_ok() {}

        sched.start(tx);
        let second = collect_ticks(&mut rx, Duration::from_millis(30)).await;
        sched.stop().await;

        assert!(!first.is_empty() && !second.is_empty());
        assert!(second[0].epoch > first[0].epoch);
        assert!(second.iter().all(|t| !sched_stale(&first[0], t)));
    }

    fn sched_stale(old: &TickEvent, new: &TickEvent) -> bool {
        new.epoch == old.epoch
    }

    #[tokio::test]
    async fn stop_when_idle_is_a_noop() {
        let mut sched = TickScheduler::default();
        sched.stop().await;
        assert!(!sched.is_running());
    }

    #[tokio::test]
    async fn task_exits_when_channel_closes() {
        let (tx, rx) = mpsc::channel(4);
        let mut sched = TickScheduler::new(tick_interval());
        sched.start(tx);
        drop(rx);
        // Give the task time to observe the closed channel, then stop()
        // must join promptly.
        tokio::time::sleep(Duration::from_millis(30)).await;
        sched.stop().await;
        assert!(!sched.is_running());
    }
}
