use super::Action;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Poll,
    Countdown,
    OverlayCheck,
    PromptCountdown,
    LoadDelay,
}

/// One background task per timer kind, each feeding the action channel.
///
/// Starting a kind that is already running replaces it. Dropping `Timers`
/// aborts everything, so no task outlives the page it was started for.
pub struct Timers {
    tx: mpsc::UnboundedSender<Action>,
    handles: HashMap<TimerKind, JoinHandle<()>>,
}

impl Timers {
    pub fn new(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            tx,
            handles: HashMap::new(),
        }
    }

    /// Send `action` every `period`, first one after a full period
    pub fn start_interval(&mut self, kind: TimerKind, period: Duration, action: Action) {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(action.clone()).is_err() {
                    break;
                }
            }
        });
        self.replace(kind, handle);
    }

    /// Send `action` once after `delay`
    pub fn start_timeout(&mut self, kind: TimerKind, delay: Duration, action: Action) {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(action);
        });
        self.replace(kind, handle);
    }

    fn replace(&mut self, kind: TimerKind, handle: JoinHandle<()>) {
        if let Some(old) = self.handles.insert(kind, handle) {
            old.abort();
        }
        debug!(?kind, "timer started");
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.handles.remove(&kind) {
            Some(handle) => {
                handle.abort();
                debug!(?kind, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.handles
            .get(&kind)
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    pub fn active(&self) -> usize {
        self.handles.values().filter(|h| !h.is_finished()).count()
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
