use std::time::Duration;

use riskdash_core::ScopeId;
use riskdash_logging::{rd_debug, rd_info};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// One firing of the polling timer, tagged with the scope that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeTick {
    pub scope: ScopeId,
}

pub type TickReceiver = mpsc::Receiver<ScopeTick>;

struct RunningTimer {
    scope: ScopeId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the single polling timer of a mounted dashboard.
///
/// At most one timer runs at a time. The timer only emits ticks; whoever holds the
/// [`TickReceiver`] decides what a tick does. At most one tick waits in the channel, so a
/// receiver that falls behind sees the next tick rather than a burst.
pub struct PollingScheduler {
    period: Duration,
    tick_tx: mpsc::Sender<ScopeTick>,
    running: Option<RunningTimer>,
}

impl PollingScheduler {
    pub fn new(period: Duration) -> (Self, TickReceiver) {
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let scheduler = Self {
            period,
            tick_tx,
            running: None,
        };
        (scheduler, tick_rx)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts the timer for `scope` unless it is already running for it.
    ///
    /// A timer left over from another scope is cancelled first. Returns whether a new timer
    /// was spawned. Must be called from within a tokio runtime.
    pub fn ensure_running(&mut self, scope: ScopeId) -> bool {
        if let Some(running) = &self.running {
            if running.scope == scope && !running.handle.is_finished() {
                return false;
            }
            self.stop();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer(
            scope,
            self.period,
            self.tick_tx.clone(),
            cancel.clone(),
        ));
        rd_info!("Polling started for {} every {:?}", scope, self.period);
        self.running = Some(RunningTimer {
            scope,
            cancel,
            handle,
        });
        true
    }

    /// Cancels the running timer. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.running.take() {
            Some(running) => {
                running.cancel.cancel();
                rd_info!("Polling stopped for {}", running.scope);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn running_scope(&self) -> Option<ScopeId> {
        self.running.as_ref().map(|running| running.scope)
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(
    scope: ScopeId,
    period: Duration,
    tick_tx: mpsc::Sender<ScopeTick>,
    cancel: CancellationToken,
) {
    // First tick one full period after start.
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                match tick_tx.try_send(ScopeTick { scope }) {
                    Ok(()) => rd_debug!("Tick for {}", scope),
                    Err(TrySendError::Full(_)) => {
                        rd_debug!("Tick for {} dropped; previous tick not handled yet", scope);
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        }
    }
}
