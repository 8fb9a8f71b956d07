//! Countdown clock.
//!
//! Owns the repeating one-second tick. The tick is a spawned tokio task that
//! sends [`ClockTick`]s over a channel; the owner awaits
//! [`CountdownClock::next_tick`] and applies each tick to the session state.
//!
//! ## Lifecycle
//!
//! ```text
//! stopped --start()--> running --stop()--> stopped
//! ```
//!
//! Every `start()` opens a new generation. Ticks from an older generation
//! that were already queued when `stop()` ran are dropped by `next_tick`, so
//! at most one decrement stream is ever observed.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed period, stamped with the generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub generation: u64,
}

/// Owned handle to the repeating tick task. Aborts the task on drop.
#[derive(Debug)]
struct Ticker {
    task: JoinHandle<()>,
}

impl Ticker {
    fn spawn(
        runtime: &Handle,
        generation: u64,
        period: Duration,
        tx: mpsc::UnboundedSender<ClockTick>,
    ) -> Self {
        let task = runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(ClockTick { generation }).is_err() {
                    break;
                }
            }
        });
        Self { task }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug)]
pub struct CountdownClock {
    period: Duration,
    running: bool,
    generation: u64,
    ticker: Option<Ticker>,
    tx: mpsc::UnboundedSender<ClockTick>,
    rx: mpsc::UnboundedReceiver<ClockTick>,
}

impl CountdownClock {
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            period,
            running: false,
            generation: 0,
            ticker: None,
            tx,
            rx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the repeating task is alive (false when ticks are driven by
    /// hand because no runtime was available).
    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    /// Begin ticking. Returns `false` if already running.
    ///
    /// Outside a tokio runtime the clock still enters the running state but
    /// no task is spawned; the host must then call the tick handler itself.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.generation += 1;
        match Handle::try_current() {
            Ok(runtime) => {
                self.ticker = Some(Ticker::spawn(
                    &runtime,
                    self.generation,
                    self.period,
                    self.tx.clone(),
                ));
                debug!(generation = self.generation, "clock started");
            }
            Err(_) => {
                warn!("no async runtime; clock ticks must be driven manually");
            }
        }
        true
    }

    /// Cancel the repeating tick. Safe to call when already stopped.
    /// Returns `true` if the clock was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        if self.ticker.take().is_some() {
            debug!(generation = self.generation, "clock stopped");
        }
        was_running
    }

    /// Whether `tick` belongs to the live generation.
    pub fn accepts(&self, tick: ClockTick) -> bool {
        self.running && tick.generation == self.generation
    }

    /// Wait for the next tick of the live generation.
    ///
    /// Pends forever while stopped. Cancel-safe, so it can sit in a
    /// `tokio::select!` next to input handling.
    pub async fn next_tick(&mut self) -> ClockTick {
        loop {
            match self.rx.recv().await {
                Some(tick) if self.accepts(tick) => return tick,
                Some(stale) => {
                    trace!(generation = stale.generation, "dropping stale tick");
                }
                // `self.tx` keeps the channel open.
                None => std::future::pending::<()>().await,
            }
        }
    }
}

impl Default for CountdownClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.stop();
    }
}
