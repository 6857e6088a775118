use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Milliseconds between periodic work saves.
pub const AUTOSAVE_INTERVAL_MS: i64 = 30_000;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum DeskEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait DeskEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<DeskEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<DeskEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // key-up reports only arrive with keyboard enhancement; strikes are presses
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => DeskEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => DeskEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DeskEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DeskEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed event source for tests
pub struct TestEventSource {
    rx: Receiver<DeskEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<DeskEvent>) -> Self {
        Self { rx }
    }
}

impl DeskEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DeskEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// Ticks are due on a fixed schedule, so a steady stream of key events
/// cannot hold them back.
pub struct Runner<E: DeskEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Instant>,
}

impl<E: DeskEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Returns Tick once the tick is due, else blocks until the next event or
    /// the deadline, whichever comes first
    pub fn step(&self) -> DeskEvent {
        let now = Instant::now();
        let deadline = self.next_tick.get();
        if now >= deadline {
            return self.tick(now);
        }

        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                self.tick(Instant::now())
            }
        }
    }

    fn tick(&self, now: Instant) -> DeskEvent {
        self.next_tick.set(now + self.ticker.interval());
        DeskEvent::Tick
    }
}

/// Periodic save schedule, polled from the event loop.
///
/// The typewriter never sees this; the loop asks `poll` on each tick and
/// saves when it says so. After `cancel` nothing is ever due again.
#[derive(Debug, Clone)]
pub struct AutoSave {
    interval_ms: i64,
    last_ms: i64,
    cancelled: bool,
}

impl AutoSave {
    pub fn new(interval_ms: i64, now_ms: i64) -> Self {
        Self {
            interval_ms,
            last_ms: now_ms,
            cancelled: false,
        }
    }

    /// True once per elapsed interval.
    pub fn poll(&mut self, now_ms: i64) -> bool {
        if self.cancelled || now_ms.saturating_sub(self.last_ms) < self.interval_ms {
            return false;
        }
        self.last_ms = now_ms;
        true
    }

    /// A manual save restarts the interval.
    pub fn mark_saved(&mut self, now_ms: i64) {
        self.last_ms = now_ms;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
