use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::engine::GameEngine;
use crate::store::KeyValueStore;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum DrillEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// The event source hung up; nothing more will arrive.
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait DrillEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<DrillEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(DrillEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(DrillEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
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

impl DrillEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
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

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<DrillEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<DrillEvent>) -> Self {
        Self { rx }
    }
}

impl DrillEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Source of game time, read once per runner step.
pub trait GameClock {
    /// Whole milliseconds of game time since the previous lap.
    fn lap_ms(&mut self) -> u64;
}

/// Turns wall-clock time into whole milliseconds of game time. Sub-millisecond
/// leftovers carry over to the next lap so no time is lost.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    last: Instant,
    carry: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            carry: Duration::ZERO,
        }
    }

    fn lap_at(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last) + self.carry;
        self.last = now;
        let whole_ms = elapsed.as_millis() as u64;
        self.carry = elapsed - Duration::from_millis(whole_ms);
        whole_ms
    }
}

impl GameClock for Stopwatch {
    fn lap_ms(&mut self) -> u64 {
        self.lap_at(Instant::now())
    }
}

/// Same amount of game time on every lap, whatever the wall clock says.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    step_ms: u64,
}

impl FixedClock {
    pub fn new(step_ms: u64) -> Self {
        Self { step_ms }
    }
}

impl GameClock for FixedClock {
    fn lap_ms(&mut self) -> u64 {
        self.step_ms
    }
}

/// What one runner step produced: the event plus the game time that passed
/// while waiting for it.
#[derive(Clone, Debug)]
pub struct Step {
    pub event: DrillEvent,
    pub elapsed_ms: u64,
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: DrillEventSource, T: Ticker, C: GameClock = Stopwatch> {
    event_source: E,
    ticker: T,
    clock: C,
}

impl<E: DrillEventSource, T: Ticker> Runner<E, T> {
    /// Runner on the wall clock.
    pub fn new(event_source: E, ticker: T) -> Self {
        Self::with_clock(event_source, ticker, Stopwatch::new())
    }
}

impl<E: DrillEventSource, T: Ticker, C: GameClock> Runner<E, T, C> {
    pub fn with_clock(event_source: E, ticker: T, clock: C) -> Self {
        Self {
            event_source,
            ticker,
            clock,
        }
    }

    /// Blocks up to tick interval for the next event (Tick on timeout, Closed
    /// once the source is gone) and laps the clock.
    pub fn step(&mut self) -> Step {
        let event = match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => DrillEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => DrillEvent::Closed,
        };
        Step {
            event,
            elapsed_ms: self.clock.lap_ms(),
        }
    }

    /// Like [`Runner::step`], but first runs `engine` forward by the elapsed
    /// time. A countdown that ran out while waiting has already ended the
    /// round when the caller sees the event.
    pub fn step_engine<S: KeyValueStore>(&mut self, engine: &mut GameEngine<S>) -> DrillEvent {
        let Step { event, elapsed_ms } = self.step();
        engine.advance(elapsed_ms);
        event
    }
}
