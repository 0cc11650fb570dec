use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind};
use rand::Rng;

use crate::error::{GameError, RunError};
use crate::game::{Game, Presenter};
use crate::score::ResultSummary;
use crate::timer::Clock;

/// Longest the loop sleeps when no timer is pending
const IDLE_WAIT_MS: u64 = 100;

/// Input events the core cares about
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A tap, stamped with the clock time it was read from the terminal
    Tap { at_ms: u64 },
    Abandon,
    Resize,
}

impl GameEvent {
    /// Esc and Backspace go back; characters and Enter tap
    pub fn from_key(key: KeyEvent, now_ms: u64) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => Some(GameEvent::Abandon),
            KeyCode::Char(_) | KeyCode::Enter => Some(GameEvent::Tap { at_ms: now_ms }),
            _ => None,
        }
    }
}

/// Source of user input events
pub trait InputSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production input source using crossterm
pub struct CrosstermInputSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermInputSource {
    /// `clock` stamps taps; pass the one the `Runner` uses so times line up
    pub fn new<C: Clock + Send + 'static>(clock: C) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => GameEvent::from_key(key, clock.now_ms()),
                Ok(CtEvent::Resize(_, _)) => Some(GameEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };
            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl InputSource for CrosstermInputSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed input source for tests
pub struct TestInputSource {
    rx: Receiver<GameEvent>,
}

impl TestInputSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl InputSource for TestInputSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// What one step of the loop produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Input(GameEvent),
    Timeout,
    /// The input source has gone away; the wait was slept out instead
    Disconnected,
}

/// Waits for input, but never past the next timer deadline
pub struct Runner<I: InputSource, C: Clock> {
    input: I,
    clock: C,
}

impl<I: InputSource, C: Clock> Runner<I, C> {
    pub fn new(input: I, clock: C) -> Self {
        Self { input, clock }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Blocks until an input event arrives or `deadline_ms` passes
    pub fn step(&self, deadline_ms: Option<u64>) -> Step {
        let now = self.clock.now_ms();
        let wait = deadline_ms
            .map(|d| d.saturating_sub(now))
            .unwrap_or(IDLE_WAIT_MS)
            .min(IDLE_WAIT_MS);

        let wait = Duration::from_millis(wait);
        match self.input.recv_timeout(wait) {
            Ok(ev) => Step::Input(ev),
            Err(RecvTimeoutError::Timeout) => Step::Timeout,
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(wait);
                Step::Disconnected
            }
        }
    }

    /// Waits for any tap or abandon, e.g. to dismiss a screen.
    /// Lost input counts as abandon.
    pub fn wait_for_key(&self) -> GameEvent {
        loop {
            match self.step(None) {
                Step::Input(ev @ (GameEvent::Tap { .. } | GameEvent::Abandon)) => return ev,
                Step::Disconnected => return GameEvent::Abandon,
                _ => {}
            }
        }
    }
}

/// Drives a started game until it ends, serializing timers and input on this thread
pub fn run_session<R, I, C, P>(
    game: &mut Game<R>,
    runner: &Runner<I, C>,
    presenter: &mut P,
) -> Result<ResultSummary, RunError>
where
    R: Rng,
    I: InputSource,
    C: Clock,
    P: Presenter + ?Sized,
{
    presenter.flush()?;

    while !game.is_finished() {
        let step = runner.step(game.next_deadline());

        // A tap belongs to whatever was pending when it was read, even if
        // later deadlines have passed since.
        if let Step::Input(GameEvent::Tap { at_ms }) = step {
            game.fire_due(at_ms, presenter)?;
            game.report_tap(at_ms);
        }

        let now = runner.now_ms();
        game.fire_due(now, presenter)?;

        if let Step::Input(GameEvent::Abandon) = step {
            game.abandon(now, presenter)?;
        }
        presenter.flush()?;
    }

    game.summary()
        .cloned()
        .ok_or(GameError::InvariantViolation("finished without summary"))
        .map_err(RunError::from)
}
