use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::classifier::{self, TapOutcome};
use crate::config::GameSettings;
use crate::error::GameError;
use crate::score::{summarize, ResultSummary};
use crate::session::SessionState;
use crate::stimulus::{StimulusIdentity, StimulusPool};
use crate::timer::{TimerKind, TimerQueue};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// Waiting out the first delay
    Armed,
    Showing,
    Hidden,
    Ended,
}

/// Receives what the core wants rendered
pub trait Presenter {
    fn on_item_shown(&mut self, identity: StimulusIdentity);
    fn on_item_hidden(&mut self);
    fn on_session_ended(&mut self, summary: &ResultSummary);
    /// Called by the runtime after each batch of changes
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Shown(StimulusIdentity),
    Hidden,
    Ended(Box<ResultSummary>),
}

/// Presenter that just remembers what it was told
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<PresenterEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<StimulusIdentity> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Shown(identity) => Some(*identity),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn on_item_shown(&mut self, identity: StimulusIdentity) {
        self.events.push(PresenterEvent::Shown(identity));
    }

    fn on_item_hidden(&mut self) {
        self.events.push(PresenterEvent::Hidden);
    }

    fn on_session_ended(&mut self, summary: &ResultSummary) {
        self.events
            .push(PresenterEvent::Ended(Box::new(summary.clone())));
    }
}

/// A single go/no-go session: timer-driven scheduler plus its state
#[derive(Debug)]
pub struct Game<R = ChaCha8Rng> {
    settings: GameSettings,
    pool: StimulusPool,
    state: SessionState,
    phase: Phase,
    timers: TimerQueue,
    rng: R,
    summary: Option<ResultSummary>,
}

impl Game<ChaCha8Rng> {
    /// Seeded sessions are reproducible; unseeded ones draw from entropy
    pub fn new(settings: GameSettings, seed: Option<u64>) -> Result<Self, GameError> {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(settings, rng)
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(settings: GameSettings, rng: R) -> Result<Self, GameError> {
        settings.validate()?;
        Ok(Self {
            pool: StimulusPool::for_variant(settings.variant, settings.bad_frequency),
            settings,
            state: SessionState::new(),
            phase: Phase::NotStarted,
            timers: TimerQueue::new(),
            rng,
            summary: None,
        })
    }

    /// Arms the first-delay timer
    pub fn start(&mut self, now_ms: u64) -> Result<(), GameError> {
        if self.phase != Phase::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        self.timers
            .schedule(now_ms + self.settings.first_delay_ms, TimerKind::Present);
        self.phase = Phase::Armed;
        info!(variant = %self.settings.variant, "session started");
        Ok(())
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Runs every timer due at `now_ms`, each at its own scheduled time.
    /// Returns how many fired.
    pub fn fire_due<P: Presenter + ?Sized>(
        &mut self,
        now_ms: u64,
        presenter: &mut P,
    ) -> Result<usize, GameError> {
        let mut fired = 0;
        while let Some((at, kind)) = self.timers.pop_due(now_ms) {
            if self.phase == Phase::Ended {
                return Err(GameError::InvariantViolation(
                    "timer fired after the session ended",
                ));
            }
            match kind {
                TimerKind::Present => self.present_next(at, presenter)?,
                TimerKind::Hide => self.hide(presenter),
                TimerKind::End => self.end_session(at, presenter),
            }
            fired += 1;
        }
        Ok(fired)
    }

    fn present_next<P: Presenter + ?Sized>(
        &mut self,
        at: u64,
        presenter: &mut P,
    ) -> Result<(), GameError> {
        classifier::resolve_pending_item(&mut self.state, &self.pool, at);

        let schedule = &self.settings.schedule;
        let active = schedule
            .get(self.state.round_index)
            .ok_or(GameError::InvariantViolation("round index outside the schedule"))?;

        if self.state.items_shown_in_round >= active.item_count {
            if self.state.round_index >= schedule.last_index() {
                return Err(GameError::InvariantViolation(
                    "advanced past the final round",
                ));
            }
            self.state.round_index += 1;
            self.state.items_shown_in_round = 1;
            info!(round = self.state.round_index, "round advanced");
        } else {
            self.state.items_shown_in_round += 1;
        }

        let round = self.state.round_index;
        let item = self.state.items_shown_in_round;
        let delay_ms = schedule
            .get(round)
            .map(|r| r.inter_item_delay_ms)
            .ok_or(GameError::InvariantViolation("round index outside the schedule"))?;
        let next = if schedule.is_final_item(round, item) {
            TimerKind::End
        } else {
            TimerKind::Present
        };

        let identity = self.pool.draw(&mut self.rng);
        self.state.show(identity, at);
        self.phase = Phase::Showing;
        debug!(%identity, round, item, "item shown");
        presenter.on_item_shown(identity);

        self.timers
            .schedule(at + self.settings.visible_ms, TimerKind::Hide);
        self.timers.schedule(at + delay_ms, next);
        Ok(())
    }

    fn hide<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        self.phase = Phase::Hidden;
        presenter.on_item_hidden();
    }

    fn end_session<P: Presenter + ?Sized>(&mut self, at: u64, presenter: &mut P) {
        classifier::resolve_pending_item(&mut self.state, &self.pool, at);
        self.timers.cancel_all();

        let summary = summarize(&self.state, &self.pool, self.settings.variant);
        self.phase = Phase::Ended;
        info!(
            score = summary.score,
            items = summary.response_log.len(),
            repeat_taps = summary.counters.repeat_taps,
            "session ended"
        );
        presenter.on_session_ended(&summary);
        self.summary = Some(summary);
    }

    /// Counts a tap made at `now_ms` against whatever is currently awaiting a response
    pub fn report_tap(&mut self, now_ms: u64) -> TapOutcome {
        if self.phase == Phase::Ended {
            return TapOutcome::Ignored;
        }
        let outcome = classifier::on_tap(&mut self.state, &self.pool, now_ms);
        debug!(?outcome, "tap");
        outcome
    }

    /// Cancels every pending timer and ends the session with what was collected so far
    pub fn abandon<P: Presenter + ?Sized>(
        &mut self,
        now_ms: u64,
        presenter: &mut P,
    ) -> Result<&ResultSummary, GameError> {
        if self.phase != Phase::Ended {
            warn!(
                items = self.state.response_log.len(),
                "session abandoned"
            );
            self.timers.cancel_all();
            self.end_session(now_ms, presenter);
        }
        self.summary
            .as_ref()
            .ok_or(GameError::InvariantViolation("ended session has no summary"))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn pool(&self) -> &StimulusPool {
        &self.pool
    }

    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }

    /// The item the presenter should be drawing right now
    pub fn visible_item(&self) -> Option<StimulusIdentity> {
        match self.phase {
            Phase::Showing => self.state.current_item,
            _ => None,
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
