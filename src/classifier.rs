use crate::session::{Outcome, ResponseEntry, SessionState};
use crate::stimulus::StimulusPool;

/// What a single tap was counted as
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Hit(Outcome),
    Repeat,
    /// The session is over; the tap was not counted
    Ignored,
}

fn resolve(
    state: &mut SessionState,
    pool: &StimulusPool,
    now_ms: u64,
    tapped: bool,
) -> Option<Outcome> {
    let identity = state.current_item.filter(|_| state.awaiting_response)?;

    let is_bad = pool.is_bad(&identity);
    let outcome = match (tapped, is_bad) {
        (true, true) => Outcome::BadHit,
        (true, false) => Outcome::GoodHit,
        (false, true) => Outcome::BadSkip,
        (false, false) => Outcome::GoodMiss,
    };

    state.response_log.push(ResponseEntry {
        identity,
        elapsed_ms: now_ms.saturating_sub(state.displayed_at_ms),
        outcome,
    });
    state.counters.record(outcome);
    state.awaiting_response = false;

    Some(outcome)
}

/// Attributes a tap to the current item, or counts it as a repeat tap
pub fn on_tap(state: &mut SessionState, pool: &StimulusPool, now_ms: u64) -> TapOutcome {
    match resolve(state, pool, now_ms, true) {
        Some(outcome) => TapOutcome::Hit(outcome),
        None => {
            state.counters.repeat_taps += 1;
            TapOutcome::Repeat
        }
    }
}

/// Scores an item nobody tapped as a miss (good) or a skip (bad); no-op when nothing is pending
pub fn resolve_pending_item(
    state: &mut SessionState,
    pool: &StimulusPool,
    now_ms: u64,
) -> Option<Outcome> {
    resolve(state, pool, now_ms, false)
}
