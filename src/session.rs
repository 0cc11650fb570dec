use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::stimulus::StimulusIdentity;

/// How a presented item was resolved
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    GoodHit,
    BadHit,
    GoodMiss,
    BadSkip,
}

impl Outcome {
    pub fn was_tapped(&self) -> bool {
        matches!(self, Outcome::GoodHit | Outcome::BadHit)
    }
}

/// One resolved presentation: which item and how long until it was tapped or superseded
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResponseEntry {
    pub identity: StimulusIdentity,
    pub elapsed_ms: u64,
    pub outcome: Outcome,
}

// Serialized as `{"<identity>": elapsed_ms}` so the log reads like the results screen.
impl Serialize for ResponseEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.identity, &self.elapsed_ms)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    #[serde(rename = "good_char_hits")]
    pub good_hits: u32,
    #[serde(rename = "bad_char_hits")]
    pub bad_hits: u32,
    #[serde(rename = "good_char_misses")]
    pub good_misses: u32,
    #[serde(rename = "bad_char_skips")]
    pub bad_skips: u32,
    pub repeat_taps: u32,
}

impl Counters {
    /// Presentations resolved by a tap or a timeout
    pub fn resolved(&self) -> u32 {
        self.good_hits + self.bad_hits + self.good_misses + self.bad_skips
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::GoodHit => self.good_hits += 1,
            Outcome::BadHit => self.bad_hits += 1,
            Outcome::GoodMiss => self.good_misses += 1,
            Outcome::BadSkip => self.bad_skips += 1,
        }
    }
}

/// Mutable state of one game session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub current_item: Option<StimulusIdentity>,
    /// Monotonic ms at which `current_item` became visible
    pub displayed_at_ms: u64,
    pub awaiting_response: bool,
    pub round_index: usize,
    pub items_shown_in_round: usize,
    pub counters: Counters,
    pub response_log: Vec<ResponseEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tap right now would be attributed to the current item
    pub fn is_attributable(&self) -> bool {
        self.current_item.is_some() && self.awaiting_response
    }

    pub(crate) fn show(&mut self, identity: StimulusIdentity, now_ms: u64) {
        self.current_item = Some(identity);
        self.displayed_at_ms = now_ms;
        self.awaiting_response = true;
    }
}
