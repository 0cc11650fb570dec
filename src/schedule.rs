use serde::{Deserialize, Serialize};

/// Delay between session start and the first item
pub const FIRST_DELAY_MS: u64 = 2000;
/// How long an item stays visible
pub const VISIBLE_MS: u64 = 500;
/// Items per round in the reference schedule
pub const ITEMS_PER_ROUND: usize = 30;

/// One block of items sharing an inter-item delay
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSpec {
    pub item_count: usize,
    pub inter_item_delay_ms: u64,
}

impl RoundSpec {
    pub fn new(item_count: usize, inter_item_delay_ms: u64) -> Self {
        Self {
            item_count,
            inter_item_delay_ms,
        }
    }
}

/// Ordered rounds, consumed front to back exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundSchedule {
    rounds: Vec<RoundSpec>,
}

impl Default for RoundSchedule {
    fn default() -> Self {
        Self::new(vec![
            RoundSpec::new(ITEMS_PER_ROUND, 1000),
            RoundSpec::new(ITEMS_PER_ROUND, 2000),
        ])
    }
}

impl RoundSchedule {
    pub fn new(rounds: Vec<RoundSpec>) -> Self {
        Self { rounds }
    }

    pub fn get(&self, round_index: usize) -> Option<&RoundSpec> {
        self.rounds.get(round_index)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.rounds.len().saturating_sub(1)
    }

    pub fn rounds(&self) -> &[RoundSpec] {
        &self.rounds
    }

    pub fn total_items(&self) -> usize {
        self.rounds.iter().map(|r| r.item_count).sum()
    }

    /// True when `items_shown` items of round `round_index` exhaust the whole schedule
    pub fn is_final_item(&self, round_index: usize, items_shown: usize) -> bool {
        round_index == self.last_index()
            && self
                .rounds
                .last()
                .is_some_and(|last| items_shown == last.item_count)
    }
}
