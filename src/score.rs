use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Serialize;

use crate::session::{Counters, Outcome, ResponseEntry, SessionState};
use crate::stimulus::{StimulusIdentity, StimulusPool, Variant};

/// Final, immutable result of one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    #[serde(rename = "game_type")]
    pub variant: Variant,
    #[serde(flatten)]
    pub counters: Counters,
    #[serde(rename = "response_times")]
    pub response_log: Vec<ResponseEntry>,
    pub score: f64,
    pub feedback: String,
    pub finished_at: DateTime<Local>,
}

/// Per-identity slice of the response log
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityBreakdown {
    pub identity: StimulusIdentity,
    pub shown: usize,
    pub tapped: usize,
    pub mean_elapsed_ms: f64,
}

/// Sum of non-bad elapsed times divided by the number of ALL entries.
///
/// The divisor counts bad entries too.
pub fn calculate_score(response_log: &[ResponseEntry], pool: &StimulusPool) -> f64 {
    if response_log.is_empty() {
        return 0.0;
    }

    let total: f64 = response_log
        .iter()
        .filter(|entry| !pool.is_bad(&entry.identity))
        .map(|entry| entry.elapsed_ms as f64)
        .sum();

    total / response_log.len() as f64
}

pub fn feedback(score: f64) -> String {
    format!("Your score for this game was: {score:?}")
}

/// Builds the summary from a finished session
pub fn summarize(state: &SessionState, pool: &StimulusPool, variant: Variant) -> ResultSummary {
    let score = calculate_score(&state.response_log, pool);
    ResultSummary {
        variant,
        counters: state.counters,
        response_log: state.response_log.clone(),
        score,
        feedback: feedback(score),
        finished_at: Local::now(),
    }
}

fn percent(part: u32, whole: u32) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * 100.0)
}

fn mean(data: &[f64]) -> Option<f64> {
    (!data.is_empty()).then(|| data.iter().sum::<f64>() / data.len() as f64)
}

fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|v| (m - v) * (m - v)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

impl ResultSummary {
    /// Share of bad items that were tapped anyway
    pub fn inhibition_percent(&self) -> Option<f64> {
        let c = &self.counters;
        percent(c.bad_hits, c.bad_hits + c.bad_skips)
    }

    /// Share of good items that were tapped
    pub fn hit_rate_percent(&self) -> Option<f64> {
        let c = &self.counters;
        percent(c.good_hits, c.good_hits + c.good_misses)
    }

    fn good_hit_times(&self) -> Vec<f64> {
        self.response_log
            .iter()
            .filter(|e| e.outcome == Outcome::GoodHit)
            .map(|e| e.elapsed_ms as f64)
            .collect()
    }

    pub fn mean_hit_reaction_ms(&self) -> Option<f64> {
        mean(&self.good_hit_times())
    }

    pub fn hit_reaction_std_dev_ms(&self) -> Option<f64> {
        std_dev(&self.good_hit_times())
    }

    /// Count, taps and mean elapsed time per identity, sorted by identity
    pub fn breakdown(&self) -> Vec<IdentityBreakdown> {
        self.response_log
            .iter()
            .into_group_map_by(|e| e.identity)
            .into_iter()
            .sorted_by_key(|(identity, _)| *identity)
            .map(|(identity, entries)| {
                let times: Vec<f64> = entries.iter().map(|e| e.elapsed_ms as f64).collect();
                IdentityBreakdown {
                    identity,
                    shown: entries.len(),
                    tapped: entries.iter().filter(|e| e.outcome.was_tapped()).count(),
                    mean_elapsed_ms: mean(&times).unwrap_or(0.0),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::BAD_FREQUENCY;

    fn entry(c: char, elapsed_ms: u64, outcome: Outcome) -> ResponseEntry {
        ResponseEntry {
            identity: StimulusIdentity::Letter(c),
            elapsed_ms,
            outcome,
        }
    }

    fn letters() -> StimulusPool {
        StimulusPool::for_variant(Variant::Letter, BAD_FREQUENCY)
    }

    fn summary_of(log: Vec<ResponseEntry>) -> ResultSummary {
        let mut state = SessionState::new();
        for e in &log {
            state.counters.record(e.outcome);
        }
        state.response_log = log;
        summarize(&state, &letters(), Variant::Letter)
    }

    #[test]
    fn test_score_excludes_bad_from_sum_but_not_divisor() {
        let log = vec![
            entry('X', 300, Outcome::BadHit),
            entry('B', 100, Outcome::GoodHit),
            entry('C', 200, Outcome::GoodHit),
        ];
        assert_eq!(calculate_score(&log, &letters()), 100.0);
    }

    #[test]
    fn test_score_of_empty_log_is_zero() {
        assert_eq!(calculate_score(&[], &letters()), 0.0);
    }

    #[test]
    fn test_score_of_only_bad_entries_is_zero() {
        let log = vec![entry('X', 1000, Outcome::BadSkip), entry('X', 50, Outcome::BadHit)];
        assert_eq!(calculate_score(&log, &letters()), 0.0);
    }

    #[test]
    fn test_image_score_excludes_aubergine() {
        let pool = StimulusPool::for_variant(Variant::Image, BAD_FREQUENCY);
        let log = vec![
            ResponseEntry {
                identity: StimulusIdentity::Image("aubergine"),
                elapsed_ms: 900,
                outcome: Outcome::BadSkip,
            },
            ResponseEntry {
                identity: StimulusIdentity::Image("fez"),
                elapsed_ms: 400,
                outcome: Outcome::GoodHit,
            },
        ];
        assert_eq!(calculate_score(&log, &pool), 200.0);
    }

    #[test]
    fn test_summary_carries_counters_and_log() {
        let summary = summary_of(vec![
            entry('X', 300, Outcome::BadHit),
            entry('B', 100, Outcome::GoodHit),
            entry('C', 200, Outcome::GoodHit),
        ]);

        assert_eq!(summary.counters.good_hits, 2);
        assert_eq!(summary.counters.bad_hits, 1);
        assert_eq!(summary.response_log.len(), 3);
        assert_eq!(summary.score, 100.0);
        assert_eq!(summary.feedback, "Your score for this game was: 100.0");
    }

    #[test]
    fn test_feedback_keeps_full_precision() {
        assert_eq!(feedback(1000.0 / 3.0), "Your score for this game was: 333.3333333333333");
        assert_eq!(feedback(0.0), "Your score for this game was: 0.0");
    }

    #[test]
    fn test_inhibition_and_hit_rate() {
        let summary = summary_of(vec![
            entry('X', 300, Outcome::BadHit),
            entry('X', 1000, Outcome::BadSkip),
            entry('X', 1000, Outcome::BadSkip),
            entry('X', 1000, Outcome::BadSkip),
            entry('B', 100, Outcome::GoodHit),
            entry('C', 1000, Outcome::GoodMiss),
        ]);

        assert_eq!(summary.inhibition_percent(), Some(25.0));
        assert_eq!(summary.hit_rate_percent(), Some(50.0));
    }

    #[test]
    fn test_rates_are_none_without_items() {
        let summary = summary_of(vec![]);
        assert_eq!(summary.inhibition_percent(), None);
        assert_eq!(summary.hit_rate_percent(), None);
        assert_eq!(summary.mean_hit_reaction_ms(), None);
        assert_eq!(summary.hit_reaction_std_dev_ms(), None);
        assert_eq!(summary.score, 0.0);
    }

    #[test]
    fn test_hit_reaction_stats_only_use_good_hits() {
        let summary = summary_of(vec![
            entry('B', 200, Outcome::GoodHit),
            entry('C', 400, Outcome::GoodHit),
            entry('D', 1000, Outcome::GoodMiss),
            entry('X', 50, Outcome::BadHit),
        ]);

        assert_eq!(summary.mean_hit_reaction_ms(), Some(300.0));
        assert_eq!(summary.hit_reaction_std_dev_ms(), Some(100.0));
    }

    #[test]
    fn test_breakdown_groups_by_identity() {
        let summary = summary_of(vec![
            entry('C', 200, Outcome::GoodHit),
            entry('B', 100, Outcome::GoodHit),
            entry('C', 1000, Outcome::GoodMiss),
        ]);

        let breakdown = summary.breakdown();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].identity, StimulusIdentity::Letter('B'));
        assert_eq!(breakdown[0].shown, 1);
        assert_eq!(breakdown[1].identity, StimulusIdentity::Letter('C'));
        assert_eq!(breakdown[1].shown, 2);
        assert_eq!(breakdown[1].tapped, 1);
        assert_eq!(breakdown[1].mean_elapsed_ms, 600.0);
    }

    #[test]
    fn test_summary_json_keys() {
        let summary = summary_of(vec![entry('B', 120, Outcome::GoodHit)]);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["game_type"], "letter");
        assert_eq!(json["good_char_hits"], 1);
        assert_eq!(json["bad_char_hits"], 0);
        assert_eq!(json["good_char_misses"], 0);
        assert_eq!(json["bad_char_skips"], 0);
        assert_eq!(json["repeat_taps"], 0);
        assert_eq!(json["response_times"], serde_json::json!([{ "B": 120 }]));
        assert_eq!(json["score"], 120.0);
        assert!(json["feedback"].as_str().unwrap().ends_with("was: 120.0"));
    }
}
