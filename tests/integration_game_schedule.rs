// Drives the reference schedule through the public Game API, stepping time
// by hand from one deadline to the next.

use assert_matches::assert_matches;
use rand::rngs::mock::StepRng;

use focustap::classifier::TapOutcome;
use focustap::game::{PresenterEvent, RecordingPresenter};
use focustap::session::Outcome;
use focustap::stimulus::StimulusIdentity;
use focustap::{Game, GameSettings, Phase, Variant};

// Every item is the bad one.
fn always_bad() -> StepRng {
    StepRng::new(0, 0)
}

// Every item is a good one.
fn always_good() -> StepRng {
    StepRng::new(1 << 63, 0)
}

/// Fires timers deadline by deadline until `until_ms`, checking the counters stay in step with the log.
fn run_until<R: rand::Rng>(game: &mut Game<R>, presenter: &mut RecordingPresenter, until_ms: u64) {
    while let Some(deadline) = game.next_deadline() {
        if deadline > until_ms {
            break;
        }
        game.fire_due(deadline, presenter).unwrap();
        let state = game.state();
        assert_eq!(state.counters.resolved() as usize, state.response_log.len());
    }
}

#[test]
fn untouched_reference_session_resolves_all_sixty_items() {
    let mut game = Game::new(GameSettings::default(), Some(11)).unwrap();
    let mut presenter = RecordingPresenter::new();
    game.start(0).unwrap();

    run_until(&mut game, &mut presenter, u64::MAX);

    let summary = game.summary().unwrap();
    assert_eq!(summary.response_log.len(), 60);
    assert_eq!(summary.counters.good_misses + summary.counters.bad_skips, 60);
    assert_eq!(summary.counters.repeat_taps, 0);
    assert_eq!(presenter.shown().len(), 60);
    assert_matches!(presenter.events.last(), Some(PresenterEvent::Ended(_)));
    assert_eq!(game.phase(), Phase::Ended);
}

#[test]
fn reference_session_ends_after_the_last_second_round_delay() {
    let mut game = Game::with_rng(GameSettings::default(), always_good()).unwrap();
    let mut presenter = RecordingPresenter::new();
    game.start(0).unwrap();

    run_until(&mut game, &mut presenter, 91_999);
    assert!(!game.is_finished());
    assert_eq!(presenter.shown().len(), 60);

    run_until(&mut game, &mut presenter, 92_000);
    assert!(game.is_finished());
}

#[test]
fn second_round_starts_after_thirtieth_item_with_longer_delay() {
    let mut game = Game::with_rng(GameSettings::default(), always_good()).unwrap();
    let mut presenter = RecordingPresenter::new();
    game.start(0).unwrap();

    // 30th item of round one goes up at 31000.
    run_until(&mut game, &mut presenter, 31_000);
    assert_eq!(game.state().round_index, 0);
    assert_eq!(game.state().items_shown_in_round, 30);
    assert_eq!(game.next_deadline(), Some(31_500));

    run_until(&mut game, &mut presenter, 32_000);
    assert_eq!(game.state().round_index, 1);
    assert_eq!(game.state().items_shown_in_round, 1);

    // hide at 32500, then the next item 2000ms later
    run_until(&mut game, &mut presenter, 32_500);
    assert_eq!(game.next_deadline(), Some(34_000));
}

#[test]
fn tapping_a_bad_item_counts_a_bad_hit() {
    let mut game = Game::with_rng(GameSettings::default(), always_bad()).unwrap();
    let mut presenter = RecordingPresenter::new();
    game.start(0).unwrap();

    run_until(&mut game, &mut presenter, 2_000);
    assert_eq!(game.visible_item(), Some(StimulusIdentity::Letter('X')));

    assert_eq!(game.report_tap(2_250), TapOutcome::Hit(Outcome::BadHit));
    assert_eq!(game.report_tap(2_300), TapOutcome::Repeat);

    run_until(&mut game, &mut presenter, u64::MAX);
    let summary = game.summary().unwrap();
    assert_eq!(summary.counters.bad_hits, 1);
    assert_eq!(summary.counters.bad_skips, 59);
    assert_eq!(summary.counters.repeat_taps, 1);
    // bad items never contribute to the score
    assert_eq!(summary.score, 0.0);
}

#[test]
fn tapping_good_items_scores_their_reaction_times() {
    let mut game = Game::with_rng(GameSettings::default(), always_good()).unwrap();
    let mut presenter = RecordingPresenter::new();
    game.start(0).unwrap();

    run_until(&mut game, &mut presenter, 2_000);
    assert_matches!(game.report_tap(2_300), TapOutcome::Hit(Outcome::GoodHit));

    // a tap after hiding still counts for the pending item
    run_until(&mut game, &mut presenter, 3_000);
    run_until(&mut game, &mut presenter, 3_600);
    assert_eq!(game.phase(), Phase::Hidden);
    assert_matches!(game.report_tap(3_700), TapOutcome::Hit(Outcome::GoodHit));

    let summary = game.abandon(3_800, &mut presenter).unwrap();
    assert_eq!(summary.response_log.len(), 2);
    assert_eq!(summary.response_log[0].elapsed_ms, 300);
    assert_eq!(summary.response_log[1].elapsed_ms, 700);
    assert_eq!(summary.score, 500.0);
    assert_eq!(summary.feedback, "Your score for this game was: 500.0");
}

#[test]
fn image_sessions_show_only_images() {
    let settings = GameSettings::for_variant(Variant::Image);
    let mut game = Game::new(settings, Some(5)).unwrap();
    let mut presenter = RecordingPresenter::new();
    game.start(0).unwrap();

    run_until(&mut game, &mut presenter, 20_000);
    assert!(!presenter.shown().is_empty());
    assert!(presenter
        .shown()
        .iter()
        .all(|identity| matches!(identity, StimulusIdentity::Image(_))));
}

#[test]
fn same_seed_gives_same_sequence() {
    let shown = |seed| {
        let mut game = Game::new(GameSettings::default(), Some(seed)).unwrap();
        let mut presenter = RecordingPresenter::new();
        game.start(0).unwrap();
        run_until(&mut game, &mut presenter, u64::MAX);
        presenter.shown()
    };

    assert_eq!(shown(42), shown(42));
}
