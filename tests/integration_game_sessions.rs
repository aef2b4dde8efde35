// Multi-session behavior through the public library surface: high score
// tracking across sessions, reset semantics, and the timer/session
// interplay the stores guarantee together.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use lyricflip::round::{RoundConfig, RoundEngine, RoundOutcome, POINTS_PER_CORRECT, REVEAL_DELAY};
use lyricflip::session::{SessionPhase, SessionState};
use lyricflip::songs::Genre;
use lyricflip::store::Store;
use lyricflip::timer::{TimerState, DEFAULT_ROUND_SECS};

fn correct_index(engine: &RoundEngine) -> usize {
    let prompt = engine.prompt().unwrap();
    prompt
        .options
        .iter()
        .position(|o| o.title == prompt.title)
        .unwrap()
}

fn wrong_index(engine: &RoundEngine) -> usize {
    let prompt = engine.prompt().unwrap();
    prompt
        .options
        .iter()
        .position(|o| o.title != prompt.title)
        .unwrap()
}

/// Play a full session answering every round correctly.
fn play_winning_session(
    rounds: u32,
    session: &mut Store<SessionState>,
    timer: &mut Store<TimerState>,
    rng: &mut StdRng,
) -> RoundOutcome {
    let config = RoundConfig::new(Genre::Pop, rounds, 15);
    let mut engine = RoundEngine::new(config).unwrap();
    engine.start(rng, session, timer).unwrap();

    loop {
        engine.select(correct_index(&engine), session, timer);
        if let Some(outcome) = engine.advance(REVEAL_DELAY, rng, session, timer).unwrap() {
            return outcome;
        }
    }
}

#[test]
fn high_score_survives_a_weaker_followup_session() {
    let mut session = Store::new(SessionState::default());
    let mut timer = Store::new(TimerState::default());
    let mut rng = StdRng::seed_from_u64(17);

    // First session: two correct answers
    let outcome = play_winning_session(2, &mut session, &mut timer, &mut rng);
    assert_eq!(outcome, RoundOutcome::Won);
    assert_eq!(session.get().high_score, 2 * POINTS_PER_CORRECT);

    // Second session: immediate miss
    let config = RoundConfig::new(Genre::Pop, 2, 15);
    let mut engine = RoundEngine::new(config).unwrap();
    engine.start(&mut rng, &mut session, &mut timer).unwrap();
    engine.select(wrong_index(&engine), &mut session, &mut timer);

    assert_eq!(engine.outcome(), Some(RoundOutcome::Lost));
    assert_eq!(session.get().score, 0);
    assert_eq!(session.get().high_score, 2 * POINTS_PER_CORRECT);
}

#[test]
fn high_score_rises_with_a_stronger_session() {
    let mut session = Store::new(SessionState::default());
    let mut timer = Store::new(TimerState::default());
    let mut rng = StdRng::seed_from_u64(23);

    play_winning_session(1, &mut session, &mut timer, &mut rng);
    assert_eq!(session.get().high_score, POINTS_PER_CORRECT);

    play_winning_session(3, &mut session, &mut timer, &mut rng);
    assert_eq!(session.get().high_score, 3 * POINTS_PER_CORRECT);
}

#[test]
fn reset_between_sessions_returns_to_idle_and_defaults() {
    let mut session = Store::new(SessionState::default());
    let mut timer = Store::new(TimerState::default());
    let mut rng = StdRng::seed_from_u64(31);

    play_winning_session(1, &mut session, &mut timer, &mut rng);
    assert_eq!(session.get().phase, SessionPhase::Ended);

    session.update(SessionState::reset_game);
    timer.update(|t| {
        t.stop();
        t.end_game();
        t.reset(None);
    });

    assert_eq!(session.get().phase, SessionPhase::Idle);
    assert_eq!(session.get().score, 0);
    assert_eq!(session.get().time_elapsed, 0);
    assert_eq!(session.get().high_score, POINTS_PER_CORRECT);
    assert_eq!(timer.get().time_left, DEFAULT_ROUND_SECS);
    assert!(!timer.get().running);
    assert!(!timer.get().playing);
}

#[test]
fn stores_notify_subscribers_through_a_session() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut session = Store::new(SessionState::default());
    let mut timer = Store::new(TimerState::default());
    let mut rng = StdRng::seed_from_u64(5);

    let scores = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scores);
    session.subscribe(move |s| sink.borrow_mut().push(s.score));

    play_winning_session(2, &mut session, &mut timer, &mut rng);

    let seen = scores.borrow();
    // start, two increments, elapsed-time updates, end — the increments
    // must appear in order
    assert!(seen.contains(&POINTS_PER_CORRECT));
    assert!(seen.contains(&(2 * POINTS_PER_CORRECT)));
    assert_eq!(*seen.last().unwrap(), 2 * POINTS_PER_CORRECT);
}

#[test]
fn countdown_and_session_agree_at_timeout() {
    let mut session = Store::new(SessionState::default());
    let mut timer = Store::new(TimerState::default());
    let mut rng = StdRng::seed_from_u64(13);

    let config = RoundConfig::new(Genre::HipHop, 3, 4);
    let mut engine = RoundEngine::new(config).unwrap();
    engine.start(&mut rng, &mut session, &mut timer).unwrap();

    // Walk the clock forward in sub-second steps
    let mut outcome = None;
    for _ in 0..20 {
        outcome = engine
            .advance(Duration::from_millis(400), &mut rng, &mut session, &mut timer)
            .unwrap();
        if outcome.is_some() {
            break;
        }
    }

    assert_eq!(outcome, Some(RoundOutcome::Lost));
    // the displayed time and the session-ending decision come from the
    // same store, so both must agree
    assert_eq!(timer.get().time_left, 0);
    assert_eq!(session.get().phase, SessionPhase::Ended);
    assert_eq!(session.get().time_elapsed, 4);
}
