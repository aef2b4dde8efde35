use std::time::Duration;

use rand::Rng;

use crate::error::Result;
use crate::session::{SessionPhase, SessionState};
use crate::songs::selection::{draw_prompt, RoundPrompt, SongChoice};
use crate::songs::{Genre, SongBook};
use crate::store::Store;
use crate::timer::{TimerDriver, TimerState};

pub const POINTS_PER_CORRECT: u32 = 10;

/// How long the answer reveal stays on screen before the next round.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct RoundConfig {
    pub genre: Genre,
    pub max_rounds: u32,
    pub round_secs: u64,
    pub reveal_delay: Duration,
}

impl RoundConfig {
    pub fn new(genre: Genre, max_rounds: u32, round_secs: u64) -> Self {
        Self {
            genre,
            // the win boundary below subtracts one
            max_rounds: max_rounds.max(1),
            round_secs,
            reveal_delay: REVEAL_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Won,
    Lost,
}

/// Runs lyric-guess rounds for one genre until the round count is reached,
/// a wrong answer is given, or the countdown expires.
///
/// The engine is the only owner of the countdown: it resets the timer store
/// at each round boundary and feeds the driver from the app's clock, so the
/// displayed time and the session-ending time can never drift apart.
#[derive(Debug)]
pub struct RoundEngine {
    config: RoundConfig,
    book: SongBook,
    driver: TimerDriver,
    current_round: u32,
    prompt: Option<RoundPrompt>,
    selected: Option<SongChoice>,
    revealed_answer: Option<SongChoice>,
    last_correct: Option<bool>,
    outcome: Option<RoundOutcome>,
    reveal_left: Option<Duration>,
    elapsed: Duration,
}

impl RoundEngine {
    pub fn new(config: RoundConfig) -> Result<Self> {
        let book = SongBook::load(config.genre)?;
        Ok(Self::with_book(config, book))
    }

    /// Build against an explicit song book. Used by tests and embedders.
    pub fn with_book(config: RoundConfig, book: SongBook) -> Self {
        Self {
            config,
            book,
            driver: TimerDriver::new(false),
            current_round: 0,
            prompt: None,
            selected: None,
            revealed_answer: None,
            last_correct: None,
            outcome: None,
            reveal_left: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Begin a session: resets both stores and draws the first prompt.
    pub fn start<R: Rng>(
        &mut self,
        rng: &mut R,
        session: &mut Store<SessionState>,
        timer: &mut Store<TimerState>,
    ) -> Result<()> {
        session.update(SessionState::start_game);
        timer.update(|t| {
            t.start_game();
            t.reset(Some(self.config.round_secs));
            t.start();
        });
        self.current_round = 0;
        self.outcome = None;
        self.elapsed = Duration::ZERO;
        self.begin_round(rng)
    }

    fn begin_round<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        self.prompt = Some(draw_prompt(&self.book, rng)?);
        self.selected = None;
        self.revealed_answer = None;
        self.last_correct = None;
        self.reveal_left = None;
        Ok(())
    }

    /// Record an answer by option index.
    ///
    /// A no-op once a selection is recorded or the session has ended.
    /// Returns whether the selection was correct when one was accepted.
    pub fn select(
        &mut self,
        index: usize,
        session: &mut Store<SessionState>,
        timer: &mut Store<TimerState>,
    ) -> Option<bool> {
        if self.outcome.is_some() || self.selected.is_some() {
            return None;
        }
        let prompt = self.prompt.as_ref()?;
        let option = prompt.options.get(index)?.clone();

        // The true answer is recorded on every selection, right or wrong,
        // so the reveal can show it after a miss.
        self.revealed_answer = Some(prompt.correct_choice());

        let is_correct = option.title == prompt.title;
        self.selected = Some(option);
        self.last_correct = Some(is_correct);

        if is_correct {
            session.update(|s| s.increment_score(POINTS_PER_CORRECT));
            // countdown pauses during the reveal window; flushing the
            // driver here drops any partial second it had accumulated
            timer.update(TimerState::stop);
            self.driver.advance(Duration::ZERO, timer);
            self.reveal_left = Some(self.config.reveal_delay);
        } else {
            self.finish(RoundOutcome::Lost, session, timer);
        }
        Some(is_correct)
    }

    /// Feed wall-clock time into the session: drives the countdown, the
    /// elapsed-time bookkeeping, and the reveal window. Returns an outcome
    /// when this call ended the session.
    pub fn advance<R: Rng>(
        &mut self,
        elapsed: Duration,
        rng: &mut R,
        session: &mut Store<SessionState>,
        timer: &mut Store<TimerState>,
    ) -> Result<Option<RoundOutcome>> {
        if self.outcome.is_some() {
            return Ok(None);
        }

        if session.get().phase == SessionPhase::Playing {
            self.elapsed += elapsed;
            let secs = self.elapsed.as_secs();
            session.update(|s| s.update_time(secs));
        }

        if let Some(left) = self.reveal_left {
            if left > elapsed {
                self.reveal_left = Some(left - elapsed);
                return Ok(None);
            }
            self.reveal_left = None;
            if self.current_round >= self.config.max_rounds - 1 {
                self.finish(RoundOutcome::Won, session, timer);
                return Ok(self.outcome);
            }
            self.current_round += 1;
            self.begin_round(rng)?;
            timer.update(|t| {
                t.reset(Some(self.config.round_secs));
                t.start();
            });
            return Ok(None);
        }

        if self.driver.advance(elapsed, timer) {
            self.finish(RoundOutcome::Lost, session, timer);
            return Ok(self.outcome);
        }
        Ok(None)
    }

    fn finish(
        &mut self,
        outcome: RoundOutcome,
        session: &mut Store<SessionState>,
        timer: &mut Store<TimerState>,
    ) {
        self.outcome = Some(outcome);
        session.update(SessionState::end_game);
        timer.update(|t| {
            t.stop();
            t.end_game();
        });
    }

    pub fn prompt(&self) -> Option<&RoundPrompt> {
        self.prompt.as_ref()
    }

    pub fn selected(&self) -> Option<&SongChoice> {
        self.selected.as_ref()
    }

    pub fn revealed_answer(&self) -> Option<&SongChoice> {
        self.revealed_answer.as_ref()
    }

    pub fn last_correct(&self) -> Option<bool> {
        self.last_correct
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn max_rounds(&self) -> u32 {
        self.config.max_rounds
    }
}
