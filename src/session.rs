/// Session lifecycle. `Idle` until a game starts, `Ended` once it finishes,
/// back to `Idle` only through an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Playing,
    Ended,
}

/// Score and elapsed-time bookkeeping for one process lifetime.
///
/// Transitions are guarded: score and end-of-game accounting only apply
/// while `Playing`; calls from any other phase change nothing. `high_score`
/// survives `reset_game` and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub score: u32,
    pub time_elapsed: u64,
    pub high_score: u32,
}

impl SessionState {
    /// Enter `Playing` from any phase, zeroing score and elapsed time.
    pub fn start_game(&mut self) {
        self.phase = SessionPhase::Playing;
        self.score = 0;
        self.time_elapsed = 0;
    }

    /// Add points to the current session. No-op unless `Playing`.
    pub fn increment_score(&mut self, points: u32) {
        if self.phase == SessionPhase::Playing {
            self.score += points;
        }
    }

    /// Absolute set of elapsed seconds. No-op unless `Playing`.
    pub fn update_time(&mut self, seconds: u64) {
        if self.phase == SessionPhase::Playing {
            self.time_elapsed = seconds;
        }
    }

    /// `Playing → Ended`, folding the session score into the high score.
    /// No-op from `Idle` or `Ended`.
    pub fn end_game(&mut self) {
        if self.phase == SessionPhase::Playing {
            self.phase = SessionPhase::Ended;
            self.high_score = self.high_score.max(self.score);
        }
    }

    /// Return to `Idle` from any phase. High score is preserved.
    pub fn reset_game(&mut self) {
        self.phase = SessionPhase::Idle;
        self.score = 0;
        self.time_elapsed = 0;
    }
}
