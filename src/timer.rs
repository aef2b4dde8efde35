use std::time::Duration;

use crate::store::Store;

/// Countdown length used when `reset` is called without an override.
pub const DEFAULT_ROUND_SECS: u64 = 15;

/// Countdown state shared between the driver and the UI.
///
/// `running` gates the countdown, `playing` gates the session; a tick only
/// decrements when both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub time_left: u64,
    pub running: bool,
    pub playing: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            time_left: DEFAULT_ROUND_SECS,
            running: false,
            playing: false,
        }
    }
}

impl TimerState {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Set the countdown without touching `running`.
    pub fn reset(&mut self, new_time: Option<u64>) {
        self.time_left = new_time.unwrap_or(DEFAULT_ROUND_SECS);
    }

    /// Decrement by one second, floored at zero. The store never stops
    /// itself at zero; the consumer ends the session.
    pub fn tick(&mut self) {
        if self.running && self.playing {
            self.time_left = self.time_left.saturating_sub(1);
        }
    }

    pub fn start_game(&mut self) {
        self.playing = true;
    }

    pub fn end_game(&mut self) {
        self.playing = false;
    }

    pub fn is_expired(&self) -> bool {
        self.time_left == 0
    }
}

/// Bridges the timer store to the real-time clock.
///
/// The app feeds wall-clock elapsed time into [`TimerDriver::advance`]; the
/// driver converts it into whole-second `tick` calls while the store is
/// `running && playing`. The accumulator is cleared whenever either flag is
/// down, so a partial second never carries across a stop/start edge and two
/// sessions can never share a tick.
#[derive(Debug)]
pub struct TimerDriver {
    auto_start: bool,
    acc: Duration,
    was_playing: bool,
}

impl TimerDriver {
    /// `auto_start` selects the reset-and-start-on-play behavior; with it
    /// off, the caller controls `start`/`reset` explicitly.
    pub fn new(auto_start: bool) -> Self {
        Self {
            auto_start,
            acc: Duration::ZERO,
            was_playing: false,
        }
    }

    /// Feed `elapsed` wall-clock time. Returns true when a tick applied in
    /// this call brought the countdown to zero while a session was active.
    pub fn advance(&mut self, elapsed: Duration, timer: &mut Store<TimerState>) -> bool {
        let playing = timer.get().playing;
        if self.auto_start && playing && !self.was_playing {
            timer.update(|t| {
                t.reset(None);
                t.start();
            });
        }
        self.was_playing = playing;

        let state = *timer.get();
        if !(state.running && state.playing) {
            self.acc = Duration::ZERO;
            return false;
        }

        self.acc += elapsed;
        let mut crossed_zero = false;
        while self.acc >= Duration::from_secs(1) {
            self.acc -= Duration::from_secs(1);
            let before = timer.get().time_left;
            timer.update(TimerState::tick);
            if before > 0 && timer.get().time_left == 0 {
                crossed_zero = true;
            }
        }
        crossed_zero
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state() {
        let t = TimerState::default();
        assert_eq!(t.time_left, DEFAULT_ROUND_SECS);
        assert!(!t.running);
        assert!(!t.playing);
    }

    #[test]
    fn start_is_idempotent() {
        let mut t = TimerState::default();
        t.start();
        t.start();
        assert!(t.running);
    }

    #[test]
    fn reset_without_argument_restores_default() {
        let mut t = TimerState::default();
        t.reset(Some(3));
        assert_eq!(t.time_left, 3);
        t.reset(None);
        assert_eq!(t.time_left, DEFAULT_ROUND_SECS);
    }

    #[test]
    fn reset_does_not_change_running() {
        let mut t = TimerState::default();
        t.start();
        t.reset(Some(30));
        assert!(t.running);
        assert_eq!(t.time_left, 30);
    }

    #[test]
    fn tick_requires_running_and_playing() {
        let mut t = TimerState::default();
        t.tick();
        assert_eq!(t.time_left, DEFAULT_ROUND_SECS);

        t.start();
        t.tick();
        assert_eq!(t.time_left, DEFAULT_ROUND_SECS);

        t.start_game();
        t.tick();
        assert_eq!(t.time_left, DEFAULT_ROUND_SECS - 1);
    }

    #[test]
    fn tick_never_goes_below_zero() {
        let mut t = TimerState::default();
        t.start();
        t.start_game();
        t.reset(Some(2));
        for _ in 0..10 {
            t.tick();
        }
        assert_eq!(t.time_left, 0);
        assert!(t.is_expired());
    }

    #[test]
    fn driver_accumulates_partial_seconds() {
        let mut store = Store::new(TimerState {
            time_left: 5,
            running: true,
            playing: true,
        });
        let mut driver = TimerDriver::new(false);

        driver.advance(Duration::from_millis(400), &mut store);
        assert_eq!(store.get().time_left, 5);

        driver.advance(Duration::from_millis(700), &mut store);
        assert_eq!(store.get().time_left, 4);
    }

    #[test]
    fn driver_applies_multiple_whole_seconds() {
        let mut store = Store::new(TimerState {
            time_left: 10,
            running: true,
            playing: true,
        });
        let mut driver = TimerDriver::new(false);

        driver.advance(Duration::from_millis(3500), &mut store);
        assert_eq!(store.get().time_left, 7);
    }

    #[test]
    fn driver_clears_accumulator_while_stopped() {
        let mut store = Store::new(TimerState {
            time_left: 5,
            running: true,
            playing: true,
        });
        let mut driver = TimerDriver::new(false);

        driver.advance(Duration::from_millis(900), &mut store);
        store.update(TimerState::stop);
        driver.advance(Duration::from_millis(900), &mut store);

        // A stale 900ms must not survive the stop edge
        store.update(TimerState::start);
        driver.advance(Duration::from_millis(200), &mut store);
        assert_eq!(store.get().time_left, 5);
    }

    #[test]
    fn driver_reports_zero_crossing_once() {
        let mut store = Store::new(TimerState {
            time_left: 1,
            running: true,
            playing: true,
        });
        let mut driver = TimerDriver::new(false);

        assert!(driver.advance(Duration::from_secs(1), &mut store));
        assert_eq!(store.get().time_left, 0);
        assert!(!driver.advance(Duration::from_secs(1), &mut store));
    }

    #[test]
    fn auto_start_resets_and_starts_on_play() {
        let mut store = Store::new(TimerState {
            time_left: 0,
            running: false,
            playing: false,
        });
        let mut driver = TimerDriver::new(true);

        store.update(TimerState::start_game);
        driver.advance(Duration::ZERO, &mut store);

        assert!(store.get().running);
        assert_eq!(store.get().time_left, DEFAULT_ROUND_SECS);
    }

    #[test]
    fn caller_controlled_driver_does_not_auto_start() {
        let mut store = Store::new(TimerState {
            time_left: 0,
            running: false,
            playing: false,
        });
        let mut driver = TimerDriver::new(false);

        store.update(TimerState::start_game);
        driver.advance(Duration::from_secs(2), &mut store);

        assert!(!store.get().running);
        assert_eq!(store.get().time_left, 0);
    }
}
