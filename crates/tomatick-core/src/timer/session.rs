//! Session state machine.
//!
//! Tracks the current mode, the remaining seconds and the number of completed
//! work sessions, and decides which mode follows a natural completion.
//!
//! ```text
//! work --(count % 4 == 0 && sequence)--> long-break --> work
//! work --(otherwise)-------------------> short-break --> work
//! ```
//!
//! The machine knows nothing about wall-clock time; the countdown clock
//! drives it one `tick()` per elapsed second.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::mode::{Durations, SessionMode, LONG_BREAK_EVERY};

/// A mode change caused by a countdown reaching zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: SessionMode,
    pub to: SessionMode,
    /// Completed work sessions after the transition.
    pub completed_count: u32,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Remaining time was already zero; nothing changed.
    AtFloor,
    /// Remaining time went down by one second.
    Decremented { remaining_secs: u64 },
    /// Remaining time reached zero and the next session was entered.
    Completed(Transition),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMachine {
    durations: Durations,
    mode: SessionMode,
    remaining_secs: u64,
    completed_count: u32,
}

impl SessionMachine {
    /// Start in `work` with a full countdown. Zero durations are replaced
    /// by their defaults.
    pub fn new(durations: Durations) -> Self {
        let durations = durations.normalized();
        Self {
            durations,
            mode: SessionMode::Work,
            remaining_secs: durations.seconds(SessionMode::Work),
            completed_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn completed_count(&self) -> u32 {
        self.completed_count
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    /// Full length of the current mode in seconds.
    pub fn total_secs(&self) -> u64 {
        self.durations.seconds(self.mode)
    }

    /// Mode that follows a natural completion of `from`, given the
    /// post-increment completed count.
    pub fn next_mode(from: SessionMode, completed_count: u32, sequence: bool) -> SessionMode {
        if from.is_break() {
            SessionMode::Work
        } else if sequence && completed_count % LONG_BREAK_EVERY == 0 {
            SessionMode::LongBreak
        } else {
            SessionMode::ShortBreak
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Jump straight to `mode` with a full countdown. The completed count is
    /// left alone.
    pub fn switch_mode(&mut self, mode: SessionMode) {
        self.enter(mode);
    }

    /// Back to `work`, count zeroed, full countdown.
    pub fn reset(&mut self) {
        self.completed_count = 0;
        self.enter(SessionMode::Work);
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.remaining_secs == 0 {
            return TickOutcome::AtFloor;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            TickOutcome::Completed(self.complete())
        } else {
            TickOutcome::Decremented {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Natural-completion transition.
    pub fn complete(&mut self) -> Transition {
        let from = self.mode;
        if from == SessionMode::Work {
            self.completed_count = self.completed_count.saturating_add(1);
        }
        let to = Self::next_mode(from, self.completed_count, self.durations.sequence);
        self.enter(to);
        Transition {
            from,
            to,
            completed_count: self.completed_count,
        }
    }

    /// Replace the durations without touching the countdown. Zero durations
    /// are replaced by their defaults.
    ///
    /// Callers follow up with [`SessionMachine::restart_current`] when the
    /// countdown should pick up the new length.
    pub fn set_durations(&mut self, durations: Durations) {
        self.durations = durations.normalized();
        // Keep remaining within the (possibly shorter) mode length.
        self.remaining_secs = self.remaining_secs.min(self.total_secs());
    }

    /// Reset the countdown of the current mode to its full length.
    pub fn restart_current(&mut self) {
        self.enter(self.mode);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, mode: SessionMode) {
        self.mode = mode;
        self.remaining_secs = self.durations.seconds(mode);
        debug!(mode = %mode, remaining_secs = self.remaining_secs, "entered session mode");
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn one_minute(sequence: bool) -> Durations {
        Durations::new(1, 1, 1, sequence)
    }

    fn run_out(machine: &mut SessionMachine) -> Transition {
        loop {
            if let TickOutcome::Completed(t) = machine.tick() {
                return t;
            }
        }
    }

    #[test]
    fn starts_in_work_with_full_countdown() {
        let machine = SessionMachine::default();
        assert_eq!(machine.mode(), SessionMode::Work);
        assert_eq!(machine.remaining_secs(), 25 * 60);
        assert_eq!(machine.completed_count(), 0);
    }

    #[test]
    fn work_goes_to_short_break_without_sequence() {
        let mut machine = SessionMachine::new(one_minute(false));
        for expected_count in 1..=8 {
            let t = run_out(&mut machine);
            assert_eq!(t.to, SessionMode::ShortBreak);
            assert_eq!(t.completed_count, expected_count);
            assert_eq!(run_out(&mut machine).to, SessionMode::Work);
        }
    }

    #[test]
    fn every_fourth_work_goes_to_long_break_with_sequence() {
        let mut machine = SessionMachine::new(one_minute(true));
        let mut breaks = Vec::new();
        for _ in 0..8 {
            breaks.push(run_out(&mut machine).to);
            run_out(&mut machine);
        }
        assert_eq!(
            breaks,
            vec![
                SessionMode::ShortBreak,
                SessionMode::ShortBreak,
                SessionMode::ShortBreak,
                SessionMode::LongBreak,
                SessionMode::ShortBreak,
                SessionMode::ShortBreak,
                SessionMode::ShortBreak,
                SessionMode::LongBreak,
            ]
        );
    }

    #[test]
    fn break_completion_keeps_count() {
        let mut machine = SessionMachine::new(one_minute(false));
        machine.switch_mode(SessionMode::LongBreak);
        let t = run_out(&mut machine);
        assert_eq!(t.from, SessionMode::LongBreak);
        assert_eq!(t.to, SessionMode::Work);
        assert_eq!(t.completed_count, 0);
    }

    #[test]
    fn tick_at_floor_is_noop() {
        let mut machine = SessionMachine::new(one_minute(false));
        machine.remaining_secs = 0;
        assert_eq!(machine.tick(), TickOutcome::AtFloor);
        assert_eq!(machine.tick(), TickOutcome::AtFloor);
        assert_eq!(machine.mode(), SessionMode::Work);
        assert_eq!(machine.completed_count(), 0);
    }

    #[test]
    fn sixty_ticks_complete_one_minute_work() {
        let mut machine = SessionMachine::new(one_minute(true));
        for _ in 0..59 {
            assert!(matches!(machine.tick(), TickOutcome::Decremented { .. }));
        }
        let outcome = machine.tick();
        assert_eq!(
            outcome,
            TickOutcome::Completed(Transition {
                from: SessionMode::Work,
                to: SessionMode::ShortBreak,
                completed_count: 1,
            })
        );
        assert_eq!(machine.remaining_secs(), 60);
    }

    #[test]
    fn reset_clears_everything() {
        let mut machine = SessionMachine::new(one_minute(true));
        run_out(&mut machine);
        machine.tick();
        machine.reset();
        assert_eq!(machine.mode(), SessionMode::Work);
        assert_eq!(machine.remaining_secs(), 60);
        assert_eq!(machine.completed_count(), 0);
    }

    #[test]
    fn zero_durations_never_leave_the_machine_stuck() {
        let zero = Durations {
            pomodoro: 0,
            short: 0,
            long: 0,
            sequence: false,
        };
        let mut machine = SessionMachine::new(zero);
        assert_eq!(machine.remaining_secs(), 25 * 60);
        assert!(matches!(machine.tick(), TickOutcome::Decremented { .. }));

        machine.set_durations(zero);
        machine.switch_mode(SessionMode::ShortBreak);
        assert_eq!(machine.remaining_secs(), 5 * 60);
        assert_eq!(machine.durations(), &Durations::default());
    }

    #[test]
    fn shorter_durations_clamp_remaining() {
        let mut machine = SessionMachine::default();
        machine.set_durations(Durations::new(2, 5, 10, false));
        assert_eq!(machine.remaining_secs(), 120);
        machine.restart_current();
        assert_eq!(machine.remaining_secs(), 120);
    }

    fn mode_strategy() -> impl Strategy<Value = SessionMode> {
        prop_oneof![
            Just(SessionMode::Work),
            Just(SessionMode::ShortBreak),
            Just(SessionMode::LongBreak),
        ]
    }

    proptest! {
        #[test]
        fn switch_always_yields_full_countdown(
            p in 1u32..500, s in 1u32..500, l in 1u32..500, seq in any::<bool>(),
            switches in proptest::collection::vec(mode_strategy(), 1..20),
            ticks in 0usize..200,
        ) {
            let durations = Durations::new(p, s, l, seq);
            let mut machine = SessionMachine::new(durations);
            for mode in switches {
                for _ in 0..ticks {
                    machine.tick();
                }
                machine.switch_mode(mode);
                prop_assert_eq!(machine.mode(), mode);
                prop_assert_eq!(machine.remaining_secs(), u64::from(durations.minutes(mode)) * 60);
            }
        }

        #[test]
        fn remaining_never_exceeds_mode_length(
            seq in any::<bool>(), ticks in 0usize..400,
        ) {
            let mut machine = SessionMachine::new(Durations::new(1, 2, 3, seq));
            for _ in 0..ticks {
                machine.tick();
                prop_assert!(machine.remaining_secs() <= machine.total_secs());
            }
        }

        #[test]
        fn long_break_iff_count_divisible_by_four(count in 1u32..1000) {
            let next = SessionMachine::next_mode(SessionMode::Work, count, true);
            prop_assert_eq!(next == SessionMode::LongBreak, count % 4 == 0);
            prop_assert_eq!(
                SessionMachine::next_mode(SessionMode::Work, count, false),
                SessionMode::ShortBreak
            );
        }
    }
}
