use crate::config::WorkoutConfig;
use crate::moves::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Work,
    Rest,
}

/// Overall lifecycle of a workout, independent of the work/rest phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WorkoutState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl WorkoutState {
    /// Idle and Finished both mean nothing is ticking
    pub fn is_at_rest(&self) -> bool {
        matches!(self, WorkoutState::Idle | WorkoutState::Finished)
    }
}

/// Mutable state of one workout, written only by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSession {
    pub state: WorkoutState,
    pub phase: Phase,
    /// 1-indexed
    pub current_round: u32,
    pub seconds_remaining: u32,
    pub last_punch_side: Option<Side>,
}

impl TimerSession {
    pub fn new(config: &WorkoutConfig) -> Self {
        Self {
            state: WorkoutState::Idle,
            phase: Phase::Work,
            current_round: 1,
            seconds_remaining: config.round_duration_secs,
            last_punch_side: None,
        }
    }

    /// Back to round one at the top of a work phase; lifecycle state is untouched.
    pub fn reset(&mut self, config: &WorkoutConfig) {
        self.phase = Phase::Work;
        self.current_round = 1;
        self.seconds_remaining = config.round_duration_secs;
        self.last_punch_side = None;
    }

    /// Seconds left in the whole workout, counting the current phase.
    pub fn total_remaining_secs(&self, config: &WorkoutConfig) -> u64 {
        let total = config.total_workout_secs();
        if self.state.is_at_rest() {
            return total;
        }
        let round = u64::from(config.round_duration_secs);
        let rest = u64::from(config.rest_duration_secs);
        let previous_rounds = u64::from(self.current_round.saturating_sub(1)) * (round + rest);
        let in_phase = match self.phase {
            Phase::Work => round.saturating_sub(u64::from(self.seconds_remaining)),
            Phase::Rest => round + rest.saturating_sub(u64::from(self.seconds_remaining)),
        };
        total.saturating_sub(previous_rounds + in_phase)
    }

    /// "Round 2/5 - Work" style label for headers
    pub fn label(&self, config: &WorkoutConfig) -> String {
        match self.state {
            WorkoutState::Idle => "A boxing training app".to_string(),
            WorkoutState::Finished => "Workout Complete!".to_string(),
            _ => format!(
                "Round {}/{} - {}",
                self.current_round, config.num_rounds, self.phase
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkoutConfig {
        WorkoutConfig {
            round_duration_secs: 180,
            rest_duration_secs: 60,
            num_rounds: 3,
            ..WorkoutConfig::default()
        }
    }

    #[test]
    fn test_new_session_is_idle_round_one() {
        let session = TimerSession::new(&config());
        assert_eq!(session.state, WorkoutState::Idle);
        assert_eq!(session.phase, Phase::Work);
        assert_eq!(session.current_round, 1);
        assert_eq!(session.seconds_remaining, 180);
        assert_eq!(session.last_punch_side, None);
    }

    #[test]
    fn test_total_remaining_when_idle_is_whole_workout() {
        let session = TimerSession::new(&config());
        // 3 rounds of 180 with two 60s rests in between
        assert_eq!(session.total_remaining_secs(&config()), 660);
    }

    #[test]
    fn test_total_remaining_mid_rest() {
        let mut session = TimerSession::new(&config());
        session.state = WorkoutState::Running;
        session.phase = Phase::Rest;
        session.current_round = 2;
        session.seconds_remaining = 20;
        // elapsed: one full cycle (240) + round two work (180) + 40s of rest
        assert_eq!(session.total_remaining_secs(&config()), 660 - 460);
    }

    #[test]
    fn test_total_remaining_with_huge_durations() {
        let cfg = WorkoutConfig {
            round_duration_secs: 3_000_000_000,
            rest_duration_secs: 1_000_000_000,
            num_rounds: 2,
            ..WorkoutConfig::default()
        };
        let mut session = TimerSession::new(&cfg);
        assert_eq!(session.total_remaining_secs(&cfg), 7_000_000_000);

        session.state = WorkoutState::Running;
        session.current_round = 2;
        session.seconds_remaining = 1_000_000_000;
        // one full cycle plus two thirds of round two are behind us
        assert_eq!(session.total_remaining_secs(&cfg), 1_000_000_000);
    }

    #[test]
    fn test_label_by_state() {
        let cfg = config();
        let mut session = TimerSession::new(&cfg);
        assert_eq!(session.label(&cfg), "A boxing training app");
        session.state = WorkoutState::Running;
        assert_eq!(session.label(&cfg), "Round 1/3 - Work");
        session.state = WorkoutState::Paused;
        session.phase = Phase::Rest;
        assert_eq!(session.label(&cfg), "Round 1/3 - Rest");
        session.state = WorkoutState::Finished;
        assert_eq!(session.label(&cfg), "Workout Complete!");
    }

    #[test]
    fn test_reset_keeps_lifecycle_state() {
        let cfg = config();
        let mut session = TimerSession::new(&cfg);
        session.state = WorkoutState::Paused;
        session.current_round = 3;
        session.phase = Phase::Rest;
        session.seconds_remaining = 4;
        session.last_punch_side = Some(Side::Left);
        session.reset(&cfg);
        assert_eq!(session.state, WorkoutState::Paused);
        assert_eq!(session.current_round, 1);
        assert_eq!(session.phase, Phase::Work);
        assert_eq!(session.seconds_remaining, 180);
        assert_eq!(session.last_punch_side, None);
    }
}
