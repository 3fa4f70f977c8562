use rand::Rng;
use std::time::Duration;

use crate::combo::ComboGenerator;
use crate::config::WorkoutConfig;
use crate::cues::{Collaborators, Cue};
use crate::error::{ConfigError, EngineError};
use crate::session::{Phase, TimerSession, WorkoutState};
use crate::timer::{TimerId, TimerKind, TimerSlots, TimerSpec};

const TICK: Duration = Duration::from_secs(1);
/// time for the round-start announcement before the first combo
const ROUND_LEAD_IN: Duration = Duration::from_millis(1000);
const RESUME_LEAD_IN: Duration = Duration::from_millis(500);
/// countdown warnings start at this many seconds remaining
const WARNING_WINDOW: u32 = 10;

/// Drives rounds, rest periods and combo callouts.
///
/// The engine never sleeps. It arms timers in its [`TimerSlots`] and expects
/// whoever runs it to deliver each fired timer back through
/// [`WorkoutEngine::handle_timer`]. All state changes happen inside these calls.
pub struct WorkoutEngine<R: Rng> {
    config: WorkoutConfig,
    generator: ComboGenerator,
    session: TimerSession,
    timers: TimerSlots,
    rng: R,
    collaborators: Collaborators,
    muted: bool,
    /// 0..=100
    volume: u8,
}

impl<R: Rng> WorkoutEngine<R> {
    pub fn new(
        config: WorkoutConfig,
        rng: R,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = ComboGenerator::new(&config)?;
        Ok(Self {
            session: TimerSession::new(&config),
            config,
            generator,
            timers: TimerSlots::new(),
            rng,
            collaborators,
            muted: false,
            volume: 75,
        })
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn state(&self) -> WorkoutState {
        self.session.state
    }

    pub fn timers(&self) -> &TimerSlots {
        &self.timers
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    /// Swap in a new configuration.
    ///
    /// At rest the session snaps back to round one with the new round length.
    /// Otherwise only future phases and combos see the change, except that the
    /// current round is pulled down to the new round count.
    pub fn update_config(&mut self, config: WorkoutConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.generator = ComboGenerator::new(&config)?;
        self.config = config;
        if self.session.state.is_at_rest() {
            self.session.reset(&self.config);
        } else if self.session.current_round > self.config.num_rounds {
            log::info!(
                "round count cut to {}, now in the last round",
                self.config.num_rounds
            );
            self.session.current_round = self.config.num_rounds;
        }
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        if !self.session.state.is_at_rest() {
            return Err(self.misuse("start"));
        }
        log::info!(
            "starting workout: {} x {}s, {}s rest",
            self.config.num_rounds,
            self.config.round_duration_secs,
            self.config.rest_duration_secs
        );
        self.session.reset(&self.config);
        self.set_state(WorkoutState::Running);
        self.collaborators.wake_lock.acquire();

        self.play(|s| s.play_start_cue());
        self.say("Round 1. Fight!");
        self.emit(Cue::RoundAdvanced { round: 1 });
        self.emit(Cue::PhaseChanged {
            phase: Phase::Work,
            round: 1,
        });

        self.timers.arm(TimerKind::PhaseTick, TICK, TICK);
        self.arm_cadence(ROUND_LEAD_IN);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        if self.session.state != WorkoutState::Running {
            return Err(self.misuse("pause"));
        }
        self.timers.cancel_all();
        self.set_state(WorkoutState::Paused);
        self.collaborators.wake_lock.release();
        self.say("Paused.");
        log::info!(
            "paused in round {} ({}, {}s left)",
            self.session.current_round,
            self.session.phase,
            self.session.seconds_remaining
        );
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        if self.session.state != WorkoutState::Paused {
            return Err(self.misuse("resume"));
        }
        self.set_state(WorkoutState::Running);
        self.collaborators.wake_lock.acquire();
        self.say("Go!");
        self.timers.arm(TimerKind::PhaseTick, TICK, TICK);
        if self.session.phase == Phase::Work {
            self.arm_cadence(RESUME_LEAD_IN);
        }
        log::info!("resumed");
        Ok(())
    }

    /// Halt everything and reset to round one.
    ///
    /// `finished == false` is a user abort (back to Idle), `true` marks natural
    /// completion. Either way a workout that is already at rest is left alone,
    /// so Finished is never reached without the completion cue.
    pub fn stop(&mut self, finished: bool) {
        if self.session.state.is_at_rest() {
            return;
        }
        let state = if finished {
            WorkoutState::Finished
        } else {
            WorkoutState::Idle
        };
        self.halt(state);
    }

    fn halt(&mut self, state: WorkoutState) {
        self.timers.cancel_all();
        self.collaborators.wake_lock.release();
        self.session.reset(&self.config);
        log::info!("workout stopped ({state})");
        self.set_state(state);
    }

    /// Deliver a fired timer. Returns false when the event is stale and was dropped.
    pub fn handle_timer(&mut self, kind: TimerKind, id: TimerId) -> bool {
        if !self.timers.is_current(kind, id) || self.session.state != WorkoutState::Running {
            log::trace!("dropping stale {kind} event {id:?}");
            return false;
        }
        match kind {
            TimerKind::PhaseTick => self.on_tick(),
            TimerKind::ComboCadence => self.on_combo_due(),
        }
        true
    }

    /// Fire whatever timer of `kind` is armed right now, as if its period elapsed.
    pub fn fire(&mut self, kind: TimerKind) -> bool {
        match self.timers.get(kind) {
            Some(TimerSpec { id, .. }) => self.handle_timer(kind, id),
            None => false,
        }
    }

    fn on_tick(&mut self) {
        let remaining = self.session.seconds_remaining.saturating_sub(1);
        if remaining == 0 {
            self.end_phase();
            return;
        }
        self.session.seconds_remaining = remaining;

        if remaining <= WARNING_WINDOW {
            self.play(|s| s.play_warning_cue());
            self.emit(Cue::CountdownWarning(remaining));
            if remaining <= 3 {
                self.say(&remaining.to_string());
            } else if remaining == WARNING_WINDOW {
                self.say("10 seconds");
            }
        }
    }

    fn end_phase(&mut self) {
        // a rest can outlive the last round when rounds were cut while paused
        if self.session.current_round >= self.config.num_rounds {
            self.finish();
            return;
        }
        match self.session.phase {
            Phase::Work if self.config.rest_duration_secs > 0 => self.enter_rest(),
            Phase::Work | Phase::Rest => self.next_round(),
        }
    }

    fn enter_rest(&mut self) {
        log::info!("rest after round {}", self.session.current_round);
        self.timers.cancel(TimerKind::ComboCadence);
        self.session.phase = Phase::Rest;
        self.session.seconds_remaining = self.config.rest_duration_secs;
        self.play(|s| s.play_end_cue());
        self.say("Rest!");
        self.emit(Cue::PhaseChanged {
            phase: Phase::Rest,
            round: self.session.current_round,
        });
    }

    fn next_round(&mut self) {
        self.session.current_round += 1;
        self.session.phase = Phase::Work;
        self.session.seconds_remaining = self.config.round_duration_secs;
        let round = self.session.current_round;
        log::info!("round {round} of {}", self.config.num_rounds);

        self.play(|s| s.play_start_cue());
        self.say(&format!("Round {round}"));
        self.emit(Cue::RoundAdvanced { round });
        self.emit(Cue::PhaseChanged {
            phase: Phase::Work,
            round,
        });
        self.arm_cadence(ROUND_LEAD_IN);
    }

    fn finish(&mut self) {
        log::info!("workout complete after {} rounds", self.config.num_rounds);
        self.timers.cancel_all();
        self.play(|s| s.play_end_cue());
        self.say("Workout Complete! Great job!");
        self.emit(Cue::WorkoutFinished);
        self.halt(WorkoutState::Finished);
    }

    fn on_combo_due(&mut self) {
        if self.session.phase != Phase::Work {
            return;
        }
        let combo = self
            .generator
            .generate(self.session.last_punch_side, &mut self.rng);
        self.session.last_punch_side = combo.last_side;
        log::debug!("combo {:?}", combo.ids());
        self.say(&combo.spoken_text());
        self.emit(Cue::ComboReady(combo));
    }

    fn arm_cadence(&mut self, lead_in: Duration) {
        self.timers.arm(
            TimerKind::ComboCadence,
            lead_in,
            self.config.combo_interval(),
        );
    }

    fn set_state(&mut self, state: WorkoutState) {
        self.session.state = state;
        self.emit(Cue::StateChanged(state));
    }

    fn misuse(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            operation,
            state: self.session.state,
        }
    }

    fn emit(&mut self, cue: Cue) {
        self.collaborators.cues.emit(cue);
    }

    fn say(&mut self, text: &str) {
        if self.muted {
            return;
        }
        let volume = f32::from(self.volume) / 100.0;
        self.collaborators
            .speech
            .announce(text, self.config.voice, volume);
    }

    fn play(&mut self, cue: impl FnOnce(&mut dyn crate::cues::Sound)) {
        if !self.muted {
            cue(self.collaborators.sound.as_mut());
        }
    }
}
