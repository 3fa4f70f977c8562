use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::sync::mpsc::{self, Receiver};

use crate::collaborators::{
    CommandSpeech, InhibitWakeLock, LogSpeech, NoopWakeLock, SilentSound, TerminalBell,
};
use crate::combo::{preview_combos, Combo};
use crate::config::{Settings, WorkoutConfig};
use crate::confetti::Confetti;
use crate::cues::{Collaborators, Cue, Sound, Speech, WakeLock};
use crate::engine::WorkoutEngine;
use crate::error::ConfigError;
use crate::runtime::FRAME_RATE_MS;
use crate::session::{Phase, WorkoutState};
use crate::timer::{TimerId, TimerKind};

pub const PREVIEW_COUNT: usize = 10;
const VOLUME_STEP: u8 = 5;
const ROUND_STEP_SECS: u32 = 30;
const REST_STEP_SECS: u32 = 15;

#[derive(Debug, Clone, PartialEq)]
pub enum AppScreen {
    Workout,
    Preview(Vec<Combo>),
    ConfirmStop,
}

/// The speech, sound and wake-lock backends for a run
pub struct Devices {
    pub speech: Box<dyn Speech>,
    pub sound: Box<dyn Sound>,
    pub wake_lock: Box<dyn WakeLock>,
}

impl Devices {
    pub fn quiet() -> Self {
        Self {
            speech: Box::new(LogSpeech),
            sound: Box::new(SilentSound),
            wake_lock: Box::new(NoopWakeLock),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let speech: Box<dyn Speech> = match settings.speech_command.as_deref() {
            Some(template) => match CommandSpeech::from_template(template) {
                Some(cmd) => Box::new(cmd),
                None => {
                    log::warn!("unusable speech command {template:?}, logging announcements instead");
                    Box::new(LogSpeech)
                }
            },
            None => Box::new(LogSpeech),
        };
        let wake_lock: Box<dyn WakeLock> = if settings.keep_awake {
            Box::new(InhibitWakeLock::new())
        } else {
            Box::new(NoopWakeLock)
        };
        Self {
            speech,
            sound: Box::new(TerminalBell::new(io::stdout())),
            wake_lock,
        }
    }
}

pub struct App {
    engine: WorkoutEngine<StdRng>,
    settings: Settings,
    cues: Receiver<Cue>,
    pub callout: String,
    pub screen: AppScreen,
    pub confetti: Confetti,
    rng: StdRng,
    should_quit: bool,
}

impl App {
    pub fn new(settings: Settings, devices: Devices, seed: Option<u64>) -> Result<Self, ConfigError> {
        let (tx, cues) = mpsc::channel();
        let collaborators = Collaborators {
            speech: devices.speech,
            sound: devices.sound,
            wake_lock: devices.wake_lock,
            cues: Box::new(tx),
        };
        let (engine_rng, rng) = match seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_entropy(), StdRng::from_entropy()),
        };
        let mut engine = WorkoutEngine::new(settings.workout.clone(), engine_rng, collaborators)?;
        engine.set_muted(settings.muted);
        engine.set_volume(settings.volume);

        Ok(Self {
            engine,
            settings,
            cues,
            callout: String::new(),
            screen: AppScreen::Workout,
            confetti: Confetti::new(),
            rng,
            should_quit: false,
        })
    }

    pub fn engine(&self) -> &WorkoutEngine<StdRng> {
        &self.engine
    }

    pub fn config(&self) -> &WorkoutConfig {
        self.engine.config()
    }

    /// Current settings including any edits made in the UI
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn on_timer(&mut self, kind: TimerKind, id: TimerId) {
        self.engine.handle_timer(kind, id);
    }

    pub fn on_frame(&mut self) {
        self.confetti.update(FRAME_RATE_MS as f64 / 1000.0);
    }

    /// Apply queued engine cues to what is on screen.
    pub fn drain_cues(&mut self, width: u16, height: u16) {
        while let Ok(cue) = self.cues.try_recv() {
            match cue {
                Cue::ComboReady(combo) => self.callout = combo.display_text(),
                Cue::RoundAdvanced { round } => self.callout = format!("Round {round}"),
                Cue::PhaseChanged {
                    phase: Phase::Rest, ..
                } => self.callout = "REST!".to_string(),
                Cue::StateChanged(WorkoutState::Paused) => self.callout = "PAUSED".to_string(),
                Cue::StateChanged(WorkoutState::Idle) => self.callout.clear(),
                Cue::WorkoutFinished => {
                    self.callout = "WORKOUT COMPLETE!".to_string();
                    self.confetti.start(width, height, &mut self.rng);
                }
                Cue::PhaseChanged { .. } | Cue::StateChanged(_) | Cue::CountdownWarning(_) => {}
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            AppScreen::Preview(_) => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('p')
                ) {
                    self.screen = AppScreen::Workout;
                }
            }
            AppScreen::ConfirmStop => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.engine.stop(false);
                    self.screen = AppScreen::Workout;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.screen = AppScreen::Workout;
                }
                _ => {}
            },
            AppScreen::Workout => self.on_workout_key(key.code),
        }
    }

    fn on_workout_key(&mut self, code: KeyCode) {
        let state = self.engine.state();
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_running(),
            KeyCode::Char('s') if !state.is_at_rest() => self.screen = AppScreen::ConfirmStop,
            KeyCode::Char('p') if state.is_at_rest() => self.open_preview(),
            KeyCode::Char('m') => {
                self.settings.muted = !self.settings.muted;
                self.engine.set_muted(self.settings.muted);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.set_volume(self.settings.volume.saturating_add(VOLUME_STEP))
            }
            KeyCode::Char('-') => self.set_volume(self.settings.volume.saturating_sub(VOLUME_STEP)),
            KeyCode::Char(c) if state != WorkoutState::Running => self.edit_config_key(c),
            _ => {}
        }
    }

    fn toggle_running(&mut self) {
        let result = match self.engine.state() {
            WorkoutState::Idle | WorkoutState::Finished => {
                self.confetti = Confetti::new();
                self.engine.start()
            }
            WorkoutState::Running => self.engine.pause(),
            WorkoutState::Paused => self.engine.resume(),
        };
        if let Err(e) = result {
            log::error!("{e}");
        }
    }

    fn open_preview(&mut self) {
        match preview_combos(self.engine.config(), PREVIEW_COUNT, &mut self.rng) {
            Ok(combos) => self.screen = AppScreen::Preview(combos),
            Err(e) => log::error!("preview failed: {e}"),
        }
    }

    fn set_volume(&mut self, volume: u8) {
        self.settings.volume = volume.min(100);
        self.engine.set_volume(self.settings.volume);
    }

    fn edit_config_key(&mut self, c: char) {
        let mut cfg = self.engine.config().clone();
        match c {
            'r' => cfg.num_rounds = cfg.num_rounds.saturating_add(1),
            'R' => cfg.num_rounds = cfg.num_rounds.saturating_sub(1).max(1),
            'd' => cfg.round_duration_secs = cfg.round_duration_secs.saturating_add(ROUND_STEP_SECS),
            'D' => {
                cfg.round_duration_secs = cfg
                    .round_duration_secs
                    .saturating_sub(ROUND_STEP_SECS)
                    .max(ROUND_STEP_SECS)
            }
            'e' => cfg.rest_duration_secs = cfg.rest_duration_secs.saturating_add(REST_STEP_SECS),
            'E' => cfg.rest_duration_secs = cfg.rest_duration_secs.saturating_sub(REST_STEP_SECS),
            'l' => cfg.combo_length = cfg.combo_length.next(),
            'c' => cfg.combo_difficulty = cfg.combo_difficulty.next(),
            'x' => cfg.move_complexity = cfg.move_complexity.next(),
            'v' => cfg.punch_variety = cfg.punch_variety.next(),
            'i' => cfg.moves_included = cfg.moves_included.next(),
            't' => cfg.combo_intensity = cfg.combo_intensity.next(),
            'o' => cfg.training_mode = cfg.training_mode.next(),
            'k' => cfg.voice = cfg.voice.next(),
            _ => return,
        }
        match self.engine.update_config(cfg.clone()) {
            Ok(()) => self.settings.workout = cfg,
            Err(e) => log::warn!("config change rejected: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;

    fn app() -> App {
        let settings = Settings {
            workout: WorkoutConfig {
                round_duration_secs: 3,
                rest_duration_secs: 2,
                num_rounds: 2,
                ..WorkoutConfig::default()
            },
            ..Settings::default()
        };
        App::new(settings, Devices::quiet(), Some(5)).unwrap()
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn fire(app: &mut App, kind: TimerKind) {
        let id = app.engine().timers().get(kind).unwrap().id;
        app.on_timer(kind, id);
        app.drain_cues(80, 24);
    }

    #[test]
    fn test_space_cycles_start_pause_resume() {
        let mut app = app();
        app.on_key(key(' '));
        app.drain_cues(80, 24);
        assert_eq!(app.engine().state(), WorkoutState::Running);
        assert_eq!(app.callout, "Round 1");

        app.on_key(key(' '));
        app.drain_cues(80, 24);
        assert_eq!(app.engine().state(), WorkoutState::Paused);
        assert_eq!(app.callout, "PAUSED");

        app.on_key(key(' '));
        assert_eq!(app.engine().state(), WorkoutState::Running);
    }

    #[test]
    fn test_combo_cue_updates_callout() {
        let mut app = app();
        app.on_key(key(' '));
        fire(&mut app, TimerKind::ComboCadence);
        assert!(!app.callout.is_empty());
        assert!(!app.callout.starts_with("Round"));
    }

    #[test]
    fn test_rest_and_finish_callouts() {
        let mut app = app();
        app.on_key(key(' '));
        for _ in 0..3 {
            fire(&mut app, TimerKind::PhaseTick);
        }
        assert_eq!(app.callout, "REST!");
        for _ in 0..2 {
            fire(&mut app, TimerKind::PhaseTick);
        }
        assert_eq!(app.callout, "Round 2");
        for _ in 0..3 {
            fire(&mut app, TimerKind::PhaseTick);
        }
        assert_eq!(app.engine().state(), WorkoutState::Finished);
        assert_eq!(app.callout, "WORKOUT COMPLETE!");
        assert!(app.confetti.is_active);
    }

    #[test]
    fn test_stop_requires_confirmation() {
        let mut app = app();
        app.on_key(key(' '));
        app.on_key(key('s'));
        assert_eq!(app.screen, AppScreen::ConfirmStop);
        app.on_key(key('n'));
        assert_eq!(app.screen, AppScreen::Workout);
        assert_eq!(app.engine().state(), WorkoutState::Running);

        app.on_key(key('s'));
        app.on_key(key('y'));
        app.drain_cues(80, 24);
        assert_eq!(app.engine().state(), WorkoutState::Idle);
        assert!(app.callout.is_empty());
    }

    #[test]
    fn test_preview_only_when_at_rest() {
        let mut app = app();
        app.on_key(key('p'));
        match &app.screen {
            AppScreen::Preview(combos) => assert_eq!(combos.len(), PREVIEW_COUNT),
            other => panic!("expected preview, got {other:?}"),
        }
        app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.screen, AppScreen::Workout);

        app.on_key(key(' '));
        app.on_key(key('p'));
        assert_eq!(app.screen, AppScreen::Workout);
    }

    #[test]
    fn test_config_keys_only_apply_when_not_running() {
        let mut app = app();
        app.on_key(key('r'));
        app.on_key(key('l'));
        assert_eq!(app.config().num_rounds, 3);
        assert_eq!(app.config().combo_length, Level::High);
        assert_eq!(app.settings().workout.num_rounds, 3);

        app.on_key(key(' '));
        app.on_key(key('r'));
        assert_eq!(app.config().num_rounds, 3);
    }

    #[test]
    fn test_round_duration_never_drops_to_zero() {
        let mut app = app();
        app.on_key(key('D'));
        assert_eq!(app.config().round_duration_secs, ROUND_STEP_SECS);
        app.on_key(key('R'));
        app.on_key(key('R'));
        assert_eq!(app.config().num_rounds, 1);
    }

    #[test]
    fn test_volume_and_mute_keys() {
        let mut app = app();
        for _ in 0..10 {
            app.on_key(key('+'));
        }
        assert_eq!(app.settings().volume, 100);
        assert_eq!(app.engine().volume(), 100);
        app.on_key(key('-'));
        assert_eq!(app.settings().volume, 95);
        app.on_key(key('m'));
        assert!(app.settings().muted);
        assert!(app.engine().is_muted());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());

        let mut app = self::app();
        app.on_key(key('q'));
        assert!(app.should_quit());
    }
}
