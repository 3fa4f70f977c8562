use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crate::combo::Combo;
use crate::config::Voice;
use crate::session::{Phase, WorkoutState};

/// Discrete events the engine hands to whatever renders the workout
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    PhaseChanged { phase: Phase, round: u32 },
    RoundAdvanced { round: u32 },
    ComboReady(Combo),
    CountdownWarning(u32),
    StateChanged(WorkoutState),
    WorkoutFinished,
}

/// Text-to-speech. Must return immediately; slow backends run detached.
pub trait Speech {
    /// `volume` is in 0.0..=1.0
    fn announce(&mut self, text: &str, voice: Voice, volume: f32);
}

pub trait Sound {
    fn play_start_cue(&mut self);
    fn play_end_cue(&mut self);
    fn play_warning_cue(&mut self);
}

/// Keeps the machine awake while a workout runs. Failures stay inside.
pub trait WakeLock {
    fn acquire(&mut self);
    fn release(&mut self);
}

pub trait CueSink {
    fn emit(&mut self, cue: Cue);
}

impl CueSink for Sender<Cue> {
    fn emit(&mut self, cue: Cue) {
        // a dropped receiver just means nobody is watching anymore
        let _ = self.send(cue);
    }
}

/// Shared buffer of emitted cues, handy for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    cues: Arc<Mutex<Vec<Cue>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Cue> {
        match self.cues.lock() {
            Ok(mut cues) => std::mem::take(&mut *cues),
            Err(_) => Vec::new(),
        }
    }

    pub fn snapshot(&self) -> Vec<Cue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CueSink for RecordingSink {
    fn emit(&mut self, cue: Cue) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
    }
}

/// Every outside party the engine talks to
pub struct Collaborators {
    pub speech: Box<dyn Speech>,
    pub sound: Box<dyn Sound>,
    pub wake_lock: Box<dyn WakeLock>,
    pub cues: Box<dyn CueSink>,
}

impl Collaborators {
    /// Log-only speech, no sound, no wake lock; cues go to `cues`.
    pub fn quiet(cues: impl CueSink + 'static) -> Self {
        Self {
            speech: Box::new(crate::collaborators::LogSpeech),
            sound: Box::new(crate::collaborators::SilentSound),
            wake_lock: Box::new(crate::collaborators::NoopWakeLock),
            cues: Box::new(cues),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_recording_sink_take_drains() {
        let sink = RecordingSink::new();
        let mut writer = sink.clone();
        writer.emit(Cue::CountdownWarning(3));
        writer.emit(Cue::WorkoutFinished);
        assert_eq!(sink.snapshot().len(), 2);
        assert_eq!(
            sink.take(),
            vec![Cue::CountdownWarning(3), Cue::WorkoutFinished]
        );
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_sender_sink_ignores_closed_receiver() {
        let (mut tx, rx) = mpsc::channel::<Cue>();
        tx.emit(Cue::RoundAdvanced { round: 2 });
        assert_eq!(rx.recv().unwrap(), Cue::RoundAdvanced { round: 2 });
        drop(rx);
        tx.emit(Cue::WorkoutFinished);
    }
}
