use std::io::Write;
use std::process::{Child, Command, Stdio};

use crate::config::Voice;
use crate::cues::{Sound, Speech, WakeLock};

/// Speech that only lands in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeech;

impl Speech for LogSpeech {
    fn announce(&mut self, text: &str, voice: Voice, volume: f32) {
        log::info!("announce [{voice} @ {:.0}%]: {text}", volume * 100.0);
    }
}

/// Runs an external text-to-speech program for each announcement.
///
/// The template is split shell-style; `{voice}` and `{volume}` (0-100) are
/// substituted in every argument and the text is appended as the last one.
/// A new announcement cuts off the one still playing.
#[derive(Debug)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandSpeech {
    pub fn from_template(template: &str) -> Option<Self> {
        let mut parts = shlex::split(template)?.into_iter();
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            current: None,
        })
    }

    pub fn command_for(&self, text: &str, voice: Voice, volume: f32) -> Command {
        let voice = voice.to_string();
        let volume = ((volume.clamp(0.0, 1.0)) * 100.0).round().to_string();
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            cmd.arg(arg.replace("{voice}", &voice).replace("{volume}", &volume));
        }
        cmd.arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    fn interrupt(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Speech for CommandSpeech {
    fn announce(&mut self, text: &str, voice: Voice, volume: f32) {
        self.interrupt();
        match self.command_for(text, voice, volume).spawn() {
            Ok(child) => self.current = Some(child),
            Err(e) => log::warn!("speech command `{}` failed: {}", self.program, e),
        }
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.interrupt();
    }
}

/// Rings the terminal bell: once to warn, twice to end, three times to start.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn ring(&mut self, times: usize) {
        let bells = "\x07".repeat(times);
        if let Err(e) = self
            .out
            .write_all(bells.as_bytes())
            .and_then(|_| self.out.flush())
        {
            log::warn!("terminal bell failed: {e}");
        }
    }
}

impl<W: Write> Sound for TerminalBell<W> {
    fn play_start_cue(&mut self) {
        self.ring(3);
    }

    fn play_end_cue(&mut self) {
        self.ring(2);
    }

    fn play_warning_cue(&mut self) {
        self.ring(1);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSound;

impl Sound for SilentSound {
    fn play_start_cue(&mut self) {}
    fn play_end_cue(&mut self) {}
    fn play_warning_cue(&mut self) {}
}

/// Holds a `systemd-inhibit` child for as long as the lock is wanted
#[derive(Debug, Default)]
pub struct InhibitWakeLock {
    child: Option<Child>,
}

impl InhibitWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.child.is_some()
    }
}

impl WakeLock for InhibitWakeLock {
    fn acquire(&mut self) {
        if self.child.is_some() {
            return;
        }
        let spawned = Command::new("systemd-inhibit")
            .args([
                "--what=idle:sleep",
                "--who=shadowbox",
                "--why=Workout in progress",
                "sleep",
                "infinity",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                log::info!("wake lock acquired");
                self.child = Some(child);
            }
            Err(e) => log::warn!("wake lock request failed: {e}"),
        }
    }

    fn release(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        match child.kill().and_then(|_| child.wait()) {
            Ok(_) => log::info!("wake lock released"),
            Err(e) => log::warn!("wake lock release failed: {e}"),
        }
    }
}

impl Drop for InhibitWakeLock {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}
