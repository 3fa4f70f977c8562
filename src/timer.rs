use std::time::Duration;

/// Identifies one arming of a timer; stale ids are how late events get dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    /// one-second phase clock
    PhaseTick,
    /// combo announcements during work
    ComboCadence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSpec {
    pub id: TimerId,
    pub kind: TimerKind,
    /// wait before the first fire
    pub delay: Duration,
    pub period: Duration,
}

/// The two cancellable timer handles owned by a workout session.
///
/// Cancelling only clears a slot, but since every fired event carries the id it
/// was armed with, an event that was already in flight no longer matches and is
/// ignored by [`TimerSlots::is_current`].
#[derive(Debug, Default)]
pub struct TimerSlots {
    next_id: u64,
    tick: Option<TimerSpec>,
    cadence: Option<TimerSpec>,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, kind: TimerKind, delay: Duration, period: Duration) -> TimerId {
        self.next_id += 1;
        let spec = TimerSpec {
            id: TimerId(self.next_id),
            kind,
            delay,
            period,
        };
        *self.slot_mut(kind) = Some(spec);
        spec.id
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        *self.slot_mut(kind) = None;
    }

    pub fn cancel_all(&mut self) {
        self.tick = None;
        self.cadence = None;
    }

    pub fn get(&self, kind: TimerKind) -> Option<TimerSpec> {
        match kind {
            TimerKind::PhaseTick => self.tick,
            TimerKind::ComboCadence => self.cadence,
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_current(&self, kind: TimerKind, id: TimerId) -> bool {
        self.get(kind).is_some_and(|spec| spec.id == id)
    }

    pub fn armed(&self) -> impl Iterator<Item = TimerSpec> + '_ {
        self.tick.iter().chain(self.cadence.iter()).copied()
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerSpec> {
        match kind {
            TimerKind::PhaseTick => &mut self.tick,
            TimerKind::ComboCadence => &mut self.cadence,
        }
    }
}
