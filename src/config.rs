use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::moves::{self, MoveDefinition, MoveGroup};

/// Low / Medium / High setting, indexed 0..=2 by the generator tables
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn index(&self) -> usize {
        match self {
            Level::Low => 0,
            Level::Medium => 1,
            Level::High => 2,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Level::Low => Level::Medium,
            Level::Medium => Level::High,
            Level::High => Level::Low,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum PunchVariety {
    StandardOnly,
    IncludeBody,
    IncludeBodyAndRare,
}

impl PunchVariety {
    pub fn next(&self) -> Self {
        match self {
            PunchVariety::StandardOnly => PunchVariety::IncludeBody,
            PunchVariety::IncludeBody => PunchVariety::IncludeBodyAndRare,
            PunchVariety::IncludeBodyAndRare => PunchVariety::StandardOnly,
        }
    }

    fn allows(&self, m: &MoveDefinition) -> bool {
        match self {
            PunchVariety::StandardOnly => !(m.is_punch() && (m.is_body_shot || m.is_rare())),
            PunchVariety::IncludeBody => !m.is_rare(),
            PunchVariety::IncludeBodyAndRare => true,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum MovesIncluded {
    PunchesOnly,
    PunchesAndDefense,
    All,
}

impl MovesIncluded {
    pub fn next(&self) -> Self {
        match self {
            MovesIncluded::PunchesOnly => MovesIncluded::PunchesAndDefense,
            MovesIncluded::PunchesAndDefense => MovesIncluded::All,
            MovesIncluded::All => MovesIncluded::PunchesOnly,
        }
    }

    fn allows(&self, m: &MoveDefinition) -> bool {
        match self {
            MovesIncluded::PunchesOnly => m.is_punch(),
            MovesIncluded::PunchesAndDefense => m.group != MoveGroup::Footwork,
            MovesIncluded::All => true,
        }
    }
}

/// How often combos are called out during a work phase
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn interval_ms(&self) -> u64 {
        match self {
            Intensity::Low => 4000,
            Intensity::Medium => 2500,
            Intensity::High => 1500,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Intensity::Low => Intensity::Medium,
            Intensity::Medium => Intensity::High,
            Intensity::High => Intensity::Low,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum TrainingMode {
    Shadowboxing,
    HeavyBag,
}

impl TrainingMode {
    pub fn next(&self) -> Self {
        match self {
            TrainingMode::Shadowboxing => TrainingMode::HeavyBag,
            TrainingMode::HeavyBag => TrainingMode::Shadowboxing,
        }
    }
}

/// Voice id handed untouched to the speech backend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum Voice {
    Kore,
    Puck,
    Charon,
    Zephyr,
}

impl Voice {
    pub fn next(&self) -> Self {
        match self {
            Voice::Kore => Voice::Puck,
            Voice::Puck => Voice::Charon,
            Voice::Charon => Voice::Zephyr,
            Voice::Zephyr => Voice::Kore,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutConfig {
    pub round_duration_secs: u32,
    /// zero disables rest phases
    pub rest_duration_secs: u32,
    pub num_rounds: u32,
    pub combo_length: Level,
    pub combo_difficulty: Level,
    pub move_complexity: Level,
    pub punch_variety: PunchVariety,
    pub moves_included: MovesIncluded,
    pub combo_intensity: Intensity,
    pub training_mode: TrainingMode,
    pub voice: Voice,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            round_duration_secs: 3 * 60,
            rest_duration_secs: 60,
            num_rounds: 5,
            combo_length: Level::Medium,
            combo_difficulty: Level::Medium,
            move_complexity: Level::Medium,
            punch_variety: PunchVariety::IncludeBody,
            moves_included: MovesIncluded::All,
            combo_intensity: Intensity::Medium,
            training_mode: TrainingMode::Shadowboxing,
            voice: Voice::Kore,
        }
    }
}

impl WorkoutConfig {
    pub fn combo_interval(&self) -> Duration {
        Duration::from_millis(self.combo_intensity.interval_ms())
    }

    /// Work plus rest for every round, minus the trailing rest nobody takes.
    ///
    /// Summed in `u64`: any `u32` durations and round count fit without overflow.
    pub fn total_workout_secs(&self) -> u64 {
        if self.num_rounds == 0 {
            return 0;
        }
        let cycle = u64::from(self.round_duration_secs) + u64::from(self.rest_duration_secs);
        cycle * u64::from(self.num_rounds) - u64::from(self.rest_duration_secs)
    }

    /// Catalog moves allowed by the variety and inclusion settings, in catalog order.
    pub fn eligible_moves(&self) -> Vec<&'static MoveDefinition> {
        moves::all()
            .iter()
            .filter(|m| self.punch_variety.allows(m) && self.moves_included.allows(m))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.round_duration_secs == 0 {
            return Err(ConfigError::EmptyRound);
        }
        if self.eligible_moves().is_empty() {
            return Err(ConfigError::EmptyMovePool);
        }
        Ok(())
    }
}

/// Everything persisted between runs: the workout plus audio and device preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(flatten)]
    pub workout: WorkoutConfig,
    /// 0..=100
    pub volume: u8,
    pub muted: bool,
    /// external text-to-speech command, e.g. `espeak -v en -a {volume}`
    pub speech_command: Option<String>,
    pub keep_awake: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workout: WorkoutConfig::default(),
            volume: 75,
            muted: false,
            speech_command: None,
            keep_awake: false,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = crate::app_dirs::AppDirs::config_path()
            .unwrap_or_else(|| PathBuf::from("shadowbox_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("ignoring unreadable config {}: {}", self.path.display(), e);
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        }
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let settings = Settings {
            workout: WorkoutConfig {
                round_duration_secs: 120,
                rest_duration_secs: 0,
                num_rounds: 12,
                combo_length: Level::High,
                combo_difficulty: Level::Low,
                move_complexity: Level::High,
                punch_variety: PunchVariety::IncludeBodyAndRare,
                moves_included: MovesIncluded::PunchesAndDefense,
                combo_intensity: Intensity::High,
                training_mode: TrainingMode::HeavyBag,
                voice: Voice::Zephyr,
            },
            volume: 40,
            muted: true,
            speech_command: Some("espeak -a {volume}".into()),
            keep_awake: true,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_or_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Settings::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn intensity_maps_to_fixed_intervals() {
        assert_eq!(Intensity::Low.interval_ms(), 4000);
        assert_eq!(Intensity::Medium.interval_ms(), 2500);
        assert_eq!(Intensity::High.interval_ms(), 1500);

        let cfg = WorkoutConfig {
            combo_intensity: Intensity::High,
            ..WorkoutConfig::default()
        };
        assert_eq!(cfg.combo_interval(), Duration::from_millis(1500));
    }

    #[test]
    fn total_workout_skips_final_rest() {
        let cfg = WorkoutConfig {
            round_duration_secs: 180,
            rest_duration_secs: 60,
            num_rounds: 5,
            ..WorkoutConfig::default()
        };
        assert_eq!(cfg.total_workout_secs(), 5 * 240 - 60);
    }

    #[test]
    fn total_workout_handles_huge_durations() {
        let cfg = WorkoutConfig {
            round_duration_secs: 3_000_000_000,
            rest_duration_secs: 1_000_000_000,
            num_rounds: 2,
            ..WorkoutConfig::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.total_workout_secs(), 7_000_000_000);

        let max = WorkoutConfig {
            round_duration_secs: u32::MAX,
            rest_duration_secs: u32::MAX,
            num_rounds: u32::MAX,
            ..WorkoutConfig::default()
        };
        let expected = 2 * u64::from(u32::MAX) * u64::from(u32::MAX) - u64::from(u32::MAX);
        assert_eq!(max.total_workout_secs(), expected);
    }

    #[test]
    fn standard_only_excludes_body_and_rare() {
        let cfg = WorkoutConfig {
            punch_variety: PunchVariety::StandardOnly,
            moves_included: MovesIncluded::PunchesOnly,
            ..WorkoutConfig::default()
        };
        let ids: Vec<&str> = cfg.eligible_moves().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn include_body_excludes_only_rare() {
        let cfg = WorkoutConfig {
            punch_variety: PunchVariety::IncludeBody,
            moves_included: MovesIncluded::All,
            ..WorkoutConfig::default()
        };
        let pool = cfg.eligible_moves();
        assert!(pool.iter().any(|m| m.is_body_shot));
        assert!(!pool.iter().any(|m| m.is_rare()));
        assert!(pool.iter().any(|m| m.group == MoveGroup::Footwork));
    }

    #[test]
    fn punches_and_defense_drops_footwork() {
        let cfg = WorkoutConfig {
            punch_variety: PunchVariety::IncludeBodyAndRare,
            moves_included: MovesIncluded::PunchesAndDefense,
            ..WorkoutConfig::default()
        };
        let pool = cfg.eligible_moves();
        assert_eq!(pool.len(), 18);
        assert!(pool.iter().all(|m| m.group != MoveGroup::Footwork));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert_eq!(WorkoutConfig::default().validate(), Ok(()));

        let no_rounds = WorkoutConfig {
            num_rounds: 0,
            ..WorkoutConfig::default()
        };
        assert_matches!(no_rounds.validate(), Err(ConfigError::NoRounds));

        let empty_round = WorkoutConfig {
            round_duration_secs: 0,
            ..WorkoutConfig::default()
        };
        assert_matches!(empty_round.validate(), Err(ConfigError::EmptyRound));

        let no_rest = WorkoutConfig {
            rest_duration_secs: 0,
            ..WorkoutConfig::default()
        };
        assert_eq!(no_rest.validate(), Ok(()));
    }

    #[test]
    fn level_cycles() {
        assert_eq!(Level::Low.next(), Level::Medium);
        assert_eq!(Level::High.next(), Level::Low);
        assert_eq!(Level::High.index(), 2);
    }
}
