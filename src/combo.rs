use itertools::Itertools;
use rand::Rng;

use crate::config::{Level, WorkoutConfig};
use crate::error::ConfigError;
use crate::moves::{MoveDefinition, Side};

const BASE_LENGTH: [usize; 3] = [1, 4, 6];
const LENGTH_SPREAD: [usize; 3] = [3, 2, 3];

/// Chance that a same-side punch survives at medium difficulty
const SAME_SIDE_KEEP: f64 = 0.3;
/// Chance that a non-punch move survives at medium complexity
const NON_PUNCH_KEEP: f64 = 0.2;

/// One called-out training instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    pub moves: Vec<&'static MoveDefinition>,
    /// Last Left/Right thrown, to be fed into the next generation
    pub last_side: Option<Side>,
}

impl Combo {
    pub fn ids(&self) -> Vec<&'static str> {
        self.moves.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn spoken_text(&self) -> String {
        self.moves.iter().map(|m| m.text).join(" ")
    }

    pub fn display_text(&self) -> String {
        self.moves.iter().map(|m| m.text).join(", ")
    }
}

/// Builds combos from the moves a workout config allows.
///
/// The eligibility pool is computed once; every call to [`ComboGenerator::generate`]
/// then applies the per-position difficulty and complexity filters on top of it.
#[derive(Debug, Clone)]
pub struct ComboGenerator {
    pool: Vec<&'static MoveDefinition>,
    length: Level,
    difficulty: Level,
    complexity: Level,
}

impl ComboGenerator {
    pub fn new(config: &WorkoutConfig) -> Result<Self, ConfigError> {
        let pool = config.eligible_moves();
        if pool.is_empty() {
            return Err(ConfigError::EmptyMovePool);
        }
        Ok(Self {
            pool,
            length: config.combo_length,
            difficulty: config.combo_difficulty,
            complexity: config.move_complexity,
        })
    }

    pub fn pool(&self) -> &[&'static MoveDefinition] {
        &self.pool
    }

    pub fn generate<R: Rng + ?Sized>(&self, last_side: Option<Side>, rng: &mut R) -> Combo {
        let length = self.pick_length(rng);
        let mut running_side = last_side;
        let mut moves = Vec::with_capacity(length);

        for position in 0..length {
            let candidates = self.candidates(position, running_side, rng);
            let chosen = weighted_pick(&candidates, rng);
            if chosen.side.is_hand() {
                running_side = Some(chosen.side);
            }
            moves.push(chosen);
        }

        Combo {
            moves,
            last_side: running_side,
        }
    }

    fn pick_length<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let level = self.length.index();
        BASE_LENGTH[level] + rng.gen_range(0..LENGTH_SPREAD[level])
    }

    /// Pool for a single position; never empty since every eligible pool holds
    /// punches and the filters only starve non-punch moves or one side's punches.
    fn candidates<R: Rng + ?Sized>(
        &self,
        position: usize,
        running_side: Option<Side>,
        rng: &mut R,
    ) -> Vec<&'static MoveDefinition> {
        let mut candidates = self.pool.clone();

        if let Some(side) = running_side.filter(|_| position > 0) {
            candidates.retain(|m| {
                if !m.is_punch() || m.side != side {
                    return true;
                }
                match self.difficulty {
                    Level::Low => false,
                    Level::Medium => rng.gen_bool(SAME_SIDE_KEEP),
                    Level::High => true,
                }
            });
        }

        candidates.retain(|m| {
            if m.is_punch() {
                return true;
            }
            match self.complexity {
                Level::Low => false,
                Level::Medium => rng.gen_bool(NON_PUNCH_KEEP),
                Level::High => true,
            }
        });

        if candidates.is_empty() {
            log::debug!("move filters starved position {position}, falling back to punches");
            candidates = self.pool.iter().copied().filter(|m| m.is_punch()).collect();
        }
        debug_assert!(!candidates.is_empty(), "eligible pool without punches");
        candidates
    }
}

/// Cumulative-weight draw with a uniform pick as the safety net.
fn weighted_pick<R: Rng + ?Sized>(
    candidates: &[&'static MoveDefinition],
    rng: &mut R,
) -> &'static MoveDefinition {
    let total: u32 = candidates.iter().map(|m| m.weight).sum();
    let mut threshold = rng.gen::<f64>() * total as f64;

    for &candidate in candidates {
        threshold -= candidate.weight as f64;
        if threshold < 0.0 {
            return candidate;
        }
    }

    candidates[rng.gen_range(0..candidates.len())]
}

/// One-shot convenience over [`ComboGenerator`].
pub fn generate_combo<R: Rng + ?Sized>(
    config: &WorkoutConfig,
    last_side: Option<Side>,
    rng: &mut R,
) -> Result<Combo, ConfigError> {
    Ok(ComboGenerator::new(config)?.generate(last_side, rng))
}

/// A chain of combos where each call continues from the previous one's last side.
pub fn preview_combos<R: Rng + ?Sized>(
    config: &WorkoutConfig,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Combo>, ConfigError> {
    let generator = ComboGenerator::new(config)?;
    let mut last_side = None;
    let mut combos = Vec::with_capacity(count);
    for _ in 0..count {
        let combo = generator.generate(last_side, rng);
        last_side = combo.last_side;
        combos.push(combo);
    }
    Ok(combos)
}
