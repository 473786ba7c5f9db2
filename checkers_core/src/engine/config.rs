use crate::logic::eval_constants::{KING_VALUE, MAN_BASE, MATERIAL_WEIGHT, WIN_SCORE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    #[default]
    Minimax,
    MonteCarlo,
    Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: Strategy,

    // Evaluation Parameters
    pub material_weight: i32,
    pub man_base: i32,
    pub king_value: i32,

    // Minimax Parameters
    pub max_depth: u8,
    pub win_score: i32,

    // MCTS Parameters
    pub mcts_iterations: u32,
    pub playout_plies: u32,
    pub exploration: f64,
    pub ucb_epsilon: f64,
    pub seed: Option<u64>,

    // Host Parameters
    pub yield_interval: u32, // Nodes or iterations between cooperative yields, 0 disables
    pub time_limit_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Minimax,

            material_weight: MATERIAL_WEIGHT,
            man_base: MAN_BASE,
            king_value: KING_VALUE,

            max_depth: 4,
            win_score: WIN_SCORE,

            mcts_iterations: 1000,
            playout_plies: 20,
            exploration: 1.41,
            ucb_epsilon: 1e-6,
            seed: None,

            yield_interval: 100,
            time_limit_ms: None,
        }
    }
}

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 8;

#[derive(Deserialize)]
struct EngineConfigJson {
    strategy: Option<Strategy>,

    material_weight: Option<f32>,
    man_base: Option<f32>,
    king_value: Option<f32>,

    max_depth: Option<u8>,
    win_score: Option<i32>,

    mcts_iterations: Option<u32>,
    playout_plies: Option<u32>,
    exploration: Option<f64>,
    ucb_epsilon: Option<f64>,
    seed: Option<u64>,

    yield_interval: Option<u32>,
    time_limit_ms: Option<u64>,
}

impl EngineConfig {
    /// Reads a partial config. Evaluation weights are scale factors applied
    /// to the defaults; every other key is an absolute value.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            strategy: json_config.strategy.unwrap_or(default.strategy),

            material_weight: apply_scale(default.material_weight, json_config.material_weight),
            man_base: apply_scale(default.man_base, json_config.man_base),
            king_value: apply_scale(default.king_value, json_config.king_value),

            max_depth: json_config.max_depth.unwrap_or(default.max_depth),
            win_score: json_config.win_score.unwrap_or(default.win_score),

            mcts_iterations: json_config
                .mcts_iterations
                .unwrap_or(default.mcts_iterations),
            playout_plies: json_config.playout_plies.unwrap_or(default.playout_plies),
            exploration: json_config.exploration.unwrap_or(default.exploration),
            ucb_epsilon: json_config.ucb_epsilon.unwrap_or(default.ucb_epsilon),
            seed: json_config.seed.or(default.seed),

            yield_interval: json_config.yield_interval.unwrap_or(default.yield_interval),
            time_limit_ms: json_config.time_limit_ms.or(default.time_limit_ms),
        })
    }

    /// Maps a difficulty level (clamped to 1..=8) to search effort: the level
    /// is the minimax depth and scales the MCTS iteration budget.
    #[must_use]
    pub fn from_difficulty(strategy: Strategy, level: u8) -> Self {
        let level = level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        Self {
            strategy,
            max_depth: level,
            mcts_iterations: 250 * u32::from(level),
            ..Self::default()
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}
