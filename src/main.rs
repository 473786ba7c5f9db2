use anyhow::Context;
use checkers_core::engine::config::{EngineConfig, Strategy};
use checkers_core::logic::board::Orientation;
use clap::Parser;
use std::path::{Path, PathBuf};

mod app;

use app::MatchSettings;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StrategyArg {
    Minimax,
    Mcts,
    Random,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Minimax => Self::Minimax,
            StrategyArg::Mcts => Self::MonteCarlo,
            StrategyArg::Random => Self::Random,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OrientationArg {
    Standard,
    Flipped,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Standard => Self::Standard,
            OrientationArg::Flipped => Self::Flipped,
        }
    }
}

/// Plays a game of checkers between two computer players.
#[derive(Parser, Debug)]
#[command(name = "checkers")]
struct Cli {
    /// Strategy for White
    #[arg(long, value_enum, default_value = "minimax")]
    white: StrategyArg,

    /// Strategy for Black
    #[arg(long, value_enum, default_value = "mcts")]
    black: StrategyArg,

    /// Difficulty level (1-8): sets search depth and MCTS iterations
    #[arg(short = 'l', long)]
    level: Option<u8>,

    /// Minimax search depth
    #[arg(short = 'd', long)]
    depth: Option<u8>,

    /// MCTS iterations per move
    #[arg(short = 'i', long)]
    iterations: Option<u32>,

    /// RNG seed; Black uses seed + 1
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Wall-clock budget per move, in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// JSON file with engine parameters
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Stop after this many turns and call it a draw
    #[arg(long, default_value_t = 200)]
    max_turns: usize,

    /// Which edge White starts from
    #[arg(long, value_enum, default_value = "standard")]
    orientation: OrientationArg,

    /// Do not print the board after each turn
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,

    /// Print the match summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    EngineConfig::load_from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

impl Cli {
    fn base_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = self
            .config
            .as_deref()
            .map(load_config)
            .transpose()?
            .unwrap_or_default();

        if let Some(level) = self.level {
            let scaled = EngineConfig::from_difficulty(config.strategy, level);
            config.max_depth = scaled.max_depth;
            config.mcts_iterations = scaled.mcts_iterations;
        }
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(iterations) = self.iterations {
            config.mcts_iterations = iterations;
        }
        if self.time_limit_ms.is_some() {
            config.time_limit_ms = self.time_limit_ms;
        }
        Ok(config)
    }

    fn settings(&self) -> anyhow::Result<MatchSettings> {
        let base = self.base_config()?;
        let seed = self.seed.or(base.seed);

        let white = EngineConfig {
            strategy: self.white.into(),
            seed,
            ..base.clone()
        };
        let black = EngineConfig {
            strategy: self.black.into(),
            seed: seed.map(|s| s.wrapping_add(1)),
            ..base
        };

        Ok(MatchSettings {
            white,
            black,
            orientation: self.orientation.into(),
            max_turns: self.max_turns,
            show_board: !self.quiet,
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let summary = app::run(&settings)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let result = summary
            .winner
            .map_or_else(|| "Draw: no winner".to_owned(), |winner| format!("{winner:?} wins"));
        println!("{result} after {} turns", summary.turns);
    }
    Ok(())
}
