use anyhow::{bail, Context};
use checkers_core::engine::config::EngineConfig;
use checkers_core::engine::SearchStats;
use checkers_core::logic::board::{Color, Orientation};
use checkers_core::logic::events::GameEvent;
use checkers_core::logic::game::{GameState, GameStatus, TurnOutcome};
use checkers_core::worker::{Output, SearchWorker};
use log::{debug, info};
use serde::Serialize;

pub struct MatchSettings {
    pub white: EngineConfig,
    pub black: EngineConfig,
    pub orientation: Orientation,
    pub max_turns: usize,
    pub show_board: bool,
}

/// Search effort spent by one side over the whole game.
#[derive(Debug, Default, Serialize)]
pub struct SideTotals {
    pub moves: u32,
    pub nodes: u64,
    pub iterations: u64,
    pub time_ms: u64,
    pub cancelled: u32,
}

impl SideTotals {
    fn record(&mut self, stats: &SearchStats) {
        self.moves += 1;
        self.nodes = self.nodes.saturating_add(u64::from(stats.nodes));
        self.iterations = self.iterations.saturating_add(u64::from(stats.iterations));
        self.time_ms = self.time_ms.saturating_add(stats.time_ms);
        if stats.cancelled {
            self.cancelled += 1;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub winner: Option<Color>,
    pub turns: usize,
    pub white_pieces: u8,
    pub black_pieces: u8,
    pub white: SideTotals,
    pub black: SideTotals,
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PiecePlaced { .. } => {}
        GameEvent::PieceMoved { mv } => debug!("move {mv}"),
        GameEvent::PieceCaptured { row, col, piece } => {
            debug!("{:?} {:?} captured on ({row},{col})", piece.color, piece.kind);
        }
        GameEvent::Promoted { row, col, color } => debug!("{color:?} king on ({row},{col})"),
        GameEvent::TurnPassed { to } => debug!("{to:?} to move"),
        GameEvent::GameEnded { winner } => debug!("{winner:?} wins"),
    }
}

/// Plays one game, asking the search worker for every move of both sides.
pub fn run(settings: &MatchSettings) -> anyhow::Result<MatchSummary> {
    let worker = SearchWorker::spawn().context("starting the search worker")?;
    let mut game = GameState::with_orientation(settings.orientation);
    let mut observer = log_event;
    game.start(&mut observer);
    if settings.show_board {
        println!("{}", game.board.to_text());
    }

    let mut white_totals = SideTotals::default();
    let mut black_totals = SideTotals::default();
    let mut turns = 0;

    while !game.is_over() && turns < settings.max_turns {
        let turn = game.turn;
        let (config, totals) = match turn {
            Color::White => (&settings.white, &mut white_totals),
            Color::Black => (&settings.black, &mut black_totals),
        };

        let candidates = game.legal_moves();
        worker.compute_move(&game.board, turn, &candidates, config)?;
        let mv = match worker.recv()? {
            Output::MoveFound(mv, stats) => {
                totals.record(&stats);
                info!(
                    "{turn:?} ({:?}): {mv} [depth {}, nodes {}, iterations {}, {}ms]",
                    config.strategy, stats.depth, stats.nodes, stats.iterations, stats.time_ms
                );
                mv
            }
            Output::NoMove => bail!("{turn:?} has no move to play"),
        };

        let outcome = game
            .play(mv, &mut observer)
            .with_context(|| format!("{turn:?} chose an illegal move {mv}"))?;
        if !matches!(outcome, TurnOutcome::ChainContinues(_)) {
            turns += 1;
            if settings.show_board {
                println!("Turn {turns}: {turn:?} played {mv}\n{}", game.board.to_text());
            }
        }
    }

    let winner = match game.status {
        GameStatus::Won(color) => Some(color),
        GameStatus::Playing => None,
    };
    info!("match finished after {turns} turns, winner {winner:?}");

    Ok(MatchSummary {
        winner,
        turns,
        white_pieces: game.board.count(Color::White),
        black_pieces: game.board.count(Color::Black),
        white: white_totals,
        black: black_totals,
    })
}
