use crate::engine::config::{EngineConfig, Strategy};
use crate::engine::control::CancellationToken;
use crate::engine::mcts::MctsEngine;
use crate::engine::random::RandomEngine;
use crate::engine::search::MinimaxEngine;
use crate::logic::board::{Board, BoardCoordinate, Color};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod config;
pub mod control;
pub mod eval;
pub mod mcts;
pub mod random;
pub mod search;


/// A single hop: start cell, offset to the landing cell, and for captures the
/// jumped cell. Serialized as a list of 4 (simple) or 6 (capture) integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<i32>", try_from = "Vec<i32>")]
pub struct Move {
    pub from_row: u8,
    pub from_col: u8,
    pub row_delta: i8,
    pub col_delta: i8,
    pub captured: Option<(u8, u8)>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveFormatError {
    #[error("a move has 4 or 6 elements, got {0}")]
    Arity(usize),
    #[error("move element {0} is out of range")]
    OutOfRange(i32),
}

#[allow(clippy::cast_possible_truncation)]
impl Move {
    #[must_use]
    pub const fn simple(from: BoardCoordinate, row_delta: i32, col_delta: i32) -> Self {
        Self {
            from_row: from.row as u8,
            from_col: from.col as u8,
            row_delta: row_delta as i8,
            col_delta: col_delta as i8,
            captured: None,
        }
    }

    #[must_use]
    pub const fn capture(
        from: BoardCoordinate,
        row_delta: i32,
        col_delta: i32,
        captured: BoardCoordinate,
    ) -> Self {
        Self {
            from_row: from.row as u8,
            from_col: from.col as u8,
            row_delta: row_delta as i8,
            col_delta: col_delta as i8,
            captured: Some((captured.row as u8, captured.col as u8)),
        }
    }

    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[must_use]
    pub const fn source(&self) -> Option<BoardCoordinate> {
        BoardCoordinate::new(self.from_row as usize, self.from_col as usize)
    }

    #[must_use]
    pub fn target(&self) -> Option<BoardCoordinate> {
        self.source()?
            .offset(i32::from(self.row_delta), i32::from(self.col_delta))
    }

    #[must_use]
    pub fn captured_at(&self) -> Option<BoardCoordinate> {
        self.captured
            .and_then(|(r, c)| BoardCoordinate::new(usize::from(r), usize::from(c)))
    }

    /// Number of diagonal steps between start and landing cell.
    pub const fn distance(&self) -> u8 {
        self.row_delta.unsigned_abs()
    }

    pub fn to_vec(&self) -> Vec<i32> {
        Vec::from(*self)
    }
}

impl From<Move> for Vec<i32> {
    fn from(mv: Move) -> Self {
        let mut out = vec![
            i32::from(mv.from_row),
            i32::from(mv.from_col),
            i32::from(mv.row_delta),
            i32::from(mv.col_delta),
        ];
        if let Some((r, c)) = mv.captured {
            out.push(i32::from(r));
            out.push(i32::from(c));
        }
        out
    }
}

impl TryFrom<Vec<i32>> for Move {
    type Error = MoveFormatError;

    fn try_from(values: Vec<i32>) -> Result<Self, Self::Error> {
        let coord = |v: i32| u8::try_from(v).map_err(|_| MoveFormatError::OutOfRange(v));
        let delta = |v: i32| i8::try_from(v).map_err(|_| MoveFormatError::OutOfRange(v));

        match values.as_slice() {
            &[r, c, dr, dc] => Ok(Self {
                from_row: coord(r)?,
                from_col: coord(c)?,
                row_delta: delta(dr)?,
                col_delta: delta(dc)?,
                captured: None,
            }),
            &[r, c, dr, dc, cr, cc] => Ok(Self {
                from_row: coord(r)?,
                from_col: coord(c)?,
                row_delta: delta(dr)?,
                col_delta: delta(dc)?,
                captured: Some((coord(cr)?, coord(cc)?)),
            }),
            other => Err(MoveFormatError::Arity(other.len())),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})->({},{})",
            self.from_row,
            self.from_col,
            i32::from(self.from_row) + i32::from(self.row_delta),
            i32::from(self.from_col) + i32::from(self.col_delta)
        )?;
        if let Some((r, c)) = self.captured {
            write!(f, "x({r},{c})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u32,
    pub iterations: u32,
    pub time_ms: u64,
    pub cancelled: bool,
}

pub trait Evaluator {
    /// Static score of `board` from `perspective`'s point of view.
    fn evaluate(&self, board: &Board, perspective: Color) -> i32;
}

/// A move-selection strategy for the computer-controlled side.
///
/// `candidates` must be the non-empty list of legal moves for `turn`
/// (the full move list, or the continuation captures of a chain). Searchers
/// never write to `board`; they explore clones.
pub trait Searcher {
    fn select_move(
        &mut self,
        board: &Board,
        turn: Color,
        candidates: &[Move],
        cancel: &CancellationToken,
    ) -> Option<(Move, SearchStats)>;
}

/// Builds the strategy named by `config.strategy`.
pub fn build_searcher(config: Arc<EngineConfig>) -> Box<dyn Searcher + Send> {
    match config.strategy {
        Strategy::Minimax => Box::new(MinimaxEngine::new(config)),
        Strategy::MonteCarlo => Box::new(MctsEngine::new(config)),
        Strategy::Random => Box::new(RandomEngine::new(config)),
    }
}
