use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color};
use crate::logic::generator::MoveGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("coordinates are outside the board")]
    OutOfBounds,
    #[error("no piece at the source cell")]
    NoPieceAtSource,
    #[error("the piece at the source cell belongs to the other side")]
    NotYourPiece,
    #[error("a capture is available and must be taken")]
    CaptureRequired,
    #[error("the capture chain must continue from ({row}, {col})")]
    MustContinueChain { row: usize, col: usize },
    #[error("the move is not legal in this position")]
    IllegalMove,
    #[error("the game is already over")]
    GameOver,
}

/// Resolves a request to move the piece on `from` to `to` into one of the
/// legal moves of `turn`. `chain` is the landing cell of an unfinished
/// capture chain, if any; only that piece may move, and only by capturing.
pub fn find_legal_move(
    board: &Board,
    turn: Color,
    chain: Option<BoardCoordinate>,
    from: (usize, usize),
    to: (usize, usize),
) -> Result<Move, MoveError> {
    let from = BoardCoordinate::new(from.0, from.1).ok_or(MoveError::OutOfBounds)?;
    let to = BoardCoordinate::new(to.0, to.1).ok_or(MoveError::OutOfBounds)?;

    if let Some(anchor) = chain {
        if from != anchor {
            return Err(MoveError::MustContinueChain {
                row: anchor.row,
                col: anchor.col,
            });
        }
    }

    let piece = board.get_piece(from).ok_or(MoveError::NoPieceAtSource)?;
    if piece.color != turn {
        return Err(MoveError::NotYourPiece);
    }

    let generator = MoveGenerator::new();
    let (legal, captures_pending) = match chain {
        Some(anchor) => (generator.try_chop(board, turn, anchor), true),
        None => {
            let set = generator.enumerate_moves(board, turn);
            let has_captures = set.has_captures();
            (set.into_legal(), has_captures)
        }
    };

    if let Some(mv) = legal
        .iter()
        .find(|mv| mv.source() == Some(from) && mv.target() == Some(to))
    {
        return Ok(*mv);
    }

    if captures_pending {
        Err(MoveError::CaptureRequired)
    } else {
        Err(MoveError::IllegalMove)
    }
}

/// Checks that `mv` is one of the moves `turn` may play right now.
pub fn is_valid_move(board: &Board, turn: Color, chain: Option<BoardCoordinate>, mv: &Move) -> bool {
    let generator = MoveGenerator::new();
    match chain {
        Some(anchor) => generator.try_chop(board, turn, anchor).contains(mv),
        None => generator.enumerate_moves(board, turn).legal().contains(mv),
    }
}
