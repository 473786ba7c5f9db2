use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::{Board, Color, PieceKind};
use std::sync::Arc;

/// Material difference plus a per-piece positional term: men are worth more
/// the further they have advanced, kings carry a flat bonus.
pub struct SimpleEvaluator {
    config: Arc<EngineConfig>,
}

impl SimpleEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn piece_value(&self, board: &Board, color: Color, kind: PieceKind, col: usize) -> i32 {
        match kind {
            PieceKind::Man => {
                self.config.man_base + board.orientation.advance(color, col) as i32
            }
            PieceKind::King => self.config.king_value,
        }
    }
}

impl Evaluator for SimpleEvaluator {
    fn evaluate(&self, board: &Board, perspective: Color) -> i32 {
        let rival = perspective.opposite();

        // 1. Material
        let own = i32::from(board.count(perspective));
        let theirs = i32::from(board.count(rival));
        let mut score = self.config.material_weight * (own - theirs);

        // 2. Position
        for (pos, piece) in board.pieces() {
            let value = self.piece_value(board, piece.color, piece.kind, pos.col);
            if piece.color == perspective {
                score += value;
            } else {
                score -= value;
            }
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{BoardCoordinate, Orientation, Piece};

    fn evaluator() -> SimpleEvaluator {
        SimpleEvaluator::new(Arc::new(EngineConfig::default()))
    }

    fn at(row: usize, col: usize) -> BoardCoordinate {
        BoardCoordinate::new(row, col).unwrap()
    }

    #[test]
    fn test_starting_position_is_balanced() {
        let board = Board::new();
        let eval = evaluator();
        assert_eq!(eval.evaluate(&board, Color::White), 0);
        assert_eq!(eval.evaluate(&board, Color::Black), 0);
    }

    #[test]
    fn test_advancement_rewarded() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 5), Piece::man(Color::White));
        // 5 + 5 columns advanced
        assert_eq!(evaluator().evaluate(&board, Color::White), 10 + 10);
        // Mirrored for the rival
        assert_eq!(evaluator().evaluate(&board, Color::Black), -10 - 10);
    }

    #[test]
    fn test_black_advances_toward_column_zero() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(2, 1), Piece::man(Color::Black));
        // 7 - 1 = 6 columns advanced
        assert_eq!(evaluator().evaluate(&board, Color::Black), 10 + 5 + 6);
    }

    #[test]
    fn test_king_value() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(0, 0), Piece::king(Color::White));
        board.add_piece(at(7, 7), Piece::king(Color::Black));
        board.add_piece(at(6, 6), Piece::king(Color::Black));
        // Material: 1 - 2, kings: 20 - 40
        assert_eq!(evaluator().evaluate(&board, Color::White), -10 - 20);
    }

    #[test]
    fn test_evaluation_is_antisymmetric() {
        let mut board = Board::new();
        board.set_piece(at(0, 0), None);
        board.set_piece(at(3, 5), Some(Piece::king(Color::Black)));
        let eval = evaluator();
        assert_eq!(
            eval.evaluate(&board, Color::White),
            -eval.evaluate(&board, Color::Black)
        );
    }
}
