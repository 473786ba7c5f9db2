use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, Orientation};
use crate::logic::events::{GameEvent, GameObserver};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{find_legal_move, MoveError};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won(Color), // Winner
}

/// What the side that just moved has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The capturing piece landed on a cell from which it can capture again;
    /// the same side moves once more, with that piece.
    ChainContinues(BoardCoordinate),
    TurnPassed,
    GameOver(Color),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub status: GameStatus,
    pub chain: Option<BoardCoordinate>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::with_orientation(Orientation::Standard)
    }

    #[must_use]
    pub fn with_orientation(orientation: Orientation) -> Self {
        Self::from_board(Board::with_orientation(orientation), Color::White)
    }

    /// Resumes play from an arbitrary position.
    #[must_use]
    pub fn from_board(board: Board, turn: Color) -> Self {
        let mut game = Self {
            board,
            turn,
            status: GameStatus::Playing,
            chain: None,
        };
        game.update_status();
        game
    }

    /// Announces every piece of the current position.
    pub fn start(&self, observer: &mut dyn GameObserver) {
        for (pos, piece) in self.board.pieces() {
            observer.on_event(&GameEvent::PiecePlaced {
                row: pos.row,
                col: pos.col,
                piece,
            });
        }
        info!(
            "game started: {} white, {} black, {:?} to move",
            self.board.count(Color::White),
            self.board.count(Color::Black),
            self.turn
        );
    }

    /// Moves the side to move may choose from: the continuation captures of a
    /// pending chain, otherwise the mandatory-capture-filtered move list.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        let generator = MoveGenerator::new();
        match self.chain {
            Some(at) => generator.try_chop(&self.board, self.turn, at),
            None => generator.legal_moves(&self.board, self.turn),
        }
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }

    pub fn play(
        &mut self,
        mv: Move,
        observer: &mut dyn GameObserver,
    ) -> Result<TurnOutcome, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if let Some(anchor) = self.chain {
            if mv.source() != Some(anchor) {
                return Err(MoveError::MustContinueChain {
                    row: anchor.row,
                    col: anchor.col,
                });
            }
        }
        if !self.legal_moves().contains(&mv) {
            return Err(MoveError::IllegalMove);
        }
        let Some(landing) = mv.target() else {
            return Err(MoveError::OutOfBounds);
        };

        let victim = mv
            .captured_at()
            .and_then(|pos| self.board.get_piece(pos).map(|piece| (pos, piece)));

        let promoted = self.board.apply_move(&mv, self.turn);
        debug!("{:?} plays {mv}", self.turn);

        observer.on_event(&GameEvent::PieceMoved { mv });
        if let Some((pos, piece)) = victim {
            observer.on_event(&GameEvent::PieceCaptured {
                row: pos.row,
                col: pos.col,
                piece,
            });
        }
        if promoted {
            info!("{:?} crowns a king on ({},{})", self.turn, landing.row, landing.col);
            observer.on_event(&GameEvent::Promoted {
                row: landing.row,
                col: landing.col,
                color: self.turn,
            });
        }

        if self.board.count(self.turn.opposite()) == 0 {
            return Ok(self.finish(self.turn, observer));
        }

        if mv.is_capture()
            && !MoveGenerator::new()
                .try_chop(&self.board, self.turn, landing)
                .is_empty()
        {
            self.chain = Some(landing);
            return Ok(TurnOutcome::ChainContinues(landing));
        }

        self.chain = None;
        self.turn = self.turn.opposite();
        debug!("turn passes to {:?}", self.turn);
        observer.on_event(&GameEvent::TurnPassed { to: self.turn });

        if !MoveGenerator::new().has_legal_moves(&self.board, self.turn) {
            return Ok(self.finish(self.turn.opposite(), observer));
        }
        Ok(TurnOutcome::TurnPassed)
    }

    /// Plays the legal move that takes the piece on `from` to `to`.
    pub fn make_move(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
        observer: &mut dyn GameObserver,
    ) -> Result<TurnOutcome, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let mv = find_legal_move(&self.board, self.turn, self.chain, from, to)?;
        self.play(mv, observer)
    }

    fn finish(&mut self, winner: Color, observer: &mut dyn GameObserver) -> TurnOutcome {
        self.status = GameStatus::Won(winner);
        self.chain = None;
        observer.on_event(&GameEvent::GameEnded { winner });
        info!(
            "game over: {winner:?} wins ({} white, {} black left)",
            self.board.count(Color::White),
            self.board.count(Color::Black)
        );
        TurnOutcome::GameOver(winner)
    }

    fn update_status(&mut self) {
        let current_turn = self.turn;
        if self.board.count(current_turn) == 0
            || !MoveGenerator::new().has_legal_moves(&self.board, current_turn)
        {
            self.status = GameStatus::Won(current_turn.opposite());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::Piece;
    use crate::logic::events::EventLog;

    fn at(row: usize, col: usize) -> BoardCoordinate {
        BoardCoordinate::new(row, col).unwrap()
    }

    #[test]
    fn test_start_announces_every_piece() {
        let game = GameState::new();
        let mut log = EventLog::new();
        game.start(&mut log);
        assert_eq!(log.events.len(), 24);
        assert!(log
            .events
            .iter()
            .all(|e| matches!(e, GameEvent::PiecePlaced { .. })));
    }

    #[test]
    fn test_simple_move_passes_turn() {
        let mut game = GameState::new();
        let mut log = EventLog::new();
        let outcome = game.make_move((2, 2), (3, 3), &mut log).unwrap();

        assert_eq!(outcome, TurnOutcome::TurnPassed);
        assert_eq!(game.turn, Color::Black);
        assert!(game.board.get_piece(at(2, 2)).is_none());
        assert_eq!(game.board.get_piece(at(3, 3)), Some(Piece::man(Color::White)));
        assert_eq!(
            log.events,
            vec![
                GameEvent::PieceMoved {
                    mv: Move::simple(at(2, 2), 1, 1)
                },
                GameEvent::TurnPassed { to: Color::Black },
            ]
        );
    }

    #[test]
    fn test_rejected_move_leaves_state_untouched() {
        let mut game = GameState::new();
        let before = game.board.clone();
        let mut log = EventLog::new();
        assert_eq!(
            game.make_move((2, 2), (1, 1), &mut log),
            Err(MoveError::IllegalMove)
        );
        assert_eq!(
            game.play(Move::simple(at(5, 5), -1, -1), &mut log),
            Err(MoveError::IllegalMove)
        );
        assert_eq!(game.board, before);
        assert_eq!(game.turn, Color::White);
        assert!(log.events.is_empty());
    }

    #[test]
    fn test_chain_capture_keeps_turn() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));
        board.add_piece(at(6, 4), Piece::man(Color::Black));
        board.add_piece(at(0, 6), Piece::man(Color::Black));
        let mut game = GameState::from_board(board, Color::White);
        let mut log = EventLog::new();

        let outcome = game.make_move((3, 3), (5, 5), &mut log).unwrap();
        assert_eq!(outcome, TurnOutcome::ChainContinues(at(5, 5)));
        assert_eq!(game.turn, Color::White);
        assert_eq!(game.legal_moves(), vec![Move::capture(at(5, 5), 2, -2, at(6, 4))]);

        let outcome = game.make_move((5, 5), (7, 3), &mut log).unwrap();
        assert_eq!(outcome, TurnOutcome::TurnPassed);
        assert_eq!(game.turn, Color::Black);
        assert_eq!(game.chain, None);
        assert_eq!(game.board.count(Color::Black), 1);
    }

    #[test]
    fn test_chain_rejects_other_piece() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(0, 0), Piece::man(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));
        board.add_piece(at(6, 4), Piece::man(Color::Black));
        let mut game = GameState::from_board(board, Color::White);
        let mut log = EventLog::new();

        game.make_move((3, 3), (5, 5), &mut log).unwrap();
        assert_eq!(
            game.play(Move::simple(at(0, 0), 1, 1), &mut log),
            Err(MoveError::MustContinueChain { row: 5, col: 5 })
        );
    }

    #[test]
    fn test_capturing_last_piece_wins() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));
        let mut game = GameState::from_board(board, Color::White);
        let mut log = EventLog::new();

        let outcome = game.make_move((3, 3), (5, 5), &mut log).unwrap();
        assert_eq!(outcome, TurnOutcome::GameOver(Color::White));
        assert_eq!(game.status, GameStatus::Won(Color::White));
        assert_eq!(
            log.events.last(),
            Some(&GameEvent::GameEnded {
                winner: Color::White
            })
        );
        assert!(game.legal_moves().is_empty());
        assert_eq!(
            game.make_move((5, 5), (6, 6), &mut log),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn test_blocked_side_loses() {
        // The black man on (0,1) is wedged against the edge: its only forward
        // cell holds a white man and the jump would leave the board.
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(0, 1), Piece::man(Color::Black));
        board.add_piece(at(1, 0), Piece::man(Color::White));
        board.add_piece(at(5, 5), Piece::man(Color::White));
        let mut game = GameState::from_board(board, Color::White);
        let mut log = EventLog::new();

        let outcome = game.make_move((5, 5), (6, 6), &mut log).unwrap();
        assert_eq!(outcome, TurnOutcome::GameOver(Color::White));
        assert_eq!(game.status, GameStatus::Won(Color::White));
    }

    #[test]
    fn test_promotion_event() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(2, 6), Piece::man(Color::White));
        board.add_piece(at(7, 1), Piece::man(Color::Black));
        let mut game = GameState::from_board(board, Color::White);
        let mut log = EventLog::new();

        game.make_move((2, 6), (3, 7), &mut log).unwrap();
        assert!(log.events.contains(&GameEvent::Promoted {
            row: 3,
            col: 7,
            color: Color::White
        }));
        assert_eq!(game.board.get_piece(at(3, 7)), Some(Piece::king(Color::White)));
    }

    #[test]
    fn test_closure_observer_counts_events() {
        let mut game = GameState::new();
        let mut moves = 0;
        let mut observer = |event: &GameEvent| {
            if matches!(event, GameEvent::PieceMoved { .. }) {
                moves += 1;
            }
        };
        game.make_move((2, 2), (3, 3), &mut observer).unwrap();
        game.make_move((5, 5), (4, 4), &mut observer).unwrap();
        assert_eq!(moves, 2);
    }
}
