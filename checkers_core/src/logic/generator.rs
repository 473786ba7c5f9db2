use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, PieceKind};

const DIAGONALS: [(i32, i32); 4] = [(-1, 1), (1, 1), (-1, -1), (1, -1)];

/// Legal moves of one side, split by kind. When `captures` is non-empty
/// `simples` is always empty: captures are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSet {
    pub captures: Vec<Move>,
    pub simples: Vec<Move>,
}

impl MoveSet {
    pub fn has_captures(&self) -> bool {
        !self.captures.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty() && self.simples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.captures.len() + self.simples.len()
    }

    /// The moves the side may actually play.
    pub fn legal(&self) -> &[Move] {
        if self.captures.is_empty() {
            &self.simples
        } else {
            &self.captures
        }
    }

    pub fn into_legal(self) -> Vec<Move> {
        if self.captures.is_empty() {
            self.simples
        } else {
            self.captures
        }
    }
}

pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    pub fn enumerate_moves(&self, board: &Board, turn: Color) -> MoveSet {
        let mut set = MoveSet::default();

        for (from, piece) in board.pieces() {
            if piece.color != turn {
                continue;
            }
            match piece.kind {
                PieceKind::Man => {
                    self.gen_man_moves(board, from, turn, &mut set.captures, Some(&mut set.simples));
                }
                PieceKind::King => {
                    self.gen_king_moves(board, from, turn, &mut set.captures, Some(&mut set.simples));
                }
            }
        }

        if !set.captures.is_empty() {
            set.simples.clear();
        }
        set
    }

    /// Moves `turn` must choose from: captures if any exist, otherwise simple moves.
    pub fn legal_moves(&self, board: &Board, turn: Color) -> Vec<Move> {
        self.enumerate_moves(board, turn).into_legal()
    }

    /// Captures available to the piece standing on `at`, used to continue a
    /// capture chain after a landing. Empty if the cell does not hold a piece
    /// of `turn`.
    pub fn try_chop(&self, board: &Board, turn: Color, at: BoardCoordinate) -> Vec<Move> {
        let mut captures = Vec::new();
        if let Some(piece) = board.get_piece(at) {
            if piece.color == turn {
                match piece.kind {
                    PieceKind::Man => self.gen_man_moves(board, at, turn, &mut captures, None),
                    PieceKind::King => self.gen_king_moves(board, at, turn, &mut captures, None),
                }
            }
        }
        captures
    }

    /// Checks if `turn` has at least one legal move, stopping at the first piece that can move.
    pub fn has_legal_moves(&self, board: &Board, turn: Color) -> bool {
        let mut captures = Vec::new();
        let mut simples = Vec::new();
        for (from, piece) in board.pieces() {
            if piece.color != turn {
                continue;
            }
            match piece.kind {
                PieceKind::Man => {
                    self.gen_man_moves(board, from, turn, &mut captures, Some(&mut simples));
                }
                PieceKind::King => {
                    self.gen_king_moves(board, from, turn, &mut captures, Some(&mut simples));
                }
            }
            if !captures.is_empty() || !simples.is_empty() {
                return true;
            }
        }
        false
    }

    fn is_rival(board: &Board, turn: Color, pos: BoardCoordinate) -> bool {
        board.get_piece(pos).is_some_and(|p| p.color != turn)
    }

    /// Men step forward only, but capture in all four diagonal directions.
    fn gen_man_moves(
        &self,
        board: &Board,
        from: BoardCoordinate,
        turn: Color,
        captures: &mut Vec<Move>,
        mut simples: Option<&mut Vec<Move>>,
    ) {
        let forward = board.orientation.forward(turn);

        for &(dr, dc) in &DIAGONALS {
            let Some(adjacent) = from.offset(dr, dc) else {
                continue;
            };

            if Self::is_rival(board, turn, adjacent) {
                if let Some(landing) = from.offset(2 * dr, 2 * dc) {
                    if board.is_empty(landing) {
                        captures.push(Move::capture(from, 2 * dr, 2 * dc, adjacent));
                    }
                }
            } else if dc == forward && board.is_empty(adjacent) {
                if let Some(list) = simples.as_deref_mut() {
                    list.push(Move::simple(from, dr, dc));
                }
            }
        }
    }

    /// Kings slide any distance. A ray may pass over exactly one rival piece;
    /// every empty cell behind it is a capture landing. A second piece, a
    /// friendly piece, or the edge ends the ray.
    fn gen_king_moves(
        &self,
        board: &Board,
        from: BoardCoordinate,
        turn: Color,
        captures: &mut Vec<Move>,
        mut simples: Option<&mut Vec<Move>>,
    ) {
        for &(dr, dc) in &DIAGONALS {
            let mut jumped: Option<BoardCoordinate> = None;
            let mut step = 1;

            while let Some(cell) = from.offset(step * dr, step * dc) {
                match board.get_piece(cell) {
                    None => match jumped {
                        Some(victim) => {
                            captures.push(Move::capture(from, step * dr, step * dc, victim));
                        }
                        None => {
                            if let Some(list) = simples.as_deref_mut() {
                                list.push(Move::simple(from, step * dr, step * dc));
                            }
                        }
                    },
                    Some(piece) if piece.color != turn && jumped.is_none() => {
                        jumped = Some(cell);
                    }
                    Some(_) => break,
                }
                step += 1;
            }
        }
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}
