use crate::engine::Move;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::ops::Range;

pub const BOARD_SIZE: usize = 8;
pub const EMPTY: i8 = -1;
pub const PIECES_PER_SIDE: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn man(color: Color) -> Self {
        Self {
            kind: PieceKind::Man,
            color,
        }
    }

    pub const fn king(color: Color) -> Self {
        Self {
            kind: PieceKind::King,
            color,
        }
    }

    pub const fn is_king(self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    #[must_use]
    pub const fn crowned(self) -> Self {
        Self::king(self.color)
    }

    /// Cell value in the canonical grid encoding: side index, plus 2 for a king.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn encode(self) -> i8 {
        let base = self.color.index() as i8;
        match self.kind {
            PieceKind::Man => base,
            PieceKind::King => base + 2,
        }
    }

    pub const fn decode(value: i8) -> Option<Self> {
        match value {
            0 => Some(Self::man(Color::White)),
            1 => Some(Self::man(Color::Black)),
            2 => Some(Self::king(Color::White)),
            3 => Some(Self::king(Color::Black)),
            _ => None,
        }
    }

    const fn to_char(self) -> char {
        match (self.kind, self.color) {
            (PieceKind::Man, Color::White) => 'w',
            (PieceKind::Man, Color::Black) => 'b',
            (PieceKind::King, Color::White) => 'W',
            (PieceKind::King, Color::Black) => 'B',
        }
    }

    const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'w' => Some(Self::man(Color::White)),
            'b' => Some(Self::man(Color::Black)),
            'W' => Some(Self::king(Color::White)),
            'B' => Some(Self::king(Color::Black)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardCoordinate {
    pub row: usize,
    pub col: usize,
}

impl BoardCoordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    #[must_use]
    pub fn from_signed(row: i32, col: i32) -> Option<Self> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        Self::new(row, col)
    }

    /// Cell reached by stepping `(dr, dc)` from here, if it is still on the board.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn offset(self, dr: i32, dc: i32) -> Option<Self> {
        Self::from_signed(self.row as i32 + dr, self.col as i32 + dc)
    }

    pub const fn index(self) -> usize {
        self.row * BOARD_SIZE + self.col
    }
}

/// Which edge each side starts from. Forward motion runs along the column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// White starts on columns 0..3 and promotes on column 7.
    #[default]
    Standard,
    /// White starts on columns 5..8 and promotes on column 0.
    Flipped,
}

impl Orientation {
    /// Column step of a forward move for `color`: `+1` or `-1`.
    pub const fn forward(self, color: Color) -> i32 {
        match (self, color) {
            (Self::Standard, Color::White) | (Self::Flipped, Color::Black) => 1,
            _ => -1,
        }
    }

    pub const fn back_rank(self, color: Color) -> usize {
        if self.forward(color) > 0 {
            BOARD_SIZE - 1
        } else {
            0
        }
    }

    pub const fn home_cols(self, color: Color) -> Range<usize> {
        if self.forward(color) > 0 {
            0..3
        } else {
            BOARD_SIZE - 3..BOARD_SIZE
        }
    }

    /// How many columns a piece on `col` has advanced from its own home edge.
    pub const fn advance(self, color: Color, col: usize) -> usize {
        if self.forward(color) > 0 {
            col
        } else {
            BOARD_SIZE - 1 - col
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),
    #[error("row {row} has {len} cells, expected 8")]
    RowLength { row: usize, len: usize },
    #[error("unknown cell character {0:?}")]
    UnknownCell(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    // Canonical encoding, row-major: -1 empty, 0/1 men, 2/3 kings.
    #[serde(with = "BigArray")]
    pub grid: [i8; BOARD_SIZE * BOARD_SIZE],
    pub counts: [u8; 2],
    pub orientation: Orientation,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Starting position in the standard orientation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_orientation(Orientation::Standard)
    }

    #[must_use]
    pub fn with_orientation(orientation: Orientation) -> Self {
        let mut board = Self::empty(orientation);
        board.setup_initial_position();
        board
    }

    #[must_use]
    pub const fn empty(orientation: Orientation) -> Self {
        Self {
            grid: [EMPTY; BOARD_SIZE * BOARD_SIZE],
            counts: [0; 2],
            orientation,
        }
    }

    /// Sets every cell to empty.
    pub fn clear(&mut self) {
        self.grid = [EMPTY; BOARD_SIZE * BOARD_SIZE];
        self.counts = [0; 2];
    }

    /// Places 12 men per side on the dark squares of the three columns
    /// nearest each side's home edge.
    pub fn setup_initial_position(&mut self) {
        self.clear();
        for color in [Color::White, Color::Black] {
            for row in 0..BOARD_SIZE {
                for col in self.orientation.home_cols(color) {
                    if row % 2 == col % 2 {
                        self.add_piece(BoardCoordinate { row, col }, Piece::man(color));
                    }
                }
            }
        }
    }

    #[must_use]
    pub const fn square_index(row: usize, col: usize) -> usize {
        row * BOARD_SIZE + col
    }

    #[must_use]
    pub const fn index_to_coord(sq: usize) -> BoardCoordinate {
        BoardCoordinate {
            row: sq / BOARD_SIZE,
            col: sq % BOARD_SIZE,
        }
    }

    /// Raw cell value. Callers keep `row` and `col` inside `0..8`.
    #[must_use]
    pub const fn cell_at(&self, row: usize, col: usize) -> i8 {
        self.grid[Self::square_index(row, col)]
    }

    /// Raw cell write. Does not touch the piece counts; call
    /// [`Board::recount`] after editing a position this way.
    pub fn set_cell(&mut self, row: usize, col: usize, value: i8) {
        self.grid[Self::square_index(row, col)] = value;
    }

    #[must_use]
    pub const fn get_piece(&self, pos: BoardCoordinate) -> Option<Piece> {
        Piece::decode(self.grid[pos.index()])
    }

    #[must_use]
    pub const fn is_empty(&self, pos: BoardCoordinate) -> bool {
        self.grid[pos.index()] == EMPTY
    }

    pub fn add_piece(&mut self, pos: BoardCoordinate, piece: Piece) {
        self.set_piece(pos, Some(piece));
    }

    /// Replaces the content of a cell, keeping the counts in step.
    pub fn set_piece(&mut self, pos: BoardCoordinate, piece: Option<Piece>) {
        if let Some(old) = self.get_piece(pos) {
            self.counts[old.color.index()] = self.counts[old.color.index()].saturating_sub(1);
        }
        match piece {
            Some(p) => {
                self.grid[pos.index()] = p.encode();
                self.counts[p.color.index()] += 1;
            }
            None => self.grid[pos.index()] = EMPTY,
        }
    }

    pub const fn count(&self, color: Color) -> u8 {
        self.counts[color.index()]
    }

    /// Counts the pieces of each side by scanning the grid.
    #[must_use]
    pub fn calculate_counts(&self) -> [u8; 2] {
        let mut counts = [0; 2];
        for (_, piece) in self.pieces() {
            counts[piece.color.index()] += 1;
        }
        counts
    }

    pub fn recount(&mut self) {
        self.counts = self.calculate_counts();
    }

    /// All occupied cells, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = (BoardCoordinate, Piece)> + '_ {
        self.grid
            .iter()
            .enumerate()
            .filter_map(|(sq, &value)| Piece::decode(value).map(|p| (Self::index_to_coord(sq), p)))
    }

    /// Applies `mv` for `turn`: removes the captured piece, promotes a man that
    /// lands on the back rank, relocates the piece and clears the origin.
    /// Returns `true` when the move crowned a king.
    pub fn apply_move(&mut self, mv: &Move, turn: Color) -> bool {
        let (Some(from), Some(to)) = (mv.source(), mv.target()) else {
            debug_assert!(false, "move leaves the board: {mv}");
            return false;
        };

        // 1. Remove captured piece (if any)
        if let Some(victim_pos) = mv.captured_at() {
            if let Some(victim) = self.get_piece(victim_pos) {
                self.grid[victim_pos.index()] = EMPTY;
                let idx = victim.color.index();
                self.counts[idx] = self.counts[idx].saturating_sub(1);
            }
        }

        let Some(piece) = self.get_piece(from) else {
            debug_assert!(false, "no piece at source of {mv}");
            return false;
        };

        // 2. Promotion
        let promoted = !piece.is_king() && to.col == self.orientation.back_rank(turn);
        let placed = if promoted { piece.crowned() } else { piece };

        // 3. Place at destination, 4. clear origin
        self.grid[to.index()] = placed.encode();
        self.grid[from.index()] = EMPTY;

        promoted
    }

    /// One line per row, `.` for empty cells, `w`/`b` for men, `W`/`B` for kings.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(BOARD_SIZE * (BOARD_SIZE + 1));
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let ch = Piece::decode(self.cell_at(row, col)).map_or('.', Piece::to_char);
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    /// Parses the form produced by [`Board::to_text`]. Whitespace around
    /// rows is ignored and blank lines are skipped.
    pub fn from_text(text: &str, orientation: Orientation) -> Result<Self, BoardParseError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(BoardParseError::RowCount(rows.len()));
        }

        let mut board = Self::empty(orientation);
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().collect();
            if cells.len() != BOARD_SIZE {
                return Err(BoardParseError::RowLength {
                    row,
                    len: cells.len(),
                });
            }
            for (col, &ch) in cells.iter().enumerate() {
                if ch == '.' {
                    continue;
                }
                let piece = Piece::from_char(ch).ok_or(BoardParseError::UnknownCell(ch))?;
                board.add_piece(BoardCoordinate { row, col }, piece);
            }
        }
        Ok(board)
    }
}
