// Material difference is multiplied by this per piece.
pub const MATERIAL_WEIGHT: i32 = 10;

// Positional value of a man, before its advance bonus.
pub const MAN_BASE: i32 = 5;

pub const KING_VALUE: i32 = 20;

// Score of a side with no legal moves left; depth is added on top.
pub const WIN_SCORE: i32 = 1_000_000;
