pub mod board;
pub mod eval_constants;
pub mod events;
pub mod game;
pub mod generator;
pub mod rules;
