//! Baseline strategy that picks a uniformly random candidate.

use crate::engine::config::EngineConfig;
use crate::engine::control::CancellationToken;
use crate::engine::{Move, SearchStats, Searcher};
use crate::logic::board::{Board, Color};
use log::warn;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            rng: config
                .seed
                .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
        }
    }
}

impl Searcher for RandomEngine {
    fn select_move(
        &mut self,
        _board: &Board,
        turn: Color,
        candidates: &[Move],
        cancel: &CancellationToken,
    ) -> Option<(Move, SearchStats)> {
        debug_assert!(!candidates.is_empty(), "select_move needs candidates");
        if candidates.is_empty() {
            warn!("random search called without candidates for {turn:?}");
            return None;
        }
        let mv = *candidates.choose(&mut self.rng)?;
        Some((
            mv,
            SearchStats {
                depth: 0,
                nodes: 1,
                iterations: 0,
                time_ms: 0,
                cancelled: cancel.is_cancelled(),
            },
        ))
    }
}
