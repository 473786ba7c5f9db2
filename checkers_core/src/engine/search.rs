use crate::engine::config::EngineConfig;
use crate::engine::control::{CancellationToken, SearchClock};
use crate::engine::eval::SimpleEvaluator;
use crate::engine::{Evaluator, Move, SearchStats, Searcher};
use crate::logic::board::{Board, BoardCoordinate, Color};
use crate::logic::generator::MoveGenerator;
use log::{debug, trace, warn};
use std::sync::Arc;

const CLOCK_CHECK_INTERVAL: u32 = 1024;

/// Fixed-depth minimax with alpha-beta pruning. Scores are always framed from
/// the side that moves at the root.
pub struct MinimaxEngine {
    config: Arc<EngineConfig>,
    evaluator: SimpleEvaluator,
    generator: MoveGenerator,
    nodes_searched: u32,
    root: Color,
    cancel: CancellationToken,
    clock: SearchClock,
    stopped: bool,
}

impl MinimaxEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            evaluator: SimpleEvaluator::new(config.clone()),
            config,
            generator: MoveGenerator::new(),
            nodes_searched: 0,
            root: Color::White,
            cancel: CancellationToken::new(),
            clock: SearchClock::start(None),
            stopped: false,
        }
    }

    /// Alpha-beta window bound, above any terminal score for the configured
    /// win score.
    fn infinity(&self) -> i32 {
        self.config.win_score.saturating_add(i32::from(u8::MAX) + 1)
    }

    #[allow(clippy::manual_is_multiple_of)]
    fn should_stop(&mut self) -> bool {
        if !self.stopped
            && (self.cancel.is_cancelled()
                || (self.nodes_searched % CLOCK_CHECK_INTERVAL == 0 && self.clock.expired()))
        {
            self.stopped = true;
        }
        self.stopped
    }

    #[allow(clippy::manual_is_multiple_of)]
    fn maybe_yield(&self) {
        let interval = self.config.yield_interval;
        if interval > 0 && self.nodes_searched % interval == 0 {
            std::thread::yield_now();
        }
    }

    const fn mover(&self, maximizing: bool) -> Color {
        if maximizing {
            self.root
        } else {
            self.root.opposite()
        }
    }

    /// Landing cell of `mv` if the capturing piece can go on capturing.
    fn pending_chain(&self, board: &Board, mover: Color, mv: &Move) -> Option<BoardCoordinate> {
        if !mv.is_capture() {
            return None;
        }
        let landing = mv.target()?;
        if self.generator.try_chop(board, mover, landing).is_empty() {
            None
        } else {
            Some(landing)
        }
    }

    /// Applies `mv` on a copy of `board` and searches the resulting position.
    /// A capture that can be continued keeps the same side on move, so the
    /// maximizing flag only flips when the turn really passes.
    fn search_child(
        &mut self,
        board: &Board,
        mv: &Move,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
    ) -> i32 {
        let mover = self.mover(maximizing);
        let mut child = board.clone();
        child.apply_move(mv, mover);

        let chain = self.pending_chain(&child, mover, mv);
        let next_maximizing = if chain.is_some() {
            maximizing
        } else {
            !maximizing
        };
        self.minimax(
            &child,
            depth.saturating_sub(1),
            alpha,
            beta,
            next_maximizing,
            chain,
        )
    }

    fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        chain: Option<BoardCoordinate>,
    ) -> i32 {
        self.nodes_searched += 1;
        self.maybe_yield();

        if self.should_stop() {
            return 0;
        }

        if depth == 0 {
            return self.evaluator.evaluate(board, self.root);
        }

        let mover = self.mover(maximizing);
        let moves = match chain {
            Some(at) => self.generator.try_chop(board, mover, at),
            None => self.generator.legal_moves(board, mover),
        };

        // Side to move is stuck: it has lost. Remaining depth rewards
        // faster wins and slower losses.
        if moves.is_empty() {
            let score = self.config.win_score.saturating_add(i32::from(depth));
            return if maximizing { -score } else { score };
        }

        let infinity = self.infinity();
        if maximizing {
            let mut value = -infinity;
            for mv in &moves {
                let score = self.search_child(board, mv, depth, alpha, beta, true);
                value = value.max(score);
                alpha = alpha.max(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        } else {
            let mut value = infinity;
            for mv in &moves {
                let score = self.search_child(board, mv, depth, alpha, beta, false);
                value = value.min(score);
                beta = beta.min(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
    }

    /// Scores every candidate and keeps the first one with the highest value.
    /// A candidate whose subtree was interrupted is discarded; if nothing was
    /// fully scored the first candidate is returned with no score.
    pub(crate) fn search_root(
        &mut self,
        board: &Board,
        turn: Color,
        candidates: &[Move],
        cancel: &CancellationToken,
    ) -> Option<(Move, Option<i32>)> {
        let first = *candidates.first()?;

        self.nodes_searched = 0;
        self.root = turn;
        self.cancel = cancel.clone();
        self.clock = SearchClock::start(self.config.time_limit_ms);
        self.stopped = false;

        let depth = self.config.max_depth.max(1);
        let infinity = self.infinity();
        let mut best: Option<(Move, i32)> = None;

        for mv in candidates {
            if self.should_stop() {
                break;
            }
            let alpha = best.map_or(-infinity, |(_, score)| score);
            let score = self.search_child(board, mv, depth, alpha, infinity, true);
            if self.stopped {
                break;
            }
            trace!("minimax {turn:?}: {mv} scores {score}");
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((*mv, score));
            }
        }

        Some(best.map_or((first, None), |(mv, score)| (mv, Some(score))))
    }
}

impl Searcher for MinimaxEngine {
    fn select_move(
        &mut self,
        board: &Board,
        turn: Color,
        candidates: &[Move],
        cancel: &CancellationToken,
    ) -> Option<(Move, SearchStats)> {
        debug_assert!(!candidates.is_empty(), "select_move needs candidates");
        if candidates.is_empty() {
            warn!("minimax search called without candidates for {turn:?}");
            return None;
        }
        let (mv, score) = self.search_root(board, turn, candidates, cancel)?;

        let stats = SearchStats {
            depth: self.config.max_depth,
            nodes: self.nodes_searched,
            iterations: 0,
            time_ms: self.clock.elapsed_whole_ms(),
            cancelled: self.stopped,
        };
        debug!(
            "minimax {turn:?}: {mv} score {score:?} depth {} nodes {} in {}ms{}",
            stats.depth,
            stats.nodes,
            stats.time_ms,
            if stats.cancelled { " (cancelled)" } else { "" }
        );
        Some((mv, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{Orientation, Piece};

    fn at(row: usize, col: usize) -> BoardCoordinate {
        BoardCoordinate::new(row, col).unwrap()
    }

    fn engine(depth: u8) -> MinimaxEngine {
        MinimaxEngine::new(Arc::new(EngineConfig {
            max_depth: depth,
            ..EngineConfig::default()
        }))
    }

    /// Plain minimax without pruning, following the same chain rules.
    fn naive(
        board: &Board,
        depth: u8,
        maximizing: bool,
        root: Color,
        chain: Option<BoardCoordinate>,
        config: &EngineConfig,
    ) -> i32 {
        let evaluator = SimpleEvaluator::new(Arc::new(config.clone()));
        if depth == 0 {
            return evaluator.evaluate(board, root);
        }
        let generator = MoveGenerator::new();
        let mover = if maximizing { root } else { root.opposite() };
        let moves = match chain {
            Some(at) => generator.try_chop(board, mover, at),
            None => generator.legal_moves(board, mover),
        };
        if moves.is_empty() {
            let score = config.win_score.saturating_add(i32::from(depth));
            return if maximizing { -score } else { score };
        }
        let scores = moves.iter().map(|mv| {
            let mut child = board.clone();
            child.apply_move(mv, mover);
            let next_chain = mv
                .target()
                .filter(|&landing| mv.is_capture() && !generator.try_chop(&child, mover, landing).is_empty());
            let next_max = if next_chain.is_some() { maximizing } else { !maximizing };
            naive(&child, depth - 1, next_max, root, next_chain, config)
        });
        if maximizing {
            scores.max().unwrap()
        } else {
            scores.min().unwrap()
        }
    }

    #[test]
    fn test_depth_one_maximizes_static_evaluation() {
        let board = Board::new();
        let candidates = MoveGenerator::new().legal_moves(&board, Color::White);
        let mut engine = engine(1);
        let (mv, stats) = engine
            .select_move(&board, Color::White, &candidates, &CancellationToken::new())
            .unwrap();

        let evaluator = SimpleEvaluator::new(Arc::new(EngineConfig::default()));
        let score_of = |m: &Move| {
            let mut child = board.clone();
            child.apply_move(m, Color::White);
            evaluator.evaluate(&child, Color::White)
        };
        let best = candidates.iter().map(score_of).max().unwrap();
        assert_eq!(score_of(&mv), best);
        assert!(!stats.cancelled);
        assert_eq!(stats.depth, 1);
    }

    #[test]
    fn test_alpha_beta_matches_plain_minimax() {
        let mut board = Board::new();
        board.apply_move(&Move::simple(at(2, 2), 1, 1), Color::White);
        board.apply_move(&Move::simple(at(5, 5), -1, -1), Color::Black);

        for depth in 1..=3 {
            let config = EngineConfig {
                max_depth: depth,
                ..EngineConfig::default()
            };
            let candidates = MoveGenerator::new().legal_moves(&board, Color::White);
            let mut engine = MinimaxEngine::new(Arc::new(config.clone()));
            let (_, score) = engine
                .search_root(&board, Color::White, &candidates, &CancellationToken::new())
                .unwrap();
            let expected = naive(&board, depth, true, Color::White, None, &config);
            assert_eq!(score, Some(expected), "depth {depth}");
        }
    }

    #[test]
    fn test_prefers_double_capture() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(2, 0), Piece::man(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));
        board.add_piece(at(6, 4), Piece::man(Color::Black));
        board.add_piece(at(3, 1), Piece::man(Color::Black));

        let candidates = MoveGenerator::new().legal_moves(&board, Color::White);
        assert_eq!(candidates.len(), 2);

        let (mv, _) = engine(2)
            .select_move(&board, Color::White, &candidates, &CancellationToken::new())
            .unwrap();
        assert_eq!(mv, Move::capture(at(3, 3), 2, 2, at(4, 4)));
    }

    #[test]
    fn test_winning_capture_scores_as_win() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));

        let candidates = MoveGenerator::new().legal_moves(&board, Color::White);
        let (_, score) = engine(2)
            .search_root(&board, Color::White, &candidates, &CancellationToken::new())
            .unwrap();
        assert!(score.unwrap() > EngineConfig::default().win_score);
    }

    #[test]
    fn test_large_win_score_is_not_clamped() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));
        let candidates = MoveGenerator::new().legal_moves(&board, Color::White);

        for (win_score, expected) in [(5_000_000, 5_000_001), (i32::MAX, i32::MAX)] {
            let mut engine = MinimaxEngine::new(Arc::new(EngineConfig {
                max_depth: 2,
                win_score,
                ..EngineConfig::default()
            }));
            let (_, score) = engine
                .search_root(&board, Color::White, &candidates, &CancellationToken::new())
                .unwrap();
            assert_eq!(score, Some(expected));
        }
    }

    #[test]
    fn test_cancelled_search_returns_first_candidate() {
        let board = Board::new();
        let candidates = MoveGenerator::new().legal_moves(&board, Color::White);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (mv, stats) = engine(6)
            .select_move(&board, Color::White, &candidates, &cancel)
            .unwrap();
        assert_eq!(Some(&mv), candidates.first());
        assert!(stats.cancelled);
    }

    #[test]
    fn test_single_candidate_is_returned() {
        let board = Board::new();
        let only = Move::simple(at(2, 2), 1, 1);
        let (mv, stats) = engine(3)
            .select_move(&board, Color::White, &[only], &CancellationToken::new())
            .unwrap();
        assert_eq!(mv, only);
        assert!(stats.nodes > 0);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let board = Board::new();
        let before = board.clone();
        let candidates = MoveGenerator::new().legal_moves(&board, Color::Black);
        engine(3)
            .select_move(&board, Color::Black, &candidates, &CancellationToken::new())
            .unwrap();
        assert_eq!(board, before);
    }
}
