use crate::engine::config::EngineConfig;
use crate::engine::control::{CancellationToken, SearchClock};
use crate::engine::{Move, SearchStats, Searcher};
use crate::logic::board::{Board, BoardCoordinate, Color};
use crate::logic::generator::MoveGenerator;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

/// Result of one random playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playout {
    Win(Color),
    Draw,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub board: Board,
    /// Side that played `mv`; for the root, the side to move.
    pub player: Color,
    /// Side to move in `board`.
    pub to_move: Color,
    /// Landing cell of a capture chain `to_move` must continue.
    pub chain: Option<BoardCoordinate>,
    pub mv: Option<Move>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub visits: u32,
    pub wins: u32,
}

impl Node {
    #[allow(clippy::cast_precision_loss)]
    fn win_ratio(&self, epsilon: f64) -> f64 {
        f64::from(self.wins) / (f64::from(self.visits) + epsilon)
    }
}

/// Search tree stored as an arena. Index 0 is the root; links are indices.
#[derive(Debug, Clone)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(board: Board, turn: Color) -> Self {
        Self {
            nodes: vec![Node {
                board,
                player: turn,
                to_move: turn,
                chain: None,
                mv: None,
                parent: None,
                children: Vec::new(),
                visits: 0,
                wins: 0,
            }],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = &Node> + '_ {
        self.nodes[index].children.iter().map(|&c| &self.nodes[c])
    }

    /// Creates one child of the root per candidate, each with the move
    /// already applied to its own board.
    fn expand_root(&mut self, generator: &MoveGenerator, candidates: &[Move]) {
        let parent = &self.nodes[0];
        let mover = parent.to_move;
        let children: Vec<Node> = candidates
            .iter()
            .map(|mv| {
                let mut board = parent.board.clone();
                board.apply_move(mv, mover);
                let chain = mv
                    .target()
                    .filter(|&at| mv.is_capture() && !generator.try_chop(&board, mover, at).is_empty());
                Node {
                    board,
                    player: mover,
                    to_move: if chain.is_some() { mover } else { mover.opposite() },
                    chain,
                    mv: Some(*mv),
                    parent: Some(0),
                    children: Vec::new(),
                    visits: 0,
                    wins: 0,
                }
            })
            .collect();

        for child in children {
            let index = self.nodes.len();
            self.nodes.push(child);
            self.nodes[0].children.push(index);
        }
    }

    /// Descends by UCB1 until a node without children. Ties keep the first child.
    #[allow(clippy::cast_precision_loss)]
    fn select(&self, exploration: f64, epsilon: f64) -> usize {
        let mut current = 0;
        loop {
            let node = &self.nodes[current];
            let parent_visits = f64::from(node.visits);
            let mut best: Option<(usize, f64)> = None;

            for &child_index in &node.children {
                let child = &self.nodes[child_index];
                let visits = f64::from(child.visits) + epsilon;
                let ucb = child.win_ratio(epsilon)
                    + exploration * ((parent_visits + 1.0).ln() / visits).sqrt();
                if best.map_or(true, |(_, best_ucb)| ucb > best_ucb) {
                    best = Some((child_index, ucb));
                }
            }

            match best {
                Some((next, _)) => current = next,
                None => return current,
            }
        }
    }

    /// Walks from `index` up to and including the root. Wins are credited to
    /// the nodes whose `player` won the playout.
    fn backpropagate(&mut self, index: usize, result: Playout) {
        let winner = match result {
            Playout::Win(color) => Some(color),
            Playout::Draw => None,
            Playout::Cancelled => return,
        };
        let mut current = Some(index);
        while let Some(i) = current {
            let node = &mut self.nodes[i];
            node.visits += 1;
            if winner == Some(node.player) {
                node.wins += 1;
            }
            current = node.parent;
        }
    }

    /// Root child with the highest win ratio, first one on ties.
    fn best_child(&self, epsilon: f64) -> Option<&Node> {
        let mut best: Option<(&Node, f64)> = None;
        for child in self.children(0) {
            let ratio = child.win_ratio(epsilon);
            if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
                best = Some((child, ratio));
            }
        }
        best.map(|(node, _)| node)
    }
}

/// Monte Carlo Tree Search over a single expanded ply. Deeper lookahead comes
/// from random playouts only.
pub struct MctsEngine {
    config: Arc<EngineConfig>,
    generator: MoveGenerator,
    rng: StdRng,
}

impl MctsEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            generator: MoveGenerator::new(),
            rng,
        }
    }

    /// Builds the tree for `board` and runs up to `mcts_iterations`
    /// select/simulate/backpropagate rounds. Returns the tree and the number
    /// of rounds that completed.
    pub fn build_tree(
        &mut self,
        board: &Board,
        turn: Color,
        candidates: &[Move],
        cancel: &CancellationToken,
        clock: &SearchClock,
    ) -> (Tree, u32) {
        let mut tree = Tree::new(board.clone(), turn);
        tree.expand_root(&self.generator, candidates);

        let interval = self.config.yield_interval;
        let mut completed = 0;
        for iteration in 0..self.config.mcts_iterations {
            if cancel.is_cancelled() || clock.expired() {
                break;
            }
            #[allow(clippy::manual_is_multiple_of)]
            if interval > 0 && iteration % interval == 0 {
                std::thread::yield_now();
            }

            let leaf = tree.select(self.config.exploration, self.config.ucb_epsilon);
            let result = self.simulate(&tree.nodes[leaf], cancel);
            if result == Playout::Cancelled {
                break;
            }
            trace!("mcts iteration {iteration}: leaf {leaf} {result:?}");
            tree.backpropagate(leaf, result);
            completed += 1;
        }
        (tree, completed)
    }

    /// Plays random legal moves from `node` for up to `playout_plies` turns.
    /// A capture chain is followed to its end within the same ply. A side
    /// left without moves loses; running out of plies is a draw.
    pub fn simulate(&mut self, node: &Node, cancel: &CancellationToken) -> Playout {
        let mut board = node.board.clone();
        let mut to_move = node.to_move;
        let mut chain = node.chain;

        for _ in 0..self.config.playout_plies {
            if cancel.is_cancelled() {
                return Playout::Cancelled;
            }

            let moves = match chain.take() {
                Some(at) => self.generator.try_chop(&board, to_move, at),
                None => self.generator.legal_moves(&board, to_move),
            };
            let Some(&first) = moves.choose(&mut self.rng) else {
                return Playout::Win(to_move.opposite());
            };

            let mut mv = first;
            loop {
                board.apply_move(&mv, to_move);
                if !mv.is_capture() {
                    break;
                }
                let Some(landing) = mv.target() else {
                    break;
                };
                let follow_ups = self.generator.try_chop(&board, to_move, landing);
                match follow_ups.choose(&mut self.rng) {
                    Some(&next) => mv = next,
                    None => break,
                }
            }
            to_move = to_move.opposite();
        }
        Playout::Draw
    }
}

impl Searcher for MctsEngine {
    fn select_move(
        &mut self,
        board: &Board,
        turn: Color,
        candidates: &[Move],
        cancel: &CancellationToken,
    ) -> Option<(Move, SearchStats)> {
        debug_assert!(!candidates.is_empty(), "select_move needs candidates");
        if candidates.is_empty() {
            warn!("mcts search called without candidates for {turn:?}");
            return None;
        }
        let first = *candidates.first()?;

        let clock = SearchClock::start(self.config.time_limit_ms);
        let (tree, completed) = self.build_tree(board, turn, candidates, cancel, &clock);

        let best = tree
            .best_child(self.config.ucb_epsilon)
            .and_then(|node| node.mv)
            .unwrap_or(first);

        let stats = SearchStats {
            depth: 1,
            nodes: u32::try_from(tree.nodes.len()).unwrap_or(u32::MAX),
            iterations: completed,
            time_ms: clock.elapsed_whole_ms(),
            cancelled: completed < self.config.mcts_iterations,
        };
        debug!(
            "mcts {turn:?}: {best} after {} iterations over {} children in {}ms",
            stats.iterations,
            candidates.len(),
            stats.time_ms
        );
        Some((best, stats))
    }
}
