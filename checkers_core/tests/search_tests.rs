#[cfg(test)]
mod tests {
    use checkers_core::engine::config::{EngineConfig, Strategy};
    use checkers_core::engine::control::CancellationToken;
    use checkers_core::engine::search::MinimaxEngine;
    use checkers_core::engine::{build_searcher, Move, Searcher};
    use checkers_core::logic::board::{Board, BoardCoordinate, Color, Orientation, Piece};
    use checkers_core::logic::events::{EventLog, GameEvent};
    use checkers_core::logic::game::{GameState, GameStatus, TurnOutcome};
    use checkers_core::logic::generator::MoveGenerator;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn at(row: usize, col: usize) -> BoardCoordinate {
        BoardCoordinate::new(row, col).unwrap()
    }

    #[test]
    fn test_opening_moves() {
        let board = Board::new();
        let set = MoveGenerator::new().enumerate_moves(&board, Color::White);
        assert!(set.captures.is_empty());
        // Four front-rank men; those away from the edge have two steps each.
        let origins: HashSet<_> = set.simples.iter().filter_map(Move::source).collect();
        assert_eq!(origins.len(), 4);
        assert_eq!(set.simples.len(), 7);
        assert!(set.simples.iter().all(|mv| mv.from_col == 2 && mv.col_delta == 1));
    }

    #[test]
    fn test_single_capture_scenario() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));

        let set = MoveGenerator::new().enumerate_moves(&board, Color::White);
        assert!(set.simples.is_empty());
        assert_eq!(set.captures.len(), 1);
        assert_eq!(set.captures[0].to_vec(), vec![3, 3, 2, 2, 4, 4]);
    }

    #[test]
    fn test_minimax_avoids_giving_away_a_piece() {
        // The white man on (3,3) may step to (4,4), where the black man on
        // (5,5) takes it, or to (2,4), out of reach.
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(3, 3), Piece::man(Color::White));
        board.add_piece(at(5, 5), Piece::man(Color::Black));
        board.add_piece(at(7, 7), Piece::man(Color::Black));

        let candidates = MoveGenerator::new().legal_moves(&board, Color::White);
        assert_eq!(candidates.len(), 2);

        let config = EngineConfig {
            max_depth: 3,
            ..EngineConfig::default()
        };
        let mut engine = MinimaxEngine::new(Arc::new(config));
        let (mv, _) = engine
            .select_move(&board, Color::White, &candidates, &CancellationToken::new())
            .unwrap();
        assert_eq!(mv, Move::simple(at(3, 3), -1, 1));
    }

    #[test]
    fn test_king_captures_from_distance() {
        let mut board = Board::empty(Orientation::Standard);
        board.add_piece(at(0, 0), Piece::king(Color::White));
        board.add_piece(at(4, 4), Piece::man(Color::Black));

        let mut game = GameState::from_board(board, Color::White);
        let moves = game.legal_moves();
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().all(|mv| mv.captured_at() == Some(at(4, 4))));

        let mut log = EventLog::new();
        let outcome = game.make_move((0, 0), (7, 7), &mut log).unwrap();
        assert_eq!(outcome, TurnOutcome::GameOver(Color::White));
        assert!(log.events.contains(&GameEvent::PieceCaptured {
            row: 4,
            col: 4,
            piece: Piece::man(Color::Black)
        }));
    }

    /// Plays a whole game between two strategies and checks it ends cleanly.
    fn self_play(white: EngineConfig, black: EngineConfig, max_turns: usize) -> GameState {
        let mut game = GameState::new();
        let mut white = build_searcher(Arc::new(white));
        let mut black = build_searcher(Arc::new(black));
        let mut log = EventLog::new();
        game.start(&mut log);

        for _ in 0..max_turns {
            if game.is_over() {
                break;
            }
            let candidates = game.legal_moves();
            let searcher = match game.turn {
                Color::White => &mut white,
                Color::Black => &mut black,
            };
            let (mv, _) = searcher
                .select_move(&game.board, game.turn, &candidates, &CancellationToken::new())
                .unwrap();
            game.play(mv, &mut log).unwrap();
            assert_eq!(game.board.counts, game.board.calculate_counts());
        }
        game
    }

    #[test]
    fn test_self_play_minimax_vs_random() {
        let minimax = EngineConfig {
            max_depth: 3,
            ..EngineConfig::default()
        };
        let random = EngineConfig {
            strategy: Strategy::Random,
            seed: Some(17),
            ..EngineConfig::default()
        };
        let game = self_play(minimax, random, 400);
        if let GameStatus::Won(winner) = game.status {
            let loser = winner.opposite();
            assert!(
                game.board.count(loser) == 0
                    || MoveGenerator::new().legal_moves(&game.board, loser).is_empty()
            );
        }
    }

    #[test]
    fn test_self_play_mcts_vs_random() {
        let mcts = EngineConfig {
            strategy: Strategy::MonteCarlo,
            mcts_iterations: 100,
            seed: Some(5),
            ..EngineConfig::default()
        };
        let random = EngineConfig {
            strategy: Strategy::Random,
            seed: Some(6),
            ..EngineConfig::default()
        };
        let game = self_play(random, mcts, 200);
        assert!(game.board.count(Color::White) <= 12);
        assert!(game.board.count(Color::Black) <= 12);
    }
}
